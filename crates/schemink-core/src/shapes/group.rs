//! Group item for combining multiple items.

use super::{Item, ItemCommon, ItemKind, ItemTrait};
use crate::error::PropertiesError;
use crate::properties::{GroupProperties, ItemProperties};
use crate::snap::snap_to_grid;
use kurbo::{Affine, Point, Rect, Size};

/// A group of items that can be manipulated as a single unit.
/// Groups can contain other groups, enabling nested hierarchies.
///
/// Members are owned by the group and keep scene coordinates; the group's
/// own position is its mount point, which members are serialized against.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub(crate) common: ItemCommon,
    pos: Point,
    items: Vec<Item>,
}

impl Group {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a group from a list of items.
    ///
    /// Fails, handing the items back, when fewer than two are given.
    pub fn from_items(items: Vec<Item>) -> Result<Self, Vec<Item>> {
        let mut group = Self::new();
        group.add_items(items)?;
        Ok(group)
    }

    /// Get the members of this group.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Get mutable access to members.
    pub fn items_mut(&mut self) -> &mut Vec<Item> {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append members. At least two items must be added at once.
    pub fn add_items(&mut self, items: Vec<Item>) -> Result<(), Vec<Item>> {
        if items.len() < 2 {
            return Err(items);
        }
        for mut item in items {
            item.common_mut().parent = Some(self.common.id);
            self.items.push(item);
        }
        Ok(())
    }

    /// Dissolve this group and return its members as parentless items.
    pub fn ungroup(self) -> Vec<Item> {
        self.items
            .into_iter()
            .map(|mut item| {
                item.common_mut().parent = None;
                item
            })
            .collect()
    }

    /// Mount point derived from the members: the top-left of their combined
    /// bounding box, snapped to `grid`.
    pub fn calculate_mount_point(&self, grid: f64) -> Point {
        snap_to_grid(self.bounds().origin(), grid)
    }

    /// Move the mount point without moving the members.
    pub fn set_mount_point(&mut self, pos: Point) {
        self.pos = pos;
    }

    pub(crate) fn from_properties(props: &GroupProperties, origin: Point, preserve_id: bool) -> Self {
        let mut group = Self::new();
        group.common.apply_properties(&props.common, preserve_id);
        group.pos = origin + props.common.mount_point.to_vec2();
        group.items = props
            .graphics_objects
            .iter()
            .map(|child| Item::from_properties(child, group.pos, preserve_id))
            .collect();
        group.adopt_members();
        group
    }

    /// Merge a property tree into the group.
    ///
    /// Each entry updates the first member with its id that no earlier entry
    /// claimed. Unknown entries and repeated ids are built and appended;
    /// members missing from the tree are kept.
    pub(crate) fn set_properties(
        &mut self,
        props: &GroupProperties,
        origin: Point,
        preserve_id: bool,
    ) -> Result<(), PropertiesError> {
        self.common.apply_properties(&props.common, preserve_id);
        let pos = origin + props.common.mount_point.to_vec2();
        self.set_position(pos);

        let mut claimed = vec![false; self.items.len()];
        for child_props in &props.graphics_objects {
            let id = child_props.id();
            let existing = (0..self.items.len())
                .find(|&i| id != 0 && !claimed[i] && self.items[i].id() == id);
            match existing {
                Some(i) => {
                    claimed[i] = true;
                    let child = &mut self.items[i];
                    if child.kind() == child_props.kind() {
                        child.set_properties(child_props, pos, preserve_id)?;
                    } else {
                        *child = Item::from_properties(child_props, pos, preserve_id);
                    }
                }
                None => {
                    claimed.push(true);
                    self.items
                        .push(Item::from_properties(child_props, pos, preserve_id));
                }
            }
        }

        self.adopt_members();
        Ok(())
    }

    fn adopt_members(&mut self) {
        let parent = Some(self.common.id);
        for child in &mut self.items {
            child.common_mut().parent = parent;
        }
    }

    /// Compare with a property tree: own fields must match, member counts
    /// must agree and every member must match the entry with its id.
    pub(crate) fn compare_properties(&self, props: &GroupProperties, origin: Point) -> bool {
        let common = self.common.to_properties(self.pos - origin);
        common == props.common
            && self.items.len() == props.graphics_objects.len()
            && self.items.iter().all(|child| {
                props
                    .graphics_objects
                    .iter()
                    .find(|p| p.id() == child.id())
                    .is_some_and(|p| child.compare_properties(p, self.pos))
            })
    }
}

impl ItemTrait for Group {
    fn kind(&self) -> ItemKind {
        ItemKind::Group
    }

    fn common(&self) -> &ItemCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut ItemCommon {
        &mut self.common
    }

    fn bounds(&self) -> Rect {
        self.items
            .iter()
            .map(Item::bounds)
            .reduce(|acc, b| acc.union(b))
            .unwrap_or_else(|| Rect::from_origin_size(self.pos, Size::ZERO))
    }

    fn position(&self) -> Point {
        self.pos
    }

    fn set_position(&mut self, position: Point) {
        let delta = position - self.pos;
        for child in &mut self.items {
            child.move_by(delta);
        }
        self.pos = position;
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.items.iter().any(|child| child.hit_test(point, tolerance))
    }

    fn transform(&mut self, affine: Affine) {
        // The mount point stays where it is.
        for child in &mut self.items {
            child.as_item_mut().transform(affine);
        }
    }

    fn properties_at(&self, origin: Point) -> ItemProperties {
        ItemProperties::Group(GroupProperties {
            common: self.common.to_properties(self.pos - origin),
            graphics_objects: self
                .items
                .iter()
                .map(|child| child.properties_at(self.pos))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Line, Rectangle};

    fn two_rects() -> Vec<Item> {
        let mut rect1 = Rectangle::new(Point::new(0.0, 0.0), Size::new(100.0, 50.0));
        rect1.common.id = 1;
        let mut rect2 = Rectangle::new(Point::new(200.0, 200.0), Size::new(50.0, 100.0));
        rect2.common.id = 2;
        vec![rect1.into(), rect2.into()]
    }

    #[test]
    fn test_group_creation() {
        let group = Group::from_items(two_rects()).unwrap();
        assert_eq!(group.len(), 2);
    }

    #[test]
    fn test_group_needs_two_items() {
        let single = vec![Item::from(Line::new(Point::ZERO, Point::new(10.0, 0.0)))];
        let rejected = Group::from_items(single).unwrap_err();
        assert_eq!(rejected.len(), 1);
    }

    #[test]
    fn test_group_bounds() {
        let group = Group::from_items(two_rects()).unwrap();
        let bounds = group.bounds();

        assert!((bounds.x0 - 0.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 0.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 250.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_group_hit_test() {
        let group = Group::from_items(two_rects()).unwrap();

        // Hit test on first child
        assert!(group.hit_test(Point::new(50.0, 25.0), 0.0));
        // Hit test on second child
        assert!(group.hit_test(Point::new(225.0, 250.0), 0.0));
        // Hit test in empty space between children
        assert!(!group.hit_test(Point::new(150.0, 100.0), 0.0));
    }

    #[test]
    fn test_move_carries_members() {
        let mut group = Group::from_items(two_rects()).unwrap();
        group.set_mount_point(group.calculate_mount_point(20.0));
        group.set_position(Point::new(40.0, 20.0));
        assert_eq!(group.items()[0].position(), Point::new(40.0, 20.0));
        assert_eq!(group.items()[1].position(), Point::new(240.0, 220.0));
    }

    #[test]
    fn test_mount_point_snaps_to_grid() {
        let mut rect1 = Rectangle::new(Point::new(13.0, 27.0), Size::new(10.0, 10.0));
        rect1.common.id = 1;
        let rect2 = Rectangle::new(Point::new(50.0, 50.0), Size::new(10.0, 10.0));
        let group = Group::from_items(vec![rect1.into(), rect2.into()]).unwrap();
        assert_eq!(group.calculate_mount_point(20.0), Point::new(20.0, 20.0));
    }

    #[test]
    fn test_members_serialize_relative_to_mount_point() {
        let mut group = Group::from_items(two_rects()).unwrap();
        group.set_mount_point(Point::new(100.0, 100.0));
        let ItemProperties::Group(props) = group.properties_at(Point::ZERO) else {
            panic!("expected group properties");
        };
        assert_eq!(props.common.mount_point.x, 100.0);
        let first = props.graphics_objects[0].common();
        assert_eq!(first.mount_point.x, -100.0);
        assert_eq!(first.mount_point.y, -100.0);
    }

    #[test]
    fn test_properties_roundtrip() {
        let mut group = Group::from_items(two_rects()).unwrap();
        group.common.id = 10;
        group.set_mount_point(Point::new(20.0, 20.0));
        let props = group.properties_at(Point::ZERO);

        let copy = Item::from_properties(&props, Point::ZERO, true);
        assert!(copy.compare_properties(&props, Point::ZERO));
        assert_eq!(copy.children().len(), 2);
        assert!(copy.children().iter().all(|c| c.common().parent() == Some(10)));
        assert_eq!(copy.bounds(), group.bounds());
    }

    #[test]
    fn test_merge_keeps_missing_members() {
        let mut group = Group::from_items(two_rects()).unwrap();
        group.common.id = 10;
        let ItemProperties::Group(mut props) = group.properties_at(Point::ZERO) else {
            panic!("expected group properties");
        };
        // Drop member 2 from the tree and move member 1.
        props.graphics_objects.retain(|p| p.id() == 1);
        props.graphics_objects[0].common_mut().mount_point.x = 30.0;

        group.set_properties(&props, Point::ZERO, true).unwrap();
        assert_eq!(group.len(), 2);
        assert_eq!(group.items()[0].position(), Point::new(30.0, 0.0));
        // The tree no longer describes the group completely.
        assert!(!group.compare_properties(&props, Point::ZERO));
    }

    #[test]
    fn test_merge_appends_unknown_members() {
        let mut group = Group::from_items(two_rects()).unwrap();
        let mut line = Line::new(Point::new(5.0, 5.0), Point::new(15.0, 5.0));
        line.common.id = 3;
        let ItemProperties::Group(mut props) = group.properties_at(Point::ZERO) else {
            panic!("expected group properties");
        };
        props.graphics_objects.push(line.properties_at(Point::ZERO));

        group.set_properties(&props, Point::ZERO, true).unwrap();
        assert_eq!(group.len(), 3);
        assert_eq!(group.items()[2].id(), 3);
    }

    #[test]
    fn test_rotation_keeps_mount_point() {
        let mut group = Item::from(Group::from_items(two_rects()).unwrap());
        group.rotate(Point::new(0.0, 0.0), 90.0);
        assert_eq!(group.position(), Point::ZERO);
        let first = &group.children()[0];
        assert_eq!(first.bounds(), Rect::new(-50.0, 0.0, 0.0, 100.0));
    }

    #[test]
    fn test_ungroup_clears_parent() {
        let mut group = Group::from_items(two_rects()).unwrap();
        group.common.id = 5;
        let group = Group::from_items(group.ungroup()).unwrap();
        let items = group.ungroup();
        assert!(items.iter().all(|item| item.common().parent().is_none()));
    }

    #[test]
    fn test_repeated_member_ids_are_all_built() {
        let mut group = Group::from_items(two_rects()).unwrap();
        group.common.id = 10;
        let ItemProperties::Group(mut props) = group.properties_at(Point::ZERO) else {
            panic!("expected group properties");
        };
        for child in &mut props.graphics_objects {
            child.common_mut().id = 5;
        }

        let built = Group::from_properties(&props, Point::ZERO, true);
        assert_eq!(built.len(), 2);
        assert_eq!(built.bounds(), group.bounds());

        // Merging into a group that already holds one member with id 5
        // updates it once and appends the repeat.
        let mut merged = Group::from_items(two_rects()).unwrap();
        merged.items_mut()[0].common_mut().id = 5;
        merged.set_properties(&props, Point::ZERO, true).unwrap();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.items()[0].position(), Point::ZERO);
        assert_eq!(merged.items()[2].position(), Point::new(200.0, 200.0));
    }
}
