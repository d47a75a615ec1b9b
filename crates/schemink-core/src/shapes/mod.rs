//! Item definitions for the schematic canvas.

mod ellipse;
mod frame;
mod group;
mod line;
mod link;
mod rectangle;
mod text;

pub use ellipse::Ellipse;
pub use frame::Frame;
pub use group::Group;
pub use line::Line;
pub use link::{Link, LinkDirection, ARROW_SIZE, LABEL_GRID};
pub use rectangle::Rectangle;
pub use text::Text;

use crate::error::PropertiesError;
use crate::ids::ItemId;
use crate::properties::{CommonProperties, ItemProperties, RgbProperties};
use kurbo::{Affine, Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest allowed z-index.
pub const MIN_Z_INDEX: i32 = 1;
/// Highest allowed z-index.
pub const MAX_Z_INDEX: i32 = 10;
/// Thickness range walked by the thickness commands.
pub const MIN_THICKNESS: u32 = 1;
pub const MAX_THICKNESS: u32 = 6;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn black() -> Self {
        Self::rgb(0, 0, 0)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Stroke pattern of an item outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PenStyle {
    #[default]
    Solid,
    DashLine,
    DotLine,
    DashDotLine,
    DashDotDotLine,
}

impl PenStyle {
    pub const ALL: [PenStyle; 5] = [
        PenStyle::Solid,
        PenStyle::DashLine,
        PenStyle::DotLine,
        PenStyle::DashDotLine,
        PenStyle::DashDotDotLine,
    ];

    /// Name used in property trees.
    pub fn name(self) -> &'static str {
        match self {
            PenStyle::Solid => "solid",
            PenStyle::DashLine => "dashLine",
            PenStyle::DotLine => "dotLine",
            PenStyle::DashDotLine => "dashDotLine",
            PenStyle::DashDotDotLine => "dashDotDotLine",
        }
    }

    /// Look a style up by name. Unknown names map to solid.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|style| style.name() == name)
            .unwrap_or_default()
    }

    /// Cycle to the next pen style.
    pub fn next(self) -> Self {
        match self {
            PenStyle::Solid => PenStyle::DashLine,
            PenStyle::DashLine => PenStyle::DotLine,
            PenStyle::DotLine => PenStyle::DashDotLine,
            PenStyle::DashDotLine => PenStyle::DashDotDotLine,
            PenStyle::DashDotDotLine => PenStyle::Solid,
        }
    }

    /// Cycle to the previous pen style.
    pub fn prev(self) -> Self {
        match self {
            PenStyle::Solid => PenStyle::DashDotDotLine,
            PenStyle::DashLine => PenStyle::Solid,
            PenStyle::DotLine => PenStyle::DashLine,
            PenStyle::DashDotLine => PenStyle::DotLine,
            PenStyle::DashDotDotLine => PenStyle::DashDotLine,
        }
    }
}

impl From<String> for PenStyle {
    fn from(name: String) -> Self {
        PenStyle::from_name(&name)
    }
}

impl From<PenStyle> for String {
    fn from(style: PenStyle) -> Self {
        style.name().to_string()
    }
}

/// The closed set of item variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Line,
    Rect,
    Ellipse,
    Text,
    Group,
    Link,
}

impl ItemKind {
    /// Tag written to the `type` field.
    pub fn type_name(self) -> &'static str {
        match self {
            ItemKind::Line => "line",
            ItemKind::Rect => "rectangle",
            ItemKind::Ellipse => "ellipse",
            ItemKind::Text => "text",
            ItemKind::Group => "group",
            ItemKind::Link => "link",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Attributes every item carries.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemCommon {
    pub(crate) id: ItemId,
    pub name: String,
    pub color: SerializableColor,
    pub pen_style: PenStyle,
    thickness: u32,
    z_index: i32,
    pub(crate) selected: bool,
    pub(crate) highlighted: bool,
    pub(crate) parent: Option<ItemId>,
}

impl Default for ItemCommon {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            color: SerializableColor::black(),
            pen_style: PenStyle::Solid,
            thickness: MIN_THICKNESS,
            z_index: MIN_Z_INDEX,
            selected: false,
            highlighted: false,
            parent: None,
        }
    }
}

impl ItemCommon {
    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn thickness(&self) -> u32 {
        self.thickness
    }

    pub fn set_thickness(&mut self, thickness: u32) {
        self.thickness = thickness.max(MIN_THICKNESS);
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Set the z-index, clamped to the allowed range.
    pub fn set_z_index(&mut self, z_index: i32) {
        self.z_index = z_index.clamp(MIN_Z_INDEX, MAX_Z_INDEX);
    }

    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub(crate) fn to_properties(&self, mount_point: Vec2) -> CommonProperties {
        CommonProperties {
            id: self.id,
            name: self.name.clone(),
            mount_point: mount_point.into(),
            pen_style: Some(self.pen_style),
            color: Some(RgbProperties::from(self.color)),
            z_index: Some(self.z_index),
            thickness: Some(self.thickness),
        }
    }

    /// Apply the style part of a property tree. Absent fields are left alone.
    pub(crate) fn apply_properties(&mut self, props: &CommonProperties, preserve_id: bool) {
        self.selected = false;
        self.name = props.name.clone();
        if let Some(pen_style) = props.pen_style {
            self.pen_style = pen_style;
        }
        if let Some(color) = props.color {
            self.color = color.into();
        }
        if let Some(thickness) = props.thickness {
            self.set_thickness(thickness);
        }
        if let Some(z_index) = props.z_index {
            self.set_z_index(z_index);
        }
        if preserve_id {
            self.id = props.id;
        }
    }
}

/// Affine transform for a rotation by a whole number of quarter turns.
///
/// The angle is rounded to the nearest multiple of 90 degrees and the
/// matrix coefficients are exact, so integer coordinates stay integers.
pub fn quarter_turn(center: Point, degrees: f64) -> Affine {
    let turns = ((degrees / 90.0).round() as i64).rem_euclid(4);
    let (cos, sin) = match turns {
        0 => (1.0, 0.0),
        1 => (0.0, 1.0),
        2 => (-1.0, 0.0),
        _ => (0.0, -1.0),
    };
    Affine::translate(center.to_vec2())
        * Affine::new([cos, sin, -sin, cos, 0.0, 0.0])
        * Affine::translate(-center.to_vec2())
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    (point - (a + seg * t)).hypot()
}

/// Capabilities shared by every item variant.
pub trait ItemTrait {
    fn kind(&self) -> ItemKind;

    fn common(&self) -> &ItemCommon;

    fn common_mut(&mut self) -> &mut ItemCommon;

    /// Bounding box in scene coordinates.
    fn bounds(&self) -> Rect;

    /// Anchor point in scene coordinates.
    fn position(&self) -> Point;

    /// Move the item so its anchor lands on `position`.
    fn set_position(&mut self, position: Point);

    /// Check if a point (in scene coordinates) hits this item.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Control points for interactive resizing.
    fn points(&self) -> Vec<Point> {
        Vec::new()
    }

    /// Grab the control point at `point`, if there is one.
    fn set_select_point(&mut self, _point: Point) -> bool {
        false
    }

    fn reset_select_point(&mut self) {}

    fn is_point_selected(&self) -> bool {
        false
    }

    /// Drag the grabbed control point to `point`.
    fn modify_selected_point(&mut self, _point: Point) {}

    /// Apply a quarter-turn transform and re-normalize the geometry.
    fn transform(&mut self, affine: Affine);

    /// Property tree with the mount point measured from `origin`.
    fn properties_at(&self, origin: Point) -> ItemProperties;
}

/// A scene item.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Line(Line),
    Rect(Rectangle),
    Ellipse(Ellipse),
    Text(Text),
    Group(Group),
    Link(Link),
}

impl Item {
    fn as_item(&self) -> &dyn ItemTrait {
        match self {
            Item::Line(i) => i,
            Item::Rect(i) => i,
            Item::Ellipse(i) => i,
            Item::Text(i) => i,
            Item::Group(i) => i,
            Item::Link(i) => i,
        }
    }

    fn as_item_mut(&mut self) -> &mut dyn ItemTrait {
        match self {
            Item::Line(i) => i,
            Item::Rect(i) => i,
            Item::Ellipse(i) => i,
            Item::Text(i) => i,
            Item::Group(i) => i,
            Item::Link(i) => i,
        }
    }

    /// Build an item from a property tree.
    ///
    /// `origin` is the scene position of the parent (zero for top-level
    /// items). Unless `preserve_id` is set the item comes back with id 0 and
    /// receives a fresh id when it is added to a scene.
    pub fn from_properties(props: &ItemProperties, origin: Point, preserve_id: bool) -> Item {
        match props {
            ItemProperties::Line(p) => Item::Line(Line::from_properties(p, origin, preserve_id)),
            ItemProperties::Rect(p) => {
                Item::Rect(Rectangle::from_properties(p, origin, preserve_id))
            }
            ItemProperties::Ellipse(p) => {
                Item::Ellipse(Ellipse::from_properties(p, origin, preserve_id))
            }
            ItemProperties::Text(p) => Item::Text(Text::from_properties(p, origin, preserve_id)),
            ItemProperties::Group(p) => {
                Item::Group(Group::from_properties(p, origin, preserve_id))
            }
            ItemProperties::Link(p) => Item::Link(Link::from_properties(p, origin, preserve_id)),
        }
    }

    pub fn id(&self) -> ItemId {
        self.common().id
    }

    pub fn kind(&self) -> ItemKind {
        self.as_item().kind()
    }

    pub fn common(&self) -> &ItemCommon {
        self.as_item().common()
    }

    pub fn common_mut(&mut self) -> &mut ItemCommon {
        self.as_item_mut().common_mut()
    }

    pub fn bounds(&self) -> Rect {
        self.as_item().bounds()
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    pub fn position(&self) -> Point {
        self.as_item().position()
    }

    pub fn set_position(&mut self, position: Point) {
        self.as_item_mut().set_position(position);
    }

    pub fn move_by(&mut self, delta: Vec2) {
        let position = self.position();
        self.set_position(position + delta);
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_item().hit_test(point, tolerance)
    }

    pub fn points(&self) -> Vec<Point> {
        self.as_item().points()
    }

    pub fn set_select_point(&mut self, point: Point) -> bool {
        self.as_item_mut().set_select_point(point)
    }

    pub fn reset_select_point(&mut self) {
        self.as_item_mut().reset_select_point();
    }

    pub fn is_point_selected(&self) -> bool {
        self.as_item().is_point_selected()
    }

    pub fn modify_selected_point(&mut self, point: Point) {
        self.as_item_mut().modify_selected_point(point);
    }

    /// Rotate about `center` by a multiple of 90 degrees.
    pub fn rotate(&mut self, center: Point, degrees: f64) {
        self.as_item_mut().transform(quarter_turn(center, degrees));
    }

    /// Property tree of a top-level item.
    pub fn properties(&self) -> ItemProperties {
        self.as_item().properties_at(Point::ZERO)
    }

    pub fn properties_at(&self, origin: Point) -> ItemProperties {
        self.as_item().properties_at(origin)
    }

    /// Apply a property tree of the same type. Clears the selection flag.
    pub fn set_properties(
        &mut self,
        props: &ItemProperties,
        origin: Point,
        preserve_id: bool,
    ) -> Result<(), PropertiesError> {
        match (self, props) {
            (Item::Line(item), ItemProperties::Line(p)) => item.set_properties(p, origin, preserve_id),
            (Item::Rect(item), ItemProperties::Rect(p)) => item.set_properties(p, origin, preserve_id),
            (Item::Ellipse(item), ItemProperties::Ellipse(p)) => {
                item.set_properties(p, origin, preserve_id)
            }
            (Item::Text(item), ItemProperties::Text(p)) => item.set_properties(p, origin, preserve_id),
            (Item::Group(item), ItemProperties::Group(p)) => {
                item.set_properties(p, origin, preserve_id)?
            }
            (Item::Link(item), ItemProperties::Link(p)) => item.set_properties(p, origin, preserve_id),
            (item, props) => {
                return Err(PropertiesError::TypeMismatch {
                    expected: item.kind(),
                    found: props.kind(),
                });
            }
        }
        Ok(())
    }

    /// Check the item against a property tree.
    ///
    /// Every field the item would write must be present and equal. Groups
    /// compare their members by id.
    pub fn compare_properties(&self, props: &ItemProperties, origin: Point) -> bool {
        match (self, props) {
            (Item::Group(group), ItemProperties::Group(p)) => group.compare_properties(p, origin),
            _ => self.properties_at(origin) == *props,
        }
    }

    /// An item whose control points coincide has collapsed to nothing.
    pub fn is_null_size(&self) -> bool {
        let points = self.points();
        match points.split_first() {
            Some((first, rest)) => rest.iter().any(|p| p == first),
            None => false,
        }
    }

    pub fn is_selected(&self) -> bool {
        self.common().selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.common_mut().selected = selected;
    }

    /// Highlight the item together with everything it contains.
    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.walk_mut(&mut |item| item.common_mut().highlighted = highlighted);
        if let Item::Link(link) = self {
            link.set_parts_highlighted(highlighted);
        }
    }

    /// Push the item's stroke style down to the parts a link draws with.
    pub fn sync_parts_style(&mut self) {
        self.walk_mut(&mut |item| {
            if let Item::Link(link) = item {
                link.sync_parts_style();
            }
        });
    }

    /// Members of a group; empty for every other item.
    pub fn children(&self) -> &[Item] {
        match self {
            Item::Group(group) => group.items(),
            _ => &[],
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Item::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut Group> {
        match self {
            Item::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&Link> {
        match self {
            Item::Link(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_link_mut(&mut self) -> Option<&mut Link> {
        match self {
            Item::Link(l) => Some(l),
            _ => None,
        }
    }

    /// Visit this item and every nested group member, depth first.
    pub fn walk<'a, F: FnMut(&'a Item)>(&'a self, f: &mut F) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    /// Mutable depth-first visit of this item and its group members.
    pub fn walk_mut<F: FnMut(&mut Item)>(&mut self, f: &mut F) {
        f(self);
        if let Item::Group(group) = self {
            for child in group.items_mut() {
                child.walk_mut(f);
            }
        }
    }

    /// Find this item or a nested group member by id.
    pub fn find(&self, id: ItemId) -> Option<&Item> {
        if self.id() == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        if self.id() == id {
            return Some(self);
        }
        match self {
            Item::Group(group) => group.items_mut().iter_mut().find_map(|child| child.find_mut(id)),
            _ => None,
        }
    }
}

impl From<Line> for Item {
    fn from(item: Line) -> Self {
        Item::Line(item)
    }
}

impl From<Rectangle> for Item {
    fn from(item: Rectangle) -> Self {
        Item::Rect(item)
    }
}

impl From<Ellipse> for Item {
    fn from(item: Ellipse) -> Self {
        Item::Ellipse(item)
    }
}

impl From<Text> for Item {
    fn from(item: Text) -> Self {
        Item::Text(item)
    }
}

impl From<Group> for Item {
    fn from(item: Group) -> Self {
        Item::Group(item)
    }
}

impl From<Link> for Item {
    fn from(item: Link) -> Self {
        Item::Link(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;

    #[test]
    fn test_pen_style_names() {
        for style in PenStyle::ALL {
            assert_eq!(PenStyle::from_name(style.name()), style);
        }
        assert_eq!(PenStyle::from_name("zigzag"), PenStyle::Solid);
    }

    #[test]
    fn test_pen_style_cycle() {
        let mut style = PenStyle::Solid;
        for _ in 0..PenStyle::ALL.len() {
            assert_eq!(style.next().prev(), style);
            style = style.next();
        }
        assert_eq!(style, PenStyle::Solid);
    }

    #[test]
    fn test_z_index_is_clamped() {
        let mut common = ItemCommon::default();
        common.set_z_index(42);
        assert_eq!(common.z_index(), MAX_Z_INDEX);
        common.set_z_index(-3);
        assert_eq!(common.z_index(), MIN_Z_INDEX);
        common.set_thickness(0);
        assert_eq!(common.thickness(), MIN_THICKNESS);
    }

    #[test]
    fn test_color_conversion() {
        let color = SerializableColor::new(10, 20, 30, 40);
        let peniko_color: Color = color.into();
        assert_eq!(SerializableColor::from(peniko_color), color);
    }

    #[test]
    fn test_quarter_turn_is_exact() {
        let affine = quarter_turn(Point::new(10.0, 10.0), 90.0);
        assert_eq!(affine * Point::new(20.0, 10.0), Point::new(10.0, 20.0));
        let affine = quarter_turn(Point::new(10.0, 10.0), -90.0);
        assert_eq!(affine * Point::new(20.0, 10.0), Point::new(10.0, 0.0));
        let affine = quarter_turn(Point::new(10.0, 10.0), 360.0);
        assert_eq!(affine * Point::new(20.0, 10.0), Point::new(20.0, 10.0));
    }

    #[test]
    fn test_point_to_segment_dist() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((point_to_segment_dist(Point::new(5.0, 3.0), a, b) - 3.0).abs() < f64::EPSILON);
        assert!((point_to_segment_dist(Point::new(13.0, 4.0), a, b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_factory_dispatches_on_type() {
        let rect = Item::from(Rectangle::new(Point::new(0.0, 0.0), Size::new(10.0, 10.0)));
        let props = rect.properties();
        let copy = Item::from_properties(&props, Point::ZERO, false);
        assert_eq!(copy.kind(), ItemKind::Rect);
        assert_eq!(copy.id(), 0);
    }

    #[test]
    fn test_type_mismatch() {
        let mut line = Item::from(Line::new(Point::ZERO, Point::new(10.0, 0.0)));
        let rect = Item::from(Rectangle::new(Point::ZERO, Size::new(10.0, 10.0)));
        let result = line.set_properties(&rect.properties(), Point::ZERO, false);
        assert!(matches!(
            result,
            Err(PropertiesError::TypeMismatch {
                expected: ItemKind::Line,
                found: ItemKind::Rect
            })
        ));
    }

    #[test]
    fn test_null_size() {
        let line = Item::from(Line::new(Point::new(5.0, 5.0), Point::new(5.0, 5.0)));
        assert!(line.is_null_size());
        let line = Item::from(Line::new(Point::new(5.0, 5.0), Point::new(6.0, 5.0)));
        assert!(!line.is_null_size());
        let group = Item::from(Group::new());
        assert!(!group.is_null_size());
    }
}
