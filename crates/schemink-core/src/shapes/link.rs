//! Link points: one end of a logical connection.

use super::{Ellipse, Frame, ItemCommon, ItemKind, ItemTrait, Line, Text};
use crate::ids::{ConnectionId, ItemId};
use crate::properties::{ConnectionProperties, ItemProperties, LinkProperties};
use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Diameter of the arrow mark at the end of the link line.
pub const ARROW_SIZE: f64 = 6.0;

/// Grid the default arrow offset and the label geometry are measured in.
pub const LABEL_GRID: f64 = 20.0;

/// Which way the arrow points from the link position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDirection {
    Right,
    Left,
    Top,
    Bottom,
}

/// A link point, drawn as a line ending in a small filled circle plus an
/// address label.
///
/// The three parts are owned by the link. A connected link also knows the
/// id of its connection and of the link at the other end; the connection
/// itself lives in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub(crate) common: ItemCommon,
    line: Line,
    arrow: Ellipse,
    label: Text,
    connection: Option<ConnectionId>,
    remote: Option<ItemId>,
}

impl Link {
    /// Create a link at `pos` pointing one label grid step to the right.
    pub fn new(pos: Point) -> Self {
        Self::with_arrow(pos, pos + Vec2::new(LABEL_GRID, 0.0))
    }

    pub fn with_arrow(pos: Point, arrow_pos: Point) -> Self {
        let mut link = Self {
            common: ItemCommon::default(),
            line: Line::new(pos, pos),
            arrow: Ellipse::new(pos, Size::new(ARROW_SIZE, ARROW_SIZE)),
            label: Text::new(pos, Size::ZERO, String::new()),
            connection: None,
            remote: None,
        };
        link.set_arrow_pos(arrow_pos);
        link.sync_parts_style();
        link
    }

    pub fn arrow_pos(&self) -> Point {
        self.line.p2
    }

    pub fn set_arrow_pos(&mut self, arrow_pos: Point) {
        let half = ARROW_SIZE / 2.0;
        self.arrow.frame = Frame::new(
            arrow_pos - Vec2::new(half, half),
            Size::new(ARROW_SIZE, ARROW_SIZE),
        );
        self.line.p2 = arrow_pos;
        self.layout_label();
    }

    /// Direction of the arrow. A link whose arrow sits on its position
    /// counts as pointing right.
    pub fn direction(&self) -> LinkDirection {
        let (from, to) = (self.line.p1, self.line.p2);
        if from.x < to.x {
            LinkDirection::Right
        } else if from.x > to.x {
            LinkDirection::Left
        } else if from.y > to.y {
            LinkDirection::Top
        } else if from.y < to.y {
            LinkDirection::Bottom
        } else {
            LinkDirection::Right
        }
    }

    pub fn connection(&self) -> Option<ConnectionId> {
        self.connection
    }

    /// The link at the other end of the connection.
    pub fn remote(&self) -> Option<ItemId> {
        self.remote
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub(crate) fn set_connection(&mut self, connection: Option<(ConnectionId, ItemId)>) {
        self.connection = connection.map(|(id, _)| id);
        self.remote = connection.map(|(_, remote)| remote);
        if connection.is_none() {
            self.set_label(String::new());
        }
    }

    pub fn line(&self) -> &Line {
        &self.line
    }

    pub fn arrow(&self) -> &Ellipse {
        &self.arrow
    }

    pub fn label(&self) -> &Text {
        &self.label
    }

    /// Replace the label text and place it next to the arrow.
    pub fn set_label(&mut self, text: String) {
        self.label.text = text;
        self.layout_label();
    }

    fn layout_label(&mut self) {
        let arrow = self.arrow_pos();
        if self.label.is_empty() {
            self.label.frame = Frame::new(arrow, Size::ZERO);
            return;
        }
        let (offset, size) = match self.direction() {
            LinkDirection::Top => (
                Vec2::new(-LABEL_GRID / 2.0, -LABEL_GRID * 3.0),
                Size::new(LABEL_GRID, LABEL_GRID * 3.0),
            ),
            LinkDirection::Bottom => (
                Vec2::new(-LABEL_GRID / 2.0, 0.0),
                Size::new(LABEL_GRID, LABEL_GRID * 3.0),
            ),
            LinkDirection::Left => (
                Vec2::new(-LABEL_GRID * 3.0, -LABEL_GRID / 2.0),
                Size::new(LABEL_GRID * 3.0, LABEL_GRID),
            ),
            LinkDirection::Right => (
                Vec2::new(0.0, -LABEL_GRID / 2.0),
                Size::new(LABEL_GRID * 3.0, LABEL_GRID),
            ),
        };
        self.label.frame = Frame::new(arrow + offset, size);
    }

    /// Copy the link's stroke onto its parts; the arrow is filled with it.
    pub(crate) fn sync_parts_style(&mut self) {
        let common = &self.common;
        for part in [
            &mut self.line.common,
            &mut self.arrow.common,
            &mut self.label.common,
        ] {
            part.color = common.color;
            part.pen_style = common.pen_style;
            part.set_thickness(common.thickness());
            part.set_z_index(common.z_index());
        }
        self.arrow.fill_color = Some(common.color);
    }

    pub(crate) fn parts_common_mut(&mut self) -> [&mut ItemCommon; 3] {
        [
            &mut self.line.common,
            &mut self.arrow.common,
            &mut self.label.common,
        ]
    }

    pub(crate) fn set_parts_highlighted(&mut self, highlighted: bool) {
        for part in self.parts_common_mut() {
            part.highlighted = highlighted;
        }
    }

    pub(crate) fn from_properties(props: &LinkProperties, origin: Point, preserve_id: bool) -> Self {
        let mut link = Self::new(origin);
        link.set_properties(props, origin, preserve_id);
        link
    }

    /// Apply position and style. The connection is managed by the scene.
    pub(crate) fn set_properties(&mut self, props: &LinkProperties, origin: Point, preserve_id: bool) {
        self.common.apply_properties(&props.common, preserve_id);
        let pos = origin + props.common.mount_point.to_vec2();
        self.line.p1 = pos;
        self.set_arrow_pos(pos + props.arrow_point.to_vec2());
        self.sync_parts_style();
    }
}

impl ItemTrait for Link {
    fn kind(&self) -> ItemKind {
        ItemKind::Link
    }

    fn common(&self) -> &ItemCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut ItemCommon {
        &mut self.common
    }

    fn bounds(&self) -> Rect {
        let bounds = self.line.bounds().union(self.arrow.bounds());
        if self.label.is_empty() {
            bounds
        } else {
            bounds.union(self.label.bounds())
        }
    }

    fn position(&self) -> Point {
        self.line.p1
    }

    fn set_position(&mut self, position: Point) {
        let delta = self.arrow_pos() - self.line.p1;
        self.line.p1 = position;
        self.set_arrow_pos(position + delta);
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.line.hit_test(point, tolerance) || self.arrow.hit_test(point, tolerance)
    }

    fn transform(&mut self, affine: Affine) {
        // The label is re-laid out rather than rotated.
        self.line.transform(affine);
        self.set_arrow_pos(self.line.p2);
    }

    fn properties_at(&self, origin: Point) -> ItemProperties {
        ItemProperties::Link(LinkProperties {
            common: self.common.to_properties(self.line.p1 - origin),
            arrow_point: (self.line.p2 - self.line.p1).into(),
            connection: self
                .connection
                .zip(self.remote)
                .map(|(id, remote_id)| ConnectionProperties { id, remote_id }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Item, SerializableColor, quarter_turn};

    #[test]
    fn test_default_arrow() {
        let link = Link::new(Point::new(40.0, 40.0));
        assert_eq!(link.arrow_pos(), Point::new(60.0, 40.0));
        assert_eq!(link.direction(), LinkDirection::Right);
        assert_eq!(link.arrow().frame.pos, Point::new(57.0, 37.0));
        assert_eq!(link.arrow().frame.size, Size::new(6.0, 6.0));
    }

    #[test]
    fn test_directions() {
        let origin = Point::new(0.0, 0.0);
        assert_eq!(
            Link::with_arrow(origin, Point::new(-20.0, 0.0)).direction(),
            LinkDirection::Left
        );
        assert_eq!(
            Link::with_arrow(origin, Point::new(0.0, -20.0)).direction(),
            LinkDirection::Top
        );
        assert_eq!(
            Link::with_arrow(origin, Point::new(0.0, 20.0)).direction(),
            LinkDirection::Bottom
        );
    }

    #[test]
    fn test_move_keeps_arrow_offset() {
        let mut link = Link::with_arrow(Point::new(0.0, 0.0), Point::new(0.0, 40.0));
        link.set_position(Point::new(100.0, 100.0));
        assert_eq!(link.arrow_pos(), Point::new(100.0, 140.0));
        assert_eq!(link.arrow().frame.pos, Point::new(97.0, 137.0));
    }

    #[test]
    fn test_empty_label_is_not_in_bounds() {
        let mut link = Link::new(Point::new(0.0, 0.0));
        assert_eq!(link.bounds(), Rect::new(0.0, -3.0, 23.0, 3.0));
        link.set_label("1(1/A1)".to_string());
        assert_eq!(link.label().frame.pos, Point::new(20.0, -10.0));
        assert_eq!(link.bounds(), Rect::new(0.0, -10.0, 80.0, 10.0));
    }

    #[test]
    fn test_label_layout_follows_direction() {
        let mut link = Link::with_arrow(Point::new(0.0, 0.0), Point::new(0.0, -20.0));
        link.set_label("7".to_string());
        assert_eq!(link.label().frame.pos, Point::new(-10.0, -80.0));
        assert_eq!(link.label().frame.size, Size::new(20.0, 60.0));

        link.transform(quarter_turn(Point::new(0.0, 0.0), 90.0));
        assert_eq!(link.direction(), LinkDirection::Right);
        assert_eq!(link.label().frame.pos, Point::new(20.0, -10.0));
        assert_eq!(link.label().frame.size, Size::new(60.0, 20.0));
    }

    #[test]
    fn test_disconnect_clears_label() {
        let mut link = Link::new(Point::ZERO);
        link.set_connection(Some((3, 8)));
        link.set_label("3(1/A1)".to_string());
        assert_eq!(link.remote(), Some(8));
        link.set_connection(None);
        assert!(!link.is_connected());
        assert!(link.label().is_empty());
    }

    #[test]
    fn test_properties_roundtrip() {
        let mut link = Link::with_arrow(Point::new(20.0, 20.0), Point::new(20.0, 60.0));
        link.common.color = SerializableColor::rgb(200, 0, 0);
        link.sync_parts_style();
        let props = link.properties_at(Point::ZERO);
        let ItemProperties::Link(p) = &props else {
            panic!("expected link properties");
        };
        assert_eq!(p.arrow_point.y, 40.0);

        let copy = Item::from_properties(&props, Point::ZERO, false);
        assert!(copy.compare_properties(&props, Point::ZERO));
        let copy = copy.as_link().unwrap();
        assert_eq!(copy.arrow_pos(), link.arrow_pos());
        assert_eq!(copy.arrow().fill_color, Some(SerializableColor::rgb(200, 0, 0)));
    }

    #[test]
    fn test_connection_serialized() {
        let mut link = Link::new(Point::ZERO);
        link.common.id = 4;
        link.set_connection(Some((2, 9)));
        let value = serde_json::to_value(link.properties_at(Point::ZERO)).unwrap();
        assert_eq!(value["connection"]["id"], 2);
        assert_eq!(value["connection"]["remoteId"], 9);
    }
}
