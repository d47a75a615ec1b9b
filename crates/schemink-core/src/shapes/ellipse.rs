//! Ellipse item.

use super::{Frame, ItemCommon, ItemKind, ItemTrait, SerializableColor};
use crate::properties::{FrameProperties, ItemProperties};
use kurbo::{Affine, Point, Rect, Size};

/// An axis-aligned ellipse inscribed in its frame, with an optional fill.
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipse {
    pub(crate) common: ItemCommon,
    pub frame: Frame,
    /// Fill color (None = no fill).
    pub fill_color: Option<SerializableColor>,
}

impl Ellipse {
    /// Create a new ellipse inscribed in the given frame.
    pub fn new(position: Point, size: Size) -> Self {
        Self {
            common: ItemCommon::default(),
            frame: Frame::new(position, size),
            fill_color: None,
        }
    }

    /// Create an ellipse whose frame spans two corner points.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let frame = Frame::from_rect(Rect::from_points(p1, p2));
        Self::new(frame.pos, frame.size)
    }

    pub(crate) fn from_properties(props: &FrameProperties, origin: Point, preserve_id: bool) -> Self {
        let mut ellipse = Self::new(origin, Size::ZERO);
        ellipse.set_properties(props, origin, preserve_id);
        ellipse
    }

    pub(crate) fn set_properties(&mut self, props: &FrameProperties, origin: Point, preserve_id: bool) {
        self.common.apply_properties(&props.common, preserve_id);
        self.frame = Frame::new(
            origin + props.common.mount_point.to_vec2(),
            props.rect_size.into(),
        );
        self.fill_color = props.fill_color;
    }
}

impl ItemTrait for Ellipse {
    fn kind(&self) -> ItemKind {
        ItemKind::Ellipse
    }

    fn common(&self) -> &ItemCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut ItemCommon {
        &mut self.common
    }

    fn bounds(&self) -> Rect {
        self.frame.rect()
    }

    fn position(&self) -> Point {
        self.frame.pos
    }

    fn set_position(&mut self, position: Point) {
        self.frame.pos = position;
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let rect = self.frame.rect();
        let rx = rect.width() / 2.0 + tolerance;
        let ry = rect.height() / 2.0 + tolerance;
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let d = point - rect.center();
        (d.x / rx).powi(2) + (d.y / ry).powi(2) <= 1.0
    }

    fn points(&self) -> Vec<Point> {
        self.frame.corners().to_vec()
    }

    fn set_select_point(&mut self, point: Point) -> bool {
        self.frame.select_corner(point)
    }

    fn reset_select_point(&mut self) {
        self.frame.reset_corner();
    }

    fn is_point_selected(&self) -> bool {
        self.frame.is_corner_selected()
    }

    fn modify_selected_point(&mut self, point: Point) {
        self.frame.drag_corner(point);
    }

    fn transform(&mut self, affine: Affine) {
        self.frame.transform(affine);
    }

    fn properties_at(&self, origin: Point) -> ItemProperties {
        ItemProperties::Ellipse(FrameProperties {
            common: self.common.to_properties(self.frame.pos - origin),
            rect_size: self.frame.size.into(),
            fill_color: self.fill_color,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Item, quarter_turn};

    #[test]
    fn test_ellipse_hit_test() {
        let ellipse = Ellipse::new(Point::new(0.0, 0.0), Size::new(100.0, 50.0));
        assert!(ellipse.hit_test(Point::new(50.0, 25.0), 0.0));
        assert!(ellipse.hit_test(Point::new(99.0, 25.0), 0.0));
        // Bounding box corner lies outside the ellipse.
        assert!(!ellipse.hit_test(Point::new(2.0, 2.0), 0.0));
    }

    #[test]
    fn test_control_points() {
        let ellipse = Ellipse::new(Point::new(10.0, 10.0), Size::new(20.0, 10.0));
        assert_eq!(
            ellipse.points(),
            vec![
                Point::new(10.0, 10.0),
                Point::new(30.0, 10.0),
                Point::new(10.0, 20.0),
                Point::new(30.0, 20.0),
            ]
        );
    }

    #[test]
    fn test_bottom_right_past_origin_stays_normalized() {
        let mut ellipse = Ellipse::new(Point::new(10.0, 10.0), Size::new(20.0, 20.0));
        assert!(ellipse.set_select_point(Point::new(30.0, 30.0)));
        ellipse.modify_selected_point(Point::new(0.0, 40.0));
        assert_eq!(ellipse.frame.pos, Point::new(0.0, 10.0));
        assert_eq!(ellipse.frame.size, Size::new(10.0, 30.0));
        assert!(ellipse.frame.size.width >= 0.0 && ellipse.frame.size.height >= 0.0);
    }

    #[test]
    fn test_rotation() {
        let mut ellipse = Ellipse::new(Point::new(0.0, 0.0), Size::new(40.0, 20.0));
        ellipse.transform(quarter_turn(Point::new(0.0, 0.0), 90.0));
        assert_eq!(ellipse.frame.pos, Point::new(-20.0, 0.0));
        assert_eq!(ellipse.frame.size, Size::new(20.0, 40.0));
    }

    #[test]
    fn test_properties_roundtrip() {
        let mut ellipse = Ellipse::new(Point::new(5.0, 5.0), Size::new(6.0, 6.0));
        ellipse.fill_color = Some(SerializableColor::black());
        ellipse.common.set_z_index(4);
        let props = ellipse.properties_at(Point::new(5.0, 0.0));
        let copy = Item::from_properties(&props, Point::new(5.0, 0.0), true);
        assert!(copy.compare_properties(&props, Point::new(5.0, 0.0)));
        assert_eq!(copy, Item::Ellipse(ellipse));
    }
}
