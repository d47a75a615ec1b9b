//! Rectangle item.

use super::{Frame, ItemCommon, ItemKind, ItemTrait, SerializableColor};
use crate::properties::{FrameProperties, ItemProperties};
use kurbo::{Affine, Point, Rect, Size};

/// An axis-aligned rectangle with an optional fill.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    pub(crate) common: ItemCommon,
    pub frame: Frame,
    /// Fill color (None = no fill).
    pub fill_color: Option<SerializableColor>,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(position: Point, size: Size) -> Self {
        Self {
            common: ItemCommon::default(),
            frame: Frame::new(position, size),
            fill_color: None,
        }
    }

    /// Create a rectangle from two corner points.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let frame = Frame::from_rect(Rect::from_points(p1, p2));
        Self::new(frame.pos, frame.size)
    }

    pub(crate) fn from_properties(props: &FrameProperties, origin: Point, preserve_id: bool) -> Self {
        let mut rect = Self::new(origin, Size::ZERO);
        rect.set_properties(props, origin, preserve_id);
        rect
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

impl ItemTrait for Rectangle {
    fn kind(&self) -> ItemKind {
        ItemKind::Rect
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
        self.frame.rect().inflate(tolerance, tolerance).contains(point)
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
        ItemProperties::Rect(FrameProperties {
            common: self.common.to_properties(self.frame.pos - origin),
            rect_size: self.frame.size.into(),
            fill_color: self.fill_color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Item;

    #[test]
    fn test_rectangle_from_corners() {
        let rect = Rectangle::from_corners(Point::new(100.0, 100.0), Point::new(50.0, 50.0));
        assert_eq!(rect.frame.pos, Point::new(50.0, 50.0));
        assert!((rect.frame.size.width - 50.0).abs() < f64::EPSILON);
        assert!((rect.frame.size.height - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test() {
        let rect = Rectangle::new(Point::new(0.0, 0.0), Size::new(100.0, 100.0));
        assert!(rect.hit_test(Point::new(50.0, 50.0), 0.0));
        assert!(!rect.hit_test(Point::new(150.0, 50.0), 0.0));
        assert!(rect.hit_test(Point::new(105.0, 50.0), 10.0)); // Within tolerance
    }

    #[test]
    fn test_bounds() {
        let rect = Rectangle::new(Point::new(10.0, 20.0), Size::new(100.0, 50.0));
        let bounds = rect.bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 110.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_properties_roundtrip() {
        let mut rect = Rectangle::new(Point::new(10.0, 20.0), Size::new(40.0, 30.0));
        rect.fill_color = Some(SerializableColor::new(0, 128, 0, 200));
        rect.common.name = "R1".to_string();
        let props = rect.properties_at(Point::ZERO);

        let mut other = Item::from(Rectangle::new(Point::ZERO, Size::new(1.0, 1.0)));
        other.set_properties(&props, Point::ZERO, false).unwrap();
        let Item::Rect(other) = other else {
            panic!("expected a rectangle");
        };
        assert_eq!(other.frame, rect.frame);
        assert_eq!(other.fill_color, rect.fill_color);
        assert_eq!(other.common.name, "R1");
        // Applying the same tree twice changes nothing.
        let ItemProperties::Rect(p) = &props else {
            panic!("expected rectangle properties");
        };
        let mut again = other.clone();
        again.set_properties(p, Point::ZERO, false);
        assert_eq!(again, other);
    }
}
