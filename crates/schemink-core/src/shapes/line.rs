//! Straight line segment.

use super::{ItemCommon, ItemKind, ItemTrait, point_to_segment_dist};
use crate::properties::{ItemProperties, LineProperties};
use kurbo::{Affine, Point, Rect};

/// A line between two endpoints. Both endpoints are control points.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub(crate) common: ItemCommon,
    /// Start point, also the item position.
    pub p1: Point,
    /// End point.
    pub p2: Point,
    selected_point: Option<usize>,
}

impl Line {
    pub fn new(p1: Point, p2: Point) -> Self {
        Self {
            common: ItemCommon::default(),
            p1,
            p2,
            selected_point: None,
        }
    }

    pub fn length(&self) -> f64 {
        (self.p2 - self.p1).hypot()
    }

    pub(crate) fn from_properties(props: &LineProperties, origin: Point, preserve_id: bool) -> Self {
        let mut line = Self::new(origin, origin);
        line.set_properties(props, origin, preserve_id);
        line
    }

    pub(crate) fn set_properties(&mut self, props: &LineProperties, origin: Point, preserve_id: bool) {
        self.common.apply_properties(&props.common, preserve_id);
        self.selected_point = None;
        self.p1 = origin + props.common.mount_point.to_vec2();
        self.p2 = self.p1 + props.end_point.to_vec2();
    }
}

impl ItemTrait for Line {
    fn kind(&self) -> ItemKind {
        ItemKind::Line
    }

    fn common(&self) -> &ItemCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut ItemCommon {
        &mut self.common
    }

    fn bounds(&self) -> Rect {
        Rect::from_points(self.p1, self.p2)
    }

    fn position(&self) -> Point {
        self.p1
    }

    fn set_position(&mut self, position: Point) {
        let delta = position - self.p1;
        self.p1 = position;
        self.p2 += delta;
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let reach = tolerance + self.common.thickness() as f64 / 2.0;
        point_to_segment_dist(point, self.p1, self.p2) <= reach
    }

    fn points(&self) -> Vec<Point> {
        vec![self.p1, self.p2]
    }

    fn set_select_point(&mut self, point: Point) -> bool {
        self.selected_point = if point == self.p1 {
            Some(0)
        } else if point == self.p2 {
            Some(1)
        } else {
            None
        };
        self.selected_point.is_some()
    }

    fn reset_select_point(&mut self) {
        self.selected_point = None;
    }

    fn is_point_selected(&self) -> bool {
        self.selected_point.is_some()
    }

    fn modify_selected_point(&mut self, point: Point) {
        match self.selected_point {
            Some(0) => self.p1 = point,
            Some(_) => self.p2 = point,
            None => {}
        }
    }

    fn transform(&mut self, affine: Affine) {
        self.p1 = affine * self.p1;
        self.p2 = affine * self.p2;
    }

    fn properties_at(&self, origin: Point) -> ItemProperties {
        ItemProperties::Line(LineProperties {
            common: self.common.to_properties(self.p1 - origin),
            end_point: (self.p2 - self.p1).into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Item;

    #[test]
    fn test_line_bounds() {
        let line = Line::new(Point::new(30.0, 10.0), Point::new(10.0, 40.0));
        assert_eq!(line.bounds(), Rect::new(10.0, 10.0, 30.0, 40.0));
        assert!((line.length() - (20.0f64.powi(2) + 30.0f64.powi(2)).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_hit_test() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(line.hit_test(Point::new(50.0, 2.0), 3.0));
        assert!(!line.hit_test(Point::new(50.0, 10.0), 3.0));
        assert!(!line.hit_test(Point::new(110.0, 0.0), 3.0));
    }

    #[test]
    fn test_move_keeps_direction() {
        let mut line = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 20.0));
        line.set_position(Point::new(5.0, 5.0));
        assert_eq!(line.p1, Point::new(5.0, 5.0));
        assert_eq!(line.p2, Point::new(15.0, 25.0));
    }

    #[test]
    fn test_endpoint_edit() {
        let mut line = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert!(!line.set_select_point(Point::new(5.0, 0.0)));
        assert!(line.set_select_point(Point::new(10.0, 0.0)));
        line.modify_selected_point(Point::new(10.0, 30.0));
        assert_eq!(line.p2, Point::new(10.0, 30.0));
        assert_eq!(line.p1, Point::ZERO);
        line.reset_select_point();
        assert!(!line.is_point_selected());
    }

    #[test]
    fn test_properties_roundtrip() {
        let mut line = Line::new(Point::new(10.0, 20.0), Point::new(50.0, 20.0));
        line.common.id = 4;
        line.common.set_thickness(3);
        let props = line.properties_at(Point::ZERO);
        let ItemProperties::Line(p) = &props else {
            panic!("expected line properties");
        };
        assert_eq!(p.end_point.x, 40.0);

        let copy = Item::from_properties(&props, Point::ZERO, true);
        assert!(copy.compare_properties(&props, Point::ZERO));
        assert_eq!(copy, Item::Line(line));
    }

    #[test]
    fn test_rotate() {
        let mut line = Item::from(Line::new(Point::new(0.0, 0.0), Point::new(20.0, 0.0)));
        line.rotate(Point::new(10.0, 0.0), 90.0);
        let Item::Line(line) = line else {
            panic!("expected a line");
        };
        assert_eq!(line.p1, Point::new(10.0, -10.0));
        assert_eq!(line.p2, Point::new(10.0, 10.0));
    }
}
