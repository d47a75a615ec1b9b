//! Selection helpers: control-point markers, the drag rectangle, the
//! selection center and the crosshair overlay.

use crate::ids::ItemId;
use crate::scene::Scene;
use crate::shapes::Item;
use crate::snap::snap_point;
use kurbo::{Point, Rect, Size};

/// Edge length of a control-point marker.
pub const MARK_SIZE: f64 = 8.0;

/// A control point of an item, drawn as a small square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    /// Control point in scene coordinates.
    pub position: Point,
    /// Item the point belongs to.
    pub item: ItemId,
}

impl Marker {
    pub fn new(position: Point, item: ItemId) -> Self {
        Self { position, item }
    }

    /// Square centered on the control point.
    pub fn rect(&self) -> Rect {
        Rect::from_center_size(self.position, Size::new(MARK_SIZE, MARK_SIZE))
    }

    pub fn hit_test(&self, point: Point) -> bool {
        self.rect().contains(point)
    }
}

/// Markers for every control point of an item.
pub fn markers(item: &Item) -> Vec<Marker> {
    let id = item.id();
    item.points()
        .into_iter()
        .map(|p| Marker::new(p, id))
        .collect()
}

/// Rubber-band rectangle spanned while drag-selecting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub start: Point,
    pub current: Point,
}

impl SelectionRect {
    pub fn new(start: Point) -> Self {
        Self {
            start,
            current: start,
        }
    }

    /// Normalized rectangle between the press point and the pointer.
    pub fn to_rect(&self) -> Rect {
        Rect::from_points(self.start, self.current)
    }

    /// True until the pointer has left the press row and column.
    pub fn is_degenerate(&self) -> bool {
        self.start.x == self.current.x || self.start.y == self.current.y
    }
}

/// Union of the bounding boxes of the selected top-level items.
pub fn selection_bounds(scene: &Scene) -> Option<Rect> {
    scene
        .selected_items()
        .map(Item::bounds)
        .reduce(|acc, b| acc.union(b))
}

/// Snapped center of the selection, the pivot for rotation and paste.
pub fn selected_center(scene: &Scene) -> Option<Point> {
    let config = scene.config();
    selection_bounds(scene).map(|b| snap_point(b.center(), config.snap_mode, config.grid_step))
}

/// Crosshair cursor shown while drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crosshair {
    pub position: Point,
}

impl Crosshair {
    pub fn new(position: Point) -> Self {
        Self { position }
    }

    /// Vertical and horizontal hair, spanning `extent`.
    pub fn lines(&self, extent: Rect) -> [kurbo::Line; 2] {
        let p = self.position;
        [
            kurbo::Line::new((p.x, extent.y0), (p.x, extent.y1)),
            kurbo::Line::new((extent.x0, p.y), (extent.x1, p.y)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Line, Rectangle};

    #[test]
    fn test_marker_geometry() {
        let marker = Marker::new(Point::new(10.0, 10.0), 1);
        assert_eq!(marker.rect(), Rect::new(6.0, 6.0, 14.0, 14.0));
        assert!(marker.hit_test(Point::new(13.0, 7.0)));
        assert!(!marker.hit_test(Point::new(15.0, 10.0)));
    }

    #[test]
    fn test_markers_follow_control_points() {
        let line: Item = Line::new(Point::new(0.0, 0.0), Point::new(30.0, 0.0)).into();
        let marks = markers(&line);
        assert_eq!(marks.len(), 2);
        assert_eq!(marks[1].position, Point::new(30.0, 0.0));

        let rect: Item = Rectangle::new(Point::ZERO, Size::new(10.0, 10.0)).into();
        assert_eq!(markers(&rect).len(), 4);
    }

    #[test]
    fn test_selection_rect_normalizes() {
        let mut sel = SelectionRect::new(Point::new(50.0, 50.0));
        assert!(sel.is_degenerate());
        sel.current = Point::new(10.0, 80.0);
        assert!(!sel.is_degenerate());
        assert_eq!(sel.to_rect(), Rect::new(10.0, 50.0, 50.0, 80.0));
    }

    #[test]
    fn test_selected_center_is_snapped() {
        let mut scene = Scene::default();
        assert_eq!(selected_center(&scene), None);

        let a = scene.add_item(Rectangle::new(Point::ZERO, Size::new(20.0, 20.0)).into());
        let b = scene.add_item(Rectangle::new(Point::new(30.0, 0.0), Size::new(13.0, 20.0)).into());
        scene.select(a);
        assert_eq!(selected_center(&scene), Some(Point::new(10.0, 10.0)));
        scene.select(b);
        // Center of (0,0)-(43,20) is (21.5,10).
        assert_eq!(selected_center(&scene), Some(Point::new(20.0, 10.0)));
        assert_eq!(selection_bounds(&scene), Some(Rect::new(0.0, 0.0, 43.0, 20.0)));
    }

    #[test]
    fn test_crosshair_lines() {
        let cursor = Crosshair::new(Point::new(20.0, 30.0));
        let [v, h] = cursor.lines(Rect::new(0.0, 0.0, 100.0, 200.0));
        assert_eq!(v.p0, Point::new(20.0, 0.0));
        assert_eq!(v.p1, Point::new(20.0, 200.0));
        assert_eq!(h.p1, Point::new(100.0, 30.0));
    }
}
