//! Axis-aligned frame shared by rectangles, ellipses and text.

use kurbo::{Affine, Point, Rect, Size};

/// Position and size of a box-shaped item, plus the grabbed corner.
///
/// Corners are ordered top-left, top-right, bottom-left, bottom-right; the
/// top-left corner is the item position.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub pos: Point,
    pub size: Size,
    selected_corner: Option<usize>,
}

impl Frame {
    pub fn new(pos: Point, size: Size) -> Self {
        Self {
            pos,
            size,
            selected_corner: None,
        }
    }

    /// Frame covering `rect`, normalized to a non-negative size.
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.origin(), rect.size())
    }

    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.pos, self.size)
    }

    pub fn corners(&self) -> [Point; 4] {
        let Rect { x0, y0, x1, y1 } = self.rect();
        [
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x0, y1),
            Point::new(x1, y1),
        ]
    }

    pub fn select_corner(&mut self, point: Point) -> bool {
        self.selected_corner = self.corners().iter().position(|c| *c == point);
        self.selected_corner.is_some()
    }

    pub fn reset_corner(&mut self) {
        self.selected_corner = None;
    }

    pub fn is_corner_selected(&self) -> bool {
        self.selected_corner.is_some()
    }

    /// Drag the grabbed corner while the diagonally opposite corner stays put.
    ///
    /// Dragging past the opposite corner flips the frame instead of producing
    /// a negative size; the grab follows the pointer to the corner it now sits on.
    pub fn drag_corner(&mut self, point: Point) {
        let Some(index) = self.selected_corner else {
            return;
        };
        let fixed = self.corners()[3 - index];
        let rect = Rect::from_points(fixed, point);
        self.pos = rect.origin();
        self.size = rect.size();
        self.selected_corner = self.corners().iter().position(|c| *c == point);
    }

    /// Transform the frame and take the axis-aligned box of the result.
    pub fn transform(&mut self, affine: Affine) {
        let [top_left, _, _, bottom_right] = self.corners();
        let rect = Rect::from_points(affine * top_left, affine * bottom_right);
        self.pos = rect.origin();
        self.size = rect.size();
    }
}
