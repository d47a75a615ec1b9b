//! Text item.

use super::{Frame, ItemCommon, ItemKind, ItemTrait};
use crate::properties::{ItemProperties, TextProperties};
use kurbo::{Affine, Point, Rect, Size};

/// A text block laid out inside a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub(crate) common: ItemCommon,
    pub frame: Frame,
    pub text: String,
}

impl Text {
    pub fn new(position: Point, size: Size, text: impl Into<String>) -> Self {
        Self {
            common: ItemCommon::default(),
            frame: Frame::new(position, size),
            text: text.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub(crate) fn from_properties(props: &TextProperties, origin: Point, preserve_id: bool) -> Self {
        let mut text = Self::new(origin, Size::ZERO, String::new());
        text.set_properties(props, origin, preserve_id);
        text
    }

    pub(crate) fn set_properties(&mut self, props: &TextProperties, origin: Point, preserve_id: bool) {
        self.common.apply_properties(&props.common, preserve_id);
        self.frame = Frame::new(
            origin + props.common.mount_point.to_vec2(),
            props.rect_size.into(),
        );
        self.text = props.text.clone();
    }
}

impl ItemTrait for Text {
    fn kind(&self) -> ItemKind {
        ItemKind::Text
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
        ItemProperties::Text(TextProperties {
            common: self.common.to_properties(self.frame.pos - origin),
            rect_size: self.frame.size.into(),
            text: self.text.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Item;

    #[test]
    fn test_text_properties() {
        let text = Text::new(Point::new(20.0, 40.0), Size::new(60.0, 20.0), "R12");
        let props = text.properties_at(Point::ZERO);
        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["text"], "R12");

        let copy = Item::from_properties(&props, Point::ZERO, false);
        let Item::Text(copy) = copy else {
            panic!("expected text");
        };
        assert_eq!(copy.text, "R12");
        assert_eq!(copy.frame, text.frame);
    }

    #[test]
    fn test_resize_from_corner() {
        let mut text = Text::new(Point::new(0.0, 0.0), Size::new(60.0, 20.0), "label");
        assert!(text.set_select_point(Point::new(60.0, 0.0)));
        text.modify_selected_point(Point::new(80.0, 0.0));
        assert_eq!(text.frame.size, Size::new(80.0, 20.0));
        assert!(!text.is_empty());
    }
}
