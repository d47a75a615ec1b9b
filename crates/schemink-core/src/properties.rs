//! Property trees: the serialized form of items.
//!
//! The same trees are used for documents, the clipboard and undo snapshots.
//! Field names are stable (`id`, `type`, `name`, `mountPoint`, `penStyle`,
//! `color`, `zIndex`, `thickness`, plus per-type fields) so files written by
//! older editors keep loading.

use crate::error::PropertiesError;
use crate::ids::{ConnectionId, ItemId};
use crate::shapes::{ItemKind, PenStyle, SerializableColor};
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// A point or offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointProperties {
    pub x: f64,
    pub y: f64,
}

impl PointProperties {
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl From<Vec2> for PointProperties {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Point> for PointProperties {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// Width and height of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeProperties {
    pub w: f64,
    pub h: f64,
}

impl From<Size> for SizeProperties {
    fn from(s: Size) -> Self {
        Self {
            w: s.width,
            h: s.height,
        }
    }
}

impl From<SizeProperties> for Size {
    fn from(s: SizeProperties) -> Self {
        Size::new(s.w, s.h)
    }
}

/// Stroke color. Alpha is not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbProperties {
    #[serde(rename = "R")]
    pub r: u8,
    #[serde(rename = "G")]
    pub g: u8,
    #[serde(rename = "B")]
    pub b: u8,
}

impl From<SerializableColor> for RgbProperties {
    fn from(c: SerializableColor) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
        }
    }
}

impl From<RgbProperties> for SerializableColor {
    fn from(c: RgbProperties) -> Self {
        SerializableColor::rgb(c.r, c.g, c.b)
    }
}

/// Fill color with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbaProperties {
    #[serde(rename = "R")]
    pub r: u8,
    #[serde(rename = "G")]
    pub g: u8,
    #[serde(rename = "B")]
    pub b: u8,
    #[serde(rename = "A", default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

/// `fillColor` is either the string `"None"` or an RGBA object.
mod fill_color {
    use super::RgbaProperties;
    use crate::shapes::SerializableColor;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    const NO_FILL: &str = "None";

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Named(String),
        Rgba(RgbaProperties),
    }

    pub fn serialize<S: Serializer>(
        fill: &Option<SerializableColor>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match fill {
            None => serializer.serialize_str(NO_FILL),
            Some(c) => RgbaProperties {
                r: c.r,
                g: c.g,
                b: c.b,
                a: c.a,
            }
            .serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<SerializableColor>, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Named(name) if name == NO_FILL => Ok(None),
            Repr::Named(name) => Err(D::Error::custom(format!("unknown fill color {name:?}"))),
            Repr::Rgba(c) => Ok(Some(SerializableColor::new(c.r, c.g, c.b, c.a))),
        }
    }
}

/// Fields shared by every item type.
///
/// Style fields are optional on input: a tree without them leaves the
/// item's current style alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonProperties {
    #[serde(default)]
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    /// Position relative to the parent item, or absolute for top-level items.
    pub mount_point: PointProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pen_style: Option<PenStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<RgbProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineProperties {
    #[serde(flatten)]
    pub common: CommonProperties,
    /// Second endpoint relative to the mount point.
    pub end_point: PointProperties,
}

/// Rectangles and ellipses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameProperties {
    #[serde(flatten)]
    pub common: CommonProperties,
    pub rect_size: SizeProperties,
    #[serde(with = "fill_color", default)]
    pub fill_color: Option<SerializableColor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProperties {
    #[serde(flatten)]
    pub common: CommonProperties,
    pub rect_size: SizeProperties,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupProperties {
    #[serde(flatten)]
    pub common: CommonProperties,
    #[serde(default)]
    pub graphics_objects: Vec<ItemProperties>,
}

/// The far end of a link's connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionProperties {
    pub id: ConnectionId,
    pub remote_id: ItemId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkProperties {
    #[serde(flatten)]
    pub common: CommonProperties,
    /// Arrow end relative to the mount point.
    pub arrow_point: PointProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionProperties>,
}

/// Property tree of one item, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ItemProperties {
    #[serde(rename = "line")]
    Line(LineProperties),
    #[serde(rename = "rectangle")]
    Rect(FrameProperties),
    #[serde(rename = "ellipse")]
    Ellipse(FrameProperties),
    #[serde(rename = "text")]
    Text(TextProperties),
    #[serde(rename = "group")]
    Group(GroupProperties),
    #[serde(rename = "link")]
    Link(LinkProperties),
}

impl ItemProperties {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemProperties::Line(_) => ItemKind::Line,
            ItemProperties::Rect(_) => ItemKind::Rect,
            ItemProperties::Ellipse(_) => ItemKind::Ellipse,
            ItemProperties::Text(_) => ItemKind::Text,
            ItemProperties::Group(_) => ItemKind::Group,
            ItemProperties::Link(_) => ItemKind::Link,
        }
    }

    pub fn common(&self) -> &CommonProperties {
        match self {
            ItemProperties::Line(p) => &p.common,
            ItemProperties::Rect(p) | ItemProperties::Ellipse(p) => &p.common,
            ItemProperties::Text(p) => &p.common,
            ItemProperties::Group(p) => &p.common,
            ItemProperties::Link(p) => &p.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut CommonProperties {
        match self {
            ItemProperties::Line(p) => &mut p.common,
            ItemProperties::Rect(p) | ItemProperties::Ellipse(p) => &mut p.common,
            ItemProperties::Text(p) => &mut p.common,
            ItemProperties::Group(p) => &mut p.common,
            ItemProperties::Link(p) => &mut p.common,
        }
    }

    pub fn id(&self) -> ItemId {
        self.common().id
    }

    /// Ids of this tree and every nested group member, depth first.
    pub fn collect_ids(&self, out: &mut Vec<ItemId>) {
        out.push(self.id());
        if let ItemProperties::Group(group) = self {
            for child in &group.graphics_objects {
                child.collect_ids(out);
            }
        }
    }

    /// Visit this tree and every nested group member, depth first.
    pub fn walk<'a, F: FnMut(&'a ItemProperties)>(&'a self, f: &mut F) {
        f(self);
        if let ItemProperties::Group(group) = self {
            for child in &group.graphics_objects {
                child.walk(f);
            }
        }
    }

    /// Parse a JSON array of property trees.
    pub fn list_from_json(json: &str) -> Result<Vec<ItemProperties>, PropertiesError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode property trees as a JSON array.
    pub fn list_to_json(items: &[ItemProperties]) -> Result<String, PropertiesError> {
        Ok(serde_json::to_string(items)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn common(id: ItemId) -> CommonProperties {
        CommonProperties {
            id,
            name: String::new(),
            mount_point: PointProperties { x: 10.0, y: 20.0 },
            pen_style: Some(PenStyle::DashLine),
            color: Some(RgbProperties { r: 255, g: 0, b: 0 }),
            z_index: Some(2),
            thickness: Some(3),
        }
    }

    #[test]
    fn test_field_names() {
        let props = ItemProperties::Rect(FrameProperties {
            common: common(7),
            rect_size: SizeProperties { w: 40.0, h: 20.0 },
            fill_color: None,
        });
        let value = serde_json::to_value(&props).unwrap();
        assert_eq!(value["type"], "rectangle");
        assert_eq!(value["id"], 7);
        assert_eq!(value["mountPoint"]["x"], 10.0);
        assert_eq!(value["penStyle"], "dashLine");
        assert_eq!(value["color"]["R"], 255);
        assert_eq!(value["zIndex"], 2);
        assert_eq!(value["thickness"], 3);
        assert_eq!(value["rectSize"]["w"], 40.0);
        assert_eq!(value["fillColor"], "None");
    }

    #[test]
    fn test_fill_color_object() {
        let json = r#"{"type":"ellipse","id":3,"name":"","mountPoint":{"x":0,"y":0},
            "rectSize":{"w":6,"h":6},"fillColor":{"R":1,"G":2,"B":3,"A":4}}"#;
        let props: ItemProperties = serde_json::from_str(json).unwrap();
        match props {
            ItemProperties::Ellipse(p) => {
                assert_eq!(p.fill_color, Some(SerializableColor::new(1, 2, 3, 4)));
                assert_eq!(p.common.pen_style, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unknown_fill_name_is_rejected() {
        let json = r#"{"type":"rectangle","mountPoint":{"x":0,"y":0},
            "rectSize":{"w":6,"h":6},"fillColor":"Plaid"}"#;
        assert!(serde_json::from_str::<ItemProperties>(json).is_err());
    }

    #[test]
    fn test_unknown_pen_style_falls_back_to_solid() {
        let json = r#"{"type":"line","mountPoint":{"x":0,"y":0},
            "penStyle":"wavy","endPoint":{"x":10,"y":0}}"#;
        let props: ItemProperties = serde_json::from_str(json).unwrap();
        assert_eq!(props.common().pen_style, Some(PenStyle::Solid));
    }

    #[test]
    fn test_nested_group_ids() {
        let line = ItemProperties::Line(LineProperties {
            common: common(2),
            end_point: PointProperties { x: 5.0, y: 0.0 },
        });
        let inner = ItemProperties::Group(GroupProperties {
            common: common(3),
            graphics_objects: vec![line.clone()],
        });
        let outer = ItemProperties::Group(GroupProperties {
            common: common(1),
            graphics_objects: vec![inner, line],
        });
        let mut ids = Vec::new();
        outer.collect_ids(&mut ids);
        assert_eq!(ids, vec![1, 3, 2, 2]);

        let json = ItemProperties::list_to_json(std::slice::from_ref(&outer)).unwrap();
        let parsed = ItemProperties::list_from_json(&json).unwrap();
        assert_eq!(parsed, vec![outer]);
    }

    #[test]
    fn test_link_connection_is_optional() {
        let json = r#"{"type":"link","id":9,"mountPoint":{"x":0,"y":0},"arrowPoint":{"x":20,"y":0}}"#;
        let props: ItemProperties = serde_json::from_str(json).unwrap();
        let ItemProperties::Link(link) = &props else {
            panic!("expected a link");
        };
        assert!(link.connection.is_none());
        let out = serde_json::to_value(&props).unwrap();
        assert!(out.get("connection").is_none());
    }

    #[test]
    fn test_malformed_list() {
        assert!(matches!(
            ItemProperties::list_from_json("[{"),
            Err(PropertiesError::Json(_))
        ));
    }
}
