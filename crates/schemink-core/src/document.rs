//! Persisted sheet documents.

use crate::ids::ItemId;
use crate::properties::ItemProperties;
use crate::scene::Scene;
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_sheet() -> u32 {
    1
}

/// One sheet of a schematic: its items as property trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier.
    pub id: String,
    /// Document name.
    pub name: String,
    /// Sheet number used in link addresses.
    #[serde(default = "default_sheet")]
    pub sheet: u32,
    /// Top-level items in scene order.
    #[serde(default)]
    pub items: Vec<ItemProperties>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            sheet: default_sheet(),
            items: Vec::new(),
        }
    }

    /// Snapshot a scene.
    pub fn from_scene(scene: &Scene, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sheet: scene.config().sheet,
            items: scene.export_properties(),
            ..Self::new()
        }
    }

    /// Replace the scene content with this document, keeping item ids.
    pub fn load_into(&self, scene: &mut Scene) -> Vec<ItemId> {
        let mut config = scene.config().clone();
        config.sheet = self.sheet;
        scene.set_config(config);
        let ids = scene.load_from_properties(&self.items);
        info!("Loaded document {} ({})", self.name, self.id);
        ids
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Link, Rectangle};
    use kurbo::{Point, Size};

    #[test]
    fn test_new_documents_get_unique_ids() {
        assert_ne!(Document::new().id, Document::new().id);
    }

    #[test]
    fn test_scene_roundtrip() {
        let mut scene = Scene::default();
        scene.add_item(Rectangle::new(Point::new(10.0, 10.0), Size::new(30.0, 20.0)).into());
        let l1 = scene.add_item(Link::new(Point::new(0.0, 100.0)).into());
        let l2 = scene.add_item(Link::new(Point::new(300.0, 100.0)).into());
        scene.connect(l1, l2).unwrap();

        let doc = Document::from_scene(&scene, "Power supply");
        let json = doc.to_json().unwrap();
        let parsed = Document::from_json(&json).unwrap();
        assert_eq!(parsed, doc);

        let mut loaded = Scene::default();
        parsed.load_into(&mut loaded);
        assert_eq!(loaded.export_properties(), scene.export_properties());
        assert_eq!(loaded.remote_link(l1), Some(l2));
    }

    #[test]
    fn test_sheet_defaults_and_applies() {
        let doc = Document::from_json(r#"{"id": "x", "name": "n"}"#).unwrap();
        assert_eq!(doc.sheet, 1);
        assert!(doc.items.is_empty());

        let doc = Document {
            sheet: 4,
            ..Document::new()
        };
        let mut scene = Scene::default();
        doc.load_into(&mut scene);
        assert_eq!(scene.config().sheet, 4);
        assert_eq!(scene.address(Point::ZERO), "4/A1");
    }
}
