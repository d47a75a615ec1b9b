//! SchemInk Core Library
//!
//! Platform-agnostic item model, scene graph, interaction state machine and
//! undo history for the SchemInk schematic editor. Hosts feed pointer and
//! key events into an [`Editor`] and draw the scene plus its [`Overlays`].

pub mod clipboard;
pub mod config;
pub mod connection;
pub mod document;
pub mod editor;
pub mod error;
pub mod history;
pub mod ids;
pub mod input;
pub mod properties;
pub mod scene;
pub mod selection;
pub mod shapes;
pub mod snap;
pub mod storage;

pub use clipboard::{Clipboard, MemoryClipboard};
pub use config::EditorConfig;
pub use connection::Connection;
pub use document::Document;
pub use editor::{Editor, Mode, Overlays, StatusKind, StatusMessage};
pub use error::{ConfigError, PropertiesError, SceneError, SceneResult};
pub use history::{History, HistoryEntry, ItemChange};
pub use ids::{ConnectionId, ItemId};
pub use input::{Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use properties::ItemProperties;
pub use scene::Scene;
pub use shapes::{
    Ellipse, Group, Item, ItemKind, ItemTrait, Line, Link, LinkDirection, PenStyle, Rectangle,
    SerializableColor, Text,
};
pub use snap::{GROUP_GRID_SIZE, SnapMode, snap_point, snap_to_grid};
pub use storage::{MemoryStorage, Storage, StorageError, StorageResult, StoredSheet};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
