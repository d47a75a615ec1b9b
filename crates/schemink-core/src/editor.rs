//! Interaction state machine.
//!
//! The [`Editor`] owns the scene and its history and turns pointer and key
//! events into edits. Each mode has its own press, move and release
//! handlers.

use crate::clipboard::{self, Clipboard, MemoryClipboard};
use crate::config::EditorConfig;
use crate::document::Document;
use crate::history::History;
use crate::ids::ItemId;
use crate::input::{Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
use crate::properties::ItemProperties;
use crate::scene::Scene;
use crate::selection::{self, Crosshair, Marker, SelectionRect};
use crate::shapes::{
    Item, Line, MAX_THICKNESS, MAX_Z_INDEX, MIN_THICKNESS, MIN_Z_INDEX, SerializableColor,
};
use crate::snap::snap_point;
use crate::storage::{Storage, StorageResult};
use kurbo::{Point, Rect, Vec2};
use log::{debug, info, warn};
use std::collections::VecDeque;

/// Editing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Select,
    DrawLine,
    PasteFromClipboard,
}

/// What a pointer drag in select mode is doing.
#[derive(Debug, Clone, Default)]
enum DragState {
    #[default]
    Idle,
    /// Control points grabbed on these items.
    MovePoints(Vec<ItemId>),
    /// Whole-item move; `offset` is the press point relative to the grabbed
    /// item's position.
    MoveItems { grabbed: ItemId, offset: Vec2 },
    /// Rubber-band selection on top of the selection at press time.
    RectSelect {
        rect: SelectionRect,
        preselected: Vec<ItemId>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Ok,
    Error,
}

/// Message for the host's status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

/// Things drawn on top of the scene that are not items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlays {
    pub cursor: Option<Crosshair>,
    pub selection_rect: Option<Rect>,
    pub markers: Vec<Marker>,
}

/// Scene, history and interaction state of one open sheet.
pub struct Editor {
    scene: Scene,
    history: History,
    mode: Mode,
    drag: DragState,
    drawing_line: Option<ItemId>,
    pasted: Vec<ItemId>,
    cursor: Option<Crosshair>,
    hovered: Option<ItemId>,
    pointer: Point,
    modifiers: Modifiers,
    selected_center: Option<Point>,
    status: VecDeque<StatusMessage>,
    clipboard: Box<dyn Clipboard>,
    /// Id and name the sheet is saved under.
    document_id: String,
    document_name: String,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Create an editor with an in-process clipboard.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_clipboard(config, Box::new(MemoryClipboard::new()))
    }

    pub fn with_clipboard(config: EditorConfig, clipboard: Box<dyn Clipboard>) -> Self {
        let history = History::new(config.max_history);
        let document = Document::new();
        Self {
            scene: Scene::new(config),
            history,
            mode: Mode::Select,
            drag: DragState::Idle,
            drawing_line: None,
            pasted: Vec::new(),
            cursor: None,
            hovered: None,
            pointer: Point::ZERO,
            modifiers: Modifiers::default(),
            selected_center: None,
            status: VecDeque::new(),
            clipboard,
            document_id: document.id,
            document_name: document.name,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Direct scene access for the host. Changes made here are not recorded.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn pointer(&self) -> Point {
        self.pointer
    }

    /// Snapped center of the selection, kept current after every change.
    pub fn selected_center(&self) -> Option<Point> {
        self.selected_center
    }

    /// The line being drawn, if any.
    pub fn drawing_line(&self) -> Option<ItemId> {
        self.drawing_line
    }

    /// Items following the pointer in paste mode.
    pub fn pasted_items(&self) -> &[ItemId] {
        &self.pasted
    }

    /// Drain queued status messages.
    pub fn take_status(&mut self) -> Vec<StatusMessage> {
        self.status.drain(..).collect()
    }

    fn report(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status.push_back(StatusMessage {
            kind,
            text: text.into(),
        });
    }

    /// Pasted items are only recorded once they are dropped.
    fn pasting(&self) -> bool {
        self.mode == Mode::PasteFromClipboard
    }

    fn snap(&self, point: Point) -> Point {
        let config = self.scene.config();
        snap_point(point, config.snap_mode, config.grid_step)
    }

    fn update_selected_center(&mut self) {
        self.selected_center = selection::selected_center(&self.scene);
    }

    /// Overlays for the current state.
    pub fn overlays(&self) -> Overlays {
        let selection_rect = match &self.drag {
            DragState::RectSelect { rect, .. } if !rect.is_degenerate() => Some(rect.to_rect()),
            _ => None,
        };
        let mut markers = Vec::new();
        for item in self.scene.items() {
            if item.is_selected() || Some(item.id()) == self.hovered {
                markers.extend(selection::markers(item));
            }
        }
        Overlays {
            cursor: self.cursor,
            selection_rect,
            markers,
        }
    }

    /// Switch mode.
    ///
    /// Leaving paste mode removes the items that were still following the
    /// pointer; leaving draw mode discards the unfinished line.
    pub fn set_mode(&mut self, mode: Mode) {
        debug!("Mode {:?} -> {:?}", self.mode, mode);
        if self.mode == Mode::PasteFromClipboard && mode != Mode::PasteFromClipboard {
            for id in std::mem::take(&mut self.pasted) {
                self.scene.remove_item(id);
            }
        }
        if self.mode == Mode::DrawLine && mode != Mode::DrawLine {
            if let Some(id) = self.drawing_line.take() {
                self.scene.remove_item(id);
            }
        }
        self.drag = DragState::Idle;
        self.history.cancel_pending();
        match mode {
            Mode::Select => {
                self.cursor = None;
                self.scene.clear_selection();
            }
            Mode::DrawLine => {
                self.cursor = Some(Crosshair::new(self.snap(self.pointer)));
            }
            Mode::PasteFromClipboard => {
                self.cursor = None;
            }
        }
        self.mode = mode;
        self.update_selected_center();
    }

    // Pointer events

    pub fn pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { position, button } => self.mouse_press(position, button),
            PointerEvent::Move { position } => self.mouse_move(position),
            PointerEvent::Up { position, .. } => self.mouse_release(position),
        }
    }

    pub fn mouse_press(&mut self, pos: Point, button: MouseButton) {
        self.pointer = pos;
        match (self.mode, button) {
            (Mode::Select, MouseButton::Left) => self.press_select(pos),
            (Mode::Select, MouseButton::Right) => {
                self.scene.clear_selection();
                self.update_selected_center();
            }
            (Mode::DrawLine, MouseButton::Left) => self.press_draw(pos),
            (Mode::DrawLine, MouseButton::Right) => match self.drawing_line.take() {
                Some(id) => {
                    self.scene.remove_item(id);
                }
                None => self.set_mode(Mode::Select),
            },
            (Mode::PasteFromClipboard, MouseButton::Left) => self.drop_pasted(),
            (Mode::PasteFromClipboard, MouseButton::Right) => self.set_mode(Mode::Select),
            (_, MouseButton::Middle) => {}
        }
    }

    pub fn mouse_move(&mut self, pos: Point) {
        self.pointer = pos;
        match self.mode {
            Mode::Select => self.move_select(pos),
            Mode::DrawLine => {
                let p = self.snap(pos);
                self.cursor = Some(Crosshair::new(p));
                if let Some(Item::Line(line)) = self
                    .drawing_line
                    .and_then(|id| self.scene.item_by_id_mut(id))
                {
                    line.p2 = p;
                }
            }
            Mode::PasteFromClipboard => {
                self.center_pasted_on(self.snap(pos));
            }
        }
    }

    pub fn mouse_release(&mut self, pos: Point) {
        self.pointer = pos;
        match std::mem::take(&mut self.drag) {
            DragState::MovePoints(ids) => {
                self.history.capture_after(&self.scene);
                for id in ids {
                    if let Some(item) = self.scene.item_by_id_mut(id) {
                        item.reset_select_point();
                    }
                }
            }
            DragState::MoveItems { .. } => {
                self.history.capture_after(&self.scene);
            }
            DragState::RectSelect { .. } | DragState::Idle => {}
        }
    }

    fn press_select(&mut self, pos: Point) {
        self.drag = DragState::Idle;

        // Control points first.
        let snapped = self.snap(pos);
        let ids: Vec<ItemId> = self.scene.items().iter().map(Item::id).collect();
        let mut editing = Vec::new();
        for id in ids {
            if let Some(item) = self.scene.item_by_id_mut(id) {
                if item.set_select_point(snapped) {
                    editing.push(id);
                }
            }
        }
        if !editing.is_empty() {
            self.history.capture_before(&self.scene, &editing);
            self.drag = DragState::MovePoints(editing);
            return;
        }

        let Some(hit) = self.scene.item_at(pos) else {
            if !self.modifiers.shift {
                self.scene.clear_selection();
            }
            self.drag = DragState::RectSelect {
                rect: SelectionRect::new(pos),
                preselected: self.scene.selected_ids(),
            };
            self.update_selected_center();
            return;
        };

        self.click_select(hit);
        let position = self
            .scene
            .item_by_id(hit)
            .map_or(pos, Item::position);
        let mut grabbed = self.scene.selected_ids();
        grabbed.push(hit);
        self.history.capture_before(&self.scene, &grabbed);
        self.drag = DragState::MoveItems {
            grabbed: hit,
            offset: pos - position,
        };
        self.update_selected_center();
    }

    fn click_select(&mut self, id: ItemId) {
        if self.modifiers.shift {
            self.scene.toggle_selection(id);
            return;
        }
        if !self.scene.is_selected(id) && self.scene.has_selection() {
            self.scene.clear_selection();
        }
        self.scene.toggle_selection(id);
    }

    fn move_select(&mut self, pos: Point) {
        self.hovered = self.scene.item_at(pos);
        match &mut self.drag {
            DragState::Idle => return,
            DragState::MovePoints(ids) => {
                let config = self.scene.config();
                let p = snap_point(pos, config.snap_mode, config.grid_step);
                for &id in ids.iter() {
                    if let Some(item) = self.scene.item_by_id_mut(id) {
                        if item.is_point_selected() {
                            item.modify_selected_point(p);
                        }
                    }
                }
                self.scene.refresh_link_labels();
            }
            DragState::MoveItems { grabbed, offset } => {
                let (grabbed, offset) = (*grabbed, *offset);
                let target = self.snap(pos - offset);
                let Some(current) = self.scene.item_by_id(grabbed).map(Item::position) else {
                    return;
                };
                self.scene.select(grabbed);
                let ids = self.scene.selected_ids();
                self.scene.move_items(&ids, target - current);
            }
            DragState::RectSelect { rect, preselected } => {
                rect.current = pos;
                if !rect.is_degenerate() {
                    let area = rect.to_rect();
                    let keep = preselected.clone();
                    self.scene.clear_selection();
                    for id in keep.into_iter().chain(self.scene.items_in_rect(area)) {
                        self.scene.select(id);
                    }
                }
            }
        }
        self.update_selected_center();
    }

    fn press_draw(&mut self, pos: Point) {
        if let Some(id) = self.drawing_line.take() {
            self.commit_line(id);
        }
        let p = self.snap(pos);
        let config = self.scene.config();
        let mut line = Line::new(p, p);
        line.common.color = config.color;
        line.common.pen_style = config.pen_style;
        line.common.set_thickness(config.thickness);
        self.drawing_line = Some(self.scene.add_item(line.into()));
    }

    /// Record a finished line, or drop it if it has no length.
    fn commit_line(&mut self, id: ItemId) {
        let null = self.scene.item_by_id(id).is_some_and(Item::is_null_size);
        if null {
            debug!("Discarding zero-length line {}", id);
            self.scene.remove_item(id);
        } else {
            self.history.add_items_step(&self.scene, &[id]);
        }
    }

    fn center_pasted_on(&mut self, target: Point) {
        if let Some(center) = selection::selected_center(&self.scene) {
            let ids = self.pasted.clone();
            self.scene.move_items(&ids, target - center);
        }
        self.update_selected_center();
    }

    fn drop_pasted(&mut self) {
        let ids = std::mem::take(&mut self.pasted);
        self.history.add_items_step(&self.scene, &ids);
        self.mode = Mode::Select;
        debug!("Dropped {} pasted items", ids.len());
        self.update_selected_center();
    }

    // Keys

    /// Handle a key event. Returns true if the key was used.
    pub fn key_event(&mut self, event: KeyEvent) -> bool {
        match event {
            KeyEvent::Pressed(key) => self.key_press(key),
            KeyEvent::Released(key) => self.key_release(key),
        }
    }

    pub fn key_press(&mut self, key: Key) -> bool {
        let ctrl = self.modifiers.ctrl;
        match key {
            Key::Delete => self.delete_selection(),
            Key::Shift => {
                self.modifiers.shift = true;
                true
            }
            Key::Control => {
                self.modifiers.ctrl = true;
                true
            }
            Key::Space => self.rotate_selection(),
            Key::A if ctrl => {
                self.select_all();
                true
            }
            Key::Z if ctrl => self.undo(),
            Key::Y if ctrl => self.redo(),
            Key::C if ctrl => self.copy_selection(),
            Key::V if ctrl => self.paste(),
            _ => false,
        }
    }

    pub fn key_release(&mut self, key: Key) -> bool {
        match key {
            Key::Shift => {
                self.modifiers.shift = false;
                true
            }
            Key::Control => {
                self.modifiers.ctrl = false;
                true
            }
            _ => false,
        }
    }

    // Commands

    /// Add items as one undoable step.
    pub fn add_items(&mut self, items: Vec<Item>) -> Vec<ItemId> {
        let ids: Vec<ItemId> = items
            .into_iter()
            .map(|item| self.scene.add_item(item))
            .collect();
        self.history.add_items_step(&self.scene, &ids);
        ids
    }

    pub fn select_all(&mut self) {
        self.scene.select_all();
        self.update_selected_center();
    }

    /// Top-level items holding the far ends of connections that leave `ids`.
    fn remote_roots(&self, ids: &[ItemId]) -> Vec<ItemId> {
        let mut roots = Vec::new();
        for &id in ids {
            let Some(item) = self.scene.item_by_id(id) else {
                continue;
            };
            item.walk(&mut |node| {
                let root = node
                    .as_link()
                    .and_then(|link| link.remote())
                    .and_then(|remote| self.scene.root_of(remote));
                if let Some(root) = root {
                    if !ids.contains(&root) && !roots.contains(&root) {
                        roots.push(root);
                    }
                }
            });
        }
        roots
    }

    /// Remove the selected items as one undoable step. While pasting this
    /// aborts the paste.
    pub fn delete_selection(&mut self) -> bool {
        if self.pasting() {
            self.set_mode(Mode::Select);
            return true;
        }
        let ids = self.scene.selected_ids();
        if ids.is_empty() {
            return false;
        }
        let mut tracked = ids.clone();
        tracked.extend(self.remote_roots(&ids));
        self.history.capture_before(&self.scene, &tracked);
        for &id in &ids {
            self.scene.remove_item(id);
        }
        self.history.capture_after(&self.scene);
        self.update_selected_center();
        true
    }

    /// Rotate the selection 90 degrees about its center.
    pub fn rotate_selection(&mut self) -> bool {
        let Some(center) = self.selected_center else {
            return false;
        };
        let ids = self.scene.selected_ids();
        if self.pasting() {
            self.scene.rotate_items(&ids, center, 90.0);
        } else {
            self.history.capture_before(&self.scene, &ids);
            self.scene.rotate_items(&ids, center, 90.0);
            self.history.capture_after(&self.scene);
        }
        self.update_selected_center();
        true
    }

    /// Leave any transient mode before touching the history.
    fn settle(&mut self) {
        if self.mode != Mode::Select {
            self.set_mode(Mode::Select);
        }
        self.drag = DragState::Idle;
    }

    pub fn undo(&mut self) -> bool {
        self.settle();
        let done = self.history.undo(&mut self.scene);
        self.update_selected_center();
        done
    }

    pub fn redo(&mut self) -> bool {
        self.settle();
        let done = self.history.redo(&mut self.scene);
        self.update_selected_center();
        done
    }

    /// Put the selection on the clipboard.
    pub fn copy_selection(&mut self) -> bool {
        let props: Vec<_> = self
            .scene
            .selected_items()
            .map(Item::properties)
            .collect();
        if props.is_empty() {
            return false;
        }
        match clipboard::encode(&props) {
            Ok(text) => {
                self.clipboard.set_text(text);
                self.report(StatusKind::Ok, format!("Copied {} items", props.len()));
                true
            }
            Err(e) => {
                warn!("Copy failed: {}", e);
                self.report(StatusKind::Error, e.to_string());
                false
            }
        }
    }

    /// Paste the clipboard content.
    pub fn paste(&mut self) -> bool {
        match self.clipboard.text() {
            Some(text) => self.paste_text(&text),
            None => false,
        }
    }

    /// Add items from a clipboard payload and let them follow the pointer
    /// until they are dropped.
    ///
    /// A malformed payload adds nothing and is reported on the status queue.
    pub fn paste_text(&mut self, text: &str) -> bool {
        let list = match clipboard::decode(text) {
            Ok(list) => list,
            Err(e) => {
                warn!("Bad clipboard data: {}", e);
                self.report(StatusKind::Error, format!("Bad clipboard data: {}", e));
                return false;
            }
        };
        if list.is_empty() {
            return false;
        }
        self.settle();
        self.scene.clear_selection();
        let ids = self.scene.insert_properties(&list, false);
        for &id in &ids {
            self.scene.select(id);
        }
        self.pasted = ids;
        self.mode = Mode::PasteFromClipboard;
        self.center_pasted_on(self.snap(self.pointer));
        debug!("Pasting {} items", self.pasted.len());
        true
    }

    /// Group the selected items as one undoable step.
    pub fn group_selection(&mut self) -> bool {
        let ids = self.scene.selected_ids();
        if self.pasting() || ids.len() < 2 {
            return false;
        }
        self.history.capture_before(&self.scene, &ids);
        let Some(group) = self.scene.group_items(&ids) else {
            self.history.cancel_pending();
            return false;
        };
        self.history.track_created(&[group]);
        self.history.capture_after(&self.scene);
        self.scene.select(group);
        self.update_selected_center();
        true
    }

    /// Dissolve the selected groups as one undoable step.
    pub fn ungroup_selection(&mut self) -> bool {
        let groups: Vec<ItemId> = self
            .scene
            .selected_items()
            .filter(|item| item.as_group().is_some())
            .map(Item::id)
            .collect();
        if self.pasting() || groups.is_empty() {
            return false;
        }
        self.history.capture_before(&self.scene, &groups);
        let mut members = Vec::new();
        for id in groups {
            if let Some(ids) = self.scene.ungroup(id) {
                members.extend(ids);
            }
        }
        self.history.track_created(&members);
        self.history.capture_after(&self.scene);
        for &id in &members {
            self.scene.select(id);
        }
        self.update_selected_center();
        true
    }

    /// Join the two selected links.
    pub fn connect_selection(&mut self) -> bool {
        if self.pasting() {
            return false;
        }
        let ids = self.scene.selected_ids();
        let &[a, b] = ids.as_slice() else {
            self.report(StatusKind::Error, "Select exactly two links to connect");
            return false;
        };
        self.history.capture_before(&self.scene, &ids);
        match self.scene.connect(a, b) {
            Ok(conn) => {
                self.history.capture_after(&self.scene);
                self.report(StatusKind::Ok, format!("Connected as {}", conn));
                true
            }
            Err(e) => {
                self.history.cancel_pending();
                warn!("Connect failed: {}", e);
                self.report(StatusKind::Error, e.to_string());
                false
            }
        }
    }

    /// Break the connections of the selected links.
    pub fn disconnect_selection(&mut self) -> bool {
        let links: Vec<ItemId> = self
            .scene
            .selected_items()
            .filter(|item| item.as_link().is_some_and(|link| link.is_connected()))
            .map(Item::id)
            .collect();
        if self.pasting() || links.is_empty() {
            return false;
        }
        let mut tracked = links.clone();
        tracked.extend(self.remote_roots(&links));
        self.history.capture_before(&self.scene, &tracked);
        for &id in &links {
            self.scene.disconnect_link(id);
        }
        self.history.capture_after(&self.scene);
        true
    }

    /// Apply `edit` to every selected item as one undoable step.
    fn edit_selection<F>(&mut self, mut edit: F) -> bool
    where
        F: FnMut(&mut Item),
    {
        let ids = self.scene.selected_ids();
        if ids.is_empty() {
            return false;
        }
        let recording = !self.pasting();
        if recording {
            self.history.capture_before(&self.scene, &ids);
        }
        for &id in &ids {
            if let Some(item) = self.scene.item_by_id_mut(id) {
                edit(item);
                item.sync_parts_style();
            }
        }
        !recording || self.history.capture_after(&self.scene)
    }

    /// Thickness up by one, wrapping to the thinnest pen.
    pub fn increase_thickness(&mut self) -> bool {
        self.edit_selection(|item| {
            item.walk_mut(&mut |node| {
                let t = node.common().thickness();
                let next = if t >= MAX_THICKNESS { MIN_THICKNESS } else { t + 1 };
                node.common_mut().set_thickness(next);
            })
        })
    }

    /// Thickness down by one, wrapping to the thickest pen.
    pub fn decrease_thickness(&mut self) -> bool {
        self.edit_selection(|item| {
            item.walk_mut(&mut |node| {
                let t = node.common().thickness();
                let next = if t <= MIN_THICKNESS { MAX_THICKNESS } else { t - 1 };
                node.common_mut().set_thickness(next);
            })
        })
    }

    pub fn next_pen_style(&mut self) -> bool {
        self.edit_selection(|item| {
            item.walk_mut(&mut |node| {
                let common = node.common_mut();
                common.pen_style = common.pen_style.next();
            })
        })
    }

    pub fn prev_pen_style(&mut self) -> bool {
        self.edit_selection(|item| {
            item.walk_mut(&mut |node| {
                let common = node.common_mut();
                common.pen_style = common.pen_style.prev();
            })
        })
    }

    /// Raise the selection one level. Nothing moves if any selected item
    /// is already on top.
    pub fn raise_z(&mut self) -> bool {
        if self
            .scene
            .selected_items()
            .any(|item| item.common().z_index() >= MAX_Z_INDEX)
        {
            return false;
        }
        self.edit_selection(|item| {
            let z = item.common().z_index();
            item.common_mut().set_z_index(z + 1);
        })
    }

    /// Lower the selection one level. Nothing moves if any selected item
    /// is already at the bottom.
    pub fn lower_z(&mut self) -> bool {
        if self
            .scene
            .selected_items()
            .any(|item| item.common().z_index() <= MIN_Z_INDEX)
        {
            return false;
        }
        self.edit_selection(|item| {
            let z = item.common().z_index();
            item.common_mut().set_z_index(z - 1);
        })
    }

    pub fn set_color(&mut self, color: SerializableColor) -> bool {
        self.edit_selection(|item| item.walk_mut(&mut |node| node.common_mut().color = color))
    }

    /// Set or clear the fill of selected rectangles and ellipses.
    pub fn set_fill_color(&mut self, fill: Option<SerializableColor>) -> bool {
        self.edit_selection(|item| {
            item.walk_mut(&mut |node| match node {
                Item::Rect(rect) => rect.fill_color = fill,
                Item::Ellipse(ellipse) => ellipse.fill_color = fill,
                _ => {}
            })
        })
    }

    /// Replace the scene content and forget the history.
    pub fn load(&mut self, items: &[ItemProperties]) -> Vec<ItemId> {
        self.settle();
        self.history.clear();
        let ids = self.scene.load_from_properties(items);
        self.update_selected_center();
        ids
    }

    /// Open a sheet document, replacing the scene and clearing history.
    /// Later saves go to the same document id.
    pub fn open_document(&mut self, document: &Document) -> Vec<ItemId> {
        self.settle();
        self.history.clear();
        let ids = document.load_into(&mut self.scene);
        self.document_id = document.id.clone();
        self.document_name = document.name.clone();
        self.update_selected_center();
        ids
    }

    /// Snapshot the scene as a sheet document.
    pub fn document(&self) -> Document {
        Document {
            id: self.document_id.clone(),
            ..Document::from_scene(&self.scene, self.document_name.clone())
        }
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    pub fn rename_document(&mut self, name: impl Into<String>) {
        self.document_name = name.into();
    }

    /// Write the sheet to `storage`.
    pub async fn save(&mut self, storage: &dyn Storage) -> StorageResult<()> {
        let document = self.document();
        match storage.save(&document).await {
            Ok(()) => {
                info!("Saved sheet {} ({})", document.name, document.id);
                self.report(StatusKind::Ok, format!("Saved {}", document.name));
                Ok(())
            }
            Err(e) => {
                warn!("Saving sheet {} failed: {}", document.id, e);
                self.report(StatusKind::Error, e.to_string());
                Err(e)
            }
        }
    }

    /// Replace the sheet with the one stored under `id`. On failure the
    /// scene is left alone.
    pub async fn open(&mut self, storage: &dyn Storage, id: &str) -> StorageResult<Vec<ItemId>> {
        match storage.load(id).await {
            Ok(document) => Ok(self.open_document(&document)),
            Err(e) => {
                warn!("Opening sheet {} failed: {}", id, e);
                self.report(StatusKind::Error, e.to_string());
                Err(e)
            }
        }
    }
}
