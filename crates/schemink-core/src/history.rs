//! Undo/redo history of item property snapshots.

use crate::config::DEFAULT_MAX_HISTORY;
use crate::ids::ItemId;
use crate::properties::ItemProperties;
use crate::scene::Scene;
use log::{debug, warn};

/// State of one item before and after a step.
///
/// A missing `before` means the step created the item, a missing `after`
/// means it removed it.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemChange {
    pub id: ItemId,
    /// Scene-order index before the step.
    pub index: Option<usize>,
    pub before: Option<ItemProperties>,
    pub after: Option<ItemProperties>,
}

/// One undoable step.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryEntry {
    pub changes: Vec<ItemChange>,
}

/// Put every item of a step into the state picked by `state`.
///
/// Removals run first so re-created items keep their order and ids.
fn restore<F>(scene: &mut Scene, entry: &HistoryEntry, state: F)
where
    F: Fn(&ItemChange) -> Option<&ItemProperties>,
{
    let (removed, kept): (Vec<&ItemChange>, Vec<&ItemChange>) =
        entry.changes.iter().partition(|change| state(*change).is_none());
    for change in removed.into_iter().chain(kept) {
        if let Err(e) = scene.restore_item(change.id, state(change)) {
            warn!("Could not restore item {}: {}", change.id, e);
        }
    }
}

/// Put restored items back at their old place in scene order.
fn reorder(scene: &mut Scene, entry: &HistoryEntry) {
    let mut placed: Vec<(usize, ItemId)> = entry
        .changes
        .iter()
        .filter(|change| change.before.is_some())
        .filter_map(|change| change.index.map(|index| (index, change.id)))
        .collect();
    placed.sort_unstable();
    for (index, id) in placed {
        scene.move_to_index(id, index);
    }
}

/// Undo and redo stacks.
///
/// Steps track top-level items. An item that stops being top-level during a
/// step (it was absorbed into a new group) is recorded as removed; the group
/// carries it.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    pending: Vec<(ItemId, Option<usize>, Option<ItemProperties>)>,
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            pending: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Snapshot items before they are changed.
    ///
    /// Replaces any snapshot that was never closed with
    /// [`History::capture_after`].
    pub fn capture_before(&mut self, scene: &Scene, ids: &[ItemId]) {
        self.pending.clear();
        for &id in ids {
            if !self.pending.iter().any(|(p, ..)| *p == id) {
                self.pending
                    .push((id, scene.index_of(id), scene.item_properties(id)));
            }
        }
    }

    /// Add items that the open step is about to create.
    pub fn track_created(&mut self, ids: &[ItemId]) {
        for &id in ids {
            if !self.pending.iter().any(|(p, ..)| *p == id) {
                self.pending.push((id, None, None));
            }
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drop the open snapshot without recording a step.
    pub fn cancel_pending(&mut self) {
        self.pending.clear();
    }

    /// Close the open snapshot into one undo step.
    ///
    /// Items whose state did not change are left out. Returns false when
    /// nothing changed, in which case no step is recorded.
    pub fn capture_after(&mut self, scene: &Scene) -> bool {
        let changes: Vec<ItemChange> = std::mem::take(&mut self.pending)
            .into_iter()
            .map(|(id, index, before)| {
                let after = if scene.is_top_level(id) {
                    scene.item_properties(id)
                } else {
                    None
                };
                ItemChange {
                    id,
                    index,
                    before,
                    after,
                }
            })
            .filter(|change| change.before != change.after)
            .collect();
        if changes.is_empty() {
            return false;
        }
        self.push(HistoryEntry { changes });
        true
    }

    /// Record items that were just added.
    pub fn add_items_step(&mut self, scene: &Scene, ids: &[ItemId]) -> bool {
        self.pending.clear();
        self.track_created(ids);
        self.capture_after(scene)
    }

    /// Record items that are about to be removed. Call before removing.
    pub fn remove_items_step(&mut self, scene: &Scene, ids: &[ItemId]) -> bool {
        let changes: Vec<ItemChange> = ids
            .iter()
            .filter_map(|&id| {
                scene.item_properties(id).map(|before| ItemChange {
                    id,
                    index: scene.index_of(id),
                    before: Some(before),
                    after: None,
                })
            })
            .collect();
        if changes.is_empty() {
            return false;
        }
        self.push(HistoryEntry { changes });
        true
    }

    fn push(&mut self, entry: HistoryEntry) {
        debug!("History step with {} changes", entry.changes.len());
        self.undo_stack.push(entry);
        self.redo_stack.clear();
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
    }

    /// Undo the last step. Returns false if there is nothing to undo.
    pub fn undo(&mut self, scene: &mut Scene) -> bool {
        let Some(entry) = self.undo_stack.pop() else {
            return false;
        };
        restore(scene, &entry, |change| change.before.as_ref());
        reorder(scene, &entry);
        self.redo_stack.push(entry);
        true
    }

    /// Redo the last undone step. Returns false if there is nothing to redo.
    pub fn redo(&mut self, scene: &mut Scene) -> bool {
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };
        restore(scene, &entry, |change| change.after.as_ref());
        self.undo_stack.push(entry);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.pending.clear();
    }
}
