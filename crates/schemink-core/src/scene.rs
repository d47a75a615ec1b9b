//! Scene graph: top-level items, group containment, connections and queries.

use crate::config::EditorConfig;
use crate::connection::Connection;
use crate::error::{SceneError, SceneResult};
use crate::ids::{ConnectionId, IdAllocator, ItemId};
use crate::properties::ItemProperties;
use crate::shapes::{Group, Item, ItemTrait, Link};
use kurbo::{Point, Rect, Vec2};
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Desired connection state of one link, as read from a property tree.
#[derive(Debug, Clone, Copy)]
struct LinkState {
    link: ItemId,
    connection: Option<(Option<ConnectionId>, ItemId)>,
}

/// Hands out item ids while keeping them unique across the scene.
struct IdClaims<'a> {
    ids: &'a mut IdAllocator,
    used: HashSet<ItemId>,
}

impl IdClaims<'_> {
    /// Keep `wanted` if it is set and free, otherwise allocate a new id.
    fn claim(&mut self, wanted: ItemId) -> ItemId {
        let id = if wanted == 0 || self.used.contains(&wanted) {
            loop {
                let id = self.ids.next_id();
                if !self.used.contains(&id) {
                    break id;
                }
            }
        } else {
            self.ids.observe(wanted);
            wanted
        };
        self.used.insert(id);
        id
    }

    fn assign(&mut self, item: &mut Item, parent: Option<ItemId>) {
        let id = self.claim(item.id());
        let common = item.common_mut();
        common.id = id;
        common.parent = parent;
        match item {
            Item::Group(group) => {
                for child in group.items_mut() {
                    self.assign(child, Some(id));
                }
            }
            Item::Link(link) => {
                for part in link.parts_common_mut() {
                    part.id = self.claim(part.id);
                    part.parent = Some(id);
                }
            }
            _ => {}
        }
    }
}

/// Every id in an item tree, including the parts of links.
fn collect_all_ids(item: &Item, out: &mut HashSet<ItemId>) {
    item.walk(&mut |node| {
        out.insert(node.id());
        if let Item::Link(link) = node {
            out.insert(link.line().common().id());
            out.insert(link.arrow().common().id());
            out.insert(link.label().common().id());
        }
    });
}

/// Remove the item with `id` from `items` or from any nested group.
fn take_from(items: &mut Vec<Item>, id: ItemId) -> Option<Item> {
    if let Some(index) = items.iter().position(|item| item.id() == id) {
        return Some(items.remove(index));
    }
    items.iter_mut().find_map(|item| match item {
        Item::Group(group) => take_from(group.items_mut(), id),
        _ => None,
    })
}

/// The live set of items on one sheet.
///
/// Top-level items are kept in insertion order, which breaks z-index ties
/// during hit-testing (later items are on top). Ids and connection ids are
/// allocated per scene.
#[derive(Debug, Clone)]
pub struct Scene {
    items: Vec<Item>,
    connections: BTreeMap<ConnectionId, Connection>,
    item_ids: IdAllocator,
    connection_ids: IdAllocator,
    config: EditorConfig,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Scene {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            items: Vec::new(),
            connections: BTreeMap::new(),
            item_ids: IdAllocator::new(),
            connection_ids: IdAllocator::new(),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EditorConfig) {
        self.config = config;
        self.refresh_link_labels();
    }

    /// Top-level items in insertion order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn used_ids(&self) -> HashSet<ItemId> {
        let mut used = HashSet::new();
        for item in &self.items {
            collect_all_ids(item, &mut used);
        }
        used
    }

    /// Add a top-level item and return its id.
    ///
    /// Items without an id, or with one already taken, get a fresh id; so do
    /// their members. A freshly built group anchored at the origin gets its
    /// mount point from its members.
    pub fn add_item(&mut self, mut item: Item) -> ItemId {
        if let Item::Group(group) = &mut item {
            if group.common.id() == 0 && group.position() == Point::ZERO && !group.is_empty() {
                let mount = group.calculate_mount_point(self.config.group_grid);
                group.set_mount_point(mount);
            }
        }
        let used = self.used_ids();
        let mut claims = IdClaims {
            ids: &mut self.item_ids,
            used,
        };
        claims.assign(&mut item, None);

        // A connection is only kept if the scene still knows it.
        let connections = &self.connections;
        item.walk_mut(&mut |node| {
            let id = node.id();
            if let Item::Link(link) = node {
                let valid = link
                    .connection()
                    .and_then(|c| connections.get(&c))
                    .is_some_and(|c| c.involves(id));
                if link.is_connected() && !valid {
                    link.set_connection(None);
                }
            }
        });

        let id = item.id();
        debug!("Added {} {}", item.kind(), id);
        self.items.push(item);
        id
    }

    /// Remove an item (top-level or nested in a group) and release every
    /// connection held by links inside it.
    pub fn remove_item(&mut self, id: ItemId) -> Option<Item> {
        let mut item = take_from(&mut self.items, id)?;
        item.common_mut().parent = None;

        let mut held = Vec::new();
        item.walk(&mut |node| {
            if let Some(conn) = node.as_link().and_then(Link::connection) {
                held.push(conn);
            }
        });
        for conn in held {
            self.disconnect(conn);
        }
        item.walk_mut(&mut |node| {
            if let Some(link) = node.as_link_mut() {
                link.set_connection(None);
            }
        });

        debug!("Removed {} {}", item.kind(), id);
        Some(item)
    }

    /// Remove everything, keeping the id counters.
    pub fn clear(&mut self) {
        self.items.clear();
        self.connections.clear();
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.item_by_id(id).is_some()
    }

    /// Find an item by id, searching group members too.
    pub fn item_by_id(&self, id: ItemId) -> Option<&Item> {
        if id == 0 {
            return None;
        }
        self.items.iter().find_map(|item| item.find(id))
    }

    pub fn item_by_id_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        if id == 0 {
            return None;
        }
        self.items.iter_mut().find_map(|item| item.find_mut(id))
    }

    fn link(&self, id: ItemId) -> Option<&Link> {
        self.item_by_id(id).and_then(Item::as_link)
    }

    fn top_level_index_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.find(id).is_some())
    }

    /// Position of a top-level item in scene order.
    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Move a top-level item to `index` in scene order.
    pub fn move_to_index(&mut self, id: ItemId, index: usize) -> bool {
        let Some(from) = self.index_of(id) else {
            return false;
        };
        let item = self.items.remove(from);
        let index = index.min(self.items.len());
        self.items.insert(index, item);
        true
    }

    pub fn is_top_level(&self, id: ItemId) -> bool {
        self.items.iter().any(|item| item.id() == id)
    }

    /// Id of the top-level item that is or contains `id`.
    pub fn root_of(&self, id: ItemId) -> Option<ItemId> {
        self.top_level_index_of(id).map(|index| self.items[index].id())
    }

    /// Scene position that the item's mount point is measured from.
    pub fn parent_position(&self, id: ItemId) -> Point {
        self.item_by_id(id)
            .and_then(|item| item.common().parent())
            .and_then(|parent| self.item_by_id(parent))
            .map_or(Point::ZERO, Item::position)
    }

    /// Top-level items under `point`, topmost first.
    ///
    /// Higher z-index wins; among equal z-indices the later item wins.
    pub fn items_at(&self, point: Point) -> Vec<ItemId> {
        let tolerance = self.config.hit_tolerance;
        let mut hits: Vec<(i32, usize, ItemId)> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.hit_test(point, tolerance))
            .map(|(index, item)| (item.common().z_index(), index, item.id()))
            .collect();
        hits.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
        hits.into_iter().map(|(_, _, id)| id).collect()
    }

    /// Topmost top-level item under `point`.
    pub fn item_at(&self, point: Point) -> Option<ItemId> {
        self.items_at(point).into_iter().next()
    }

    /// Top-level items whose bounding box touches `rect`.
    ///
    /// Edges count, so horizontal and vertical lines are found.
    pub fn items_in_rect(&self, rect: Rect) -> Vec<ItemId> {
        let rect = rect.abs();
        self.items
            .iter()
            .filter(|item| {
                let b = item.bounds();
                b.x0 <= rect.x1 && b.x1 >= rect.x0 && b.y0 <= rect.y1 && b.y1 >= rect.y0
            })
            .map(Item::id)
            .collect()
    }

    pub fn move_item(&mut self, id: ItemId, delta: Vec2) -> bool {
        match self.item_by_id_mut(id) {
            Some(item) => {
                item.move_by(delta);
                true
            }
            None => false,
        }
    }

    /// Move several items by the same offset.
    pub fn move_items(&mut self, ids: &[ItemId], delta: Vec2) {
        for &id in ids {
            self.move_item(id, delta);
        }
        self.refresh_link_labels();
    }

    /// Rotate items about a shared center by a multiple of 90 degrees.
    pub fn rotate_items(&mut self, ids: &[ItemId], center: Point, degrees: f64) {
        for &id in ids {
            if let Some(item) = self.item_by_id_mut(id) {
                item.rotate(center, degrees);
            }
        }
        self.refresh_link_labels();
    }

    // Selection flags

    pub fn select(&mut self, id: ItemId) -> bool {
        self.set_selected(id, true)
    }

    pub fn deselect(&mut self, id: ItemId) -> bool {
        self.set_selected(id, false)
    }

    fn set_selected(&mut self, id: ItemId, selected: bool) -> bool {
        match self.item_by_id_mut(id) {
            Some(item) => {
                item.set_selected(selected);
                true
            }
            None => false,
        }
    }

    /// Flip the selection flag; returns the new state.
    pub fn toggle_selection(&mut self, id: ItemId) -> bool {
        let selected = !self.is_selected(id);
        self.set_selected(id, selected) && selected
    }

    pub fn is_selected(&self, id: ItemId) -> bool {
        self.item_by_id(id).is_some_and(Item::is_selected)
    }

    pub fn clear_selection(&mut self) {
        for item in &mut self.items {
            item.set_selected(false);
        }
    }

    pub fn select_all(&mut self) {
        for item in &mut self.items {
            item.set_selected(true);
        }
    }

    /// Selected top-level items in scene order.
    pub fn selected_ids(&self) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|item| item.is_selected())
            .map(Item::id)
            .collect()
    }

    pub fn selected_items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| item.is_selected())
    }

    pub fn has_selection(&self) -> bool {
        self.items.iter().any(Item::is_selected)
    }

    // Connections

    /// Join two free links.
    pub fn connect(&mut self, a: ItemId, b: ItemId) -> SceneResult<ConnectionId> {
        self.connect_with_id(None, a, b)
    }

    fn connect_with_id(
        &mut self,
        wanted: Option<ConnectionId>,
        a: ItemId,
        b: ItemId,
    ) -> SceneResult<ConnectionId> {
        if a == b {
            return Err(SceneError::SelfConnection(a));
        }
        for id in [a, b] {
            let item = self.item_by_id(id).ok_or(SceneError::UnknownItem(id))?;
            let link = item.as_link().ok_or(SceneError::NotALink(id))?;
            if link.is_connected() {
                return Err(SceneError::AlreadyConnected(id));
            }
        }

        let id = match wanted {
            Some(id) if id != 0 && !self.connections.contains_key(&id) => {
                self.connection_ids.observe(id);
                id
            }
            _ => self.connection_ids.next_id(),
        };
        self.connections.insert(id, Connection::new(id, a, b));
        for (link, remote) in [(a, b), (b, a)] {
            if let Some(link) = self.item_by_id_mut(link).and_then(Item::as_link_mut) {
                link.set_connection(Some((id, remote)));
            }
        }
        debug!("Connected links {} and {} as {}", a, b, id);
        self.refresh_link_labels();
        Ok(id)
    }

    /// Destroy a connection and clear both links. Returns false for an
    /// unknown connection.
    pub fn disconnect(&mut self, id: ConnectionId) -> bool {
        let Some(connection) = self.connections.remove(&id) else {
            return false;
        };
        for link in connection.links() {
            if let Some(link) = self.item_by_id_mut(link).and_then(Item::as_link_mut) {
                link.set_connection(None);
            }
        }
        debug!("Removed connection {}", id);
        self.refresh_link_labels();
        true
    }

    /// Disconnect whatever connection the link takes part in.
    pub fn disconnect_link(&mut self, link: ItemId) -> bool {
        match self.link(link).and_then(Link::connection) {
            Some(id) => self.disconnect(id),
            None => false,
        }
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// The link joined to `link`, if any.
    pub fn remote_link(&self, link: ItemId) -> Option<ItemId> {
        let id = self.link(link)?.connection()?;
        self.connections.get(&id)?.remote_of(link)
    }

    /// Bring links in line with the connection states read from trees.
    fn sync_connections(&mut self, states: &[LinkState]) {
        for state in states {
            let Some(link) = self.link(state.link) else {
                continue;
            };
            let current = link.connection().zip(link.remote());
            let keep = match (current, state.connection) {
                (Some((id, remote)), Some((wanted, wanted_remote))) => {
                    remote == wanted_remote && wanted.is_none_or(|w| w == id)
                }
                (Some(_), None) => false,
                (None, _) => true,
            };
            if !keep {
                if let Some((id, _)) = current {
                    self.disconnect(id);
                }
            }
        }
        for state in states {
            let Some((wanted, remote)) = state.connection else {
                continue;
            };
            let free = |scene: &Self, id| scene.link(id).is_some_and(|l| !l.is_connected());
            if free(self, state.link) && free(self, remote) {
                if let Err(e) = self.connect_with_id(wanted, state.link, remote) {
                    warn!("Could not restore connection of link {}: {}", state.link, e);
                }
            }
        }
    }

    /// Connection states of every link in the trees.
    ///
    /// `placed` holds the scene id of every tree node in depth-first order.
    /// A remote id in a tree refers to the first node carrying it. Nodes and
    /// remotes without a placed id are dropped unless `keep_unmapped` is set,
    /// in which case their tree ids are used as they are.
    fn link_states(list: &[ItemProperties], placed: &[ItemId], keep_unmapped: bool) -> Vec<LinkState> {
        let mut old_ids = Vec::new();
        for props in list {
            props.collect_ids(&mut old_ids);
        }
        let mut first_holder = HashMap::new();
        for (&old, &new) in old_ids.iter().zip(placed) {
            first_holder.entry(old).or_insert(new);
        }
        let resolve = |id: ItemId| match first_holder.get(&id) {
            Some(&mapped) => Some(mapped),
            None if keep_unmapped => Some(id),
            None => None,
        };

        let mut states = Vec::new();
        let mut index = 0;
        for props in list {
            props.walk(&mut |node| {
                let own = placed.get(index).copied();
                index += 1;
                let ItemProperties::Link(link) = node else {
                    return;
                };
                let Some(id) = own.or(keep_unmapped.then_some(link.common.id)) else {
                    return;
                };
                let connection = link.connection.and_then(|c| {
                    let remote = resolve(c.remote_id)?;
                    Some((keep_unmapped.then_some(c.id), remote))
                });
                states.push(LinkState {
                    link: id,
                    connection,
                });
            });
        }
        states
    }

    // Property trees

    /// Property tree of an item, with the mount point relative to its parent.
    pub fn item_properties(&self, id: ItemId) -> Option<ItemProperties> {
        let origin = self.parent_position(id);
        self.item_by_id(id).map(|item| item.properties_at(origin))
    }

    /// Apply a property tree to the item with the same id.
    pub fn apply_properties(&mut self, props: &ItemProperties, preserve_id: bool) -> SceneResult<()> {
        let id = props.id();
        let index = self
            .top_level_index_of(id)
            .ok_or(SceneError::UnknownItem(id))?;
        let origin = self.parent_position(id);

        let mut root = self.items.remove(index);
        let result = match root.find_mut(id) {
            Some(target) => target
                .set_properties(props, origin, preserve_id)
                .map_err(SceneError::from),
            None => Err(SceneError::UnknownItem(id)),
        };
        // Members added by a group merge need ids.
        let used = self.used_ids();
        let mut claims = IdClaims {
            ids: &mut self.item_ids,
            used,
        };
        claims.assign(&mut root, None);
        self.items.insert(index, root);
        result?;

        let states = Self::link_states(std::slice::from_ref(props), &[], true);
        self.sync_connections(&states);
        self.refresh_link_labels();
        Ok(())
    }

    /// Build items from property trees and add them.
    ///
    /// With `preserve_ids` the tree ids are kept where they are free and
    /// connections keep their ids. Without it every item gets a fresh id and
    /// only connections between two of the inserted links are recreated.
    pub fn insert_properties(&mut self, list: &[ItemProperties], preserve_ids: bool) -> Vec<ItemId> {
        let mut inserted = Vec::with_capacity(list.len());
        let mut placed = Vec::new();
        for props in list {
            let item = Item::from_properties(props, Point::ZERO, preserve_ids);
            let id = self.add_item(item);
            if let Some(item) = self.item_by_id(id) {
                item.walk(&mut |node| placed.push(node.id()));
            }
            inserted.push(id);
        }

        let states = Self::link_states(list, &placed, preserve_ids);
        self.sync_connections(&states);
        self.refresh_link_labels();
        inserted
    }

    /// Put the item with `id` into the given state: `None` removes it,
    /// otherwise it is updated or re-created with its original id.
    pub fn restore_item(&mut self, id: ItemId, state: Option<&ItemProperties>) -> SceneResult<()> {
        match state {
            None => {
                self.remove_item(id);
                Ok(())
            }
            Some(props) if self.contains(id) => self.apply_properties(props, true),
            Some(props) => {
                self.insert_properties(std::slice::from_ref(props), true);
                Ok(())
            }
        }
    }

    /// Replace the scene content with the given trees, keeping their ids.
    pub fn load_from_properties(&mut self, list: &[ItemProperties]) -> Vec<ItemId> {
        self.clear();
        let ids = self.insert_properties(list, true);
        info!("Loaded {} items", ids.len());
        ids
    }

    /// Property trees of every top-level item.
    pub fn export_properties(&self) -> Vec<ItemProperties> {
        self.items.iter().map(Item::properties).collect()
    }

    // Grouping

    /// Combine top-level items into a new group.
    ///
    /// Returns None unless at least two of the ids name top-level items.
    pub fn group_items(&mut self, ids: &[ItemId]) -> Option<ItemId> {
        let count = self.items.iter().filter(|item| ids.contains(&item.id())).count();
        if count < 2 {
            return None;
        }
        let (mut members, rest): (Vec<Item>, Vec<Item>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| ids.contains(&item.id()));
        self.items = rest;
        for member in &mut members {
            member.set_selected(false);
        }
        let group = Group::from_items(members).ok()?;
        Some(self.add_item(group.into()))
    }

    /// Dissolve a top-level group; its members become top-level items.
    pub fn ungroup(&mut self, group_id: ItemId) -> Option<Vec<ItemId>> {
        let index = self
            .items
            .iter()
            .position(|item| item.id() == group_id && item.as_group().is_some())?;
        let Item::Group(group) = self.items.remove(index) else {
            return None;
        };
        Some(
            group
                .ungroup()
                .into_iter()
                .map(|member| self.add_item(member))
                .collect(),
        )
    }

    // Link addresses

    /// Zone name of a point: a row letter and a 1-based column number.
    pub fn zone(&self, point: Point) -> String {
        let size = self.config.zone_size;
        let row = (point.y / size).floor().clamp(0.0, 25.0) as u8;
        let column = (point.x / size).floor().max(0.0) as u64 + 1;
        format!("{}{}", char::from(b'A' + row), column)
    }

    /// Address of a point on this sheet, e.g. `1/B3`.
    pub fn address(&self, point: Point) -> String {
        format!("{}/{}", self.config.sheet, self.zone(point))
    }

    /// Recompute every link label from its connection and the remote
    /// link's address.
    pub fn refresh_link_labels(&mut self) {
        let mut labels = Vec::new();
        for item in &self.items {
            item.walk(&mut |node| {
                if let Some(link) = node.as_link() {
                    let text = match link.connection() {
                        Some(conn) => match link.remote().and_then(|r| self.item_by_id(r)) {
                            Some(remote) => format!("{}({})", conn, self.address(remote.position())),
                            None => conn.to_string(),
                        },
                        None => String::new(),
                    };
                    if link.label().text != text {
                        labels.push((node.id(), text));
                    }
                }
            });
        }
        for (id, text) in labels {
            if let Some(link) = self.item_by_id_mut(id).and_then(Item::as_link_mut) {
                link.set_label(text);
            }
        }
    }
}
