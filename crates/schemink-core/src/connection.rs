//! Logical connections between pairs of links.

use crate::ids::{ConnectionId, ItemId};

/// Pairs exactly two links. Owned by the scene; links refer to it by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    id: ConnectionId,
    links: [ItemId; 2],
}

impl Connection {
    pub fn new(id: ConnectionId, a: ItemId, b: ItemId) -> Self {
        Self { id, links: [a, b] }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn links(&self) -> [ItemId; 2] {
        self.links
    }

    pub fn involves(&self, link: ItemId) -> bool {
        self.links.contains(&link)
    }

    /// The link at the other end from `link`.
    pub fn remote_of(&self, link: ItemId) -> Option<ItemId> {
        match self.links {
            [a, b] if a == link => Some(b),
            [a, b] if b == link => Some(a),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_of() {
        let conn = Connection::new(1, 10, 20);
        assert_eq!(conn.remote_of(10), Some(20));
        assert_eq!(conn.remote_of(20), Some(10));
        assert_eq!(conn.remote_of(30), None);
        assert!(conn.involves(20));
        assert!(!conn.involves(30));
    }
}
