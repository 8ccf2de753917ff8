//! Byte-keyed prefix tree over bare entity names.
//!
//! Every node may complete two entries: the legacy spelling (`amp`) and the
//! semicolon-terminated spelling (`amp;`). The `;` itself is never an edge,
//! so a node with children always means "some longer name shares this
//! prefix".

/// Index of the root node.
pub(crate) const ROOT: u32 = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Node {
    /// `(byte, child index)`, sorted by byte.
    children: Vec<(u8, u32)>,
    /// Entry index of the name without `;`.
    pub(crate) legacy: Option<u32>,
    /// Entry index of the name with `;`.
    pub(crate) terminated: Option<u32>,
}

impl Node {
    pub(crate) fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Trie {
    nodes: Vec<Node>,
}

impl Trie {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
        }
    }

    /// Attach entry `entry` to the node spelling `name`, creating the path
    /// as needed. Returns the entry index previously stored in that slot.
    pub(crate) fn insert(&mut self, name: &str, terminated: bool, entry: u32) -> Option<u32> {
        let mut idx = ROOT;
        for b in name.bytes() {
            idx = match self.child(idx, b) {
                Some(next) => next,
                None => self.add_child(idx, b),
            };
        }
        let node = &mut self.nodes[idx as usize];
        let slot = if terminated {
            &mut node.terminated
        } else {
            &mut node.legacy
        };
        slot.replace(entry)
    }

    fn add_child(&mut self, parent: u32, byte: u8) -> u32 {
        let next = self.nodes.len() as u32;
        self.nodes.push(Node::default());
        let children = &mut self.nodes[parent as usize].children;
        let pos = children.partition_point(|&(b, _)| b < byte);
        children.insert(pos, (byte, next));
        next
    }

    pub(crate) fn child(&self, node: u32, byte: u8) -> Option<u32> {
        let children = &self.nodes[node as usize].children;
        children
            .binary_search_by_key(&byte, |&(b, _)| b)
            .ok()
            .map(|i| children[i].1)
    }

    /// Walk `name` from the root.
    pub(crate) fn find(&self, name: &str) -> Option<u32> {
        name.bytes().try_fold(ROOT, |idx, b| self.child(idx, b))
    }

    pub(crate) fn node(&self, idx: u32) -> &Node {
        &self.nodes[idx as usize]
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_find() {
        let mut t = Trie::new();
        assert_eq!(t.insert("not", false, 0), None);
        assert_eq!(t.insert("notin", true, 1), None);
        let not = t.find("not").unwrap();
        assert_eq!(t.node(not).legacy, Some(0));
        assert!(t.node(not).has_children());
        let notin = t.find("notin").unwrap();
        assert_eq!(t.node(notin).terminated, Some(1));
        assert!(!t.node(notin).has_children());
        assert_eq!(t.find("nox"), None);
    }

    #[test]
    fn legacy_and_terminated_share_a_node() {
        let mut t = Trie::new();
        t.insert("amp", false, 0);
        t.insert("amp", true, 1);
        let n = t.node(t.find("amp").unwrap());
        assert_eq!((n.legacy, n.terminated), (Some(0), Some(1)));
        assert_eq!(t.node_count(), 4);
    }

    #[test]
    fn reinsert_returns_previous() {
        let mut t = Trie::new();
        t.insert("lt", true, 3);
        assert_eq!(t.insert("lt", true, 7), Some(3));
    }

    #[test]
    fn children_stay_sorted() {
        let mut t = Trie::new();
        for (i, name) in ["c", "a", "b"].iter().enumerate() {
            t.insert(name, true, i as u32);
        }
        let bytes: Vec<u8> = t.node(ROOT).children.iter().map(|&(b, _)| b).collect();
        assert_eq!(bytes, b"abc");
    }
}
