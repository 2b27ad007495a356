//! Recursive tree produced for every table row.
//!
//! Keys are ontology class identifiers. A node is either a leaf holding a
//! (possibly null) column value, or a branch of child nodes. Branches keep
//! insertion order: projection reads "the first child" of several branches.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::vocab::{self, keys};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf(Option<String>),
    Branch(Branch),
}

impl Node {
    pub fn leaf(value: impl Into<String>) -> Self {
        Node::Leaf(Some(value.into()))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Leaf(value) => value.as_deref(),
            Node::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&Branch> {
        match self {
            Node::Branch(branch) => Some(branch),
            Node::Leaf(_) => None,
        }
    }

    /// First non-null scalar reachable from this node, depth first.
    pub fn first_scalar(&self) -> Option<&str> {
        match self {
            Node::Leaf(value) => value.as_deref(),
            Node::Branch(branch) => branch.iter().find_map(|(_, node)| node.first_scalar()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Branch {
    entries: Vec<(String, Node)>,
}

impl Branch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.position(key).map(|idx| &self.entries[idx].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.position(key).map(move |idx| &mut self.entries[idx].1)
    }

    /// Scalar value stored under `key`, if it is a non-null leaf.
    pub fn leaf(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Node::as_str)
    }

    pub fn branch(&self, key: &str) -> Option<&Branch> {
        self.get(key).and_then(Node::as_branch)
    }

    pub fn branch_get_mut(&mut self, key: &str) -> Option<&mut Branch> {
        match self.get_mut(key) {
            Some(Node::Branch(branch)) => Some(branch),
            _ => None,
        }
    }

    pub fn descend(&self, path: &[&str]) -> Option<&Branch> {
        path.iter().try_fold(self, |branch, key| branch.branch(key))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(key, node)| (key.as_str(), node))
    }

    pub fn first(&self) -> Option<(&str, &Node)> {
        self.entries.first().map(|(key, node)| (key.as_str(), node))
    }

    /// Inserts or replaces `key`; a replaced entry keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, node: Node) -> Option<Node> {
        let key = key.into();
        match self.position(&key) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, node)),
            None => {
                self.entries.push((key, node));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.position(key).map(|idx| self.entries.remove(idx).1)
    }

    /// Child branch under `key`, created when missing. A scalar already at
    /// `key` is kept under the recovered-scalar key of the new branch.
    pub fn branch_mut(&mut self, key: &str) -> &mut Branch {
        let idx = match self.position(key) {
            Some(idx) => idx,
            None => {
                self.entries.push((key.to_string(), Node::Branch(Branch::new())));
                self.entries.len() - 1
            }
        };
        let slot = &mut self.entries[idx].1;
        if let Node::Leaf(value) = slot {
            let mut recovered = Branch::new();
            recovered.insert(keys::RECOVERED_SCALAR, Node::Leaf(value.take()));
            *slot = Node::Branch(recovered);
        }
        match slot {
            Node::Branch(branch) => branch,
            Node::Leaf(_) => unreachable!("leaf replaced by branch above"),
        }
    }

    pub fn branch_at_mut(&mut self, path: &[&str]) -> &mut Branch {
        path.iter().fold(self, |branch, key| branch.branch_mut(key))
    }

    /// Stores a scalar under `key`. An existing branch there keeps its
    /// children and takes the value under the recovered-scalar key.
    pub fn set_value(&mut self, key: &str, value: Option<String>) {
        match self.get_mut(key) {
            Some(Node::Branch(children)) => {
                children.insert(keys::RECOVERED_SCALAR, Node::Leaf(value));
            }
            Some(slot) => *slot = Node::Leaf(value),
            None => self.entries.push((key.to_string(), Node::Leaf(value))),
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Leaf(value) => value.serialize(serializer),
            Node::Branch(branch) => branch.serialize(serializer),
        }
    }
}

impl Serialize for Branch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, node) in &self.entries {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}

/// The normalized form of one row: `bts:Thing` plus the diagnostic bucket of
/// columns no class matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedTree {
    root: Branch,
}

impl Serialize for NormalizedTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

impl NormalizedTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &Branch {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Branch {
        &mut self.root
    }

    pub fn thing(&self) -> Option<&Branch> {
        self.root.branch(vocab::THING)
    }

    pub fn thing_mut(&mut self) -> &mut Branch {
        self.root.branch_mut(vocab::THING)
    }

    pub fn missing_mapping(&self) -> Option<&Branch> {
        self.root.branch(keys::MISSING_MAPPING)
    }

    pub fn into_root(self) -> Branch {
        self.root
    }
}
