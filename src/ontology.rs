//! Read-only index over the HTAN class graph.
//!
//! The ontology lists superclasses and dependencies as ordered arrays, but only
//! the first superclass is authoritative: every traversal here follows a single
//! parent and ignores the rest. This mirrors how the HTAN model is authored,
//! where additional superclasses are annotations rather than lineage.

use std::collections::{HashMap, HashSet};
use std::fs;

use camino::Utf8Path;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::HtanError;
use crate::vocab;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    #[serde(rename = "@id")]
    pub id: String,
}

impl IdRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassNode {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "sms:displayName", default)]
    pub display_name: Option<String>,
    #[serde(rename = "rdfs:label", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(
        rename = "rdfs:subClassOf",
        default,
        deserialize_with = "one_or_many"
    )]
    pub sub_class_of: Vec<IdRef>,
    #[serde(
        rename = "sms:requiresDependency",
        default,
        deserialize_with = "one_or_many"
    )]
    pub requires_dependency: Vec<IdRef>,
}

impl ClassNode {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: Some(display_name.into()),
            label: None,
            sub_class_of: Vec::new(),
            requires_dependency: Vec::new(),
        }
    }

    pub fn with_superclass(mut self, id: impl Into<String>) -> Self {
        self.sub_class_of.push(IdRef::new(id));
        self
    }

    pub fn with_dependency(mut self, id: impl Into<String>) -> Self {
        self.requires_dependency.push(IdRef::new(id));
        self
    }

    /// The authoritative superclass; any further entries are ignored.
    pub fn superclass(&self) -> Option<&str> {
        self.sub_class_of.first().map(|sc| sc.id.as_str())
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.requires_dependency.iter().map(|rd| rd.id.as_str())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(IdRef),
    Many(Vec<IdRef>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<IdRef>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(id)) => vec![id],
        Some(OneOrMany::Many(ids)) => ids,
        None => Vec::new(),
    })
}

#[derive(Debug, Deserialize)]
struct SchemaDocument {
    #[serde(rename = "@graph")]
    graph: Vec<ClassNode>,
}

#[derive(Debug, Clone)]
pub struct OntologyIndex {
    nodes: Vec<ClassNode>,
    by_id: HashMap<String, usize>,
    by_display_name: HashMap<String, usize>,
    by_sub_class: HashMap<String, Vec<usize>>,
    by_dependency_of: HashMap<String, Vec<usize>>,
}

impl OntologyIndex {
    pub fn load(path: &Utf8Path) -> Result<Self, HtanError> {
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|_| HtanError::SchemaRead(path.to_path_buf()))?;
        let index = Self::from_json_str(&content)?;
        debug!(path = %path, classes = index.len(), "loaded schema");
        Ok(index)
    }

    pub fn from_json_str(content: &str) -> Result<Self, HtanError> {
        let document: SchemaDocument =
            serde_json::from_str(content).map_err(|err| HtanError::SchemaLoad(err.to_string()))?;
        Ok(Self::from_nodes(document.graph))
    }

    /// Builds the index after patching the graph with the classes HTAN omits.
    pub fn from_nodes(mut nodes: Vec<ClassNode>) -> Self {
        nodes.extend(patch_nodes());
        for node in &mut nodes {
            if node.display_name.as_deref() == Some("Imaging Level 3 Image") {
                node.display_name = Some("Imaging Level 3".to_string());
                node.id = "bts:ImagingLevel3".to_string();
                node.label = Some("ImagingLevel3".to_string());
            }
        }

        let mut by_id = HashMap::new();
        let mut by_display_name = HashMap::new();
        for (idx, node) in nodes.iter().enumerate() {
            by_id.insert(node.id.clone(), idx);
            if let Some(name) = &node.display_name {
                by_display_name.insert(name.clone(), idx);
            }
        }

        let mut by_sub_class: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_dependency_of: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, node) in nodes.iter().enumerate() {
            // later duplicates of an id shadow earlier ones
            if by_id.get(&node.id) != Some(&idx) {
                continue;
            }
            for sc in &node.sub_class_of {
                by_sub_class.entry(sc.id.clone()).or_default().push(idx);
            }
            for rd in &node.requires_dependency {
                by_dependency_of.entry(rd.id.clone()).or_default().push(idx);
            }
        }

        Self {
            nodes,
            by_id,
            by_display_name,
            by_sub_class,
            by_dependency_of,
        }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn by_id(&self, id: &str) -> Option<&ClassNode> {
        self.by_id.get(id).map(|&idx| &self.nodes[idx])
    }

    /// Looks a class up by display name, then `HTAN `-prefixed display name,
    /// then as a `bts:` identifier with and without spaces.
    pub fn by_display_name(&self, name: &str) -> Option<&ClassNode> {
        if name.is_empty() {
            return None;
        }
        self.by_display_name
            .get(name)
            .or_else(|| self.by_display_name.get(&format!("HTAN {name}")))
            .map(|&idx| &self.nodes[idx])
            .or_else(|| self.by_id(&format!("{}{name}", vocab::BTS)))
            .or_else(|| self.by_content(name))
    }

    pub fn by_content(&self, content: &str) -> Option<&ClassNode> {
        if content.is_empty() {
            return None;
        }
        self.by_id(&format!("{}{}", vocab::BTS, strip_spaces(content)))
    }

    pub fn by_sub_class_of(&self, parent_id: &str) -> Vec<&ClassNode> {
        self.collect(self.by_sub_class.get(parent_id))
    }

    pub fn by_dependency_of(&self, owner_id: &str) -> Vec<&ClassNode> {
        self.collect(self.by_dependency_of.get(owner_id))
    }

    /// Columns are named either by a controlled-vocabulary term or by free
    /// text that happens to match an identifier.
    pub fn resolve_column(&self, display_name: &str, content: &str) -> Option<&ClassNode> {
        self.by_display_name(display_name)
            .or_else(|| self.by_content(content))
    }

    pub fn superclass_of(&self, id: &str) -> Option<&str> {
        self.by_id(id).and_then(ClassNode::superclass)
    }

    /// Ancestor chain of `id`, starting with `id` itself and ending at the
    /// first class whose superclass is absent or unknown.
    pub fn ancestors(&self, id: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.by_id(id);
        while let Some(node) = current {
            if !seen.insert(node.id.as_str()) {
                break;
            }
            chain.push(node.id.as_str());
            current = node.superclass().and_then(|sc| self.by_id(sc));
        }
        chain
    }

    fn collect(&self, indices: Option<&Vec<usize>>) -> Vec<&ClassNode> {
        indices
            .map(|indices| indices.iter().map(|&idx| &self.nodes[idx]).collect())
            .unwrap_or_default()
    }
}

pub fn strip_spaces(value: &str) -> String {
    value.replace(' ', "")
}

fn patch_nodes() -> Vec<ClassNode> {
    vec![
        ClassNode::new(vocab::THING, "Thing"),
        ClassNode::new(vocab::DATA_ACCESS, "Data Access").with_superclass(vocab::FILE),
        ClassNode::new(vocab::SYNAPSE_ID, "Synapse Id").with_superclass(vocab::FILE),
    ]
}
