//! Builds the normalized tree of one row.

use tracing::debug;

use crate::classify::AssayLineage;
use crate::ontology::{ClassNode, OntologyIndex};
use crate::table::Row;
use crate::tree::{Branch, Node, NormalizedTree};
use crate::vocab::{self, columns, keys};

#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    pub skip_empty: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self { skip_empty: true }
    }
}

pub struct TreeBuilder<'a> {
    ontology: &'a OntologyIndex,
    options: NormalizeOptions,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(ontology: &'a OntologyIndex, options: NormalizeOptions) -> Self {
        Self { ontology, options }
    }

    pub fn build(&self, row: &Row, lineage: &AssayLineage) -> NormalizedTree {
        let mut tree = NormalizedTree::new();
        let assay_path = lineage.node_path();

        for (column, raw) in row.iter() {
            if self.options.skip_empty && raw.is_empty() {
                continue;
            }
            let value = (!raw.is_empty()).then(|| raw.to_string());

            let Some(class) = self.resolve(column, raw) else {
                debug!(column, "no schema class for column");
                tree.root_mut()
                    .branch_mut(keys::MISSING_MAPPING)
                    .set_value(column, value);
                continue;
            };

            if lineage.depends_on(&class.id) {
                tree.root_mut()
                    .branch_at_mut(&assay_path)
                    .set_value(&class.id, value.clone());
            }

            let mut path = self.ontology.ancestors(&class.id);
            path.reverse();
            // assay-scoped fields only land on the assay node
            if path.contains(&vocab::ASSAY) {
                continue;
            }
            if let Some((last, parents)) = path.split_last() {
                tree.root_mut().branch_at_mut(parents).set_value(last, value);
            }
        }

        self.correct(&mut tree, row, &assay_path);
        tree
    }

    fn resolve(&self, column: &str, raw: &str) -> Option<&'a ClassNode> {
        match column {
            columns::BIOSPECIMEN => self.ontology.by_id(vocab::BIOSPECIMEN_ID),
            columns::ASSAY => self.ontology.by_id(vocab::ASSAY_TYPE),
            _ => self.ontology.resolve_column(column, raw),
        }
    }

    fn correct(&self, tree: &mut NormalizedTree, row: &Row, assay_path: &[&str]) {
        let thing = tree.thing_mut();

        for key in [vocab::FILENAME, vocab::FILE_FORMAT] {
            if let Some(node) = thing.remove(key) {
                thing
                    .branch_at_mut(&[vocab::INFORMATION_CONTENT_ENTITY, vocab::FILE])
                    .insert(key, node);
            }
        }

        let participant = row.value(columns::PARTICIPANT_ID);
        for path in [
            [vocab::INDIVIDUAL_ORGANISM, vocab::PATIENT],
            [vocab::BIOSAMPLE, vocab::BIOSPECIMEN],
        ] {
            let branch = thing.branch_at_mut(&path);
            if !branch.contains_key(vocab::PARTICIPANT_ID) {
                branch.insert(vocab::PARTICIPANT_ID, Node::leaf(participant));
            }
        }

        let data_type = thing
            .branch_get_mut(vocab::PUBLICATION)
            .and_then(|publication| publication.remove(vocab::DATA_TYPE));
        let biospecimen = thing
            .branch_at_mut(&[vocab::BIOSAMPLE, vocab::BIOSPECIMEN])
            .clone();

        let root = tree.root_mut();
        let assay = root.branch_at_mut(assay_path);
        if let Some(data_type) = data_type {
            splice_data_type(assay, data_type);
        }
        for key in [
            vocab::PARTICIPANT_ID,
            vocab::BIOSPECIMEN_ID,
            vocab::PARENT_BIOSPECIMEN_ID,
        ] {
            copy_field(&biospecimen, assay, key);
        }

        let file = root
            .branch_mut(vocab::THING)
            .branch_at_mut(&[vocab::INFORMATION_CONTENT_ENTITY, vocab::FILE]);
        copy_field(&biospecimen, file, vocab::PARTICIPANT_ID);
    }
}

/// Moves the fields of the first data type class onto the assay node.
fn splice_data_type(assay: &mut Branch, data_type: Node) {
    let Node::Branch(data_type) = data_type else {
        return;
    };
    let Some((class, fields)) = data_type.first() else {
        return;
    };
    match fields {
        Node::Branch(fields) => {
            for (key, node) in fields.iter() {
                assay.insert(key, node.clone());
            }
        }
        Node::Leaf(_) => {
            assay.insert(class, fields.clone());
        }
    }
}

/// Overwrites `key` in `target` with the source's value; a key the source
/// lacks is removed from the target.
fn copy_field(source: &Branch, target: &mut Branch, key: &str) {
    match source.get(key) {
        Some(node) => {
            target.insert(key, node.clone());
        }
        None => {
            target.remove(key);
        }
    }
}
