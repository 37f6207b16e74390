//! Pre-order search across a whole subtree.
//!
//! Traversal holds no lock across the walk: each step reads one atom's id,
//! type or child list on its own. A tree mutated concurrently is observed
//! consistently per atom, not as a single snapshot.

use tracing::instrument;

use crate::domain::atom::AtomRef;

/// Depth-first pre-order iterator: an atom, then each child's full subtree
/// left to right.
#[derive(Debug)]
pub struct PreOrder {
    stack: Vec<AtomRef>,
}

impl PreOrder {
    pub fn new<'a>(root: impl Into<Option<&'a AtomRef>>) -> Self {
        Self {
            stack: root.into().into_iter().cloned().collect(),
        }
    }
}

impl Iterator for PreOrder {
    type Item = AtomRef;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        self.stack.extend(current.children_get().into_iter().rev());
        Some(current)
    }
}

/// First atom with `id` in pre-order, `root` included.
#[instrument(level = "trace", skip(root))]
pub fn find_by_id<'a>(root: impl Into<Option<&'a AtomRef>>, id: &str) -> Option<AtomRef> {
    PreOrder::new(root).find(|atom| atom.get_id() == id)
}

/// First atom of `atom_type` in pre-order, `root` included.
#[instrument(level = "trace", skip(root))]
pub fn find_first_by_type<'a>(
    root: impl Into<Option<&'a AtomRef>>,
    atom_type: &str,
) -> Option<AtomRef> {
    PreOrder::new(root).find(|atom| atom.get_type() == atom_type)
}

/// Every atom of `atom_type` in pre-order, `root` included.
#[instrument(level = "trace", skip(root))]
pub fn find_all_by_type<'a>(
    root: impl Into<Option<&'a AtomRef>>,
    atom_type: &str,
) -> Vec<AtomRef> {
    PreOrder::new(root)
        .filter(|atom| atom.get_type() == atom_type)
        .collect()
}

/// Number of levels below and including `root`; 0 for no root.
pub fn depth<'a>(root: impl Into<Option<&'a AtomRef>>) -> usize {
    match root.into() {
        None => 0,
        Some(atom) => {
            1 + atom
                .children_get()
                .iter()
                .map(|child| depth(child))
                .max()
                .unwrap_or(0)
        }
    }
}
