//! Thread-safe atom node: identity, type, string properties and ordered children.

use std::collections::BTreeMap;
use std::fmt;
use std::mem;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use termtree::Tree;

use crate::domain::builder::AtomBuilder;
use crate::domain::ids;
use crate::domain::property::Property;

/// Shared handle to an atom. Children are held through this handle, so the
/// same atom may be attached under several parents.
pub type AtomRef = Arc<Atom>;

/// Owned copy of one atom's fields, taken under a single read lock.
#[derive(Debug, Clone, Default)]
pub(crate) struct AtomSnapshot {
    pub id: String,
    pub atom_type: String,
    pub properties: BTreeMap<String, String>,
    pub children: Vec<AtomRef>,
}

#[derive(Debug, Default)]
struct AtomState {
    id: String,
    atom_type: String,
    properties: BTreeMap<String, String>,
    children: Vec<AtomRef>,
}

/// A composable tree node.
///
/// Every atom owns one reader/writer lock over its own state. Reads take the
/// shared lock and return copies built while the lock is held; writes take the
/// exclusive lock. No method ever locks two atoms at once, so atoms may be
/// shared freely across threads. Cycles (an atom reachable from itself) are a
/// caller error and are not detected.
pub struct Atom {
    state: RwLock<AtomState>,
}

impl Atom {
    /// New atom of `atom_type` with an id from the process-wide generator.
    pub fn new(atom_type: impl Into<String>) -> AtomRef {
        Self::with_id(atom_type, ids::generate_id())
    }

    pub fn with_id(atom_type: impl Into<String>, id: impl Into<String>) -> AtomRef {
        Arc::new(Self::from_parts(
            id.into(),
            atom_type.into(),
            BTreeMap::new(),
            Vec::new(),
        ))
    }

    pub fn builder(atom_type: impl Into<String>) -> AtomBuilder {
        AtomBuilder::new(atom_type)
    }

    pub(crate) fn from_parts(
        id: String,
        atom_type: String,
        properties: BTreeMap<String, String>,
        children: Vec<AtomRef>,
    ) -> Self {
        Self {
            state: RwLock::new(AtomState {
                id,
                atom_type,
                properties,
                children,
            }),
        }
    }

    // Poisoned locks are recovered: every write replaces whole fields.
    fn read(&self) -> RwLockReadGuard<'_, AtomState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AtomState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn snapshot(&self) -> AtomSnapshot {
        let state = self.read();
        AtomSnapshot {
            id: state.id.clone(),
            atom_type: state.atom_type.clone(),
            properties: state.properties.clone(),
            children: state.children.clone(),
        }
    }

    pub fn get_id(&self) -> String {
        self.read().id.clone()
    }

    pub fn set_id(&self, id: impl Into<String>) -> &Self {
        self.write().id = id.into();
        self
    }

    pub fn get_type(&self) -> String {
        self.read().atom_type.clone()
    }

    pub fn set_type(&self, atom_type: impl Into<String>) -> &Self {
        self.write().atom_type = atom_type.into();
        self
    }

    /// Property value, or an empty string when the key is absent.
    pub fn get(&self, key: &str) -> String {
        self.read().properties.get(key).cloned().unwrap_or_default()
    }

    pub fn has(&self, key: &str) -> bool {
        self.read().properties.contains_key(key)
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> &Self {
        self.write().properties.insert(key.into(), value.into());
        self
    }

    pub fn remove(&self, key: &str) -> &Self {
        self.write().properties.remove(key);
        self
    }

    /// Copy of all properties.
    pub fn get_all(&self) -> BTreeMap<String, String> {
        self.read().properties.clone()
    }

    /// Replace all properties. The map is moved in, so the caller keeps no
    /// handle that could alias the stored properties.
    pub fn set_all(&self, properties: BTreeMap<String, String>) -> &Self {
        self.write().properties = properties;
        self
    }

    pub fn properties_len(&self) -> usize {
        self.read().properties.len()
    }

    pub fn get_property(&self, name: &str) -> Option<Property> {
        self.read()
            .properties
            .get(name)
            .map(|value| Property::new(name, value.clone()))
    }

    pub fn set_property(&self, property: impl Into<Property>) -> &Self {
        let (name, value) = property.into().into_pair();
        self.set(name, value)
    }

    /// Append a child; `None` is ignored.
    pub fn child_add(&self, child: impl Into<Option<AtomRef>>) -> &Self {
        if let Some(child) = child.into() {
            self.write().children.push(child);
        }
        self
    }

    /// Append children in order, skipping `None` entries.
    pub fn children_add<I>(&self, children: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<Option<AtomRef>>,
    {
        let incoming: Vec<AtomRef> = children
            .into_iter()
            .filter_map(|child| child.into())
            .collect();
        if !incoming.is_empty() {
            self.write().children.extend(incoming);
        }
        self
    }

    /// Remove the first immediate child with `id`.
    pub fn child_delete_by_id(&self, id: &str) -> &Self {
        // Child ids are read without holding our own lock; the match is then
        // removed by identity. A match taken by another writer meanwhile is
        // looked up again.
        while let Some(target) = self.child_find_by_id(id) {
            let mut state = self.write();
            if let Some(pos) = state.children.iter().position(|c| Arc::ptr_eq(c, &target)) {
                state.children.remove(pos);
                break;
            }
        }
        self
    }

    /// First immediate child with `id`; grandchildren are not searched.
    pub fn child_find_by_id(&self, id: &str) -> Option<AtomRef> {
        self.children_get().into_iter().find(|c| c.get_id() == id)
    }

    /// All immediate children of `atom_type`, in insertion order.
    pub fn children_find_by_type(&self, atom_type: &str) -> Vec<AtomRef> {
        self.children_get()
            .into_iter()
            .filter(|c| c.get_type() == atom_type)
            .collect()
    }

    /// Copy of the child list.
    pub fn children_get(&self) -> Vec<AtomRef> {
        self.read().children.clone()
    }

    /// Replace the child list, skipping `None` entries.
    pub fn children_set<I>(&self, children: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<Option<AtomRef>>,
    {
        let replacement: Vec<AtomRef> = children
            .into_iter()
            .filter_map(|child| child.into())
            .collect();
        self.write().children = replacement;
        self
    }

    pub fn children_length(&self) -> usize {
        self.read().children.len()
    }

    /// True when the subtree spans at most `max` levels, this atom included.
    /// Recursion stops at `max`, so arbitrarily deep trees are safe to check.
    pub(crate) fn depth_within(&self, max: usize) -> bool {
        max > 0
            && self
                .children_get()
                .iter()
                .all(|child| child.depth_within(max - 1))
    }

    /// Rough footprint in bytes, children included. Diagnostic only.
    pub fn memory_usage(&self) -> usize {
        let (own, children) = {
            let state = self.read();
            let own = mem::size_of::<Atom>()
                + state.id.len()
                + state.atom_type.len()
                + state
                    .properties
                    .iter()
                    .map(|(k, v)| k.len() + v.len())
                    .sum::<usize>()
                + state.children.len() * mem::size_of::<AtomRef>();
            (own, state.children.clone())
        };
        own + children.iter().map(|c| c.memory_usage()).sum::<usize>()
    }

    /// Render the subtree as `type#id` lines.
    pub fn to_tree_string(&self) -> Tree<String> {
        let label = {
            let state = self.read();
            format!("{}#{}", state.atom_type, state.id)
        };
        let leaves: Vec<_> = self
            .children_get()
            .iter()
            .map(|c| c.to_tree_string())
            .collect();
        Tree::new(label).with_leaves(leaves)
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("Atom")
            .field("id", &state.id)
            .field("type", &state.atom_type)
            .field("properties", &state.properties)
            .field("children", &state.children.len())
            .finish()
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        write!(f, "{}#{}", state.atom_type, state.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_new_atom_when_created_then_has_generated_id_and_no_state() {
        let a = Atom::new("doc");
        assert!(!a.get_id().is_empty());
        assert_eq!(a.get_type(), "doc");
        assert!(a.get_all().is_empty());
        assert_eq!(a.children_length(), 0);
    }

    #[test]
    fn given_two_new_atoms_when_created_then_ids_differ() {
        assert_ne!(Atom::new("t").get_id(), Atom::new("t").get_id());
    }

    #[test]
    fn given_atom_when_setting_id_and_type_then_getters_reflect_change() {
        let a = Atom::with_id("t", "i");
        a.set_id("other").set_type("kind");
        assert_eq!(a.get_id(), "other");
        assert_eq!(a.get_type(), "kind");
    }

    #[test]
    fn given_property_set_when_removed_then_get_returns_empty() {
        let a = Atom::new("t");
        a.set("k", "v");
        assert!(a.has("k"));
        assert_eq!(a.get("k"), "v");
        a.remove("k");
        assert!(!a.has("k"));
        assert_eq!(a.get("k"), "");
        a.remove("k");
    }

    #[test]
    fn given_property_accessor_when_round_tripped_then_matches_map_storage() {
        let a = Atom::new("t");
        a.set_property(Property::new("title", "x"));
        assert_eq!(a.get("title"), "x");
        assert_eq!(a.get_property("title"), Some(Property::new("title", "x")));
        assert_eq!(a.get_property("missing"), None);
    }

    #[test]
    fn given_children_with_none_when_set_then_none_entries_are_dropped() {
        let a = Atom::new("t");
        let c1 = Atom::with_id("c", "1");
        let c2 = Atom::with_id("c", "2");
        a.children_set(vec![Some(c1), None, Some(c2)]);
        let ids: Vec<String> = a.children_get().iter().map(|c| c.get_id()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        a.child_add(None::<AtomRef>);
        assert_eq!(a.children_length(), 2);
    }

    #[test]
    fn given_duplicate_ids_when_deleting_then_only_first_match_is_removed() {
        let a = Atom::new("t");
        a.children_add([
            Atom::with_id("x", "dup"),
            Atom::with_id("y", "keep"),
            Atom::with_id("z", "dup"),
        ]);
        a.child_delete_by_id("dup");
        let types: Vec<String> = a.children_get().iter().map(|c| c.get_type()).collect();
        assert_eq!(types, vec!["y", "z"]);
        a.child_delete_by_id("absent");
        assert_eq!(a.children_length(), 2);
    }

    #[test]
    fn given_chain_when_checking_depth_then_bound_is_inclusive() {
        let root = Atom::with_id("n", "0");
        let mut tip = Arc::clone(&root);
        for i in 1..5 {
            let next = Atom::with_id("n", i.to_string());
            tip.child_add(Arc::clone(&next));
            tip = next;
        }
        assert!(root.depth_within(5));
        assert!(!root.depth_within(4));
        assert!(!root.depth_within(0));
    }

    #[test]
    fn given_nested_atoms_when_measuring_memory_then_usage_grows() {
        let a = Atom::new("t");
        let base = a.memory_usage();
        assert!(base > 0);
        a.set("a", "x".repeat(100));
        a.child_add(Atom::new("child"));
        assert!(a.memory_usage() > base + 100);
    }

    #[test]
    fn given_tree_when_rendering_then_labels_are_type_and_id() {
        let root = Atom::with_id("root", "r");
        root.child_add(Atom::with_id("leaf", "l"));
        let rendered = root.to_tree_string().to_string();
        assert!(rendered.contains("root#r"));
        assert!(rendered.contains("leaf#l"));
    }
}
