//! Builder for atoms with initial identity, properties and children.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::atom::{Atom, AtomRef};
use crate::domain::ids::{self, SharedGenerator};

/// Configures an [`Atom`] before it is shared.
///
/// ```
/// use atomtree::Atom;
///
/// let page = Atom::builder("page")
///     .id("home")
///     .property("title", "Welcome")
///     .child(Atom::with_id("section", "hero"))
///     .build();
/// assert_eq!(page.get("title"), "Welcome");
/// assert_eq!(page.children_length(), 1);
/// ```
#[derive(Debug)]
pub struct AtomBuilder {
    atom_type: String,
    id: Option<String>,
    generator: Option<SharedGenerator>,
    properties: BTreeMap<String, String>,
    children: Vec<AtomRef>,
}

impl AtomBuilder {
    pub fn new(atom_type: impl Into<String>) -> Self {
        Self {
            atom_type: atom_type.into(),
            id: None,
            generator: None,
            properties: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Generator consulted only when no explicit id is given.
    pub fn generator(mut self, generator: SharedGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn properties<I, K, V>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.properties
            .extend(properties.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn child(mut self, child: impl Into<Option<AtomRef>>) -> Self {
        self.children.extend(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<AtomRef>>,
    {
        self.children
            .extend(children.into_iter().filter_map(|child| child.into()));
        self
    }

    pub fn build(self) -> AtomRef {
        let id = match (self.id, self.generator) {
            (Some(id), _) => id,
            (None, Some(generator)) => generator.generate(),
            (None, None) => ids::generate_id(),
        };
        Arc::new(Atom::from_parts(
            id,
            self.atom_type,
            self.properties,
            self.children,
        ))
    }
}
