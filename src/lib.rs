//! Thread-safe hierarchical property trees.
//!
//! An [`Atom`] carries an id, a type, string properties and ordered children.
//! Atoms are shared through [`AtomRef`] handles and may be read and mutated
//! from several threads. Trees convert to and from a map form, JSON text
//! and a compact binary encoding.
//!
//! ```
//! use atomtree::{find_by_id, Atom};
//!
//! let root = Atom::builder("document").id("doc-1").property("title", "Notes").build();
//! root.child_add(Atom::with_id("para", "p-1"));
//!
//! let json = root.to_json().unwrap();
//! let back = Atom::from_json(&json).unwrap();
//! assert_eq!(find_by_id(&back, "p-1").unwrap().get_type(), "para");
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use codec::{
    atom_from_value, atoms_to_binary, atoms_to_json, atoms_to_json_pretty, atoms_to_maps,
    binary_to_atoms, json_to_atoms, maps_to_atoms, validate_atom_json, AtomMap, BinaryCodec,
};
pub use domain::{
    depth, find_all_by_type, find_by_id, find_first_by_type, generate_id, Atom, AtomBuilder,
    AtomError, AtomRef, AtomResult, PreOrder, Property,
};
