//! Encodings: map form, JSON text and binary.

/// Deepest tree, in atom levels, that the codecs accept by default. JSON
/// decoding always uses it; the binary codec can be given another limit.
pub const DEFAULT_MAX_DEPTH: usize = 128;

pub mod binary;
pub mod json;
pub mod map;

pub use binary::{atoms_to_binary, binary_to_atoms, BinaryCodec, DEFAULT_MAX_BYTES};
pub use json::{
    atoms_to_json, atoms_to_json_pretty, json_to_atoms, validate_atom_json, DEFAULT_INDENT,
};
pub use map::{atom_from_value, atoms_to_maps, maps_to_atoms, AtomMap};
