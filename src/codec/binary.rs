//! Recursive binary encoding.
//!
//! Each atom is encoded on its own: id, type, properties, then one
//! self-contained byte block per child. A child block can be decoded without
//! the rest of the tree. Collections are a count followed by a presence flag
//! and a block per element, so gaps survive a round trip.
//!
//! The format is stable only within one version of this crate.

use std::collections::BTreeMap;
use std::sync::Arc;

use bincode::Options;
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::codec::DEFAULT_MAX_DEPTH;
use crate::domain::atom::{Atom, AtomRef};
use crate::domain::error::{AtomError, AtomResult};

/// Default upper bound for any single encode or decode, in bytes.
pub const DEFAULT_MAX_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, Serialize, Deserialize)]
struct WireAtom {
    id: String,
    atom_type: String,
    properties: BTreeMap<String, String>,
    children: Vec<Vec<u8>>,
}

/// Binary encoder/decoder with a byte limit and a nesting limit.
///
/// The byte limit bounds every length prefix read during decoding, so a
/// corrupt or hostile prefix fails instead of allocating. The nesting limit
/// bounds recursion: a tree deeper than `max_depth` levels fails to encode
/// and to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryCodec {
    max_bytes: u64,
    max_depth: usize,
}

impl Default for BinaryCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BYTES)
    }
}

impl BinaryCodec {
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn options(&self) -> impl Options {
        bincode::DefaultOptions::new()
            .with_varint_encoding()
            .with_limit(self.max_bytes)
            .reject_trailing_bytes()
    }

    pub fn encode(&self, atom: &Atom) -> AtomResult<Vec<u8>> {
        self.encode_at(atom, 1)
    }

    fn encode_at(&self, atom: &Atom, level: usize) -> AtomResult<Vec<u8>> {
        if level > self.max_depth {
            return Err(AtomError::TooDeep {
                max: self.max_depth,
            });
        }
        let snapshot = atom.snapshot();
        let children = snapshot
            .children
            .iter()
            .map(|child| self.encode_at(child, level + 1))
            .collect::<AtomResult<Vec<_>>>()?;
        let wire = WireAtom {
            id: snapshot.id,
            atom_type: snapshot.atom_type,
            properties: snapshot.properties,
            children,
        };
        self.options()
            .serialize(&wire)
            .map_err(|e| AtomError::binary("encode", e))
    }

    /// Decode one atom; truncated, oversized, too deep or trailing input fails.
    pub fn decode(&self, data: &[u8]) -> AtomResult<AtomRef> {
        self.decode_at(data, 1)
    }

    fn decode_at(&self, data: &[u8], level: usize) -> AtomResult<AtomRef> {
        if data.is_empty() {
            return Err(AtomError::EmptyInput);
        }
        if level > self.max_depth {
            return Err(AtomError::TooDeep {
                max: self.max_depth,
            });
        }
        let wire: WireAtom = self
            .options()
            .deserialize(data)
            .map_err(|e| AtomError::binary("decode", e))?;
        trace!(id = %wire.id, children = wire.children.len(), "decoded atom header");

        let children = wire
            .children
            .iter()
            .enumerate()
            .map(|(index, block)| {
                self.decode_at(block, level + 1)
                    .map_err(|e| AtomError::child(index, e))
            })
            .collect::<AtomResult<Vec<_>>>()?;

        Ok(Arc::new(Atom::from_parts(
            wire.id,
            wire.atom_type,
            wire.properties,
            children,
        )))
    }

    /// Encode a possibly sparse collection. No atoms encode to no bytes.
    #[instrument(level = "debug", skip(self, atoms))]
    pub fn encode_all<I>(&self, atoms: I) -> AtomResult<Vec<u8>>
    where
        I: IntoIterator,
        I::Item: Into<Option<AtomRef>>,
    {
        let atoms: Vec<Option<AtomRef>> = atoms.into_iter().map(|a| a.into()).collect();
        if atoms.is_empty() {
            return Ok(Vec::new());
        }
        let blocks = atoms
            .iter()
            .map(|slot| slot.as_deref().map(|atom| self.encode(atom)).transpose())
            .collect::<AtomResult<Vec<Option<Vec<u8>>>>>()?;
        self.options()
            .serialize(&blocks)
            .map_err(|e| AtomError::binary("encode collection", e))
    }

    /// Decode a collection written by [`BinaryCodec::encode_all`], gaps included.
    /// No bytes decode to no atoms.
    #[instrument(level = "debug", skip(self, data), fields(len = data.len()))]
    pub fn decode_all(&self, data: &[u8]) -> AtomResult<Vec<Option<AtomRef>>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let blocks: Vec<Option<Vec<u8>>> = self
            .options()
            .deserialize(data)
            .map_err(|e| AtomError::binary("decode collection", e))?;
        blocks
            .iter()
            .enumerate()
            .map(|(index, block)| {
                block
                    .as_deref()
                    .map(|bytes| self.decode(bytes))
                    .transpose()
                    .map_err(|e| AtomError::element(index, e))
            })
            .collect()
    }
}

impl Atom {
    pub fn to_binary(&self) -> AtomResult<Vec<u8>> {
        BinaryCodec::default().encode(self)
    }

    pub fn from_binary(data: &[u8]) -> AtomResult<AtomRef> {
        BinaryCodec::default().decode(data)
    }
}

pub fn atoms_to_binary<I>(atoms: I) -> AtomResult<Vec<u8>>
where
    I: IntoIterator,
    I::Item: Into<Option<AtomRef>>,
{
    BinaryCodec::default().encode_all(atoms)
}

pub fn binary_to_atoms(data: &[u8]) -> AtomResult<Vec<Option<AtomRef>>> {
    BinaryCodec::default().decode_all(data)
}
