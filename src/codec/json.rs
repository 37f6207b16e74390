//! JSON text encoding, built on the map form.

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::codec::map::{atom_from_value, atoms_to_maps, value_kind};
use crate::codec::DEFAULT_MAX_DEPTH;
use crate::domain::atom::{Atom, AtomRef};
use crate::domain::error::{AtomError, AtomResult};

pub const DEFAULT_INDENT: usize = 2;

impl Atom {
    /// Trees deeper than [`DEFAULT_MAX_DEPTH`] are refused, as decoding would
    /// refuse them.
    pub fn to_json(&self) -> AtomResult<String> {
        ensure_depth(self)?;
        Ok(serde_json::to_string(&Value::Object(self.to_map()))?)
    }

    pub fn to_json_pretty(&self) -> AtomResult<String> {
        self.to_json_pretty_with_indent(DEFAULT_INDENT)
    }

    pub fn to_json_pretty_with_indent(&self, indent: usize) -> AtomResult<String> {
        ensure_depth(self)?;
        to_pretty(&Value::Object(self.to_map()), indent)
    }

    /// Parse a single atom object.
    #[instrument(level = "debug", skip(text), fields(len = text.len()))]
    pub fn from_json(text: &str) -> AtomResult<AtomRef> {
        if text.trim().is_empty() {
            return Err(AtomError::EmptyInput);
        }
        atom_from_value(&parse(text)?)
    }
}

/// Encode atoms as a JSON array; no atoms encode as `[]`.
pub fn atoms_to_json(atoms: &[AtomRef]) -> AtomResult<String> {
    atoms.iter().try_for_each(|atom| ensure_depth(atom))?;
    Ok(serde_json::to_string(&atoms_to_maps(atoms))?)
}

pub fn atoms_to_json_pretty(atoms: &[AtomRef], indent: usize) -> AtomResult<String> {
    atoms.iter().try_for_each(|atom| ensure_depth(atom))?;
    let values: Vec<Value> = atoms_to_maps(atoms).into_iter().map(Value::Object).collect();
    to_pretty(&Value::Array(values), indent)
}

/// Decode a single atom object or an array of atom objects.
///
/// A quoted empty string (`""`) decodes to no atoms.
#[instrument(level = "debug", skip(text), fields(len = text.len()))]
pub fn json_to_atoms(text: &str) -> AtomResult<Vec<AtomRef>> {
    if text.trim().is_empty() {
        return Err(AtomError::EmptyInput);
    }
    match parse(text)? {
        Value::String(s) if s.is_empty() => {
            debug!("empty string literal, no atoms");
            Ok(Vec::new())
        }
        value @ Value::Object(_) => Ok(vec![atom_from_value(&value)?]),
        Value::Array(items) => decode_elements(&items),
        other => Err(AtomError::NotAnObject {
            found: value_kind(&other),
        }),
    }
}

/// Check that `text` holds one atom object or an array of atom objects.
pub fn validate_atom_json(text: &str) -> AtomResult<()> {
    if text.trim().is_empty() {
        return Err(AtomError::EmptyInput);
    }
    match parse(text)? {
        value @ Value::Object(_) => atom_from_value(&value).map(|_| ()),
        Value::Array(items) => decode_elements(&items).map(|_| ()),
        other => Err(AtomError::NotAnObject {
            found: value_kind(&other),
        }),
    }
}

fn decode_elements(items: &[Value]) -> AtomResult<Vec<AtomRef>> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| atom_from_value(item).map_err(|e| AtomError::element(index, e)))
        .collect()
}

fn ensure_depth(atom: &Atom) -> AtomResult<()> {
    if atom.depth_within(DEFAULT_MAX_DEPTH) {
        Ok(())
    } else {
        Err(AtomError::TooDeep {
            max: DEFAULT_MAX_DEPTH,
        })
    }
}

/// Parse text into a value without serde_json's fixed recursion limit.
///
/// An atom level takes two nesting levels (its object and its `children`
/// array), plus one for an enclosing list. Nesting is measured first, so
/// the parser never recurses deeper than that.
fn parse(text: &str) -> AtomResult<Value> {
    if nesting_exceeds(text, 2 * DEFAULT_MAX_DEPTH + 1) {
        return Err(AtomError::TooDeep {
            max: DEFAULT_MAX_DEPTH,
        });
    }
    let mut deserializer = serde_json::Deserializer::from_str(text);
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}

/// Whether brackets nest deeper than `limit`, ignoring brackets in strings.
fn nesting_exceeds(text: &str, limit: usize) -> bool {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for byte in text.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                if depth > limit {
                    return true;
                }
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    false
}

fn to_pretty(value: &Value, indent: usize) -> AtomResult<String> {
    let indent = " ".repeat(indent);
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
