//! Structural conversion between atoms and generic JSON-shaped maps.
//!
//! The map form is the pivot for the JSON codec:
//!
//! ```text
//! { "id": string, "type": string, "properties"?: {string: string}, "children": [ ... ] }
//! ```
//!
//! `properties` is omitted when empty and never carries the reserved `id` and
//! `type` keys. `children` is always present.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{instrument, trace};

use crate::codec::DEFAULT_MAX_DEPTH;
use crate::domain::atom::{Atom, AtomRef};
use crate::domain::error::{AtomError, AtomResult};

/// Map form of a single atom.
pub type AtomMap = Map<String, Value>;

pub const KEY_ID: &str = "id";
pub const KEY_TYPE: &str = "type";
pub const KEY_PROPERTIES: &str = "properties";
pub const KEY_CHILDREN: &str = "children";

const ALLOWED_KEYS: [&str; 4] = [KEY_ID, KEY_TYPE, KEY_PROPERTIES, KEY_CHILDREN];

impl Atom {
    /// Convert this atom and its subtree into map form.
    pub fn to_map(&self) -> AtomMap {
        let snapshot = self.snapshot();

        let mut map = AtomMap::new();
        map.insert(KEY_ID.into(), Value::String(snapshot.id));
        map.insert(KEY_TYPE.into(), Value::String(snapshot.atom_type));

        let properties: AtomMap = snapshot
            .properties
            .into_iter()
            .filter(|(k, _)| k != KEY_ID && k != KEY_TYPE)
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        if !properties.is_empty() {
            map.insert(KEY_PROPERTIES.into(), Value::Object(properties));
        }

        let children = snapshot
            .children
            .iter()
            .map(|c| Value::Object(c.to_map()))
            .collect();
        map.insert(KEY_CHILDREN.into(), Value::Array(children));
        map
    }

    /// Build an atom tree from map form, validating every level.
    pub fn from_map(map: &AtomMap) -> AtomResult<AtomRef> {
        atom_from_map(map, 1)
    }
}

/// Build an atom from any JSON value; only objects are accepted.
#[instrument(level = "trace", skip(value))]
pub fn atom_from_value(value: &Value) -> AtomResult<AtomRef> {
    match value {
        Value::Object(map) => atom_from_map(map, 1),
        other => Err(AtomError::NotAnObject {
            found: value_kind(other),
        }),
    }
}

/// Map form of each atom, in order.
pub fn atoms_to_maps(atoms: &[AtomRef]) -> Vec<AtomMap> {
    atoms.iter().map(|a| a.to_map()).collect()
}

/// Atoms from map forms; the first invalid map fails the whole batch.
#[instrument(level = "debug", skip(maps), fields(count = maps.len()))]
pub fn maps_to_atoms(maps: &[AtomMap]) -> AtomResult<Vec<AtomRef>> {
    maps.iter()
        .enumerate()
        .map(|(index, map)| atom_from_map(map, 1).map_err(|e| AtomError::element(index, e)))
        .collect()
}

fn atom_from_map(map: &AtomMap, level: usize) -> AtomResult<AtomRef> {
    if level > DEFAULT_MAX_DEPTH {
        return Err(AtomError::TooDeep {
            max: DEFAULT_MAX_DEPTH,
        });
    }
    if let Some(key) = map.keys().find(|k| !ALLOWED_KEYS.contains(&k.as_str())) {
        return Err(AtomError::UnexpectedKey(key.clone()));
    }

    let id = required_string(map, KEY_ID)?;
    let atom_type = required_string(map, KEY_TYPE)?;

    let properties = match map.get(KEY_PROPERTIES) {
        None => BTreeMap::new(),
        Some(Value::Object(props)) => properties_from_map(props)?,
        Some(other) => {
            return Err(AtomError::InvalidField {
                field: KEY_PROPERTIES,
                expected: "an object",
                found: value_kind(other),
            })
        }
    };

    let children = match map.get(KEY_CHILDREN) {
        None => Vec::new(),
        Some(Value::Array(items)) => children_from_values(items, level)?,
        Some(other) => {
            return Err(AtomError::InvalidField {
                field: KEY_CHILDREN,
                expected: "an array",
                found: value_kind(other),
            })
        }
    };

    Ok(Arc::new(Atom::from_parts(id, atom_type, properties, children)))
}

fn required_string(map: &AtomMap, field: &'static str) -> AtomResult<String> {
    match map.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::String(_)) | None | Some(Value::Null) => Err(AtomError::MissingField(field)),
        Some(other) => Err(AtomError::InvalidField {
            field,
            expected: "a string",
            found: value_kind(other),
        }),
    }
}

fn properties_from_map(props: &AtomMap) -> AtomResult<BTreeMap<String, String>> {
    props
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(AtomError::InvalidPropertyValue {
                        key: key.clone(),
                        found: value_kind(other),
                    })
                }
            };
            Ok((key.clone(), value))
        })
        .collect()
}

fn children_from_values(items: &[Value], level: usize) -> AtomResult<Vec<AtomRef>> {
    let mut children = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match item {
            Value::Null => trace!(index, "skipping null child"),
            Value::Object(child) => {
                let atom =
                    atom_from_map(child, level + 1).map_err(|e| AtomError::child(index, e))?;
                children.push(atom);
            }
            other => {
                return Err(AtomError::child(
                    index,
                    AtomError::NotAnObject {
                        found: value_kind(other),
                    },
                ))
            }
        }
    }
    Ok(children)
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
