//! Named property value, the early accessor shape for atom attributes.

use std::fmt;

/// A name/value pair.
///
/// Atoms store properties directly as a string map; `Property` is the
/// detached view handed out by [`crate::Atom::get_property`] and accepted by
/// [`crate::Atom::set_property`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Property {
    name: String,
    value: String,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn into_pair(self) -> (String, String) {
        (self.name, self.value)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

impl<K: Into<String>, V: Into<String>> From<(K, V)> for Property {
    fn from((name, value): (K, V)) -> Self {
        Self::new(name, value)
    }
}
