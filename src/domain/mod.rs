//! Domain layer: the atom tree and its search operations
//!
//! No I/O and no encodings here; codecs live in [`crate::codec`].

pub mod atom;
pub mod builder;
pub mod error;
pub mod find;
pub mod ids;
pub mod property;

pub use atom::{Atom, AtomRef};
pub use builder::AtomBuilder;
pub use error::{AtomError, AtomResult};
pub use find::{depth, find_all_by_type, find_by_id, find_first_by_type, PreOrder};
pub use ids::{
    default_generator, generate_id, set_default_generator, HumanIdGenerator, IdGenerator,
    SharedGenerator, UuidGenerator,
};
pub use property::Property;
