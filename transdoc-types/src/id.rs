//! Typed entity identifiers.
//!
//! `Id<T>` is a phantom-typed wrapper around a string value (UUID v4 by
//! default) so that a patient id cannot be passed where a user id is
//! expected. `Reference<T>` is a typed pointer to another entity by id,
//! never embedding the referenced entity's state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use uuid::Uuid;

/// Stable, globally unique identifier for an entity of type `T`.
#[derive(Serialize, Deserialize)]
#[serde(transparent, bound(serialize = "", deserialize = ""))]
pub struct Id<T> {
    value: String,
    #[serde(skip)]
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    /// Wraps an existing identifier value.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    /// Generates a fresh random (UUID v4) identifier.
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

// Manual impls so `T` is not required to be Clone/Eq/etc. itself.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Id").field(&self.value).finish()
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Typed pointer to another entity by its `Id`.
#[derive(Serialize, Deserialize)]
#[serde(transparent, bound(serialize = "", deserialize = ""))]
pub struct Reference<T> {
    id: Id<T>,
}

impl<T> Reference<T> {
    /// Builds a reference to the given id.
    pub fn to(id: Id<T>) -> Self {
        Self { id }
    }

    /// Builds a reference from a raw identifier value.
    pub fn to_value(value: impl Into<String>) -> Self {
        Self { id: Id::new(value) }
    }

    pub fn id(&self) -> &Id<T> {
        &self.id
    }
}

impl<T> Clone for Reference<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
        }
    }
}

impl<T> PartialEq for Reference<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Reference<T> {}

impl<T> Hash for Reference<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Reference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Reference").field(&self.id.value).finish()
    }
}

impl<T> fmt::Display for Reference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.id, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Patient;
    struct User;

    #[test]
    fn ids_compare_by_value() {
        let a: Id<Patient> = Id::new("p-1");
        let b: Id<Patient> = Id::new("p-1");
        assert_eq!(a, b);
        assert_ne!(a, Id::new("p-2"));
    }

    #[test]
    fn generated_ids_are_unique() {
        let a: Id<User> = Id::generate();
        let b: Id<User> = Id::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn id_serializes_transparently() {
        let id: Id<Patient> = Id::new("p-42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"p-42\"");
        let back: Id<Patient> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn reference_round_trips() {
        let r: Reference<User> = Reference::to_value("u-7");
        let json = serde_json::to_string(&r).unwrap();
        let back: Reference<User> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id().value(), "u-7");
    }
}
