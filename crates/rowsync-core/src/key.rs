#![forbid(unsafe_code)]

//! Identity and addressing types.
//!
//! - [`Key`]: cheap-to-clone string identity of a group.
//! - [`Identified`]: the one capability an item must expose.
//! - [`IndexPath`]: positional address `(group index, item index)`.
//! - [`Location`] / [`LocationWithOptionalItem`]: an [`IndexPath`] resolved
//!   through the store into identity-bearing values.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "config")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque string identity.
///
/// Two keys denote the same group exactly when their strings are equal.
/// Cloning shares the underlying allocation.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Arc<str>);

impl Key {
    /// Create a key from any string-like value.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<&String> for Key {
    fn from(s: &String) -> Self {
        Self::new(s)
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

impl PartialEq<str> for Key {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl PartialEq<String> for Key {
    fn eq(&self, other: &String) -> bool {
        *self.0 == **other
    }
}

#[cfg(feature = "config")]
impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "config")]
impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// An item with a stable identity.
///
/// The identifier is the only thing the engine compares. It must not change
/// while the item is stored; content changes are refreshed by reloading the
/// identity-matched slot.
pub trait Identified {
    /// The item's identifier, unique within its group.
    fn identifier(&self) -> &str;
}

impl Identified for String {
    fn identifier(&self) -> &str {
        self
    }
}

impl Identified for Key {
    fn identifier(&self) -> &str {
        self.as_str()
    }
}

impl<T: Identified + ?Sized> Identified for Arc<T> {
    fn identifier(&self) -> &str {
        (**self).identifier()
    }
}

/// Positional address of an item: group index, then item index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IndexPath {
    pub group: usize,
    pub item: usize,
}

impl IndexPath {
    #[must_use]
    pub const fn new(group: usize, item: usize) -> Self {
        Self { group, item }
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.group, self.item)
    }
}

/// A resolved `(group, item)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location<T> {
    pub group: Key,
    pub item: T,
}

impl<T> Location<T> {
    #[must_use]
    pub fn new(group: Key, item: T) -> Self {
        Self { group, item }
    }
}

/// A `(group, optional item)` pair. `item == None` names the append position
/// of the group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationWithOptionalItem<T> {
    pub group: Key,
    pub item: Option<T>,
}

impl<T> LocationWithOptionalItem<T> {
    #[must_use]
    pub fn new(group: Key, item: Option<T>) -> Self {
        Self { group, item }
    }

    /// The append position of `group`.
    #[must_use]
    pub fn end_of(group: Key) -> Self {
        Self { group, item: None }
    }
}

impl<T> From<Location<T>> for LocationWithOptionalItem<T> {
    fn from(location: Location<T>) -> Self {
        Self {
            group: location.group,
            item: Some(location.item),
        }
    }
}
