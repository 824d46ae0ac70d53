// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute keys, type-erased values, and immutable attribute sets.

use alloc::string::String;
use alloc::sync::Arc;
use core::any::Any;
use core::fmt::{self, Debug};

use serde::Serialize;
use serde::de::DeserializeOwned;
use smallvec::SmallVec;

use crate::CodecError;
use crate::foreign::ForeignCodec;

/// How values from two attribute sets combine when both carry the same key.
///
/// Both policies produce the union of keys; they only differ on collisions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Values from the incoming set win.
    #[default]
    KeepNew,
    /// Values already present win.
    KeepCurrent,
}

/// A typed attribute identity.
///
/// Each key is a distinct type. Its [`NAME`](Self::NAME) identifies it at runtime, in
/// archives, and in foreign dictionaries, so names must be unique within a [`Scope`].
///
/// ```
/// use attributed_string::{AttributeKey, AttributeSet, Codec};
///
/// struct Weight;
///
/// impl AttributeKey for Weight {
///     type Value = u16;
///     const NAME: &'static str = "Weight";
///
///     fn codec() -> Option<Codec<u16>> {
///         Some(Codec::serde())
///     }
/// }
///
/// let set = AttributeSet::new().with::<Weight>(700);
/// assert_eq!(set.get::<Weight>(), Some(&700));
/// ```
///
/// [`Scope`]: crate::Scope
pub trait AttributeKey: 'static {
    /// The value stored under this key.
    type Value: Clone + PartialEq + Debug + Send + Sync + 'static;

    /// The runtime name of this key.
    const NAME: &'static str;

    /// Whether text inserted next to (or in place of) text carrying this key picks it up.
    const INHERITED_BY_ADDED_TEXT: bool = true;

    /// Collision policy used by [`AttributeSet::merging_by_key_policy`].
    const MERGE_POLICY: MergePolicy = MergePolicy::KeepNew;

    /// Archive encoder and decoder for this key, if it is codable.
    fn codec() -> Option<Codec<Self::Value>> {
        None
    }

    /// Conversion to and from the foreign representation.
    ///
    /// Keys without one are carried across the boundary as boxed values.
    fn foreign_codec() -> Option<ForeignCodec<Self::Value>> {
        None
    }
}

/// Archive encoder and decoder for a key's value type.
pub struct Codec<V> {
    /// Encode a value into its archived JSON form.
    pub encode: fn(&V) -> Result<serde_json::Value, CodecError>,
    /// Decode a value from its archived JSON form.
    pub decode: fn(&serde_json::Value) -> Result<V, CodecError>,
}

impl<V: Serialize + DeserializeOwned> Codec<V> {
    /// A codec that goes through the value's `serde` implementations.
    pub fn serde() -> Self {
        Self {
            encode: |value| serde_json::to_value(value).map_err(CodecError::from),
            decode: |json| V::deserialize(json).map_err(CodecError::from),
        }
    }
}

impl<V> Clone for Codec<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Codec<V> {}

impl<V> Debug for Codec<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec").finish_non_exhaustive()
    }
}

trait ErasedValue: Any + Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn eq_erased(&self, other: &dyn ErasedValue) -> bool;
}

impl<T: Any + Debug + PartialEq + Send + Sync> ErasedValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_erased(&self, other: &dyn ErasedValue) -> bool {
        other.as_any().downcast_ref::<T>().is_some_and(|other| self == other)
    }
}

/// A boxed attribute value, tagged with the behavior of the key it was created for.
///
/// Values are compared structurally: two values are equal when they hold the same
/// concrete type and that type's `PartialEq` says so.
#[derive(Clone)]
pub struct AttributeValue {
    value: Arc<dyn ErasedValue>,
    inherited_by_added_text: bool,
    merge_policy: MergePolicy,
}

impl AttributeValue {
    /// Box a value for the key `K`.
    pub fn new<K: AttributeKey>(value: K::Value) -> Self {
        Self {
            value: Arc::new(value),
            inherited_by_added_text: K::INHERITED_BY_ADDED_TEXT,
            merge_policy: K::MERGE_POLICY,
        }
    }

    /// Borrow the value as `T`, if that is its concrete type.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        (*self.value).as_any().downcast_ref::<T>()
    }

    /// Whether the boxed value has concrete type `T`.
    pub fn is<T: 'static>(&self) -> bool {
        (*self.value).as_any().is::<T>()
    }

    /// Whether text added next to this value picks it up.
    pub fn inherited_by_added_text(&self) -> bool {
        self.inherited_by_added_text
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value) || (*self.value).eq_erased(&*other.value)
    }
}

impl Debug for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&*self.value, f)
    }
}

/// An immutable-by-value mapping from attribute name to value.
///
/// Entries are kept sorted by name, so equality and [`Display`](fmt::Display) output do
/// not depend on insertion order.
#[derive(Clone, Default, PartialEq)]
pub struct AttributeSet {
    entries: SmallVec<[(&'static str, AttributeValue); 4]>,
}

impl AttributeSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the set holds no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number of attributes in the set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The value stored for `K`, if present and of `K`'s value type.
    pub fn get<K: AttributeKey>(&self) -> Option<&K::Value> {
        self.value(K::NAME)?.downcast_ref()
    }

    /// The boxed value stored under `name`.
    pub fn value(&self, name: &str) -> Option<&AttributeValue> {
        self.position(name)
            .ok()
            .map(|index| &self.entries[index].1)
    }

    /// Returns `true` if a value is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_ok()
    }

    /// Store `value` for `K`, replacing any previous value.
    pub fn set<K: AttributeKey>(&mut self, value: K::Value) {
        self.insert_value(K::NAME, AttributeValue::new::<K>(value));
    }

    /// Store `value` for `K`, or remove `K` when `value` is `None`.
    pub fn set_optional<K: AttributeKey>(&mut self, value: Option<K::Value>) {
        match value {
            Some(value) => self.set::<K>(value),
            None => self.remove::<K>(),
        }
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with<K: AttributeKey>(mut self, value: K::Value) -> Self {
        self.set::<K>(value);
        self
    }

    /// Remove `K` from the set.
    pub fn remove<K: AttributeKey>(&mut self) {
        self.remove_value(K::NAME);
    }

    /// Store a boxed value under `name`.
    pub fn insert_value(&mut self, name: &'static str, value: AttributeValue) {
        match self.position(name) {
            Ok(index) => self.entries[index].1 = value,
            Err(index) => self.entries.insert(index, (name, value)),
        }
    }

    /// Remove the value stored under `name`, returning it.
    pub fn remove_value(&mut self, name: &str) -> Option<AttributeValue> {
        let index = self.position(name).ok()?;
        Some(self.entries.remove(index).1)
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&'static str, &AttributeValue)> + '_ {
        self.entries.iter().map(|(name, value)| (*name, value))
    }

    /// Iterate over attribute names in order.
    pub fn names(&self) -> impl ExactSizeIterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    /// Combine `other` into `self` with the given collision policy.
    pub fn merge(&mut self, other: &Self, policy: MergePolicy) {
        for (name, value) in other.iter() {
            match self.position(name) {
                Ok(index) => {
                    if policy == MergePolicy::KeepNew {
                        self.entries[index].1 = value.clone();
                    }
                }
                Err(index) => self.entries.insert(index, (name, value.clone())),
            }
        }
    }

    /// Returns the union of `self` and `other`, resolving collisions with `policy`.
    #[must_use]
    pub fn merging(&self, other: &Self, policy: MergePolicy) -> Self {
        let mut merged = self.clone();
        merged.merge(other, policy);
        merged
    }

    /// Like [`merging`](Self::merging), but each collision follows the policy of the
    /// key that defined the incoming value.
    #[must_use]
    pub fn merging_by_key_policy(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for (name, value) in other.iter() {
            match merged.position(name) {
                Ok(index) => {
                    if value.merge_policy == MergePolicy::KeepNew {
                        merged.entries[index].1 = value.clone();
                    }
                }
                Err(index) => merged.entries.insert(index, (name, value.clone())),
            }
        }
        merged
    }

    /// Returns `true` if every name/value pair of `pattern` is also in `self`.
    pub fn contains_all(&self, pattern: &Self) -> bool {
        pattern
            .iter()
            .all(|(name, value)| self.value(name) == Some(value))
    }

    /// Keep only the entries whose name satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries.retain(|(name, _)| keep(name));
    }

    /// The entries that text added next to this set should carry.
    pub(crate) fn inherited(&self) -> Self {
        let mut inherited = self.clone();
        inherited
            .entries
            .retain(|(_, value)| value.inherited_by_added_text);
        inherited
    }

    /// The entries present with equal values in both sets.
    pub(crate) fn intersect(&mut self, other: &Self) {
        self.entries
            .retain(|(name, value)| other.value(name) == Some(value));
    }

    /// The textual form used by [`Display`](fmt::Display).
    pub fn describe(&self) -> String {
        format!("{self}")
    }

    fn position(&self, name: &str) -> Result<usize, usize> {
        self.entries.binary_search_by(|(probe, _)| (*probe).cmp(name))
    }
}

impl Debug for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl fmt::Display for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{\n")?;
        for (name, value) in self.iter() {
            writeln!(f, "\t{name} = {value:?}")?;
        }
        f.write_str("}")
    }
}
