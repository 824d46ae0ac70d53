// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runtime key sets that gate archiving and conversion.

use alloc::format;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;

use crate::foreign::ForeignValue;
use crate::{AttributeKey, AttributeSet, AttributeValue, CodecError, ConversionError};

type EncodeFn = fn(&AttributeValue) -> Result<serde_json::Value, CodecError>;
type DecodeFn = fn(&serde_json::Value) -> Result<AttributeValue, CodecError>;
type ToForeignFn = fn(&AttributeValue) -> Result<ForeignValue, ConversionError>;
type FromForeignFn = fn(&ForeignValue) -> Result<AttributeValue, ConversionError>;

/// Everything the archive and conversion layers need to know about one key, with the
/// value type erased.
#[derive(Clone, Copy)]
pub struct KeyDescriptor {
    name: &'static str,
    holds: fn(&AttributeValue) -> bool,
    encode: Option<EncodeFn>,
    decode: Option<DecodeFn>,
    to_foreign: Option<ToForeignFn>,
    from_foreign: Option<FromForeignFn>,
}

impl KeyDescriptor {
    /// Describe the key `K`.
    pub fn of<K: AttributeKey>() -> Self {
        let codable = K::codec().is_some();
        let convertible = K::foreign_codec().is_some();
        Self {
            name: K::NAME,
            holds: |value| value.is::<K::Value>(),
            encode: codable.then_some(encode_erased::<K> as EncodeFn),
            decode: codable.then_some(decode_erased::<K> as DecodeFn),
            to_foreign: convertible.then_some(to_foreign_erased::<K> as ToForeignFn),
            from_foreign: convertible.then_some(from_foreign_erased::<K> as FromForeignFn),
        }
    }

    /// The name of the described key.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the key can be archived.
    pub fn is_codable(&self) -> bool {
        self.encode.is_some()
    }

    /// Whether the key has a foreign representation other than a boxed value.
    pub fn is_foreign_convertible(&self) -> bool {
        self.to_foreign.is_some()
    }

    /// Whether `value` has the key's value type.
    pub fn holds(&self, value: &AttributeValue) -> bool {
        (self.holds)(value)
    }

    /// Encode `value`. Returns `None` if the key is not codable.
    pub fn encode(&self, value: &AttributeValue) -> Option<Result<serde_json::Value, CodecError>> {
        self.encode.map(|encode| encode(value))
    }

    /// Decode a value. Returns `None` if the key is not codable.
    pub fn decode(&self, json: &serde_json::Value) -> Option<Result<AttributeValue, CodecError>> {
        self.decode.map(|decode| decode(json))
    }

    /// Convert `value` to its foreign form.
    ///
    /// Keys without a foreign codec are carried as [`ForeignValue::Boxed`].
    pub fn to_foreign(&self, value: &AttributeValue) -> Result<ForeignValue, ConversionError> {
        match self.to_foreign {
            Some(to_foreign) => to_foreign(value),
            None if self.holds(value) => Ok(ForeignValue::Boxed(value.clone())),
            None => Err(mismatch(self.name)),
        }
    }

    /// Convert a foreign value back to the key's value type.
    ///
    /// A boxed value of the right type is accepted as is.
    pub fn from_foreign(&self, value: &ForeignValue) -> Result<AttributeValue, ConversionError> {
        match (value, self.from_foreign) {
            (ForeignValue::Boxed(boxed), _) if self.holds(boxed) => Ok(boxed.clone()),
            (ForeignValue::Boxed(_), _) => Err(mismatch(self.name)),
            (_, Some(from_foreign)) => from_foreign(value),
            (_, None) => Err(ConversionError::new(format!(
                "`{}` expects a boxed value, found {value:?}",
                self.name
            ))),
        }
    }
}

impl fmt::Debug for KeyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyDescriptor")
            .field("name", &self.name)
            .field("codable", &self.is_codable())
            .field("foreign_convertible", &self.is_foreign_convertible())
            .finish_non_exhaustive()
    }
}

fn mismatch(name: &str) -> ConversionError {
    ConversionError::new(format!("value stored under `{name}` has the wrong type"))
}

fn encode_erased<K: AttributeKey>(value: &AttributeValue) -> Result<serde_json::Value, CodecError> {
    let codec = K::codec().ok_or_else(|| format!("`{}` is not codable", K::NAME))?;
    let value = value
        .downcast_ref::<K::Value>()
        .ok_or_else(|| format!("value stored under `{}` has the wrong type", K::NAME))?;
    (codec.encode)(value)
}

fn decode_erased<K: AttributeKey>(json: &serde_json::Value) -> Result<AttributeValue, CodecError> {
    let codec = K::codec().ok_or_else(|| format!("`{}` is not codable", K::NAME))?;
    (codec.decode)(json).map(AttributeValue::new::<K>)
}

fn to_foreign_erased<K: AttributeKey>(
    value: &AttributeValue,
) -> Result<ForeignValue, ConversionError> {
    let codec = K::foreign_codec().ok_or_else(|| mismatch(K::NAME))?;
    let value = value
        .downcast_ref::<K::Value>()
        .ok_or_else(|| mismatch(K::NAME))?;
    (codec.to_foreign)(value)
}

fn from_foreign_erased<K: AttributeKey>(
    value: &ForeignValue,
) -> Result<AttributeValue, ConversionError> {
    let codec = K::foreign_codec().ok_or_else(|| mismatch(K::NAME))?;
    (codec.from_foreign)(value).map(AttributeValue::new::<K>)
}

/// A named set of attribute keys.
///
/// Scopes gate the archive and conversion layers: only keys declared in the scope are
/// written or read, and the rest are dropped without error. Including one scope in
/// another flattens it, so a scope is always the union of everything it was built from.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    keys: HashMap<&'static str, KeyDescriptor>,
}

impl Scope {
    /// An empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the key `K`.
    #[must_use]
    pub fn with<K: AttributeKey>(self) -> Self {
        self.with_descriptor(KeyDescriptor::of::<K>())
    }

    /// Add a described key, replacing any key of the same name.
    #[must_use]
    pub fn with_descriptor(mut self, descriptor: KeyDescriptor) -> Self {
        self.keys.insert(descriptor.name, descriptor);
        self
    }

    /// Add every key of `other`.
    #[must_use]
    pub fn including(mut self, other: &Self) -> Self {
        self.keys
            .extend(other.keys.iter().map(|(name, descriptor)| (*name, *descriptor)));
        self
    }

    /// Returns `true` if a key named `name` is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains_key(name)
    }

    /// The descriptor for the key named `name`.
    pub fn descriptor(&self, name: &str) -> Option<&KeyDescriptor> {
        self.keys.get(name)
    }

    /// The declared key names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.keys.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// The number of declared keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if no keys are declared.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The entries of `attributes` whose keys are declared here.
    pub fn project(&self, attributes: &AttributeSet) -> AttributeSet {
        let mut projected = attributes.clone();
        projected.retain(|name| self.contains(name));
        projected
    }
}

/// A type that names a [`Scope`], for APIs that pick their scope by type.
pub trait ScopeProvider {
    /// Build the scope.
    fn scope() -> Scope;
}

#[cfg(test)]
mod tests {
    use super::{KeyDescriptor, Scope};
    use crate::foreign::{ForeignCodec, ForeignValue};
    use crate::{AttributeKey, AttributeSet, AttributeValue, Codec};

    struct Int;
    impl AttributeKey for Int {
        type Value = i64;
        const NAME: &'static str = "TestInt";

        fn codec() -> Option<Codec<i64>> {
            Some(Codec::serde())
        }

        fn foreign_codec() -> Option<ForeignCodec<i64>> {
            Some(ForeignCodec::integer())
        }
    }

    struct Opaque;
    impl AttributeKey for Opaque {
        type Value = u8;
        const NAME: &'static str = "Opaque";
    }

    #[test]
    fn nested_scopes_flatten() {
        let inner = Scope::new().with::<Int>();
        let outer = Scope::new().with::<Opaque>().including(&inner);
        assert_eq!(outer.names(), ["Opaque", "TestInt"]);
        assert!(outer.contains("TestInt"));
        assert!(!inner.contains("Opaque"));
    }

    #[test]
    fn projection_drops_undeclared_keys() {
        let scope = Scope::new().with::<Int>();
        let set = AttributeSet::new().with::<Int>(1).with::<Opaque>(2);
        assert_eq!(scope.project(&set), AttributeSet::new().with::<Int>(1));
    }

    #[test]
    fn erased_codecs_round_trip() {
        let descriptor = KeyDescriptor::of::<Int>();
        let value = AttributeValue::new::<Int>(5);
        let json = descriptor.encode(&value).unwrap().unwrap();
        assert_eq!(json, serde_json::json!(5));
        assert_eq!(descriptor.decode(&json).unwrap().unwrap(), value);
        assert!(descriptor.decode(&serde_json::json!("five")).unwrap().is_err());
        assert!(
            descriptor
                .encode(&AttributeValue::new::<Opaque>(5))
                .unwrap()
                .is_err()
        );
    }

    #[test]
    fn keys_without_foreign_codec_are_boxed() {
        let descriptor = KeyDescriptor::of::<Opaque>();
        assert!(!descriptor.is_codable());
        let value = AttributeValue::new::<Opaque>(3);
        let foreign = descriptor.to_foreign(&value).unwrap();
        assert_eq!(foreign, ForeignValue::Boxed(value.clone()));
        assert_eq!(descriptor.from_foreign(&foreign).unwrap(), value);
        assert!(descriptor.from_foreign(&ForeignValue::Integer(3)).is_err());
    }
}
