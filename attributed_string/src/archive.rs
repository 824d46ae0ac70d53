// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The archived JSON form of attributed strings.
//!
//! A string with no attributes is archived as a bare JSON string. Short run lists are
//! a flat array alternating text and attribute objects:
//!
//! ```json
//! ["Hello", {"TestInt": 1}, " World", {}]
//! ```
//!
//! Longer ones move repeated attribute sets into a table that runs refer to by index:
//!
//! ```json
//! {"runs": ["a", 0, "b", {}, "c", 0], "attributeTable": [{"TestInt": 1}]}
//! ```
//!
//! Only keys of the given [`Scope`] that have a codec are written or read. Decoding is
//! strict: anything that does not match one of these shapes is rejected as
//! [`Error::MalformedArchive`].

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::guts::Guts;
use crate::run_list::{RunList, StoredRun};
use crate::{AttributeSet, AttributedString, AttributedSubstring, Error, Scope, ScopeProvider};

const RUNS: &str = "runs";
const ATTRIBUTE_TABLE: &str = "attributeTable";

/// Archive settings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ArchiveOptions {
    /// Strings with more runs than this are written with an attribute table.
    pub table_threshold: usize,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            table_threshold: 10,
        }
    }
}

/// Encode the in-scope, codable attributes of `attributes` as a JSON object.
pub fn encode_attributes(
    attributes: &AttributeSet,
    scope: &Scope,
) -> Result<Map<String, Value>, Error> {
    let mut object = Map::new();
    for (name, value) in attributes.iter() {
        let Some(result) = scope.descriptor(name).and_then(|descriptor| descriptor.encode(value))
        else {
            log::debug!("not archiving `{name}`: out of scope or not codable");
            continue;
        };
        let json = result.map_err(|source| Error::AttributeCodec { key: name, source })?;
        object.insert(name.to_string(), json);
    }
    Ok(object)
}

/// Decode a JSON object of attributes, keeping the in-scope, codable keys.
pub fn decode_attributes(json: &Value, scope: &Scope) -> Result<AttributeSet, Error> {
    let Value::Object(object) = json else {
        return Err(Error::malformed("attributes must be an object"));
    };
    decode_object(object, scope)
}

fn decode_object(object: &Map<String, Value>, scope: &Scope) -> Result<AttributeSet, Error> {
    let mut attributes = AttributeSet::new();
    for (name, json) in object {
        let Some(descriptor) = scope.descriptor(name) else {
            log::debug!("skipping archived `{name}`: out of scope");
            continue;
        };
        let Some(result) = descriptor.decode(json) else {
            log::debug!("skipping archived `{name}`: not codable");
            continue;
        };
        let value = result.map_err(|source| Error::AttributeCodec {
            key: descriptor.name(),
            source,
        })?;
        attributes.insert_value(descriptor.name(), value);
    }
    Ok(attributes)
}

/// The attributes of `attributes` that the archive can carry.
fn archivable(attributes: &AttributeSet, scope: &Scope) -> AttributeSet {
    let mut kept = attributes.clone();
    kept.retain(|name| scope.descriptor(name).is_some_and(|key| key.is_codable()));
    kept
}

/// Archive `string` with the default options.
pub fn encode(string: impl Into<AttributedSubstring>, scope: &Scope) -> Result<Value, Error> {
    encode_with(string, scope, ArchiveOptions::default())
}

/// Archive `string`.
pub fn encode_with(
    string: impl Into<AttributedSubstring>,
    scope: &Scope,
    options: ArchiveOptions,
) -> Result<Value, Error> {
    let string = string.into();
    let (guts, range) = string.parts();
    let text = guts.text();

    // Dropping keys can leave equal neighbors, so coalesce again.
    let runs = RunList::from_runs(
        guts.runs_in(&range)
            .into_iter()
            .map(|run| StoredRun::new(run.length, archivable(&run.attributes, scope))),
    );
    let mut pieces = Vec::with_capacity(runs.count());
    let mut start = range.start;
    for run in runs.iter() {
        let end = start + run.length;
        pieces.push((&text[start..end], &run.attributes));
        start = end;
    }

    match pieces.as_slice() {
        [] => return Ok(Value::String(String::new())),
        [(text, attributes)] if attributes.is_empty() => return Ok(Value::String(text.to_string())),
        _ => {}
    }

    if pieces.len() <= options.table_threshold {
        let mut items = Vec::with_capacity(pieces.len() * 2);
        for (text, attributes) in pieces {
            items.push(Value::String(text.to_string()));
            items.push(Value::Object(encode_attributes(attributes, scope)?));
        }
        return Ok(Value::Array(items));
    }

    let mut table: Vec<&AttributeSet> = Vec::new();
    let mut encoded_table = Vec::new();
    let mut items = Vec::with_capacity(pieces.len() * 2);
    for (text, attributes) in pieces {
        items.push(Value::String(text.to_string()));
        if attributes.is_empty() {
            items.push(Value::Object(Map::new()));
            continue;
        }
        let slot = match table.iter().position(|entry| *entry == attributes) {
            Some(slot) => slot,
            None => {
                table.push(attributes);
                encoded_table.push(Value::Object(encode_attributes(attributes, scope)?));
                table.len() - 1
            }
        };
        items.push(Value::from(slot));
    }
    let mut object = Map::new();
    object.insert(RUNS.to_string(), Value::Array(items));
    object.insert(ATTRIBUTE_TABLE.to_string(), Value::Array(encoded_table));
    Ok(Value::Object(object))
}

/// Rebuild an attributed string from its archived form.
pub fn decode(json: &Value, scope: &Scope) -> Result<AttributedString, Error> {
    match json {
        Value::String(text) => Ok(AttributedString::from(text.as_str())),
        Value::Array(items) => decode_runs(items, None, scope),
        Value::Object(object) => {
            let Some(Value::Array(items)) = object.get(RUNS) else {
                return Err(Error::malformed("missing `runs` array"));
            };
            let Some(Value::Array(entries)) = object.get(ATTRIBUTE_TABLE) else {
                return Err(Error::malformed("missing `attributeTable` array"));
            };
            let table = entries
                .iter()
                .map(|entry| match entry {
                    Value::Object(object) => decode_object(object, scope),
                    _ => Err(Error::malformed("attribute table entries must be objects")),
                })
                .collect::<Result<Vec<_>, _>>()?;
            decode_runs(items, Some(&table), scope)
        }
        _ => Err(Error::malformed(
            "expected a string, an array or an object at the root",
        )),
    }
}

fn decode_runs(
    items: &[Value],
    table: Option<&[AttributeSet]>,
    scope: &Scope,
) -> Result<AttributedString, Error> {
    if items.is_empty() {
        return Err(Error::malformed("no runs"));
    }
    if items.len() % 2 != 0 {
        return Err(Error::malformed("runs must pair text with attributes"));
    }
    let count = items.len() / 2;
    let mut text = String::new();
    let mut runs = Vec::with_capacity(count);
    for (i, pair) in items.chunks_exact(2).enumerate() {
        let Value::String(segment) = &pair[0] else {
            return Err(Error::malformed(format!("run {i} has no text")));
        };
        let attributes = match (&pair[1], table) {
            (Value::Object(object), _) => {
                if segment.is_empty() && !object.is_empty() {
                    return Err(Error::malformed("empty text cannot carry attributes"));
                }
                decode_object(object, scope)?
            }
            (Value::Number(slot), Some(table)) => {
                let entry = slot
                    .as_u64()
                    .and_then(|slot| usize::try_from(slot).ok())
                    .and_then(|slot| table.get(slot));
                match entry {
                    Some(attributes) => attributes.clone(),
                    None => {
                        return Err(Error::malformed(format!(
                            "run {i} refers to missing table entry {slot}"
                        )));
                    }
                }
            }
            _ => {
                return Err(Error::malformed(format!(
                    "run {i} has no attributes"
                )));
            }
        };
        if segment.is_empty() && (count > 1 || !attributes.is_empty()) {
            return Err(Error::malformed(format!("run {i} is empty")));
        }
        text.push_str(segment);
        runs.push(StoredRun::new(segment.len(), attributes));
    }
    Ok(AttributedString::from_guts(Guts::new(
        text,
        RunList::from_runs(runs),
    )))
}

/// An attributed string that archives itself through `serde` with the scope `S`.
///
/// Codec failures surface as the serializer's or deserializer's custom error.
pub struct Archived<S> {
    /// The wrapped string.
    pub string: AttributedString,
    scope: PhantomData<fn() -> S>,
}

impl<S> Archived<S> {
    /// Wrap `string`.
    pub fn new(string: AttributedString) -> Self {
        Self {
            string,
            scope: PhantomData,
        }
    }

    /// Unwrap the string.
    pub fn into_inner(self) -> AttributedString {
        self.string
    }
}

impl<S> Clone for Archived<S> {
    fn clone(&self) -> Self {
        Self::new(self.string.clone())
    }
}

impl<S> PartialEq for Archived<S> {
    fn eq(&self, other: &Self) -> bool {
        self.string == other.string
    }
}

impl<S> fmt::Debug for Archived<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Archived").field(&self.string).finish()
    }
}

impl<S> From<AttributedString> for Archived<S> {
    fn from(string: AttributedString) -> Self {
        Self::new(string)
    }
}

impl<S: ScopeProvider> Serialize for Archived<S> {
    fn serialize<Z: Serializer>(&self, serializer: Z) -> Result<Z::Ok, Z::Error> {
        encode(&self.string, &S::scope())
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de, S: ScopeProvider> Deserialize<'de> for Archived<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = Value::deserialize(deserializer)?;
        decode(&json, &S::scope())
            .map(Self::new)
            .map_err(serde::de::Error::custom)
    }
}
