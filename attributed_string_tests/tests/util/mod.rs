// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute keys and helpers shared across tests.

use attributed_string::{
    AttributeKey, AttributeSet, AttributedString, Codec, ForeignCodec, MergePolicy, Scope,
    ScopeProvider,
};

pub(crate) struct TestInt;

impl AttributeKey for TestInt {
    type Value = i64;
    const NAME: &'static str = "TestInt";

    fn codec() -> Option<Codec<i64>> {
        Some(Codec::serde())
    }

    fn foreign_codec() -> Option<ForeignCodec<i64>> {
        Some(ForeignCodec::integer())
    }
}

pub(crate) struct TestString;

impl AttributeKey for TestString {
    type Value = String;
    const NAME: &'static str = "TestString";

    fn codec() -> Option<Codec<String>> {
        Some(Codec::serde())
    }

    fn foreign_codec() -> Option<ForeignCodec<String>> {
        Some(ForeignCodec::string())
    }
}

pub(crate) struct TestDouble;

impl AttributeKey for TestDouble {
    type Value = f64;
    const NAME: &'static str = "TestDouble";

    fn codec() -> Option<Codec<f64>> {
        Some(Codec::serde())
    }

    fn foreign_codec() -> Option<ForeignCodec<f64>> {
        Some(ForeignCodec::float())
    }
}

pub(crate) struct TestBool;

impl AttributeKey for TestBool {
    type Value = bool;
    const NAME: &'static str = "TestBool";

    fn codec() -> Option<Codec<bool>> {
        Some(Codec::serde())
    }

    fn foreign_codec() -> Option<ForeignCodec<bool>> {
        Some(ForeignCodec::boolean())
    }
}

/// Not picked up by text inserted next to it.
pub(crate) struct TestNonExtended;

impl AttributeKey for TestNonExtended {
    type Value = i64;
    const NAME: &'static str = "TestNonExtended";
    const INHERITED_BY_ADDED_TEXT: bool = false;
}

/// Keeps the current value when merged by key policy.
pub(crate) struct TestKeepCurrent;

impl AttributeKey for TestKeepCurrent {
    type Value = i64;
    const NAME: &'static str = "TestKeepCurrent";
    const MERGE_POLICY: MergePolicy = MergePolicy::KeepCurrent;
}

/// Carries no codecs at all.
pub(crate) struct TestOpaque;

impl AttributeKey for TestOpaque {
    type Value = Vec<u8>;
    const NAME: &'static str = "TestOpaque";
}

/// The scope holding the codable test keys.
pub(crate) struct TestScope;

impl ScopeProvider for TestScope {
    fn scope() -> Scope {
        Scope::new()
            .with::<TestInt>()
            .with::<TestString>()
            .with::<TestDouble>()
            .with::<TestBool>()
    }
}

pub(crate) fn test_scope() -> Scope {
    TestScope::scope()
}

pub(crate) fn int(value: i64) -> AttributeSet {
    AttributeSet::new().with::<TestInt>(value)
}

/// `text` with `TestInt` set to `value`.
pub(crate) fn with_int(text: &str, value: i64) -> AttributedString {
    AttributedString::new(text, int(value))
}

/// The `A`..`C` string most mutation tests start from.
pub(crate) fn abc() -> AttributedString {
    AttributedString::new("A", int(1).with::<TestBool>(true))
        + AttributedString::new("B", int(1).with::<TestDouble>(2.0))
        + AttributedString::new(
            "C",
            AttributeSet::new()
                .with::<TestDouble>(2.0)
                .with::<TestBool>(false),
        )
}

/// Panics if two neighboring runs of `string` carry equal attributes.
#[track_caller]
pub(crate) fn assert_coalesced(string: &AttributedString) {
    let runs: Vec<_> = string.runs().collect();
    for pair in runs.windows(2) {
        assert_ne!(
            pair[0].attributes(),
            pair[1].attributes(),
            "runs {:?} and {:?} should have been merged",
            pair[0].text(),
            pair[1].text()
        );
    }
}

/// The text and `TestInt` value of every run.
pub(crate) fn int_runs(string: &AttributedString) -> Vec<(String, Option<i64>)> {
    string
        .runs()
        .map(|run| (run.text().to_owned(), run.get::<TestInt>().copied()))
        .collect()
}
