// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rewriting attribute values region by region.

use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;

use crate::guts::Guts;
use crate::text::Index;
use crate::{AttributeKey, AttributeValue, AttributedString};

/// One region over which a key has a constant value, handed out for rewriting.
///
/// Set [`value`](Self::value) to change or remove the value, adjust
/// [`range`](Self::range) to move it, or call [`replace_with`](Self::replace_with) to
/// migrate it to another key.
pub struct AttributeTransformer<K: AttributeKey> {
    /// The text the value applies to. Widening or narrowing it moves the value there.
    pub range: Range<Index>,
    /// The value of `K` over [`range`](Self::range). `None` removes it.
    pub value: Option<K::Value>,
    replacement: Option<(&'static str, AttributeValue)>,
}

impl<K: AttributeKey> AttributeTransformer<K> {
    fn new(range: Range<Index>, value: Option<&K::Value>) -> Self {
        Self {
            range,
            value: value.cloned(),
            replacement: None,
        }
    }

    /// Swap this value for `value` under the key `U`.
    ///
    /// Takes precedence over [`value`](Self::value).
    pub fn replace_with<U: AttributeKey>(&mut self, value: U::Value) {
        self.replacement = Some((U::NAME, AttributeValue::new::<U>(value)));
    }

    /// The name of the key the value ends up under.
    pub fn name(&self) -> &'static str {
        match &self.replacement {
            Some((name, _)) => *name,
            None => K::NAME,
        }
    }

    fn erased(&self) -> Option<AttributeValue> {
        match &self.replacement {
            Some((_, value)) => Some(value.clone()),
            None => self.value.clone().map(AttributeValue::new::<K>),
        }
    }

    /// Take the value off the original range if it moved or changed key.
    fn apply_removal(&self, original: &Self, guts: &mut Guts) {
        if original.range != self.range || original.name() != self.name() {
            let range = guts.offsets_of(&original.range);
            guts.remove_value(range, K::NAME);
        }
    }

    fn apply_change(&self, original: &Self, guts: &mut Guts) {
        let value = self.erased();
        if original.range == self.range
            && original.name() == self.name()
            && original.erased() == value
        {
            return;
        }
        let range = guts.offsets_of(&self.range);
        match value {
            Some(value) => guts.add_value(range, self.name(), &value),
            None => guts.remove_value(range, K::NAME),
        }
    }
}

impl<K: AttributeKey> Clone for AttributeTransformer<K> {
    fn clone(&self) -> Self {
        Self {
            range: self.range.clone(),
            value: self.value.clone(),
            replacement: self.replacement.clone(),
        }
    }
}

impl<K: AttributeKey> fmt::Debug for AttributeTransformer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeTransformer")
            .field("key", &K::NAME)
            .field("range", &self.range)
            .field("value", &self.value)
            .field("replacement", &self.replacement)
            .finish()
    }
}

impl AttributedString {
    /// Rewrite `K` region by region.
    ///
    /// `transform` is called once for each longest range over which `K` is constant,
    /// with the regions taken from the string as it was before the call. Regions where
    /// `K` is absent are visited too, with no value.
    ///
    /// # Panics
    ///
    /// Panics if `transform` sets a range with indices from other text.
    pub fn transform_attributes<K: AttributeKey>(
        &mut self,
        mut transform: impl FnMut(&mut AttributeTransformer<K>),
    ) {
        let regions: Vec<_> = self
            .runs()
            .attribute::<K>()
            .map(|(value, range)| AttributeTransformer::<K>::new(range, value))
            .collect();
        let guts = self.guts_mut();
        for before in regions {
            let mut after = before.clone();
            transform(&mut after);
            after.apply_removal(&before, guts);
            after.apply_change(&before, guts);
        }
    }

    /// A copy with [`transform_attributes`](Self::transform_attributes) applied.
    #[must_use]
    pub fn transforming_attributes<K: AttributeKey>(
        &self,
        transform: impl FnMut(&mut AttributeTransformer<K>),
    ) -> Self {
        let mut copy = self.clone();
        copy.transform_attributes(transform);
        copy
    }
}

/// Multi-key transformers: removals for every key land before any change.
macro_rules! impl_transform {
    (
        $transform:ident,
        $transforming:ident,
        $slices:ident,
        $count:literal,
        $(($key:ident, $before:ident, $after:ident)),+
    ) => {
        impl AttributedString {
            #[doc = concat!(
                "Like [`transform_attributes`](Self::transform_attributes), over regions where ",
                "the combination of ",
                $count,
                " keys is constant."
            )]
            pub fn $transform<$($key: AttributeKey),+>(
                &mut self,
                mut transform: impl FnMut($(&mut AttributeTransformer<$key>),+),
            ) {
                let regions: Vec<_> = self
                    .runs()
                    .$slices::<$($key),+>()
                    .map(|(values, range)| {
                        let ($($before,)+) = values;
                        ($(AttributeTransformer::<$key>::new(range.clone(), $before),)+)
                    })
                    .collect();
                let guts = self.guts_mut();
                for ($($before,)+) in regions {
                    $(let mut $after = $before.clone();)+
                    transform($(&mut $after),+);
                    $($after.apply_removal(&$before, guts);)+
                    $($after.apply_change(&$before, guts);)+
                }
            }

            #[doc = concat!(
                "A copy with [`",
                stringify!($transform),
                "`](Self::",
                stringify!($transform),
                ") applied."
            )]
            #[must_use]
            pub fn $transforming<$($key: AttributeKey),+>(
                &self,
                transform: impl FnMut($(&mut AttributeTransformer<$key>),+),
            ) -> Self {
                let mut copy = self.clone();
                copy.$transform(transform);
                copy
            }
        }
    };
}

impl_transform!(
    transform_attributes2,
    transforming_attributes2,
    attributes2,
    "two",
    (K1, before1, after1),
    (K2, before2, after2)
);
impl_transform!(
    transform_attributes3,
    transforming_attributes3,
    attributes3,
    "three",
    (K1, before1, after1),
    (K2, before2, after2),
    (K3, before3, after3)
);
impl_transform!(
    transform_attributes4,
    transforming_attributes4,
    attributes4,
    "four",
    (K1, before1, after1),
    (K2, before2, after2),
    (K3, before3, after3),
    (K4, before4, after4)
);
impl_transform!(
    transform_attributes5,
    transforming_attributes5,
    attributes5,
    "five",
    (K1, before1, after1),
    (K2, before2, after2),
    (K3, before3, after3),
    (K4, before4, after4),
    (K5, before5, after5)
);

#[cfg(test)]
mod tests {
    use crate::{AttributeKey, AttributeSet, AttributedString};

    struct Int;
    impl AttributeKey for Int {
        type Value = i64;
        const NAME: &'static str = "TestInt";
    }

    struct Double;
    impl AttributeKey for Double {
        type Value = f64;
        const NAME: &'static str = "TestDouble";
    }

    fn sample() -> AttributedString {
        AttributedString::new("Hello", AttributeSet::new().with::<Int>(1))
            + AttributedString::from(" ")
            + AttributedString::new("World", AttributeSet::new().with::<Int>(2))
    }

    #[test]
    fn visits_every_region_once() {
        let mut seen = Vec::new();
        let _ = sample().transforming_attributes::<Int>(|t| seen.push(t.value));
        assert_eq!(seen, [Some(1), None, Some(2)]);
    }

    #[test]
    fn changing_and_removing_values() {
        let result = sample().transforming_attributes::<Int>(|t| {
            t.value = match t.value {
                Some(1) => None,
                Some(v) => Some(v * 10),
                None => Some(2),
            };
        });
        let runs: Vec<_> = result.runs().map(|run| run.get::<Int>().copied()).collect();
        assert_eq!(runs, [None, Some(2), Some(20)]);
    }

    #[test]
    fn migrating_to_another_key() {
        let result = sample().transforming_attributes::<Int>(|t| {
            if let Some(value) = t.value {
                t.replace_with::<Double>(value as f64);
            }
        });
        assert_eq!(result.runs().count(), 3);
        assert!(result.runs().all(|run| run.get::<Int>().is_none()));
        assert_eq!(result.runs().next().unwrap().get::<Double>(), Some(&1.0));
    }

    #[test]
    fn widening_the_range_moves_the_value() {
        let source = sample();
        let result = source.transforming_attributes::<Int>(|t| {
            if t.value == Some(1) {
                t.range = source.start_index()..source.index_at_utf8_offset(6).unwrap();
            }
        });
        let first = result.runs().next().unwrap();
        assert_eq!(first.text(), "Hello ");
        assert_eq!(first.get::<Int>(), Some(&1));
    }
}
