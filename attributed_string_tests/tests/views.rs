// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Run enumeration and attribute slices.

use crate::util::{TestBool, TestDouble, TestInt, TestNonExtended, TestString, int, with_int};
use attributed_string::{AttributeSet, AttributedString, AttributedSubstring, Index};
use core::ops::Range;

fn hello_world() -> AttributedString {
    let mut string = with_int("Hello", 1);
    string += " ";
    string += AttributedString::new("World", AttributeSet::new().with::<TestDouble>(2.0));
    string
}

/// The text covered by each item, with its value, front to back and back to front.
fn both_ways<V>(
    string: &AttributedString,
    items: impl DoubleEndedIterator<Item = (V, Range<Index>)> + Clone,
) -> (Vec<(String, V)>, Vec<(String, V)>) {
    let text = |range: Range<Index>| string.substring(range).as_str().to_owned();
    let forward = items
        .clone()
        .map(|(value, range)| (text(range), value))
        .collect();
    let mut backward: Vec<_> = items.rev().map(|(value, range)| (text(range), value)).collect();
    backward.reverse();
    (forward, backward)
}

#[test]
fn views_simple_enumeration() {
    let string = hello_world();
    let expected = [
        ("Hello", Some(1), None),
        (" ", None, None),
        ("World", None, Some(2.0)),
    ];
    let runs: Vec<_> = string
        .runs()
        .map(|run| {
            assert_eq!(run.get::<TestString>(), None);
            (
                run.text(),
                run.get::<TestInt>().copied(),
                run.get::<TestDouble>().copied(),
            )
        })
        .collect();
    assert_eq!(runs, expected);

    let mut reversed: Vec<_> = string
        .runs()
        .rev()
        .map(|run| (run.text(), run.get::<TestInt>().copied(), run.get::<TestDouble>().copied()))
        .collect();
    reversed.reverse();
    assert_eq!(reversed, expected);
    assert_eq!(string.runs().len(), 3);
}

#[test]
fn views_attribute_slices() {
    let string = hello_world();
    let runs = string.runs();

    let (forward, backward) = both_ways(&string, runs.attribute::<TestInt>());
    let expected = [("Hello".to_owned(), Some(&1)), (" World".to_owned(), None)];
    assert_eq!(forward, expected);
    assert_eq!(backward, expected);

    let (forward, backward) = both_ways(&string, runs.attribute::<TestDouble>());
    let expected = [("Hello ".to_owned(), None), ("World".to_owned(), Some(&2.0))];
    assert_eq!(forward, expected);
    assert_eq!(backward, expected);

    let (forward, _) = both_ways(&string, runs.attribute::<TestString>());
    assert_eq!(forward, [("Hello World".to_owned(), None)]);

    let (forward, backward) = both_ways(&string, runs.attributes2::<TestInt, TestDouble>());
    let expected = [
        ("Hello".to_owned(), (Some(&1), None)),
        (" ".to_owned(), (None, None)),
        ("World".to_owned(), (None, Some(&2.0))),
    ];
    assert_eq!(forward, expected);
    assert_eq!(backward, expected);
}

#[test]
fn views_attribute_slices_over_more_keys() {
    let flagged = int(1).with::<TestBool>(true);
    let string = AttributedString::new("ab", flagged.clone())
        + AttributedString::new("cd", flagged.with::<TestNonExtended>(5))
        + AttributedString::new("ef", int(1).with::<TestString>("x".into()));
    let runs = string.runs();

    let (forward, backward) = both_ways(
        &string,
        runs.attributes4::<TestInt, TestBool, TestString, TestDouble>(),
    );
    let x = String::from("x");
    let expected = [
        ("abcd".to_owned(), (Some(&1), Some(&true), None, None)),
        ("ef".to_owned(), (Some(&1), None, Some(&x), None)),
    ];
    assert_eq!(forward, expected);
    assert_eq!(backward, expected);

    let (forward, backward) = both_ways(
        &string,
        runs.attributes5::<TestInt, TestBool, TestString, TestDouble, TestNonExtended>(),
    );
    let expected = [
        ("ab".to_owned(), (Some(&1), Some(&true), None, None, None)),
        ("cd".to_owned(), (Some(&1), Some(&true), None, None, Some(&5))),
        ("ef".to_owned(), (Some(&1), None, Some(&x), None, None)),
    ];
    assert_eq!(forward, expected);
    assert_eq!(backward, expected);
}

#[test]
fn views_substring_enumeration_is_clamped() {
    let string = hello_world();
    let start = string
        .index_offset_by_characters(string.start_index(), 3)
        .unwrap();
    let end = string
        .index_offset_by_characters(string.end_index(), -3)
        .unwrap();
    let substring = string.substring(start..end);

    let runs: Vec<_> = substring
        .runs()
        .map(|run| (run.text(), run.get::<TestInt>().copied()))
        .collect();
    assert_eq!(runs, [("lo", Some(1)), (" ", None), ("Wo", None)]);
    let texts: Vec<_> = substring.runs().rev().map(|run| run.text()).collect();
    assert_eq!(texts, ["Wo", " ", "lo"]);

    let (forward, backward) = both_ways(&string, substring.runs().attribute::<TestInt>());
    let expected = [("lo".to_owned(), Some(&1)), (" Wo".to_owned(), None)];
    assert_eq!(forward, expected);
    assert_eq!(backward, expected);

    let (forward, _) = both_ways(&string, substring.runs().attribute::<TestString>());
    assert_eq!(forward, [("lo Wo".to_owned(), None)]);
}

#[test]
fn views_longest_effective_range() {
    let string = AttributedString::from("Abc")
        + AttributedString::new("def", int(2).with::<TestString>("World".into()))
        + AttributedString::new("ghi", int(2).with::<TestBool>(true))
        + AttributedString::new("jkl", int(2).with::<TestDouble>(3.0))
        + AttributedString::new("mno", AttributeSet::new().with::<TestString>("Hello".into()));
    let at = |characters| {
        string
            .index_offset_by_characters(string.start_index(), characters)
            .unwrap()
    };

    let (value, range) = string.runs().attribute::<TestInt>().at(at(7));
    assert_eq!(value, Some(&2));
    assert_eq!(range, at(3)..at(12));

    let (value, range) = string.runs().attribute::<TestString>().at(at(4));
    assert_eq!(value, Some(&"World".to_owned()));
    assert_eq!(range, at(3)..at(6));
}

#[test]
fn views_effective_range_is_clamped_to_substrings() {
    let string = with_int("Hello World", 1);
    let substring: AttributedSubstring = string.substring(string.range_from_utf8(2..8).unwrap());
    let (value, range) = substring
        .runs()
        .attribute::<TestInt>()
        .at(string.index_at_utf8_offset(4).unwrap());
    assert_eq!(value, Some(&1));
    assert_eq!(range, substring.range());
}

#[test]
fn views_adjacent_plain_runs_are_one() {
    let mut string = AttributedString::from("A");
    string += "B";
    string += "C";
    string += "D";
    assert_eq!(string.runs().count(), 1);
}

#[test]
fn views_runs_compare_text_and_attributes() {
    let a = with_int("ab", 1) + "cd";
    let b = with_int("ab", 1) + "cd";
    assert_eq!(a.runs(), b.runs());
    let c = with_int("ab", 1) + "ce";
    assert_ne!(a.runs(), c.runs());
    let d = with_int("abc", 1) + "d";
    assert_ne!(a.runs(), d.runs());
}
