// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction, reading attributes, equality and descriptions.

use crate::util::{
    TestBool, TestDouble, TestInt, TestKeepCurrent, TestString, int, int_runs, with_int,
};
use attributed_string::{AttributeSet, AttributedString, MergePolicy, SearchOptions};

#[test]
fn basic_empty_string_has_no_runs() {
    let string = AttributedString::default();
    assert!(string.is_empty());
    assert_eq!(string.runs().count(), 0);
    assert_eq!(string.start_index(), string.end_index());
}

#[test]
fn basic_constructor_applies_attributes() {
    let string = with_int("Hello", 1);
    assert_eq!(string.get::<TestInt>(), Some(&1));
    assert_eq!(string.get::<TestString>(), None);
    assert_eq!(string.runs().count(), 1);
}

#[test]
fn basic_set_and_remove() {
    let mut string = AttributedString::from("Hello World");
    string.set::<TestInt>(2);
    assert_eq!(string.get::<TestInt>(), Some(&2));
    string.set_optional::<TestInt>(None);
    assert_eq!(string.get::<TestInt>(), None);
    string.set_optional::<TestInt>(Some(3));
    string.remove::<TestInt>();
    assert_eq!(string, AttributedString::from("Hello World"));
}

#[test]
fn basic_get_requires_a_uniform_value() {
    let string = with_int("Hel", 1)
        + AttributedString::new("lo World", int(2).with::<TestBool>(true));
    let hello = string.start_index()..string.index_at_utf8_offset(5).unwrap();
    assert_eq!(string.substring(hello.clone()).get::<TestInt>(), None);
    assert_eq!(string.substring(hello).get::<TestBool>(), None);

    let first = string.start_index()..string.index_at_utf8_offset(2).unwrap();
    assert_eq!(string.substring(first).get::<TestInt>(), Some(&1));
}

#[test]
fn basic_common_attributes_intersect_runs() {
    let string = AttributedString::new("ab", int(1).with::<TestBool>(true))
        + AttributedString::new("cd", int(1).with::<TestDouble>(2.0));
    assert_eq!(string.common_attributes(), int(1));
}

#[test]
fn basic_string_equality() {
    let a = with_int("Hello", 1) + " World";
    let b = with_int("Hello", 1) + " World";
    assert_eq!(a, b);
    assert_ne!(a, with_int("Hello", 2) + " World");
    assert_ne!(a, with_int("Hello", 1) + " there");
    assert_ne!(with_int("Hello World", 1), AttributedString::from("Hello World"));
}

#[test]
fn basic_substring_equality_ignores_position() {
    let string = AttributedString::from("A") + with_int("A", 2);
    let middle = string.index_after_character(string.start_index()).unwrap();
    let first = string.substring(string.start_index()..middle);
    let second = string.substring(middle..string.end_index());
    assert_ne!(first, second);
    assert_eq!(first, first.clone());
    assert_eq!(first, AttributedString::from("A"));
    assert_eq!(second, with_int("A", 2));

    let empty = AttributedString::default();
    let all = empty.start_index()..empty.end_index();
    assert_eq!(empty.substring(all.clone()), empty.substring(all));
}

#[test]
fn basic_substring_equality_ignores_outside_content() {
    let first = with_int("ab", 1) + with_int("middle", 3) + AttributedString::from("cd");
    let second = AttributedString::new("xyz", AttributeSet::new().with::<TestBool>(true))
        + with_int("__middle", 3)
        + with_int("!", 7);
    let first_range = first.range_of("middle", SearchOptions::default()).unwrap();
    let second_range = second.range_of("middle", SearchOptions::default()).unwrap();
    assert_ne!(first, second);
    assert_eq!(first.substring(first_range.clone()), second.substring(second_range));
    assert_eq!(first.substring(first_range), with_int("middle", 3));
}

#[test]
fn basic_run_equality_ignores_text() {
    let string = with_int("ab", 1) + with_int("cd", 2) + with_int("ef", 1);
    let runs: Vec<_> = string.runs().collect();
    assert_eq!(runs[0], runs[2]);
    assert_ne!(runs[0], runs[1]);
}

#[test]
fn basic_copies_do_not_share_mutations() {
    let original = with_int("Hello", 1);
    let mut copy = original.clone();
    copy.set::<TestInt>(2);
    assert_eq!(original.get::<TestInt>(), Some(&1));
    assert_eq!(copy.get::<TestInt>(), Some(&2));

    let mut appended = original.clone();
    appended += " World";
    assert_eq!(original.as_str(), "Hello");
    assert_eq!(appended.as_str(), "Hello World");
}

#[test]
fn basic_substring_base_follows_its_own_mutations() {
    let string = with_int("Hello World", 1);
    let hello = string.start_index()..string.index_at_utf8_offset(5).unwrap();
    let mut substring = string.substring(hello);
    assert_eq!(*substring.base(), string);
    substring.set::<TestInt>(3);
    assert_ne!(*substring.base(), string);
    assert_eq!(substring.get::<TestInt>(), Some(&3));
    assert_eq!(string.get::<TestInt>(), Some(&1));
}

#[test]
fn basic_description_lists_runs() {
    let string = with_int("A", 1) + with_int("B", 2) + with_int("C", 3);
    let expected = "A {\n\tTestInt = 1\n}\nB {\n\tTestInt = 2\n}\nC {\n\tTestInt = 3\n}";
    assert_eq!(string.to_string(), expected);
    assert_eq!(string.runs().to_string(), expected);

    let runs: Vec<_> = string.runs().map(|run| run.to_string()).collect();
    assert_eq!(runs[1], "B {\n\tTestInt = 2\n}");
    let substrings: Vec<_> = string
        .runs()
        .map(|run| string.substring(run.range()).to_string())
        .collect();
    assert_eq!(runs, substrings);
}

#[test]
fn basic_attribute_set_description() {
    let attributes = AttributeSet::new()
        .with::<TestBool>(false)
        .with::<TestInt>(1)
        .with::<TestDouble>(2.0);
    let description = attributes.to_string();
    assert!(description.starts_with("{\n"));
    assert!(description.ends_with("\n}"));
    assert!(description.contains("\tTestDouble = 2.0\n"));
    assert!(description.contains("\tTestInt = 1\n"));
    assert!(description.contains("\tTestBool = false\n"));
}

#[test]
fn basic_merge_policies() {
    let original = int(2).with::<TestBool>(true);
    let new = AttributeSet::new().with::<TestString>("foo".into());
    let overlapping = int(3).with::<TestDouble>(4.3);
    let string = AttributedString::new("Hello, world", original.clone());

    let merged = |attributes: &AttributeSet, policy| string.merging_attributes(attributes, policy);
    assert_eq!(
        merged(&new, MergePolicy::KeepNew),
        AttributedString::new("Hello, world", new.clone().with::<TestInt>(2).with::<TestBool>(true))
    );
    assert_eq!(
        merged(&new, MergePolicy::KeepCurrent),
        merged(&new, MergePolicy::KeepNew)
    );
    assert_eq!(
        merged(&overlapping, MergePolicy::KeepNew),
        AttributedString::new("Hello, world", overlapping.clone().with::<TestBool>(true))
    );
    assert_eq!(
        merged(&overlapping, MergePolicy::KeepCurrent),
        AttributedString::new("Hello, world", original.with::<TestDouble>(4.3))
    );
}

#[test]
fn basic_merging_by_key_policy() {
    let current = int(1).with::<TestKeepCurrent>(1);
    let incoming = int(2).with::<TestKeepCurrent>(2).with::<TestBool>(true);
    assert_eq!(
        current.merging_by_key_policy(&incoming),
        int(2).with::<TestKeepCurrent>(1).with::<TestBool>(true)
    );
}

#[test]
fn basic_setting_attributes_replaces_everything() {
    let string = with_int("Hello World", 1)
        + AttributedString::new(". My name is Ferris!", AttributeSet::new().with::<TestBool>(true));
    let result = string.setting_attributes(AttributeSet::new().with::<TestBool>(false));
    assert_eq!(
        result,
        AttributedString::new(
            "Hello World. My name is Ferris!",
            AttributeSet::new().with::<TestBool>(false)
        )
    );
}

#[test]
fn basic_plus_operators() {
    let ab = AttributedString::from("a") + AttributedString::from("b");
    assert_eq!(ab, AttributedString::from("ab"));

    let b = ab.substring(ab.index_before_character(ab.end_index()).unwrap()..ab.end_index());
    assert_eq!(AttributedString::from("a") + b, ab);
    assert_eq!(AttributedString::from("a") + "b", ab);

    let mut abc = ab.clone();
    abc += AttributedString::from("c");
    assert_eq!(abc, AttributedString::from("abc"));

    let mut abc_literal = ab;
    abc_literal += "c";
    assert_eq!(abc_literal, abc);
}

#[test]
fn basic_adding_keeps_operands() {
    let hello = with_int("Hello ", 1);
    let world = with_int("World", 2);
    let combined = hello.clone() + &world;
    assert_eq!(hello, with_int("Hello ", 1));
    assert_eq!(world, with_int("World", 2));
    assert_eq!(
        int_runs(&combined),
        [("Hello ".into(), Some(1)), ("World".into(), Some(2))]
    );
}
