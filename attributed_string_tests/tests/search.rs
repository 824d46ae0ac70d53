// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Searching text for plain strings.

use attributed_string::{AttributedString, AttributedSubstring, SearchOptions};

const FORWARDS: SearchOptions = SearchOptions {
    backwards: false,
    anchored: false,
};
const BACKWARDS: SearchOptions = SearchOptions {
    backwards: true,
    anchored: false,
};
const ANCHORED: SearchOptions = SearchOptions {
    backwards: false,
    anchored: true,
};
const ANCHORED_BACKWARDS: SearchOptions = SearchOptions {
    backwards: true,
    anchored: true,
};

/// Run the shared search checks against `text`, which must read "abcdefghi".
fn check_alphabet(text: &AttributedSubstring) {
    let at = |characters| {
        text.index_offset_by_characters(text.start_index(), characters)
            .unwrap()
    };
    let found = |needle, options| {
        text.range_of(needle, options)
            .map(|range| (range.start, text.substring(range).as_str().to_owned()))
    };

    assert_eq!(found("baba", FORWARDS), None);
    assert_eq!(found("abc", FORWARDS), Some((at(0), "abc".into())));
    assert_eq!(found("def", FORWARDS), Some((at(3), "def".into())));
    assert_eq!(found("ghi", FORWARDS), Some((at(6), "ghi".into())));
    assert_eq!(found("ghij", FORWARDS), None);

    assert_eq!(found("ghi", BACKWARDS), Some((at(6), "ghi".into())));
    assert_eq!(found("abc", BACKWARDS), Some((at(0), "abc".into())));
    assert_eq!(found("abc", ANCHORED), Some((at(0), "abc".into())));
    assert_eq!(found("ghi", ANCHORED_BACKWARDS), Some((at(6), "ghi".into())));
    assert_eq!(found("bcd", ANCHORED), None);
    assert_eq!(found("abc", ANCHORED_BACKWARDS), None);

    let tail = text.substring(at(1)..text.end_index());
    assert_eq!(tail.range_of("abc", FORWARDS), None);
    assert!(tail.range_of("bcd", ANCHORED).is_some());
}

#[test]
fn search_string() {
    let string = AttributedString::from("abcdefghi");
    check_alphabet(&AttributedSubstring::from(&string));
    assert_eq!(string.range_of("", FORWARDS), None);
}

#[test]
fn search_substring() {
    let string = AttributedString::from("___abcdefghi___");
    let range = string.range_of("abcdefghi", FORWARDS).unwrap();
    check_alphabet(&string.substring(range));
    assert_eq!(
        string.range_of("___", BACKWARDS).unwrap().start.utf8_offset(),
        12
    );
}

#[test]
fn search_only_matches_whole_characters() {
    let string = AttributedString::from("Cafe\u{301} cafe");
    let found = string.range_of("cafe", FORWARDS).unwrap();
    assert_eq!(found.start.utf8_offset(), 7);
    let found = string.range_of("Cafe", FORWARDS);
    assert_eq!(found, None);
}
