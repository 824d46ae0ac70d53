// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! This crate contains the integration test suite for `attributed_string`.
//!
//! - The `util` module contains the test attribute keys and shared helpers.
//! - We do not use the default Rust test harness, but instead use this `mod.rs` file as the
//!   entry point to run all other tests, so that every topic shares the same keys.
//! - If you want to add new tests, put them into the module matching their "topic", or
//!   create a new one. Put the topic at the start of the test name, e.g.
//!   `archive_rejects_corrupted_data` rather than `rejects_corrupted_archive`.

#![allow(missing_docs, reason = "we don't need docs for testing")]
#![allow(clippy::missing_assert_message, reason = "not critical for testing")]

mod basic;
mod search;
mod util;
mod views;
