// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversion to and from [`ForeignAttributedString`].
//!
//! Only keys declared in the converter's scope cross the boundary. Offsets are
//! translated between UTF-8 and UTF-16 here and nowhere else.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::foreign::{ForeignAttributedString, ForeignAttributes, ForeignSpan};
use crate::guts::Guts;
use crate::run_list::{RunList, StoredRun};
use crate::text::{Utf16Cursor, utf16_len};
use crate::{
    AttributeSet, AttributedString, AttributedSubstring, ConversionError, Error, KeyDescriptor,
    Scope,
};

/// How a [`Converter`] treats values that fail to convert.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Drop attributes whose values fail to convert instead of failing the whole
    /// conversion.
    pub drop_unconvertible: bool,
}

/// Converts attributed strings to and from the foreign representation.
#[derive(Clone, Debug)]
pub struct Converter {
    scope: Scope,
    options: ConversionOptions,
    host_keys: Scope,
}

impl Converter {
    /// A converter for the keys of `scope` that fails on unconvertible values.
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            options: ConversionOptions::default(),
            host_keys: Scope::new(),
        }
    }

    /// Use `options`.
    #[must_use]
    pub fn with_options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    /// Also convert the keys of `keys`.
    ///
    /// This is the hook for attributes contributed by the host environment, which only
    /// matter at the conversion boundary.
    #[must_use]
    pub fn with_host_keys(mut self, keys: &Scope) -> Self {
        self.host_keys = self.host_keys.including(keys);
        self
    }

    /// The options in use.
    pub fn options(&self) -> ConversionOptions {
        self.options
    }

    fn descriptor(&self, name: &str) -> Option<&KeyDescriptor> {
        self.scope
            .descriptor(name)
            .or_else(|| self.host_keys.descriptor(name))
    }

    /// Decide what to do with a value that failed to convert.
    fn failed(&self, key: &str, source: ConversionError) -> Result<(), Error> {
        if self.options.drop_unconvertible {
            log::debug!("dropping unconvertible `{key}`: {source}");
            Ok(())
        } else {
            Err(Error::Conversion {
                key: key.to_string(),
                source,
            })
        }
    }

    /// The foreign dictionary for `attributes`, holding only in-scope keys.
    pub fn export_attributes(&self, attributes: &AttributeSet) -> Result<ForeignAttributes, Error> {
        let mut foreign = ForeignAttributes::new();
        for (name, value) in attributes.iter() {
            let Some(descriptor) = self.descriptor(name) else {
                log::debug!("dropping out-of-scope `{name}` on export");
                continue;
            };
            match descriptor.to_foreign(value) {
                Ok(value) => {
                    foreign.insert(name.to_string(), value);
                }
                Err(source) => self.failed(name, source)?,
            }
        }
        Ok(foreign)
    }

    /// The attribute set for a foreign dictionary, holding only in-scope keys.
    pub fn import_attributes(&self, foreign: &ForeignAttributes) -> Result<AttributeSet, Error> {
        let mut attributes = AttributeSet::new();
        for (name, value) in foreign {
            let Some(descriptor) = self.descriptor(name) else {
                log::debug!("dropping unknown `{name}` on import");
                continue;
            };
            match descriptor.from_foreign(value) {
                Ok(value) => attributes.insert_value(descriptor.name(), value),
                Err(source) => self.failed(name, source)?,
            }
        }
        Ok(attributes)
    }

    /// Convert `string` to the foreign representation.
    ///
    /// Neighboring spans whose exported dictionaries are equal are merged.
    pub fn export(
        &self,
        string: impl Into<AttributedSubstring>,
    ) -> Result<ForeignAttributedString, Error> {
        let string = string.into();
        let mut runs = Vec::new();
        for run in string.runs() {
            runs.push(StoredRun::new(
                utf16_len(run.text()),
                self.export_attributes(run.attributes())?,
            ));
        }
        let mut location = 0;
        let spans: Vec<_> = RunList::from_runs(runs)
            .iter()
            .map(|run| {
                let span = ForeignSpan {
                    location,
                    length: run.length,
                    attributes: run.attributes.clone(),
                };
                location += run.length;
                span
            })
            .collect();
        ForeignAttributedString::from_spans(string.as_str(), spans)
    }

    /// Convert a foreign string back to an attributed string.
    pub fn import(&self, foreign: &ForeignAttributedString) -> Result<AttributedString, Error> {
        let text = foreign.text();
        let mut runs = Vec::new();
        let mut start = 0;
        let mut cursor = Utf16Cursor::new(text);
        for span in foreign.spans() {
            let end = cursor.advance_to(span.location + span.length).ok_or_else(|| {
                Error::InvalidSpans(format!(
                    "span {:?} does not end on a character",
                    span.range()
                ))
            })?;
            runs.push(StoredRun::new(
                end - start,
                self.import_attributes(&span.attributes)?,
            ));
            start = end;
        }
        Ok(AttributedString::from_guts(Guts::new(
            String::from(text),
            RunList::from_runs(runs),
        )))
    }
}
