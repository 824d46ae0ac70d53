// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Well-known attribute keys shared with host frameworks.
//!
//! All of them archive through `serde`. [`Link`], [`LanguageIdentifier`],
//! [`ReplacementIndex`] and [`PersonNameComponent`] also cross the foreign boundary
//! under the names host frameworks use for them; the formatting keys travel boxed.

use alloc::string::String;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::foreign::{ForeignCodec, ForeignValue};
use crate::{AttributeKey, AttributedString, Codec, CodecError, ConversionError, Scope, archive};

/// Archive a fieldless enum as its integer code.
macro_rules! impl_code_serde {
    ($name:ident { $($variant:ident = $code:literal),+ $(,)? }) => {
        impl $name {
            /// The archived code of this value.
            pub const fn code(self) -> u8 {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            /// The value archived as `code`.
            pub const fn from_code(code: u8) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_u8(self.code())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let code = u8::deserialize(deserializer)?;
                Self::from_code(code).ok_or_else(|| {
                    de::Error::custom(format!(
                        "invalid {} code {code}",
                        stringify!($name)
                    ))
                })
            }
        }
    };
}

/// A link target, as a URL string.
#[derive(Copy, Clone, Debug)]
pub struct Link;

impl AttributeKey for Link {
    type Value = String;
    const NAME: &'static str = "NSLink";
    const INHERITED_BY_ADDED_TEXT: bool = false;

    fn codec() -> Option<Codec<String>> {
        Some(Codec::serde())
    }

    fn foreign_codec() -> Option<ForeignCodec<String>> {
        Some(ForeignCodec::string())
    }
}

/// The BCP 47 language tag of the text.
#[derive(Copy, Clone, Debug)]
pub struct LanguageIdentifier;

impl AttributeKey for LanguageIdentifier {
    type Value = String;
    const NAME: &'static str = "NSLanguage";

    fn codec() -> Option<Codec<String>> {
        Some(Codec::serde())
    }

    fn foreign_codec() -> Option<ForeignCodec<String>> {
        Some(ForeignCodec::string())
    }
}

/// The position of an argument in a localized format string.
#[derive(Copy, Clone, Debug)]
pub struct ReplacementIndex;

impl AttributeKey for ReplacementIndex {
    type Value = i64;
    const NAME: &'static str = "NSReplacementIndex";
    const INHERITED_BY_ADDED_TEXT: bool = false;

    fn codec() -> Option<Codec<i64>> {
        Some(Codec::serde())
    }

    fn foreign_codec() -> Option<ForeignCodec<i64>> {
        Some(ForeignCodec::integer())
    }
}

/// A part of a formatted person name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NameComponent {
    /// The given name, or first name.
    GivenName,
    /// The family name, or last name.
    FamilyName,
    /// A secondary given name.
    MiddleName,
    /// A title such as "Dr.".
    NamePrefix,
    /// A suffix such as "Jr.".
    NameSuffix,
    /// An informal name.
    Nickname,
    /// Punctuation or spacing between components.
    Delimiter,
}

impl NameComponent {
    const ALL: [Self; 7] = [
        Self::GivenName,
        Self::FamilyName,
        Self::MiddleName,
        Self::NamePrefix,
        Self::NameSuffix,
        Self::Nickname,
        Self::Delimiter,
    ];

    /// The archived name of this component.
    pub fn name(self) -> &'static str {
        match self {
            Self::GivenName => "givenName",
            Self::FamilyName => "familyName",
            Self::MiddleName => "middleName",
            Self::NamePrefix => "namePrefix",
            Self::NameSuffix => "nameSuffix",
            Self::Nickname => "nickname",
            Self::Delimiter => "delimiter",
        }
    }

    /// The component archived as `name`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|component| component.name() == name)
    }
}

/// Marks the text of a person name component.
#[derive(Copy, Clone, Debug)]
pub struct PersonNameComponent;

impl AttributeKey for PersonNameComponent {
    type Value = NameComponent;
    const NAME: &'static str = "NSPersonNameComponentKey";
    const INHERITED_BY_ADDED_TEXT: bool = false;

    fn codec() -> Option<Codec<NameComponent>> {
        Some(Codec::serde())
    }

    fn foreign_codec() -> Option<ForeignCodec<NameComponent>> {
        Some(ForeignCodec {
            to_foreign: |component| Ok(ForeignValue::String(component.name().into())),
            from_foreign: |value| match value {
                ForeignValue::String(name) => NameComponent::from_name(name).ok_or_else(|| {
                    ConversionError::new(format!("unknown name component `{name}`"))
                }),
                other => Err(ConversionError::new(format!(
                    "expected a name component, found {other:?}"
                ))),
            },
        })
    }
}

/// A field of a formatted date.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DateField {
    /// The era, such as "AD".
    Era,
    /// The year.
    Year,
    /// The Gregorian year in which a non-Gregorian calendar year begins.
    RelatedGregorianYear,
    /// The quarter.
    Quarter,
    /// The month.
    Month,
    /// The week of the year.
    WeekOfYear,
    /// The week of the month.
    WeekOfMonth,
    /// The day of the week.
    Weekday,
    /// The position of the weekday within the month, as in "2nd Wednesday".
    WeekdayOrdinal,
    /// The day of the month.
    Day,
    /// The day of the year.
    DayOfYear,
    /// The AM/PM marker.
    AmPm,
    /// The hour.
    Hour,
    /// The minute.
    Minute,
    /// The second.
    Second,
    /// Fractional seconds.
    SecondFraction,
    /// The time zone.
    TimeZone,
}

impl DateField {
    /// The pattern letter this field is archived as.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Era => "G",
            Self::Year => "y",
            Self::RelatedGregorianYear => "r",
            Self::Quarter => "Q",
            Self::Month => "M",
            Self::WeekOfYear => "w",
            Self::WeekOfMonth => "W",
            Self::Weekday => "E",
            Self::WeekdayOrdinal => "F",
            Self::Day => "d",
            Self::DayOfYear => "D",
            Self::AmPm => "a",
            Self::Hour => "h",
            Self::Minute => "m",
            Self::Second => "s",
            Self::SecondFraction => "S",
            Self::TimeZone => "z",
        }
    }

    /// The field for a date format pattern letter, accepting every letter of a field.
    pub fn from_pattern(pattern: &str) -> Option<Self> {
        Some(match pattern {
            "G" => Self::Era,
            "y" | "Y" | "u" | "U" => Self::Year,
            "r" => Self::RelatedGregorianYear,
            "Q" | "q" => Self::Quarter,
            "M" | "L" => Self::Month,
            "w" => Self::WeekOfYear,
            "W" => Self::WeekOfMonth,
            "e" | "c" | "E" => Self::Weekday,
            "F" => Self::WeekdayOrdinal,
            "d" | "g" => Self::Day,
            "D" => Self::DayOfYear,
            "a" | "b" | "B" => Self::AmPm,
            "h" | "H" | "k" | "K" => Self::Hour,
            "m" => Self::Minute,
            "s" | "A" => Self::Second,
            "S" => Self::SecondFraction,
            "v" | "z" | "Z" | "O" | "V" | "X" | "x" => Self::TimeZone,
            _ => return None,
        })
    }
}

impl Serialize for DateField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.pattern())
    }
}

impl<'de> Deserialize<'de> for DateField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pattern = String::deserialize(deserializer)?;
        Self::from_pattern(&pattern).ok_or_else(|| {
            de::Error::custom(format!("invalid date field pattern `{pattern}`"))
        })
    }
}

/// Marks the text of one field of a formatted date.
#[derive(Copy, Clone, Debug)]
pub struct DateFormatField;

impl AttributeKey for DateFormatField {
    type Value = DateField;
    const NAME: &'static str = "Foundation.DateFormatField";

    fn codec() -> Option<Codec<DateField>> {
        Some(Codec::serde())
    }
}

/// The part of a formatted number some text belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NumberPart {
    /// Digits before the decimal separator.
    Integer,
    /// Digits after the decimal separator.
    Fraction,
}

impl_code_serde!(NumberPart {
    Integer = 0,
    Fraction = 1,
});

/// Marks the integer or fraction part of a formatted number.
#[derive(Copy, Clone, Debug)]
pub struct NumberFormatPart;

impl AttributeKey for NumberFormatPart {
    type Value = NumberPart;
    const NAME: &'static str = "Foundation.NumberFormatPart";

    fn codec() -> Option<Codec<NumberPart>> {
        Some(Codec::serde())
    }
}

/// A symbol inside a formatted number.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NumberSymbol {
    /// A thousands separator.
    GroupingSeparator,
    /// A plus or minus sign.
    Sign,
    /// The decimal separator.
    DecimalSeparator,
    /// A currency symbol.
    Currency,
    /// A percent sign.
    Percent,
}

impl_code_serde!(NumberSymbol {
    GroupingSeparator = 0,
    Sign = 1,
    DecimalSeparator = 2,
    Currency = 3,
    Percent = 4,
});

/// Marks a symbol inside a formatted number.
#[derive(Copy, Clone, Debug)]
pub struct NumberFormatSymbol;

impl AttributeKey for NumberFormatSymbol {
    type Value = NumberSymbol;
    const NAME: &'static str = "Foundation.NumberFormatSymbol";

    fn codec() -> Option<Codec<NumberSymbol>> {
        Some(Codec::serde())
    }
}

/// The part of a formatted measurement some text belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MeasurementComponent {
    /// The numeric value.
    Value,
    /// The unit.
    Unit,
}

impl_code_serde!(MeasurementComponent {
    Value = 0,
    Unit = 1,
});

/// Marks the value or unit of a formatted measurement.
#[derive(Copy, Clone, Debug)]
pub struct Measurement;

impl AttributeKey for Measurement {
    type Value = MeasurementComponent;
    const NAME: &'static str = "Foundation.MeasurementAttribute";

    fn codec() -> Option<Codec<MeasurementComponent>> {
        Some(Codec::serde())
    }
}

/// A unit of a formatted byte count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteCountUnit {
    /// Bytes.
    Byte,
    /// Kilobytes.
    Kb,
    /// Megabytes.
    Mb,
    /// Gigabytes.
    Gb,
    /// Terabytes.
    Tb,
    /// Petabytes.
    Pb,
    /// Exabytes.
    Eb,
    /// Zettabytes.
    Zb,
    /// Yottabytes.
    Yb,
}

/// The part of a formatted byte count some text belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ByteCountComponent {
    /// The numeric value.
    Value,
    /// The value written out in words.
    SpelledOutValue,
    /// The unit.
    Unit(ByteCountUnit),
    /// The exact number of bytes.
    ActualByteCount,
}

/// Marks a part of a formatted byte count.
#[derive(Copy, Clone, Debug)]
pub struct ByteCount;

impl AttributeKey for ByteCount {
    type Value = ByteCountComponent;
    const NAME: &'static str = "Foundation.ByteCountAttribute";

    fn codec() -> Option<Codec<ByteCountComponent>> {
        Some(Codec::serde())
    }
}

/// An alternative wording to use when grammatical agreement fails.
///
/// The alternative is itself attributed and archives with this module's [`scope`].
#[derive(Copy, Clone, Debug)]
pub struct InflectionAlternative;

impl AttributeKey for InflectionAlternative {
    type Value = AttributedString;
    const NAME: &'static str = "NSInflectionAlternative";
    const INHERITED_BY_ADDED_TEXT: bool = false;

    fn codec() -> Option<Codec<AttributedString>> {
        Some(Codec {
            encode: |alternative| archive::encode(alternative, &scope()).map_err(CodecError::from),
            decode: |json| archive::decode(json, &scope()).map_err(CodecError::from),
        })
    }
}

/// A scope holding every key in this module.
pub fn scope() -> Scope {
    Scope::new()
        .with::<Link>()
        .with::<LanguageIdentifier>()
        .with::<ReplacementIndex>()
        .with::<PersonNameComponent>()
        .with::<DateFormatField>()
        .with::<NumberFormatPart>()
        .with::<NumberFormatSymbol>()
        .with::<Measurement>()
        .with::<ByteCount>()
        .with::<InflectionAlternative>()
}
