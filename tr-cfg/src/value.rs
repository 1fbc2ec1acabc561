//! Values that options take on.

use std::fmt;
use std::path::PathBuf;

use compact_str::CompactString;
use tr_ore::hash::Xxh3Hasher;

use crate::SchemaError;

/// Separator used when a list is spelled as a single string, e.g. `Foo+Bar`.
pub const LIST_SEPARATOR: char = '+';

/// The kind of value an option holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    /// One of a fixed set of variants, matched case-insensitively.
    Enum(&'static [&'static str]),
    String,
    Integer,
    Float,
    StringList,
    Path,
}

impl ValueType {
    /// Parse a raw string, as found in a config file or on the command line, into a value.
    pub fn parse(&self, raw: &str) -> Result<OptionValue, SchemaError> {
        let invalid = || SchemaError::InvalidValue {
            expected: *self,
            raw: raw.to_string(),
        };
        let trimmed = raw.trim();

        let value = match self {
            ValueType::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => OptionValue::Bool(true),
                "false" | "0" | "no" | "off" => OptionValue::Bool(false),
                _ => return Err(invalid()),
            },
            ValueType::Enum(variants) => {
                let variant = variants
                    .iter()
                    .find(|variant| variant.eq_ignore_ascii_case(trimmed))
                    .ok_or_else(invalid)?;
                OptionValue::enum_variant(variant)
            }
            ValueType::String => OptionValue::String(CompactString::new(raw)),
            ValueType::Integer => OptionValue::Integer(trimmed.parse().map_err(|_| invalid())?),
            ValueType::Float => OptionValue::Float(trimmed.parse().map_err(|_| invalid())?),
            ValueType::StringList => OptionValue::StringList(split_list(raw)),
            ValueType::Path => OptionValue::Path(PathBuf::from(trimmed)),
        };
        Ok(value)
    }

    /// Parse a sequence of raw strings, e.g. a config array, into a value.
    ///
    /// Only lists accept more than one item, each raw string is one item.
    pub fn parse_items<S: AsRef<str>>(&self, items: &[S]) -> Result<OptionValue, SchemaError> {
        match (self, items) {
            (ValueType::StringList, items) => {
                let list = items
                    .iter()
                    .map(|item| item.as_ref().trim())
                    .filter(|item| !item.is_empty())
                    .map(CompactString::new)
                    .collect();
                Ok(OptionValue::StringList(list))
            }
            (_, [single]) => self.parse(single.as_ref()),
            (_, items) => Err(SchemaError::InvalidValue {
                expected: *self,
                raw: items
                    .iter()
                    .map(|item| item.as_ref())
                    .collect::<Vec<_>>()
                    .join(","),
            }),
        }
    }

    /// Returns true if `value` is a valid instance of this type.
    pub fn accepts(&self, value: &OptionValue) -> bool {
        match (self, value) {
            (ValueType::Bool, OptionValue::Bool(_))
            | (ValueType::String, OptionValue::String(_))
            | (ValueType::Integer, OptionValue::Integer(_))
            | (ValueType::Float, OptionValue::Float(_))
            | (ValueType::StringList, OptionValue::StringList(_))
            | (ValueType::Path, OptionValue::Path(_)) => true,
            (ValueType::Enum(variants), OptionValue::Enum(name)) => variants.contains(&name.as_str()),
            _ => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Bool => f.write_str("bool"),
            ValueType::Enum(variants) => write!(f, "one of [{}]", variants.join(", ")),
            ValueType::String => f.write_str("string"),
            ValueType::Integer => f.write_str("integer"),
            ValueType::Float => f.write_str("float"),
            ValueType::StringList => f.write_str("list"),
            ValueType::Path => f.write_str("path"),
        }
    }
}

fn split_list(raw: &str) -> Vec<CompactString> {
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(CompactString::new)
        .collect()
}

/// A concrete value of an option.
///
/// Floats compare by their bit pattern so values are usable as keys when comparing targets.
#[derive(Debug, Clone)]
pub enum OptionValue {
    Bool(bool),
    Enum(CompactString),
    String(CompactString),
    Integer(i64),
    Float(f64),
    StringList(Vec<CompactString>),
    Path(PathBuf),
}

impl OptionValue {
    pub fn enum_variant(name: &str) -> Self {
        OptionValue::Enum(CompactString::new(name))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(val) => Some(*val),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Enum(val) | OptionValue::String(val) => Some(val.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[CompactString]> {
        match self {
            OptionValue::StringList(val) => Some(val.as_slice()),
            _ => None,
        }
    }

    /// Feed a canonical encoding of this value into `hasher`.
    pub fn hash_into(&self, hasher: &mut Xxh3Hasher) {
        match self {
            OptionValue::Bool(val) => {
                hasher.update(&[0]);
                hasher.update(&[u8::from(*val)]);
            }
            OptionValue::Enum(val) => {
                hasher.update(&[1]);
                hasher.update_field(val.as_bytes());
            }
            OptionValue::String(val) => {
                hasher.update(&[2]);
                hasher.update_field(val.as_bytes());
            }
            OptionValue::Integer(val) => {
                hasher.update(&[3]);
                hasher.update(&val.to_le_bytes());
            }
            OptionValue::Float(val) => {
                hasher.update(&[4]);
                hasher.update(&val.to_bits().to_le_bytes());
            }
            OptionValue::StringList(items) => {
                hasher.update(&[5]);
                let len = u64::try_from(items.len()).unwrap_or(u64::MAX);
                hasher.update(&len.to_le_bytes());
                for item in items {
                    hasher.update_field(item.as_bytes());
                }
            }
            OptionValue::Path(path) => {
                hasher.update(&[6]);
                hasher.update_field(path.as_os_str().as_encoded_bytes());
            }
        }
    }
}

impl PartialEq for OptionValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (OptionValue::Bool(a), OptionValue::Bool(b)) => a == b,
            (OptionValue::Enum(a), OptionValue::Enum(b)) => a == b,
            (OptionValue::String(a), OptionValue::String(b)) => a == b,
            (OptionValue::Integer(a), OptionValue::Integer(b)) => a == b,
            (OptionValue::Float(a), OptionValue::Float(b)) => a.to_bits() == b.to_bits(),
            (OptionValue::StringList(a), OptionValue::StringList(b)) => a == b,
            (OptionValue::Path(a), OptionValue::Path(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for OptionValue {}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(val) => write!(f, "{val}"),
            OptionValue::Enum(val) | OptionValue::String(val) => f.write_str(val),
            OptionValue::Integer(val) => write!(f, "{val}"),
            OptionValue::Float(val) => write!(f, "{val}"),
            OptionValue::StringList(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, "{LIST_SEPARATOR}")?;
                    }
                    f.write_str(item)?;
                }
                Ok(())
            }
            OptionValue::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A value that can be spelled in a `const` context, used for static defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StaticValue {
    Bool(bool),
    Enum(&'static str),
    String(&'static str),
    Integer(i64),
    Float(f64),
    EmptyList,
    Path(&'static str),
}

impl StaticValue {
    pub fn to_value(&self) -> OptionValue {
        match self {
            StaticValue::Bool(val) => OptionValue::Bool(*val),
            StaticValue::Enum(val) => OptionValue::enum_variant(val),
            StaticValue::String(val) => OptionValue::String(CompactString::const_new(*val)),
            StaticValue::Integer(val) => OptionValue::Integer(*val),
            StaticValue::Float(val) => OptionValue::Float(*val),
            StaticValue::EmptyList => OptionValue::StringList(Vec::new()),
            StaticValue::Path(val) => OptionValue::Path(PathBuf::from(*val)),
        }
    }
}

/// Types that can be read from, and written to, an [`OptionValue`].
pub trait OptionKind: Sized {
    fn from_value(value: &OptionValue) -> Option<Self>;
    fn into_value(self) -> OptionValue;
}

impl OptionKind for bool {
    fn from_value(value: &OptionValue) -> Option<Self> {
        value.as_bool()
    }

    fn into_value(self) -> OptionValue {
        OptionValue::Bool(self)
    }
}

impl OptionKind for i64 {
    fn from_value(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Integer(val) => Some(*val),
            _ => None,
        }
    }

    fn into_value(self) -> OptionValue {
        OptionValue::Integer(self)
    }
}

impl OptionKind for f64 {
    fn from_value(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Float(val) => Some(*val),
            _ => None,
        }
    }

    fn into_value(self) -> OptionValue {
        OptionValue::Float(self)
    }
}

impl OptionKind for CompactString {
    fn from_value(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::String(val) => Some(val.clone()),
            _ => None,
        }
    }

    fn into_value(self) -> OptionValue {
        OptionValue::String(self)
    }
}

impl OptionKind for Vec<CompactString> {
    fn from_value(value: &OptionValue) -> Option<Self> {
        value.as_list().map(|items| items.to_vec())
    }

    fn into_value(self) -> OptionValue {
        OptionValue::StringList(self)
    }
}

impl OptionKind for PathBuf {
    fn from_value(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Path(val) => Some(val.clone()),
            _ => None,
        }
    }

    fn into_value(self) -> OptionValue {
        OptionValue::Path(self)
    }
}

/// Implements [`OptionKind`] for an enum that has `as_str(&self) -> &'static str` and
/// [`std::str::FromStr`].
#[macro_export]
macro_rules! option_enum {
    ($ty:ty) => {
        impl $crate::OptionKind for $ty {
            fn from_value(value: &$crate::OptionValue) -> Option<Self> {
                match value {
                    $crate::OptionValue::Enum(name) => name.parse().ok(),
                    _ => None,
                }
            }

            fn into_value(self) -> $crate::OptionValue {
                $crate::OptionValue::enum_variant(self.as_str())
            }
        }
    };
}

option_enum!(tr_types::Archetype);
option_enum!(tr_types::Configuration);

#[cfg(test)]
mod tests {
    use super::*;

    static MODES: &[&str] = &["speed", "size", "size_and_speed"];

    #[test]
    fn smoketest_parse_bool() {
        for raw in ["true", "1", "Yes", "ON"] {
            assert_eq!(ValueType::Bool.parse(raw).unwrap(), OptionValue::Bool(true));
        }
        for raw in ["false", "0", "no", "Off"] {
            assert_eq!(ValueType::Bool.parse(raw).unwrap(), OptionValue::Bool(false));
        }
        assert!(ValueType::Bool.parse("maybe").is_err());
    }

    #[test]
    fn smoketest_parse_enum() {
        let ty = ValueType::Enum(MODES);
        assert_eq!(ty.parse("SIZE").unwrap(), OptionValue::enum_variant("size"));

        let err = ty.parse("fast").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value 'fast', expected one of [speed, size, size_and_speed]"
        );
    }

    #[test]
    fn smoketest_parse_list() {
        let value = ValueType::StringList.parse("Foo+Bar+ +Baz").unwrap();
        assert_eq!(value.to_string(), "Foo+Bar+Baz");

        let value = ValueType::StringList.parse_items(&["VERSION_EXPR=1+2", "C", " "]).unwrap();
        assert_eq!(
            value.as_list().unwrap(),
            [CompactString::new("VERSION_EXPR=1+2"), CompactString::new("C")]
        );

        assert!(ValueType::Integer.parse_items(&["1", "2"]).is_err());
        assert_eq!(
            ValueType::Integer.parse_items(&["12"]).unwrap(),
            OptionValue::Integer(12)
        );
    }

    #[test]
    fn accepts_checks_enum_variants() {
        let ty = ValueType::Enum(MODES);
        assert!(ty.accepts(&OptionValue::enum_variant("speed")));
        assert!(!ty.accepts(&OptionValue::enum_variant("fast")));
        assert!(!ty.accepts(&OptionValue::Bool(true)));
    }

    #[test]
    fn floats_compare_by_bits() {
        assert_eq!(OptionValue::Float(f64::NAN), OptionValue::Float(f64::NAN));
        assert_ne!(OptionValue::Float(0.0), OptionValue::Float(-0.0));
    }

    #[test]
    fn typed_round_trip_for_shared_enums() {
        let value = tr_types::Archetype::Server.into_value();
        assert_eq!(value.to_string(), "server");
        assert_eq!(
            tr_types::Archetype::from_value(&value),
            Some(tr_types::Archetype::Server)
        );
        assert_eq!(tr_types::Archetype::from_value(&OptionValue::Bool(true)), None);
    }
}
