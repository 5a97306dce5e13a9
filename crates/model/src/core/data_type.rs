use crate::core::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Destination (ClickHouse) type descriptor.
///
/// `Display` renders the exact ClickHouse syntax; `parse` accepts anything
/// `Display` emits and degrades unknown text to `String`, which is only used
/// for family classification of caller-supplied mapping plans.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChType {
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Decimal { precision: u8, scale: u8 },
    Decimal128 { scale: u8 },
    String,
    Date,
    DateTime,
    DateTime64 { precision: u8 },
    Uuid,
    Array(Box<ChType>),
    Nullable(Box<ChType>),
}

impl ChType {
    pub fn nullable(self) -> ChType {
        ChType::Nullable(Box::new(self))
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, ChType::Nullable(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ChType::Array(_))
    }

    /// The null-substitution value for a non-nullable destination column, by
    /// type family. Families without a documented default keep the null.
    pub fn null_default(&self) -> Option<Value> {
        match self {
            ChType::Int16 | ChType::Int32 | ChType::Int64 => Some(Value::Int(0)),
            ChType::UInt8 | ChType::UInt32 | ChType::UInt64 => Some(Value::Uint(0)),
            ChType::Float32
            | ChType::Float64
            | ChType::Decimal { .. }
            | ChType::Decimal128 { .. } => Some(Value::Float(0.0)),
            ChType::String => Some(Value::String(String::new())),
            ChType::Array(_) => Some(Value::Array(Vec::new())),
            ChType::Date
            | ChType::DateTime
            | ChType::DateTime64 { .. }
            | ChType::Uuid
            | ChType::Nullable(_) => None,
        }
    }

    /// Lenient parse of a rendered ClickHouse type. Unknown names fall back
    /// to `String` instead of failing so that hand-written mapping plans can
    /// still be classified.
    pub fn parse(input: &str) -> ChType {
        let trimmed = input.trim();

        if let Some(inner) = strip_wrapper(trimmed, "Nullable") {
            return ChType::parse(inner).nullable();
        }
        if let Some(inner) = strip_wrapper(trimmed, "Array") {
            return ChType::Array(Box::new(ChType::parse(inner)));
        }
        if let Some(args) = strip_wrapper(trimmed, "Decimal128") {
            let scale = args.trim().parse().unwrap_or(38);
            return ChType::Decimal128 { scale };
        }
        if let Some(args) = strip_wrapper(trimmed, "Decimal") {
            let mut parts = args.splitn(2, ',');
            let precision = parts.next().and_then(|p| p.trim().parse().ok());
            let scale = parts.next().and_then(|s| s.trim().parse().ok());
            if let (Some(precision), Some(scale)) = (precision, scale) {
                return ChType::Decimal { precision, scale };
            }
            return ChType::Decimal128 { scale: 38 };
        }
        if let Some(args) = strip_wrapper(trimmed, "DateTime64") {
            let precision = args.trim().parse().unwrap_or(3);
            return ChType::DateTime64 { precision };
        }

        match trimmed {
            "Int16" => ChType::Int16,
            "Int32" => ChType::Int32,
            "Int64" => ChType::Int64,
            "UInt8" => ChType::UInt8,
            "UInt32" => ChType::UInt32,
            "UInt64" => ChType::UInt64,
            "Float32" => ChType::Float32,
            "Float64" => ChType::Float64,
            "Date" => ChType::Date,
            "DateTime" => ChType::DateTime,
            "UUID" => ChType::Uuid,
            _ => ChType::String,
        }
    }
}

fn strip_wrapper<'a>(input: &'a str, name: &str) -> Option<&'a str> {
    input
        .strip_prefix(name)?
        .strip_prefix('(')?
        .strip_suffix(')')
}

impl fmt::Display for ChType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChType::Int16 => write!(f, "Int16"),
            ChType::Int32 => write!(f, "Int32"),
            ChType::Int64 => write!(f, "Int64"),
            ChType::UInt8 => write!(f, "UInt8"),
            ChType::UInt32 => write!(f, "UInt32"),
            ChType::UInt64 => write!(f, "UInt64"),
            ChType::Float32 => write!(f, "Float32"),
            ChType::Float64 => write!(f, "Float64"),
            ChType::Decimal { precision, scale } => write!(f, "Decimal({precision},{scale})"),
            ChType::Decimal128 { scale } => write!(f, "Decimal128({scale})"),
            ChType::String => write!(f, "String"),
            ChType::Date => write!(f, "Date"),
            ChType::DateTime => write!(f, "DateTime"),
            ChType::DateTime64 { precision } => write!(f, "DateTime64({precision})"),
            ChType::Uuid => write!(f, "UUID"),
            ChType::Array(inner) => write!(f, "Array({inner})"),
            ChType::Nullable(inner) => write!(f, "Nullable({inner})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_round_trip() {
        let types = [
            ChType::Int32,
            ChType::UInt8,
            ChType::Decimal {
                precision: 10,
                scale: 2,
            },
            ChType::Decimal128 { scale: 38 },
            ChType::DateTime64 { precision: 3 },
            ChType::Array(Box::new(ChType::Int64)),
            ChType::String.nullable(),
            ChType::Array(Box::new(ChType::String)),
        ];
        for ty in types {
            assert_eq!(ChType::parse(&ty.to_string()), ty);
        }
    }

    #[test]
    fn unknown_text_classifies_as_string() {
        assert_eq!(ChType::parse("Tuple(Int32, String)"), ChType::String);
        assert_eq!(ChType::parse("hstore"), ChType::String);
    }

    #[test]
    fn null_defaults_follow_type_family() {
        assert_eq!(ChType::Int64.null_default(), Some(Value::Int(0)));
        assert_eq!(ChType::UInt8.null_default(), Some(Value::Uint(0)));
        assert_eq!(ChType::Float32.null_default(), Some(Value::Float(0.0)));
        assert_eq!(
            ChType::String.null_default(),
            Some(Value::String(String::new()))
        );
        assert_eq!(
            ChType::Array(Box::new(ChType::String)).null_default(),
            Some(Value::Array(Vec::new()))
        );
        assert_eq!(ChType::Date.null_default(), None);
        assert_eq!(ChType::String.nullable().null_default(), None);
    }
}
