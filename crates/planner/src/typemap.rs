use lazy_static::lazy_static;
use model::core::data_type::ChType;
use std::collections::HashMap;

lazy_static! {
    static ref PG_TYPE_MAP: HashMap<&'static str, ChType> = build_pg_type_map();
}

/// Result of a permissive type check: mapping never fails, it degrades to
/// `String` and attaches an advisory warning instead.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeCheck {
    pub destination: ChType,
    pub warning: Option<String>,
}

/// Maps a Postgres column type to its ClickHouse counterpart.
///
/// Array types map to `Array(base)` and are never wrapped `Nullable`
/// (ClickHouse arrays cannot be nullable). Parametrized decimals keep their
/// precision and scale; parametrized character types drop the length. Any
/// unrecognized type falls back to `String`. Callers pass
/// `nullable = column.nullable && !column.primary_key` so that primary keys
/// are never nullable-wrapped.
pub fn map_type(source_type: &str, nullable: bool) -> ChType {
    let pg_type = source_type.trim().to_lowercase();

    if let Some(base) = pg_type.strip_suffix("[]") {
        let element = PG_TYPE_MAP.get(base).cloned().unwrap_or(ChType::String);
        return ChType::Array(Box::new(element));
    }

    let ch_type = if let Some((precision, scale)) = parse_decimal_params(&pg_type) {
        ChType::Decimal { precision, scale }
    } else if parse_char_length(&pg_type).is_some() {
        ChType::String
    } else {
        PG_TYPE_MAP.get(pg_type.as_str()).cloned().unwrap_or(ChType::String)
    };

    if nullable { ch_type.nullable() } else { ch_type }
}

/// Mirrors [`map_type`] but reports instead of deciding: always valid, with
/// a warning when the type (or an array's base type) is unrecognized.
pub fn check_type(source_type: &str) -> TypeCheck {
    let pg_type = source_type.trim().to_lowercase();

    if let Some(base) = pg_type.strip_suffix("[]") {
        return match PG_TYPE_MAP.get(base) {
            Some(element) => TypeCheck {
                destination: ChType::Array(Box::new(element.clone())),
                warning: Some("Array types may require special handling".to_string()),
            },
            None => TypeCheck {
                destination: ChType::Array(Box::new(ChType::String)),
                warning: Some(format!("Unknown array base type '{base}', using String")),
            },
        };
    }

    if let Some((precision, scale)) = parse_decimal_params(&pg_type) {
        return TypeCheck {
            destination: ChType::Decimal { precision, scale },
            warning: None,
        };
    }

    if parse_char_length(&pg_type).is_some() {
        return TypeCheck {
            destination: ChType::String,
            warning: None,
        };
    }

    match PG_TYPE_MAP.get(pg_type.as_str()) {
        Some(ch_type) => TypeCheck {
            destination: ch_type.clone(),
            warning: None,
        },
        None => TypeCheck {
            destination: ChType::String,
            warning: Some(format!(
                "Unknown type '{source_type}', defaulting to String"
            )),
        },
    }
}

/// Parses `numeric(p, s)` / `decimal(p, s)` parameters.
fn parse_decimal_params(pg_type: &str) -> Option<(u8, u8)> {
    let args = strip_parametrized(pg_type, &["numeric", "decimal"])?;
    let (precision, scale) = args.split_once(',')?;
    Some((
        precision.trim().parse().ok()?,
        scale.trim().parse().ok()?,
    ))
}

/// Parses the length out of `varchar(n)` and friends; the length itself is
/// dropped during mapping.
fn parse_char_length(pg_type: &str) -> Option<u32> {
    let args = strip_parametrized(pg_type, &["varchar", "character varying", "char", "character"])?;
    args.trim().parse().ok()
}

fn strip_parametrized<'a>(pg_type: &'a str, names: &[&str]) -> Option<&'a str> {
    for name in names {
        if let Some(rest) = pg_type.strip_prefix(name)
            && let Some(args) = rest.strip_prefix('(')
            && let Some(args) = args.strip_suffix(')')
        {
            return Some(args);
        }
    }
    None
}

fn build_pg_type_map() -> HashMap<&'static str, ChType> {
    use ChType::*;

    let entries = [
        // Integer types
        ("smallint", Int16),
        ("int2", Int16),
        ("integer", Int32),
        ("int", Int32),
        ("int4", Int32),
        ("serial", Int32),
        ("bigint", Int64),
        ("int8", Int64),
        ("bigserial", Int64),
        // Floating point types
        ("real", Float32),
        ("float4", Float32),
        ("double precision", Float64),
        ("float8", Float64),
        ("numeric", Decimal128 { scale: 38 }),
        ("decimal", Decimal128 { scale: 38 }),
        // String types
        ("varchar", String),
        ("character varying", String),
        ("text", String),
        ("char", String),
        ("character", String),
        ("bpchar", String),
        // Date/time types
        ("date", Date),
        ("timestamp", DateTime),
        ("timestamp without time zone", DateTime),
        ("timestamptz", DateTime64 { precision: 3 }),
        ("timestamp with time zone", DateTime64 { precision: 3 }),
        ("time", String),
        ("time without time zone", String),
        ("timetz", String),
        ("time with time zone", String),
        // Boolean
        ("boolean", UInt8),
        ("bool", UInt8),
        // JSON
        ("json", String),
        ("jsonb", String),
        // UUID
        ("uuid", Uuid),
        // Binary
        ("bytea", String),
    ];

    let mut map = HashMap::new();
    for (name, ch_type) in entries {
        map.insert(name, ch_type);
    }
    map
}
