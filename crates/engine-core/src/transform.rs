use model::{
    core::{data_type::ChType, value::Value},
    mapping::FieldMapping,
    records::row::RowData,
};

/// Applies the mapping plan to one extracted page. Output rows carry the
/// destination field names in mapping order; skipped mappings are omitted.
pub fn transform_page(rows: &[RowData], mappings: &[FieldMapping]) -> Vec<RowData> {
    rows.iter().map(|row| transform_row(row, mappings)).collect()
}

fn transform_row(row: &RowData, mappings: &[FieldMapping]) -> RowData {
    let mut out = RowData::default();

    for mapping in mappings.iter().filter(|m| m.is_active()) {
        let destination_type = ChType::parse(&mapping.destination_type);
        let value = row.get(&mapping.source_field).cloned().unwrap_or(Value::Null);
        out.push(&mapping.destination_field, coerce(value, &destination_type));
    }

    out
}

/// Per-cell coercion, in fixed order: null substitution for non-nullable
/// destinations, boolean normalization to 0/1, then composite serialization
/// unless the destination is itself array-shaped.
fn coerce(value: Value, destination_type: &ChType) -> Value {
    let value = if value.is_null() && !destination_type.is_nullable() {
        match destination_type.null_default() {
            Some(substitute) => substitute,
            None => value,
        }
    } else {
        value
    };

    let value = match value {
        Value::Boolean(b) => Value::Uint(u64::from(b)),
        other => other,
    };

    if value.is_composite() && !destination_type.is_array() {
        return Value::String(value.to_json().to_string());
    }

    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(source: &str, dest: &str, destination_type: &str, skip: bool) -> FieldMapping {
        FieldMapping {
            source_field: source.to_string(),
            source_type: String::new(),
            destination_field: dest.to_string(),
            destination_type: destination_type.to_string(),
            transformation: None,
            skip,
        }
    }

    #[test]
    fn nullable_destination_preserves_null_and_booleans_normalize() {
        let row = RowData::new(vec![
            ("id".into(), Value::Int(5)),
            ("email".into(), Value::Null),
            ("active".into(), Value::Boolean(true)),
        ]);
        let mappings = vec![
            mapping("id", "id", "Int32", false),
            mapping("email", "email", "Nullable(String)", false),
            mapping("active", "active", "UInt8", false),
        ];

        let out = transform_row(&row, &mappings);
        assert_eq!(
            out.fields,
            vec![
                ("id".to_string(), Value::Int(5)),
                ("email".to_string(), Value::Null),
                ("active".to_string(), Value::Uint(1)),
            ]
        );
    }

    #[test]
    fn missing_key_with_array_destination_defaults_to_empty_array() {
        let row = RowData::new(vec![("id".into(), Value::Int(1))]);
        let mappings = vec![
            mapping("id", "id", "Int32", false),
            mapping("tags", "tags", "Array(String)", false),
        ];

        let out = transform_row(&row, &mappings);
        assert_eq!(out.get("tags"), Some(&Value::Array(vec![])));
    }

    #[test]
    fn missing_key_with_non_nullable_scalar_takes_type_class_default() {
        let row = RowData::default();
        let mappings = vec![
            mapping("n", "n", "Int64", false),
            mapping("f", "f", "Float64", false),
            mapping("s", "s", "String", false),
        ];

        let out = transform_row(&row, &mappings);
        assert_eq!(out.get("n"), Some(&Value::Int(0)));
        assert_eq!(out.get("f"), Some(&Value::Float(0.0)));
        assert_eq!(out.get("s"), Some(&Value::String(String::new())));
    }

    #[test]
    fn composites_serialize_to_json_unless_destination_is_array() {
        let row = RowData::new(vec![
            (
                "payload".into(),
                Value::Json(serde_json::json!({"a": 1})),
            ),
            (
                "tags".into(),
                Value::Array(vec![Value::String("x".into())]),
            ),
        ]);
        let mappings = vec![
            mapping("payload", "payload", "String", false),
            mapping("tags", "tags", "Array(String)", false),
        ];

        let out = transform_row(&row, &mappings);
        assert_eq!(
            out.get("payload"),
            Some(&Value::String("{\"a\":1}".to_string()))
        );
        assert_eq!(
            out.get("tags"),
            Some(&Value::Array(vec![Value::String("x".into())]))
        );
    }

    #[test]
    fn skipped_mappings_are_omitted_and_order_follows_the_plan() {
        let row = RowData::new(vec![
            ("a".into(), Value::Int(1)),
            ("b".into(), Value::Int(2)),
            ("c".into(), Value::Int(3)),
        ]);
        let mappings = vec![
            mapping("c", "c_out", "Int32", false),
            mapping("b", "b_out", "Int32", true),
            mapping("a", "a_out", "Int32", false),
        ];

        let out = transform_row(&row, &mappings);
        let names: Vec<&str> = out.fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["c_out", "a_out"]);
    }

    #[test]
    fn renames_fields_to_destination_names() {
        let row = RowData::new(vec![("user_email".into(), Value::String("x@y".into()))]);
        let mappings = vec![mapping("user_email", "email", "String", false)];

        let out = transform_row(&row, &mappings);
        assert_eq!(out.get("email"), Some(&Value::String("x@y".into())));
        assert!(out.get("user_email").is_none());
    }
}
