use crate::{
    error::PlanError,
    typemap::{check_type, map_type},
};
use model::{mapping::FieldMapping, schema::table::TableSchema};
use serde::Serialize;

pub const DEFAULT_ENGINE: &str = "MergeTree()";

/// A synthesized field-mapping plan for one source table, including the DDL
/// that would create the destination table and any advisory type warnings.
#[derive(Debug, Clone, Serialize)]
pub struct MappingPlan {
    pub mappings: Vec<FieldMapping>,
    pub ddl: String,
    pub warnings: Vec<String>,
}

/// Builds the suggested mapping plan for a source schema: one active mapping
/// per column with identical source/destination names, destination types from
/// the type mapper, and primary keys never nullable.
pub fn generate_mappings(
    schema: &TableSchema,
    destination_table: &str,
) -> Result<MappingPlan, PlanError> {
    let mut mappings = Vec::with_capacity(schema.columns.len());
    let mut warnings = Vec::new();

    for column in &schema.columns {
        let check = check_type(&column.data_type);
        if let Some(warning) = check.warning {
            warnings.push(format!("{}: {warning}", column.name));
        }

        let ch_type = map_type(&column.data_type, column.nullable && !column.primary_key);

        mappings.push(FieldMapping {
            source_field: column.name.clone(),
            source_type: column.data_type.clone(),
            destination_field: column.name.clone(),
            destination_type: ch_type.to_string(),
            transformation: None,
            skip: false,
        });
    }

    let ddl = generate_ddl(destination_table, &mappings, None, None)?;

    Ok(MappingPlan {
        mappings,
        ddl,
        warnings,
    })
}

/// Checks a caller-supplied mapping plan. Returns one violation string per
/// problem and never errors; an empty list means the plan is executable.
pub fn validate_mappings(mappings: &[FieldMapping]) -> Vec<String> {
    let mut violations = Vec::new();

    let active: Vec<&FieldMapping> = mappings.iter().filter(|m| m.is_active()).collect();

    let mut duplicates = Vec::new();
    for (idx, mapping) in active.iter().enumerate() {
        let name = &mapping.destination_field;
        if active[..idx].iter().any(|m| &m.destination_field == name)
            && !duplicates.contains(name)
        {
            duplicates.push(name.clone());
        }
    }
    if !duplicates.is_empty() {
        violations.push(format!(
            "Duplicate destination fields: {}",
            duplicates.join(", ")
        ));
    }

    if active.is_empty() {
        violations.push("At least one field must not be skipped".to_string());
    }

    for mapping in &active {
        if !is_valid_identifier(&mapping.destination_field) {
            violations.push(format!(
                "Invalid destination field name: {}",
                mapping.destination_field
            ));
        }
    }

    violations
}

/// Builds the CREATE TABLE statement for the active mappings, in mapping
/// order. Uses create-if-not-exists semantics so a retried migration against
/// an already-created table stays idempotent at the statement level.
pub fn generate_ddl(
    table_name: &str,
    mappings: &[FieldMapping],
    engine: Option<&str>,
    order_by: Option<&str>,
) -> Result<String, PlanError> {
    let active: Vec<&FieldMapping> = mappings.iter().filter(|m| m.is_active()).collect();

    if active.is_empty() {
        return Err(PlanError::NoActiveMappings);
    }

    let columns = active
        .iter()
        .map(|m| format!("    {} {}", m.destination_field, m.destination_type))
        .collect::<Vec<_>>()
        .join(",\n");

    let engine = engine.unwrap_or(DEFAULT_ENGINE);
    let order_by = order_by.unwrap_or(&active[0].destination_field);

    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {table_name} (\n{columns}\n) ENGINE = {engine}\nORDER BY ({order_by})"
    ))
}

/// Destination identifier grammar: `^[A-Za-z_][A-Za-z0-9_]*$`.
fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
