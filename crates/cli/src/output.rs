use model::{
    migration::{record::MigrationRecord, status::MigrationStatusReport},
    schema::table::TableSchema,
};
use planner::mapping::MappingPlan;

pub fn print_tables(schema: &str, tables: &[String]) {
    println!("Tables in schema '{schema}':");
    for table in tables {
        println!("  {table}");
    }
    println!("({} tables)", tables.len());
}

pub fn print_schema(schema: &TableSchema) {
    println!("{}.{}", schema.schema_name, schema.table);
    if let Some(rows) = schema.row_count {
        println!("{:<16} {rows}", "Rows");
    }
    if let Some(size) = schema.estimated_size_mb {
        println!("{:<16} {size:.2} MB", "Estimated size");
    }
    println!("{:<24} {:<20} {:<8} {:<4}", "Column", "Type", "Nullable", "PK");
    for column in &schema.columns {
        println!(
            "{:<24} {:<20} {:<8} {:<4}",
            column.name,
            column.data_type,
            if column.nullable { "yes" } else { "no" },
            if column.primary_key { "pk" } else { "" },
        );
    }
}

pub fn print_plan(plan: &MappingPlan) {
    println!("{:<24} {:<16} -> {:<24} {}", "Source", "Type", "Destination", "Type");
    for mapping in &plan.mappings {
        println!(
            "{:<24} {:<16} -> {:<24} {}",
            mapping.source_field, mapping.source_type, mapping.destination_field, mapping.destination_type,
        );
    }
    for warning in &plan.warnings {
        println!("warning: {warning}");
    }
    println!("\n{}", plan.ddl);
}

pub fn print_progress(report: &MigrationStatusReport) {
    let progress = &report.progress;
    let batch = match (progress.current_batch, progress.total_batches) {
        (Some(current), Some(total)) => format!("batch {current}/{total}"),
        _ => "starting".to_string(),
    };
    println!(
        "[{}] {} {:>6.2}% ({}/{} rows, {batch})",
        report.id,
        report.status,
        progress.percentage,
        progress.processed_records,
        progress.total_records,
    );
}

pub fn print_record(record: &MigrationRecord) {
    println!("{:<18} {}", "Id", record.id);
    println!("{:<18} {}", "Status", record.status);
    println!("{:<18} {}", "Source", record.source);
    println!("{:<18} {}", "Source table", record.source_table);
    println!("{:<18} {}", "Destination", record.destination);
    println!("{:<18} {}", "Started", record.migration_time.to_rfc3339());
    println!("{:<18} {}", "Rows migrated", record.records_migrated);
    println!("{:<18} {}s", "Duration", record.duration_seconds);
    println!("{:<18} {}", "Created by", record.created_by);
    if !record.description.is_empty() {
        println!("{:<18} {}", "Description", record.description);
    }
    if let Some(error) = &record.error_message {
        println!("{:<18} {}", "Error", error);
    }
}

pub fn print_history(total: u64, offset: u64, records: &[MigrationRecord]) {
    println!(
        "{:<38} {:<10} {:<24} {:>12} {:>8}",
        "Id", "Status", "Table", "Rows", "Secs"
    );
    for record in records {
        println!(
            "{:<38} {:<10} {:<24} {:>12} {:>8}",
            record.id,
            record.status.as_str(),
            record.source_table,
            record.records_migrated,
            record.duration_seconds,
        );
    }
    println!(
        "Showing {}-{} of {total}",
        offset + 1,
        offset + records.len() as u64
    );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
