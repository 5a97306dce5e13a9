#[cfg(test)]
mod tests {
    use crate::mocks::{MemFactory, MemHistory, MemSink, MemSource};
    use connectors::sink::DestinationSink;
    use engine_core::{
        error::MigrationError,
        history::HistoryStore,
        orchestrator::MigrationOrchestrator,
        registry::MigrationStatusRegistry,
    };
    use model::{
        core::value::Value,
        mapping::FieldMapping,
        migration::{
            request::MigrationRequest,
            status::{MigrationStatus, MigrationStatusReport},
        },
        records::row::RowData,
        schema::{column::ColumnDefinition, table::TableSchema},
    };
    use std::{sync::Arc, time::Duration};
    use tokio::sync::Semaphore;

    fn users_schema() -> TableSchema {
        TableSchema {
            table: "users".to_string(),
            schema_name: "public".to_string(),
            columns: vec![
                ColumnDefinition {
                    name: "id".to_string(),
                    data_type: "int".to_string(),
                    nullable: false,
                    primary_key: true,
                    default_value: None,
                    max_length: None,
                },
                ColumnDefinition {
                    name: "email".to_string(),
                    data_type: "varchar(255)".to_string(),
                    nullable: true,
                    primary_key: false,
                    default_value: None,
                    max_length: Some(255),
                },
            ],
            row_count: None,
            estimated_size_mb: None,
        }
    }

    fn users_rows(count: i64) -> Vec<RowData> {
        (1..=count)
            .map(|i| {
                RowData::new(vec![
                    ("id".to_string(), Value::Int(i)),
                    ("email".to_string(), Value::String(format!("u{i}@example.com"))),
                ])
            })
            .collect()
    }

    fn users_mappings() -> Vec<FieldMapping> {
        vec![
            FieldMapping {
                source_field: "id".to_string(),
                source_type: "int".to_string(),
                destination_field: "id".to_string(),
                destination_type: "Int32".to_string(),
                transformation: None,
                skip: false,
            },
            FieldMapping {
                source_field: "email".to_string(),
                source_type: "varchar(255)".to_string(),
                destination_field: "email".to_string(),
                destination_type: "Nullable(String)".to_string(),
                transformation: None,
                skip: false,
            },
        ]
    }

    fn request(batch_size: usize) -> MigrationRequest {
        MigrationRequest {
            source_connection: None,
            source_schema: "public".to_string(),
            source_table: "users".to_string(),
            destination_table: "users_ch".to_string(),
            mappings: users_mappings(),
            create_table: true,
            batch_size,
            description: String::new(),
            created_by: "tests".to_string(),
        }
    }

    struct Pipeline {
        orchestrator: MigrationOrchestrator,
        sink: Arc<MemSink>,
        history: Arc<MemHistory>,
    }

    fn pipeline(rows: Vec<RowData>, sink: MemSink) -> Pipeline {
        let source = Arc::new(MemSource::new(users_schema(), rows));
        let sink = Arc::new(sink);
        let history = Arc::new(MemHistory::new());
        let orchestrator = MigrationOrchestrator::new(
            Arc::new(MemFactory::new(Arc::clone(&source))),
            Arc::clone(&sink) as Arc<dyn DestinationSink>,
            Arc::clone(&history) as Arc<dyn HistoryStore>,
            MigrationStatusRegistry::new(),
        );
        Pipeline {
            orchestrator,
            sink,
            history,
        }
    }

    async fn wait_until<F>(
        orchestrator: &MigrationOrchestrator,
        id: &str,
        predicate: F,
    ) -> MigrationStatusReport
    where
        F: Fn(&MigrationStatusReport) -> bool,
    {
        for _ in 0..500 {
            let report = orchestrator.get_status(id).await.unwrap();
            if predicate(&report) {
                return report;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached for migration {id}");
    }

    async fn wait_terminal(orchestrator: &MigrationOrchestrator, id: &str) -> MigrationStatusReport {
        wait_until(orchestrator, id, |r| r.status.is_terminal()).await
    }

    #[tokio::test]
    async fn five_rows_in_batches_of_two_complete_in_three_batches() {
        let p = pipeline(users_rows(5), MemSink::new());

        let id = p.orchestrator.submit(request(2)).await.unwrap();
        let report = wait_terminal(&p.orchestrator, &id).await;

        assert_eq!(report.status, MigrationStatus::Completed);
        assert_eq!(report.progress.total_batches, Some(3));
        assert_eq!(report.progress.processed_records, 5);
        assert_eq!(report.progress.percentage, 100.0);
        assert!(report.completed_at.is_some());

        assert_eq!(p.sink.row_count("users_ch"), 5);

        let record = p.history.record(&id).unwrap();
        assert_eq!(record.status, MigrationStatus::Completed);
        assert_eq!(record.records_migrated, 5);
        assert!(record.error_message.is_none());
    }

    #[tokio::test]
    async fn insert_failure_ends_failed_and_keeps_loaded_batches() {
        let p = pipeline(users_rows(6), MemSink::failing_on_batch(2));

        let id = p.orchestrator.submit(request(2)).await.unwrap();
        let report = wait_terminal(&p.orchestrator, &id).await;

        assert_eq!(report.status, MigrationStatus::Failed);
        assert!(
            report
                .error_message
                .as_deref()
                .unwrap()
                .contains("injected insert failure")
        );

        // Batch 1 stays in the destination; nothing is rolled back.
        assert_eq!(p.sink.row_count("users_ch"), 2);

        let record = p.history.record(&id).unwrap();
        assert_eq!(record.status, MigrationStatus::Failed);
        assert_eq!(record.records_migrated, 2);
        assert!(record.error_message.is_some());
    }

    #[tokio::test]
    async fn rejected_submission_leaves_no_trace() {
        let p = pipeline(users_rows(3), MemSink::new());

        let mut bad = request(0);
        bad.mappings[1].destination_field = "id".to_string();

        let err = p.orchestrator.submit(bad).await.unwrap_err();
        let MigrationError::Validation(violations) = err else {
            panic!("expected a validation error");
        };
        assert_eq!(
            violations,
            vec![
                "Batch size must be greater than zero",
                "Duplicate destination fields: id",
            ]
        );

        assert_eq!(p.history.len(), 0);
        assert_eq!(p.sink.row_count("users_ch"), 0);
    }

    #[tokio::test]
    async fn submit_returns_while_the_run_is_still_in_flight() {
        let gate = Arc::new(Semaphore::new(0));
        let p = pipeline(users_rows(4), MemSink::gated(Arc::clone(&gate)));

        let id = p.orchestrator.submit(request(2)).await.unwrap();

        // The id is queryable immediately, with the run held at batch 1.
        let report = p.orchestrator.get_status(&id).await.unwrap();
        assert_eq!(report.status, MigrationStatus::Running);
        assert_eq!(
            p.history.record(&id).unwrap().status,
            MigrationStatus::Running
        );

        gate.add_permits(16);
        let report = wait_terminal(&p.orchestrator, &id).await;
        assert_eq!(report.status, MigrationStatus::Completed);
    }

    #[tokio::test]
    async fn progress_advances_batch_by_batch() {
        let gate = Arc::new(Semaphore::new(0));
        let p = pipeline(users_rows(4), MemSink::gated(Arc::clone(&gate)));

        let id = p.orchestrator.submit(request(2)).await.unwrap();

        gate.add_permits(1);
        let report = wait_until(&p.orchestrator, &id, |r| {
            r.progress.current_batch == Some(1)
        })
        .await;
        assert_eq!(report.progress.processed_records, 2);
        assert_eq!(report.progress.percentage, 50.0);

        gate.add_permits(1);
        let report = wait_until(&p.orchestrator, &id, |r| {
            r.progress.current_batch == Some(2)
        })
        .await;
        assert_eq!(report.progress.processed_records, 4);

        gate.add_permits(4);
        let report = wait_terminal(&p.orchestrator, &id).await;
        assert_eq!(report.status, MigrationStatus::Completed);
        assert_eq!(report.progress.percentage, 100.0);
    }

    #[tokio::test]
    async fn empty_source_completes_with_one_display_batch() {
        let p = pipeline(Vec::new(), MemSink::new());

        let id = p.orchestrator.submit(request(100)).await.unwrap();
        let report = wait_terminal(&p.orchestrator, &id).await;

        assert_eq!(report.status, MigrationStatus::Completed);
        assert_eq!(report.progress.percentage, 100.0);
        assert_eq!(p.sink.row_count("users_ch"), 0);
        assert_eq!(p.history.record(&id).unwrap().records_migrated, 0);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let p = pipeline(users_rows(1), MemSink::new());
        assert!(matches!(
            p.orchestrator.get_status("nope").await,
            Err(MigrationError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn skipped_fields_never_reach_the_destination() {
        let p = pipeline(users_rows(2), MemSink::new());

        let mut req = request(10);
        req.mappings[1].skip = true;

        let id = p.orchestrator.submit(req).await.unwrap();
        wait_terminal(&p.orchestrator, &id).await;

        let tables = p.sink.tables.lock().unwrap();
        let rows = tables.get("users_ch").unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.get("email").is_none()));
        assert!(rows.iter().all(|r| r.get("id").is_some()));
    }

    #[tokio::test]
    async fn suggested_plan_migrates_end_to_end() {
        let p = pipeline(users_rows(3), MemSink::new());

        let plan = p
            .orchestrator
            .suggest_mappings("users", "public", "users_ch", None)
            .await
            .unwrap();
        let types: Vec<&str> = plan
            .mappings
            .iter()
            .map(|m| m.destination_type.as_str())
            .collect();
        assert_eq!(types, vec!["Int32", "Nullable(String)"]);

        let mut req = request(10);
        req.mappings = plan.mappings;
        let id = p.orchestrator.submit(req).await.unwrap();
        let report = wait_terminal(&p.orchestrator, &id).await;

        assert_eq!(report.status, MigrationStatus::Completed);
        assert_eq!(p.sink.ddl_log.lock().unwrap().as_slice(), [plan.ddl]);
        assert_eq!(p.sink.row_count("users_ch"), 3);
    }

    #[tokio::test]
    async fn history_lists_most_recent_first_with_status_filter() {
        let p = pipeline(users_rows(2), MemSink::new());

        let first = p.orchestrator.submit(request(10)).await.unwrap();
        wait_terminal(&p.orchestrator, &first).await;
        let second = p.orchestrator.submit(request(10)).await.unwrap();
        wait_terminal(&p.orchestrator, &second).await;

        let (total, page) = p.orchestrator.history(10, 0, None).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(page[0].id, second);
        assert_eq!(page[1].id, first);

        let (failed, page) = p
            .orchestrator
            .history(10, 0, Some(MigrationStatus::Failed))
            .await
            .unwrap();
        assert_eq!(failed, 0);
        assert!(page.is_empty());
    }
}
