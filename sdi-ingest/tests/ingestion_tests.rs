//! End-to-end ingestion runs against the in-memory repository
//!
//! Each test builds a temporary storage root, runs the orchestrator once (or
//! twice) and checks the repository tree, the outcome areas and the audit
//! logs.

mod helpers;

use helpers::{
    md5_hex, read_log, write_artifact, write_sheet, InMemoryRepository, RepositoryCall,
    TestStorage,
};
use sdi_ingest::services::{CsvTabularReader, PairingPreview};
use sdi_ingest::{ErrorKind, IngestionOrchestrator};
use serde_json::Value;
use std::sync::Arc;

const REPORT_BYTES: &[u8] = b"%PDF-1.4 quarterly report, page 1";

fn orchestrator(storage: &TestStorage, repository: &Arc<InMemoryRepository>) -> IngestionOrchestrator {
    IngestionOrchestrator::new(
        &storage.config,
        repository.clone(),
        Arc::new(CsvTabularReader::new()),
    )
    .unwrap()
}

fn report_sheet(hash: &str) -> String {
    format!("Department,Year,Quarter,MD5 Code\nFinance,2024,Q1,{}\n", hash)
}

#[tokio::test]
async fn test_verified_artifact_is_filed_tagged_and_moved_to_success() {
    // Given: report.pdf with a sheet carrying its true MD5
    let storage = TestStorage::new();
    write_artifact(storage.root(), "report.pdf", REPORT_BYTES);
    write_sheet(storage.root(), "report", &report_sheet(&md5_hex(REPORT_BYTES)));
    let repository = Arc::new(InMemoryRepository::new());

    // When
    let summary = orchestrator(&storage, &repository).run().await.unwrap();

    // Then: Finance/2024/Q1 exists and holds the upload
    assert_eq!(summary.total_artifacts, 1);
    assert_eq!(summary.succeeded, 1);
    let leaf = repository.folder_id_at("Finance/2024/Q1").unwrap();
    let contents = repository.contents();
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0].parent, leaf);
    assert_eq!(contents[0].name, "report.pdf");
    assert_eq!(contents[0].size, REPORT_BYTES.len());

    // Tagged: aspect added next to existing ones, hash written as a property
    assert!(contents[0].aspect_names.contains(&"cm:titled".to_string()));
    assert!(contents[0]
        .aspect_names
        .contains(&"sdi:scannedDocument".to_string()));
    assert_eq!(
        contents[0].properties.get("sdi:md5Code"),
        Some(&Value::String(md5_hex(REPORT_BYTES)))
    );

    // Moved and logged
    assert!(!storage.path("PDF/report.pdf").exists());
    assert!(storage.path("RESULT/SUCCESS/report.pdf").exists());
    let report = summary.report_for("report.pdf").unwrap();
    assert!(report.relocated);
    assert_eq!(
        report.remote_path.as_deref(),
        Some("/Company Home/Scans/Finance/2024/Q1/report.pdf")
    );

    let log = read_log(storage.root(), "SUCCESS", &summary.run_date);
    assert!(log.contains("]: report.pdf\n"));
    assert!(log.contains(&format!("\tremote id: {}\n", contents[0].id)));
    assert!(log.contains("\tremote path: /Company Home/Scans/Finance/2024/Q1/report.pdf\n"));
    assert!(log.ends_with("\n\n"));
    assert!(read_log(storage.root(), "ERROR", &summary.run_date).is_empty());

    // Metadata sheets stay where they are
    assert!(storage.path("METADATA/report.csv").exists());
}

#[tokio::test]
async fn test_hash_mismatch_routes_to_error_without_upload() {
    let storage = TestStorage::new();
    write_artifact(storage.root(), "report.pdf", REPORT_BYTES);
    write_sheet(
        storage.root(),
        "report",
        &report_sheet("00000000000000000000000000000000"),
    );
    let repository = Arc::new(InMemoryRepository::new());

    let summary = orchestrator(&storage, &repository).run().await.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.errors_by_kind.get(&ErrorKind::HashMismatch), Some(&1));
    assert!(repository.calls().is_empty());
    assert!(storage.path("RESULT/ERROR/report.pdf").exists());
    assert!(!storage.path("PDF/report.pdf").exists());

    let log = read_log(storage.root(), "ERROR", &summary.run_date);
    assert!(log.contains("]: report.pdf\n"));
    assert!(log.contains("\tkind: HASH_MISMATCH\n"));
    assert!(log.contains("Hash mismatch"));
}

#[tokio::test]
async fn test_orphan_artifact_routes_to_error_with_no_repository_calls() {
    let storage = TestStorage::new();
    write_artifact(storage.root(), "orphan.pdf", b"%PDF orphan");
    let repository = Arc::new(InMemoryRepository::new());

    let summary = orchestrator(&storage, &repository).run().await.unwrap();

    let report = summary.report_for("orphan.pdf").unwrap();
    assert_eq!(report.error_kind, Some(ErrorKind::NoMatch));
    assert!(repository.calls().is_empty());
    assert!(storage.path("RESULT/ERROR/orphan.pdf").exists());
    assert!(!storage.path("RESULT/SUCCESS/orphan.pdf").exists());

    let log = read_log(storage.root(), "ERROR", &summary.run_date);
    assert!(log.contains("]: orphan.pdf\n\tkind: NO_MATCH\n"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_non_utf8_artifact_name_is_routed_to_error() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let storage = TestStorage::new();
    let name = OsStr::from_bytes(b"scan\xff.pdf");
    std::fs::write(storage.path("PDF").join(name), b"%PDF scanned").unwrap();
    let repository = Arc::new(InMemoryRepository::new());

    let summary = orchestrator(&storage, &repository).run().await.unwrap();

    assert_eq!(summary.total_artifacts, 1);
    let report = summary.report_for("scan\u{FFFD}.pdf").unwrap();
    assert_eq!(report.error_kind, Some(ErrorKind::NoMatch));
    assert!(report.relocated);
    assert!(repository.calls().is_empty());
    assert_eq!(std::fs::read_dir(storage.path("PDF")).unwrap().count(), 0);
    assert!(storage.path("RESULT/ERROR").join(name).exists());

    let log = read_log(storage.root(), "ERROR", &summary.run_date);
    assert!(log.contains("]: scan\u{FFFD}.pdf\n\tkind: NO_MATCH\n"));
}

#[tokio::test]
async fn test_second_run_reuses_existing_hierarchy() {
    let storage = TestStorage::new();
    let repository = Arc::new(InMemoryRepository::new());
    let sheet = report_sheet(&md5_hex(REPORT_BYTES));

    write_artifact(storage.root(), "report.pdf", REPORT_BYTES);
    write_sheet(storage.root(), "report", &sheet);
    orchestrator(&storage, &repository).run().await.unwrap();
    let first_leaf = repository.folder_id_at("Finance/2024/Q1").unwrap();
    assert_eq!(repository.create_count(), 3);

    // Same document dropped in again
    write_artifact(storage.root(), "report.pdf", REPORT_BYTES);
    let summary = orchestrator(&storage, &repository).run().await.unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(repository.create_count(), 3);
    assert_eq!(repository.folders().len(), 3);

    let contents = repository.contents();
    assert_eq!(contents.len(), 2);
    assert!(contents.iter().all(|c| c.parent == first_leaf));
    // Collision is auto-renamed by the repository, never overwritten
    assert_eq!(contents[1].name, "report-1.pdf");
    assert_eq!(
        summary.report_for("report.pdf").unwrap().remote_path.as_deref(),
        Some("/Company Home/Scans/Finance/2024/Q1/report-1.pdf")
    );

    // Both runs appended to the same day's log
    let log = read_log(storage.root(), "SUCCESS", &summary.run_date);
    assert_eq!(log.matches("]: report.pdf\n").count(), 2);
}

#[tokio::test]
async fn test_mixed_run_processes_in_name_order_and_partitions_inputs() {
    let storage = TestStorage::new();
    let good = b"%PDF good";
    write_artifact(storage.root(), "b_good.pdf", good);
    write_sheet(
        storage.root(),
        "b_good",
        &format!("Department,MD5 Code\nHR,{}\n", md5_hex(good)),
    );
    write_artifact(storage.root(), "a_orphan.pdf", b"%PDF orphan");
    write_artifact(storage.root(), "c_bad.pdf", b"%PDF bad");
    write_sheet(storage.root(), "c_bad", "Department,MD5 Code\nHR,wrong\n");
    let repository = Arc::new(InMemoryRepository::new());

    let summary = orchestrator(&storage, &repository).run().await.unwrap();

    let order: Vec<&str> = summary.artifacts.iter().map(|r| r.artifact.as_str()).collect();
    assert_eq!(order, vec!["a_orphan.pdf", "b_good.pdf", "c_bad.pdf"]);
    assert_eq!(summary.total_artifacts, 3);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.relocation_failures, 0);

    // Nothing left behind in the input area
    assert_eq!(std::fs::read_dir(storage.path("PDF")).unwrap().count(), 0);
    assert!(storage.path("RESULT/SUCCESS/b_good.pdf").exists());
    assert!(storage.path("RESULT/ERROR/a_orphan.pdf").exists());
    assert!(storage.path("RESULT/ERROR/c_bad.pdf").exists());
}

#[tokio::test]
async fn test_listing_failure_is_resolution_error() {
    let storage = TestStorage::new();
    write_artifact(storage.root(), "report.pdf", REPORT_BYTES);
    write_sheet(storage.root(), "report", &report_sheet(&md5_hex(REPORT_BYTES)));
    let repository = Arc::new(InMemoryRepository::failing_listing());

    let summary = orchestrator(&storage, &repository).run().await.unwrap();

    let report = summary.report_for("report.pdf").unwrap();
    assert_eq!(report.error_kind, Some(ErrorKind::Resolution));
    assert!(report.reason.contains("Finance"));
    assert_eq!(repository.upload_count(), 0);
    assert!(storage.path("RESULT/ERROR/report.pdf").exists());
}

#[tokio::test]
async fn test_upload_failure_routes_to_error_without_tagging() {
    let storage = TestStorage::new();
    write_artifact(storage.root(), "report.pdf", REPORT_BYTES);
    write_sheet(storage.root(), "report", &report_sheet(&md5_hex(REPORT_BYTES)));
    let repository = Arc::new(InMemoryRepository::failing_uploads());

    let summary = orchestrator(&storage, &repository).run().await.unwrap();

    assert_eq!(
        summary.report_for("report.pdf").unwrap().error_kind,
        Some(ErrorKind::Upload)
    );
    assert!(!repository
        .calls()
        .iter()
        .any(|c| matches!(c, RepositoryCall::GetMetadata { .. })));
    assert!(storage.path("RESULT/ERROR/report.pdf").exists());
}

#[tokio::test]
async fn test_tag_failure_keeps_upload_and_routes_to_error() {
    let storage = TestStorage::new();
    write_artifact(storage.root(), "report.pdf", REPORT_BYTES);
    write_sheet(storage.root(), "report", &report_sheet(&md5_hex(REPORT_BYTES)));
    let repository = Arc::new(InMemoryRepository::failing_tagging());

    let summary = orchestrator(&storage, &repository).run().await.unwrap();

    assert_eq!(
        summary.report_for("report.pdf").unwrap().error_kind,
        Some(ErrorKind::Tag)
    );
    // Uploaded but untagged; no rollback
    assert_eq!(repository.contents().len(), 1);
    assert!(!repository.contents()[0]
        .aspect_names
        .contains(&"sdi:scannedDocument".to_string()));
    assert!(storage.path("RESULT/ERROR/report.pdf").exists());
}

#[tokio::test]
async fn test_value_yielding_empty_segment_is_configuration_error() {
    let storage = TestStorage::new();
    write_artifact(storage.root(), "report.pdf", REPORT_BYTES);
    write_sheet(
        storage.root(),
        "report",
        &format!("Department,MD5 Code\n...,{}\n", md5_hex(REPORT_BYTES)),
    );
    let repository = Arc::new(InMemoryRepository::new());

    let summary = orchestrator(&storage, &repository).run().await.unwrap();

    assert_eq!(
        summary.report_for("report.pdf").unwrap().error_kind,
        Some(ErrorKind::Configuration)
    );
    assert!(repository.calls().is_empty());
}

#[tokio::test]
async fn test_segments_are_sanitized_before_resolution() {
    let storage = TestStorage::new();
    write_artifact(storage.root(), "memo.pdf", REPORT_BYTES);
    write_sheet(
        storage.root(),
        "memo",
        &format!("Department,Team,MD5 Code\nR/D,Labs.,{}\n", md5_hex(REPORT_BYTES)),
    );
    let repository = Arc::new(InMemoryRepository::new());

    let summary = orchestrator(&storage, &repository).run().await.unwrap();

    assert_eq!(summary.succeeded, 1);
    assert!(repository.folder_id_at("R-D/Labs").is_some());
}

#[tokio::test]
async fn test_dry_run_scan_pairs_without_side_effects() {
    let storage = TestStorage::new();
    write_artifact(storage.root(), "report.pdf", REPORT_BYTES);
    write_artifact(storage.root(), "orphan.pdf", b"%PDF orphan");
    write_sheet(storage.root(), "report", &report_sheet("abc"));
    let repository = Arc::new(InMemoryRepository::new());

    let preview = orchestrator(&storage, &repository).dry_run_scan().unwrap();

    assert_eq!(
        preview,
        vec![
            PairingPreview {
                artifact: "orphan.pdf".to_string(),
                metadata_sheet: None,
            },
            PairingPreview {
                artifact: "report.pdf".to_string(),
                metadata_sheet: Some("report.csv".to_string()),
            },
        ]
    );
    assert!(repository.calls().is_empty());
    assert!(storage.path("PDF/report.pdf").exists());
    assert!(!storage.path("RESULT").exists());
    assert!(!storage.path("logs").exists());
}

#[tokio::test]
async fn test_empty_input_area_yields_empty_summary() {
    let storage = TestStorage::new();
    let repository = Arc::new(InMemoryRepository::new());

    let summary = orchestrator(&storage, &repository).run().await.unwrap();

    assert_eq!(summary.total_artifacts, 0);
    assert!(summary.artifacts.is_empty());
    // Output areas are prepared even when there is nothing to route
    assert!(storage.path("RESULT/SUCCESS").is_dir());
    assert!(storage.path("logs/ERROR").is_dir());
}
