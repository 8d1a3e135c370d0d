//! Export orchestrator: validate, build, serialize, then store or stream.

use std::path::PathBuf;

use sheetkit_io_fs::{ArtifactStore, ReportCleanup};

use crate::builder::build_document;
use crate::conf::{C_CONTENT_TYPE_OCTET_STREAM, C_EXTENSION_XLSX};
use crate::error::ExcelExportError;
use crate::layout::LayoutConfig;
use crate::record::FieldAccess;
use crate::spec::{SpecCellFormat, SpecExportOptions, SpecXlsxPayload};
use crate::writer::render_xlsx_bytes;

/// Owns the header style and the temporary artifact store.
///
/// Building is synchronous per call and keeps no shared mutable state, so one
/// exporter can serve concurrent callers. Call [`Self::shutdown`] to wait for
/// deferred artifact deletions.
pub struct ExcelExporter {
    fmt_header: SpecCellFormat,
    store: ArtifactStore,
}

impl ExcelExporter {
    pub fn new(options: SpecExportOptions) -> Result<Self, ExcelExportError> {
        let SpecExportOptions {
            format_header,
            artifact_store,
        } = options;

        Ok(Self {
            fmt_header: format_header,
            store: ArtifactStore::new(artifact_store)?,
        })
    }

    /// Cleanup counters of deletions finished so far.
    pub fn cleanup_report(&self) -> ReportCleanup {
        self.store.report()
    }

    /// Render `records` and write them to a new artifact.
    ///
    /// Returns the artifact name `{fileName}_{uuid}.{extension}`.
    pub fn generate_and_store<R: FieldAccess>(
        &self,
        layout: &LayoutConfig,
        records: &[R],
    ) -> Result<String, ExcelExportError> {
        let v_bytes = generate_xlsx_bytes(layout, records, &self.fmt_header)?;
        let c_name = self.store.write_artifact(&layout.file_name, &v_bytes)?;
        log::info!(
            "export stored: {c_name} ({} records, {} bytes)",
            records.len(),
            v_bytes.len()
        );
        Ok(c_name)
    }

    /// Render `records` into memory for a caller-supplied transport.
    pub fn generate_and_stream<R: FieldAccess>(
        &self,
        layout: &LayoutConfig,
        records: &[R],
    ) -> Result<SpecXlsxPayload, ExcelExportError> {
        render_xlsx_payload(layout, records, &self.fmt_header)
    }

    /// Read a stored artifact for one-time download and schedule its deletion.
    pub fn take_artifact(&self, name: &str) -> Result<SpecXlsxPayload, ExcelExportError> {
        let v_bytes = self.store.take_artifact(name)?;
        Ok(SpecXlsxPayload {
            file_name: name.to_string(),
            content_type: C_CONTENT_TYPE_OCTET_STREAM,
            bytes: v_bytes,
        })
    }

    /// Path of a stored artifact.
    pub fn artifact_path(&self, name: &str) -> Result<PathBuf, ExcelExportError> {
        Ok(self.store.path_artifact(name)?)
    }

    /// Wait for pending deletions and report them.
    pub fn shutdown(self) -> ReportCleanup {
        self.store.shutdown()
    }
}

/// Validate, build and serialize without touching storage.
///
/// The suggested file name is `{fileName}.xlsx`.
pub fn render_xlsx_payload<R: FieldAccess>(
    layout: &LayoutConfig,
    records: &[R],
    fmt_header: &SpecCellFormat,
) -> Result<SpecXlsxPayload, ExcelExportError> {
    let v_bytes = generate_xlsx_bytes(layout, records, fmt_header)?;
    Ok(SpecXlsxPayload {
        file_name: format!("{}.{C_EXTENSION_XLSX}", layout.file_name),
        content_type: C_CONTENT_TYPE_OCTET_STREAM,
        bytes: v_bytes,
    })
}

fn generate_xlsx_bytes<R: FieldAccess>(
    layout: &LayoutConfig,
    records: &[R],
    fmt_header: &SpecCellFormat,
) -> Result<Vec<u8>, ExcelExportError> {
    layout.validate()?;
    let doc = build_document(layout, records, fmt_header)?;
    render_xlsx_bytes(&doc)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
    use sheetkit_io_fs::{ArtifactStoreError, SpecArtifactStoreOptions};
    use tempfile::TempDir;

    use super::*;
    use crate::layout::{HeaderCell, parse_layout_config_yaml};
    use crate::testing::{User, create_user};

    fn create_exporter(dir: &TempDir) -> ExcelExporter {
        ExcelExporter::new(SpecExportOptions {
            artifact_store: SpecArtifactStoreOptions {
                dir_root: dir.path().join("temp"),
                num_workers_max: Some(2),
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap()
    }

    fn create_layout() -> LayoutConfig {
        LayoutConfig {
            file_name: "users".to_string(),
            headers: vec![vec![HeaderCell::new("Name"), HeaderCell::new("Role")]],
            fields: vec!["name".to_string(), "role.name".to_string()],
            ..Default::default()
        }
    }

    fn create_users() -> Vec<User> {
        vec![create_user("Ann", Some("admin")), create_user("Bob", None)]
    }

    fn is_uuid_text(c_text: &str) -> bool {
        c_text.len() == 36
            && c_text
                .chars()
                .enumerate()
                .all(|(n_idx, c)| match n_idx {
                    8 | 13 | 18 | 23 => c == '-',
                    _ => c.is_ascii_hexdigit(),
                })
    }

    #[test]
    fn test_generate_and_store_then_take_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = create_exporter(&dir);

        let c_name = exporter
            .generate_and_store(&create_layout(), &create_users())
            .unwrap();
        let c_stem = c_name
            .strip_prefix("users_")
            .and_then(|c| c.strip_suffix(".xlsx"))
            .unwrap();
        assert!(is_uuid_text(c_stem), "unexpected artifact name {c_name}");

        let path_file = exporter.artifact_path(&c_name).unwrap();
        assert!(path_file.is_file());

        let payload = exporter.take_artifact(&c_name).unwrap();
        assert_eq!(payload.file_name, c_name);
        assert_eq!(payload.content_type, "application/octet-stream");
        assert!(payload.bytes.starts_with(b"PK"));

        let report = exporter.shutdown();
        assert_eq!(report.cnt_scheduled, 1);
        assert_eq!(report.cnt_deleted, 1);
        assert_eq!(report.error_count(), 0);
        assert!(!path_file.exists());
    }

    #[test]
    fn test_cleanup_report_counts_scheduled_takes() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = create_exporter(&dir);
        assert_eq!(exporter.cleanup_report().cnt_scheduled, 0);

        for _ in 0..3 {
            let c_name = exporter
                .generate_and_store(&create_layout(), &create_users())
                .unwrap();
            exporter.take_artifact(&c_name).unwrap();
        }
        assert_eq!(exporter.cleanup_report().cnt_scheduled, 3);

        let report = exporter.shutdown();
        assert_eq!(report.cnt_deleted, 3);
    }

    #[test]
    fn test_generate_and_stream_returns_readable_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = create_exporter(&dir);

        let payload = exporter
            .generate_and_stream(&create_layout(), &create_users())
            .unwrap();
        assert_eq!(payload.file_name, "users.xlsx");
        assert!(!dir.path().join("temp").exists());

        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(payload.bytes)).unwrap();
        let range = workbook.worksheet_range("Sheet0").unwrap();
        assert_eq!(range.get_value((0, 1)), Some(&Data::String("Role".to_string())));
        assert_eq!(range.get_value((1, 0)), Some(&Data::String("Ann".to_string())));
        assert_eq!(range.get_value((1, 2)), Some(&Data::String("Bob".to_string())));

        exporter.shutdown();
    }

    #[test]
    fn test_invalid_layout_fails_before_any_write() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = create_exporter(&dir);

        let layout = parse_layout_config_yaml("fileName: users\nfields: []\n").unwrap();
        let err = exporter
            .generate_and_store(&layout, &create_users())
            .unwrap_err();
        assert!(matches!(err, ExcelExportError::ConfigValidation(_)));
        assert!(!dir.path().join("temp").exists());

        exporter.shutdown();
    }

    #[test]
    fn test_take_artifact_rejects_bad_or_missing_names() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = create_exporter(&dir);

        let err = exporter.take_artifact("../escape.xlsx").unwrap_err();
        assert!(matches!(
            err,
            ExcelExportError::ArtifactIo(ArtifactStoreError::InvalidArtifactName(_))
        ));

        let err = exporter.take_artifact("users_gone.xlsx").unwrap_err();
        assert!(matches!(
            err,
            ExcelExportError::ArtifactIo(ArtifactStoreError::ReadFailed { .. })
        ));

        let report = exporter.shutdown();
        assert_eq!(report.cnt_scheduled, 1);
        assert_eq!(report.cnt_missing, 1);
    }

    #[test]
    fn test_render_xlsx_payload_without_exporter() {
        let payload = render_xlsx_payload(
            &create_layout(),
            &create_users(),
            &SpecCellFormat::default(),
        )
        .unwrap();
        assert_eq!(payload.file_name, "users.xlsx");
        assert!(payload.bytes.starts_with(b"PK"));
    }
}
