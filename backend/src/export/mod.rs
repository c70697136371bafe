//! Export sink: file names and saving encoded CSV to disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::api::logs::log_success;
use crate::models::RecordShape;
use crate::transform::pipeline::ExportResult;

/// `<address>_<shape>.csv`
pub fn export_filename(address: &str, shape: RecordShape) -> String {
    format!("{}_{}.csv", sanitize(address), shape)
}

/// `Content-Disposition` value for a download of `filename`
pub fn content_disposition(filename: &str) -> String {
    format!("attachment; filename=\"{}\"", filename.replace('"', ""))
}

/// Write an export into `dir`, creating the directory if needed
pub fn write_export(dir: impl AsRef<Path>, export: &ExportResult) -> io::Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let path = dir.join(&export.filename);
    fs::write(&path, &export.csv)?;

    log_success(format!("Saved {} rows to {}", export.record_count, path.display()));
    Ok(path)
}

// Keep the name usable as a single path component
fn sanitize(address: &str) -> String {
    address
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::pipeline::{build_export, ExportOptions};
    use serde_json::json;

    #[test]
    fn test_export_filename() {
        assert_eq!(
            export_filename("0xB07319d9ffc3f5eeF5d2e1bE6DDA1AA8d8C5BC70", RecordShape::Transactions),
            "0xB07319d9ffc3f5eeF5d2e1bE6DDA1AA8d8C5BC70_transactions.csv"
        );
        assert_eq!(export_filename("0xabc", RecordShape::Attestations), "0xabc_attestations.csv");
    }

    #[test]
    fn test_export_filename_strips_separators() {
        assert_eq!(export_filename("../etc/passwd", RecordShape::Transactions), ".._etc_passwd_transactions.csv");
    }

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition("0xabc_transactions.csv"),
            "attachment; filename=\"0xabc_transactions.csv\""
        );
    }

    #[test]
    fn test_write_export() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![json!({"recipient": "0xAB", "txid": "0xCD"})];
        let export = build_export("0xme", RecordShape::Attestations, &records, &ExportOptions::default()).unwrap();

        let path = write_export(dir.path().join("out"), &export).unwrap();

        assert_eq!(path.file_name().unwrap(), "0xme_attestations.csv");
        assert_eq!(fs::read_to_string(&path).unwrap(), "Recipient,Transaction ID\n0xAB,0xCD");
    }
}
