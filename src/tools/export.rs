//! Snapshot export to timestamped JSON or CSV files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::config;
use crate::core::types::ExportFormat;

/// Write `records` to the export directory as
/// `douyin_{data_type}_{timestamp}.{ext}` and return the path.
pub fn export_records<T: Serialize>(
    records: &[T],
    data_type: &str,
    format: ExportFormat,
) -> Result<PathBuf> {
    anyhow::ensure!(!records.is_empty(), "no {} data to export", data_type);

    let dir = config::export_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create export dir {}", dir.display()))?;

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let path = match format {
        ExportFormat::Json => dir.join(format!("douyin_{}_{}.json", data_type, timestamp)),
        ExportFormat::Csv => dir.join(format!("douyin_{}_{}.csv", data_type, timestamp)),
    };

    match format {
        ExportFormat::Json => {
            let body = serde_json::to_string_pretty(records)?;
            std::fs::write(&path, body)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_path(&path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
    }

    Ok(path)
}
