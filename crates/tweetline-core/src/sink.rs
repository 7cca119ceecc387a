//! Parquet persistence for result tables

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use arrow::array::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;

/// Write one result table as `<dir>/<name>.parquet`, zstd-compressed.
///
/// Writes to a `.tmp` sibling and renames into place so a killed run never
/// leaves a truncated file under the final name.
pub fn write_table(
    dir: &Path,
    name: &str,
    batch: &RecordBatch,
    zstd_level: i32,
) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let final_path = dir.join(format!("{name}.parquet"));
    let tmp_path = dir.join(format!("{name}.parquet.tmp"));

    // Clean up stale tmp file
    if tmp_path.exists() {
        fs::remove_file(&tmp_path)?;
    }

    let file = File::create(&tmp_path)?;
    let level = ZstdLevel::try_new(zstd_level)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(level))
        .build();

    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), Some(props)).map_err(io::Error::other)?;
    writer.write(batch).map_err(io::Error::other)?;
    writer.close().map_err(io::Error::other)?;
    fs::rename(&tmp_path, &final_path)?;

    Ok(final_path)
}
