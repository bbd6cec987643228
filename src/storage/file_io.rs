//! File I/O utilities with atomic writes
//!
//! A JSON file is either fully replaced or left untouched: data goes to a
//! sibling temp file which is synced and then renamed over the target.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::SplitpotError;

/// Read JSON from a file, returning the default value if it doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, SplitpotError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| SplitpotError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| SplitpotError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write JSON to a file atomically (write to temp, sync, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), SplitpotError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            SplitpotError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = path.with_extension("json.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| SplitpotError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| SplitpotError::Storage(format!("Failed to serialize data: {}", e)))?;

    writer
        .flush()
        .map_err(|e| SplitpotError::Storage(format!("Failed to flush data: {}", e)))?;

    writer
        .get_ref()
        .sync_all()
        .map_err(|e| SplitpotError::Storage(format!("Failed to sync data: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        SplitpotError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize, Default)]
    struct Roster {
        names: Vec<String>,
    }

    #[test]
    fn test_missing_file_reads_default() {
        let temp_dir = TempDir::new().unwrap();
        let roster: Roster = read_json(temp_dir.path().join("members.json")).unwrap();
        assert_eq!(roster, Roster::default());
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("members.json");
        let roster = Roster {
            names: vec!["Ana".into(), "Bo".into()],
        };

        write_json_atomic(&path, &roster).unwrap();

        assert!(!temp_dir.path().join("data").join("members.json.tmp").exists());
        assert_eq!(read_json::<Roster, _>(&path).unwrap(), roster);
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("periods.json");
        fs::write(&path, "{ nope").unwrap();

        let err = read_json::<Roster, _>(&path).unwrap_err();
        assert!(matches!(err, SplitpotError::Storage(_)));
        assert!(err.to_string().contains("periods.json"));
    }
}
