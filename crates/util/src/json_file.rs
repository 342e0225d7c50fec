//! Reading [serde] types from JSON files.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use serde::de::DeserializeOwned;

use thiserror::Error;

/// Read and deserialize a JSON file.
pub fn read_json_file<T, P>(path: P) -> Result<T, JsonFileError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    crate::debug_log_info!("Reading JSON file `{}`.", path.display());

    let file = File::open(path)?;
    serde_json::from_reader(BufReader::new(file))
        .inspect_err(|e| crate::debug_log_warning!("Failed to deserialize JSON file: {e}"))
        .map_err(Into::into)
}

/// An error from reading a JSON file.
#[derive(Error, Debug)]
pub enum JsonFileError {
    #[error("JSON file IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn files_are_deserialized() {
        let path = std::env::temp_dir().join(format!("util-json-file-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "filter": "bilinear" }"#).unwrap();

        let read: BTreeMap<String, String> = read_json_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(read.len(), 1);
        assert_eq!(read["filter"], "bilinear");
    }

    #[test]
    fn malformed_files_are_json_errors() {
        let path =
            std::env::temp_dir().join(format!("util-json-file-bad-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();

        let result: Result<BTreeMap<String, String>, _> = read_json_file(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(JsonFileError::Json(_))));
    }

    #[test]
    fn missing_files_are_io_errors() {
        let path = std::env::temp_dir().join("util-json-file-does-not-exist.json");
        let result: Result<BTreeMap<String, String>, _> = read_json_file(path);
        assert!(matches!(result, Err(JsonFileError::Io(_))));
    }
}
