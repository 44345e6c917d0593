use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{MatrixError, Result};

/// Where and under which default names matrices are persisted.
///
/// Fields:
/// - `base_dir`       — root directory; folders are created beneath it
/// - `default_name`   — file stem used by `save_default` / `load_default`
/// - `default_folder` — folder used by `save_default` / `load_default`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub base_dir: PathBuf,
    pub default_name: String,
    pub default_folder: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            base_dir: PathBuf::from("."),
            default_name: "MatrixData".to_string(),
            default_folder: "MatrixSaveData".to_string(),
        }
    }
}

impl StoreConfig {
    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path).map_err(|e| MatrixError::io(path, e))?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a config from JSON. Missing fields take their defaults.
    pub fn load_json(path: &str) -> Result<StoreConfig> {
        let file = std::fs::File::open(path).map_err(|e| MatrixError::io(path, e))?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: StoreConfig = serde_json::from_str(r#"{ "base_dir": "/tmp/mats" }"#).unwrap();
        assert_eq!(cfg.base_dir, PathBuf::from("/tmp/mats"));
        assert_eq!(cfg.default_name, "MatrixData");
        assert_eq!(cfg.default_folder, "MatrixSaveData");
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let path = path.to_str().unwrap();
        let cfg = StoreConfig {
            base_dir: dir.path().to_path_buf(),
            default_name: "weights".into(),
            default_folder: "run1".into(),
        };
        cfg.save_json(path).unwrap();
        assert_eq!(StoreConfig::load_json(path).unwrap(), cfg);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = StoreConfig::load_json(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, MatrixError::Config(_)));
    }

    #[test]
    fn missing_file_is_an_io_failure() {
        let err = StoreConfig::load_json("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, MatrixError::IoFailure { .. }));
    }
}
