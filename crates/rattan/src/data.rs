use crate::config::Config;
use crate::error::{RattanError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Load every YAML file under `data_dir` into one mapping, keyed by file
/// stem. A missing data directory is not an error. Keys are not sorted or
/// deduplicated: a later file with a colliding stem overwrites an earlier
/// one in filesystem enumeration order.
pub fn load_global_data(config: &Config) -> Result<HashMap<String, Value>> {
    let data_dir = &config.data_dir;
    let mut data = HashMap::new();

    if !data_dir.exists() {
        return Ok(data);
    }

    for entry in WalkDir::new(data_dir).min_depth(1) {
        let entry = entry.map_err(|error| RattanError::WalkDir {
            path: data_dir.clone(),
            message: error.to_string(),
        })?;

        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        if !matches!(extension, "yml" | "yaml") {
            continue;
        }

        let content = fs::read_to_string(path)?;
        let value: Value =
            serde_yml::from_str(&content).map_err(|error| RattanError::YamlParse {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?;

        let key = data_key(path)?;
        data.insert(key, value);
    }

    Ok(data)
}

fn data_key(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .ok_or_else(|| RattanError::InvalidPath {
            path: path.to_path_buf(),
        })
}
