use crate::error::{RattanError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "rattan.toml";

/// Build configuration. Constructed once before a build and never mutated
/// afterwards; every directory is resolved relative to the project root
/// unless given as an absolute path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub data_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub base_url: String,
    pub site_title: String,
    pub date_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("content"),
            output_dir: PathBuf::from("dist"),
            templates_dir: PathBuf::from("templates"),
            data_dir: PathBuf::from("data"),
            assets_dir: PathBuf::from("assets"),
            base_url: String::new(),
            site_title: "My Static Site".to_string(),
            date_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Config =
            toml::from_str(&content).map_err(|error| RattanError::TomlParse {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?;

        config.base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(config)
    }

    /// Load `rattan.toml` from the project directory, falling back to the
    /// defaults when no config file exists.
    pub fn load_or_default(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Anchor every relative directory onto `root`. Absolute paths are kept
    /// as given.
    pub fn rooted(mut self, root: &Path) -> Self {
        for dir in [
            &mut self.source_dir,
            &mut self.output_dir,
            &mut self.templates_dir,
            &mut self.data_dir,
            &mut self.assets_dir,
        ] {
            if dir.is_relative() {
                *dir = root.join(dir.as_path());
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.source_dir, PathBuf::from("content"));
        assert_eq!(config.output_dir, PathBuf::from("dist"));
        assert_eq!(config.templates_dir, PathBuf::from("templates"));
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.assets_dir, PathBuf::from("assets"));
        assert_eq!(config.base_url, "");
        assert_eq!(config.site_title, "My Static Site");
    }

    #[test]
    fn test_load_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"
site_title = "Field Notes"
base_url = "https://example.com"
output_dir = "public"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.site_title, "Field Notes");
        assert_eq!(config.base_url, "https://example.com");
        assert_eq!(config.output_dir, PathBuf::from("public"));
        assert_eq!(config.source_dir, PathBuf::from("content"));
    }

    #[test]
    fn test_load_trims_base_url_trailing_slash() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "base_url = \"https://example.com/\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.base_url, "https://example.com");
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(config.site_title, "My Static Site");
    }

    #[test]
    fn test_load_malformed_config_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "site_title = [unclosed\n").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result, Err(RattanError::TomlParse { .. })));
    }

    #[test]
    fn test_rooted_joins_relative_paths() {
        let config = Config::default().rooted(Path::new("/srv/site"));
        assert_eq!(config.source_dir, PathBuf::from("/srv/site/content"));
        assert_eq!(config.output_dir, PathBuf::from("/srv/site/dist"));
    }

    #[test]
    fn test_rooted_keeps_absolute_paths() {
        let config = Config {
            output_dir: PathBuf::from("/var/www/html"),
            ..Config::default()
        };
        let config = config.rooted(Path::new("/srv/site"));
        assert_eq!(config.output_dir, PathBuf::from("/var/www/html"));
        assert_eq!(config.source_dir, PathBuf::from("/srv/site/content"));
    }
}
