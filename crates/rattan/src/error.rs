use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RattanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source directory not found: {path}")]
    SourceMissing { path: PathBuf },

    #[error("TOML parse error in {path}: {message}")]
    TomlParse { path: PathBuf, message: String },

    #[error("YAML parse error in {path}: {message}")]
    YamlParse { path: PathBuf, message: String },

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Invalid frontmatter in file: {path}")]
    InvalidFrontmatter { path: PathBuf },

    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    #[error("Directory walk error in {path}: {message}")]
    WalkDir { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, RattanError>;
