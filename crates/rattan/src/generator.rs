use crate::config::Config;
use crate::data::load_global_data;
use crate::error::{RattanError, Result};
use crate::parsing::MarkdownRenderer;
use crate::pipeline::{ContentPipeline, ProcessedPage};
use crate::templates::TemplateEngine;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use walkdir::WalkDir;

/// What a finished build produced, in processing order.
#[derive(Debug)]
pub struct BuildSummary {
    pub pages: Vec<ProcessedPage>,
}

/// Owns the immutable build context (config, global data, renderers) and
/// runs the build sequence: clean output, mirror assets, process content.
pub struct Generator {
    config: Config,
    global_data: HashMap<String, Value>,
    markdown: MarkdownRenderer,
    templates: TemplateEngine,
}

impl Generator {
    pub fn new(config: Config) -> Result<Self> {
        let global_data = load_global_data(&config)?;
        let templates = TemplateEngine::new(&config.templates_dir, &config.base_url)?;

        Ok(Self {
            config,
            global_data,
            markdown: MarkdownRenderer::new(),
            templates,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a full build. Fail-fast: the first error aborts the remaining
    /// steps and may leave the output directory incomplete.
    pub fn build(&self) -> Result<BuildSummary> {
        self.clean_output_dir()?;
        self.mirror_assets()?;
        let pages = self.process_content()?;

        println!(
            "Successfully generated site at: {}",
            self.config.output_dir.display()
        );

        Ok(BuildSummary { pages })
    }

    /// Destructive: removes the output directory and everything under it,
    /// then recreates it empty.
    fn clean_output_dir(&self) -> Result<()> {
        if self.config.output_dir.exists() {
            fs::remove_dir_all(&self.config.output_dir)?;
        }
        fs::create_dir_all(&self.config.output_dir)?;
        Ok(())
    }

    /// Copy the assets tree verbatim under `output_dir/assets`. A missing
    /// assets directory is a no-op, not an error.
    fn mirror_assets(&self) -> Result<()> {
        let assets_dir = &self.config.assets_dir;
        if !assets_dir.exists() {
            return Ok(());
        }

        let dest_root = self.config.output_dir.join("assets");

        for entry in WalkDir::new(assets_dir).min_depth(1) {
            let entry = entry.map_err(|error| RattanError::WalkDir {
                path: assets_dir.clone(),
                message: error.to_string(),
            })?;

            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            let relative = path
                .strip_prefix(assets_dir)
                .map_err(|_| RattanError::InvalidPath {
                    path: path.to_path_buf(),
                })?;

            let dest = dest_root.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
        }

        Ok(())
    }

    fn process_content(&self) -> Result<Vec<ProcessedPage>> {
        let source_dir = &self.config.source_dir;

        if !source_dir.exists() {
            return Err(RattanError::SourceMissing {
                path: source_dir.clone(),
            });
        }

        let pipeline = ContentPipeline::new(
            &self.config,
            &self.global_data,
            &self.markdown,
            &self.templates,
        );

        let mut pages = Vec::new();

        for entry in WalkDir::new(source_dir).min_depth(1) {
            let entry = entry.map_err(|error| RattanError::WalkDir {
                path: source_dir.clone(),
                message: error.to_string(),
            })?;

            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            if path
                .extension()
                .map(|extension| extension != "md")
                .unwrap_or(true)
            {
                continue;
            }

            let relative = path
                .strip_prefix(source_dir)
                .map_err(|_| RattanError::InvalidPath {
                    path: path.to_path_buf(),
                })?;

            let page = pipeline.process(path, relative)?;
            println!(
                "Processed: {} -> {}",
                relative.display(),
                page.output.display()
            );
            pages.push(page);
        }

        Ok(pages)
    }
}
