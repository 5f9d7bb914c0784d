use crate::config::Config;
use crate::error::Result;
use crate::parsing::{Frontmatter, MarkdownRenderer, extract_frontmatter};
use crate::paths;
use crate::templates::{DEFAULT_TEMPLATE, TemplateEngine};
use chrono::Local;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tera::Context;

/// Per-document fields passed to the template as `page`. The typed fields
/// carry computed defaults; frontmatter keys override them (string values
/// only), and every other frontmatter key is exposed alongside via the
/// flattened extras map.
#[derive(Debug, Clone, Serialize)]
pub struct PageData {
    pub title: String,
    pub content: String,
    pub url: String,
    pub date: String,
    pub template: String,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl PageData {
    pub fn from_document(
        config: &Config,
        relative: &Path,
        html: &str,
        frontmatter: Frontmatter,
    ) -> Self {
        let mut page = Self {
            title: paths::page_title(relative),
            content: html.to_string(),
            url: paths::page_url(relative),
            date: Local::now().format(&config.date_format).to_string(),
            template: DEFAULT_TEMPLATE.to_string(),
            extra: HashMap::new(),
        };
        page.apply_frontmatter(frontmatter);
        page
    }

    fn apply_frontmatter(&mut self, frontmatter: Frontmatter) {
        for (key, value) in frontmatter.raw {
            if let Some(text) = value.as_str() {
                let field = match key.as_str() {
                    "title" => Some(&mut self.title),
                    "content" => Some(&mut self.content),
                    "url" => Some(&mut self.url),
                    "date" => Some(&mut self.date),
                    "template" => Some(&mut self.template),
                    _ => None,
                };
                if let Some(field) = field {
                    *field = text.to_string();
                    continue;
                }
            }
            self.extra.insert(key, value);
        }
    }
}

/// One processed document: its source-relative path, where the rendered
/// output landed, and the page's site-relative URL.
#[derive(Debug, Clone)]
pub struct ProcessedPage {
    pub source: PathBuf,
    pub output: PathBuf,
    pub url: String,
}

/// Runs one document through extract -> merge -> render -> write.
pub struct ContentPipeline<'a> {
    config: &'a Config,
    global_data: &'a HashMap<String, Value>,
    markdown: &'a MarkdownRenderer,
    templates: &'a TemplateEngine,
}

impl<'a> ContentPipeline<'a> {
    pub fn new(
        config: &'a Config,
        global_data: &'a HashMap<String, Value>,
        markdown: &'a MarkdownRenderer,
        templates: &'a TemplateEngine,
    ) -> Self {
        Self {
            config,
            global_data,
            markdown,
            templates,
        }
    }

    pub fn process(&self, source: &Path, relative: &Path) -> Result<ProcessedPage> {
        let raw = fs::read_to_string(source)?;
        let (frontmatter, body) = extract_frontmatter(&raw, source)?;
        let html = self.markdown.render(&body);

        let page = PageData::from_document(self.config, relative, &html, frontmatter);
        let context = self.template_context(&page)?;
        let rendered = self.templates.render(&page.template, &context)?;

        let output = paths::output_path(&self.config.output_dir, relative);
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output, rendered)?;

        Ok(ProcessedPage {
            source: relative.to_path_buf(),
            output,
            url: page.url,
        })
    }

    /// Template scope: config fields, then data files (colliding keys win),
    /// then `page` and the top-level `content` alias.
    fn template_context(&self, page: &PageData) -> Result<Context> {
        let mut context = Context::from_serialize(self.config)?;
        for (key, value) in self.global_data {
            context.insert(key, value);
        }
        context.insert("page", page);
        context.insert("content", &page.content);
        Ok(context)
    }
}
