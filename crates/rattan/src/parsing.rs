use crate::error::{RattanError, Result};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

/// Metadata declared at the top of a document. Keys are arbitrary; typed
/// accessors are provided for the ones the pipeline cares about.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frontmatter {
    #[serde(flatten)]
    pub raw: HashMap<String, Value>,
}

impl Frontmatter {
    pub fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.raw
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.raw
            .get(key)
            .and_then(|value| value.as_str().map(String::from))
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// Split a document into its frontmatter block and body. A leading `---`
/// line opens a YAML block, a leading `+++` line opens a TOML block; a
/// document without either is all body.
pub fn extract_frontmatter(content: &str, path: &Path) -> Result<(Frontmatter, String)> {
    let content = content.replace("\r\n", "\n");
    let content = content.trim_start();

    if content.starts_with("+++") {
        parse_toml_frontmatter(content, path)
    } else if content.starts_with("---") {
        parse_yaml_frontmatter(content, path)
    } else {
        Ok((Frontmatter::default(), content.to_string()))
    }
}

fn parse_toml_frontmatter(content: &str, path: &Path) -> Result<(Frontmatter, String)> {
    let rest = &content[3..];

    let end_index =
        find_closing_delimiter(rest, "+++").ok_or_else(|| RattanError::InvalidFrontmatter {
            path: path.to_path_buf(),
        })?;

    let frontmatter_str = &rest[..end_index];
    let body = &rest[end_index + 3..];

    let raw: HashMap<String, Value> =
        toml::from_str(frontmatter_str).map_err(|error| RattanError::TomlParse {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;

    Ok((Frontmatter { raw }, body.trim().to_string()))
}

fn parse_yaml_frontmatter(content: &str, path: &Path) -> Result<(Frontmatter, String)> {
    let rest = &content[3..];

    let end_index =
        find_closing_delimiter(rest, "---").ok_or_else(|| RattanError::InvalidFrontmatter {
            path: path.to_path_buf(),
        })?;

    let frontmatter_str = &rest[..end_index];
    let body = &rest[end_index + 3..];

    let raw: HashMap<String, Value> =
        serde_yml::from_str(frontmatter_str).map_err(|error| RattanError::YamlParse {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;

    Ok((Frontmatter { raw }, body.trim().to_string()))
}

fn find_closing_delimiter(content: &str, delimiter: &str) -> Option<usize> {
    let mut position = 0;

    for line in content.lines() {
        if line.trim() == delimiter {
            return Some(position);
        }
        position += line.len() + 1;
    }

    None
}

/// Markdown-to-HTML conversion with syntax-highlighted fenced code blocks.
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    pub fn render(&self, content: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        let parser = Parser::new_ext(content, options);
        let theme = &self.theme_set.themes["base16-ocean.dark"];

        let mut html_output = String::new();
        let mut in_code_block = false;
        let mut code_lang: Option<String> = None;
        let mut code_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_content.clear();
                    code_lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                        _ => None,
                    };
                }
                Event::End(TagEnd::CodeBlock) => {
                    html_output.push_str(&self.highlight_block(
                        &code_content,
                        code_lang.as_deref(),
                        theme,
                    ));
                    in_code_block = false;
                    code_lang = None;
                }
                Event::Text(text) if in_code_block => {
                    code_content.push_str(&text);
                }
                other => {
                    pulldown_cmark::html::push_html(&mut html_output, std::iter::once(other));
                }
            }
        }

        html_output
    }

    fn highlight_block(&self, code: &str, lang: Option<&str>, theme: &Theme) -> String {
        let Some(lang) = lang else {
            return format!("<pre><code>{}</code></pre>", escape_html(code));
        };

        match self.syntax_set.find_syntax_by_token(lang) {
            Some(syntax) => highlighted_html_for_string(code, &self.syntax_set, syntax, theme)
                .unwrap_or_else(|_| escape_html(code)),
            None => format!(
                "<pre><code class=\"language-{}\">{}</code></pre>",
                lang,
                escape_html(code)
            ),
        }
    }
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
