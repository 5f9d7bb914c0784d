use colored::Colorize;
use rattan_ssg::{BuildSummary, CONFIG_FILE, Config, Generator};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Instant;
use tower_http::services::ServeDir;

type CommandResult<T> = Result<T, Box<dyn std::error::Error>>;

fn escape_toml_string(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for character in input.chars() {
        match character {
            '\\' => output.push_str("\\\\"),
            '"' => output.push_str("\\\""),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            '\u{0008}' => output.push_str("\\b"),
            '\u{000C}' => output.push_str("\\f"),
            control if control < '\u{0020}' => {
                output.push_str(&format!("\\u{:04X}", control as u32));
            }
            other => output.push(other),
        }
    }
    output
}

pub fn new_site(name: &str) -> CommandResult<()> {
    let site_dir = Path::new(name);

    if site_dir.exists() {
        return Err(format!("Directory '{}' already exists", name).into());
    }

    scaffold_site(site_dir, name)?;

    println!("Created new site: {name}");
    println!("  cd {name}");
    println!("  rattan serve");

    Ok(())
}

fn scaffold_site(site_dir: &Path, title: &str) -> CommandResult<()> {
    fs::create_dir_all(site_dir.join("content"))?;
    fs::create_dir_all(site_dir.join("templates"))?;
    fs::create_dir_all(site_dir.join("data"))?;
    fs::create_dir_all(site_dir.join("assets").join("css"))?;

    let escaped_title = escape_toml_string(title);
    let config = format!(
        r#"site_title = "{escaped_title}"
base_url = ""
"#
    );
    fs::write(site_dir.join(CONFIG_FILE), config)?;

    let index_content = r#"---
title: Home
---

Welcome to your new site. Edit `content/index.md` to change this page,
or add more Markdown files next to it.
"#;
    fs::write(site_dir.join("content").join("index.md"), index_content)?;

    let page_template = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{ page.title }} - {{ site_title }}</title>
  <link rel="stylesheet" href="{{ asset(path='css/style.css') }}">
</head>
<body>
  <main>
    {{ content | safe }}
  </main>
</body>
</html>
"#;
    fs::write(site_dir.join("templates").join("page.html"), page_template)?;

    let stylesheet = r#"body {
  max-width: 40rem;
  margin: 0 auto;
  font-family: sans-serif;
}
"#;
    fs::write(
        site_dir.join("assets").join("css").join("style.css"),
        stylesheet,
    )?;

    Ok(())
}

fn load_config(input: Option<&Path>) -> CommandResult<Config> {
    let root = input.unwrap_or(Path::new("."));
    Ok(Config::load_or_default(root)?.rooted(root))
}

pub fn build_site(
    input: Option<&Path>,
    output: Option<&Path>,
    base_url: Option<&str>,
) -> CommandResult<BuildSummary> {
    let mut config = load_config(input)?;

    if let Some(output) = output {
        config.output_dir = output.to_path_buf();
    }
    if let Some(url) = base_url {
        config.base_url = url.trim_end_matches('/').to_string();
    }

    println!("Building site...");
    let start = Instant::now();

    let summary = Generator::new(config)?.build()?;

    println!(
        "{} {} pages in {:.2?}",
        "Built".green().bold(),
        summary.pages.len(),
        start.elapsed()
    );

    Ok(summary)
}

pub async fn serve_site(input: Option<&Path>, port: u16) -> CommandResult<()> {
    let config = load_config(input)?;

    // The server only reads an already-built tree; it builds once when
    // nothing has been built yet and never rebuilds after that.
    if !config.output_dir.exists() {
        build_site(input, None, None)?;
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!(
        "Serving {} at http://{addr}",
        config.output_dir.display()
    );
    println!("Press Ctrl+C to stop");

    let serve_dir = ServeDir::new(&config.output_dir).append_index_html_on_directories(true);
    let app = axum::Router::new().fallback_service(serve_dir);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_escape_toml_string_plain() {
        assert_eq!(escape_toml_string("hello world"), "hello world");
    }

    #[test]
    fn test_escape_toml_string_backslash() {
        assert_eq!(escape_toml_string("path\\to\\file"), "path\\\\to\\\\file");
    }

    #[test]
    fn test_escape_toml_string_quotes() {
        assert_eq!(escape_toml_string("say \"hello\""), "say \\\"hello\\\"");
    }

    #[test]
    fn test_escape_toml_string_newline() {
        assert_eq!(escape_toml_string("line1\nline2"), "line1\\nline2");
    }

    #[test]
    fn test_escape_toml_string_control_char() {
        assert_eq!(escape_toml_string("null\u{0000}byte"), "null\\u0000byte");
    }

    #[test]
    fn test_scaffolded_site_builds() {
        let dir = TempDir::new().unwrap();
        let site_dir = dir.path().join("demo");

        scaffold_site(&site_dir, "Demo").unwrap();

        let config = Config::load_or_default(&site_dir)
            .unwrap()
            .rooted(&site_dir);
        assert_eq!(config.site_title, "Demo");

        let summary = Generator::new(config).unwrap().build().unwrap();
        assert_eq!(summary.pages.len(), 1);

        let output = fs::read_to_string(site_dir.join("dist/index.html")).unwrap();
        assert!(output.contains("Home - Demo"));
        assert!(output.contains("/assets/css/style.css"));
        assert!(site_dir.join("dist/assets/css/style.css").exists());
    }
}
