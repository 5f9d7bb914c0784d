use crate::error::Result;
use std::collections::HashMap;
use std::path::Path;
use tera::{Context, Tera, Value};

/// Template used when a document's frontmatter does not name one.
pub const DEFAULT_TEMPLATE: &str = "page.html";

/// Thin wrapper around a `tera` instance loaded from the templates
/// directory, with the two link helpers registered in template scope.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new(templates_dir: &Path, base_url: &str) -> Result<Self> {
        let pattern = templates_dir.join("**").join("*.html");
        let mut tera = Tera::new(&pattern.to_string_lossy())?;

        tera.register_function(
            "asset",
            AssetFunction {
                base_url: base_url.to_string(),
            },
        );
        tera.register_function(
            "url",
            UrlFunction {
                base_url: base_url.to_string(),
            },
        );

        Ok(Self { tera })
    }

    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// `asset(path=...)`: base URL (trailing slash trimmed) + `/assets/` +
/// path (leading slash trimmed).
struct AssetFunction {
    base_url: String,
}

impl tera::Function for AssetFunction {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let path = string_arg(args, "path", "asset")?;
        Ok(Value::String(format!(
            "{}/assets/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

/// `url(path=...)`: base URL (trailing slash trimmed) + `/` + path
/// (leading slash trimmed).
struct UrlFunction {
    base_url: String,
}

impl tera::Function for UrlFunction {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let path = string_arg(args, "path", "url")?;
        Ok(Value::String(format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

fn string_arg<'a>(
    args: &'a HashMap<String, Value>,
    name: &str,
    function: &str,
) -> tera::Result<&'a str> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg(format!("{function}() requires a string `{name}` argument")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RattanError;
    use std::fs;
    use tempfile::TempDir;

    fn engine_with_template(template: &str, base_url: &str) -> (TempDir, TemplateEngine) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("page.html"), template).unwrap();
        let engine = TemplateEngine::new(dir.path(), base_url).unwrap();
        (dir, engine)
    }

    #[test]
    fn test_render_template() {
        let (_dir, engine) = engine_with_template("<h1>{{ title }}</h1>", "");
        let mut context = Context::new();
        context.insert("title", "Hello");

        let rendered = engine.render("page.html", &context).unwrap();
        assert_eq!(rendered, "<h1>Hello</h1>");
    }

    #[test]
    fn test_missing_template_fails() {
        let (_dir, engine) = engine_with_template("irrelevant", "");
        let result = engine.render("missing.html", &Context::new());
        assert!(matches!(result, Err(RattanError::Template(_))));
    }

    #[test]
    fn test_undefined_variable_fails() {
        let (_dir, engine) = engine_with_template("{{ nonexistent }}", "");
        let result = engine.render("page.html", &Context::new());
        assert!(matches!(result, Err(RattanError::Template(_))));
    }

    #[test]
    fn test_asset_helper() {
        let (_dir, engine) = engine_with_template(
            "{{ asset(path='css/style.css') }}",
            "https://example.com/",
        );
        let rendered = engine.render("page.html", &Context::new()).unwrap();
        assert_eq!(rendered, "https://example.com/assets/css/style.css");
    }

    #[test]
    fn test_asset_helper_trims_leading_slash() {
        let (_dir, engine) = engine_with_template("{{ asset(path='/logo.png') }}", "");
        let rendered = engine.render("page.html", &Context::new()).unwrap();
        assert_eq!(rendered, "/assets/logo.png");
    }

    #[test]
    fn test_url_helper() {
        let (_dir, engine) =
            engine_with_template("{{ url(path='/about.html') }}", "https://example.com");
        let rendered = engine.render("page.html", &Context::new()).unwrap();
        assert_eq!(rendered, "https://example.com/about.html");
    }

    #[test]
    fn test_helper_without_path_argument_fails() {
        let (_dir, engine) = engine_with_template("{{ asset() }}", "");
        let result = engine.render("page.html", &Context::new());
        assert!(matches!(result, Err(RattanError::Template(_))));
    }

    #[test]
    fn test_templates_in_subdirectories_resolve() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("partials")).unwrap();
        fs::write(dir.path().join("partials/head.html"), "<head></head>").unwrap();
        let engine = TemplateEngine::new(dir.path(), "").unwrap();

        let rendered = engine.render("partials/head.html", &Context::new()).unwrap();
        assert_eq!(rendered, "<head></head>");
    }
}
