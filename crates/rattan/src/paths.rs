use std::path::{Path, PathBuf};

/// Relative path with the extension swapped to `.html` and separators
/// normalized to `/`. Distinct source paths that normalize to the same
/// string silently share one output file; the build does not detect this.
fn html_relative(relative: &Path) -> String {
    relative
        .with_extension("html")
        .to_string_lossy()
        .replace('\\', "/")
}

/// Default page title: file stem with `-`/`_` turned into spaces and the
/// first letter upper-cased. Locale-independent.
pub fn page_title(relative: &Path) -> String {
    let stem = relative
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();

    let spaced = stem.replace(['-', '_'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Site-relative URL for a document.
pub fn page_url(relative: &Path) -> String {
    format!("/{}", html_relative(relative))
}

/// On-disk destination for a document's rendered output.
pub fn output_path(output_dir: &Path, relative: &Path) -> PathBuf {
    output_dir.join(html_relative(relative))
}
