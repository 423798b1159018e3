//! Markdown to HTML rendering with comrak.

use comrak::{Options, markdown_to_html};

/// Render markdown source to an HTML string.
///
/// Pure function of `source`: soft line breaks become `<br />` and the GFM
/// table, strikethrough and autolink extensions are enabled.
///
/// # Example
///
/// ```
/// let html = markpad::document::render("# Hello");
/// assert!(html.contains("<h1>Hello</h1>"));
/// ```
pub fn render(source: &str) -> String {
    let mut options = Options::default();

    // Enable GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;

    // Soft line breaks render as hard breaks
    options.render.hardbreaks = true;

    markdown_to_html(source, &options)
}
