//! The markdown document and its derived views.
//!
//! This module handles:
//! - Holding the raw markdown text (the single source of truth)
//! - Rendering it to HTML with comrak
//! - Packaging it for export as a downloadable file

mod render;

pub use render::render;

/// Media type attached to exported documents.
pub const EXPORT_MEDIA_TYPE: &str = "text/markdown";

/// Suggested file name for exported documents.
pub const EXPORT_FILE_NAME: &str = "document.md";

/// File extensions offered by the import picker. Not enforced.
const IMPORT_EXTENSIONS: &[&str] = &["md", "txt"];

/// Text shown when nothing has been persisted yet.
pub const DEFAULT_MARKDOWN: &str = r"
# Welcome to my React Markdown Previewer!

## Your sub-headings go here...

### Other text can be **bold** or _italic_.
#### You can also combine them... **_bold and italic!_** `<div></div>`
#### And of course, there are lists:

1. First ordered list item
2. Second ordered list item
3. Third ordered list item

- Unordered list item 1
- Unordered list item 2
- Unordered list item 3

You can add logos like this one:
![React Logo](https://cdn.iconscout.com/icon/free/png-256/react-1-282599.png)

And of course, links:
[Visit React](https://react.dev)

Feel free to edit this markdown and see the preview update in real-time!

Happy coding! `:) `
";

/// The raw markdown being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    content: String,
}

impl Document {
    /// Create a document holding `content`.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// The built-in welcome document.
    pub fn welcome() -> Self {
        Self::new(DEFAULT_MARKDOWN)
    }

    /// The raw markdown text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the whole text.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Render the current text to HTML.
    pub fn render(&self) -> String {
        render(&self.content)
    }

    /// Package the current text for download.
    pub fn export(&self) -> Export {
        Export {
            bytes: self.content.clone().into_bytes(),
            media_type: EXPORT_MEDIA_TYPE,
            file_name: EXPORT_FILE_NAME,
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::welcome()
    }
}

/// A document serialized for saving to the local file system.
///
/// The engine never writes files itself; whoever handles the download
/// decides where `bytes` end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
    pub file_name: &'static str,
}

impl Export {
    /// The exported bytes as text, replacing invalid UTF-8 sequences.
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Returns true if the import picker would offer this file by default.
pub fn is_suggested_import(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMPORT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
