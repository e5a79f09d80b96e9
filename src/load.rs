//! Loading markdown sources from disk.

use std::{fs, io, path::Path};

use thiserror::Error;

/// Extensions accepted as markdown.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdx", "mdown", "mkd", "mkdn"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("'{0}' is not a recognized markdown extension. Expected a markdown file (.md, .markdown, .mdx, .mdown, .mkd, .mkdn).")]
    UnsupportedExtension(String),
    #[error("'{0}' has no file extension. Expected a markdown file (.md, .markdown, .mdx, .mdown, .mkd, .mkdn).")]
    MissingExtension(String),
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Check the extension of `path`, then read it as UTF-8 markdown.
pub fn load_markdown(path: &Path) -> Result<String, LoadError> {
    let display = path.display().to_string();

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if MARKDOWN_EXTENSIONS.contains(&ext) => {}
        Some(ext) => return Err(LoadError::UnsupportedExtension(ext.to_owned())),
        None => return Err(LoadError::MissingExtension(display)),
    }

    log::debug!("[load] path={display}");
    fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(display),
        io::ErrorKind::PermissionDenied => LoadError::PermissionDenied(display),
        _ => LoadError::Io {
            path: display,
            source,
        },
    })
}
