//! Loading and inspection of library documents

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while loading a document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document not found: {0}")]
    NotFound(PathBuf),
    #[error("not a markdown document: {0}")]
    Unsupported(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A heading inside a document, used for the outline pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Heading level, 1-6
    pub level: u8,
    /// Trimmed heading text
    pub text: String,
    /// One-based line within the document body
    pub line: usize,
}

/// A loaded, read-only markdown document
#[derive(Debug, Clone)]
pub struct Document {
    /// File path
    pub path: PathBuf,
    /// Raw file content, frontmatter included
    pub content: String,
    /// Title from YAML frontmatter, if any
    pub title: Option<String>,
    /// Heading outline of the body
    pub outline: Vec<Heading>,
    /// Number of lines in the body
    pub line_count: usize,
}

impl Document {
    /// Check whether a path looks like a markdown document
    pub fn is_markdown(path: &Path) -> bool {
        path.extension()
            .map(|ext| ext == "md" || ext == "markdown")
            .unwrap_or(false)
    }

    /// Load a document from a file
    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        if !Self::is_markdown(path) {
            return Err(DocumentError::Unsupported(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                DocumentError::NotFound(path.to_path_buf())
            } else {
                DocumentError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let title = Self::frontmatter_title(&content);
        let body = strip_frontmatter(&content);
        let outline = extract_outline(body);
        let line_count = body.lines().count().max(1);

        Ok(Self {
            path: path.to_path_buf(),
            content,
            title,
            outline,
            line_count,
        })
    }

    /// Display title: frontmatter title, or the file stem prettified
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| title_from_stem(&self.path))
    }

    /// Document body with frontmatter removed, ready for rendering
    pub fn body(&self) -> &str {
        strip_frontmatter(&self.content)
    }

    /// Extract the `title:` field from a YAML frontmatter block
    fn frontmatter_title(content: &str) -> Option<String> {
        let block = frontmatter_block(content)?;
        let re = regex_lite::Regex::new(r#"(?m)^title:\s*"?([^"\r\n]+?)"?\s*$"#).unwrap();
        re.captures(block)
            .map(|caps| caps[1].trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Derive a human-readable title from a file stem
pub fn title_from_stem(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Untitled".to_string());

    stem.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Locate the frontmatter block between the leading `---` fences
fn frontmatter_block(content: &str) -> Option<&str> {
    let rest = content.strip_prefix("---")?;
    let end = rest.find("\n---")?;
    Some(rest[..end].trim())
}

/// Content with any leading frontmatter removed
fn strip_frontmatter(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("---") else {
        return content;
    };
    match rest.find("\n---") {
        Some(end) => {
            let after = &rest[end + 4..];
            match after.find('\n') {
                Some(nl) => after[nl + 1..].trim_start_matches('\n'),
                None => "",
            }
        }
        None => content,
    }
}

/// Collect the heading outline of a markdown body
fn extract_outline(body: &str) -> Vec<Heading> {
    use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(body, options);

    let mut outline = Vec::new();
    let mut current: Option<(u8, String, usize)> = None;

    for (event, range) in parser.into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                let line = body[..range.start].matches('\n').count() + 1;
                current = Some((level as u8, String::new(), line));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buf, _)) = current.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, text, line)) = current.take() {
                    outline.push(Heading {
                        level,
                        text: text.trim().to_string(),
                        line,
                    });
                }
            }
            _ => {}
        }
    }

    outline
}
