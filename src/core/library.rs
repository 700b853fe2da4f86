//! Library scanning and sidebar navigation entries

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::core::document::{self, Document};

/// One selectable document in the sidebar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    /// Trimmed display title
    pub title: String,
    /// Document path
    pub path: PathBuf,
}

/// A sidebar section: heading plus its entries
#[derive(Debug, Clone, Default)]
pub struct Category {
    /// Heading text shown in the sidebar
    pub name: String,
    /// Entries sorted by title
    pub entries: Vec<NavEntry>,
}

/// The scanned document library backing the sidebar
#[derive(Debug, Clone, Default)]
pub struct Library {
    pub root: Option<PathBuf>,
    pub categories: Vec<Category>,
}

impl Library {
    /// Scan a library directory: each immediate subdirectory becomes a
    /// category, markdown files inside it become entries. Markdown files
    /// directly at the root are grouped under "Library".
    pub fn scan(root: &Path) -> Result<Self> {
        let mut categories: Vec<Category> = Vec::new();

        let mut root_entries = collect_entries(root, 1)?;
        if !root_entries.is_empty() {
            root_entries.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
            categories.push(Category {
                name: "Library".to_string(),
                entries: root_entries,
            });
        }

        let dirs = std::fs::read_dir(root)
            .with_context(|| format!("failed to read library directory {}", root.display()))?;

        let mut subdirs: Vec<PathBuf> = dirs
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .filter(|p| !is_hidden_or_tooling(p))
            .collect();
        subdirs.sort_by_key(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_default()
        });

        for dir in subdirs {
            let mut entries = collect_entries(&dir, usize::MAX)?;
            if entries.is_empty() {
                continue;
            }
            entries.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));

            let name = dir
                .file_name()
                .map(|n| document::title_from_stem(Path::new(n)))
                .unwrap_or_else(|| "Untitled".to_string());

            categories.push(Category { name, entries });
        }

        tracing::info!(
            "Scanned library {}: {} categories",
            root.display(),
            categories.len()
        );

        Ok(Self {
            root: Some(root.to_path_buf()),
            categories,
        })
    }

    /// Total number of entries across all categories
    pub fn entry_count(&self) -> usize {
        self.categories.iter().map(|c| c.entries.len()).sum()
    }

    /// First category whose trimmed heading equals the given text exactly
    pub fn find_category(&self, heading: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name.trim() == heading)
    }
}

/// Collect markdown entries under a directory, up to the given depth
fn collect_entries(dir: &Path, max_depth: usize) -> Result<Vec<NavEntry>> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden_or_tooling(e.path()))
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || !Document::is_markdown(path) {
            continue;
        }
        entries.push(NavEntry {
            title: entry_title(path),
            path: path.to_path_buf(),
        });
    }

    Ok(entries)
}

/// Display title for an entry: frontmatter title when present, else the
/// prettified file stem. Reads only the head of the file.
fn entry_title(path: &Path) -> String {
    match Document::open(path) {
        Ok(doc) => doc.display_title().trim().to_string(),
        Err(_) => document::title_from_stem(path),
    }
}

fn is_hidden_or_tooling(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    name.starts_with('.') || name == "node_modules" || name == "target"
}

/// Fixed category-identifier to sidebar-heading map used by the welcome
/// screen's category buttons. Unknown identifiers map to nothing.
pub fn category_heading(id: &str) -> Option<&'static str> {
    match id {
        "essays" => Some("Essays"),
        "papers" => Some("Papers"),
        "reports" => Some("Reports"),
        "notes" => Some("Notes"),
        _ => None,
    }
}

/// Identifiers backing the welcome screen's category buttons
pub const CATEGORY_IDS: [&str; 4] = ["essays", "papers", "reports", "notes"];

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_scan_groups_by_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("essays/on-writing.md"), "# On Writing\n");
        write(
            &root.join("essays/focus.md"),
            "---\ntitle: Against Distraction\n---\n\nBody\n",
        );
        write(&root.join("papers/types.md"), "# Types\n");
        write(&root.join("readme.md"), "# Readme\n");
        write(&root.join(".hidden/secret.md"), "# Secret\n");
        write(&root.join("empty-dir/notes.txt"), "not markdown");

        let library = Library::scan(root).unwrap();

        let names: Vec<&str> = library.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Library", "Essays", "Papers"]);

        let essays = library.find_category("Essays").unwrap();
        assert_eq!(essays.entries.len(), 2);
        // sorted by title: "Against Distraction" (frontmatter) before "On Writing"
        assert_eq!(essays.entries[0].title, "Against Distraction");
        assert_eq!(essays.entries[1].title, "On Writing");

        assert_eq!(library.entry_count(), 4);
    }

    #[test]
    fn test_find_category_requires_exact_match() {
        let library = Library {
            root: None,
            categories: vec![Category {
                name: "Essays".to_string(),
                entries: Vec::new(),
            }],
        };
        assert!(library.find_category("Essays").is_some());
        assert!(library.find_category("essays").is_none());
        assert!(library.find_category("Essay").is_none());
    }

    #[test]
    fn test_category_heading_map() {
        assert_eq!(category_heading("essays"), Some("Essays"));
        assert_eq!(category_heading("papers"), Some("Papers"));
        assert_eq!(category_heading("bogus"), None);
        assert_eq!(category_heading(""), None);
    }
}
