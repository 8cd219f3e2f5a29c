//! Conversion of the help-desk FAQ markdown into chat-widget import files.
//!
//! The FAQ is a markdown document with one `## ` section per category and `**Q: …?**` /
//! `A:` pairs inside each section. It is rendered to a browsable HTML page with import
//! instructions and to a CSV file suitable for bulk import.

mod parse;
mod render;

pub use parse::{DEFAULT_TAG, TAG_KEYWORDS, strip_pictographs, tags_for};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the generated HTML page.
pub const HTML_OUTPUT: &str = "TAWK_IMPORT.html";
/// File name of the generated CSV export.
pub const CSV_OUTPUT: &str = "TAWK_IMPORT.csv";

/// Errors raised while reading the FAQ or writing the exports.
#[derive(Debug, Error)]
pub enum KnowledgeBaseError {
    /// Reading the markdown or writing an export failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The CSV encoder rejected a record.
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

/// One question and its answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Question text, ending with `?`.
    pub title: String,
    /// Answer body, trimmed.
    pub content: String,
    /// Tags derived from keywords in the question.
    pub tags: Vec<String>,
}

/// A named group of articles taken from one `## ` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Heading text without emoji.
    pub name: String,
    /// Short description shown by the widget.
    pub description: String,
    /// Articles in document order; never empty.
    pub articles: Vec<Article>,
}

/// Parsed FAQ document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    /// Categories in document order.
    pub categories: Vec<Category>,
}

/// Paths of the files produced by [`KnowledgeBase::write_outputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    /// Generated HTML page.
    pub html: PathBuf,
    /// Generated CSV file.
    pub csv: PathBuf,
}

impl KnowledgeBase {
    /// Parse markdown text into categories and articles.
    pub fn parse(markdown: &str) -> Self {
        Self {
            categories: parse::parse_categories(markdown),
        }
    }

    /// Read and parse the markdown file at `path`.
    pub fn from_file(path: &Path) -> Result<Self, KnowledgeBaseError> {
        let markdown = fs::read_to_string(path).map_err(|source| KnowledgeBaseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&markdown))
    }

    /// Number of articles across all categories.
    pub fn total_articles(&self) -> usize {
        self.categories
            .iter()
            .map(|category| category.articles.len())
            .sum()
    }

    /// Render the HTML import page.
    pub fn to_html(&self) -> String {
        render::render_html(self)
    }

    /// Render the CSV export.
    pub fn to_csv(&self) -> Result<Vec<u8>, KnowledgeBaseError> {
        render::render_csv(self)
    }

    /// Write both exports into `dir`, replacing earlier runs.
    pub fn write_outputs(&self, dir: &Path) -> Result<ExportPaths, KnowledgeBaseError> {
        fs::create_dir_all(dir).map_err(|source| KnowledgeBaseError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let paths = ExportPaths {
            html: dir.join(HTML_OUTPUT),
            csv: dir.join(CSV_OUTPUT),
        };
        write_file(&paths.html, self.to_html().as_bytes())?;
        write_file(&paths.csv, &self.to_csv()?)?;
        tracing::info!(
            categories = self.categories.len(),
            articles = self.total_articles(),
            html = %paths.html.display(),
            csv = %paths.csv.display(),
            "Knowledge base exported"
        );
        Ok(paths)
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), KnowledgeBaseError> {
    fs::write(path, contents).map_err(|source| KnowledgeBaseError::Io {
        path: path.to_path_buf(),
        source,
    })
}
