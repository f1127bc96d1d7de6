//! Book and bookmark models as the backend serves them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A book in the remote catalog.
///
/// Books are read-only from the client's point of view: the backend assigns
/// ids during a scan and the client never edits a book's own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Backend-assigned identifier, stable across scans.
    pub id: i64,

    /// Book title.
    pub title: String,

    /// Absolute path of the file on the backend host.
    pub file_path: String,

    /// File format (e.g. "epub", "pdf", "txt").
    pub file_format: String,

    /// Author name.
    pub author: Option<String>,

    /// Country of origin.
    pub country: Option<String>,

    /// Publication year.
    pub year: Option<i32>,

    /// Category the book is filed under.
    pub category: Option<String>,

    /// File size in bytes.
    pub file_size: Option<u64>,
}

/// Category name to book count, as reported by the backend.
///
/// A `BTreeMap` keeps the derived category name list deterministic.
pub type CategoryIndex = BTreeMap<String, u64>;

/// A bookmark inside a single book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Backend-assigned identifier.
    pub id: i64,

    /// Book this bookmark belongs to.
    pub book_id: i64,

    /// Page number, when the format has pages.
    pub page_number: Option<i64>,

    /// Opaque location descriptor (e.g. an EPUB CFI).
    pub position: Option<String>,

    /// User note attached to the bookmark.
    pub note: Option<String>,

    /// Creation timestamp (backend local time, no zone).
    pub created_at: NaiveDateTime,
}

/// Fields for creating a bookmark. The backend fills in id and timestamp.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewBookmark {
    /// Page number, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<i64>,

    /// Opaque location descriptor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,

    /// User note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Partial update for an existing bookmark. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookmarkPatch {
    /// New page number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<i64>,

    /// New location descriptor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,

    /// New note text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl BookmarkPatch {
    /// Apply this patch to a bookmark, overwriting only the fields it carries.
    pub fn apply(&self, bookmark: &mut Bookmark) {
        if let Some(page) = self.page_number {
            bookmark.page_number = Some(page);
        }
        if let Some(ref position) = self.position {
            bookmark.position = Some(position.clone());
        }
        if let Some(ref note) = self.note {
            bookmark.note = Some(note.clone());
        }
    }
}

/// Result summary of a backend library scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Books discovered and added to the catalog.
    #[serde(default)]
    pub added: u64,

    /// Books whose metadata was refreshed.
    #[serde(default)]
    pub updated: u64,

    /// Books removed because their files disappeared.
    #[serde(default)]
    pub deleted: u64,

    /// Total books in the catalog after the scan.
    #[serde(default)]
    pub total: u64,
}
