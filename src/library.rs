/// Book and bookmark models.
pub mod book;

pub use book::{Book, Bookmark, BookmarkPatch, CategoryIndex, NewBookmark, ScanSummary};
