//! # pdf_scribe
//!
//! Single-pass PDF generation: build an in-memory graph of typed objects
//! (pages, fonts, content streams, images, bookmarks) and serialize it
//! into a classic PDF 1.2 file — objects, cross-reference table,
//! trailer — in one pass.
//!
//! The design favors predictability over features: every object gets a
//! stable integer ID at creation, cross-references are plain indices,
//! and the output uses the traditional xref table layout that every PDF
//! reader understands. There is no parsing, no encryption, no
//! compression, and no font embedding — the 14 standard fonts only.
//!
//! ## Quick start
//!
//! ```
//! use pdf_scribe::{Color, Document, DocumentInfo, LETTER_HEIGHT, LETTER_WIDTH};
//!
//! # fn main() -> pdf_scribe::Result<()> {
//! let info = DocumentInfo::new().title("Hello").author("me");
//! let mut doc = Document::new(LETTER_WIDTH, LETTER_HEIGHT, Some(info))?;
//!
//! doc.append_page()?;
//! doc.add_text(None, "Hello, world", 14.0, 72.0, 720.0, Color::BLACK)?;
//! doc.add_line(None, 72.0, 714.0, 250.0, 714.0, 1.0, Color::BLACK)?;
//!
//! let bytes = doc.to_bytes()?;
//! assert!(bytes.starts_with(b"%PDF-1.2"));
//! # Ok(())
//! # }
//! ```
//!
//! All coordinates and sizes are in points (1/72 inch) with the origin
//! at the bottom-left of the page.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Core object graph
pub mod document;
pub mod object;
pub mod store;

// Font metrics
pub mod fonts;

// Serialization and content producers
pub mod writer;

pub use document::Document;
pub use error::{Error, Result};
pub use object::{DocumentInfo, ObjectId, ObjectKind};
pub use writer::{Color, ContentBuffer, PathOp};

/// Point width of a standard US-Letter page.
pub const LETTER_WIDTH: f32 = 612.0;
/// Point height of a standard US-Letter page.
pub const LETTER_HEIGHT: f32 = 792.0;
/// Point width of a standard A4 page.
pub const A4_WIDTH: f32 = 595.2756;
/// Point height of a standard A4 page.
pub const A4_HEIGHT: f32 = 841.8898;
/// Point width of a standard A3 page.
pub const A3_WIDTH: f32 = 841.8898;
/// Point height of a standard A3 page.
pub const A3_HEIGHT: f32 = 1190.5513;

/// Convert a value in inches to points.
pub fn inch_to_point(inch: f32) -> f32 {
    inch * 72.0
}

/// Convert a value in millimeters to points.
pub fn mm_to_point(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}
