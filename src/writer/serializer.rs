//! Single-pass document serializer.
//!
//! Walks the object store once in index order, emitting each live
//! object's body while recording its byte offset, then emits the
//! cross-reference table and trailer. All line terminators are CRLF and
//! the xref entries are fixed 20-byte records, as classic (non
//! cross-reference-stream) PDF readers expect.

use std::io::Write;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::object::{InfoDict, Object, ObjectKind, Payload};
use crate::writer::real;

/// djb2-style seeded multiply-add byte hash. Only used to produce a
/// plausible unique-enough trailer `/ID`; nothing cryptographic.
fn hash_bytes(mut hash: u64, data: &[u8]) -> u64 {
    for &byte in data {
        hash = hash.wrapping_mul(33).wrapping_add(u64::from(byte));
    }
    hash
}

/// Writer adapter that tracks the output byte position for the xref
/// table.
struct CountingWriter<W: Write> {
    inner: W,
    position: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        CountingWriter { inner, position: 0 }
    }

    fn position(&self) -> u64 {
        self.position
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.position += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Serialize the whole document: header, objects, xref table, trailer.
pub(crate) fn write_document<W: Write>(doc: &Document, out: W) -> Result<()> {
    let mut w = CountingWriter::new(out);

    write!(w, "%PDF-1.2\r\n")?;
    // High-bit comment line so transports treat the file as binary
    w.write_all(&[0x25, 0xc7, 0xec, 0x8f, 0xa2, b'\r', b'\n'])?;

    // Pass 1: emit objects in index order, recording offsets. The
    // sentinel and deleted slots are skipped and excluded from the count.
    let mut offsets: Vec<u64> = Vec::new();
    for index in 0..doc.store_len() {
        let Some(obj) = doc.object(index) else {
            continue;
        };
        if obj.kind() == ObjectKind::None {
            continue;
        }
        offsets.push(w.position());
        write!(w, "{} 0 obj\r\n", index)?;
        write_object_body(doc, obj, &mut w)?;
        write!(w, "endobj\r\n")?;
    }
    let object_count = offsets.len();

    // Pass 2: cross-reference table, one 20-byte line per live object
    let xref_offset = w.position();
    write!(w, "xref\r\n")?;
    write!(w, "0 {}\r\n", object_count + 1)?;
    write!(w, "0000000000 65535 f\r\n")?;
    for offset in &offsets {
        write!(w, "{:010} 00000 n\r\n", offset)?;
    }

    // Trailer
    let catalog = doc
        .first_index(ObjectKind::Catalog)
        .ok_or_else(|| Error::NotFound("document has no catalog".to_string()))?;
    let info = doc
        .first_index(ObjectKind::Info)
        .ok_or_else(|| Error::NotFound("document has no info object".to_string()))?;

    write!(w, "trailer\r\n<<\r\n/Size {}\r\n", object_count + 1)?;
    write!(w, "/Root {} 0 R\r\n", catalog)?;
    write!(w, "/Info {} 0 R\r\n", info)?;
    let (id1, id2) = document_ids(doc, object_count);
    write!(w, "/ID [<{:016x}> <{:016x}>]\r\n", id1, id2)?;
    write!(w, ">>\r\nstartxref\r\n{}\r\n%%EOF\r\n", xref_offset)?;

    log::debug!(
        "serialized {} objects, xref at offset {}",
        object_count,
        xref_offset
    );
    Ok(())
}

/// The two trailer `/ID` values: the first hashes the info dictionary
/// body and the object count, the second the wall-clock timestamp.
fn document_ids(doc: &Document, object_count: usize) -> (u64, u64) {
    let info_body = doc
        .chain(ObjectKind::Info)
        .find_map(|(_, obj)| match &obj.payload {
            Payload::Info(info) => Some(render_info_body(info)),
            _ => None,
        })
        .unwrap_or_default();

    let id1 = hash_bytes(hash_bytes(5381, &info_body), &(object_count as u64).to_le_bytes());
    let timestamp = chrono::Utc::now().timestamp();
    let id2 = hash_bytes(5381, &timestamp.to_le_bytes());
    (id1, id2)
}

/// Escape the characters that terminate or escape PDF literal strings.
fn escape_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// The info object's dictionary body, also the first `/ID` hash input.
fn render_info_body(info: &InfoDict) -> Vec<u8> {
    let mut body = Vec::new();
    // Writing to a Vec cannot fail
    let _ = write!(
        body,
        "<<\r\n  /Creator ({})\r\n  /Producer ({})\r\n  /Title ({})\r\n  /Author ({})\r\n  /Subject ({})\r\n  /CreationDate (D:{})\r\n>>\r\n",
        escape_string(&info.creator),
        escape_string(&info.producer),
        escape_string(&info.title),
        escape_string(&info.author),
        escape_string(&info.subject),
        escape_string(&info.date),
    );
    body
}

/// Emit one object's type-specific body.
fn write_object_body<W: Write>(doc: &Document, obj: &Object, w: &mut W) -> Result<()> {
    match &obj.payload {
        Payload::Stream(data) => {
            w.write_all(data)?;
        }

        Payload::Image(image) => {
            w.write_all(&image.data)?;
        }

        Payload::Info(info) => {
            w.write_all(&render_info_body(info))?;
        }

        Payload::Page(page) => {
            let pages = doc
                .first_index(ObjectKind::Pages)
                .ok_or_else(|| Error::NotFound("document has no pages root".to_string()))?;
            write!(w, "<<\r\n/Type /Page\r\n/Parent {} 0 R\r\n", pages)?;
            write!(
                w,
                "/MediaBox [0 0 {} {}]\r\n",
                real(page.width),
                real(page.height)
            )?;
            write!(w, "/Resources <<\r\n")?;
            write!(w, "  /Font <<\r\n")?;
            for (index, font) in doc.chain(ObjectKind::Font) {
                if let Payload::Font(f) = &font.payload {
                    write!(w, "    /F{} {} 0 R\r\n", f.resource, index)?;
                }
            }
            write!(w, "  >>\r\n")?;
            // 16 graphics states covering the coarse alpha range
            write!(w, "  /ExtGState <<\r\n")?;
            for i in 0..16 {
                write!(w, "    /GS{} <</ca {}>>\r\n", i, real((15 - i) as f32 / 15.0))?;
            }
            write!(w, "  >>\r\n")?;
            if doc.first_index(ObjectKind::Image).is_some() {
                write!(w, "  /XObject <<")?;
                for (index, _) in doc.chain(ObjectKind::Image) {
                    write!(w, "/Image{} {} 0 R ", index, index)?;
                }
                write!(w, ">>\r\n")?;
            }
            write!(w, ">>\r\n")?;
            write!(w, "/Contents [\r\n")?;
            for child in &page.contents {
                write!(w, "{} 0 R\r\n", child)?;
            }
            write!(w, "]\r\n>>\r\n")?;
        }

        Payload::Bookmark(bookmark) => {
            let parent = bookmark
                .parent
                .or_else(|| doc.first_index(ObjectKind::Outline))
                .ok_or_else(|| Error::NotFound("bookmark without outline root".to_string()))?;
            write!(
                w,
                "<<\r\n/A << /Type /Action\r\n      /S /GoTo\r\n      /D [{} 0 R /XYZ 0 {} null]\r\n   >>\r\n",
                bookmark.page,
                real(doc.height())
            )?;
            write!(w, "/Parent {} 0 R\r\n", parent)?;
            write!(w, "/Title ({})\r\n", escape_string(&bookmark.name))?;
            if let (Some(first), Some(last)) =
                (bookmark.children.first(), bookmark.children.last())
            {
                write!(w, "/First {} 0 R\r\n", first)?;
                write!(w, "/Last {} 0 R\r\n", last)?;
            }
            if let Some(prev) = nearest_sibling(doc, obj.prev, bookmark.parent, Direction::Prev) {
                write!(w, "/Prev {} 0 R\r\n", prev)?;
            }
            if let Some(next) = nearest_sibling(doc, obj.next, bookmark.parent, Direction::Next) {
                write!(w, "/Next {} 0 R\r\n", next)?;
            }
            write!(w, ">>\r\n")?;
        }

        Payload::Outline => {
            let top_level = doc
                .chain(ObjectKind::Bookmark)
                .filter(|(_, o)| matches!(&o.payload, Payload::Bookmark(b) if b.parent.is_none()))
                .count();
            write!(w, "<<\r\n/Type /Outlines\r\n/Count {}\r\n", top_level)?;
            if let (Some(first), Some(last)) = (
                doc.first_index(ObjectKind::Bookmark),
                doc.last_index(ObjectKind::Bookmark),
            ) {
                write!(w, "/First {} 0 R\r\n", first)?;
                write!(w, "/Last {} 0 R\r\n", last)?;
            }
            write!(w, ">>\r\n")?;
        }

        Payload::Font(font) => {
            write!(
                w,
                "<<\r\n  /Type /Font\r\n  /Subtype /Type1\r\n  /BaseFont /{}\r\n  /Encoding /WinAnsiEncoding\r\n>>\r\n",
                font.name
            )?;
        }

        Payload::Pages => {
            write!(w, "<<\r\n/Type /Pages\r\n/Kids [ ")?;
            let mut page_count = 0;
            for (index, _) in doc.chain(ObjectKind::Page) {
                page_count += 1;
                write!(w, "{} 0 R ", index)?;
            }
            write!(w, "]\r\n/Count {}\r\n", page_count)?;
            write!(
                w,
                "/MediaBox [0 0 {} {}]\r\n>>\r\n",
                real(doc.width()),
                real(doc.height())
            )?;
        }

        Payload::Catalog => {
            write!(w, "<<\r\n/Type /Catalog\r\n")?;
            if let Some(outline) = doc.first_index(ObjectKind::Outline) {
                write!(
                    w,
                    "/Outlines {} 0 R\r\n/PageMode /UseOutlines\r\n",
                    outline
                )?;
            }
            let pages = doc
                .first_index(ObjectKind::Pages)
                .ok_or_else(|| Error::NotFound("document has no pages root".to_string()))?;
            write!(w, "/Pages {} 0 R\r\n>>\r\n", pages)?;
        }

        // Only reachable through store corruption: sentinels and deleted
        // slots are filtered out before dispatch
        Payload::None => {
            return Err(Error::InvalidArgument(format!(
                "invalid PDF object type at index {}",
                obj.index
            )));
        }
    }
    Ok(())
}

enum Direction {
    Prev,
    Next,
}

/// Walk the bookmark chain from `start` until an entry sharing `parent`
/// turns up. O(n), acceptable for realistic bookmark counts.
fn nearest_sibling(
    doc: &Document,
    start: Option<usize>,
    parent: Option<usize>,
    direction: Direction,
) -> Option<usize> {
    let mut link = start;
    while let Some(index) = link {
        let obj = doc.object(index)?;
        if let Payload::Bookmark(b) = &obj.payload {
            if b.parent == parent {
                return Some(index);
            }
        }
        link = match direction {
            Direction::Prev => obj.prev,
            Direction::Next => obj.next,
        };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_seeded_multiply_add() {
        // 5381 * 33 + 'a'
        assert_eq!(hash_bytes(5381, b"a"), 5381 * 33 + 97);
        assert_eq!(hash_bytes(5381, b""), 5381);
        // Associativity over split inputs
        assert_eq!(
            hash_bytes(hash_bytes(5381, b"ab"), b"cd"),
            hash_bytes(5381, b"abcd")
        );
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("plain"), "plain");
        assert_eq!(escape_string("a(b)c"), "a\\(b\\)c");
        assert_eq!(escape_string("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_counting_writer_tracks_position() {
        let mut sink = Vec::new();
        let mut w = CountingWriter::new(&mut sink);
        w.write_all(b"hello").unwrap();
        assert_eq!(w.position(), 5);
        w.write_all(b", world").unwrap();
        assert_eq!(w.position(), 12);
        assert_eq!(sink, b"hello, world");
    }
}
