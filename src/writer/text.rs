//! Text producers: escaped single strings and greedy word-wrapping.

use crate::error::{Error, Result};
use crate::fonts::metrics;
use crate::object::ObjectId;
use crate::writer::{real, Color, ContentBuffer};
use crate::Document;

impl Document {
    /// Draw a text string at `(x, y)` in the current font.
    ///
    /// Characters outside 7-bit ASCII pass through byte-wise (WinAnsi
    /// interpretation); control characters are dropped. Empty text is a
    /// no-op.
    pub fn add_text(
        &mut self,
        page: Option<ObjectId>,
        text: &str,
        size: f32,
        x: f32,
        y: f32,
        color: Color,
    ) -> Result<()> {
        let result = self.add_text_impl(page, text, size, x, y, color);
        self.track(result)
    }

    pub(crate) fn add_text_impl(
        &mut self,
        page: Option<ObjectId>,
        text: &str,
        size: f32,
        x: f32,
        y: f32,
        color: Color,
    ) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }

        let mut ops = ContentBuffer::new();
        ops.push_str("BT ");
        write!(ops, "{} {} TD ", real(x), real(y));
        write!(ops, "/F{} {} Tf ", self.current_font_index(), real(size));
        let (r, g, b) = color.components();
        write!(ops, "{} {} {} rg ", real(r), real(g), real(b));
        write!(ops, "/GS{} gs ", color.gs_index());
        ops.push_str("(");
        for ch in text.chars() {
            match ch {
                '(' | ')' | '\\' => write!(ops, "\\{}", ch),
                // Drop layout control characters rather than corrupting
                // the literal string
                '\n' | '\r' | '\t' | '\x08' | '\x0c' => {}
                _ => write!(ops, "{}", ch),
            }
        }
        ops.push_str(") Tj ET");

        self.add_stream_impl(page, ops.as_str()?)?;
        Ok(())
    }

    /// Width in points of `text` at `size` in the named standard font.
    pub fn text_width(&self, font_name: &str, text: &str, size: f32) -> Result<f32> {
        let widths = metrics::glyph_widths(font_name).ok_or_else(|| {
            Error::InvalidArgument(format!("unable to determine width for font '{}'", font_name))
        })?;
        Ok(metrics::text_width(text.as_bytes(), size, widths))
    }

    /// Draw text wrapped to `wrap_width` points, breaking at spaces and
    /// chopping single words that exceed a full line. Returns the
    /// vertical space consumed.
    pub fn add_text_wrap(
        &mut self,
        page: Option<ObjectId>,
        text: &str,
        size: f32,
        x: f32,
        y: f32,
        color: Color,
        wrap_width: f32,
    ) -> Result<f32> {
        let result = self.add_text_wrap_impl(page, text, size, x, y, color, wrap_width);
        self.track(result)
    }

    #[allow(clippy::too_many_arguments)]
    fn add_text_wrap_impl(
        &mut self,
        page: Option<ObjectId>,
        text: &str,
        size: f32,
        x: f32,
        y: f32,
        color: Color,
        wrap_width: f32,
    ) -> Result<f32> {
        let font_name = self.current_font_name().to_string();
        let widths = metrics::glyph_widths(&font_name).ok_or_else(|| {
            Error::InvalidArgument(format!("unable to determine width for font '{}'", font_name))
        })?;

        let bytes = text.as_bytes();
        let mut start = 0usize;
        let mut last_best = 0usize;
        let mut end = 0usize;
        let mut yoff = y;

        while start < bytes.len() {
            // Advance to the next word break
            let mut new_end = end + 1;
            while new_end < bytes.len() && !bytes[new_end].is_ascii_whitespace() {
                new_end += 1;
            }
            end = new_end.min(bytes.len());

            let line_width = metrics::text_width(&bytes[start..end], size, widths);
            let mut flush = false;

            if line_width >= wrap_width {
                if last_best == start {
                    // A single word too long for the line: chop it at
                    // the widest prefix that fits
                    let mut cut = 1;
                    for i in (1..end - start).rev() {
                        if metrics::text_width(&bytes[start..start + i], size, widths) < wrap_width
                        {
                            cut = i;
                            break;
                        }
                    }
                    end = start + cut;
                } else {
                    end = last_best;
                }
                flush = true;
            }
            if end >= bytes.len() || bytes[end] == b'\n' || bytes[end] == b'\r' {
                flush = true;
            }

            if flush {
                let line = String::from_utf8_lossy(&bytes[start..end]);
                self.add_text_impl(page, &line, size, x, yoff, color)?;
                if end < bytes.len() && bytes[end].is_ascii_whitespace() {
                    end += 1;
                }
                start = end;
                last_best = end;
                yoff -= size;
            } else {
                last_best = end;
            }
        }

        Ok(y - yoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_page() -> Document {
        let mut doc = Document::new(612.0, 792.0, None).unwrap();
        doc.append_page().unwrap();
        doc
    }

    #[test]
    fn test_text_operator_sequence() {
        let mut doc = doc_with_page();
        doc.add_text(None, "Hello", 12.0, 72.0, 720.0, Color::BLACK)
            .unwrap();
        let out = String::from_utf8_lossy(&doc.to_bytes().unwrap()).to_string();
        assert!(out.contains("BT 72 720 TD /F1 12 Tf 0 0 0 rg /GS0 gs (Hello) Tj ET"));
    }

    #[test]
    fn test_text_escaping_and_skipping() {
        let mut doc = doc_with_page();
        doc.add_text(None, "a(b)\\c\nd", 10.0, 0.0, 0.0, Color::BLACK)
            .unwrap();
        let out = String::from_utf8_lossy(&doc.to_bytes().unwrap()).to_string();
        assert!(out.contains("(a\\(b\\)\\\\cd) Tj"));
    }

    #[test]
    fn test_empty_text_creates_no_stream() {
        let mut doc = doc_with_page();
        let before = doc.object_count();
        doc.add_text(None, "", 10.0, 0.0, 0.0, Color::BLACK).unwrap();
        assert_eq!(doc.object_count(), before);
    }

    #[test]
    fn test_text_width_requires_known_font() {
        let doc = Document::new(612.0, 792.0, None).unwrap();
        assert!(doc.text_width("Helvetica", "hi", 12.0).is_ok());
        assert!(doc.text_width("NotAFont", "hi", 12.0).is_err());
    }

    #[test]
    fn test_wrap_splits_lines() {
        let mut doc = doc_with_page();
        let consumed = doc
            .add_text_wrap(
                None,
                "the quick brown fox jumps over the lazy dog",
                12.0,
                10.0,
                700.0,
                Color::BLACK,
                60.0,
            )
            .unwrap();
        // More than one line came out
        assert!(consumed >= 24.0);
        let out = String::from_utf8_lossy(&doc.to_bytes().unwrap()).to_string();
        assert!(out.contains("(the quick"));
        assert!(out.contains("dog) Tj"));
    }

    #[test]
    fn test_wrap_chops_oversized_word() {
        let mut doc = doc_with_page();
        let consumed = doc
            .add_text_wrap(
                None,
                "incomprehensibilities",
                12.0,
                10.0,
                700.0,
                Color::BLACK,
                30.0,
            )
            .unwrap();
        assert!(consumed >= 24.0);
    }
}
