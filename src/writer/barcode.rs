//! Code-128A barcode producer.
//!
//! Symbols are drawn as runs of filled vertical lines; each symbol packs
//! its module widths four bits per bar into a hex-digit pattern.

use crate::error::{Error, Result};
use crate::object::ObjectId;
use crate::writer::Color;
use crate::Document;

/// Module-width patterns for Code-128A, indexed by symbol value.
/// Entries past the printable range (value 96 and up) are control and
/// start/stop symbols with no character equivalent.
const CODE_128A: [(u32, u8); 107] = [
    (0x212222, b' '), (0x222122, b'!'), (0x222221, b'"'), (0x121223, b'#'),
    (0x121322, b'$'), (0x131222, b'%'), (0x122213, b'&'), (0x122312, b'\''),
    (0x132212, b'('), (0x221213, b')'), (0x221312, b'*'), (0x231212, b'+'),
    (0x112232, b','), (0x122132, b'-'), (0x122231, b'.'), (0x113222, b'/'),
    (0x123122, b'0'), (0x123221, b'1'), (0x223211, b'2'), (0x221132, b'3'),
    (0x221231, b'4'), (0x213212, b'5'), (0x223112, b'6'), (0x312131, b'7'),
    (0x311222, b'8'), (0x321122, b'9'), (0x321221, b':'), (0x312212, b';'),
    (0x322112, b'<'), (0x322211, b'='), (0x212123, b'>'), (0x212321, b'?'),
    (0x232121, b'@'), (0x111323, b'A'), (0x131123, b'B'), (0x131321, b'C'),
    (0x112313, b'D'), (0x132113, b'E'), (0x132311, b'F'), (0x211313, b'G'),
    (0x231113, b'H'), (0x231311, b'I'), (0x112133, b'J'), (0x112331, b'K'),
    (0x132131, b'L'), (0x113123, b'M'), (0x113321, b'N'), (0x133121, b'O'),
    (0x313121, b'P'), (0x211331, b'Q'), (0x231131, b'R'), (0x213113, b'S'),
    (0x213311, b'T'), (0x213131, b'U'), (0x311123, b'V'), (0x311321, b'W'),
    (0x331121, b'X'), (0x312113, b'Y'), (0x312311, b'Z'), (0x332111, b'['),
    (0x314111, b'\\'), (0x221411, b']'), (0x431111, b'^'), (0x111224, b'_'),
    (0x111422, b'`'), (0x121124, b'a'), (0x121421, b'b'), (0x141122, b'c'),
    (0x141221, b'd'), (0x112214, b'e'), (0x112412, b'f'), (0x122114, b'g'),
    (0x122411, b'h'), (0x142112, b'i'), (0x142211, b'j'), (0x241211, b'k'),
    (0x221114, b'l'), (0x413111, b'm'), (0x241112, b'n'), (0x134111, b'o'),
    (0x111242, b'p'), (0x121142, b'q'), (0x121241, b'r'), (0x114212, b's'),
    (0x124112, b't'), (0x124211, b'u'), (0x411212, b'v'), (0x421112, b'w'),
    (0x421211, b'x'), (0x212141, b'y'), (0x214121, b'z'), (0x412121, b'{'),
    (0x111143, b'|'), (0x111341, b'}'), (0x131141, b'~'), (0x114113, 0),
    (0x114311, 0), (0x411113, 0), (0x411311, 0), (0x113141, 0),
    (0x114131, 0), (0x311141, 0), (0x411131, 0), (0x211412, 0),
    (0x211214, 0), (0x211232, 0), (0x2331112, 0),
];

/// Start Code A symbol value.
const START_A: usize = 104;
/// Stop symbol value.
const STOP: usize = 106;

/// Symbol value for an encodable character.
fn encoding_index(ch: u8) -> Option<usize> {
    if ch == 0 {
        return None;
    }
    CODE_128A.iter().position(|&(_, c)| c == ch)
}

impl Document {
    /// Draw a Code-128A barcode of the given total width and bar height.
    ///
    /// Fails with an invalid-argument error if `text` contains a
    /// character outside the Code-128A set. Empty text is a no-op.
    #[allow(clippy::too_many_arguments)]
    pub fn add_barcode_128a(
        &mut self,
        page: Option<ObjectId>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        text: &str,
        color: Color,
    ) -> Result<()> {
        let result = self.add_barcode_128a_impl(page, x, y, width, height, text, color);
        self.track(result)
    }

    #[allow(clippy::too_many_arguments)]
    fn add_barcode_128a_impl(
        &mut self,
        page: Option<ObjectId>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        text: &str,
        color: Color,
    ) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        for byte in text.bytes() {
            if encoding_index(byte).is_none() {
                return Err(Error::InvalidArgument(format!(
                    "invalid barcode character {:#x}",
                    byte
                )));
            }
        }

        // Start symbol + data + checksum + stop
        let symbol_width = width / (text.len() + 3) as f32;
        let mut x = self.barcode_symbol(page, x, y, symbol_width, height, color, START_A, 6)?;
        let mut checksum = START_A;

        for (i, byte) in text.bytes().enumerate() {
            // Validated above
            let index = encoding_index(byte)
                .ok_or_else(|| Error::InvalidArgument("invalid barcode character".to_string()))?;
            x = self.barcode_symbol(page, x, y, symbol_width, height, color, index, 6)?;
            checksum += index * (i + 1);
        }

        x = self.barcode_symbol(page, x, y, symbol_width, height, color, checksum % 103, 6)?;
        self.barcode_symbol(page, x, y, symbol_width, height, color, STOP, 7)?;
        Ok(())
    }

    /// Draw one symbol as alternating bar/space runs; returns the x
    /// position after the symbol.
    #[allow(clippy::too_many_arguments)]
    fn barcode_symbol(
        &mut self,
        page: Option<ObjectId>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
        index: usize,
        code_len: u32,
    ) -> Result<f32> {
        let pattern = CODE_128A[index].0;
        let line_width = width / 11.0;
        let mut x = x;
        for i in 0..code_len {
            let shift = (code_len - 1 - i) * 4;
            let run = (pattern >> shift) & 0xf;
            if i % 2 == 0 {
                for _ in 0..run {
                    self.add_line_impl(page, x, y, x, y + height, line_width, color)?;
                    x += line_width;
                }
            } else {
                x += line_width * run as f32;
            }
        }
        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_values() {
        assert_eq!(encoding_index(b' '), Some(0));
        assert_eq!(encoding_index(b'A'), Some(33));
        assert_eq!(encoding_index(b'\x80'), None);
        assert_eq!(CODE_128A.len(), 107);
    }

    #[test]
    fn test_barcode_emits_line_streams() {
        let mut doc = Document::new(612.0, 792.0, None).unwrap();
        doc.append_page().unwrap();
        let before = doc.object_count();
        doc.add_barcode_128a(None, 50.0, 300.0, 200.0, 100.0, "ABC", Color::BLACK)
            .unwrap();
        // Every bar is its own line stream
        assert!(doc.object_count() > before + 10);
    }

    #[test]
    fn test_barcode_rejects_unencodable_text() {
        let mut doc = Document::new(612.0, 792.0, None).unwrap();
        doc.append_page().unwrap();
        let before = doc.object_count();
        let err = doc
            .add_barcode_128a(None, 0.0, 0.0, 100.0, 40.0, "Ä", Color::BLACK)
            .unwrap_err();
        assert_eq!(err.code(), -22);
        // Rejected before anything was drawn
        assert_eq!(doc.object_count(), before);
    }

    #[test]
    fn test_empty_barcode_is_noop() {
        let mut doc = Document::new(612.0, 792.0, None).unwrap();
        doc.append_page().unwrap();
        let before = doc.object_count();
        doc.add_barcode_128a(None, 0.0, 0.0, 100.0, 40.0, "", Color::BLACK)
            .unwrap();
        assert_eq!(doc.object_count(), before);
    }
}
