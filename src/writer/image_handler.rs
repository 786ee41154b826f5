//! Image producers.
//!
//! Each image becomes an XObject whose object body is fully
//! pre-formatted here (dictionary, encoded payload, stream envelope)
//! and handed to [`Document::add_raw_image`]; placement on a page is a
//! separate small content stream.

use std::path::Path;

use crate::error::{Error, Result};
use crate::object::ObjectId;
use crate::writer::{real, ContentBuffer};
use crate::Document;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

impl Document {
    /// Embed a raw 8-bit RGB buffer (3 bytes per pixel) and place it on
    /// the page at `(x, y)` scaled to `display_width` x `display_height`
    /// points.
    #[allow(clippy::too_many_arguments)]
    pub fn add_rgb24(
        &mut self,
        page: Option<ObjectId>,
        x: f32,
        y: f32,
        display_width: f32,
        display_height: f32,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<()> {
        let result = (|| -> Result<()> {
            let page = Some(ObjectId(self.resolve_page(page)?));
            if data.len() != (width as usize) * (height as usize) * 3 {
                return Err(Error::InvalidArgument(format!(
                    "insufficient RGB data for {}x{} image",
                    width, height
                )));
            }
            let payload = rgb24_payload(self.next_object_id(), data, width, height)?;
            let image = self.add_raw_image(width, height, payload)?;
            self.place_image(page, image, x, y, display_width, display_height)
        })();
        self.track(result)
    }

    /// Embed JPEG data as a DCTDecode XObject and place it on the page.
    ///
    /// The JPEG is passed through untouched; only the JFIF header is
    /// scanned for the pixel dimensions.
    pub fn add_jpeg_data(
        &mut self,
        page: Option<ObjectId>,
        x: f32,
        y: f32,
        display_width: f32,
        display_height: f32,
        jpeg: &[u8],
    ) -> Result<()> {
        let result = (|| -> Result<()> {
            let page = Some(ObjectId(self.resolve_page(page)?));
            let (width, height) = jpeg_size(jpeg).ok_or_else(|| {
                Error::InvalidArgument("unable to determine JPEG width/height".to_string())
            })?;
            let payload = jpeg_payload(self.next_object_id(), jpeg, width, height)?;
            let image = self.add_raw_image(width, height, payload)?;
            self.place_image(page, image, x, y, display_width, display_height)
        })();
        self.track(result)
    }

    /// Load a JPEG file and place it on the page.
    pub fn add_jpeg_file(
        &mut self,
        page: Option<ObjectId>,
        x: f32,
        y: f32,
        display_width: f32,
        display_height: f32,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let data = match std::fs::read(path.as_ref()) {
            Ok(data) => data,
            Err(err) => return self.track(Err(err.into())),
        };
        self.add_jpeg_data(page, x, y, display_width, display_height, &data)
    }

    /// Load a binary (P6) PPM file and place it on the page.
    pub fn add_ppm_file(
        &mut self,
        page: Option<ObjectId>,
        x: f32,
        y: f32,
        display_width: f32,
        display_height: f32,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let result = (|| -> Result<()> {
            let data = std::fs::read(path.as_ref())?;
            let (rgb, width, height) = parse_ppm(&data)?;
            let page = Some(ObjectId(self.resolve_page(page)?));
            let payload = rgb24_payload(self.next_object_id(), rgb, width, height)?;
            let image = self.add_raw_image(width, height, payload)?;
            self.place_image(page, image, x, y, display_width, display_height)
        })();
        self.track(result)
    }

    /// Commit the placement stream drawing an image object on a page.
    fn place_image(
        &mut self,
        page: Option<ObjectId>,
        image: ObjectId,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<()> {
        let mut ops = ContentBuffer::new();
        ops.push_str("q ");
        write!(
            ops,
            "{} 0 0 {} {} {} cm ",
            real(width),
            real(height),
            real(x),
            real(y)
        );
        write!(ops, "/Image{} Do ", image.index());
        ops.push_str("Q");
        self.add_stream_impl(page, ops.as_str()?)?;
        Ok(())
    }
}

/// XObject body for an RGB24 buffer, hex-encoded so the payload stays
/// printable.
fn rgb24_payload(id: ObjectId, data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut buf = ContentBuffer::new();
    buf.reserve(data.len() * 2 + 256)?;
    write!(
        buf,
        "<<\r\n/Type /XObject\r\n/Name /Image{}\r\n/Subtype /Image\r\n/ColorSpace /DeviceRGB\r\n/Height {}\r\n/Width {}\r\n/BitsPerComponent 8\r\n/Filter /ASCIIHexDecode\r\n/Length {}\r\n>>stream\r\n",
        id.index(),
        height,
        width,
        data.len() * 2 + 1
    );
    for &byte in data {
        buf.push_bytes(&[
            HEX_DIGITS[usize::from(byte >> 4)],
            HEX_DIGITS[usize::from(byte & 0xf)],
        ]);
    }
    buf.push_str(">\r\nendstream\r\n");
    Ok(buf.into_bytes())
}

/// XObject body wrapping JPEG data verbatim under DCTDecode.
fn jpeg_payload(id: ObjectId, jpeg: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut buf = ContentBuffer::new();
    buf.reserve(jpeg.len() + 256)?;
    write!(
        buf,
        "<<\r\n/Type /XObject\r\n/Name /Image{}\r\n/Subtype /Image\r\n/ColorSpace /DeviceRGB\r\n/Width {}\r\n/Height {}\r\n/BitsPerComponent 8\r\n/Filter /DCTDecode\r\n/Length {}\r\n>>stream\r\n",
        id.index(),
        width,
        height,
        jpeg.len()
    );
    buf.push_bytes(jpeg);
    buf.push_str("\r\nendstream\r\n");
    Ok(buf.into_bytes())
}

/// Pixel dimensions from a JFIF JPEG header (SOF0 frame scan).
fn jpeg_size(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 11 || data[0] != 0xff || data[1] != 0xd8 || data[2] != 0xff || data[3] != 0xe0 {
        return None;
    }
    if &data[6..11] != b"JFIF\0" {
        return None;
    }
    let mut i = 4usize;
    let mut block_length = usize::from(data[i]) * 256 + usize::from(data[i + 1]);
    loop {
        i += block_length;
        if i + 8 >= data.len() {
            return None;
        }
        if data[i] != 0xff {
            return None;
        }
        if data[i + 1] == 0xc0 {
            let height = u32::from(data[i + 5]) * 256 + u32::from(data[i + 6]);
            let width = u32::from(data[i + 7]) * 256 + u32::from(data[i + 8]);
            return Some((width, height));
        }
        i += 2;
        block_length = usize::from(data[i]) * 256 + usize::from(data[i + 1]);
    }
}

/// Parse a binary (P6) PPM: magic, comment-tolerant size line, maxval
/// line, raw RGB triplets.
fn parse_ppm(data: &[u8]) -> Result<(&[u8], u32, u32)> {
    let mut lines = HeaderLines { data, pos: 0 };

    let magic = lines
        .next_line()
        .ok_or_else(|| Error::InvalidArgument("invalid PPM file".to_string()))?;
    if !magic.starts_with(b"P6") {
        return Err(Error::InvalidArgument(
            "only binary PPM files supported".to_string(),
        ));
    }

    let size_line = loop {
        let line = lines
            .next_line()
            .ok_or_else(|| Error::InvalidArgument("unable to find PPM size".to_string()))?;
        if !line.starts_with(b"#") {
            break line;
        }
    };
    let mut sizes = std::str::from_utf8(size_line)
        .map_err(|_| Error::InvalidArgument("unable to find PPM size".to_string()))?
        .split_ascii_whitespace()
        .map(|token| token.parse::<u32>());
    let (width, height) = match (sizes.next(), sizes.next()) {
        (Some(Ok(w)), Some(Ok(h))) => (w, h),
        _ => return Err(Error::InvalidArgument("unable to find PPM size".to_string())),
    };

    // Maxval line precedes the pixel data
    lines
        .next_line()
        .ok_or_else(|| Error::InvalidArgument("no byte-size line in PPM file".to_string()))?;

    let expected = (width as usize) * (height as usize) * 3;
    let pixels = &data[lines.pos..];
    if pixels.len() < expected {
        return Err(Error::InvalidArgument(
            "insufficient RGB data available".to_string(),
        ));
    }
    Ok((&pixels[..expected], width, height))
}

/// Newline-delimited header walker tracking where pixel data begins.
struct HeaderLines<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> HeaderLines<'a> {
    fn next_line(&mut self) -> Option<&'a [u8]> {
        if self.pos >= self.data.len() {
            return None;
        }
        let start = self.pos;
        let end = self.data[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|offset| start + offset)
            .unwrap_or(self.data.len());
        self.pos = (end + 1).min(self.data.len());
        Some(&self.data[start..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal JFIF wrapper: APP0 segment then an SOF0 frame with the
    /// given dimensions.
    fn fake_jfif(width: u16, height: u16) -> Vec<u8> {
        let mut data = vec![0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10];
        data.extend_from_slice(b"JFIF\0");
        data.resize(4 + 16, 0); // pad APP0 to its declared length
        data.extend_from_slice(&[0xff, 0xc0, 0x00, 0x11, 0x08]);
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&[0x03, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        data
    }

    #[test]
    fn test_jpeg_size_scan() {
        assert_eq!(jpeg_size(&fake_jfif(640, 480)), Some((640, 480)));
        assert_eq!(jpeg_size(b"not a jpeg"), None);
        assert_eq!(jpeg_size(&[0xff, 0xd8, 0xff, 0xdb]), None);
    }

    #[test]
    fn test_rgb24_payload_shape() {
        let payload = rgb24_payload(ObjectId(7), &[0x00, 0x80, 0xff], 1, 1).unwrap();
        let text = String::from_utf8(payload).unwrap();
        assert!(text.starts_with("<<\r\n/Type /XObject\r\n/Name /Image7\r\n"));
        assert!(text.contains("/Filter /ASCIIHexDecode"));
        assert!(text.contains("0080FF>"));
        assert!(text.contains("/Length 7\r\n"));
        assert!(text.ends_with(">\r\nendstream\r\n"));
    }

    #[test]
    fn test_parse_ppm() {
        let mut ppm = b"P6\n# comment\n2 2\n255\n".to_vec();
        ppm.extend_from_slice(&[10; 12]);
        let (rgb, w, h) = parse_ppm(&ppm).unwrap();
        assert_eq!((w, h), (2, 2));
        assert_eq!(rgb.len(), 12);

        assert!(parse_ppm(b"P3\n2 2\n255\n").is_err());
        assert!(parse_ppm(b"P6\n2 2\n255\nxx").is_err());
    }

    #[test]
    fn test_add_jpeg_data_end_to_end() {
        let mut doc = Document::new(612.0, 792.0, None).unwrap();
        doc.append_page().unwrap();
        doc.add_jpeg_data(None, 10.0, 10.0, 64.0, 48.0, &fake_jfif(640, 480))
            .unwrap();
        let out = String::from_utf8_lossy(&doc.to_bytes().unwrap()).to_string();
        assert!(out.contains("/Filter /DCTDecode"));
        assert!(out.contains("/Width 640"));
        assert!(out.contains("/XObject <<"));
        assert!(out.contains("Do "));
    }
}
