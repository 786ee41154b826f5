//! Generates a sample document exercising most of the producer APIs.
//!
//! Usage: `generate_sample [output.pdf]`

use pdf_scribe::{Color, Document, DocumentInfo, PathOp, A4_HEIGHT, A4_WIDTH};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample.pdf".to_string());

    let info = DocumentInfo::new()
        .title("pdf_scribe sample")
        .author("pdf_scribe")
        .subject("API walkthrough");
    let mut doc = Document::new(A4_WIDTH, A4_HEIGHT, Some(info))?;

    doc.set_font("Helvetica")?;
    let first = doc.append_page()?;

    doc.add_text(None, "Page One", 24.0, 50.0, 780.0, Color::RED)?;
    doc.add_text(
        None,
        "Weird text () \\ # : - Wi-Fi",
        12.0,
        50.0,
        750.0,
        Color::BLACK,
    )?;
    doc.add_line(None, 50.0, 740.0, 300.0, 740.0, 2.0, Color::BLACK)?;
    doc.add_rectangle(None, 50.0, 600.0, 100.0, 100.0, 2.0, Color::BLUE)?;
    doc.add_filled_rectangle(None, 200.0, 600.0, 100.0, 100.0, 2.0, Color::GREEN)?;
    doc.add_circle(
        None,
        400.0,
        650.0,
        40.0,
        1.5,
        Color::BLACK,
        Some(Color::argb(0x80, 0xff, 0xa0, 0x00)),
    )?;
    doc.add_filled_polygon(
        None,
        &[(460.0, 600.0), (520.0, 600.0), (490.0, 660.0)],
        1.0,
        Color::BLUE,
    )?;
    doc.add_custom_path(
        None,
        &[
            PathOp::MoveTo(50.0, 500.0),
            PathOp::CurveTo(100.0, 560.0, 200.0, 440.0, 250.0, 500.0),
            PathOp::LineTo(250.0, 450.0),
            PathOp::ClosePath,
        ],
        1.0,
        Color::BLACK,
        None,
    )?;
    doc.add_barcode_128a(None, 50.0, 300.0, 200.0, 100.0, "ABCDEF", Color::BLACK)?;

    // A tiny generated gradient, embedded as raw RGB
    let (img_w, img_h) = (32u32, 32u32);
    let mut rgb = Vec::with_capacity((img_w * img_h * 3) as usize);
    for row in 0..img_h {
        for col in 0..img_w {
            rgb.push((col * 8) as u8);
            rgb.push((row * 8) as u8);
            rgb.push(0x60);
        }
    }
    doc.add_rgb24(None, 400.0, 300.0, 96.0, 96.0, &rgb, img_w, img_h)?;

    let chapter = doc.add_bookmark(Some(first), None, "First page")?;
    doc.add_bookmark(Some(first), Some(chapter), "Shapes")?;

    doc.append_page()?;
    doc.set_font("Times-Roman")?;
    let used = doc.add_text_wrap(
        None,
        "This is a really long line that will go off the edge of the \
         screen, because it is so long. The quick brown fox jumped over \
         the lazy dog.",
        12.0,
        60.0,
        780.0,
        Color::BLACK,
        300.0,
    )?;
    doc.add_text(
        None,
        "wrapped text above",
        10.0,
        60.0,
        770.0 - used,
        Color::rgb(0x60, 0x60, 0x60),
    )?;
    doc.add_bookmark(None, None, "Another page")?;

    doc.save(&path)?;
    println!("wrote {path}");
    Ok(())
}
