//! Integration tests for image objects and their page resources.

use pdf_scribe::{Document, ObjectKind};

fn output(doc: &mut Document) -> String {
    String::from_utf8_lossy(&doc.to_bytes().expect("serialize")).to_string()
}

fn object_body(out: &str, id: usize) -> String {
    let marker = format!("{} 0 obj\r\n", id);
    let start = out.find(&marker).expect("object present") + marker.len();
    let end = out[start..].find("endobj\r\n").expect("endobj") + start;
    out[start..end].to_string()
}

#[test]
fn test_raw_image_payload_written_verbatim() {
    let mut doc = Document::new(612.0, 792.0, None).expect("create document");
    doc.append_page().expect("page");

    let id = doc.next_object_id();
    let payload = format!(
        "<<\r\n/Type /XObject\r\n/Name /Image{}\r\n/Subtype /Image\r\n/Width 1\r\n/Height 1\r\n/Length 3\r\n>>stream\r\nabc\r\nendstream\r\n",
        id.index()
    );
    let image = doc
        .add_raw_image(1, 1, payload.clone().into_bytes())
        .expect("image");
    assert_eq!(image, id);
    assert_eq!(doc.object_kind(image), Some(ObjectKind::Image));
    assert_eq!(doc.image_dimensions(image), Some((1, 1)));
    assert_eq!(doc.image_dimensions(id), doc.image_dimensions(image));

    let out = output(&mut doc);
    assert_eq!(object_body(&out, image.index()), payload);
}

#[test]
fn test_pages_list_images_as_xobjects() {
    let mut doc = Document::new(612.0, 792.0, None).expect("create document");
    doc.append_page().expect("page");
    doc.append_page().expect("page");

    // No images: no XObject resources at all
    let out = output(&mut doc);
    assert!(!out.contains("/XObject"));

    let rgb = [0u8; 12];
    doc.add_rgb24(None, 10.0, 10.0, 40.0, 40.0, &rgb, 2, 2)
        .expect("image");

    let out = output(&mut doc);
    // Both pages expose the image resource
    assert_eq!(out.matches("/XObject <<").count(), 2);
    let image_id = doc.object_count() - 2; // image precedes its placement stream
    assert_eq!(
        out.matches(&format!("/Image{} {} 0 R", image_id, image_id))
            .count(),
        2
    );
}

#[test]
fn test_rgb24_hex_encoding() {
    let mut doc = Document::new(612.0, 792.0, None).expect("create document");
    doc.append_page().expect("page");
    let rgb = [0x01, 0x23, 0x45, 0x67, 0x89, 0xab];
    doc.add_rgb24(None, 0.0, 0.0, 10.0, 10.0, &rgb, 2, 1)
        .expect("image");

    let out = output(&mut doc);
    assert!(out.contains("/Filter /ASCIIHexDecode"));
    assert!(out.contains("/Width 2"));
    assert!(out.contains("/Height 1"));
    assert!(out.contains("0123456789AB>"));
    // Placement stream scales and positions the XObject
    assert!(out.contains("q 10 0 0 10 0 0 cm"));
    assert!(out.contains("Do Q"));
}

#[test]
fn test_rgb24_size_mismatch_is_rejected() {
    let mut doc = Document::new(612.0, 792.0, None).expect("create document");
    doc.append_page().expect("page");
    let err = doc
        .add_rgb24(None, 0.0, 0.0, 10.0, 10.0, &[0u8; 5], 2, 2)
        .unwrap_err();
    assert_eq!(err.code(), -22);
}

#[test]
fn test_images_need_a_page() {
    let mut doc = Document::new(612.0, 792.0, None).expect("create document");
    let err = doc
        .add_rgb24(None, 0.0, 0.0, 10.0, 10.0, &[0u8; 3], 1, 1)
        .unwrap_err();
    assert_eq!(err.code(), -22);
    // Nothing was created
    assert_eq!(doc.object_count(), 5);
}

#[test]
fn test_ppm_file_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("pixel.ppm");
    let mut ppm = b"P6\n2 1\n255\n".to_vec();
    ppm.extend_from_slice(&[0xff, 0x00, 0x00, 0x00, 0xff, 0x00]);
    std::fs::write(&path, &ppm).expect("write ppm");

    let mut doc = Document::new(612.0, 792.0, None).expect("create document");
    doc.append_page().expect("page");
    doc.add_ppm_file(None, 10.0, 10.0, 20.0, 30.0, &path)
        .expect("ppm");

    let out = output(&mut doc);
    assert!(out.contains("/Width 2"));
    assert!(out.contains("/Height 1"));
    assert!(out.contains("FF0000"));

    // Non-P6 files are rejected
    let bad = dir.path().join("ascii.ppm");
    std::fs::write(&bad, b"P3\n1 1\n255\n1 2 3\n").expect("write ppm");
    let err = doc.add_ppm_file(None, 0.0, 0.0, 1.0, 1.0, &bad).unwrap_err();
    assert_eq!(err.code(), -22);
}
