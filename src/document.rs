//! The document: object factory, per-kind chains, and the mutation API.
//!
//! A [`Document`] exclusively owns every object in its store. Objects
//! refer to each other only through store indices, so the whole graph is
//! a plain ownership tree with index-based cross-references — no
//! reference counting, no interior mutability.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::object::{
    BookmarkPayload, FontPayload, ImagePayload, InfoDict, Object, ObjectId, ObjectKind,
    PagePayload, Payload,
};
use crate::store::ChunkedVec;
use crate::writer::serializer;
use crate::DocumentInfo;

/// Default string for unset info fields.
const PROGRAM_NAME: &str = "pdf_scribe";

/// An in-memory PDF document being built.
///
/// Construction creates the fixed singletons (info, pages root, catalog)
/// and selects Times-Roman as the current font. Content is added
/// incrementally — pages, streams, bookmarks, images — and [`save`]
/// serializes the whole graph in one pass.
///
/// Failures are returned as [`Result`]s and additionally recorded in a
/// per-document error slot readable through [`last_error`].
///
/// [`save`]: Document::save
/// [`last_error`]: Document::last_error
///
/// # Example
///
/// ```
/// use pdf_scribe::Document;
///
/// # fn main() -> pdf_scribe::Result<()> {
/// let mut doc = Document::new(612.0, 792.0, None)?;
/// doc.append_page()?;
/// doc.add_stream(None, "BT (Hi) Tj ET")?;
/// let bytes = doc.to_bytes()?;
/// assert!(bytes.starts_with(b"%PDF-1.2"));
/// # Ok(())
/// # }
/// ```
pub struct Document {
    store: ChunkedVec<Option<Object>>,
    width: f32,
    height: f32,
    /// Store index of the currently selected font object
    current_font: usize,
    first: [Option<usize>; ObjectKind::COUNT],
    last: [Option<usize>; ObjectKind::COUNT],
    counts: [usize; ObjectKind::COUNT],
    last_err: Option<(String, i32)>,
}

impl Document {
    /// Create a document with the given default page size in points and
    /// optional metadata.
    ///
    /// Unset metadata fields default to the program name; the date
    /// defaults to the current local time.
    pub fn new(width: f32, height: f32, info: Option<DocumentInfo>) -> Result<Document> {
        let mut doc = Document {
            store: ChunkedVec::new(),
            width,
            height,
            current_font: 0,
            first: [None; ObjectKind::COUNT],
            last: [None; ObjectKind::COUNT],
            counts: [0; ObjectKind::COUNT],
            last_err: None,
        };

        // Object 0 is reserved in PDF; park the sentinel there
        doc.add_object(Payload::None)?;
        doc.add_object(Payload::Info(resolve_info(info)))?;
        doc.add_object(Payload::Pages)?;
        doc.add_object(Payload::Catalog)?;
        doc.set_font_impl("Times-Roman")?;

        log::debug!("created {}x{} pt document", width, height);
        Ok(doc)
    }

    /// Default page width in points.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Default page height in points.
    pub fn height(&self) -> f32 {
        self.height
    }

    // ---- object factory and chain bookkeeping ----

    /// Allocate an object, assign the next index, and link it at the
    /// tail of its kind's chain.
    pub(crate) fn add_object(&mut self, payload: Payload) -> Result<usize> {
        let index = self.store.len();
        let kind = payload.kind().slot();
        let mut obj = Object::new(index, payload);
        obj.prev = self.last[kind];

        let appended = self.store.append(Some(obj))?;
        debug_assert_eq!(appended, index);

        if let Some(prev) = self.last[kind] {
            if let Some(prev_obj) = self.object_mut(prev) {
                prev_obj.next = Some(index);
            }
        }
        self.last[kind] = Some(index);
        if self.first[kind].is_none() {
            self.first[kind] = Some(index);
        }
        self.counts[kind] += 1;
        Ok(index)
    }

    /// Remove an object, nulling its slot and relinking its kind's chain
    /// by re-scanning the store in index order.
    ///
    /// Only used to roll back optimistic creations; indices are never
    /// reused.
    pub(crate) fn delete_object(&mut self, index: usize) {
        let Some(kind) = self.object(index).map(Object::kind) else {
            return;
        };
        self.store.set(index, None);
        let k = kind.slot();
        self.counts[k] -= 1;

        self.first[k] = None;
        let mut prev: Option<usize> = None;
        for i in 0..self.store.len() {
            if !matches!(self.object(i), Some(o) if o.kind() == kind) {
                continue;
            }
            if self.first[k].is_none() {
                self.first[k] = Some(i);
            }
            if let Some(p) = prev {
                if let Some(prev_obj) = self.object_mut(p) {
                    prev_obj.next = Some(i);
                }
            }
            if let Some(obj) = self.object_mut(i) {
                obj.prev = prev;
                obj.next = None;
            }
            prev = Some(i);
        }
        self.last[k] = prev;
    }

    pub(crate) fn object(&self, index: usize) -> Option<&Object> {
        self.store.get(index).and_then(|slot| slot.as_ref())
    }

    pub(crate) fn object_mut(&mut self, index: usize) -> Option<&mut Object> {
        self.store.get_mut(index).and_then(|slot| slot.as_mut())
    }

    pub(crate) fn store_len(&self) -> usize {
        self.store.len()
    }

    pub(crate) fn first_index(&self, kind: ObjectKind) -> Option<usize> {
        self.first[kind.slot()]
    }

    pub(crate) fn last_index(&self, kind: ObjectKind) -> Option<usize> {
        self.last[kind.slot()]
    }

    /// Walk all objects of one kind in creation order.
    pub(crate) fn chain(&self, kind: ObjectKind) -> KindChain<'_> {
        KindChain {
            doc: self,
            next: self.first[kind.slot()],
        }
    }

    // ---- introspection ----

    /// Total number of slots allocated so far, including the sentinel
    /// and any deleted slots.
    pub fn object_count(&self) -> usize {
        self.store.len()
    }

    /// Kind of the object behind `id`, or `None` if the slot was deleted
    /// or never existed.
    pub fn object_kind(&self, id: ObjectId) -> Option<ObjectKind> {
        self.object(id.0).map(Object::kind)
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.counts[ObjectKind::Page.slot()]
    }

    /// The most recently appended page, if any.
    pub fn last_page(&self) -> Option<ObjectId> {
        self.last[ObjectKind::Page.slot()].map(ObjectId)
    }

    /// Base name of the currently selected font.
    pub fn current_font_name(&self) -> &str {
        match self.object(self.current_font).map(|o| &o.payload) {
            Some(Payload::Font(f)) => &f.name,
            _ => "",
        }
    }

    /// `/F{n}` resource number of the currently selected font.
    pub fn current_font_index(&self) -> u32 {
        match self.object(self.current_font).map(|o| &o.payload) {
            Some(Payload::Font(f)) => f.resource,
            _ => 0,
        }
    }

    // ---- error slot ----

    /// Record a failure in the error slot and hand it back.
    pub(crate) fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            log::error!("{}", err);
            self.last_err = Some((err.to_string(), err.code()));
        }
        result
    }

    /// Message and code of the most recent failure, if one is pending.
    ///
    /// The code is a negated POSIX-style value, see [`Error::code`].
    pub fn last_error(&self) -> Option<(&str, i32)> {
        self.last_err.as_ref().map(|(msg, code)| (msg.as_str(), *code))
    }

    /// Acknowledge an outstanding error.
    pub fn clear_error(&mut self) {
        self.last_err = None;
    }

    // ---- mutation API ----

    /// Append a page sized to the document default.
    pub fn append_page(&mut self) -> Result<ObjectId> {
        let result = self.append_page_impl();
        self.track(result)
    }

    fn append_page_impl(&mut self) -> Result<ObjectId> {
        let index = self.add_object(Payload::Page(PagePayload {
            width: self.width,
            height: self.height,
            contents: Vec::new(),
        }))?;
        Ok(ObjectId(index))
    }

    /// Override the size of a single page.
    pub fn set_page_size(&mut self, page: ObjectId, width: f32, height: f32) -> Result<()> {
        let result = self.set_page_size_impl(page, width, height);
        self.track(result)
    }

    fn set_page_size_impl(&mut self, page: ObjectId, width: f32, height: f32) -> Result<()> {
        if width <= 0.0 || height <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "invalid page size {}x{}",
                width, height
            )));
        }
        match self.object_mut(page.0).map(|o| &mut o.payload) {
            Some(Payload::Page(p)) => {
                p.width = width;
                p.height = height;
                Ok(())
            }
            _ => Err(Error::InvalidArgument(format!(
                "object {} is not a page",
                page.0
            ))),
        }
    }

    /// Select the font used by subsequent text operations.
    ///
    /// Selecting a name that is already in use reuses the existing font
    /// object; a new name gets the next `/F{n}` resource number. The
    /// name is not validated here — width lookups in the text producers
    /// are where an unknown name surfaces.
    pub fn set_font(&mut self, font: &str) -> Result<ObjectId> {
        let result = self.set_font_impl(font);
        self.track(result)
    }

    fn set_font_impl(&mut self, font: &str) -> Result<ObjectId> {
        let mut last_resource = 0;
        let mut found = None;
        for (index, obj) in self.chain(ObjectKind::Font) {
            if let Payload::Font(f) = &obj.payload {
                if f.name == font {
                    found = Some(index);
                    break;
                }
                last_resource = f.resource;
            }
        }

        let index = match found {
            Some(index) => index,
            None => self.add_object(Payload::Font(FontPayload {
                name: font.to_string(),
                resource: last_resource + 1,
            }))?,
        };
        self.current_font = index;
        Ok(ObjectId(index))
    }

    /// Resolve an optional page handle, defaulting to the most recently
    /// appended page.
    pub(crate) fn resolve_page(&self, page: Option<ObjectId>) -> Result<usize> {
        match page {
            Some(id) => match self.object(id.0).map(Object::kind) {
                Some(ObjectKind::Page) => Ok(id.0),
                _ => Err(Error::InvalidArgument(format!(
                    "object {} is not a page",
                    id.0
                ))),
            },
            None => self.last[ObjectKind::Page.slot()]
                .ok_or_else(|| Error::InvalidArgument("no pages available".to_string())),
        }
    }

    /// Commit accumulated content-stream text to a page.
    ///
    /// Trailing carriage returns and newlines are stripped, the text is
    /// wrapped in a `stream` envelope with its `/Length`, and the new
    /// stream object is appended to the page's contents. With `page`
    /// unset the most recently appended page is used; committing with no
    /// pages at all is an error.
    pub fn add_stream(&mut self, page: Option<ObjectId>, text: &str) -> Result<ObjectId> {
        let result = self.add_stream_impl(page, text);
        self.track(result)
    }

    pub(crate) fn add_stream_impl(&mut self, page: Option<ObjectId>, text: &str) -> Result<ObjectId> {
        let page = self.resolve_page(page)?;

        // No trailing whitespace before `endstream`
        let body = text.trim_end_matches(['\r', '\n']);

        let mut buf = Vec::new();
        buf.try_reserve(body.len() + 48)?;
        write!(buf, "<< /Length {} >>stream\r\n", body.len())?;
        buf.extend_from_slice(body.as_bytes());
        buf.extend_from_slice(b"\r\nendstream\r\n");

        let index = self.add_object(Payload::Stream(Bytes::from(buf)))?;
        if let Some(Payload::Page(p)) = self.object_mut(page).map(|o| &mut o.payload) {
            p.contents.push(index);
        }
        Ok(ObjectId(index))
    }

    /// Add a bookmark pointing at a page.
    ///
    /// The first bookmark lazily creates the outline root. `parent`
    /// nests this bookmark under a previously created one; passing a
    /// handle that is not a bookmark rolls the optimistic creations back
    /// and fails.
    pub fn add_bookmark(
        &mut self,
        page: Option<ObjectId>,
        parent: Option<ObjectId>,
        name: &str,
    ) -> Result<ObjectId> {
        let result = self.add_bookmark_impl(page, parent, name);
        self.track(result)
    }

    fn add_bookmark_impl(
        &mut self,
        page: Option<ObjectId>,
        parent: Option<ObjectId>,
        name: &str,
    ) -> Result<ObjectId> {
        let page = self
            .resolve_page(page)
            .map_err(|_| Error::InvalidArgument("unable to add bookmark, no pages available".to_string()))?;

        let fresh_outline = if self.first[ObjectKind::Outline.slot()].is_none() {
            self.add_object(Payload::Outline)?;
            true
        } else {
            false
        };

        let index = self.add_object(Payload::Bookmark(BookmarkPayload {
            page,
            parent: None,
            name: name.to_string(),
            children: Vec::new(),
        }))?;

        if let Some(parent_id) = parent {
            let parent_ok = matches!(
                self.object(parent_id.0).map(Object::kind),
                Some(ObjectKind::Bookmark)
            ) && parent_id.0 != index;
            if !parent_ok {
                // Roll back what this call created
                self.delete_object(index);
                if fresh_outline {
                    if let Some(outline) = self.first[ObjectKind::Outline.slot()] {
                        self.delete_object(outline);
                    }
                }
                return Err(Error::InvalidArgument(format!(
                    "invalid parent bookmark {}",
                    parent_id.0
                )));
            }
            if let Some(Payload::Bookmark(b)) = self.object_mut(index).map(|o| &mut o.payload) {
                b.parent = Some(parent_id.0);
            }
            if let Some(Payload::Bookmark(p)) = self.object_mut(parent_id.0).map(|o| &mut o.payload)
            {
                p.children.push(index);
            }
        }

        Ok(ObjectId(index))
    }

    /// Add an image object from a fully pre-formatted object body
    /// (dictionary, encoded payload and stream envelope included).
    ///
    /// `width` and `height` are the pixel dimensions the payload
    /// declares. The higher-level image helpers build payloads and call
    /// this; it is public so callers with their own encoders can too.
    pub fn add_raw_image(
        &mut self,
        width: u32,
        height: u32,
        data: impl Into<Bytes>,
    ) -> Result<ObjectId> {
        let data = data.into();
        let result = self
            .add_object(Payload::Image(ImagePayload {
                width,
                height,
                data,
            }))
            .map(ObjectId);
        self.track(result)
    }

    /// Pixel dimensions of an image object, or `None` if `id` is not an
    /// image.
    pub fn image_dimensions(&self, id: ObjectId) -> Option<(u32, u32)> {
        match self.object(id.0).map(|o| &o.payload) {
            Some(Payload::Image(image)) => Some((image.width, image.height)),
            _ => None,
        }
    }

    /// The ID the next created object will receive. Image payload
    /// builders use this to emit a matching `/Name /Image{n}` entry.
    pub fn next_object_id(&self) -> ObjectId {
        ObjectId(self.store.len())
    }

    // ---- serialization entry points ----

    /// Serialize the document to a file.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let result = (|| -> Result<()> {
            let file = File::create(path.as_ref())?;
            let mut out = BufWriter::new(file);
            serializer::write_document(self, &mut out)?;
            out.flush()?;
            Ok(())
        })();
        if result.is_ok() {
            log::debug!("saved document to {}", path.as_ref().display());
        }
        self.track(result)
    }

    /// Serialize the document to any writer.
    pub fn save_to<W: Write>(&mut self, out: W) -> Result<()> {
        let result = serializer::write_document(self, out);
        self.track(result)
    }

    /// Serialize the document into a byte vector.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.save_to(&mut out)?;
        Ok(out)
    }
}

/// Iterator over `(index, object)` pairs of one kind, in creation order.
pub(crate) struct KindChain<'a> {
    doc: &'a Document,
    next: Option<usize>,
}

impl<'a> Iterator for KindChain<'a> {
    type Item = (usize, &'a Object);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next?;
        let obj = self.doc.object(index)?;
        self.next = obj.next;
        Some((index, obj))
    }
}

/// Fill unset metadata fields with their defaults.
fn resolve_info(info: Option<DocumentInfo>) -> InfoDict {
    let info = info.unwrap_or_default();
    let field = |value: Option<String>| value.unwrap_or_else(|| PROGRAM_NAME.to_string());
    InfoDict {
        creator: field(info.creator),
        producer: field(info.producer),
        title: field(info.title),
        author: field(info.author),
        subject: field(info.subject),
        date: info
            .date
            .unwrap_or_else(|| chrono::Local::now().format("%Y%m%d%H%M%SZ").to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_order() {
        let doc = Document::new(612.0, 792.0, None).unwrap();
        assert_eq!(doc.object_count(), 5);
        assert_eq!(doc.object_kind(ObjectId(0)), Some(ObjectKind::None));
        assert_eq!(doc.object_kind(ObjectId(1)), Some(ObjectKind::Info));
        assert_eq!(doc.object_kind(ObjectId(2)), Some(ObjectKind::Pages));
        assert_eq!(doc.object_kind(ObjectId(3)), Some(ObjectKind::Catalog));
        assert_eq!(doc.object_kind(ObjectId(4)), Some(ObjectKind::Font));
        assert_eq!(doc.current_font_name(), "Times-Roman");
        assert_eq!(doc.current_font_index(), 1);
    }

    #[test]
    fn test_font_reuse_and_new_resources() {
        let mut doc = Document::new(612.0, 792.0, None).unwrap();
        let times = doc.set_font("Times-Roman").unwrap();
        assert_eq!(times, ObjectId(4));
        assert_eq!(doc.current_font_index(), 1);

        let helv = doc.set_font("Helvetica").unwrap();
        assert_ne!(helv, times);
        assert_eq!(doc.current_font_index(), 2);

        assert_eq!(doc.set_font("Times-Roman").unwrap(), times);
        assert_eq!(doc.current_font_index(), 1);
    }

    #[test]
    fn test_page_chain() {
        let mut doc = Document::new(612.0, 792.0, None).unwrap();
        assert!(doc.last_page().is_none());
        let p1 = doc.append_page().unwrap();
        let p2 = doc.append_page().unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.last_page(), Some(p2));

        let pages: Vec<usize> = doc.chain(ObjectKind::Page).map(|(i, _)| i).collect();
        assert_eq!(pages, vec![p1.0, p2.0]);
    }

    #[test]
    fn test_stream_requires_a_page() {
        let mut doc = Document::new(612.0, 792.0, None).unwrap();
        let err = doc.add_stream(None, "BT (x) Tj ET").unwrap_err();
        assert_eq!(err.code(), -22);
        let (msg, code) = doc.last_error().unwrap();
        assert!(msg.contains("no pages"));
        assert_eq!(code, -22);
        doc.clear_error();
        assert!(doc.last_error().is_none());
    }

    #[test]
    fn test_bookmark_rollback_on_bad_parent() {
        let mut doc = Document::new(612.0, 792.0, None).unwrap();
        let page = doc.append_page().unwrap();

        let err = doc
            .add_bookmark(Some(page), Some(page), "broken")
            .unwrap_err();
        assert_eq!(err.code(), -22);
        // Both the bookmark and the lazily created outline were rolled back
        assert!(doc.first_index(ObjectKind::Outline).is_none());
        assert!(doc.first_index(ObjectKind::Bookmark).is_none());

        // The document is still usable
        let ok = doc.add_bookmark(Some(page), None, "works").unwrap();
        assert_eq!(doc.object_kind(ok), Some(ObjectKind::Bookmark));
        assert!(doc.first_index(ObjectKind::Outline).is_some());
    }

    #[test]
    fn test_delete_relinks_chain() {
        let mut doc = Document::new(612.0, 792.0, None).unwrap();
        doc.append_page().unwrap();
        let a = doc.add_bookmark(None, None, "a").unwrap();
        let b = doc.add_bookmark(None, None, "b").unwrap();
        let c = doc.add_bookmark(None, None, "c").unwrap();

        doc.delete_object(b.0);
        let chain: Vec<usize> = doc.chain(ObjectKind::Bookmark).map(|(i, _)| i).collect();
        assert_eq!(chain, vec![a.0, c.0]);
        assert_eq!(doc.first_index(ObjectKind::Bookmark), Some(a.0));
        assert_eq!(doc.last_index(ObjectKind::Bookmark), Some(c.0));
        assert!(doc.object(b.0).is_none());
        // Slot stays allocated; 5 initial objects, page, outline, 3 bookmarks
        assert_eq!(doc.object_count(), 10);
    }

    #[test]
    fn test_index_stability() {
        let mut doc = Document::new(612.0, 792.0, None).unwrap();
        let page = doc.append_page().unwrap();
        let stream = doc.add_stream(None, "BT (x) Tj ET").unwrap();
        for _ in 0..50 {
            doc.append_page().unwrap();
            doc.add_bookmark(None, None, "bm").unwrap();
        }
        assert_eq!(doc.object_kind(page), Some(ObjectKind::Page));
        assert_eq!(doc.object_kind(stream), Some(ObjectKind::Stream));
    }
}
