//! Document object model.
//!
//! Every PDF indirect object the document will emit is an [`Object`]:
//! a header (index and same-kind chain links) plus a kind-specific
//! payload. Objects reference each other by store index only; there is
//! no shared ownership anywhere in the graph.

use bytes::Bytes;

/// Handle to an object inside a [`crate::Document`].
///
/// The wrapped index is assigned at creation, equals the object's
/// position in the document store, and identifies the same object until
/// the document is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub(crate) usize);

impl ObjectId {
    /// The store index (and PDF object number) behind this handle.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} 0 R", self.0)
    }
}

/// The kind of a document object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Reserved sentinel occupying index 0; never serialized
    None,
    /// Document metadata dictionary
    Info,
    /// Content stream attached to a page
    Stream,
    /// One of the 14 standard Type1 fonts
    Font,
    /// A page and its content-stream children
    Page,
    /// Outline entry pointing at a page
    Bookmark,
    /// Root of the bookmark tree, created lazily
    Outline,
    /// Document catalog
    Catalog,
    /// Root of the page tree
    Pages,
    /// Image XObject
    Image,
}

impl ObjectKind {
    /// Number of distinct kinds (for per-kind bookkeeping arrays).
    pub(crate) const COUNT: usize = 10;

    /// Index of this kind in per-kind bookkeeping arrays.
    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

/// Resolved metadata stored in the info object. All fields are filled
/// in at document construction.
#[derive(Debug, Clone)]
pub(crate) struct InfoDict {
    pub creator: String,
    pub producer: String,
    pub title: String,
    pub author: String,
    pub subject: String,
    /// `YYYYMMDDHHMMSSZ`, written with a `D:` prefix
    pub date: String,
}

/// Metadata for the output document header.
///
/// Fields left unset fall back to the program name (and the current
/// local time for the date) when the document is created.
///
/// # Example
///
/// ```
/// use pdf_scribe::DocumentInfo;
///
/// let info = DocumentInfo::new()
///     .title("Quarterly report")
///     .author("Example Corp");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub(crate) creator: Option<String>,
    pub(crate) producer: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) author: Option<String>,
    pub(crate) subject: Option<String>,
    pub(crate) date: Option<String>,
}

impl DocumentInfo {
    /// Create an empty metadata description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Software that created the document content.
    pub fn creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    /// Software that produced the PDF file.
    pub fn producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = Some(producer.into());
        self
    }

    /// Document title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Document author.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// What the document is about.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Creation date, `YYYYMMDDHHMMSS` plus a literal `Z`. Defaults to
    /// the current local time.
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }
}

/// Page payload: size plus the content streams drawn onto it.
#[derive(Debug)]
pub(crate) struct PagePayload {
    pub width: f32,
    pub height: f32,
    /// Store indices of this page's stream objects, in creation order
    pub contents: Vec<usize>,
}

/// Font payload. `resource` is the 1-based `/F{n}` number, unique among
/// fonts and assigned in creation order.
#[derive(Debug)]
pub(crate) struct FontPayload {
    pub name: String,
    pub resource: u32,
}

/// Bookmark payload. `page` and `parent` are non-owning store indices.
#[derive(Debug)]
pub(crate) struct BookmarkPayload {
    pub page: usize,
    pub parent: Option<usize>,
    pub name: String,
    /// Child bookmarks in creation order
    pub children: Vec<usize>,
}

/// Image payload: pixel dimensions plus the fully pre-formatted object
/// body (dictionary, encoded data and stream envelope).
#[derive(Debug)]
pub(crate) struct ImagePayload {
    pub width: u32,
    pub height: u32,
    pub data: Bytes,
}

/// Kind-specific object data.
#[derive(Debug)]
pub(crate) enum Payload {
    None,
    Info(InfoDict),
    /// Pre-formatted stream object body (envelope included)
    Stream(Bytes),
    Font(FontPayload),
    Page(PagePayload),
    Bookmark(BookmarkPayload),
    Outline,
    Catalog,
    Pages,
    Image(ImagePayload),
}

impl Payload {
    pub(crate) fn kind(&self) -> ObjectKind {
        match self {
            Payload::None => ObjectKind::None,
            Payload::Info(_) => ObjectKind::Info,
            Payload::Stream(_) => ObjectKind::Stream,
            Payload::Font(_) => ObjectKind::Font,
            Payload::Page(_) => ObjectKind::Page,
            Payload::Bookmark(_) => ObjectKind::Bookmark,
            Payload::Outline => ObjectKind::Outline,
            Payload::Catalog => ObjectKind::Catalog,
            Payload::Pages => ObjectKind::Pages,
            Payload::Image(_) => ObjectKind::Image,
        }
    }
}

/// One document object: header plus payload.
///
/// `prev`/`next` chain objects of the same kind in creation order, so
/// the serializer can walk "all fonts" or "all bookmarks" without
/// scanning the whole store.
#[derive(Debug)]
pub(crate) struct Object {
    pub index: usize,
    pub prev: Option<usize>,
    pub next: Option<usize>,
    pub payload: Payload,
}

impl Object {
    pub(crate) fn new(index: usize, payload: Payload) -> Self {
        Object {
            index,
            prev: None,
            next: None,
            payload,
        }
    }

    pub(crate) fn kind(&self) -> ObjectKind {
        self.payload.kind()
    }
}
