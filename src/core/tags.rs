//! Tag Classifier
//!
//! Maps an isolated `<...>` span to its kind and the depth change it causes.
//! The marker table is ordered most specific first: markers whose content may
//! itself contain `<` or `>` are tested before the generic element rules, and
//! self-closing is tested before opening.

/// Kind of markup a span represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Processing instruction or XML declaration: `<?...?>`
    ProcessingInstruction,
    /// Comment: `<!--...-->`
    Comment,
    /// CDATA section: `<![CDATA[...]]>`
    CData,
    /// DOCTYPE and other `<!...>` declarations
    Declaration,
    /// Closing tag: `</name>`
    Closing,
    /// Self-closing element: `<name/>`
    SelfClosing,
    /// Opening tag: `<name>`
    Opening,
}

/// One row of the marker table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagMarker {
    pub kind: TagKind,
    pub open: &'static [u8],
    pub close: &'static [u8],
    pub depth_delta: i64,
}

impl TagMarker {
    const fn new(kind: TagKind, open: &'static [u8], close: &'static [u8], depth_delta: i64) -> Self {
        TagMarker { kind, open, close, depth_delta }
    }

    /// Whether the content between the markers may contain a literal `>`
    #[inline]
    pub fn allows_literal_gt(&self) -> bool {
        matches!(self.kind, TagKind::Comment | TagKind::CData)
    }

    /// Check the marker against a span's prefix and suffix
    #[inline]
    fn matches(&self, span: &[u8]) -> bool {
        span.starts_with(self.open) && span.ends_with(self.close)
    }
}

/// Marker table, checked in order
pub const TAG_MARKERS: [TagMarker; 7] = [
    TagMarker::new(TagKind::ProcessingInstruction, b"<?", b"?>", 0),
    TagMarker::new(TagKind::Comment, b"<!--", b"-->", 0),
    TagMarker::new(TagKind::CData, b"<![CDATA[", b"]]>", 0),
    TagMarker::new(TagKind::Declaration, b"<!", b">", 0),
    TagMarker::new(TagKind::Closing, b"</", b">", -1),
    TagMarker::new(TagKind::SelfClosing, b"<", b"/>", 0),
    TagMarker::new(TagKind::Opening, b"<", b">", 1),
];

/// Markers whose real closer has to be searched for when a `>` shows up early
pub const LITERAL_GT_MARKERS: [TagMarker; 2] = [TAG_MARKERS[1], TAG_MARKERS[2]];

/// Classify a `<...>` span. Returns `None` only for input the scanner never produces.
pub fn classify(span: &[u8]) -> Option<&'static TagMarker> {
    TAG_MARKERS.iter().find(|marker| marker.matches(span))
}

/// Find the literal-`>` marker a span starts with, if any
#[inline]
pub fn literal_gt_marker(span: &[u8]) -> Option<&'static TagMarker> {
    LITERAL_GT_MARKERS.iter().find(|marker| span.starts_with(marker.open))
}
