use std::time::SystemTime;

/// Priority extensions: readable text files promoted to the top of a listing.
pub const PRIORITY_EXTS: [&str; 3] = [".nfo", ".md", ".txt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    Video,
    TextAsset,
    Other,
}

/// One classified child of a listed directory. Kind is derived once from the
/// directory bit and the extension; nothing re-stats after classification.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Final path segment, as stored on disk.
    pub name: String,
    /// Lower-cased extension including the dot, or empty.
    pub extension: String,
    pub kind: EntryKind,
    /// Raw byte count; 0 for directories.
    pub size: u64,
    pub modified: SystemTime,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_priority(&self) -> bool {
        !self.is_dir() && PRIORITY_EXTS.contains(&self.extension.as_str())
    }
}

/// The rendered-ready result of listing one directory.
#[derive(Debug)]
pub struct DirectoryView {
    /// Filtered and sorted children.
    pub entries: Vec<Entry>,
    /// Rendered markup from a same-directory readme.md, which never appears
    /// in `entries`.
    pub readme: Option<String>,
    /// Normalized relative path, trailing-slash-terminated; "" is the root.
    pub request_path: String,
}

/// Output of rendering a single text-like asset.
#[derive(Debug)]
pub enum RenderedContent {
    /// Sanitized HTML; the view inserts it verbatim.
    Markup(String),
    /// Literal text; the view escapes it and wraps it in a pre block.
    Preformatted(String),
}
