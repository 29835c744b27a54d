use std::path::Path;
use std::time::SystemTime;

use crate::config::Config;
use crate::data::{content, paths};
use crate::error::{Error, Result};
use crate::model::entry::{DirectoryView, Entry, EntryKind};

/// Extract the lower-cased extension (with dot) from a file name. A leading
/// dot alone is not an extension.
pub fn extension_of(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx..].to_ascii_lowercase(),
        _ => String::new(),
    }
}

/// Human-readable size with binary prefixes, one decimal place. Below 1 KiB
/// the raw byte count is shown.
pub fn bytes_to_human(n: u64) -> String {
    const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];
    for (i, unit) in UNITS.iter().enumerate().rev() {
        let threshold = 1u64 << ((i as u32 + 1) * 10);
        if n >= threshold {
            return format!("{:.1}{}", n as f64 / threshold as f64, unit);
        }
    }
    format!("{n}B")
}

/// Listing timestamp format, e.g. "07-Mar-2026 18:04".
pub fn modified_human(t: SystemTime) -> String {
    chrono::DateTime::<chrono::Local>::from(t)
        .format("%d-%b-%Y %H:%M")
        .to_string()
}

/// Stat `path` once and derive the entry's kind from the directory bit and
/// its extension. Returns `NotFound` when the path vanished between
/// enumeration and here; directory listing tolerates that by skipping.
pub fn classify(path: &Path, config: &Config) -> Result<Entry> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound
        } else {
            Error::Io(e)
        }
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = extension_of(&name);

    let kind = if metadata.is_dir() {
        EntryKind::Directory
    } else if config.is_video(&extension) {
        EntryKind::Video
    } else if config.is_allowed(&extension) {
        EntryKind::TextAsset
    } else {
        EntryKind::Other
    };

    Ok(Entry {
        name,
        extension,
        size: if metadata.is_dir() { 0 } else { metadata.len() },
        modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        kind,
    })
}

/// List one directory level: classify children, pull out the readme, apply
/// the visibility filter, and sort.
pub fn list(config: &Config, raw_path: &str) -> Result<DirectoryView> {
    let request_path = paths::normalize_request_path(raw_path);
    let dir = paths::resolve(&config.media_root, &request_path)?;

    let read_dir = std::fs::read_dir(&dir).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound
        } else {
            Error::Io(e)
        }
    })?;

    let mut children = Vec::new();
    for dirent in read_dir {
        let dirent = dirent?;
        match classify(&dirent.path(), config) {
            Ok(entry) => children.push(entry),
            // Vanished mid-scan; skip rather than failing the listing.
            Err(Error::NotFound) => continue,
            Err(e) => return Err(e),
        }
    }

    // The readme is rendered into the page, never listed.
    let mut readme = None;
    if let Some(pos) = children
        .iter()
        .position(|e| !e.is_dir() && e.name.eq_ignore_ascii_case("readme.md"))
    {
        let extracted = children.remove(pos);
        readme = content::render_markdown(&dir.join(&extracted.name)).ok();
    }

    // Filter into a fresh list, then sort; the collection is never mutated
    // while being traversed.
    let mut entries: Vec<Entry> = if config.hide_nonvideo {
        children
            .into_iter()
            .filter(|e| e.kind != EntryKind::Other)
            .collect()
    } else {
        children
    };

    entries.sort_by(|a, b| {
        (!a.is_dir())
            .cmp(&!b.is_dir())
            .then_with(|| a.name.cmp(&b.name))
    });

    // Stable pass: readable text files go first, everything else keeps the
    // directory-first/name order.
    let (mut front, rest): (Vec<_>, Vec<_>) = entries.into_iter().partition(Entry::is_priority);
    front.extend(rest);

    Ok(DirectoryView {
        entries: front,
        readme,
        request_path,
    })
}
