//! Hand-built HTML views. The data layer hands over ready-made structures;
//! everything untrusted is escaped here, and markdown arrives pre-sanitized.

use std::collections::HashSet;

use crate::config::ROUTE_PREFIX;
use crate::data::listing::{bytes_to_human, modified_human};
use crate::model::entry::{DirectoryView, EntryKind, RenderedContent};

pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode a path for use inside an href. Slashes are kept; they are
/// real separators here.
pub fn href_escape(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn js_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '<' => out.push_str("\\x3c"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

const STYLE: &str = "\
body{font-family:sans-serif;max-width:60em;margin:1em auto;padding:0 1em;background:#111;color:#ddd}\
a{color:#7ad;text-decoration:none}a:hover{text-decoration:underline}\
table{border-collapse:collapse;width:100%}\
td,th{padding:.25em .6em;text-align:left}\
tr:nth-child(even){background:#1a1a1a}\
td.num{text-align:right;white-space:nowrap}\
pre{background:#1a1a1a;padding:1em;overflow-x:auto}\
.readme{border-top:1px solid #333;margin-top:1em;padding-top:1em}\
.aux{color:#888;font-size:.9em;margin-left:.6em}\
video{width:100%;background:#000}";

fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
<title>{}</title><style>{STYLE}</style></head>\n<body>\n{body}\n</body></html>\n",
        html_escape(title)
    )
}

/// The directory listing page: breadcrumb, entry table with seen toggles on
/// videos, optional readme block, and the sync script.
pub fn listing_page(view: &DirectoryView, seen: &HashSet<String>) -> String {
    let title = if view.request_path.is_empty() {
        ROUTE_PREFIX.to_string()
    } else {
        format!("{ROUTE_PREFIX}/{}", view.request_path)
    };

    let mut body = format!("<h1>{}</h1>\n<table>\n", html_escape(&title));
    body.push_str("<tr><th></th><th>Name</th><th>Size</th><th>Modified</th></tr>\n");

    if !view.request_path.is_empty() {
        let trimmed = view.request_path.trim_end_matches('/');
        let parent_href = match trimmed.rfind('/') {
            Some(idx) => format!("{ROUTE_PREFIX}/{}", href_escape(&trimmed[..idx])),
            None => ROUTE_PREFIX.to_string(),
        };
        body.push_str(&format!(
            "<tr><td></td><td><a href=\"{parent_href}\">..</a></td><td></td><td></td></tr>\n"
        ));
    }

    for entry in &view.entries {
        let resource = format!("{ROUTE_PREFIX}/{}{}", view.request_path, entry.name);
        let href = href_escape(&resource);
        let (size, modified) = if entry.is_dir() {
            ("-".to_string(), String::new())
        } else {
            (bytes_to_human(entry.size), modified_human(entry.modified))
        };

        let seen_cell = if entry.kind == EntryKind::Video {
            format!(
                "<input type=\"checkbox\" class=\"seen-box\" title=\"seen\" data-id=\"{}\"{}>",
                html_escape(&resource),
                if seen.contains(&resource) { " checked" } else { "" }
            )
        } else {
            String::new()
        };

        let aux = if entry.kind == EntryKind::Video {
            format!(
                " <a class=\"aux\" href=\"{href}/play\">play</a>\
 <a class=\"aux\" href=\"{href}/m3u8\">m3u8</a>"
            )
        } else {
            String::new()
        };

        let display = if entry.is_dir() {
            format!("{}/", html_escape(&entry.name))
        } else {
            html_escape(&entry.name)
        };

        body.push_str(&format!(
            "<tr><td>{seen_cell}</td>\
<td><a href=\"{href}{}\">{display}</a>{aux}</td>\
<td class=\"num\">{size}</td><td class=\"num\">{modified}</td></tr>\n",
            if entry.is_dir() { "/" } else { "" }
        ));
    }
    body.push_str("</table>\n");

    if let Some(readme) = &view.readme {
        body.push_str(&format!("<div class=\"readme\">\n{readme}\n</div>\n"));
    }

    body.push_str(&sync_script(seen));
    page(&title, &body)
}

/// Seen-state sync: the page carries the token's full persisted set so that
/// a toggle can POST a complete replacement, not just this directory's rows.
fn sync_script(seen: &HashSet<String>) -> String {
    let mut ids: Vec<&String> = seen.iter().collect();
    ids.sort();
    let initial = ids
        .iter()
        .map(|id| js_string(id))
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "<script>\n\
(function () {{\n\
  var m = document.cookie.match(/(?:^|; )vidshelf_sync=([^;]+)/);\n\
  if (!m) {{\n\
    var bytes = crypto.getRandomValues(new Uint8Array(16));\n\
    var tok = Array.from(bytes, function (b) {{ return b.toString(16).padStart(2, '0'); }}).join('');\n\
    document.cookie = 'vidshelf_sync=' + tok + ';path=/;max-age=31536000';\n\
  }}\n\
  var seen = new Set([{initial}]);\n\
  document.querySelectorAll('input.seen-box').forEach(function (box) {{\n\
    box.addEventListener('change', function () {{\n\
      if (box.checked) seen.add(box.dataset.id); else seen.delete(box.dataset.id);\n\
      fetch('{ROUTE_PREFIX}/sync', {{ method: 'POST', body: Array.from(seen).join(';') }});\n\
    }});\n\
  }});\n\
}})();\n\
</script>\n"
    )
}

/// Player page: an HTML5 video element pointing at the raw resource, which
/// the external static server delivers.
pub fn player_page(resource_path: &str) -> String {
    let href = href_escape(&format!("{ROUTE_PREFIX}/{resource_path}"));
    let name = resource_path.rsplit('/').next().unwrap_or(resource_path);
    let body = format!(
        "<h1>{}</h1>\n<video controls preload=\"metadata\" src=\"{href}\"></video>\n\
<p><a href=\"{href}/m3u8\">open in player (m3u8)</a></p>\n",
        html_escape(name)
    );
    page(name, &body)
}

/// Single text-asset page. Markup is inserted verbatim (already sanitized);
/// literal text is escaped into a pre block.
pub fn text_page(name: &str, content: &RenderedContent) -> String {
    let body = match content {
        RenderedContent::Markup(html) => {
            format!("<h1>{}</h1>\n{html}\n", html_escape(name))
        }
        RenderedContent::Preformatted(text) => {
            format!("<h1>{}</h1>\n<pre>{}</pre>\n", html_escape(name), html_escape(text))
        }
    };
    page(name, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry::Entry;
    use std::time::SystemTime;

    fn video(name: &str) -> Entry {
        Entry {
            name: name.to_string(),
            extension: ".mp4".to_string(),
            kind: EntryKind::Video,
            size: 2048,
            modified: SystemTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn escaping() {
        assert_eq!(html_escape("<a & b>"), "&lt;a &amp; b&gt;");
        assert_eq!(href_escape("movies/a b#1.mp4"), "movies/a%20b%231.mp4");
    }

    #[test]
    fn listing_marks_seen_videos() {
        let view = DirectoryView {
            entries: vec![video("a.mp4"), video("b.mp4")],
            readme: None,
            request_path: String::new(),
        };
        let seen = HashSet::from(["/files/a.mp4".to_string()]);
        let html = listing_page(&view, &seen);

        assert!(html.contains("data-id=\"/files/a.mp4\" checked"));
        assert!(html.contains("data-id=\"/files/b.mp4\">"));
        assert!(html.contains("/files/a.mp4/play"));
        assert!(html.contains("/files/a.mp4/m3u8"));
    }

    #[test]
    fn listing_escapes_entry_names() {
        let mut entry = video("a<b>.mp4");
        entry.kind = EntryKind::Other;
        let view = DirectoryView {
            entries: vec![entry],
            readme: None,
            request_path: String::new(),
        };
        let html = listing_page(&view, &HashSet::new());
        assert!(html.contains("a&lt;b&gt;.mp4"));
        assert!(!html.contains("a<b>.mp4"));
    }

    #[test]
    fn text_page_escapes_preformatted() {
        let html = text_page(
            "notes.txt",
            &RenderedContent::Preformatted("<script>".to_string()),
        );
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<pre><script>"));
    }
}
