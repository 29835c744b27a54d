use std::path::Path;

use pulldown_cmark::{html, Options, Parser};

use crate::error::{Error, Result};
use crate::model::entry::RenderedContent;

/// Render a single text-like asset for viewing. Dispatch is by extension:
/// markdown expands to sanitized HTML, legacy `.nfo` files get a permissive
/// single-byte decode, everything else is literal text. These files are
/// user-supplied and often malformed, so decoding never fails — undecodable
/// bytes are replaced.
pub fn render(path: &Path, extension: &str) -> Result<RenderedContent> {
    let bytes = read_bytes(path)?;
    Ok(match extension {
        ".md" => RenderedContent::Markup(markdown_to_html(&String::from_utf8_lossy(&bytes))),
        ".nfo" => RenderedContent::Preformatted(decode_legacy(&bytes)),
        _ => RenderedContent::Preformatted(String::from_utf8_lossy(&bytes).into_owned()),
    })
}

/// Render a markdown file straight to sanitized HTML (readme blocks).
pub fn render_markdown(path: &Path) -> Result<String> {
    let bytes = read_bytes(path)?;
    Ok(markdown_to_html(&String::from_utf8_lossy(&bytes)))
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound
        } else {
            Error::Io(e)
        }
    })
}

/// Markdown to HTML with XSS sanitization. Fenced code blocks are part of
/// the base dialect; tables and strikethrough are enabled on top.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);

    ammonia::clean(&out)
}

/// Strict UTF-8 first, then Latin-1, where every byte maps to a character.
/// Old scene info files are usually single-byte encoded ASCII art; a lossy
/// UTF-8 decode would shred it. Line endings are normalized.
fn decode_legacy(bytes: &[u8]) -> String {
    let text = match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    };
    text.replace("\r\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_expands_fenced_code() {
        let html = markdown_to_html("# Hi\n\n```\nlet x = 1;\n```\n");
        assert!(html.contains("<h1>"));
        assert!(html.contains("<pre>") || html.contains("<code>"));
        assert!(html.contains("let x = 1;"));
    }

    #[test]
    fn markdown_is_sanitized() {
        let html = markdown_to_html("hello <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("hello"));
    }

    #[test]
    fn legacy_decode_never_fails() {
        // 0xFF is never valid UTF-8; the whole buffer falls back to Latin-1.
        let text = decode_legacy(&[b'h', b'i', 0xFF, 0xB0, b'\r', b'\n', b'x']);
        assert_eq!(text, "hi\u{FF}\u{B0}\nx");
    }

    #[test]
    fn legacy_decode_keeps_valid_utf8() {
        let text = decode_legacy("héllo\r\nwörld".as_bytes());
        assert_eq!(text, "héllo\nwörld");
    }

    #[test]
    fn render_dispatches_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let md = dir.path().join("a.md");
        let txt = dir.path().join("a.txt");
        std::fs::write(&md, "**bold**").unwrap();
        std::fs::write(&txt, "<plain>").unwrap();

        match render(&md, ".md").unwrap() {
            RenderedContent::Markup(h) => assert!(h.contains("<strong>")),
            other => panic!("expected markup, got {other:?}"),
        }
        match render(&txt, ".txt").unwrap() {
            // Literal text is escaped by the view, not here.
            RenderedContent::Preformatted(t) => assert_eq!(t, "<plain>"),
            other => panic!("expected preformatted, got {other:?}"),
        }
    }

    #[test]
    fn render_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            render(&dir.path().join("gone.txt"), ".txt"),
            Err(Error::NotFound)
        ));
    }
}
