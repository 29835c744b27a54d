use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Join a client-supplied relative path onto `root`, refusing anything that
/// could step outside it. Pure path arithmetic; the caller does the stat.
///
/// `..`, rooted, and drive-prefixed components are rejected outright rather
/// than normalized away, so no sequence of segments can escape regardless of
/// depth. `.` and empty segments are skipped.
pub fn resolve(root: &Path, relative: &str) -> Result<PathBuf> {
    let mut out = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(segment) => out.push(segment),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::PathTraversal)
            }
        }
    }
    Ok(out)
}

/// Normalize a request path to the display form used in views and links:
/// trailing-slash-terminated, no leading slash, "" for the root.
pub fn normalize_request_path(raw: &str) -> String {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}

const TOKEN_MAX_LEN: usize = 128;

/// Sync tokens double as watch-state file names, so they must be strict
/// filesystem-safe components before any path join.
pub fn validate_token(token: &str) -> Result<&str> {
    let ok = !token.is_empty()
        && token.len() <= TOKEN_MAX_LEN
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(token)
    } else {
        Err(Error::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_joins_plain_segments() {
        let out = resolve(Path::new("/srv/media"), "movies/a.mp4").unwrap();
        assert_eq!(out, PathBuf::from("/srv/media/movies/a.mp4"));
    }

    #[test]
    fn resolve_skips_dot_and_empty_segments() {
        let out = resolve(Path::new("/srv/media"), "./movies//./a.mp4").unwrap();
        assert_eq!(out, PathBuf::from("/srv/media/movies/a.mp4"));
    }

    #[test]
    fn resolve_rejects_parent_components_at_any_depth() {
        let root = Path::new("/srv/media");
        for bad in [
            "../etc/passwd",
            "../../etc/passwd",
            "movies/../../etc/passwd",
            "movies/../../../../../../etc/passwd",
            "..",
        ] {
            assert!(matches!(resolve(root, bad), Err(Error::PathTraversal)), "{bad}");
        }
    }

    #[test]
    fn resolve_rejects_absolute_paths() {
        assert!(matches!(
            resolve(Path::new("/srv/media"), "/etc/passwd"),
            Err(Error::PathTraversal)
        ));
    }

    #[test]
    fn request_path_normalization() {
        assert_eq!(normalize_request_path(""), "");
        assert_eq!(normalize_request_path("/"), "");
        assert_eq!(normalize_request_path("movies"), "movies/");
        assert_eq!(normalize_request_path("/movies/series/"), "movies/series/");
    }

    #[test]
    fn token_validation() {
        assert!(validate_token("abc-123_DEF").is_ok());
        assert!(validate_token("").is_err());
        assert!(validate_token("../sneaky").is_err());
        assert!(validate_token("a/b").is_err());
        assert!(validate_token("a b").is_err());
        assert!(validate_token(&"x".repeat(129)).is_err());
    }
}
