use std::collections::HashSet;

use crate::config::{Config, ROUTE_PREFIX};
use crate::data::paths;
use crate::error::{Error, Result};

/// Read the set of resource identifiers a token has marked seen. A token
/// with no state file yet simply has nothing seen.
pub fn load(config: &Config, token: &str) -> Result<HashSet<String>> {
    let token = paths::validate_token(token)?;
    match std::fs::read_to_string(config.data_root().join(token)) {
        Ok(text) => Ok(text
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashSet::new()),
        Err(e) => Err(e.into()),
    }
}

/// Replace a token's persisted state with the `;`-separated identifiers in
/// `payload`. Candidates that do not name an existing file under the media
/// root are dropped silently; the client may have stale entries and that is
/// not its problem. Returns how many identifiers were retained.
///
/// The write replaces the whole prior file. Concurrent saves for one token
/// race at whole-file granularity: last writer wins.
pub fn save(config: &Config, token: Option<&str>, payload: &[u8]) -> Result<usize> {
    let token = token.ok_or(Error::Unauthorized)?;
    let token = paths::validate_token(token)?;
    if payload.len() > config.sync_max_bytes() {
        return Err(Error::PayloadTooLarge);
    }

    let payload = String::from_utf8_lossy(payload);
    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    for candidate in payload.split(';') {
        let candidate = candidate.trim();
        if candidate.is_empty() || !seen.insert(candidate) {
            continue;
        }
        // Only canonical route-prefixed identifiers count; the prefix must
        // end on a path boundary so "/filesfoo" cannot pass as "foo".
        let Some(rest) = candidate.strip_prefix(ROUTE_PREFIX) else {
            continue;
        };
        if !rest.starts_with('/') {
            continue;
        }
        let relative = rest.trim_start_matches('/');
        let Ok(resolved) = paths::resolve(&config.media_root, relative) else {
            continue;
        };
        if resolved.is_file() {
            kept.push(candidate.to_string());
        }
    }

    let dir = config.data_root();
    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join(token), kept.join("\n"))?;
    Ok(kept.len())
}
