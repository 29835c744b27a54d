use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Maximum accepted `/files/sync` payload (bytes).
pub const SYNC_MAX_BYTES: usize = 1_000_000;

/// Route prefix all browser URLs live under.
pub const ROUTE_PREFIX: &str = "/files";

/// Cookie carrying the client's sync token.
pub const SYNC_COOKIE: &str = "vidshelf_sync";

const DEFAULT_LISTEN: &str = "0.0.0.0:8325";

fn default_video_exts() -> Vec<String> {
    [".webm", ".mp4", ".mkv", ".avi", ".mov", ".flv"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_allowed_exts() -> Vec<String> {
    [".srt", ".vtt", ".md", ".nfo", ".txt"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

/// Server configuration, loaded once at startup from `vidshelf.toml` and
/// passed by reference into every component. Nothing reads ambient state.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Root of the served media tree. Read-only to this process.
    pub media_root: PathBuf,

    /// Where per-token watch-state files live. Created on demand.
    pub data_root: Option<PathBuf>,

    /// Listen address, e.g. "0.0.0.0:8325".
    pub listen: Option<String>,

    /// Extensions treated as playable video (lower-case, with dot).
    #[serde(default = "default_video_exts")]
    pub video_exts: Vec<String>,

    /// Companion extensions kept alongside videos (subtitles, readmes, info).
    #[serde(default = "default_allowed_exts")]
    pub allowed_exts: Vec<String>,

    /// When true, file entries outside the video/allowed sets are hidden.
    #[serde(default = "default_true")]
    pub hide_nonvideo: bool,

    /// Internal-redirect prefix for the external static server
    /// (X-Accel-Redirect). Unset means raw file requests fail with 500.
    pub accel_prefix: Option<String>,

    /// Maximum accepted sync payload in bytes.
    pub sync_max_bytes: Option<usize>,
}

impl Config {
    /// A config with every default, serving `media_root`.
    pub fn with_root(media_root: PathBuf) -> Self {
        Config {
            media_root,
            data_root: None,
            listen: None,
            video_exts: default_video_exts(),
            allowed_exts: default_allowed_exts(),
            hide_nonvideo: true,
            accel_prefix: None,
            sync_max_bytes: None,
        }
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let raw = self.listen.as_deref().unwrap_or(DEFAULT_LISTEN);
        raw.parse()
            .with_context(|| format!("invalid listen address: {raw}"))
    }

    /// Watch-state directory. Defaults to a sibling of the media root.
    pub fn data_root(&self) -> PathBuf {
        match &self.data_root {
            Some(p) => p.clone(),
            None => self.media_root.with_file_name("vidshelf_state"),
        }
    }

    pub fn sync_max_bytes(&self) -> usize {
        self.sync_max_bytes.unwrap_or(SYNC_MAX_BYTES)
    }

    pub fn is_video(&self, ext: &str) -> bool {
        self.video_exts.iter().any(|e| e == ext)
    }

    pub fn is_allowed(&self, ext: &str) -> bool {
        self.allowed_exts.iter().any(|e| e == ext)
    }
}

/// Load config from the given TOML file. `media_root` must name a directory;
/// that is checked after CLI overrides are applied, not here.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("bad config in {}", path.display()))
}

#[cfg(test)]
pub fn test_config(media_root: &Path, data_root: &Path) -> Config {
    let mut config = Config::with_root(media_root.to_path_buf());
    config.data_root = Some(data_root.to_path_buf());
    config
}
