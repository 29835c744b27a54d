/// First line of every emitted playlist.
pub const PLAYLIST_HEADER: &str = "#EXTM3U";

/// Content type playlists are served with.
pub const PLAYLIST_CONTENT_TYPE: &str = "video/x-mpegurl";

/// Fixed download filename suggested to clients.
pub const PLAYLIST_DISPOSITION: &str = "filename=video.m3u8";

/// Build a single-entry playlist: the header marker and one absolute URL.
/// Pure string construction; the resource is not touched.
pub fn emit(base_url: &str, resource_path: &str) -> String {
    format!(
        "{PLAYLIST_HEADER}\n{}/{}",
        base_url.trim_end_matches('/'),
        resource_path.trim_matches('/')
    )
}
