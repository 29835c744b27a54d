use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path as RequestPath, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::CookieJar;

use crate::config::{Config, ROUTE_PREFIX, SYNC_COOKIE};
use crate::data::{content, listing, paths, playlist, watchstate};
use crate::error::Error;
use crate::model::entry::PRIORITY_EXTS;
use crate::render;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            // Traversal attempts look like any other miss; the filesystem
            // layout is not advertised.
            Error::NotFound | Error::PathTraversal => StatusCode::NOT_FOUND,
            Error::InvalidToken | Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Unsupported => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
            Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {self}");
        }
        (status, status.canonical_reason().unwrap_or("error").to_owned()).into_response()
    }
}

pub fn router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::permanent(ROUTE_PREFIX) }))
        .route(ROUTE_PREFIX, get(browse_root))
        // The wildcard below needs a non-empty remainder, so the bare
        // trailing-slash form gets its own route.
        .route("/files/", get(browse_root))
        .route("/files/sync", post(sync))
        .route("/files/*path", get(browse))
        .with_state(config)
}

async fn browse_root(
    State(config): State<Arc<Config>>,
    jar: CookieJar,
) -> Result<Response, Error> {
    serve_path(&config, &jar, "")
}

/// One wildcard route carries the whole read surface. The `/play` and
/// `/m3u8` suffixes are dispatched on the raw captured path before any
/// resolution, matching the URL shape `…/<file>/<verb>`.
async fn browse(
    State(config): State<Arc<Config>>,
    jar: CookieJar,
    headers: HeaderMap,
    RequestPath(path): RequestPath<String>,
) -> Result<Response, Error> {
    if let Some(inner) = path.strip_suffix("/play") {
        return player(&config, inner);
    }
    if let Some(inner) = path.strip_suffix("/m3u8") {
        return m3u8(&config, &headers, inner);
    }
    serve_path(&config, &jar, &path)
}

fn serve_path(config: &Config, jar: &CookieJar, raw: &str) -> Result<Response, Error> {
    let request_path = paths::normalize_request_path(raw);
    let resolved = paths::resolve(&config.media_root, &request_path)?;
    let metadata = std::fs::metadata(&resolved).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound
        } else {
            Error::Io(e)
        }
    })?;

    if metadata.is_dir() {
        let view = listing::list(config, raw)?;
        // A missing or broken cookie must not break browsing.
        let seen = jar
            .get(SYNC_COOKIE)
            .map(|c| watchstate::load(config, c.value()).unwrap_or_default())
            .unwrap_or_default();
        tracing::debug!(path = %view.request_path, entries = view.entries.len(), "listing");
        return Ok(Html(render::listing_page(&view, &seen)).into_response());
    }

    let name = request_path.trim_end_matches('/');
    let extension = listing::extension_of(name.rsplit('/').next().unwrap_or(name));
    if PRIORITY_EXTS.contains(&extension.as_str()) {
        let rendered = content::render(&resolved, &extension)?;
        let display = name.rsplit('/').next().unwrap_or(name);
        return Ok(Html(render::text_page(display, &rendered)).into_response());
    }

    // Raw bytes are the static server's job.
    match &config.accel_prefix {
        Some(prefix) => {
            let target = format!(
                "{}/{}",
                prefix.trim_end_matches('/'),
                render::href_escape(name)
            );
            Ok(([("x-accel-redirect", target)], ()).into_response())
        }
        None => Err(Error::Unsupported),
    }
}

fn player(config: &Config, raw: &str) -> Result<Response, Error> {
    let resource = raw.trim_matches('/');
    let resolved = paths::resolve(&config.media_root, resource)?;
    if !resolved.is_file() {
        return Err(Error::NotFound);
    }
    Ok(Html(render::player_page(resource)).into_response())
}

fn m3u8(config: &Config, headers: &HeaderMap, raw: &str) -> Result<Response, Error> {
    let resource = raw.trim_matches('/');
    let resolved = paths::resolve(&config.media_root, resource)?;
    if !resolved.is_file() {
        return Err(Error::NotFound);
    }

    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("http");
    let base = format!("{scheme}://{host}{ROUTE_PREFIX}");
    let body = playlist::emit(&base, resource);

    Ok((
        [
            (header::CONTENT_TYPE.as_str(), playlist::PLAYLIST_CONTENT_TYPE),
            (
                header::CONTENT_DISPOSITION.as_str(),
                playlist::PLAYLIST_DISPOSITION,
            ),
        ],
        body,
    )
        .into_response())
}

async fn sync(
    State(config): State<Arc<Config>>,
    jar: CookieJar,
    body: Bytes,
) -> Result<Response, Error> {
    let token = jar.get(SYNC_COOKIE).map(|c| c.value().to_owned());
    let kept = watchstate::save(&config, token.as_deref(), &body)?;
    tracing::info!(kept, "watch state replaced");
    Ok(format!("ok {kept}").into_response())
}
