use crate::{
    error::ServeError,
    negotiate::{decide, DeliveryDecision, Route},
    normalize::normalize,
    out, AppState,
};
use axum::{
    body::Body,
    extract::{Extension, Path, Request},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use std::io;
use std::path::Path as FsPath;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// `GET /:name`, disposition depends on who is asking
pub async fn direct_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
    request: Request,
) -> Response {
    let user_agent = user_agent(&headers);
    match serve_script(&state, &name, user_agent, Route::Direct, request).await {
        Ok(response) => response,
        Err(ServeError::NotFound) if name == crate::config::LANDING_PAGE => {
            let landing = state.config.landing_page();
            // The original request was consumed by the failed attempt
            respond(serve_file(&landing, Request::new(Body::empty())).await, &name)
        }
        Err(err) => respond(Err(err), &name),
    }
}

/// `GET /raw/:name`, always inline
pub async fn raw_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
    request: Request,
) -> Response {
    let user_agent = user_agent(&headers);
    let result = serve_script(&state, &name, user_agent, Route::Raw, request).await;
    respond(result, &name)
}

/// `GET /`, the landing page
pub async fn index_handler(
    Extension(state): Extension<Arc<AppState>>,
    request: Request,
) -> Response {
    let landing = state.config.landing_page();
    respond(serve_file(&landing, request).await, crate::config::LANDING_PAGE)
}

pub async fn not_found_handler() -> Response {
    ServeError::NotFound.into_response()
}

fn user_agent(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
}

fn respond(result: Result<Response, ServeError>, name: &str) -> Response {
    match result {
        Ok(response) => response,
        Err(err) => {
            match &err {
                ServeError::NotFound => out::debug("scripts", &format!("Not found: {}", name)),
                ServeError::Read { .. } => out::error("scripts", &err.to_string()),
            }
            err.into_response()
        }
    }
}

async fn serve_script(
    state: &AppState,
    name: &str,
    user_agent: Option<&str>,
    route: Route,
    request: Request,
) -> Result<Response, ServeError> {
    let decision = decide(name, user_agent, route);
    let path = state.config.script_path(name);

    if !decision.kind.is_text() {
        return serve_file(&path, request).await;
    }

    // One read attempt; a missing file surfaces as NotFound here
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| ServeError::from_io(path.clone(), e))?;

    let normalized = normalize(&content);
    if route == Route::Raw {
        out::debug(
            "scripts",
            &format!(
                "raw {}: {} chars in, {} chars out",
                name,
                content.chars().count(),
                normalized.chars().count()
            ),
        );
    }

    Ok(text_response(&decision, normalized.into_owned()))
}

fn text_response(decision: &DeliveryDecision, body: String) -> Response {
    let mut response = body.into_response();
    let headers = response.headers_mut();

    if let Some(content_type) = decision.content_type {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    if let Some(disposition) = decision.content_disposition() {
        // Names with control characters cannot go into a header
        if let Ok(value) = HeaderValue::from_bytes(disposition.as_bytes()) {
            headers.insert(header::CONTENT_DISPOSITION, value);
        }
    }

    response
}

/// Serve a file as-is, content type guessed from its extension.
async fn serve_file(path: &FsPath, request: Request) -> Result<Response, ServeError> {
    // ServeFile reports unreadable files as 404 and streams directories with a 200
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| ServeError::from_io(path.to_path_buf(), e))?;
    let meta = file
        .metadata()
        .await
        .map_err(|e| ServeError::from_io(path.to_path_buf(), e))?;
    if meta.is_dir() {
        return Err(ServeError::Read {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::Other, "is a directory"),
        });
    }
    drop(file);

    let response = ServeFile::new(path)
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});

    if response.status() == axum::http::StatusCode::NOT_FOUND {
        return Err(ServeError::NotFound);
    }
    Ok(response.map(Body::new))
}
