use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::response::{Html, IntoResponse, Response};
use hamming_core::{Artifact, MemorySink, MemorySource, RecordStats};
use http::{StatusCode, header};

use crate::AppState;
use crate::error::ApiError;

const INDEX_HTML: &str = include_str!("index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Multipart field `file`; replaces the current record on success.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<RecordStats>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_owned();
        let bytes = field.bytes().await?;
        let selection = state
            .session
            .select(MemorySource::new(name, bytes.to_vec()))
            .await?;
        return Ok(Json(RecordStats::of(selection.record())));
    }
    Err(ApiError::MissingFile)
}

pub async fn current(State(state): State<AppState>) -> Result<Json<RecordStats>, ApiError> {
    let record = state.session.require_current()?;
    Ok(Json(RecordStats::of(&record)))
}

pub async fn download(
    State(state): State<AppState>,
    Path(artifact): Path<String>,
) -> Result<Response, ApiError> {
    let artifact: Artifact = artifact.parse()?;
    let sink = MemorySink::default();
    if state.session.download(artifact, &sink)?.is_none() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    let Some((name, bytes)) = sink.take().pop() else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let disposition = attachment(&name);
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Quotes, backslashes and control characters would break or smuggle the header.
fn attachment(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| if c.is_control() || c == '"' || c == '\\' { '_' } else { c })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}

pub async fn preview(State(state): State<AppState>) -> Response {
    match state.session.preview() {
        Some(p) => Json(p).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
