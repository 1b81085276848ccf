use crate::domain::model::{file_stem_or, ConvertRequest, RenderedPdf};
use crate::http::error::ApiError;
use crate::http::state::AppState;
use crate::utils::error::AppError;
use crate::utils::validation::validate_markdown_filename;
use axum::extract::{Multipart, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

/// Editor UI served at `/`.
pub const INDEX_HTML: &str = include_str!("../../assets/index.html");

const UPLOAD_FIELD: &str = "file";

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn preview(
    State(state): State<AppState>,
    Json(request): Json<ConvertRequest>,
) -> Result<Html<String>, ApiError> {
    let html = state.service.preview(request.markdown).await?;
    Ok(Html(html))
}

pub async fn convert(
    State(state): State<AppState>,
    Json(request): Json<ConvertRequest>,
) -> Result<Response, ApiError> {
    let stem = request.download_stem_or(&state.default_title);
    let pdf = state.service.pdf(request.markdown, stem.clone()).await?;
    info!(filename = %stem, pages = pdf.pages, bytes = pdf.bytes.len(), "Converted document");
    pdf_response(pdf, &stem)
}

pub async fn convert_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let name = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.body_text()))?;
        upload = Some((name, data));
        break;
    }

    let Some((name, data)) = upload else {
        return Err(ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Field required: file",
        ));
    };

    let name = validate_markdown_filename(name.as_deref())?.to_string();
    let markdown = String::from_utf8(data.to_vec()).map_err(|_| AppError::InvalidEncoding)?;

    let stem = file_stem_or(&name, &state.default_title);
    let pdf = state.service.pdf(markdown, stem.clone()).await?;
    info!(filename = %name, pages = pdf.pages, bytes = pdf.bytes.len(), "Converted upload");
    pdf_response(pdf, &stem)
}

fn pdf_response(pdf: RenderedPdf, stem: &str) -> Result<Response, ApiError> {
    let disposition = HeaderValue::from_str(&content_disposition(stem)).map_err(|e| {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("invalid download name: {}", e),
        )
    })?;

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (CONTENT_DISPOSITION, disposition),
        ],
        pdf.bytes,
    )
        .into_response())
}

/// `attachment; filename="{stem}.pdf"`. Non-ASCII names also get an
/// RFC 5987 `filename*` parameter and an ASCII fallback.
pub fn content_disposition(stem: &str) -> String {
    let ascii: String = stem
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    if stem.is_ascii() && !stem.contains(['"', '\\']) {
        return format!("attachment; filename=\"{}.pdf\"", stem);
    }

    format!(
        "attachment; filename=\"{}.pdf\"; filename*=UTF-8''{}.pdf",
        ascii,
        urlencoding::encode(stem)
    )
}
