use crate::AppState;
use crate::api::error::AppError;
use crate::services::metadata::{Extraction, FileCategory};
use crate::services::scratch::ScratchFile;
use crate::utils::validation::sanitize_filename;
use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State, multipart::{MultipartError, MultipartRejection}},
    http::StatusCode,
};
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

pub const NO_FILE_MESSAGE: &str = "Nenhum arquivo enviado";
pub const INVALID_FILENAME_MESSAGE: &str = "Nome de arquivo inválido";
pub const UNSUPPORTED_MESSAGE: &str = "Formato não suportado. Use JPEG, PNG ou PDF.";

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub filename: String,
    #[schema(value_type = Object)]
    pub metadata: Extraction,
}

/// Multipart body accepted by `/upload`
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

struct UploadedFile {
    filename: String,
    bytes: Bytes,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// First `file` part that carries a filename; other parts are skipped
async fn read_upload(multipart: &mut Multipart) -> Result<Option<UploadedFile>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(Some(UploadedFile { filename, bytes }));
    }
    Ok(None)
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data", description = "JPEG, PNG or PDF file"),
    responses(
        (status = 200, description = "Metadata extracted; reader failures appear as metadata.error", body = UploadResponse),
        (status = 400, description = "Missing file, empty filename or unsupported format"),
        (status = 413, description = "Upload exceeds the configured size limit"),
        (status = 500, description = "Scratch storage failure")
    ),
    tag = "metadata"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    // A body that is not multipart at all carries no file part either
    let mut multipart = multipart.map_err(|e| {
        warn!("Rejected non-multipart upload: {}", e.body_text());
        AppError::BadRequest(NO_FILE_MESSAGE.to_string())
    })?;

    let upload = read_upload(&mut multipart)
        .await?
        .ok_or_else(|| AppError::BadRequest(NO_FILE_MESSAGE.to_string()))?;

    if upload.filename.is_empty() {
        return Err(AppError::BadRequest(INVALID_FILENAME_MESSAGE.to_string()));
    }

    let filename = sanitize_filename(&upload.filename);
    let scratch = ScratchFile::persist(&state.config.scratch_dir, &filename, &upload.bytes).await?;

    let category = FileCategory::from_filename(&filename);
    let Some(reader) = category.reader() else {
        warn!("Rejected unsupported upload: {}", filename);
        scratch.remove()?;
        return Err(AppError::BadRequest(UNSUPPORTED_MESSAGE.to_string()));
    };

    // Extraction and cleanup share the blocking task; the scratch dir is
    // dropped (and removed) even if the reader panics.
    let (metadata, cleanup) = tokio::task::spawn_blocking(move || {
        let metadata = reader(scratch.path());
        (metadata, scratch.remove())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?;
    cleanup?;

    match metadata.error() {
        Some(error) => warn!(
            "Extracted {} metadata from {} with error: {}",
            category.as_str(),
            filename,
            error
        ),
        None => info!("Extracted {} metadata from {}", category.as_str(), filename),
    }

    Ok(Json(UploadResponse { filename, metadata }))
}
