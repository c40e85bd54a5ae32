//! Axum route handlers for cover letter generation.

use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::generation::generator::{generate_cover_letter, PromptStyle};
use crate::generation::ApplicationDetails;
use crate::resume::{extract_resume_text, is_pdf_content_type, MAX_RESUME_BYTES};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

const ALL_FIELDS_REQUIRED: &str = "All fields are required.";

/// Fields that are absent, `null` or not strings deserialize as blank and fail
/// the completeness check.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicGenerateRequest {
    #[serde(deserialize_with = "string_or_blank")]
    pub name: String,
    #[serde(deserialize_with = "string_or_blank")]
    pub role: String,
    #[serde(deserialize_with = "string_or_blank")]
    pub company: String,
    #[serde(deserialize_with = "string_or_blank")]
    pub skills: String,
    #[serde(deserialize_with = "string_or_blank")]
    pub job_description: String,
}

fn string_or_blank<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

#[derive(Debug, Serialize)]
pub struct LetterResponse {
    pub letter: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterResponse {
    pub cover_letter: String,
}

/// Text fields and the optional résumé collected from the multipart form.
#[derive(Debug, Default)]
struct AdvancedForm {
    name: String,
    role: String,
    company: String,
    skills: String,
    job_description: String,
    resume: Option<Bytes>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/generate
///
/// JSON form with all five fields required. Returns `{ "letter": ... }`.
pub async fn handle_generate(
    State(state): State<AppState>,
    payload: Result<Json<BasicGenerateRequest>, JsonRejection>,
) -> Result<Json<LetterResponse>, AppError> {
    let Json(request) = payload.map_err(|e| {
        debug!(error = %e.body_text(), "Rejected /api/generate body");
        AppError::Validation(ALL_FIELDS_REQUIRED.to_string())
    })?;

    let details = ApplicationDetails::new(
        &request.name,
        &request.role,
        &request.company,
        &request.skills,
        &request.job_description,
    );
    if !details.is_complete() {
        return Err(AppError::Validation(ALL_FIELDS_REQUIRED.to_string()));
    }

    let letter = generate_cover_letter(state.llm.as_ref(), &details, PromptStyle::Basic).await?;

    Ok(Json(LetterResponse { letter }))
}

/// POST /api/generate-advanced
///
/// Multipart form: `name`, `role`, `company`, `skills` required, `jobDescription`
/// optional, `resume` an optional PDF. A résumé that fails to parse is dropped
/// and generation continues without it.
pub async fn handle_generate_advanced(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CoverLetterResponse>, AppError> {
    let form = read_advanced_form(multipart).await?;

    let mut details = ApplicationDetails::new(
        &form.name,
        &form.role,
        &form.company,
        &form.skills,
        &form.job_description,
    );
    if !details.missing_core_fields().is_empty() {
        return Err(AppError::Validation(
            "Missing required fields: name, role, company, skills".to_string(),
        ));
    }

    if let Some(data) = form.resume {
        match extract_resume_text(data).await {
            Ok(text) if !text.is_empty() => details.resume_text = Some(text),
            Ok(_) => warn!("Uploaded résumé contained no extractable text"),
            Err(e) => warn!(error = %e, "PDF parsing error, continuing without résumé"),
        }
    }

    let cover_letter =
        generate_cover_letter(state.llm.as_ref(), &details, PromptStyle::Advanced).await?;

    Ok(Json(CoverLetterResponse { cover_letter }))
}

async fn read_advanced_form(mut multipart: Multipart) -> Result<AdvancedForm, AppError> {
    let mut form = AdvancedForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "resume" => {
                // An empty file input still sends a part, with an empty filename.
                if field.file_name().map_or(true, str::is_empty) {
                    continue;
                }
                if !is_pdf_content_type(field.content_type()) {
                    return Err(AppError::UnsupportedUpload(
                        "Only PDF files are allowed".to_string(),
                    ));
                }
                let data = field.bytes().await.map_err(multipart_error)?;
                if data.len() > MAX_RESUME_BYTES {
                    return Err(AppError::PayloadTooLarge);
                }
                info!(bytes = data.len(), "Received résumé upload");
                form.resume = Some(data);
            }
            "name" | "role" | "company" | "skills" | "jobDescription" => {
                let value = field.text().await.map_err(multipart_error)?;
                let slot = match name.as_str() {
                    "name" => &mut form.name,
                    "role" => &mut form.role,
                    "company" => &mut form.company,
                    "skills" => &mut form.skills,
                    _ => &mut form.job_description,
                };
                *slot = value;
            }
            _ => {}
        }
    }

    Ok(form)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Validation(e.body_text())
    }
}
