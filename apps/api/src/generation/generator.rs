//! Cover letter pipeline: build prompt → LLM generate → strip markdown.

use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::formatter::format_cover_letter;
use crate::generation::prompts::{build_advanced_prompt, build_basic_prompt};
use crate::generation::ApplicationDetails;
use crate::llm_client::{LlmError, TextGenerator};

/// Which prompt template drives the generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// Fixed-length letter from form fields only.
    Basic,
    /// Résumé-aware letter with optional résumé and job description blocks.
    Advanced,
}

/// Generates a cleaned cover letter for `details` with the given prompt style.
pub async fn generate_cover_letter(
    llm: &dyn TextGenerator,
    details: &ApplicationDetails,
    style: PromptStyle,
) -> Result<String, AppError> {
    let request_id = Uuid::new_v4();
    let prompt = match style {
        PromptStyle::Basic => build_basic_prompt(details),
        PromptStyle::Advanced => build_advanced_prompt(details),
    };

    info!(
        %request_id,
        backend = llm.backend(),
        style = ?style,
        role = %details.role,
        company = %details.company,
        has_resume = details.resume_text.is_some(),
        prompt_chars = prompt.len(),
        "Generating cover letter"
    );

    let raw = llm.generate(&prompt).await?;
    let letter = format_cover_letter(&raw);
    if letter.is_empty() {
        return Err(AppError::Llm(LlmError::EmptyContent));
    }

    info!(%request_id, chars = letter.len(), "Cover letter generated");
    Ok(letter)
}


#[cfg(test)]
mod tests {
    use super::test_support::FakeGenerator;
    use super::*;

    fn details() -> ApplicationDetails {
        ApplicationDetails::new("Jane", "Engineer", "Acme", "Rust", "Build reliable services.")
    }

    #[tokio::test]
    async fn test_basic_style_uses_basic_prompt_and_formats() {
        let llm = FakeGenerator::replying("**Dear Acme,**\n\n\n\nI build things.\n");
        let letter = generate_cover_letter(&llm, &details(), PromptStyle::Basic)
            .await
            .unwrap();

        assert_eq!(letter, "Dear Acme,\n\nI build things.");
        let prompt = llm.last_prompt().unwrap();
        assert!(prompt.contains("- Key skills: Rust"));
    }

    #[tokio::test]
    async fn test_advanced_style_uses_advanced_prompt() {
        let llm = FakeGenerator::replying("Letter");
        generate_cover_letter(&llm, &details(), PromptStyle::Advanced)
            .await
            .unwrap();

        let prompt = llm.last_prompt().unwrap();
        assert!(prompt.contains("CANDIDATE INFORMATION:"));
    }

    #[tokio::test]
    async fn test_markup_only_reply_is_an_error() {
        let llm = FakeGenerator::replying("****");
        let err = generate_cover_letter(&llm, &details(), PromptStyle::Basic)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::EmptyContent)));
    }

    #[tokio::test]
    async fn test_provider_error_is_propagated() {
        let llm = FakeGenerator::failing(|| LlmError::Api {
            status: 400,
            message: "bad".into(),
        });
        let err = generate_cover_letter(&llm, &details(), PromptStyle::Advanced)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::Api { status: 400, .. })));
    }
}
