// Cover letter generation: field validation, prompt assembly, LLM call, cleanup.
// All LLM calls go through llm_client — handlers never talk to a provider directly.

pub mod formatter;
pub mod generator;
pub mod handlers;
pub mod prompts;

/// Everything the applicant submitted, trimmed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationDetails {
    pub name: String,
    pub role: String,
    pub company: String,
    pub skills: String,
    pub job_description: String,
    /// Cleaned text from an uploaded résumé, when one was parsed.
    pub resume_text: Option<String>,
}

impl ApplicationDetails {
    pub fn new(
        name: &str,
        role: &str,
        company: &str,
        skills: &str,
        job_description: &str,
    ) -> Self {
        Self {
            name: name.trim().to_string(),
            role: role.trim().to_string(),
            company: company.trim().to_string(),
            skills: skills.trim().to_string(),
            job_description: job_description.trim().to_string(),
            resume_text: None,
        }
    }

    /// Names of blank fields among those the advanced form requires.
    pub fn missing_core_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("role", &self.role),
            ("company", &self.company),
            ("skills", &self.skills),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    /// True when every field the basic form requires is present, job description included.
    pub fn is_complete(&self) -> bool {
        self.missing_core_fields().is_empty() && !self.job_description.is_empty()
    }
}
