// Prompt assembly for cover letter generation.

use crate::generation::ApplicationDetails;

/// Résumé text at or under this many characters is treated as noise and left out.
pub const MIN_RESUME_CHARS: usize = 50;
/// Only the head of a long résumé is sent to keep the prompt bounded.
pub const MAX_RESUME_CHARS: usize = 2000;
/// Job descriptions at or under this many characters are left out.
pub const MIN_JOB_DESCRIPTION_CHARS: usize = 10;

/// Requirements block for the basic (form-only) letter.
pub const BASIC_REQUIREMENTS: &str = "Requirements:
- 3 short paragraphs plus a closing line
- Friendly, confident tone
- No placeholders, no bullet lists
- Between 170 and 210 words (do not go below 170 words)
- Use complete sentences and end with a strong closing line";

/// Requirements block for the résumé-aware letter.
pub const ADVANCED_REQUIREMENTS: &str = "REQUIREMENTS:
- Personalize using resume achievements
- Match qualifications to job requirements
- Professional confident tone
- 3–5 structured paragraphs
- Include concrete examples
- No placeholder text
- Proper formatting

Write the complete personalized cover letter now:";

/// Prompt for `POST /api/generate`. Every field is expected to be present.
pub fn build_basic_prompt(details: &ApplicationDetails) -> String {
    format!(
        "Write a professional cover letter for {name} applying to the {role} role at {company}.\n\n\
         Use the following inputs:\n\
         - Key skills: {skills}\n\
         - Job description: {job_description}\n\n\
         {BASIC_REQUIREMENTS}",
        name = details.name,
        role = details.role,
        company = details.company,
        skills = details.skills,
        job_description = details.job_description,
    )
}

/// Prompt for `POST /api/generate-advanced`. Résumé and job description blocks
/// are only included when they carry enough text to be useful.
pub fn build_advanced_prompt(details: &ApplicationDetails) -> String {
    let mut prompt = format!(
        "Write a highly personalized, professional cover letter for {name} applying for the {role} position at {company}.\n\n\
         CANDIDATE INFORMATION:\n\
         Name: {name}\n\
         Target Role: {role}\n\
         Target Company: {company}\n\
         Key Skills: {skills}\n",
        name = details.name,
        role = details.role,
        company = details.company,
        skills = details.skills,
    );

    if let Some(resume) = details
        .resume_text
        .as_deref()
        .filter(|text| text.chars().count() > MIN_RESUME_CHARS)
    {
        prompt.push_str("\nRESUME CONTENT:\n");
        prompt.push_str(truncate_chars(resume, MAX_RESUME_CHARS));
        prompt.push('\n');
    }

    if details.job_description.chars().count() > MIN_JOB_DESCRIPTION_CHARS {
        prompt.push_str("\nJOB DESCRIPTION:\n");
        prompt.push_str(&details.job_description);
        prompt.push('\n');
    }

    prompt.push('\n');
    prompt.push_str(ADVANCED_REQUIREMENTS);
    prompt
}

/// Returns at most `max` characters of `text`, cut on a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
