//! Strips markdown artifacts from model output so the letter pastes cleanly.

use std::sync::OnceLock;

use regex::Regex;

fn blank_line_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("static regex"))
}

/// Removes bold/italic asterisks, caps blank-line runs at one empty line, trims.
pub fn format_cover_letter(text: &str) -> String {
    let without_markup = text.replace("**", "").replace('*', "");
    blank_line_run()
        .replace_all(&without_markup, "\n\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_bold_and_italics() {
        assert_eq!(
            format_cover_letter("**Dear Hiring Manager,** I am *thrilled* to apply."),
            "Dear Hiring Manager, I am thrilled to apply."
        );
    }

    #[test]
    fn test_collapses_excess_blank_lines() {
        assert_eq!(
            format_cover_letter("Para one.\n\n\n\nPara two.\n\nPara three."),
            "Para one.\n\nPara two.\n\nPara three."
        );
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert_eq!(format_cover_letter("\n\n  Sincerely,\nJane  \n"), "Sincerely,\nJane");
    }

    #[test]
    fn test_markup_only_becomes_empty() {
        assert_eq!(format_cover_letter("** * **"), "");
    }
}
