//! Best-effort PHI redaction.
//!
//! Four independent pattern rules applied in order. Redaction is total and
//! idempotent, but it only masks what the patterns see: unlabeled names and
//! dates pass through, and any labeled pair of words is masked even if it is
//! not a name.

use regex::Regex;
use std::sync::LazyLock;

pub const EMAIL_PLACEHOLDER: &str = "[REDACTED_EMAIL]";
pub const PHONE_PLACEHOLDER: &str = "[REDACTED_PHONE]";
pub const DOB_PLACEHOLDER: &str = "[REDACTED_DOB]";
pub const NAME_PLACEHOLDER: &str = "[REDACTED_NAME]";

static RE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.-]+@[\w.-]+\.\w+").unwrap());
static RE_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap());
static RE_DOB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(dob|date of birth|birthdate)[\s:]*\d{1,4}[-/]\d{1,2}[-/]\d{1,4}").unwrap()
});
// Case-insensitive throughout: a labeled lowercase name is masked too.
static RE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(patient name|name)[\s:]+[A-Z][a-z]+ [A-Z][a-z]+").unwrap()
});

/// Mask emails, phone numbers, labeled dates of birth and labeled names.
pub fn redact(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = RE_EMAIL.replace_all(text, EMAIL_PLACEHOLDER);
    let text = RE_PHONE.replace_all(&text, PHONE_PLACEHOLDER);
    let text = RE_DOB.replace_all(&text, format!("${{1}}: {}", DOB_PLACEHOLDER).as_str());
    let text = RE_NAME.replace_all(&text, format!("${{1}}: {}", NAME_PLACEHOLDER).as_str());
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_and_phone() {
        let out = redact("Contact me at a@b.com or 555-123-4567");
        assert_eq!(out, "Contact me at [REDACTED_EMAIL] or [REDACTED_PHONE]");
    }

    #[test]
    fn test_phone_variants() {
        assert_eq!(redact("(555) 123-4567"), PHONE_PLACEHOLDER);
        assert_eq!(redact("555.123.4567"), PHONE_PLACEHOLDER);
        assert_eq!(redact("5551234567"), PHONE_PLACEHOLDER);
    }

    #[test]
    fn test_dob_keeps_label() {
        assert_eq!(redact("DOB: 01/02/1990"), "DOB: [REDACTED_DOB]");
        assert_eq!(
            redact("date of birth 1990-01-02, allergic to nuts"),
            "date of birth: [REDACTED_DOB], allergic to nuts"
        );
        assert_eq!(redact("Birthdate:3/4/85"), "Birthdate: [REDACTED_DOB]");
    }

    #[test]
    fn test_name_keeps_label() {
        assert_eq!(
            redact("Patient Name: John Smith, 45y"),
            "Patient Name: [REDACTED_NAME], 45y"
        );
        assert_eq!(redact("name Jane Doe"), "name: [REDACTED_NAME]");
    }

    #[test]
    fn test_unlabeled_names_survive() {
        assert_eq!(redact("Saw John Smith today"), "Saw John Smith today");
    }

    #[test]
    fn test_lowercase_labeled_names_masked() {
        assert_eq!(redact("patient name: john smith"), "patient name: [REDACTED_NAME]");
        assert_eq!(redact("NAME: JANE DOE, 30y"), "NAME: [REDACTED_NAME], 30y");
        let once = redact("name: john smith");
        assert_eq!(redact(&once), once);
    }

    #[test]
    fn test_clinical_text_untouched() {
        let text = "BP 120/80, HR 72, temp 98.6, headache for 3 days";
        assert_eq!(redact(text), text);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(redact(""), "");
    }

    #[test]
    fn test_idempotent_on_known_patterns() {
        let once = redact("Name: Ann Lee, DOB 1/2/1980, ann.lee@mail.org, (555) 987-6543");
        assert_eq!(redact(&once), once);
        assert!(!once.contains('@'));
        assert!(once.contains(NAME_PLACEHOLDER));
        assert!(once.contains(DOB_PLACEHOLDER));
    }
}
