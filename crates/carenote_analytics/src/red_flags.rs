//! Emergency-term screening for free text.

pub const RED_FLAG_TERMS: &[&str] = &[
    "chest pain",
    "trouble breathing",
    "difficulty breathing",
    "fainting",
    "pass out",
    "severe allergic reaction",
    "confusion",
    "severe dehydration",
    "suicide",
    "kill myself",
    "self-harm",
    "severe bleeding",
];

/// Fixed reply used instead of an assistant answer when a red flag is present.
pub const SAFETY_MESSAGE: &str = "SAFETY ALERT: Seek urgent medical help immediately by calling local emergency services or going to the nearest emergency room. If you are a minor, please talk to a trusted adult right away.";

pub fn detect_red_flags(text: &str) -> bool {
    let lower = text.to_lowercase();
    RED_FLAG_TERMS.iter().any(|term| lower.contains(term))
}
