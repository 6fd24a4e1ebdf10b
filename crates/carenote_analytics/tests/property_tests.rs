//! Property-based tests for the note pipeline.

use carenote_analytics::{alerts, analyze, build_context, extract, redact, TrendSummary};
use carenote_core::{DiaryResult, MedicalEntities, Note};
use chrono::Utc;
use proptest::prelude::*;

fn diary_note(text: String, sentiment: f64) -> Note {
    let diary = DiaryResult {
        sentiment,
        tags: Default::default(),
        suggestions: vec![],
        summary: String::new(),
    };
    Note::diary(text, MedicalEntities::default(), diary, Utc::now())
}

/// Text built from fragments that look like the things redaction targets.
fn phi_like() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        Just("name: ".to_string()),
        Just("Patient Name ".to_string()),
        Just("DOB ".to_string()),
        Just("date of birth: ".to_string()),
        "[A-Z][a-z]{1,6} [A-Z][a-z]{1,6}",
        "[a-z.]{1,8}@[a-z]{1,6}\\.[a-z]{2,3}",
        "\\(?[0-9]{3}\\)?[-. ]?[0-9]{3}[-. ]?[0-9]{4}",
        "[0-9]{1,4}[-/][0-9]{1,2}[-/][0-9]{1,4}",
        "[ ,.:]{1,2}",
        "[a-z ]{1,10}",
    ];
    prop::collection::vec(fragment, 0..12).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn redaction_is_idempotent(text in "\\PC{0,200}") {
        let once = redact(&text);
        prop_assert_eq!(redact(&once), once);
    }

    #[test]
    fn redaction_is_idempotent_on_phi_like_text(text in phi_like()) {
        let once = redact(&text);
        prop_assert_eq!(redact(&once), once);
    }

    #[test]
    fn extraction_is_deterministic(text in "\\PC{0,200}") {
        prop_assert_eq!(extract(&text), extract(&text));
    }

    #[test]
    fn extracted_lists_are_sorted_and_distinct(text in "[a-z0-9 /:.]{0,120}") {
        let e = extract(&text);
        for (_, items) in e.categories() {
            prop_assert!(items.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn slope_follows_direction(start in -1.0f64..0.0, step in 0.01f64..0.1, n in 2usize..14) {
        let up: Vec<Note> = (0..n).map(|i| diary_note("x".into(), start + step * i as f64)).collect();
        prop_assert!(analyze(&up).unwrap().sentiment_slope > 0.0);

        let down: Vec<Note> = (0..n).map(|i| diary_note("x".into(), -start - step * i as f64)).collect();
        prop_assert!(analyze(&down).unwrap().sentiment_slope < 0.0);
    }

    #[test]
    fn context_never_exceeds_note_budget(texts in prop::collection::vec("[a-z]{0,200}", 0..10)) {
        let notes: Vec<Note> = texts.into_iter().map(|t| diary_note(t, 0.0)).collect();
        let ctx = build_context(&notes, true, true).unwrap();
        for line in ctx.lines().filter(|l| l.starts_with("- ")) {
            let (_, body) = line.split_once(": ").unwrap();
            prop_assert!(body.trim_end_matches("...").chars().count() <= 50);
        }
        prop_assert_eq!(ctx.trim(), ctx.as_str());
    }
}

#[test]
fn alert_boundary() {
    let at = TrendSummary {
        sentiment_slope: -0.1,
        ..Default::default()
    };
    assert!(alerts(&at).is_empty());
    let below = TrendSummary {
        sentiment_slope: -0.1000001,
        ..Default::default()
    };
    assert_eq!(alerts(&below).len(), 1);
}

#[test]
fn empty_inputs_are_safe() {
    assert!(analyze(&[]).unwrap().is_empty());
    assert!(alerts(&TrendSummary::default()).is_empty());
    assert_eq!(build_context(&[], false, false).unwrap(), "");
}
