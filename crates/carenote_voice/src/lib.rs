//! Voice capabilities for carenote.
//!
//! Dictation goes through [`SpeechToText`] and spoken replies through
//! [`TextToSpeech`]. No speech model ships with this crate; callers plug in
//! a backend, or use the deterministic implementations provided here.

mod stt;
mod tts;

pub use stt::{AudioFormat, SpeechToText, UnavailableStt, Utf8Transcript};
pub use tts::{OutputFormat, TextToSpeech};
