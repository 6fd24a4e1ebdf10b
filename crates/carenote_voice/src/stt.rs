//! Speech-to-text capability.

use anyhow::{Context, Result};
use async_trait::async_trait;

/// Audio container of a dictation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    /// OGG Opus, common for browser and phone recordings.
    OggOpus,
    Webm,
    /// Raw PCM
    Pcm { sample_rate: u32, channels: u8 },
}

impl AudioFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
            Self::OggOpus => "audio/ogg",
            Self::Webm => "audio/webm",
            Self::Pcm { .. } => "audio/pcm",
        }
    }
}

/// Transcribes a dictation. The transcript is unredacted user text and must
/// go through redaction before it is stored or sent anywhere.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: &[u8], format: AudioFormat) -> Result<String>;

    /// Get the name of this STT provider
    fn provider_name(&self) -> &'static str;
}

/// Used when no speech backend is configured; every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStt;

#[async_trait]
impl SpeechToText for UnavailableStt {
    async fn transcribe(&self, _audio: &[u8], format: AudioFormat) -> Result<String> {
        anyhow::bail!(
            "no speech-to-text backend configured for {} input",
            format.mime_type()
        )
    }

    fn provider_name(&self) -> &'static str {
        "unavailable"
    }
}

/// Treats the payload as an already-transcribed UTF-8 text, e.g. a transcript
/// exported by the recording device.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Transcript;

#[async_trait]
impl SpeechToText for Utf8Transcript {
    async fn transcribe(&self, audio: &[u8], _format: AudioFormat) -> Result<String> {
        let text = std::str::from_utf8(audio).context("transcript is not valid UTF-8")?;
        Ok(text.trim().to_string())
    }

    fn provider_name(&self) -> &'static str {
        "utf8-transcript"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_types() {
        assert_eq!(AudioFormat::OggOpus.mime_type(), "audio/ogg");
        assert_eq!(AudioFormat::Webm.mime_type(), "audio/webm");
    }

    #[tokio::test]
    async fn test_unavailable_fails() {
        let err = UnavailableStt
            .transcribe(b"RIFF", AudioFormat::Wav)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("audio/wav"));
    }

    #[tokio::test]
    async fn test_utf8_transcript() {
        let text = Utf8Transcript
            .transcribe(b"  headache since monday \n", AudioFormat::Wav)
            .await
            .unwrap();
        assert_eq!(text, "headache since monday");

        assert!(Utf8Transcript
            .transcribe(&[0xff, 0xfe], AudioFormat::Mp3)
            .await
            .is_err());
    }
}
