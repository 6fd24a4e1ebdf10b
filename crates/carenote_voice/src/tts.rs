//! Text-to-speech capability.

use anyhow::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Mp3,
    Wav,
    OggOpus,
}

/// Reads assistant replies aloud. Optional: callers treat absence or
/// failure as "no audio" and keep the text reply.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Raw audio bytes in [`TextToSpeech::output_format`].
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;

    fn output_format(&self) -> OutputFormat {
        OutputFormat::Mp3
    }

    /// Get the voice identifier being used
    fn voice_id(&self) -> &str;

    /// Get the name of this TTS provider
    fn provider_name(&self) -> &'static str;
}
