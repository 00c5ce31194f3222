use crate::domain::ports::SpeechSynthesizer;
use crate::error::SideEffectError;
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

const SUPPORTED_LANGUAGES: [&str; 7] = ["hi", "bn", "mr", "or", "ta", "te", "en"];
const DEFAULT_LANGUAGE: &str = "hi";

/// Voice used for a locale; unsupported locales are read in Hindi.
pub fn tts_language(locale: &str) -> &'static str {
    SUPPORTED_LANGUAGES
        .into_iter()
        .find(|lang| *lang == locale)
        .unwrap_or(DEFAULT_LANGUAGE)
}

/// Used when no speech service is configured. Replies go out as text only.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSynthesizer;

#[async_trait]
impl SpeechSynthesizer for DisabledSynthesizer {
    async fn synthesize(&self, _text: &str, _locale: &str) -> Result<String, SideEffectError> {
        Err(SideEffectError::Speech("speech synthesis disabled".into()))
    }
}

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    lang: &'a str,
}

/// Sends reply text to a TTS service and saves the returned MP3.
///
/// The artifact reference is the path of the saved file.
#[derive(Debug)]
pub struct HttpSpeechSynthesizer {
    http: reqwest::Client,
    service_url: String,
    output_dir: PathBuf,
    counter: AtomicU64,
}

impl HttpSpeechSynthesizer {
    pub fn new(service_url: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            http: reqwest::Client::new(),
            service_url: service_url.into(),
            output_dir: output_dir.into(),
            counter: AtomicU64::new(0),
        }
    }

    fn next_path(&self, locale: &str) -> PathBuf {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let lang = tts_language(locale);
        self.output_dir.join(format!("reply_{n:06}_{lang}.mp3"))
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSpeechSynthesizer {
    async fn synthesize(&self, text: &str, locale: &str) -> Result<String, SideEffectError> {
        let speech_error = |e: &dyn std::fmt::Display| SideEffectError::Speech(e.to_string());

        let resp = self
            .http
            .post(&self.service_url)
            .json(&SynthesisRequest {
                text,
                lang: tts_language(locale),
            })
            .send()
            .await
            .map_err(|e| speech_error(&e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SideEffectError::Speech(format!(
                "speech service answered with status {}",
                status.as_u16()
            )));
        }

        let audio = resp.bytes().await.map_err(|e| speech_error(&e))?;
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| speech_error(&e))?;
        let path = self.next_path(locale);
        tokio::fs::write(&path, &audio)
            .await
            .map_err(|e| speech_error(&e))?;

        debug!(path = %path.display(), bytes = audio.len(), "Saved synthesized reply");
        Ok(path.display().to_string())
    }
}
