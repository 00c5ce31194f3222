use super::localizer::{Fields, ResponseLocalizer};
use super::session::SessionSlots;
use crate::domain::ports::{BankingBackend, BankingBackendBox, SpeechSynthesizerBox};
use crate::domain::turn::{AuthContext, OutgoingMessage, Turn};
use crate::error::{BackendError, FormatError, Result, SideEffectError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Static description of a backend action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub name: &'static str,
    pub success_template: &'static str,
    pub error_template: &'static str,
    pub timeout: Duration,
}

/// Who is asking, in which language, and what they said.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionContext {
    pub subject_id: String,
    /// Forwarded to the backend. `user_id` is always filled.
    pub auth: AuthContext,
    pub locale: String,
    pub utterance: String,
}

impl ActionContext {
    pub fn from_turn(turn: &Turn, default_subject: &str) -> Self {
        let subject_id = turn.subject_id().unwrap_or(default_subject).to_string();
        let mut auth = turn.auth.clone();
        if auth.user_id.as_deref().is_none_or(str::is_empty) {
            auth.user_id = Some(subject_id.clone());
        }
        Self {
            subject_id,
            auth,
            locale: turn.locale.clone(),
            utterance: turn.utterance.clone(),
        }
    }

    /// Same subject and locale, nothing said. Used when an action runs as a
    /// follow-up inside another action's turn.
    pub fn without_utterance(&self) -> Self {
        Self {
            utterance: String::new(),
            ..self.clone()
        }
    }
}

/// A template to render with its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateCall {
    pub key: &'static str,
    pub fields: Fields,
}

impl TemplateCall {
    pub fn new(key: &'static str, fields: Fields) -> Self {
        Self { key, fields }
    }
}

/// The reply text of an action, as templates joined with a space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presentation {
    pub parts: Vec<TemplateCall>,
}

impl Presentation {
    pub fn single(key: &'static str, fields: Fields) -> Self {
        Self {
            parts: vec![TemplateCall::new(key, fields)],
        }
    }

    pub fn then(mut self, key: &'static str, fields: Fields) -> Self {
        self.parts.push(TemplateCall::new(key, fields));
        self
    }
}

/// Result of preparing an action.
pub enum Prepared<R> {
    /// Send this request to the backend.
    Ready(R),
    /// Answer without calling the backend.
    Reply(Presentation),
}

/// One backend-calling action: how to build its request, how to call the
/// backend and how to word the result.
#[async_trait]
pub trait BankAction: Send + Sync {
    type Request: Send + Sync;
    type Response: Send;

    fn descriptor(&self) -> &ActionDescriptor;

    /// Builds the request from the session. May stage slot writes.
    async fn prepare(
        &self,
        ctx: &ActionContext,
        slots: &mut SessionSlots<'_>,
    ) -> Result<Prepared<Self::Request>>;

    async fn call(
        &self,
        backend: &dyn BankingBackend,
        request: &Self::Request,
    ) -> std::result::Result<Self::Response, BackendError>;

    /// Words a successful response. May stage slot writes.
    fn present(
        &self,
        ctx: &ActionContext,
        request: &Self::Request,
        response: Self::Response,
        slots: &mut SessionSlots<'_>,
    ) -> Presentation;
}

/// Runs [`BankAction`]s: one bounded backend attempt, a localized reply,
/// and a best-effort audio rendition of it.
pub struct ActionExecutor {
    backend: BankingBackendBox,
    localizer: ResponseLocalizer,
    speech: SpeechSynthesizerBox,
    speech_timeout: Duration,
}

impl ActionExecutor {
    pub fn new(
        backend: BankingBackendBox,
        localizer: ResponseLocalizer,
        speech: SpeechSynthesizerBox,
        speech_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            localizer,
            speech,
            speech_timeout,
        }
    }

    pub fn localizer(&self) -> &ResponseLocalizer {
        &self.localizer
    }

    /// Never fails: every error ends in the action's error template. Slot
    /// writes staged by a failed action are dropped.
    pub async fn execute<A: BankAction>(
        &self,
        action: &A,
        ctx: &ActionContext,
        slots: &mut SessionSlots<'_>,
    ) -> Vec<OutgoingMessage> {
        let descriptor = action.descriptor();
        let checkpoint = slots.checkpoint();

        let request = match action.prepare(ctx, slots).await {
            Ok(Prepared::Ready(request)) => request,
            Ok(Prepared::Reply(presentation)) => {
                return match self.render(&presentation, &ctx.locale) {
                    Ok(text) => self.deliver(text, &ctx.locale).await,
                    Err(e) => {
                        error!(action = descriptor.name, error = %e, "Failed to render reply");
                        self.failure(descriptor, &ctx.locale).await
                    }
                };
            }
            Err(e) => {
                error!(action = descriptor.name, subject = %ctx.subject_id, error = %e, "Failed to prepare action");
                slots.rollback(checkpoint);
                return self.failure(descriptor, &ctx.locale).await;
            }
        };

        let call = action.call(self.backend.as_ref(), &request);
        let outcome = match tokio::time::timeout(descriptor.timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => Err(BackendError::Timeout(descriptor.timeout)),
        };

        match outcome {
            Ok(response) => {
                debug!(action = descriptor.name, subject = %ctx.subject_id, "Backend call succeeded");
                let presentation = action.present(ctx, &request, response, slots);
                match self.render(&presentation, &ctx.locale) {
                    Ok(text) => self.deliver(text, &ctx.locale).await,
                    Err(e) => {
                        // The backend already acted, so the slot updates stand.
                        error!(action = descriptor.name, error = %e, "Failed to render reply");
                        self.failure(descriptor, &ctx.locale).await
                    }
                }
            }
            Err(e) => {
                warn!(action = descriptor.name, subject = %ctx.subject_id, error = %e, "Backend call failed");
                slots.rollback(checkpoint);
                self.failure(descriptor, &ctx.locale).await
            }
        }
    }

    /// Renders a single template and delivers it.
    pub async fn respond(&self, key: &'static str, locale: &str, fields: Fields) -> Vec<OutgoingMessage> {
        let text = self.render(&Presentation::single(key, fields), locale).unwrap_or_else(|e| {
            error!(template = key, error = %e, "Failed to render reply");
            String::new()
        });
        self.deliver(text, locale).await
    }

    /// One text message, then audio if the synthesizer manages.
    pub async fn deliver(&self, text: String, locale: &str) -> Vec<OutgoingMessage> {
        if text.is_empty() {
            return vec![OutgoingMessage::text(text)];
        }
        let synthesis = tokio::time::timeout(self.speech_timeout, self.speech.synthesize(&text, locale))
            .await
            .unwrap_or_else(|_| {
                Err(SideEffectError::Speech(format!(
                    "no audio after {:?}",
                    self.speech_timeout
                )))
            });
        let audio = match synthesis {
            Ok(artifact) => Some(OutgoingMessage::audio(artifact, locale)),
            Err(e) => {
                warn!(locale, error = %e, "Speech synthesis failed, replying with text only");
                None
            }
        };
        let mut messages = vec![OutgoingMessage::text(text)];
        messages.extend(audio);
        messages
    }

    fn render(&self, presentation: &Presentation, locale: &str) -> std::result::Result<String, FormatError> {
        let mut rendered = Vec::with_capacity(presentation.parts.len());
        for part in &presentation.parts {
            let text = self.localizer.render(part.key, locale, &part.fields)?;
            if !text.is_empty() {
                rendered.push(text);
            }
        }
        Ok(rendered.join(" "))
    }

    async fn failure(&self, descriptor: &ActionDescriptor, locale: &str) -> Vec<OutgoingMessage> {
        self.respond(descriptor.error_template, locale, Fields::new()).await
    }
}
