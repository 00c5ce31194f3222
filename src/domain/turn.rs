use super::slots::SlotOp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Authentication block forwarded from the voice gateway.
///
/// Only `user_id` is interpreted; the remaining claims (biometric score,
/// liveness, channel, ...) are passed through to the backend untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

impl AuthContext {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            claims: Map::new(),
        }
    }

    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.claims.insert(name.into(), value.into());
        self
    }

    fn user(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// One inbound conversational turn, after intent and slot resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub session_id: String,
    pub locale: String,
    pub auth: AuthContext,
    pub utterance: String,
}

impl Turn {
    pub fn new(session_id: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            locale: locale.into(),
            auth: AuthContext::default(),
            utterance: String::new(),
        }
    }

    pub fn with_auth(mut self, auth: AuthContext) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_utterance(mut self, utterance: impl Into<String>) -> Self {
        self.utterance = utterance.into();
        self
    }

    /// Authenticated user id, else the session id. `None` when both are blank.
    pub fn subject_id(&self) -> Option<&str> {
        self.auth
            .user()
            .or(Some(self.session_id.as_str()).filter(|id| !id.is_empty()))
    }
}

/// A message sent back to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OutgoingMessage {
    Text { body: String },
    Audio { artifact_ref: String, locale: String },
}

impl OutgoingMessage {
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text { body: body.into() }
    }

    pub fn audio(artifact_ref: impl Into<String>, locale: impl Into<String>) -> Self {
        Self::Audio {
            artifact_ref: artifact_ref.into(),
            locale: locale.into(),
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Text { body } => Some(body),
            Self::Audio { .. } => None,
        }
    }
}

/// Everything a turn hands back to the dialogue engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TurnReply {
    pub messages: Vec<OutgoingMessage>,
    pub slots: Vec<SlotOp>,
}

impl TurnReply {
    pub fn texts(&self) -> Vec<&str> {
        self.messages.iter().filter_map(OutgoingMessage::body).collect()
    }

    pub fn audio_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| matches!(m, OutgoingMessage::Audio { .. }))
            .count()
    }

    /// Last value assigned to `name` in this turn, if any.
    pub fn slot(&self, name: &str) -> Option<&Value> {
        self.slots.iter().rev().find(|op| op.name == name).map(|op| &op.value)
    }
}
