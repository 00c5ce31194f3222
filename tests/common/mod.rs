#![allow(dead_code)]

use async_trait::async_trait;
use sahayak::application::assistant::{Assistant, Collaborators, Intent};
use sahayak::application::localizer::TemplateRegistry;
use sahayak::config::AssistantConfig;
use sahayak::domain::ports::{SlotStore, SpeechSynthesizer, SpeechSynthesizerBox};
use sahayak::domain::turn::{AuthContext, Turn, TurnReply};
use sahayak::error::SideEffectError;
use sahayak::infrastructure::clock::ManualClock;
use sahayak::infrastructure::codes::FixedCodeGenerator;
use sahayak::infrastructure::delivery::SmsOutbox;
use sahayak::infrastructure::in_memory::{InMemoryChallengeStore, InMemorySlotStore};
use sahayak::infrastructure::simulated_bank::SimulatedBank;
use sahayak::infrastructure::speech::DisabledSynthesizer;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const SUBJECT: &str = "cust_1";
pub const CODE: &str = "482913";

/// Hands out `audio://N` references and remembers what it was asked to say.
#[derive(Debug, Default, Clone)]
pub struct RecordingSynthesizer {
    pub calls: Arc<Mutex<Vec<(String, String)>>>,
}

#[async_trait]
impl SpeechSynthesizer for RecordingSynthesizer {
    async fn synthesize(&self, text: &str, locale: &str) -> Result<String, SideEffectError> {
        let mut calls = self.calls.lock().await;
        calls.push((text.to_string(), locale.to_string()));
        Ok(format!("audio://{}", calls.len()))
    }
}

/// An assistant wired to in-process collaborators that tests can inspect.
pub struct Harness {
    pub assistant: Assistant,
    pub bank: SimulatedBank,
    pub outbox: SmsOutbox,
    pub clock: ManualClock,
    pub challenges: InMemoryChallengeStore,
    pub store: InMemorySlotStore,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(AssistantConfig::default(), Box::new(DisabledSynthesizer))
    }

    pub fn with_speech(speech: SpeechSynthesizerBox) -> Self {
        Self::build(AssistantConfig::default(), speech)
    }

    /// Every challenge issued by this assistant carries `code`.
    pub fn with_code(code: &str) -> Self {
        Self::build_with_code(AssistantConfig::default(), Box::new(DisabledSynthesizer), code)
    }

    pub fn build(config: AssistantConfig, speech: SpeechSynthesizerBox) -> Self {
        Self::build_with_code(config, speech, CODE)
    }

    fn build_with_code(config: AssistantConfig, speech: SpeechSynthesizerBox, code: &str) -> Self {
        let bank = SimulatedBank::demo();
        let outbox = SmsOutbox::new();
        let clock = ManualClock::starting_at_epoch();
        let challenges = InMemoryChallengeStore::new();
        let assistant = Assistant::new(
            config,
            TemplateRegistry::builtin().unwrap(),
            Collaborators {
                backend: Box::new(bank.clone()),
                challenges: Box::new(challenges.clone()),
                delivery: Box::new(outbox.clone()),
                speech,
                clock: Box::new(clock.clone()),
                codes: Box::new(FixedCodeGenerator::new(code)),
            },
        );
        Self {
            assistant,
            bank,
            outbox,
            clock,
            challenges,
            store: InMemorySlotStore::new(),
        }
    }

    pub async fn set(&self, name: &str, value: Value) {
        self.store.set_slot(name, value).await.unwrap();
    }

    pub async fn slot(&self, name: &str) -> Option<Value> {
        self.store.get_slot(name).await.unwrap()
    }

    pub async fn say(&self, intent: Intent, locale: &str, utterance: &str) -> TurnReply {
        let turn = Turn::new("sess-1", locale)
            .with_auth(AuthContext::for_user(SUBJECT).with_claim("voice_match", 0.97))
            .with_utterance(utterance);
        self.assistant.handle(intent, &turn, &self.store).await
    }
}
