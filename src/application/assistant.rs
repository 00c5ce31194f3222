use super::actions::{BalanceAction, HistoryAction, PayBillAction, TransferAction};
use super::executor::{ActionContext, ActionExecutor};
use super::localizer::{Fields, ResponseLocalizer, TemplateRegistry};
use super::locks::SubjectLocks;
use super::otp_authority::OtpAuthority;
use super::session::SessionSlots;
use super::templates;
use super::transfer_authorizer::{TransferAuthorizer, VerificationStep};
use crate::config::AssistantConfig;
use crate::domain::otp::VerifyOutcome;
use crate::domain::ports::{
    BankingBackendBox, ChallengeStoreBox, ClockBox, CodeGeneratorBox, DeliveryChannelBox,
    SlotStore, SpeechSynthesizerBox,
};
use crate::domain::spoken_numbers::words_to_digits;
use crate::domain::turn::{OutgoingMessage, Turn, TurnReply};
use crate::error::{AssistantError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info};

/// What the dialogue engine decided the user wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CheckBalance,
    MakeTransfer,
    VerifyOtp,
    GetTransactions,
    PayBill,
    LoanInfo,
    CreditLimit,
    SetReminder,
    Greet,
    Goodbye,
    OutOfScope,
    AskRephrase,
}

impl Intent {
    pub const ALL: [Intent; 12] = [
        Intent::CheckBalance,
        Intent::MakeTransfer,
        Intent::VerifyOtp,
        Intent::GetTransactions,
        Intent::PayBill,
        Intent::LoanInfo,
        Intent::CreditLimit,
        Intent::SetReminder,
        Intent::Greet,
        Intent::Goodbye,
        Intent::OutOfScope,
        Intent::AskRephrase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::CheckBalance => "check_balance",
            Intent::MakeTransfer => "make_transfer",
            Intent::VerifyOtp => "verify_otp",
            Intent::GetTransactions => "get_transactions",
            Intent::PayBill => "pay_bill",
            Intent::LoanInfo => "loan_info",
            Intent::CreditLimit => "credit_limit",
            Intent::SetReminder => "set_reminder",
            Intent::Greet => "greet",
            Intent::Goodbye => "goodbye",
            Intent::OutOfScope => "out_of_scope",
            Intent::AskRephrase => "ask_rephrase",
        }
    }

    /// Reply template of intents that never reach the backend.
    fn canned_template(&self) -> Option<&'static str> {
        match self {
            Intent::LoanInfo => Some(templates::LOAN_INFO),
            Intent::CreditLimit => Some(templates::CREDIT_LIMIT),
            Intent::SetReminder => Some(templates::REMINDER_SET),
            Intent::Greet => Some(templates::GREET),
            Intent::Goodbye => Some(templates::GOODBYE),
            Intent::OutOfScope => Some(templates::OUT_OF_SCOPE),
            Intent::AskRephrase => Some(templates::ASK_REPHRASE),
            _ => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = AssistantError;

    /// Accepts both intent names and the dialogue engine's action names
    /// (`action_check_balance`).
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        let name = name.strip_prefix("action_").unwrap_or(&name);
        Intent::ALL
            .into_iter()
            .find(|intent| intent.as_str() == name)
            .ok_or_else(|| AssistantError::ValidationError(format!("unknown intent `{s}`")))
    }
}

/// External services the assistant talks to.
pub struct Collaborators {
    pub backend: BankingBackendBox,
    pub challenges: ChallengeStoreBox,
    pub delivery: DeliveryChannelBox,
    pub speech: SpeechSynthesizerBox,
    pub clock: ClockBox,
    pub codes: CodeGeneratorBox,
}

/// Routes turns to actions and commits the slot updates they produce.
pub struct Assistant {
    config: AssistantConfig,
    executor: ActionExecutor,
    authorizer: Arc<TransferAuthorizer>,
    balance: BalanceAction,
    transfer: TransferAction,
    pay_bill: PayBillAction,
    history: HistoryAction,
    sessions: SubjectLocks,
}

impl Assistant {
    pub fn new(config: AssistantConfig, registry: TemplateRegistry, parts: Collaborators) -> Self {
        let otp = OtpAuthority::new(
            parts.challenges,
            parts.delivery,
            parts.clock,
            parts.codes,
            config.otp,
        );
        let authorizer = Arc::new(TransferAuthorizer::new(
            otp,
            config.transfer.clone(),
            config.defaults.clone(),
        ));

        let read_timeout = config.backend.read_timeout();
        let write_timeout = config.backend.write_timeout();
        let defaults = &config.defaults;

        Self {
            executor: ActionExecutor::new(
                parts.backend,
                ResponseLocalizer::new(registry),
                parts.speech,
                config.speech.timeout(),
            ),
            balance: BalanceAction::new(read_timeout, defaults.account_id.clone()),
            transfer: TransferAction::new(
                write_timeout,
                authorizer.clone(),
                defaults.transfer_note.clone(),
            ),
            pay_bill: PayBillAction::new(write_timeout, defaults.clone()),
            history: HistoryAction::new(write_timeout, defaults.from_account.clone()),
            authorizer,
            sessions: SubjectLocks::new(),
            config,
        }
    }

    /// Built-in templates merged with the configured override file, if any.
    pub fn from_config(config: AssistantConfig, parts: Collaborators) -> Result<Self> {
        let mut registry = TemplateRegistry::builtin()?;
        if let Some(path) = &config.templates_path {
            registry.merge(TemplateRegistry::from_path(path)?);
        }
        Ok(Self::new(config, registry, parts))
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// Handles one turn. Always answers with at least one text message.
    ///
    /// Turns for the same subject run one at a time. The slot updates are
    /// written to `store` and also returned in the reply.
    pub async fn handle(&self, intent: Intent, turn: &Turn, store: &dyn SlotStore) -> TurnReply {
        let mut ctx = ActionContext::from_turn(turn, &self.config.default_subject);
        ctx.utterance = words_to_digits(&turn.utterance);
        if ctx.locale.trim().is_empty() {
            ctx.locale = self.config.default_locale.clone();
        }

        let _guard = self.sessions.lock(&ctx.subject_id).await;
        info!(subject = %ctx.subject_id, intent = %intent, locale = %ctx.locale, "Handling turn");

        let mut slots = SessionSlots::new(store);
        let messages = self.dispatch(intent, &ctx, &mut slots).await;
        let ops = slots.into_ops();

        for op in &ops {
            if let Err(e) = store.set_slot(&op.name, op.value.clone()).await {
                error!(subject = %ctx.subject_id, slot = %op.name, error = %e, "Failed to persist slot");
            }
        }

        TurnReply {
            messages,
            slots: ops,
        }
    }

    async fn dispatch(
        &self,
        intent: Intent,
        ctx: &ActionContext,
        slots: &mut SessionSlots<'_>,
    ) -> Vec<OutgoingMessage> {
        match intent {
            Intent::CheckBalance => self.executor.execute(&self.balance, ctx, slots).await,
            Intent::MakeTransfer => self.executor.execute(&self.transfer, ctx, slots).await,
            Intent::PayBill => self.executor.execute(&self.pay_bill, ctx, slots).await,
            Intent::GetTransactions => self.executor.execute(&self.history, ctx, slots).await,
            Intent::VerifyOtp => self.verify_otp(ctx, slots).await,
            canned => {
                let key = canned.canned_template().unwrap_or(templates::ASK_REPHRASE);
                self.executor.respond(key, &ctx.locale, Fields::new()).await
            }
        }
    }

    /// A correct code replays the staged transfer in the same turn.
    async fn verify_otp(&self, ctx: &ActionContext, slots: &mut SessionSlots<'_>) -> Vec<OutgoingMessage> {
        let step = match self.authorizer.verify(&ctx.subject_id, &ctx.utterance, slots).await {
            Ok(step) => step,
            Err(e) => {
                error!(subject = %ctx.subject_id, error = %e, "Verification failed");
                return self
                    .executor
                    .respond(templates::ERROR_TRANSFER, &ctx.locale, Fields::new())
                    .await;
            }
        };

        match step {
            VerificationStep::Verified { pending } => {
                let mut messages = self
                    .executor
                    .respond(templates::OTP_VERIFIED, &ctx.locale, Fields::new())
                    .await;
                if pending.is_some() {
                    let follow_up = ctx.without_utterance();
                    messages.extend(self.executor.execute(&self.transfer, &follow_up, slots).await);
                }
                messages
            }
            VerificationStep::Retry { remaining_attempts } => {
                self.executor
                    .respond(
                        templates::OTP_RETRY,
                        &ctx.locale,
                        Fields::new().with("remaining", remaining_attempts),
                    )
                    .await
            }
            VerificationStep::Locked(VerifyOutcome::Expired) => {
                self.executor
                    .respond(templates::OTP_EXPIRED, &ctx.locale, Fields::new())
                    .await
            }
            VerificationStep::Locked(_) => {
                self.executor
                    .respond(templates::OTP_LOCKED, &ctx.locale, Fields::new())
                    .await
            }
        }
    }
}
