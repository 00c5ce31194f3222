use super::otp_authority::OtpAuthority;
use super::session::SessionSlots;
use crate::config::{AccountDefaults, TransferConfig};
use crate::domain::money::{AmountInput, display_amount, normalize_amount, parse_amount_text};
use crate::domain::otp::VerifyOutcome;
use crate::domain::slots::{SlotOp, keys};
use crate::domain::transfer::{PendingTransfer, TransferRequest, TransferState};
use crate::error::Result;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Decision for a transfer request.
#[derive(Debug, Clone, PartialEq)]
pub enum Authorization {
    /// Call the backend now. `state` is `Direct` or `Resuming`.
    Proceed {
        request: TransferRequest,
        state: TransferState,
    },
    /// A challenge was issued and the transfer staged in the session.
    ChallengeIssued(PendingTransfer),
}

/// What an OTP verification turn resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationStep {
    /// The staged transfer, if one survived in the session, is now the
    /// current transfer.
    Verified { pending: Option<PendingTransfer> },
    Retry { remaining_attempts: u32 },
    /// Expired or exhausted. `outcome` tells which.
    Locked(VerifyOutcome),
}

/// Gatekeeper between transfer requests and the backend for amounts above
/// the OTP threshold.
pub struct TransferAuthorizer {
    otp: OtpAuthority,
    limits: TransferConfig,
    defaults: AccountDefaults,
}

impl TransferAuthorizer {
    pub fn new(otp: OtpAuthority, limits: TransferConfig, defaults: AccountDefaults) -> Self {
        Self {
            otp,
            limits,
            defaults,
        }
    }

    /// Reads the transfer parameters for this turn from the session.
    pub async fn resolve_request(
        &self,
        subject_id: &str,
        utterance: &str,
        slots: &SessionSlots<'_>,
    ) -> Result<TransferRequest> {
        let raw = slots.get(keys::AMOUNT).await?;
        let amount = normalize_amount(
            &AmountInput::from_slot(raw.as_ref()),
            utterance,
            self.limits.fallback_amount,
        );
        if amount.is_fallback() {
            warn!(
                subject = subject_id,
                raw = ?raw,
                substituted = %amount.value,
                "Transfer amount unparsable, using fallback"
            );
        }

        Ok(TransferRequest {
            subject_id: subject_id.to_string(),
            from_account: slots
                .get_str(keys::FROM_ACCOUNT)
                .await?
                .unwrap_or_else(|| self.defaults.from_account.clone()),
            to_account: slots
                .get_str(keys::TO_ACCOUNT)
                .await?
                .unwrap_or_else(|| self.defaults.to_account.clone()),
            amount: amount.value,
            amount_source: amount.source,
            currency: slots
                .get_str(keys::CURRENCY)
                .await?
                .unwrap_or_else(|| self.defaults.currency.clone()),
        })
    }

    pub async fn authorize(
        &self,
        request: TransferRequest,
        slots: &mut SessionSlots<'_>,
    ) -> Result<Authorization> {
        if request.amount <= self.limits.otp_threshold {
            info!(subject = %request.subject_id, state = ?TransferState::Direct, "Transfer below threshold");
            return Ok(Authorization::Proceed {
                request,
                state: TransferState::Direct,
            });
        }

        if slots.get_flag(keys::OTP_VERIFIED).await? {
            match pending_transfer(slots).await? {
                Some(pending) if pending.matches(&request) => {
                    info!(subject = %request.subject_id, state = ?TransferState::Resuming, "Resuming verified transfer");
                    return Ok(Authorization::Proceed {
                        request,
                        state: TransferState::Resuming,
                    });
                }
                _ => {
                    info!(subject = %request.subject_id, "Verification does not cover this transfer");
                }
            }
        }

        let challenge = self.otp.generate(&request.subject_id).await?;
        let pending = PendingTransfer::from_request(&request, challenge.issued_at);
        stage(slots, &pending);
        slots.set(keys::AWAITING_OTP, true);
        slots.set(keys::OTP_VERIFIED, false);

        info!(
            subject = %request.subject_id,
            state = ?TransferState::AwaitingOtp,
            amount = %pending.amount,
            "Transfer staged pending one-time code"
        );
        Ok(Authorization::ChallengeIssued(pending))
    }

    /// Checks the code spoken in `utterance` and moves the session along.
    pub async fn verify(
        &self,
        subject_id: &str,
        utterance: &str,
        slots: &mut SessionSlots<'_>,
    ) -> Result<VerificationStep> {
        let candidate = spoken_code(utterance);
        let outcome = self.otp.verify(subject_id, &candidate).await?;

        let step = match outcome {
            VerifyOutcome::Verified => {
                let pending = pending_transfer(slots).await?;
                slots.set(keys::OTP_VERIFIED, true);
                slots.set(keys::AWAITING_OTP, false);
                if let Some(pending) = &pending {
                    slots.set(keys::AMOUNT, display_amount(pending.amount));
                    slots.set(keys::FROM_ACCOUNT, pending.from_account.clone());
                    slots.set(keys::TO_ACCOUNT, pending.to_account.clone());
                    slots.set(keys::CURRENCY, pending.currency.clone());
                } else {
                    warn!(subject = subject_id, "Code verified but no staged transfer in session");
                }
                VerificationStep::Verified { pending }
            }
            VerifyOutcome::Invalid { remaining_attempts } => {
                VerificationStep::Retry { remaining_attempts }
            }
            VerifyOutcome::Expired | VerifyOutcome::NotFound => {
                slots.apply(reset_ops());
                info!(subject = subject_id, state = ?TransferState::Locked, outcome = ?outcome, "Transfer locked");
                VerificationStep::Locked(outcome)
            }
        };
        Ok(step)
    }

    /// Slot updates applied after any transfer reaches the backend
    /// successfully, so the next request is evaluated from scratch.
    pub fn completion_ops() -> Vec<SlotOp> {
        reset_ops()
    }
}

fn reset_ops() -> Vec<SlotOp> {
    let mut ops = vec![
        SlotOp::set(keys::OTP_VERIFIED, false),
        SlotOp::set(keys::AWAITING_OTP, false),
    ];
    ops.extend(keys::PENDING_TRANSFER.iter().map(|name| SlotOp::clear(*name)));
    ops
}

fn stage(slots: &mut SessionSlots<'_>, pending: &PendingTransfer) {
    slots.set(keys::PENDING_AMOUNT, display_amount(pending.amount));
    slots.set(keys::PENDING_FROM, pending.from_account.clone());
    slots.set(keys::PENDING_TO, pending.to_account.clone());
    slots.set(keys::PENDING_CURRENCY, pending.currency.clone());
    slots.set(keys::PENDING_SUBJECT, pending.subject_id.clone());
    slots.set(keys::PENDING_STAGED_AT, pending.staged_at.to_rfc3339());
}

/// The staged transfer, or `None` when any part of it is missing.
pub async fn pending_transfer(slots: &SessionSlots<'_>) -> Result<Option<PendingTransfer>> {
    let Some(amount) = slots
        .get_str(keys::PENDING_AMOUNT)
        .await?
        .and_then(|raw| parse_amount_text(&raw))
    else {
        return Ok(None);
    };
    let (Some(subject_id), Some(from_account), Some(to_account), Some(currency)) = (
        slots.get_str(keys::PENDING_SUBJECT).await?,
        slots.get_str(keys::PENDING_FROM).await?,
        slots.get_str(keys::PENDING_TO).await?,
        slots.get_str(keys::PENDING_CURRENCY).await?,
    ) else {
        return Ok(None);
    };
    let staged_at = slots
        .get_str(keys::PENDING_STAGED_AT)
        .await?
        .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default();

    Ok(Some(PendingTransfer {
        subject_id,
        amount: amount.normalize(),
        from_account,
        to_account,
        currency,
        staged_at,
    }))
}

/// Every ASCII digit in the utterance, in order ("4 8 2 9 1 3" → "482913").
fn spoken_code(utterance: &str) -> String {
    utterance.chars().filter(char::is_ascii_digit).collect()
}
