use super::locks::SubjectLocks;
use crate::domain::otp::{OtpChallenge, OtpPolicy, VerifyOutcome};
use crate::domain::ports::{ChallengeStoreBox, ClockBox, CodeGeneratorBox, DeliveryChannelBox};
use crate::error::Result;
use tracing::{debug, info, warn};

/// Issues and checks one-time challenges.
///
/// Every read-modify-write of a subject's challenge happens under that
/// subject's lock, so duplicate submits cannot double-count an attempt or
/// resurrect a consumed code. Delivery runs after the lock is released.
pub struct OtpAuthority {
    store: ChallengeStoreBox,
    delivery: DeliveryChannelBox,
    clock: ClockBox,
    codes: CodeGeneratorBox,
    policy: OtpPolicy,
    locks: SubjectLocks,
}

impl OtpAuthority {
    pub fn new(
        store: ChallengeStoreBox,
        delivery: DeliveryChannelBox,
        clock: ClockBox,
        codes: CodeGeneratorBox,
        policy: OtpPolicy,
    ) -> Self {
        Self {
            store,
            delivery,
            clock,
            codes,
            policy,
            locks: SubjectLocks::new(),
        }
    }

    /// Issues a fresh challenge, replacing any live one for the subject.
    ///
    /// A failed delivery is logged and the challenge stays valid.
    pub async fn generate(&self, subject_id: &str) -> Result<OtpChallenge> {
        let challenge = {
            let _guard = self.locks.lock(subject_id).await;
            let challenge = OtpChallenge::issue(
                subject_id,
                self.codes.next_code(),
                self.clock.now(),
                self.policy,
            );
            self.store.put(challenge.clone()).await?;
            challenge
        };

        info!(
            subject = subject_id,
            expires_at = %challenge.expires_at(),
            "Issued one-time code"
        );
        debug!(subject = subject_id, code = %challenge.code, "One-time code value");

        if let Err(e) = self.delivery.deliver(subject_id, &challenge.code).await {
            warn!(subject = subject_id, error = %e, "One-time code delivery failed");
        }

        Ok(challenge)
    }

    /// Checks `candidate` against the subject's live challenge.
    ///
    /// Consumes the challenge on success, on expiry and when the attempt
    /// budget runs out. The guess that uses the last attempt reports
    /// [`VerifyOutcome::NotFound`] rather than `Invalid { remaining_attempts: 0 }`.
    pub async fn verify(&self, subject_id: &str, candidate: &str) -> Result<VerifyOutcome> {
        let _guard = self.locks.lock(subject_id).await;

        let Some(mut challenge) = self.store.get(subject_id).await? else {
            debug!(subject = subject_id, "No live challenge");
            return Ok(VerifyOutcome::NotFound);
        };

        if challenge.is_expired(self.clock.now()) {
            self.store.remove(subject_id).await?;
            info!(subject = subject_id, outcome = "expired", "Challenge expired");
            return Ok(VerifyOutcome::Expired);
        }

        if challenge.is_locked() {
            self.store.remove(subject_id).await?;
            warn!(subject = subject_id, outcome = "locked", "Challenge locked out");
            return Ok(VerifyOutcome::NotFound);
        }

        if challenge.matches(candidate.trim()) {
            self.store.remove(subject_id).await?;
            info!(subject = subject_id, outcome = "verified", "Challenge verified");
            return Ok(VerifyOutcome::Verified);
        }

        let remaining = challenge.record_failure();
        if remaining == 0 {
            self.store.remove(subject_id).await?;
            warn!(subject = subject_id, outcome = "locked", "Attempt budget exhausted");
            return Ok(VerifyOutcome::NotFound);
        }

        self.store.put(challenge).await?;
        info!(
            subject = subject_id,
            outcome = "invalid",
            remaining_attempts = remaining,
            "Wrong one-time code"
        );
        Ok(VerifyOutcome::Invalid {
            remaining_attempts: remaining,
        })
    }
}
