use crate::application::executor::{ActionContext, ActionDescriptor, BankAction, Prepared, Presentation};
use crate::application::localizer::Fields;
use crate::application::session::SessionSlots;
use crate::application::templates;
use crate::application::transfer_authorizer::{Authorization, TransferAuthorizer};
use crate::domain::banking::{TransferOrder, TransferReceipt};
use crate::domain::money::display_amount;
use crate::domain::ports::BankingBackend;
use crate::domain::slots::keys;
use crate::error::{BackendError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Funds transfer, gated by the [`TransferAuthorizer`].
///
/// When the authorizer issues a challenge the action answers with the
/// OTP prompt and the backend is not called.
pub struct TransferAction {
    descriptor: ActionDescriptor,
    authorizer: Arc<TransferAuthorizer>,
    note: String,
}

impl TransferAction {
    pub fn new(timeout: Duration, authorizer: Arc<TransferAuthorizer>, note: impl Into<String>) -> Self {
        Self {
            descriptor: ActionDescriptor {
                name: "make_transfer",
                success_template: templates::TRANSFER_SUCCESS,
                error_template: templates::ERROR_TRANSFER,
                timeout,
            },
            authorizer,
            note: note.into(),
        }
    }
}

#[async_trait]
impl BankAction for TransferAction {
    type Request = TransferOrder;
    type Response = TransferReceipt;

    fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }

    async fn prepare(
        &self,
        ctx: &ActionContext,
        slots: &mut SessionSlots<'_>,
    ) -> Result<Prepared<TransferOrder>> {
        let request = self
            .authorizer
            .resolve_request(&ctx.subject_id, &ctx.utterance, slots)
            .await?;

        match self.authorizer.authorize(request, slots).await? {
            Authorization::Proceed { request, .. } => Ok(Prepared::Ready(TransferOrder {
                user_id: request.subject_id,
                from_account: request.from_account,
                to_account: request.to_account,
                amount: request.amount,
                currency: request.currency,
                auth: ctx.auth.clone(),
                note: self.note.clone(),
            })),
            Authorization::ChallengeIssued(_) => Ok(Prepared::Reply(Presentation::single(
                templates::OTP_REQUIRED,
                Fields::new(),
            ))),
        }
    }

    async fn call(
        &self,
        backend: &dyn BankingBackend,
        request: &TransferOrder,
    ) -> std::result::Result<TransferReceipt, BackendError> {
        backend.transfer(request).await
    }

    fn present(
        &self,
        _ctx: &ActionContext,
        request: &TransferOrder,
        response: TransferReceipt,
        slots: &mut SessionSlots<'_>,
    ) -> Presentation {
        let amount = display_amount(request.amount);
        slots.set(keys::USER_ID, request.user_id.clone());
        slots.set(keys::FROM_ACCOUNT, request.from_account.clone());
        slots.set(keys::TO_ACCOUNT, request.to_account.clone());
        slots.set(keys::AMOUNT, amount.clone());
        slots.set(keys::CURRENCY, request.currency.clone());
        slots.set(keys::LAST_TX_ID, response.tx_id.clone());
        slots.set(keys::LAST_TX_TOKEN, response.signed_token.clone());
        slots.apply(TransferAuthorizer::completion_ops());

        Presentation::single(
            self.descriptor.success_template,
            Fields::new()
                .with("amount", amount)
                .with("from_account", &request.from_account)
                .with("to_account", &request.to_account)
                .with("tx_id", &response.tx_id),
        )
    }
}
