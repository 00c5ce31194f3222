use crate::application::executor::{ActionContext, ActionDescriptor, BankAction, Prepared, Presentation};
use crate::application::localizer::Fields;
use crate::application::session::SessionSlots;
use crate::application::templates;
use crate::config::AccountDefaults;
use crate::domain::banking::{BillPayment, BillReceipt};
use crate::domain::money::{AmountInput, display_amount, normalize_amount};
use crate::domain::ports::BankingBackend;
use crate::domain::slots::keys;
use crate::error::{BackendError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

/// Pays the configured biller. Bill payments never ask for a one-time code.
pub struct PayBillAction {
    descriptor: ActionDescriptor,
    defaults: AccountDefaults,
}

impl PayBillAction {
    pub fn new(timeout: Duration, defaults: AccountDefaults) -> Self {
        Self {
            descriptor: ActionDescriptor {
                name: "pay_bill",
                success_template: templates::BILL_PAYMENT_SUCCESS,
                error_template: templates::ERROR_BILL_PAYMENT,
                timeout,
            },
            defaults,
        }
    }
}

#[async_trait]
impl BankAction for PayBillAction {
    type Request = BillPayment;
    type Response = BillReceipt;

    fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }

    async fn prepare(
        &self,
        ctx: &ActionContext,
        slots: &mut SessionSlots<'_>,
    ) -> Result<Prepared<BillPayment>> {
        let raw = slots.get(keys::AMOUNT).await?;
        let amount = normalize_amount(
            &AmountInput::from_slot(raw.as_ref()),
            &ctx.utterance,
            self.defaults.bill_amount,
        );
        if amount.is_fallback() && raw.is_some() {
            warn!(subject = %ctx.subject_id, raw = ?raw, "Bill amount unparsable, using default");
        }

        Ok(Prepared::Ready(BillPayment {
            user_id: ctx.subject_id.clone(),
            from_account: slots
                .get_str(keys::FROM_ACCOUNT)
                .await?
                .unwrap_or_else(|| self.defaults.from_account.clone()),
            amount: amount.value,
            currency: slots
                .get_str(keys::CURRENCY)
                .await?
                .unwrap_or_else(|| self.defaults.currency.clone()),
            auth: ctx.auth.clone(),
            biller_id: self.defaults.biller_id.clone(),
        }))
    }

    async fn call(
        &self,
        backend: &dyn BankingBackend,
        request: &BillPayment,
    ) -> std::result::Result<BillReceipt, BackendError> {
        backend.pay_bill(request).await
    }

    fn present(
        &self,
        _ctx: &ActionContext,
        request: &BillPayment,
        response: BillReceipt,
        slots: &mut SessionSlots<'_>,
    ) -> Presentation {
        let amount = display_amount(request.amount);
        slots.set(keys::USER_ID, request.user_id.clone());
        slots.set(keys::FROM_ACCOUNT, request.from_account.clone());
        slots.set(keys::AMOUNT, amount.clone());
        slots.set(keys::CURRENCY, request.currency.clone());
        slots.set(keys::LAST_TX_ID, response.tx_id.clone());
        Presentation::single(
            self.descriptor.success_template,
            Fields::new()
                .with("amount", amount)
                .with("from_account", &request.from_account)
                .with("tx_id", &response.tx_id),
        )
    }
}
