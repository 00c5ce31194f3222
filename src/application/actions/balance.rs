use crate::application::executor::{ActionContext, ActionDescriptor, BankAction, Prepared, Presentation};
use crate::application::localizer::Fields;
use crate::application::session::SessionSlots;
use crate::application::templates;
use crate::domain::banking::{BalanceQuery, BalanceSnapshot};
use crate::domain::money::display_amount;
use crate::domain::ports::BankingBackend;
use crate::domain::slots::keys;
use crate::error::{BackendError, Result};
use async_trait::async_trait;
use std::time::Duration;

pub struct BalanceAction {
    descriptor: ActionDescriptor,
    default_account: String,
}

impl BalanceAction {
    pub fn new(timeout: Duration, default_account: impl Into<String>) -> Self {
        Self {
            descriptor: ActionDescriptor {
                name: "check_balance",
                success_template: templates::BALANCE,
                error_template: templates::ERROR_BALANCE,
                timeout,
            },
            default_account: default_account.into(),
        }
    }
}

#[async_trait]
impl BankAction for BalanceAction {
    type Request = BalanceQuery;
    type Response = BalanceSnapshot;

    fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }

    async fn prepare(
        &self,
        ctx: &ActionContext,
        slots: &mut SessionSlots<'_>,
    ) -> Result<Prepared<BalanceQuery>> {
        let account_id = slots
            .get_str(keys::ACCOUNT_ID)
            .await?
            .unwrap_or_else(|| self.default_account.clone());
        Ok(Prepared::Ready(BalanceQuery {
            user_id: ctx.subject_id.clone(),
            account_id,
            auth: ctx.auth.clone(),
        }))
    }

    async fn call(
        &self,
        backend: &dyn BankingBackend,
        request: &BalanceQuery,
    ) -> std::result::Result<BalanceSnapshot, BackendError> {
        backend.balance(request).await
    }

    fn present(
        &self,
        _ctx: &ActionContext,
        request: &BalanceQuery,
        response: BalanceSnapshot,
        slots: &mut SessionSlots<'_>,
    ) -> Presentation {
        slots.set(keys::USER_ID, request.user_id.clone());
        slots.set(keys::ACCOUNT_ID, request.account_id.clone());
        Presentation::single(
            self.descriptor.success_template,
            Fields::new()
                .with("account_id", &request.account_id)
                .with("balance", display_amount(response.balance)),
        )
    }
}
