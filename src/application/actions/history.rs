use crate::application::executor::{ActionContext, ActionDescriptor, BankAction, Prepared, Presentation};
use crate::application::localizer::Fields;
use crate::application::session::SessionSlots;
use crate::application::templates;
use crate::domain::banking::{HistoryQuery, TransactionHistory};
use crate::domain::money::display_amount;
use crate::domain::ports::BankingBackend;
use crate::domain::slots::keys;
use crate::error::{BackendError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Items read out loud; the rest of the backend's list is ignored.
pub const HISTORY_SUMMARY_LIMIT: usize = 3;

pub struct HistoryAction {
    descriptor: ActionDescriptor,
    default_account: String,
}

impl HistoryAction {
    pub fn new(timeout: Duration, default_account: impl Into<String>) -> Self {
        Self {
            descriptor: ActionDescriptor {
                name: "get_transactions",
                success_template: templates::TRANSACTIONS_HEADER,
                error_template: templates::ERROR_TRANSACTIONS,
                timeout,
            },
            default_account: default_account.into(),
        }
    }
}

#[async_trait]
impl BankAction for HistoryAction {
    type Request = HistoryQuery;
    type Response = TransactionHistory;

    fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }

    async fn prepare(
        &self,
        ctx: &ActionContext,
        slots: &mut SessionSlots<'_>,
    ) -> Result<Prepared<HistoryQuery>> {
        let from_account = slots
            .get_str(keys::FROM_ACCOUNT)
            .await?
            .unwrap_or_else(|| self.default_account.clone());
        Ok(Prepared::Ready(HistoryQuery {
            user_id: ctx.subject_id.clone(),
            from_account,
            auth: ctx.auth.clone(),
        }))
    }

    async fn call(
        &self,
        backend: &dyn BankingBackend,
        request: &HistoryQuery,
    ) -> std::result::Result<TransactionHistory, BackendError> {
        backend.transactions(request).await
    }

    fn present(
        &self,
        _ctx: &ActionContext,
        request: &HistoryQuery,
        response: TransactionHistory,
        slots: &mut SessionSlots<'_>,
    ) -> Presentation {
        slots.set(keys::USER_ID, request.user_id.clone());
        slots.set(keys::FROM_ACCOUNT, request.from_account.clone());

        if response.items.is_empty() {
            return Presentation::single(
                templates::TRANSACTIONS_EMPTY,
                Fields::new().with("from_account", &request.from_account),
            );
        }

        response
            .items
            .iter()
            .take(HISTORY_SUMMARY_LIMIT)
            .fold(
                Presentation::single(self.descriptor.success_template, Fields::new()),
                |presentation, item| {
                    presentation.then(
                        templates::TRANSACTION_ITEM,
                        Fields::new()
                            .with("amount", display_amount(item.amount))
                            .with("to_account", &item.to_account)
                            .with("created_at", &item.created_at),
                    )
                },
            )
    }
}
