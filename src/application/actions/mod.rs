//! The backend-calling actions run by the [`ActionExecutor`].
//!
//! [`ActionExecutor`]: super::executor::ActionExecutor

mod balance;
mod history;
mod pay_bill;
mod transfer;

pub use balance::BalanceAction;
pub use history::{HISTORY_SUMMARY_LIMIT, HistoryAction};
pub use pay_bill::PayBillAction;
pub use transfer::TransferAction;
