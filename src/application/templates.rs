//! Template keys the engine renders. Every key here exists in the built-in
//! registry with at least an `en` entry.

pub const GREET: &str = "greet";
pub const GOODBYE: &str = "goodbye";
pub const OUT_OF_SCOPE: &str = "out_of_scope";
pub const ASK_REPHRASE: &str = "ask_rephrase";
pub const LOAN_INFO: &str = "loan_info";
pub const CREDIT_LIMIT: &str = "credit_limit";
pub const REMINDER_SET: &str = "reminder_set";

pub const BALANCE: &str = "balance";
pub const TRANSFER_SUCCESS: &str = "transfer_success";
pub const BILL_PAYMENT_SUCCESS: &str = "bill_payment_success";
pub const TRANSACTIONS_HEADER: &str = "transactions_header";
pub const TRANSACTION_ITEM: &str = "transaction_item";
pub const TRANSACTIONS_EMPTY: &str = "transactions_empty";

pub const ERROR_BALANCE: &str = "error_balance";
pub const ERROR_TRANSFER: &str = "error_transfer";
pub const ERROR_BILL_PAYMENT: &str = "error_bill_payment";
pub const ERROR_TRANSACTIONS: &str = "error_transactions";

pub const OTP_REQUIRED: &str = "otp_required";
pub const OTP_VERIFIED: &str = "otp_verified";
/// Carries `{remaining}`.
pub const OTP_RETRY: &str = "otp_retry";
pub const OTP_EXPIRED: &str = "otp_expired";
pub const OTP_LOCKED: &str = "otp_locked";
