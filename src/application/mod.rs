//! Application layer: the transaction authorization engine.
//!
//! `OtpAuthority` owns challenge lifecycles, `TransferAuthorizer` decides when
//! a transfer must be challenged and parks it across turns, and
//! `ActionExecutor` runs every backend-calling action through the same
//! build → call → localize → deliver pipeline. `Assistant` routes intents to
//! them and commits slot changes once per turn.

pub mod actions;
pub mod assistant;
pub mod executor;
pub mod localizer;
pub mod locks;
pub mod otp_authority;
pub mod session;
pub mod templates;
pub mod transfer_authorizer;
