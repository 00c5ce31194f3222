//! Adapters behind the domain ports.

pub mod clock;
pub mod codes;
pub mod delivery;
pub mod http_backend;
pub mod in_memory;
pub mod simulated_bank;
pub mod speech;
