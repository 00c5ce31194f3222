//! Domain layer: value types, slot vocabulary and the ports the engine talks
//! through. Nothing here performs I/O.

pub mod banking;
pub mod money;
pub mod otp;
pub mod ports;
pub mod slots;
pub mod spoken_numbers;
pub mod transfer;
pub mod turn;
