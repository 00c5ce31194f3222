//! Batch I/O for replaying conversations from the command line.

pub mod csv;
pub mod json;
