//! Command implementations for nativemem-cmd

pub mod fill;
pub mod probe;
