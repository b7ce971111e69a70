//! Command handlers.

pub mod check_deps;
pub mod convert;
pub mod serve;
