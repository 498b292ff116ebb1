//! CLI command implementations.

pub mod get;
pub mod inspect;
pub mod serve;
