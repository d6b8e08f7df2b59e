//! Error type for the checked surfaces of the crate.
//!
//! Broken caller contracts (stale drawable handles, dead external references
//! during sync or prepare) panic on the normal paths. The `try_*` accessors
//! and configuration validation report the same conditions as values.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListError {
    #[error("stale drawable handle: allocated in epoch {handle_epoch}, arena is at epoch {arena_epoch}")]
    StaleHandle { handle_epoch: u32, arena_epoch: u32 },
    #[error("drawable handle {index} does not refer to a {expected} in this arena")]
    ForeignHandle { index: u32, expected: &'static str },
    #[error("external {0} was dropped while still referenced by a recorded list")]
    DeadReference(&'static str),
    #[error("invalid list configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ListError>;
