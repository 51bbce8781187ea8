//! Core infrastructure
//!
//! Cross-cutting pieces shared by the storage engine and the subsystems built
//! on it.

pub mod confirm;
pub mod logging;
