//! Shared configuration, error taxonomy and domain types for the homework status bot.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;
