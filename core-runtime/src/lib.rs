//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for tankview:
//! - Configuration loaded from the environment with fail-fast validation
//! - Logging and tracing initialization
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the other modules depend on.
//! It establishes the configuration and logging conventions used
//! throughout the system; nothing here touches the network.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, ConfigError};
pub use error::{Error, Result};
pub use logging::{init_logging, LogFormat, LoggingConfig};
