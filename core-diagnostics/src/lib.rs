//! # Access Diagnostics
//!
//! Runs an ordered sequence of probes against the storage API to classify
//! why access does not work: authentication failure, authorization
//! failure, missing scope, or a target folder that is unreachable.
//!
//! ## Overview
//!
//! Four stages run in a fixed order. A later stage still runs when an
//! earlier one fails, because the point of the report is to maximize
//! diagnostic information, not to stop early:
//!
//! 1. **Token**: can the identity obtain an access token at all?
//! 2. **Root**: can it list the storage root?
//! 3. **Target folder**: can it list the configured target folder?
//! 4. **Any access**: can it see *anything* (shared-with-me, or any
//!    visible item), separating "zero access anywhere" from "access
//!    elsewhere but not to the target"?
//!
//! The derived summary follows a fixed precedence so tooling that parses
//! the report sees stable, reproducible classifications.

pub mod report;
pub mod runner;

pub use report::{AccessSummary, DiagnosticReport, ProbeName, ProbeOutcome, ProbeResult};
pub use runner::AccessDiagnostics;
