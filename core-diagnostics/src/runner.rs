//! The four-stage diagnostic runner.

use crate::report::{summarize, DiagnosticReport, ProbeName, ProbeOutcome, ProbeResult};
use bridge_traits::storage::StorageClient;
use core_auth::TokenSource;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Runs the probe sequence and assembles the report.
///
/// Stages are ordered and non-branching: every stage runs even when an
/// earlier one failed, because each failure mode narrows the remediation
/// differently. The only exception is cancellation, which records the
/// stages that never ran instead of omitting them.
pub struct AccessDiagnostics {
    tokens: Arc<dyn TokenSource>,
    storage: Arc<dyn StorageClient>,
    target_folder_id: String,
}

impl AccessDiagnostics {
    pub fn new(
        tokens: Arc<dyn TokenSource>,
        storage: Arc<dyn StorageClient>,
        target_folder_id: impl Into<String>,
    ) -> Self {
        Self {
            tokens,
            storage,
            target_folder_id: target_folder_id.into(),
        }
    }

    /// Run all four probes and derive the summary.
    #[instrument(skip(self, cancel))]
    pub async fn run(&self, cancel: &CancellationToken) -> DiagnosticReport {
        let mut probes = Vec::with_capacity(4);

        probes.push(self.guarded(cancel, ProbeName::Token, self.token_probe()).await);
        probes.push(self.guarded(cancel, ProbeName::Root, self.root_probe()).await);
        probes.push(
            self.guarded(cancel, ProbeName::TargetFolder, self.target_probe())
                .await,
        );
        probes.push(
            self.guarded(cancel, ProbeName::AnyAccess, self.any_access_probe())
                .await,
        );

        let summary = summarize(
            probes[0].outcome,
            probes[1].outcome,
            probes[2].outcome,
            probes[3].outcome,
        );

        info!(summary = %summary, "Access diagnostics complete");

        DiagnosticReport {
            identity_email: self.tokens.identity_email().to_string(),
            target_folder_id: self.target_folder_id.clone(),
            probes,
            summary,
        }
    }

    /// Run one probe unless the token was cancelled first.
    async fn guarded(
        &self,
        cancel: &CancellationToken,
        name: ProbeName,
        probe: impl std::future::Future<Output = ProbeResult>,
    ) -> ProbeResult {
        if cancel.is_cancelled() {
            return ProbeResult {
                probe: name,
                outcome: ProbeOutcome::UnknownError,
                detail: "Cancelled before this stage ran".to_string(),
                http_status: None,
            };
        }
        probe.await
    }

    async fn token_probe(&self) -> ProbeResult {
        match self.tokens.token().await {
            Ok(token) => ProbeResult::ok(
                ProbeName::Token,
                format!("Token issued; expires at {}", token.expires_at),
            ),
            Err(e) => ProbeResult {
                probe: ProbeName::Token,
                outcome: ProbeOutcome::AuthFailed,
                detail: e.to_string(),
                http_status: match &e {
                    core_auth::AuthError::RejectedByServer { status, .. } => Some(*status),
                    _ => None,
                },
            },
        }
    }

    async fn root_probe(&self) -> ProbeResult {
        match self.storage.list_children("root").await {
            Ok(children) => ProbeResult::ok(
                ProbeName::Root,
                format!("Root listing succeeded ({} items)", children.len()),
            ),
            Err(e) => ProbeResult::from_error(ProbeName::Root, &e),
        }
    }

    async fn target_probe(&self) -> ProbeResult {
        match self.storage.list_children(&self.target_folder_id).await {
            Ok(children) => ProbeResult::ok(
                ProbeName::TargetFolder,
                format!(
                    "Target folder listing succeeded ({} items)",
                    children.len()
                ),
            ),
            // NOT_FOUND here means "nonexistent or not shared"; the two
            // are indistinguishable to this caller, and the detail says so.
            Err(e) => {
                let mut result = ProbeResult::from_error(ProbeName::TargetFolder, &e);
                if result.outcome == ProbeOutcome::NotFound {
                    result.detail = format!(
                        "Folder {} was not found, or exists but is not shared \
                         with this identity (the API reports both the same way)",
                        self.target_folder_id
                    );
                }
                result
            }
        }
    }

    async fn any_access_probe(&self) -> ProbeResult {
        // Shared-with-me is the well-known reachable location; fall back
        // to an unconstrained one-page listing when it fails.
        let shared = self.storage.list_shared_with_me().await;
        match shared {
            Ok(items) if !items.is_empty() => {
                return ProbeResult::ok(
                    ProbeName::AnyAccess,
                    format!("Identity sees {} shared item(s)", items.len()),
                )
            }
            _ => {}
        }

        match self.storage.list_any_visible().await {
            Ok(items) if !items.is_empty() => ProbeResult::ok(
                ProbeName::AnyAccess,
                format!("Identity sees {} item(s) outside the target", items.len()),
            ),
            Ok(_) => ProbeResult::ok(
                ProbeName::AnyAccess,
                "API reachable, but the identity sees no items anywhere; it may \
                 have zero storage visibility"
                    .to_string(),
            ),
            Err(e) => ProbeResult::from_error(ProbeName::AnyAccess, &e),
        }
    }
}
