//! Probe outcomes, the diagnostic report and its derived summary.

use bridge_traits::error::StorageError;
use serde::Serialize;
use std::fmt;

/// The four probe stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeName {
    Token,
    Root,
    TargetFolder,
    AnyAccess,
}

impl ProbeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeName::Token => "token",
            ProbeName::Root => "root",
            ProbeName::TargetFolder => "target_folder",
            ProbeName::AnyAccess => "any_access",
        }
    }
}

impl fmt::Display for ProbeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classified outcome of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProbeOutcome {
    Ok,
    AuthFailed,
    Forbidden,
    NotFound,
    ScopeInsufficient,
    UnknownError,
}

impl ProbeOutcome {
    /// Classify a storage failure into a probe outcome.
    pub fn from_storage_error(error: &StorageError) -> Self {
        match error {
            StorageError::Auth { .. } => ProbeOutcome::AuthFailed,
            StorageError::Forbidden { .. } => ProbeOutcome::Forbidden,
            StorageError::ScopeInsufficient { .. } => ProbeOutcome::ScopeInsufficient,
            StorageError::NotFound { .. } => ProbeOutcome::NotFound,
            StorageError::RangeNotSatisfiable { .. }
            | StorageError::Transient { .. }
            | StorageError::Decode(_) => ProbeOutcome::UnknownError,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeOutcome::Ok => "OK",
            ProbeOutcome::AuthFailed => "AUTH_FAILED",
            ProbeOutcome::Forbidden => "FORBIDDEN",
            ProbeOutcome::NotFound => "NOT_FOUND",
            ProbeOutcome::ScopeInsufficient => "SCOPE_INSUFFICIENT",
            ProbeOutcome::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One probe's recorded result.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub probe: ProbeName,
    pub outcome: ProbeOutcome,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl ProbeResult {
    pub fn ok(probe: ProbeName, detail: impl Into<String>) -> Self {
        Self {
            probe,
            outcome: ProbeOutcome::Ok,
            detail: detail.into(),
            http_status: None,
        }
    }

    pub fn from_error(probe: ProbeName, error: &StorageError) -> Self {
        Self {
            probe,
            outcome: ProbeOutcome::from_storage_error(error),
            detail: error.to_string(),
            http_status: error.http_status(),
        }
    }
}

/// Remediation category derived from the probe outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessSummary {
    Ready,
    NeedsAuthFix,
    NeedsScopeFix,
    NeedsSharing,
    TargetNotFound,
    Unknown,
}

impl AccessSummary {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessSummary::Ready => "READY",
            AccessSummary::NeedsAuthFix => "NEEDS_AUTH_FIX",
            AccessSummary::NeedsScopeFix => "NEEDS_SCOPE_FIX",
            AccessSummary::NeedsSharing => "NEEDS_SHARING",
            AccessSummary::TargetNotFound => "TARGET_NOT_FOUND",
            AccessSummary::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for AccessSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derive the summary from the four stage outcomes.
///
/// The precedence is fixed and order-sensitive; tooling depends on it:
/// auth failure anywhere wins, then missing scope, then the
/// visible-elsewhere-but-target-forbidden sharing case, then a missing
/// target, then the all-clear, and everything contradictory degrades to
/// `Unknown` rather than guessing.
pub fn summarize(
    token: ProbeOutcome,
    root: ProbeOutcome,
    target: ProbeOutcome,
    any_access: ProbeOutcome,
) -> AccessSummary {
    use ProbeOutcome::*;

    let stages = [token, root, target, any_access];
    if stages.contains(&AuthFailed) {
        return AccessSummary::NeedsAuthFix;
    }
    if stages.contains(&ScopeInsufficient) {
        return AccessSummary::NeedsScopeFix;
    }
    if any_access == Ok && target == Forbidden {
        return AccessSummary::NeedsSharing;
    }
    if target == NotFound {
        return AccessSummary::TargetNotFound;
    }
    if root == Ok && target == Ok {
        return AccessSummary::Ready;
    }
    AccessSummary::Unknown
}

/// The full diagnostic report: ordered probe results plus the derived
/// summary. Consumed read-only.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub identity_email: String,
    pub target_folder_id: String,
    pub probes: Vec<ProbeResult>,
    pub summary: AccessSummary,
}

impl DiagnosticReport {
    /// Look up a stage's outcome; `UnknownError` if it never ran.
    pub fn outcome(&self, probe: ProbeName) -> ProbeOutcome {
        self.probes
            .iter()
            .find(|p| p.probe == probe)
            .map(|p| p.outcome)
            .unwrap_or(ProbeOutcome::UnknownError)
    }

    /// The remediation hint for this report's summary.
    pub fn remediation_hint(&self) -> String {
        match self.summary {
            AccessSummary::Ready => {
                "Access is healthy; assets under the target folder are streamable.".to_string()
            }
            AccessSummary::NeedsAuthFix => format!(
                "The identity {} could not authenticate. Verify the service-account \
                 key file is current and the account still exists.",
                self.identity_email
            ),
            AccessSummary::NeedsScopeFix => format!(
                "The token for {} lacks read access to storage. Grant a read scope \
                 (https://www.googleapis.com/auth/drive.readonly) to the identity.",
                self.identity_email
            ),
            AccessSummary::NeedsSharing => format!(
                "The identity can reach storage but not the target folder. Share \
                 folder {} with {} (viewer access is enough).",
                self.target_folder_id, self.identity_email
            ),
            AccessSummary::TargetNotFound => format!(
                "Target folder {} was not found, or exists but is not shared with \
                 {}; the API cannot tell the two apart. Verify the configured id.",
                self.target_folder_id, self.identity_email
            ),
            AccessSummary::Unknown => {
                "Probe outcomes are incomplete or contradictory; inspect the \
                 individual probe details."
                    .to_string()
            }
        }
    }

    /// Human-readable rendering: one line per probe plus the remediation
    /// hint.
    pub fn render_text(&self) -> String {
        let mut out = format!(
            "Access diagnostics for {} (target folder {})\n",
            self.identity_email, self.target_folder_id
        );
        for (index, probe) in self.probes.iter().enumerate() {
            let status = probe
                .http_status
                .map(|s| format!(" ({})", s))
                .unwrap_or_default();
            out.push_str(&format!(
                "  {}. {:<14} {:<18}{} {}\n",
                index + 1,
                probe.probe,
                probe.outcome,
                status,
                probe.detail
            ));
        }
        out.push_str(&format!("Summary: {}\n", self.summary));
        out.push_str(&format!("Hint: {}\n", self.remediation_hint()));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAGE2_3_OUTCOMES: [ProbeOutcome; 4] = [
        ProbeOutcome::Ok,
        ProbeOutcome::Forbidden,
        ProbeOutcome::NotFound,
        ProbeOutcome::ScopeInsufficient,
    ];

    #[test]
    fn auth_failure_dominates_everything() {
        for root in STAGE2_3_OUTCOMES {
            for target in STAGE2_3_OUTCOMES {
                assert_eq!(
                    summarize(ProbeOutcome::AuthFailed, root, target, ProbeOutcome::Ok),
                    AccessSummary::NeedsAuthFix
                );
            }
        }
    }

    #[test]
    fn precedence_table_with_any_access_ok() {
        use AccessSummary::*;
        use ProbeOutcome::*;

        // Rows: root outcome; columns: target outcome, in the order of
        // STAGE2_3_OUTCOMES. Stage 1 Ok, stage 4 Ok.
        let expected = [
            // root = Ok
            [Ready, NeedsSharing, TargetNotFound, NeedsScopeFix],
            // root = Forbidden
            [Unknown, NeedsSharing, TargetNotFound, NeedsScopeFix],
            // root = NotFound
            [Unknown, NeedsSharing, TargetNotFound, NeedsScopeFix],
            // root = ScopeInsufficient
            [
                NeedsScopeFix,
                NeedsScopeFix,
                NeedsScopeFix,
                NeedsScopeFix,
            ],
        ];

        for (i, root) in STAGE2_3_OUTCOMES.into_iter().enumerate() {
            for (j, target) in STAGE2_3_OUTCOMES.into_iter().enumerate() {
                assert_eq!(
                    summarize(Ok, root, target, Ok),
                    expected[i][j],
                    "root={root:?} target={target:?}"
                );
            }
        }
    }

    #[test]
    fn forbidden_target_without_any_access_is_not_sharing() {
        // With stage 4 failed there is no evidence the identity works
        // elsewhere, so the sharing diagnosis would be a guess.
        assert_eq!(
            summarize(
                ProbeOutcome::Ok,
                ProbeOutcome::Ok,
                ProbeOutcome::Forbidden,
                ProbeOutcome::UnknownError
            ),
            AccessSummary::Unknown
        );
    }

    #[test]
    fn contradictory_root_forbidden_target_ok_never_ready() {
        for any_access in [ProbeOutcome::Ok, ProbeOutcome::UnknownError] {
            let summary = summarize(
                ProbeOutcome::Ok,
                ProbeOutcome::Forbidden,
                ProbeOutcome::Ok,
                any_access,
            );
            assert_ne!(summary, AccessSummary::Ready);
            assert_eq!(summary, AccessSummary::Unknown);
        }
    }

    #[test]
    fn outcome_classification_from_storage_errors() {
        assert_eq!(
            ProbeOutcome::from_storage_error(&StorageError::Auth {
                detail: String::new()
            }),
            ProbeOutcome::AuthFailed
        );
        assert_eq!(
            ProbeOutcome::from_storage_error(&StorageError::Forbidden {
                status: 403,
                detail: String::new()
            }),
            ProbeOutcome::Forbidden
        );
        assert_eq!(
            ProbeOutcome::from_storage_error(&StorageError::ScopeInsufficient {
                status: 403,
                detail: String::new()
            }),
            ProbeOutcome::ScopeInsufficient
        );
        assert_eq!(
            ProbeOutcome::from_storage_error(&StorageError::NotFound { id: "x".into() }),
            ProbeOutcome::NotFound
        );
        assert_eq!(
            ProbeOutcome::from_storage_error(&StorageError::Transient {
                detail: String::new()
            }),
            ProbeOutcome::UnknownError
        );
    }

    #[test]
    fn report_serializes_outcomes_in_wire_format() {
        let report = DiagnosticReport {
            identity_email: "viewer@example.iam.gserviceaccount.com".to_string(),
            target_folder_id: "folder1".to_string(),
            probes: vec![ProbeResult::ok(ProbeName::Token, "token issued")],
            summary: AccessSummary::Ready,
        };

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"summary\":\"READY\""));
        assert!(json.contains("\"outcome\":\"OK\""));
        assert!(json.contains("\"probe\":\"token\""));
    }

    #[test]
    fn sharing_hint_names_the_identity() {
        let report = DiagnosticReport {
            identity_email: "viewer@example.iam.gserviceaccount.com".to_string(),
            target_folder_id: "folder1".to_string(),
            probes: vec![],
            summary: AccessSummary::NeedsSharing,
        };

        let hint = report.remediation_hint();
        assert!(hint.contains("Share"));
        assert!(hint.contains("viewer@example.iam.gserviceaccount.com"));
        assert!(hint.contains("folder1"));
    }

    #[test]
    fn text_rendering_lists_probes_and_hint() {
        let report = DiagnosticReport {
            identity_email: "viewer@example.iam.gserviceaccount.com".to_string(),
            target_folder_id: "folder1".to_string(),
            probes: vec![
                ProbeResult::ok(ProbeName::Token, "token issued"),
                ProbeResult::from_error(
                    ProbeName::TargetFolder,
                    &StorageError::Forbidden {
                        status: 403,
                        detail: "not shared".to_string(),
                    },
                ),
            ],
            summary: AccessSummary::NeedsSharing,
        };

        let text = report.render_text();
        assert!(text.contains("1. token"));
        assert!(text.contains("FORBIDDEN"));
        assert!(text.contains("(403)"));
        assert!(text.contains("Summary: NEEDS_SHARING"));
        assert!(text.contains("Hint: "));
    }
}
