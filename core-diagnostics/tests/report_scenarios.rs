//! End-to-end report scenarios against a mocked storage backend.

use async_trait::async_trait;
use bridge_traits::error::{StorageError, StorageResult};
use bridge_traits::storage::{AssetRef, ChildEntry, RangeData, StorageClient};
use core_auth::{AccessToken, TokenSource};
use core_diagnostics::{AccessDiagnostics, AccessSummary, ProbeName, ProbeOutcome};
use mockall::mock;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

mock! {
    Storage {}

    #[async_trait]
    impl StorageClient for Storage {
        async fn list_children(&self, folder_id: &str) -> StorageResult<Vec<ChildEntry>>;
        async fn list_shared_with_me(&self) -> StorageResult<Vec<ChildEntry>>;
        async fn list_any_visible(&self) -> StorageResult<Vec<ChildEntry>>;
        async fn get_metadata(&self, file_id: &str) -> StorageResult<AssetRef>;
        async fn fetch_range(&self, file_id: &str, start: u64, end: u64) -> StorageResult<RangeData>;
    }
}

struct Tokens;

#[async_trait]
impl TokenSource for Tokens {
    async fn token(&self) -> core_auth::Result<AccessToken> {
        Ok(AccessToken::new("t".to_string(), 3600))
    }

    fn identity_email(&self) -> &str {
        "viewer@tankview-project.iam.gserviceaccount.com"
    }
}

fn item(id: &str) -> ChildEntry {
    ChildEntry {
        id: id.to_string(),
        name: id.to_string(),
        mime_type: "video/mp4".to_string(),
        size: Some(1),
        is_folder: false,
    }
}

/// Root probe OK, target probe FORBIDDEN, any-access probe OK: the
/// canonical "storage works, folder was never shared" situation.
#[tokio::test]
async fn sharing_gap_produces_needs_sharing_with_actionable_hint() {
    let mut storage = MockStorage::new();
    storage
        .expect_list_children()
        .withf(|id| id == "root")
        .returning(|_| Ok(vec![item("r")]));
    storage
        .expect_list_children()
        .withf(|id| id == "tank-folder")
        .returning(|_| {
            Err(StorageError::Forbidden {
                status: 403,
                detail: "The caller does not have permission".to_string(),
            })
        });
    storage
        .expect_list_shared_with_me()
        .returning(|| Ok(vec![item("elsewhere")]));

    let diagnostics = AccessDiagnostics::new(Arc::new(Tokens), Arc::new(storage), "tank-folder");
    let report = diagnostics.run(&CancellationToken::new()).await;

    assert_eq!(report.summary, AccessSummary::NeedsSharing);
    assert_eq!(
        report.outcome(ProbeName::TargetFolder),
        ProbeOutcome::Forbidden
    );

    let text = report.render_text();
    assert!(text.contains("NEEDS_SHARING"));
    assert!(text.contains("viewer@tankview-project.iam.gserviceaccount.com"));
    assert!(text.contains("tank-folder"));
}

/// A scope problem on the root listing dominates a missing target:
/// fixing the scope comes before investigating the folder.
#[tokio::test]
async fn scope_problem_dominates_missing_target() {
    let mut storage = MockStorage::new();
    storage
        .expect_list_children()
        .withf(|id| id == "root")
        .returning(|_| {
            Err(StorageError::ScopeInsufficient {
                status: 403,
                detail: "Insufficient Permission".to_string(),
            })
        });
    storage
        .expect_list_children()
        .withf(|id| id == "tank-folder")
        .returning(|_| {
            Err(StorageError::NotFound {
                id: "tank-folder".to_string(),
            })
        });
    storage
        .expect_list_shared_with_me()
        .returning(|| Ok(vec![]));
    storage.expect_list_any_visible().returning(|| Ok(vec![]));

    let diagnostics = AccessDiagnostics::new(Arc::new(Tokens), Arc::new(storage), "tank-folder");
    let report = diagnostics.run(&CancellationToken::new()).await;

    assert_eq!(report.summary, AccessSummary::NeedsScopeFix);
    assert!(report.remediation_hint().contains("drive.readonly"));
}

/// The report serializes with every probe present and in stage order,
/// which downstream tooling relies on.
#[tokio::test]
async fn report_probe_order_is_stable() {
    let mut storage = MockStorage::new();
    storage
        .expect_list_children()
        .returning(|_| Ok(vec![item("x")]));
    storage
        .expect_list_shared_with_me()
        .returning(|| Ok(vec![item("s")]));

    let diagnostics = AccessDiagnostics::new(Arc::new(Tokens), Arc::new(storage), "tank-folder");
    let report = diagnostics.run(&CancellationToken::new()).await;

    let names: Vec<_> = report.probes.iter().map(|p| p.probe).collect();
    assert_eq!(
        names,
        vec![
            ProbeName::Token,
            ProbeName::Root,
            ProbeName::TargetFolder,
            ProbeName::AnyAccess,
        ]
    );
}
