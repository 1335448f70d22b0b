//! Breadth-first video discovery with cycle and depth guards.

use crate::error::{CatalogError, Result};
use bridge_traits::error::StorageError;
use bridge_traits::storage::{AssetRef, StorageClient};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// A subtree the traversal could not enter, recorded instead of failing
/// the whole resolve call.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFolder {
    pub folder_id: String,
    pub depth: u32,
    pub reason: String,
}

/// Discovery output: assets in stable breadth-first order, plus the
/// subtrees that could not be entered.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub assets: Vec<AssetRef>,
    pub skipped: Vec<SkippedFolder>,
}

/// Walks a folder tree and collects playable video assets.
pub struct AssetResolver {
    storage: Arc<dyn StorageClient>,
    video_mime_types: Vec<String>,
    max_depth: u32,
    list_concurrency: usize,
}

impl AssetResolver {
    /// `max_depth` counts folder levels below the root; `1` means only
    /// the root's immediate subfolders are entered.
    pub fn new(
        storage: Arc<dyn StorageClient>,
        video_mime_types: Vec<String>,
        max_depth: u32,
        list_concurrency: usize,
    ) -> Self {
        Self {
            storage,
            video_mime_types,
            max_depth,
            list_concurrency: list_concurrency.max(1),
        }
    }

    fn is_video(&self, mime_type: &str) -> bool {
        let mime = mime_type.to_ascii_lowercase();
        self.video_mime_types.iter().any(|allowed| *allowed == mime)
    }

    /// Resolve every reachable video asset under `root_folder_id`.
    ///
    /// Fails only on authentication failure or cancellation; a subfolder
    /// failing with Forbidden or NotFound (or still failing after the
    /// storage client's transient retries) becomes a skip record and its
    /// siblings continue.
    #[instrument(skip(self, cancel), fields(root = %root_folder_id))]
    pub async fn resolve(
        &self,
        root_folder_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Resolution> {
        let mut assets = Vec::new();
        let mut skipped = Vec::new();

        // Cycle guard: a folder id enters the frontier at most once per
        // traversal, so a folder listed as its own descendant terminates.
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(root_folder_id.to_string());

        let mut frontier: Vec<(String, u32)> = vec![(root_folder_id.to_string(), 0)];

        while !frontier.is_empty() {
            if cancel.is_cancelled() {
                return Err(CatalogError::Cancelled);
            }

            // Sibling subtrees are independent; list them concurrently
            // but collect in frontier order so output stays stable
            // regardless of completion order.
            let storage = &self.storage;
            let current_level = std::mem::take(&mut frontier);
            let listings: Vec<_> = stream::iter(current_level)
                .map(|(folder_id, depth)| {
                    let storage = storage.clone();
                    async move {
                        let result = storage.list_children(&folder_id).await;
                        (folder_id, depth, result)
                    }
                })
                .buffered(self.list_concurrency)
                .collect()
                .await;

            let mut next_frontier = Vec::new();

            for (folder_id, depth, result) in listings {
                let children = match result {
                    Ok(children) => children,
                    Err(StorageError::Auth { detail }) => {
                        return Err(CatalogError::Auth(detail));
                    }
                    Err(e) => {
                        warn!(folder_id = %folder_id, error = %e, "Skipping unreachable subtree");
                        skipped.push(SkippedFolder {
                            folder_id,
                            depth,
                            reason: e.to_string(),
                        });
                        continue;
                    }
                };

                for child in children {
                    if child.is_folder {
                        if depth + 1 > self.max_depth {
                            debug!(folder_id = %child.id, "Depth bound reached, not descending");
                            continue;
                        }
                        if visited.insert(child.id.clone()) {
                            next_frontier.push((child.id, depth + 1));
                        }
                    } else if self.is_video(&child.mime_type) {
                        assets.push(AssetRef {
                            id: child.id,
                            name: child.name,
                            mime_type: child.mime_type,
                            size: child.size.unwrap_or(0),
                            parent_id: Some(folder_id.clone()),
                        });
                    }
                }
            }

            frontier = next_frontier;
        }

        info!(
            assets = assets.len(),
            skipped = skipped.len(),
            "Asset discovery complete"
        );

        Ok(Resolution { assets, skipped })
    }
}
