//! Shared application state.

use core_catalog::AssetResolver;
use core_diagnostics::AccessDiagnostics;
use core_stream::StreamProxy;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything the handlers need, assembled once at startup.
pub struct AppState {
    pub resolver: Arc<AssetResolver>,
    pub proxy: Arc<StreamProxy>,
    pub diagnostics: Arc<AccessDiagnostics>,
    pub target_folder_id: String,
    /// Root cancellation token; cancelled on shutdown so in-flight
    /// traversals and streams abort instead of finishing into a dead
    /// socket.
    pub shutdown: CancellationToken,
}

pub type SharedState = Arc<AppState>;
