use std::time::Duration;

use serde::Serialize;
use tauri::AppHandle;
use tauri_plugin_store::StoreExt;
use tracing::info;

use crate::api::client::ApiClient;
use crate::commands::config::STORE_FILE;
use crate::commands::processing::backend_url;

/// How long the reachability probe waits before giving up. Much shorter
/// than the normal request timeout so the health page stays responsive.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub backend_url: String,
    pub backend_url_configured: bool,
    pub backend_reachable: bool,
    pub backend_detail: Option<String>,
    pub target_images: Option<u32>,
    pub workers_online: Option<u32>,
}

/// Check that a backend URL is configured and that the service answers
/// its summary endpoint.
#[tauri::command]
pub async fn run_health_check(app: AppHandle) -> Result<HealthReport, String> {
    info!("Running health check");

    let configured = app
        .store(STORE_FILE)
        .ok()
        .and_then(|store| store.get("backend_url"))
        .and_then(|v| v.as_str().map(|s| s.to_string()))
        .map(|s| !s.is_empty())
        .unwrap_or(false);

    let url = backend_url(&app)?;
    info!("Probing backend at {} (configured: {})", url, configured);

    let client = match ApiClient::new(&url) {
        Ok(client) => client,
        Err(e) => {
            return Ok(HealthReport {
                backend_url: url,
                backend_url_configured: configured,
                backend_reachable: false,
                backend_detail: Some(e.to_string()),
                target_images: None,
                workers_online: None,
            })
        }
    };

    let (reachable, detail, target, workers) =
        match tokio::time::timeout(PROBE_TIMEOUT, client.processing_summary()).await {
            Ok(Ok(summary)) => (true, None, Some(summary.target_images), Some(summary.workers)),
            Ok(Err(e)) => (false, Some(e.to_string()), None, None),
            Err(_) => (
                false,
                Some(format!("no response within {}s", PROBE_TIMEOUT.as_secs())),
                None,
                None,
            ),
        };
    info!("Backend reachable: {}", reachable);

    Ok(HealthReport {
        backend_url: url,
        backend_url_configured: configured,
        backend_reachable: reachable,
        backend_detail: detail,
        target_images: target,
        workers_online: workers,
    })
}
