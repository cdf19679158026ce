//! Tauri commands for the processing run: summary, job list, and kick-off.

use tauri::AppHandle;
use tauri_plugin_store::StoreExt;
use tracing::{info, warn};

use crate::api::client::ApiClient;
use crate::api::types::{JobView, SummaryView};
use crate::commands::config::STORE_FILE;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_JOB_FETCH_LIMIT: u32 = 1000;

/// Read the backend base URL preference, falling back to the local default.
pub(crate) fn backend_url(app: &AppHandle) -> Result<String, String> {
    let store = app.store(STORE_FILE).map_err(|e| {
        warn!("Failed to open {}: {}", STORE_FILE, e);
        e.to_string()
    })?;
    Ok(store
        .get("backend_url")
        .and_then(|v| v.as_str().map(|s| s.to_string()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()))
}

pub(crate) fn api_client(app: &AppHandle) -> Result<ApiClient, String> {
    let url = backend_url(app)?;
    ApiClient::new(&url).map_err(String::from)
}

#[tauri::command]
pub async fn get_processing_summary(app: AppHandle) -> Result<SummaryView, String> {
    let client = api_client(&app)?;
    let summary = client.processing_summary().await.map_err(String::from)?;
    Ok(SummaryView::from(summary))
}

#[tauri::command]
pub async fn fetch_jobs(app: AppHandle, limit: Option<u32>) -> Result<Vec<JobView>, String> {
    let client = api_client(&app)?;
    let limit = limit.unwrap_or(DEFAULT_JOB_FETCH_LIMIT);
    let jobs = client.jobs(limit).await.map_err(String::from)?;
    info!("Fetched {} job records (limit {})", jobs.len(), limit);
    Ok(jobs.into_iter().map(JobView::from).collect())
}

/// Kick off a new processing run. Returns the service's confirmation message.
#[tauri::command]
pub async fn start_processing(app: AppHandle) -> Result<String, String> {
    info!("start_processing called");
    let client = api_client(&app)?;
    let response = client.start_processing().await.map_err(String::from)?;
    info!("Processing started: {}", response.message);
    Ok(response.message)
}
