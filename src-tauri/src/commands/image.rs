//! Tauri command backing the image viewer modal.

use tauri::AppHandle;
use tracing::info;

use crate::api::client::ImageKind;
use crate::commands::processing::api_client;
use crate::imaging;

/// Fetch a job's original or processed image and return it as a `data:` URL.
#[tauri::command]
pub async fn fetch_job_image(
    app: AppHandle,
    job_db_id: i64,
    kind: String,
) -> Result<String, String> {
    info!("fetch_job_image called for job {} ({})", job_db_id, kind);
    let kind = ImageKind::parse(&kind).map_err(String::from)?;
    let client = api_client(&app)?;
    let payload = client.job_image(job_db_id, kind).await.map_err(String::from)?;
    imaging::payload_to_data_url(&payload).map_err(String::from)
}
