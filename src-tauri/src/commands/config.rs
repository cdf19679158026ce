//! Preference persistence: backend URL, polling knobs, and theme.

use tauri::AppHandle;
use tauri_plugin_store::StoreExt;
use tracing::{info, warn};

use crate::error::SightlineError;

pub(crate) const STORE_FILE: &str = "preferences.json";

/// Keys the UI reads and writes. Anything else is rejected instead of
/// silently landing in the store file.
const KNOWN_KEYS: [&str; 4] = ["backend_url", "poll_interval_ms", "job_fetch_limit", "theme"];

fn known_key(key: &str) -> Result<(), SightlineError> {
    if KNOWN_KEYS.contains(&key) {
        Ok(())
    } else {
        Err(SightlineError::Config(format!(
            "unknown preference key '{}'",
            key
        )))
    }
}

fn open_error(e: tauri_plugin_store::Error) -> String {
    warn!("Failed to open {}: {}", STORE_FILE, e);
    String::from(SightlineError::Config(e.to_string()))
}

#[tauri::command]
pub fn get_preference(app: AppHandle, key: &str) -> Result<Option<String>, String> {
    known_key(key).map_err(String::from)?;
    let store = app.store(STORE_FILE).map_err(open_error)?;
    Ok(store.get(key).and_then(|v| v.as_str().map(|s| s.to_string())))
}

#[tauri::command]
pub fn set_preference(app: AppHandle, key: &str, value: &str) -> Result<(), String> {
    known_key(key).map_err(String::from)?;
    info!("Preference updated: {} = {}", key, value);
    let store = app.store(STORE_FILE).map_err(open_error)?;
    store.set(key, serde_json::json!(value));
    store.save().map_err(|e| {
        warn!("Failed to persist {}: {}", STORE_FILE, e);
        String::from(SightlineError::Config(e.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_ui_key_is_known() {
        for key in ["backend_url", "poll_interval_ms", "job_fetch_limit", "theme"] {
            assert!(known_key(key).is_ok(), "'{}' should be accepted", key);
        }
    }

    #[test]
    fn test_unknown_key_rejected_as_config_error() {
        let err = known_key("api_token").unwrap_err();
        assert!(matches!(err, SightlineError::Config(_)), "got: {:?}", err);
        assert!(err.to_string().contains("api_token"));
    }
}
