pub mod api;
mod commands;
mod error;
pub mod imaging;

pub use error::SightlineError;

pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tauri::Builder::default()
        .plugin(tauri_plugin_store::Builder::new().build())
        .invoke_handler(tauri::generate_handler![
            commands::config::get_preference,
            commands::config::set_preference,
            commands::health::run_health_check,
            commands::processing::get_processing_summary,
            commands::processing::fetch_jobs,
            commands::processing::start_processing,
            commands::image::fetch_job_image,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
