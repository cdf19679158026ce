//! Wire types for the image-processing service REST API.
//!
//! These mirror the service's JSON responses verbatim; anything the UI
//! consumes is re-shaped into the `*View` structs before crossing the
//! Tauri bridge, so the frontend never sees raw wire quirks like the
//! `objects_found` JSON-in-a-string column.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle states the service reports for a job.
///
/// A job is created as `Queued`, picked up by a worker as `Processing`,
/// and ends as either `Processed` or `Error`. Records are never mutated
/// client-side; each poll replaces them wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Queued,
    Processing,
    Processed,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::Processing => "PROCESSING",
            JobStatus::Processed => "PROCESSED",
            JobStatus::Error => "ERROR",
        }
    }
}

/// Broker queue depth from the summary endpoint.
///
/// The service reports a number when its management API is reachable and
/// the literal string `"N/A"` when it is not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueueDepth {
    Count(u64),
    Unavailable(String),
}

impl QueueDepth {
    pub fn display(&self) -> String {
        match self {
            QueueDepth::Count(n) => n.to_string(),
            QueueDepth::Unavailable(s) => s.clone(),
        }
    }
}

/// Response of `GET /processing-summary/`.
///
/// Read-only counters, replaced on every poll. The only decision hanging
/// off them is [`ProcessingSummary::is_complete`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProcessingSummary {
    #[serde(rename = "total_celery_workers")]
    pub workers: u32,
    #[serde(rename = "total_yolo_models_pre_loaded")]
    pub models_loaded: u32,
    #[serde(rename = "total_images_target")]
    pub target_images: u32,
    #[serde(rename = "total_processed_db")]
    pub processed: u32,
    #[serde(rename = "total_error_db")]
    pub errored: u32,
    #[serde(rename = "total_remaining")]
    pub remaining: u32,
    #[serde(rename = "in_processing_queue_db")]
    pub in_processing_queue: u32,
    #[serde(rename = "rabbitmq_job_queue_size", default)]
    pub broker_queue_size: Option<QueueDepth>,
    #[serde(rename = "total_time_taken_str", default)]
    pub elapsed: Option<String>,
}

impl ProcessingSummary {
    /// True once every targeted image has either processed or errored.
    /// This is the poll-loop stop condition; it is not validated beyond that.
    pub fn is_complete(&self) -> bool {
        self.target_images > 0 && self.processed + self.errored >= self.target_images
    }
}

/// One detected object inside a processed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
    #[serde(rename = "box")]
    pub bounding_box: [i32; 4],
}

/// Response of `GET /jobs/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobRecord {
    pub id: i64,
    pub image_name: String,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default, deserialize_with = "flexible_ts::deserialize")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "flexible_ts::deserialize")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_taken_ms: Option<i64>,
    /// JSON string: either `[{label, confidence, box}, ...]` or, for failed
    /// jobs, `[{"error": "..."}]`.
    #[serde(default)]
    pub objects_found: Option<String>,
    #[serde(default)]
    pub processed_image_path: Option<String>,
    pub status: JobStatus,
}

/// Response of `POST /start-processing/`.
#[derive(Debug, Clone, Deserialize)]
pub struct StartResponse {
    pub message: String,
}

/// Response of `GET /image/{id}?type=...`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePayload {
    pub base64_image: String,
    pub content_type: String,
}

/// What an `objects_found` payload turned out to contain.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionPayload {
    Detections(Vec<Detection>),
    Failure(String),
}

/// Decode an `objects_found` string.
///
/// Failed jobs carry `[{"error": "..."}]` in the same column; malformed
/// JSON becomes a `Failure` as well so the UI always has something to show.
pub fn parse_objects_found(raw: &str) -> DetectionPayload {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => return DetectionPayload::Failure(format!("invalid detection data: {}", e)),
    };

    if let Some(entries) = value.as_array() {
        let errors: Vec<&str> = entries
            .iter()
            .filter_map(|entry| entry.get("error").and_then(|e| e.as_str()))
            .collect();
        if !errors.is_empty() {
            return DetectionPayload::Failure(errors.join("; "));
        }
    }

    match serde_json::from_value::<Vec<Detection>>(value.clone()) {
        Ok(detections) => DetectionPayload::Detections(detections),
        Err(e) => {
            // Keep the payload itself visible so an odd worker response can
            // still be read in the detections modal.
            let pretty = serde_json::to_string_pretty(&value).unwrap_or_else(|_| raw.to_string());
            DetectionPayload::Failure(format!("unexpected detection shape: {}\n{}", e, pretty))
        }
    }
}

/// Summary re-shaped for the frontend: display strings resolved and the
/// stop condition pre-computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub workers: u32,
    pub models_loaded: u32,
    pub target_images: u32,
    pub processed: u32,
    pub errored: u32,
    pub remaining: u32,
    pub in_processing_queue: u32,
    pub broker_queue: String,
    pub elapsed: Option<String>,
    pub complete: bool,
}

impl From<ProcessingSummary> for SummaryView {
    fn from(summary: ProcessingSummary) -> Self {
        let complete = summary.is_complete();
        SummaryView {
            workers: summary.workers,
            models_loaded: summary.models_loaded,
            target_images: summary.target_images,
            processed: summary.processed,
            errored: summary.errored,
            remaining: summary.remaining,
            in_processing_queue: summary.in_processing_queue,
            broker_queue: summary
                .broker_queue_size
                .map(|q| q.display())
                .unwrap_or_else(|| "N/A".to_string()),
            elapsed: summary.elapsed,
            complete,
        }
    }
}

/// Job record re-shaped for the frontend: timestamps formatted and the
/// `objects_found` string decoded on this side of the bridge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobView {
    pub id: i64,
    pub image_name: String,
    pub job_id: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub time_taken_ms: Option<i64>,
    pub status: JobStatus,
    pub has_processed_image: bool,
    pub detections: Vec<Detection>,
    pub detection_error: Option<String>,
}

const DISPLAY_TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl From<JobRecord> for JobView {
    fn from(record: JobRecord) -> Self {
        let (detections, detection_error) = match record.objects_found.as_deref() {
            None => (vec![], None),
            Some(raw) => match parse_objects_found(raw) {
                DetectionPayload::Detections(d) => (d, None),
                DetectionPayload::Failure(msg) => (vec![], Some(msg)),
            },
        };

        let has_processed_image =
            record.status == JobStatus::Processed && record.processed_image_path.is_some();

        JobView {
            id: record.id,
            image_name: record.image_name,
            job_id: record.job_id,
            start_time: record
                .start_time
                .map(|t| t.format(DISPLAY_TS_FORMAT).to_string()),
            end_time: record
                .end_time
                .map(|t| t.format(DISPLAY_TS_FORMAT).to_string()),
            time_taken_ms: record.time_taken_ms,
            status: record.status,
            has_processed_image,
            detections,
            detection_error,
        }
    }
}

pub(crate) mod flexible_ts {
    //! The service emits RFC 3339 for worker-written timestamps but naive
    //! datetimes for DB-defaulted columns; both are UTC.

    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse(&raw).map(Some).map_err(serde::de::Error::custom),
        }
    }

    pub(crate) fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("unrecognized timestamp '{}': {}", raw, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_deserializes_wire_names() {
        let json = r#"{
            "total_celery_workers": 2,
            "total_yolo_models_pre_loaded": 1,
            "total_images_target": 50,
            "total_processed_db": 30,
            "total_error_db": 5,
            "total_remaining": 15,
            "in_processing_queue_db": 4,
            "rabbitmq_job_queue_size": 11,
            "total_time_taken_str": "42.5s"
        }"#;
        let summary: ProcessingSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.workers, 2);
        assert_eq!(summary.target_images, 50);
        assert_eq!(summary.broker_queue_size, Some(QueueDepth::Count(11)));
        assert_eq!(summary.elapsed.as_deref(), Some("42.5s"));
        assert!(!summary.is_complete());
    }

    #[test]
    fn test_queue_depth_accepts_na_string() {
        let json = r#"{
            "total_celery_workers": 1,
            "total_yolo_models_pre_loaded": 1,
            "total_images_target": 0,
            "total_processed_db": 0,
            "total_error_db": 0,
            "total_remaining": 0,
            "in_processing_queue_db": 0,
            "rabbitmq_job_queue_size": "N/A"
        }"#;
        let summary: ProcessingSummary = serde_json::from_str(json).unwrap();
        assert_eq!(
            summary.broker_queue_size,
            Some(QueueDepth::Unavailable("N/A".to_string()))
        );
        assert_eq!(SummaryView::from(summary).broker_queue, "N/A");
    }

    #[test]
    fn test_is_complete_requires_positive_target() {
        let summary = ProcessingSummary::default();
        assert!(!summary.is_complete(), "zero target must never complete");

        let summary = ProcessingSummary {
            target_images: 10,
            processed: 7,
            errored: 3,
            ..Default::default()
        };
        assert!(summary.is_complete());

        let summary = ProcessingSummary {
            target_images: 10,
            processed: 7,
            errored: 2,
            ..Default::default()
        };
        assert!(!summary.is_complete());
    }

    #[test]
    fn test_job_record_minimal_fields() {
        let json = r#"{"id": 3, "image_name": "cat.jpg", "status": "QUEUED"}"#;
        let record: JobRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 3);
        assert_eq!(record.status, JobStatus::Queued);
        assert!(record.start_time.is_none());
        assert!(record.objects_found.is_none());
    }

    #[test]
    fn test_flexible_ts_accepts_both_forms() {
        let tz_aware = flexible_ts::parse("2026-08-30T10:15:00+00:00").unwrap();
        let naive = flexible_ts::parse("2026-08-30T10:15:00.123456").unwrap();
        assert_eq!(tz_aware.format("%Y-%m-%d %H:%M:%S").to_string(), "2026-08-30 10:15:00");
        assert_eq!(naive.format("%H:%M:%S").to_string(), "10:15:00");
        assert!(flexible_ts::parse("yesterday").is_err());
    }

    #[test]
    fn test_parse_objects_found_detections() {
        let raw = r#"[{"label": "dog", "confidence": 0.91, "box": [10, 20, 110, 220]}]"#;
        match parse_objects_found(raw) {
            DetectionPayload::Detections(d) => {
                assert_eq!(d.len(), 1);
                assert_eq!(d[0].label, "dog");
                assert_eq!(d[0].bounding_box, [10, 20, 110, 220]);
            }
            other => panic!("expected detections, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_objects_found_error_entry() {
        let raw = r#"[{"error": "YOLO model not loaded."}]"#;
        assert_eq!(
            parse_objects_found(raw),
            DetectionPayload::Failure("YOLO model not loaded.".to_string())
        );
    }

    #[test]
    fn test_parse_objects_found_unknown_shape_carries_payload() {
        let raw = r#"{"labels": ["car"], "scores": [0.9]}"#;
        match parse_objects_found(raw) {
            DetectionPayload::Failure(msg) => {
                assert!(msg.contains("unexpected detection shape"), "got: {}", msg);
                assert!(msg.contains("\"labels\""), "payload missing from: {}", msg);
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_objects_found_malformed_json() {
        match parse_objects_found("not json at all") {
            DetectionPayload::Failure(msg) => {
                assert!(msg.contains("invalid detection data"), "got: {}", msg)
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_job_view_gates_processed_image_on_status() {
        let record = JobRecord {
            id: 1,
            image_name: "a.jpg".to_string(),
            job_id: None,
            start_time: None,
            end_time: None,
            time_taken_ms: None,
            objects_found: None,
            processed_image_path: Some("/processed/a_processed.jpg".to_string()),
            status: JobStatus::Error,
        };
        let view = JobView::from(record);
        assert!(!view.has_processed_image, "ERROR rows must not offer a processed view");
    }

    #[test]
    fn test_job_view_formats_timestamps() {
        let record = JobRecord {
            id: 1,
            image_name: "a.jpg".to_string(),
            job_id: Some("celery-123".to_string()),
            start_time: Some(flexible_ts::parse("2026-08-30T09:00:05+00:00").unwrap()),
            end_time: None,
            time_taken_ms: Some(350),
            objects_found: Some(r#"[{"label":"cat","confidence":0.8,"box":[0,0,5,5]}]"#.to_string()),
            processed_image_path: Some("/p/a.jpg".to_string()),
            status: JobStatus::Processed,
        };
        let view = JobView::from(record);
        assert_eq!(view.start_time.as_deref(), Some("2026-08-30 09:00:05"));
        assert!(view.end_time.is_none());
        assert!(view.has_processed_image);
        assert_eq!(view.detections.len(), 1);
        assert!(view.detection_error.is_none());
    }
}
