//! Core data types flowing through the batch pipeline.

use serde::{Serialize, Serializer};
use std::path::PathBuf;
use std::time::Duration;

use crate::buffer::PixelBuffer;
use crate::error::PipelineError;
use crate::transform::Transform;

/// One decoded input waiting for the transform.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    /// Display name; also the output file name relative to the output directory
    pub name: String,
    /// Decoded pixels
    pub buffer: PixelBuffer,
}

/// Output of the transform for one input.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub name: String,
    pub buffer: PixelBuffer,
}

impl TransformRequest {
    pub fn new(name: impl Into<String>, buffer: PixelBuffer) -> Self {
        Self {
            name: name.into(),
            buffer,
        }
    }

    /// Consume the request and produce its result.
    pub fn run(self, transform: Transform) -> TransformResult {
        TransformResult {
            buffer: transform.apply(&self.buffer),
            name: self.name,
        }
    }
}

/// A single item the batch could not complete.
#[derive(Debug, Clone, Serialize)]
pub struct FailedItem {
    /// Source path, or the display name for in-memory inputs
    pub path: PathBuf,
    /// "decode", "transform" or "encode"
    pub stage: String,
    /// Error message
    pub message: String,
}

impl FailedItem {
    pub fn from_error(path: impl Into<PathBuf>, error: &PipelineError) -> Self {
        Self {
            path: path.into(),
            stage: error.stage().to_string(),
            message: error.to_string(),
        }
    }
}

/// What happened to one unit of work.
#[derive(Debug, Clone)]
pub enum ItemOutcome {
    /// Transformed and written
    Written {
        name: String,
        output: PathBuf,
        width: u32,
        height: u32,
    },
    /// Skipped or failed at some stage
    Failed(FailedItem),
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Written { .. })
    }
}

/// Aggregate result of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Transform applied to every item
    pub transform: Transform,
    /// Worker-pool size
    pub workers: usize,
    /// Units submitted
    pub total: usize,
    /// Units transformed and written
    pub succeeded: usize,
    /// Units skipped because they could not be decoded
    pub decode_failed: usize,
    /// Units whose worker did not finish
    pub transform_failed: usize,
    /// Units whose output could not be written
    pub encode_failed: usize,
    /// Details of every failed unit
    pub failures: Vec<FailedItem>,
    /// Wall-clock time from first submission to the last completion
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl BatchReport {
    pub(crate) fn new(transform: Transform, workers: usize) -> Self {
        Self {
            transform,
            workers,
            total: 0,
            succeeded: 0,
            decode_failed: 0,
            transform_failed: 0,
            encode_failed: 0,
            failures: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Count one outcome.
    pub(crate) fn record(&mut self, outcome: ItemOutcome) {
        self.total += 1;
        match outcome {
            ItemOutcome::Written { .. } => self.succeeded += 1,
            ItemOutcome::Failed(item) => {
                match item.stage.as_str() {
                    "decode" => self.decode_failed += 1,
                    "encode" => self.encode_failed += 1,
                    _ => self.transform_failed += 1,
                }
                self.failures.push(item);
            }
        }
    }

    /// Total failures across all stages.
    pub fn failed(&self) -> usize {
        self.decode_failed + self.transform_failed + self.encode_failed
    }

    /// Successful items per second.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.succeeded as f64 / secs
        } else {
            0.0
        }
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(stage: &str) -> ItemOutcome {
        ItemOutcome::Failed(FailedItem {
            path: PathBuf::from("x.png"),
            stage: stage.to_string(),
            message: "boom".to_string(),
        })
    }

    #[test]
    fn test_report_tally() {
        let mut report = BatchReport::new(Transform::Sepia, 4);
        report.record(ItemOutcome::Written {
            name: "a.png".into(),
            output: PathBuf::from("out/a.png"),
            width: 2,
            height: 2,
        });
        report.record(failure("decode"));
        report.record(failure("encode"));
        report.record(failure("transform"));

        assert_eq!(report.total, 4);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.decode_failed, 1);
        assert_eq!(report.encode_failed, 1);
        assert_eq!(report.transform_failed, 1);
        assert_eq!(report.failed(), 3);
        assert_eq!(report.failures.len(), 3);
    }

    #[test]
    fn test_only_written_items_are_successes() {
        let written = ItemOutcome::Written {
            name: "a.png".into(),
            output: PathBuf::from("out/a.png"),
            width: 1,
            height: 1,
        };
        assert!(written.is_success());
        assert!(!failure("decode").is_success());
        assert!(!failure("transform").is_success());
    }

    #[test]
    fn test_report_serializes_elapsed_as_millis() {
        let mut report = BatchReport::new(Transform::Rotate { degrees: 90.0 }, 10);
        report.elapsed = Duration::from_millis(1500);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["elapsed_ms"], 1500);
        assert_eq!(json["workers"], 10);
        assert_eq!(json["transform"]["kind"], "rotate");
        assert_eq!(json["transform"]["degrees"], 90.0);
    }

    #[test]
    fn test_rate_with_zero_elapsed() {
        let report = BatchReport::new(Transform::Identity, 1);
        assert_eq!(report.rate(), 0.0);
    }

    #[test]
    fn test_request_run_keeps_name() {
        let buf = PixelBuffer::new(2, 2).unwrap();
        let result = TransformRequest::new("dir/a.png", buf).run(Transform::Negative);
        assert_eq!(result.name, "dir/a.png");
        assert!(result.buffer.as_raw().iter().all(|&c| c == 255));
    }
}
