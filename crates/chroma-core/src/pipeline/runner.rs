//! Bounded worker pool applying one transform to a batch of images.
//!
//! Every unit runs decode, transform and write on a blocking thread. A
//! semaphore caps how many units are in flight; the runner returns only
//! after every submitted unit has finished, so the report covers the whole
//! batch.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

use super::decode::{ImageDecoder, ImageSource};
use super::discovery::DiscoveredFile;
use super::encode::{ImageSink, ImageWriter};
use crate::config::{Config, LimitsConfig};
use crate::error::PipelineError;
use crate::transform::Transform;
use crate::types::{BatchReport, FailedItem, ItemOutcome, TransformRequest};

/// Default worker-pool size.
pub const DEFAULT_WORKERS: usize = 10;

/// One unit of work before it reaches a worker.
enum Unit {
    File(DiscoveredFile),
    Decoded(TransformRequest),
}

impl Unit {
    fn label(&self) -> PathBuf {
        match self {
            Self::File(file) => file.path.clone(),
            Self::Decoded(request) => PathBuf::from(&request.name),
        }
    }
}

/// Runs a single transform over many images with bounded parallelism.
pub struct BatchRunner {
    transform: Transform,
    workers: usize,
    max_dimension: u32,
    source: Arc<dyn ImageSource>,
    sink: Arc<dyn ImageSink>,
}

impl BatchRunner {
    /// Create a runner. A worker count of zero is treated as one.
    ///
    /// Outputs are bounded by the default `limits.max_image_dimension`.
    pub fn new(
        transform: Transform,
        workers: usize,
        source: Arc<dyn ImageSource>,
        sink: Arc<dyn ImageSink>,
    ) -> Self {
        Self {
            transform,
            workers: workers.max(1),
            max_dimension: LimitsConfig::default().max_image_dimension,
            source,
            sink,
        }
    }

    /// Fail items whose transformed width or height would exceed `max_dimension`.
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// Runner with the `image`-backed decoder and writer, sized from config.
    pub fn from_config(config: &Config, transform: Transform, output_dir: impl Into<PathBuf>) -> Self {
        Self::new(
            transform,
            config.processing.parallel_workers,
            Arc::new(ImageDecoder::new(config.limits.clone())),
            Arc::new(ImageWriter::new(output_dir, &config.output)),
        )
        .with_max_dimension(config.limits.max_image_dimension)
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Decode, transform and write every file.
    ///
    /// Files that fail to decode are skipped and reported; they never
    /// affect other files. `on_outcome` is called once per file as it
    /// completes, from a worker thread.
    pub async fn run<F>(&self, files: Vec<DiscoveredFile>, on_outcome: F) -> BatchReport
    where
        F: Fn(&ItemOutcome) + Send + Sync + 'static,
    {
        self.run_units(files.into_iter().map(Unit::File).collect(), on_outcome)
            .await
    }

    /// Transform and write buffers that were decoded elsewhere.
    pub async fn run_buffers<F>(&self, requests: Vec<TransformRequest>, on_outcome: F) -> BatchReport
    where
        F: Fn(&ItemOutcome) + Send + Sync + 'static,
    {
        self.run_units(requests.into_iter().map(Unit::Decoded).collect(), on_outcome)
            .await
    }

    async fn run_units<F>(&self, units: Vec<Unit>, on_outcome: F) -> BatchReport
    where
        F: Fn(&ItemOutcome) + Send + Sync + 'static,
    {
        let start = Instant::now();
        let mut report = BatchReport::new(self.transform, self.workers);

        tracing::info!(
            "Applying {} to {} images with {} workers",
            self.transform,
            units.len(),
            self.workers
        );

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let on_outcome = Arc::new(on_outcome);
        let mut handles = Vec::with_capacity(units.len());

        for unit in units {
            let label = unit.label();
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::warn!("Worker semaphore closed unexpectedly, stopping submission");
                    break;
                }
            };

            let transform = self.transform;
            let max_dimension = self.max_dimension;
            let source = self.source.clone();
            let sink = self.sink.clone();
            let on_outcome = on_outcome.clone();

            let handle = tokio::task::spawn_blocking(move || {
                let outcome = process_unit(
                    unit,
                    transform,
                    max_dimension,
                    source.as_ref(),
                    sink.as_ref(),
                );
                drop(permit);
                on_outcome(&outcome);
                outcome
            });
            handles.push((label, handle));
        }

        for (label, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Worker for {:?} panicked: {e}", label);
                    let error = PipelineError::Transform {
                        name: self.transform.name().to_string(),
                        message: format!("Worker panicked: {e}"),
                    };
                    let outcome = ItemOutcome::Failed(FailedItem::from_error(label, &error));
                    on_outcome(&outcome);
                    outcome
                }
            };
            report.record(outcome);
        }

        report.elapsed = start.elapsed();
        tracing::info!(
            "Batch complete: {} succeeded, {} failed in {:.2}s on {} workers",
            report.succeeded,
            report.failed(),
            report.elapsed.as_secs_f64(),
            report.workers
        );
        report
    }
}

fn process_unit(
    unit: Unit,
    transform: Transform,
    max_dimension: u32,
    source: &dyn ImageSource,
    sink: &dyn ImageSink,
) -> ItemOutcome {
    let (label, request) = match unit {
        Unit::File(file) => match source.decode(&file.path) {
            Ok(buffer) => (file.path, TransformRequest::new(file.name, buffer)),
            Err(e) => return failed(&file.path, e),
        },
        Unit::Decoded(request) => (PathBuf::from(&request.name), request),
    };

    let (width, height) = request.buffer.dimensions();
    let (out_width, out_height) = transform.output_dimensions(width, height);
    if out_width > max_dimension || out_height > max_dimension {
        let error = PipelineError::Transform {
            name: transform.name().to_string(),
            message: format!(
                "Output {out_width}x{out_height} exceeds max dimension {max_dimension}"
            ),
        };
        return failed(&label, error);
    }

    tracing::debug!("Transforming {:?}", label);
    let result = request.run(transform);
    let (width, height) = result.buffer.dimensions();

    match sink.write(&result) {
        Ok(output) => {
            tracing::debug!("Wrote {:?}", output);
            ItemOutcome::Written {
                name: result.name,
                output,
                width,
                height,
            }
        }
        Err(e) => failed(&label, e),
    }
}

fn failed(path: &Path, error: PipelineError) -> ItemOutcome {
    tracing::warn!("Skipping {:?}: {}", path, error);
    ItemOutcome::Failed(FailedItem::from_error(path, &error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PixelBuffer;
    use crate::config::{LimitsConfig, OutputConfig};
    use crate::error::PipelineResult;
    use crate::types::TransformResult;
    use image::{Rgb, RgbImage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Collects results in memory.
    #[derive(Default)]
    struct MemorySink {
        written: Mutex<Vec<TransformResult>>,
    }

    impl ImageSink for MemorySink {
        fn write(&self, result: &TransformResult) -> PipelineResult<PathBuf> {
            self.written.lock().unwrap().push(result.clone());
            Ok(PathBuf::from(&result.name))
        }
    }

    /// Fails for names containing "bad".
    struct PickySink;

    impl ImageSink for PickySink {
        fn write(&self, result: &TransformResult) -> PipelineResult<PathBuf> {
            if result.name.contains("bad") {
                return Err(PipelineError::Encode {
                    path: PathBuf::from(&result.name),
                    message: "disk full".to_string(),
                });
            }
            Ok(PathBuf::from(&result.name))
        }
    }

    /// Tracks the peak number of concurrent writes.
    struct SlowSink {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ImageSink for SlowSink {
        fn write(&self, result: &TransformResult) -> PipelineResult<PathBuf> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(PathBuf::from(&result.name))
        }
    }

    fn request(name: &str) -> TransformRequest {
        TransformRequest::new(name, PixelBuffer::filled(3, 2, Rgb([10, 20, 30])).unwrap())
    }

    fn discovered(path: PathBuf) -> DiscoveredFile {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        DiscoveredFile {
            size: std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0),
            path,
            name,
        }
    }

    #[tokio::test]
    async fn test_corrupt_file_is_isolated() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        let mut files = Vec::new();
        for i in 0..4 {
            let path = input.path().join(format!("img{i}.png"));
            RgbImage::from_pixel(4, 4, Rgb([50, 100, 150]))
                .save(&path)
                .unwrap();
            files.push(discovered(path));
        }
        let corrupt = input.path().join("corrupt.png");
        std::fs::write(&corrupt, b"not an image").unwrap();
        files.push(discovered(corrupt.clone()));

        let runner = BatchRunner::new(
            Transform::Negative,
            10,
            Arc::new(ImageDecoder::new(LimitsConfig::default())),
            Arc::new(ImageWriter::new(output.path(), &OutputConfig::default())),
        );
        let report = runner.run(files, |_| {}).await;

        assert_eq!(report.total, 5);
        assert_eq!(report.succeeded, 4);
        assert_eq!(report.decode_failed, 1);
        assert_eq!(report.failures[0].path, corrupt);

        let written = std::fs::read_dir(output.path()).unwrap().count();
        assert_eq!(written, 4);

        let out = image::open(output.path().join("img0.png")).unwrap().into_rgb8();
        assert_eq!(*out.get_pixel(0, 0), Rgb([205, 155, 105]));
    }

    #[tokio::test]
    async fn test_buffers_reach_sink_transformed() {
        let sink = Arc::new(MemorySink::default());
        let runner = BatchRunner::new(
            Transform::Rotate { degrees: 90.0 },
            2,
            Arc::new(ImageDecoder::new(LimitsConfig::default())),
            sink.clone(),
        );

        let requests = (0..5).map(|i| request(&format!("b{i}"))).collect();
        let report = runner.run_buffers(requests, |_| {}).await;

        assert_eq!(report.succeeded, 5);
        assert_eq!(report.workers, 2);
        let written = sink.written.lock().unwrap();
        assert_eq!(written.len(), 5);
        assert!(written.iter().all(|r| r.buffer.dimensions() == (2, 3)));
    }

    #[tokio::test]
    async fn test_write_failures_are_isolated() {
        let runner = BatchRunner::new(
            Transform::Grayscale,
            3,
            Arc::new(ImageDecoder::new(LimitsConfig::default())),
            Arc::new(PickySink),
        );

        let requests = vec![request("good1"), request("bad1"), request("good2"), request("bad2")];
        let report = runner.run_buffers(requests, |_| {}).await;

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.encode_failed, 2);
        assert!(report.failures.iter().all(|f| f.stage == "encode"));
    }

    #[tokio::test]
    async fn test_worker_bound_is_respected() {
        let sink = Arc::new(SlowSink {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let runner = BatchRunner::new(
            Transform::Identity,
            3,
            Arc::new(ImageDecoder::new(LimitsConfig::default())),
            sink.clone(),
        );

        let requests = (0..12).map(|i| request(&format!("r{i}"))).collect();
        let report = runner.run_buffers(requests, |_| {}).await;

        assert_eq!(report.succeeded, 12);
        assert!(sink.peak.load(Ordering::SeqCst) <= 3);
        assert!(report.elapsed > Duration::ZERO);
    }

    #[tokio::test]
    async fn test_callback_sees_every_outcome() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let runner = BatchRunner::new(
            Transform::Sepia,
            4,
            Arc::new(ImageDecoder::new(LimitsConfig::default())),
            Arc::new(PickySink),
        );

        let requests = vec![request("a"), request("bad"), request("c")];
        let report = runner
            .run_buffers(requests, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        assert_eq!(seen.load(Ordering::SeqCst), 3);
        assert_eq!(report.total, 3);
    }

    struct PanickingSink;

    impl ImageSink for PanickingSink {
        fn write(&self, result: &TransformResult) -> PipelineResult<PathBuf> {
            if result.name == "boom" {
                panic!("sink exploded");
            }
            Ok(PathBuf::from(&result.name))
        }
    }

    #[tokio::test]
    async fn test_panicking_unit_counts_as_transform_failure() {
        let runner = BatchRunner::new(
            Transform::Negative,
            2,
            Arc::new(ImageDecoder::new(LimitsConfig::default())),
            Arc::new(PanickingSink),
        );

        let requests = vec![request("ok1"), request("boom"), request("ok2")];
        let report = runner.run_buffers(requests, |_| {}).await;

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.transform_failed, 1);
        assert_eq!(report.failures[0].path, PathBuf::from("boom"));
    }

    #[tokio::test]
    async fn test_oversized_scale_fails_per_item() {
        let sink = Arc::new(MemorySink::default());
        let runner = BatchRunner::new(
            Transform::Scale { factor: 2000.0 },
            2,
            Arc::new(ImageDecoder::new(LimitsConfig::default())),
            sink.clone(),
        );

        let requests = (0..3)
            .map(|i| {
                TransformRequest::new(
                    format!("big{i}"),
                    PixelBuffer::filled(64, 64, Rgb([1, 2, 3])).unwrap(),
                )
            })
            .collect();
        let report = runner.run_buffers(requests, |_| {}).await;

        assert_eq!(report.total, 3);
        assert_eq!(report.transform_failed, 3);
        assert!(report.failures.iter().all(|f| f.stage == "transform"));
        assert!(report.failures[0].message.contains("exceeds max dimension"));
        assert!(sink.written.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batch_continues_past_oversized_item() {
        let sink = Arc::new(MemorySink::default());
        let runner = BatchRunner::new(
            Transform::Scale { factor: 4.0 },
            2,
            Arc::new(ImageDecoder::new(LimitsConfig::default())),
            sink.clone(),
        )
        .with_max_dimension(100);

        let requests = vec![
            request("small1"),
            TransformRequest::new("wide", PixelBuffer::filled(30, 2, Rgb([0, 0, 0])).unwrap()),
            request("small2"),
        ];
        let report = runner.run_buffers(requests, |_| {}).await;

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.transform_failed, 1);
        assert_eq!(report.failures[0].path, PathBuf::from("wide"));
        let written = sink.written.lock().unwrap();
        assert!(written.iter().all(|r| r.buffer.dimensions() == (12, 8)));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let runner = BatchRunner::new(
            Transform::Identity,
            0,
            Arc::new(ImageDecoder::new(LimitsConfig::default())),
            Arc::new(MemorySink::default()),
        );
        assert_eq!(runner.workers(), 1);

        let report = runner.run(Vec::new(), |_| {}).await;
        assert_eq!(report.total, 0);
        assert_eq!(report.failed(), 0);
    }
}
