//! Batch execution with a progress bar, summary table and optional JSON report.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chroma_core::{BatchReport, BatchRunner, DiscoveredFile, FileDiscovery, ItemOutcome};

use super::setup::ApplyContext;

/// Run the batch, then print the summary and write the report if requested.
pub(crate) async fn run_batch(
    ctx: ApplyContext,
    files: Vec<DiscoveredFile>,
    report_path: Option<&Path>,
) -> anyhow::Result<()> {
    let total_bytes = FileDiscovery::total_size(&files);
    let progress = create_progress_bar(files.len() as u64);

    std::fs::create_dir_all(&ctx.output)?;
    let runner = BatchRunner::from_config(ctx.chroma.config(), ctx.transform, &ctx.output);

    let start_time = Instant::now();
    let bar = progress.clone();
    let written = AtomicU64::new(0);
    let report = runner
        .run(files, move |outcome| {
            if outcome.is_success() {
                written.fetch_add(1, Ordering::Relaxed);
            } else if let ItemOutcome::Failed(item) = outcome {
                bar.println(format!("  failed [{}] {}", item.stage, item.path.display()));
            }
            bar.inc(1);
            // Same basis as BatchReport::rate: written images only
            let elapsed = start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                let done = written.load(Ordering::Relaxed);
                bar.set_message(format!("{:.1} img/sec", done as f64 / elapsed));
            }
        })
        .await;

    progress.finish_and_clear();
    print_summary(&report, total_bytes);
    tracing::info!("Output written to {:?}", ctx.output);

    if let Some(path) = report_path {
        write_report(&report, path)?;
        tracing::info!("Run report written to {:?}", path);
    }

    if report.total > 0 && report.succeeded == 0 {
        tracing::warn!("No images were written");
    }
    Ok(())
}

fn write_report(report: &BatchReport, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Create a progress bar for batch processing.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after the batch.
fn print_summary(report: &BatchReport, total_bytes: u64) {
    let elapsed = report.elapsed.as_secs_f64();
    let mb_processed = total_bytes as f64 / 1_000_000.0;
    let throughput = if elapsed > 0.0 {
        mb_processed / elapsed
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Transform:    {:>8}", report.transform.name());
    eprintln!("    Workers:      {:>8}", report.workers);
    eprintln!("    Succeeded:    {:>8}", report.succeeded);
    if report.decode_failed > 0 {
        eprintln!("    Unreadable:   {:>8}", report.decode_failed);
    }
    if report.transform_failed > 0 {
        eprintln!("    Crashed:      {:>8}", report.transform_failed);
    }
    if report.encode_failed > 0 {
        eprintln!("    Not written:  {:>8}", report.encode_failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", report.total);
    eprintln!("    Duration:     {:>7.1}s", elapsed);
    eprintln!("    Rate:         {:>7.1} img/sec", report.rate());
    eprintln!("    Throughput:   {:>7.1} MB/sec", throughput);
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chroma_core::{Chroma, Config, Transform};
    use image::{Rgb, RgbImage};

    #[tokio::test]
    async fn test_write_report_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty");
        std::fs::create_dir(&empty).unwrap();

        let batch = Chroma::new(Config::default())
            .apply(&empty, &dir.path().join("out"), Transform::Grayscale, |_| {})
            .await
            .unwrap();

        let path = dir.path().join("reports/run.json");
        write_report(&batch, &path).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["total"], 0);
        assert_eq!(parsed["transform"]["kind"], "grayscale");
    }

    #[tokio::test]
    async fn test_run_batch_writes_outputs_and_report() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.png"] {
            RgbImage::from_pixel(3, 3, Rgb([10, 80, 200]))
                .save(input.path().join(name))
                .unwrap();
        }
        std::fs::write(input.path().join("c.png"), b"garbage").unwrap();

        let ctx = ApplyContext {
            chroma: Chroma::new(Config::default()),
            transform: Transform::from_code(7),
            input: input.path().to_path_buf(),
            output: output.path().join("out"),
        };
        let files = ctx.chroma.discover(&ctx.input).unwrap();
        let report_path = output.path().join("report.json");

        run_batch(ctx, files, Some(&report_path)).await.unwrap();

        let bright = image::open(output.path().join("out/a.png"))
            .unwrap()
            .into_rgb8();
        assert_eq!(*bright.get_pixel(1, 1), Rgb([30, 240, 255]));
        assert!(!output.path().join("out/c.png").exists());

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(parsed["succeeded"], 2);
        assert_eq!(parsed["decode_failed"], 1);
        assert_eq!(parsed["workers"], 10);
    }
}
