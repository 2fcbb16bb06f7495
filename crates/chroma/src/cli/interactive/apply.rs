//! Guided apply flow: input folder → output folder → transform → confirm.
//!
//! Builds an `ApplyArgs` and hands it to `cli::apply::execute()`.

use chroma_core::{Config, FileDiscovery};
use console::Style;
use dialoguer::{Confirm, Input};
use std::path::PathBuf;

use super::theme::chroma_theme;
use crate::cli::apply::ApplyArgs;

pub async fn guided_apply(config: &Config) -> anyhow::Result<()> {
    let theme = chroma_theme();
    let warn = Style::new().for_stderr().yellow();
    let dim = Style::new().for_stderr().dim();

    // Re-prompt on missing paths and on folders with no images
    let (input, count) = loop {
        let Some(raw_path) = super::handle_interrupt(
            Input::<String>::with_theme(&theme)
                .with_prompt("Folder of images")
                .interact_text(),
        )?
        else {
            return Ok(());
        };

        let path = PathBuf::from(shellexpand::tilde(&raw_path).into_owned());
        if !path.exists() {
            eprintln!(
                "  {}",
                warn.apply_to(format!("Path not found: {}", path.display()))
            );
            continue;
        }

        let files = FileDiscovery::new(config.processing.clone()).discover(&path);
        if files.is_empty() {
            eprintln!(
                "  {}",
                warn.apply_to("No supported images found at that path.")
            );
            continue;
        }

        eprintln!(
            "  {}",
            dim.apply_to(format!(
                "Found {} image(s) ({:.1} MB)",
                files.len(),
                FileDiscovery::total_size(&files) as f64 / 1_000_000.0
            ))
        );
        break (path, files.len());
    };

    let Some(raw_output) = super::handle_interrupt(
        Input::<String>::with_theme(&theme)
            .with_prompt("Output folder")
            .default("./chroma-out".to_string())
            .interact_text(),
    )?
    else {
        return Ok(());
    };
    let output = PathBuf::from(shellexpand::tilde(&raw_output).into_owned());

    let Some(transform) = super::pick_transform(&config.transform)? else {
        return Ok(());
    };

    eprintln!();
    let bold = Style::new().for_stderr().bold();
    eprintln!(
        "  {}",
        bold.apply_to(format!("Ready to apply {transform} to {count} image(s)"))
    );
    eprintln!(
        "  {}",
        dim.apply_to(format!(
            "Workers: {} | Output: {}",
            config.processing.parallel_workers,
            output.display()
        ))
    );
    eprintln!();

    let confirm = Confirm::with_theme(&theme)
        .with_prompt("Start?")
        .default(true)
        .interact_opt()?;
    if !matches!(confirm, Some(true)) {
        return Ok(());
    }

    let args = ApplyArgs {
        input,
        output,
        preset: Some(transform),
        ..ApplyArgs::default()
    };
    crate::cli::apply::execute(args, config.clone()).await
}
