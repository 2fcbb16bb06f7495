//! Interactive mode: the transform picker and the guided flow for bare
//! `chroma` on a terminal.

pub mod apply;
pub mod theme;

use chroma_core::config::TransformConfig;
use chroma_core::{Config, Transform, CATALOG};
use console::Style;
use dialoguer::Select;

/// `Ok(Some(value))` on success, `Ok(None)` on interrupt (Ctrl+C), `Err` for
/// other I/O failures.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

const MENU_ITEMS: &[&str] = &[
    "Transform a folder of images",
    "List transforms",
    "Show configuration",
    "Exit",
];

/// Entry point when `chroma` runs with no subcommand on a terminal.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    theme::print_banner();

    let theme = theme::chroma_theme();

    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => apply::guided_apply(config).await?,
            Some(1) => crate::cli::transforms::execute(config)?,
            Some(2) => show_config(config)?,
            _ => break,
        }
    }

    Ok(())
}

/// Menu labels for the catalog, e.g. `1. Convert to grayscale`.
fn menu_labels() -> Vec<String> {
    CATALOG
        .iter()
        .map(|entry| match entry.code {
            Some(code) => format!("{code}. {}", entry.description),
            None => format!("   {} ({})", entry.description, entry.name),
        })
        .collect()
}

/// Ask which transform to run. `Ok(None)` if the menu was dismissed.
pub fn pick_transform(params: &TransformConfig) -> anyhow::Result<Option<Transform>> {
    let theme = theme::chroma_theme();
    let selection = Select::with_theme(&theme)
        .with_prompt("Select a transformation")
        .items(&menu_labels())
        .default(0)
        .interact_opt()?;

    Ok(selection
        .and_then(|index| CATALOG.get(index))
        .and_then(|entry| Transform::from_name(entry.name, params)))
}

fn show_config(config: &Config) -> anyhow::Result<()> {
    let dim = Style::new().for_stderr().dim();
    let cyan = Style::new().for_stderr().cyan();
    let label = Style::new().for_stderr().bold();

    let config_path = Config::default_path();
    let path_note = if config_path.exists() {
        "(exists)"
    } else {
        "(using defaults)"
    };

    eprintln!();
    eprintln!("  {}", cyan.apply_to("Current configuration:"));
    eprintln!();
    eprintln!(
        "    {:<20} {} {}",
        label.apply_to("Config file:"),
        config_path.display(),
        dim.apply_to(path_note)
    );
    eprintln!(
        "    {:<20} {} workers",
        label.apply_to("Parallel:"),
        config.processing.parallel_workers
    );
    eprintln!(
        "    {:<20} {}",
        label.apply_to("Default transform:"),
        config
            .transform
            .code
            .map(|code| Transform::from_code_with(code, &config.transform).to_string())
            .unwrap_or_else(|| "ask".to_string())
    );
    eprintln!(
        "    {:<20} {} (jpeg quality {})",
        label.apply_to("Output format:"),
        config.output.format,
        config.output.jpeg_quality
    );
    eprintln!(
        "    {:<20} {}",
        label.apply_to("Log level:"),
        config.logging.level
    );
    eprintln!();
    eprintln!("{}", dim.apply_to("─".repeat(50)));
    eprintln!("{}", config.to_toml()?);
    eprintln!("{}", dim.apply_to("─".repeat(50)));
    eprintln!();
    Ok(())
}
