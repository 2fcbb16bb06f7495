//! The `chroma transforms` command: list what `-t` accepts.

use chroma_core::{Config, Transform, CATALOG};

/// Print the catalog with the parameters the current config would use.
pub fn execute(config: &Config) -> anyhow::Result<()> {
    println!("{:<6} {:<11} {:<30} USING", "CODE", "NAME", "DESCRIPTION");
    for line in catalog_lines(config) {
        println!("{line}");
    }
    Ok(())
}

fn catalog_lines(config: &Config) -> Vec<String> {
    CATALOG
        .iter()
        .map(|entry| {
            let code = entry
                .code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string());
            let using = Transform::from_name(entry.name, &config.transform)
                .map(|t| t.to_string())
                .unwrap_or_default();
            format!(
                "{:<6} {:<11} {:<30} {}",
                code, entry.name, entry.description, using
            )
        })
        .collect()
}
