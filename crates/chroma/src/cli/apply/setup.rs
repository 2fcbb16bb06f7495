//! Apply setup: config overrides and transform selection.

use chroma_core::transform::MAX_SCALE_FACTOR;
use chroma_core::{Chroma, Config, Transform};
use std::path::PathBuf;

use super::ApplyArgs;

/// Everything the batch step needs.
pub(crate) struct ApplyContext {
    pub chroma: Chroma,
    pub transform: Transform,
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Validate input, apply CLI overrides, and pick the transform.
///
/// Returns `Ok(None)` when the interactive picker is dismissed.
pub(crate) fn setup_apply(
    args: &ApplyArgs,
    mut config: Config,
) -> anyhow::Result<Option<ApplyContext>> {
    let input = Config::expand_path(&args.input);
    if !input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            input
        );
    }

    apply_overrides(args, &mut config)?;

    let transform = match (args.preset, args.transform.as_deref()) {
        (Some(preset), _) => preset,
        (None, Some(selector)) => parse_transform(selector, &config)?,
        (None, None) => match config.transform.code {
            Some(code) => Transform::from_code_with(code, &config.transform),
            None if console::user_attended_stderr() => {
                match crate::cli::interactive::pick_transform(&config.transform)? {
                    Some(transform) => transform,
                    None => return Ok(None),
                }
            }
            None => anyhow::bail!(
                "No transform selected.\n\n  Hint: Pass -t <name|code> or set transform.code \
                 in the config file. Run `chroma transforms` for the list."
            ),
        },
    };
    let transform = with_factor(transform, args.factor);
    if let Transform::Scale { factor } = transform {
        if factor > MAX_SCALE_FACTOR {
            anyhow::bail!("--factor for scale must be at most {MAX_SCALE_FACTOR}, got {factor}");
        }
    }
    tracing::info!("Selected transform: {transform}");

    Ok(Some(ApplyContext {
        chroma: Chroma::new(config),
        transform,
        input,
        output: Config::expand_path(&args.output),
    }))
}

/// Fold command-line flags into the loaded config, then re-validate.
fn apply_overrides(args: &ApplyArgs, config: &mut Config) -> anyhow::Result<()> {
    if let Some(parallel) = args.parallel {
        config.processing.parallel_workers = parallel;
    }
    if args.recursive {
        config.processing.recursive = true;
    }
    if let Some(degrees) = args.degrees {
        config.transform.rotate_degrees = degrees;
    }
    if let Some(level) = args.noise_level {
        config.transform.noise_level = level;
    }
    if let Some(format) = &args.format {
        config.output.format = format.clone();
    }
    if let Some(factor) = args.factor {
        if !(factor > 0.0 && factor.is_finite()) {
            anyhow::bail!("--factor must be a positive number, got {factor}");
        }
    }
    config.validate()?;
    Ok(())
}

fn parse_transform(selector: &str, config: &Config) -> anyhow::Result<Transform> {
    Transform::parse(selector, &config.transform).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown transform '{selector}'.\n\n  Hint: Run `chroma transforms` to list names and codes."
        )
    })
}

/// Replace the multiplier of brightness and scale transforms.
fn with_factor(transform: Transform, factor: Option<f64>) -> Transform {
    let Some(factor) = factor else {
        return transform;
    };
    match transform {
        Transform::Brightness { .. } => Transform::Brightness { factor },
        Transform::Scale { .. } => Transform::Scale { factor },
        other => {
            tracing::warn!("--factor has no effect on {}", other.name());
            other
        }
    }
}
