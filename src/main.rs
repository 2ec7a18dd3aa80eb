use anyhow::{Context, bail};
use cutout_clusters::core_modules::utils::image_helper::image_helper;
use cutout_clusters::parallel_pipeline::BatchProcessor;
use cutout_clusters::{ClusterPipeline, Settings};
use std::env;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage:
  cutout_clusters <input> [--greened <path>] [--clustered <path>] [--config <path>]
  cutout_clusters --batch <output_dir> [--config <path>] <input>...";

/// What the command line asked for.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Single {
        input: PathBuf,
        greened: Option<PathBuf>,
        clustered: Option<PathBuf>,
    },
    Batch {
        output_dir: PathBuf,
        inputs: Vec<PathBuf>,
    },
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    command: Command,
    config: Option<PathBuf>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn parse_args(args: &[String]) -> anyhow::Result<Args> {
    let mut config = None;
    let mut greened = None;
    let mut clustered = None;
    let mut batch_dir = None;
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .map(PathBuf::from)
                .with_context(|| format!("{flag} needs a path"))
        };
        match arg.as_str() {
            "--config" => config = Some(value("--config")?),
            "--greened" => greened = Some(value("--greened")?),
            "--clustered" => clustered = Some(value("--clustered")?),
            "--batch" => batch_dir = Some(value("--batch")?),
            flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let command = match batch_dir {
        Some(output_dir) => {
            if positional.is_empty() {
                bail!("--batch needs at least one input\n{USAGE}");
            }
            Command::Batch {
                output_dir,
                inputs: positional,
            }
        }
        None => {
            let mut positional = positional.into_iter();
            let (Some(input), None) = (positional.next(), positional.next()) else {
                bail!("expected exactly one input\n{USAGE}");
            };
            Command::Single {
                input,
                greened,
                clustered,
            }
        }
    };

    Ok(Args { command, config })
}

/// Default artifact path next to the input, e.g. `output_greened.png`.
fn sibling(input: &Path, file_name: &str) -> PathBuf {
    input
        .parent()
        .map(|dir| dir.join(file_name))
        .unwrap_or_else(|| PathBuf::from(file_name))
}

fn run_single(
    settings: &Settings,
    input: &Path,
    greened: Option<PathBuf>,
    clustered: Option<PathBuf>,
) -> anyhow::Result<()> {
    let pixels = image_helper::load(input)
        .with_context(|| format!("failed to load {}", input.display()))?;
    let pipeline = ClusterPipeline::new(settings.pipeline_config());
    let report = pipeline.process(pixels);

    let greened = greened.unwrap_or_else(|| sibling(input, "output_greened.png"));
    let clustered = clustered.unwrap_or_else(|| sibling(input, "output_clustered.png"));
    image_helper::save_png(&greened, &report.greened)
        .with_context(|| format!("failed to write {}", greened.display()))?;
    image_helper::save_png(&clustered, &report.clustered)
        .with_context(|| format!("failed to write {}", clustered.display()))?;

    info!(
        greened = %greened.display(),
        clustered = %clustered.display(),
        clusters = report.cluster_sizes.len(),
        kept = report.summary.kept,
        "Wrote outputs"
    );
    Ok(())
}

async fn run_batch(settings: &Settings, output_dir: &Path, inputs: Vec<PathBuf>) -> anyhow::Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let processor = BatchProcessor::new(settings.pipeline_config(), settings.worker_count());
    let results = processor.run(inputs, output_dir).await;

    let failures = results.iter().filter(|result| result.outcome.is_err()).count();
    info!(processed = results.len() - failures, failures, "Batch complete");
    if failures > 0 {
        bail!("{failures} of {} inputs failed", results.len());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let raw: Vec<String> = env::args().skip(1).collect();
    if raw.is_empty() {
        println!("{USAGE}");
        return Ok(());
    }
    let args = parse_args(&raw)?;
    let settings = Settings::load(args.config.as_deref()).context("failed to load settings")?;

    // Errors are reported once, by anyhow, when `main` returns.
    match args.command {
        Command::Single {
            input,
            greened,
            clustered,
        } => run_single(&settings, &input, greened, clustered),
        Command::Batch { output_dir, inputs } => run_batch(&settings, &output_dir, inputs).await,
    }
}
