// THEORY:
// The `parallel_pipeline` module processes many images at once. Each image is an
// independent job: it gets its own pixel grid and its own mask, so images never
// contend for the same cells. Parallelism therefore lives *between* images, never
// inside the flood fill.
//
// Key architectural principles:
// 1.  **Blocking work off the runtime**: Decoding, labeling and encoding are CPU and
//     disk bound, so every job runs inside `spawn_blocking`.
// 2.  **Bounded fan-out**: A semaphore sized to the worker count (the CPU count by
//     default) caps how many jobs hold decoded images in memory at the same time.
// 3.  **Ordered, per-job results**: Results come back in input order. A bad file
//     fails its own job and is reported; it does not abort the batch.
// 4.  **Unique outputs**: Output names are assigned before any job starts. Inputs
//     sharing a file stem get a numeric suffix so no two jobs write the same file.

use crate::core_modules::utils::image_helper::image_helper;
use crate::error::{ClusterError, Result};
use crate::pipeline::{ClusterPipeline, PipelineConfig};
use futures::future::join_all;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Where one input's artifacts were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutput {
    pub input: PathBuf,
    pub greened: PathBuf,
    pub clustered: PathBuf,
    pub clusters: usize,
    pub kept: usize,
}

/// The outcome of one input in a batch.
#[derive(Debug)]
pub struct BatchResult {
    pub input: PathBuf,
    pub outcome: Result<BatchOutput>,
}

/// Runs the cluster pipeline over many files concurrently.
pub struct BatchProcessor {
    pipeline: Arc<ClusterPipeline>,
    permits: Arc<Semaphore>,
    workers: usize,
}

impl BatchProcessor {
    pub fn new(config: PipelineConfig, workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            pipeline: Arc::new(ClusterPipeline::new(config)),
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    /// Uses one worker per CPU.
    pub fn with_cpu_workers(config: PipelineConfig) -> Self {
        Self::new(config, num_cpus::get())
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Processes every input, writing `<stem>_greened.png` and
    /// `<stem>_clustered.png` into `output_dir`. See `unique_output_paths` for
    /// inputs that share a stem.
    pub async fn run(&self, inputs: Vec<PathBuf>, output_dir: &Path) -> Vec<BatchResult> {
        info!(inputs = inputs.len(), workers = self.workers, "Starting batch");

        let outputs = unique_output_paths(&inputs, output_dir);
        let jobs = inputs.into_iter().zip(outputs).map(|(input, outputs)| {
            let pipeline = Arc::clone(&self.pipeline);
            let permits = Arc::clone(&self.permits);
            async move {
                let outcome = run_job(pipeline, permits, input.clone(), outputs).await;
                if let Err(e) = &outcome {
                    warn!(input = %input.display(), "Failed to process image: {}", e);
                }
                BatchResult { input, outcome }
            }
        });

        join_all(jobs).await
    }
}

/// Output paths for one input: `<stem>_greened.png` and `<stem>_clustered.png`.
pub fn output_paths(input: &Path, output_dir: &Path) -> (PathBuf, PathBuf) {
    artifact_paths(&file_stem(input), output_dir)
}

/// Output paths for a whole batch, in input order. The first input with a given
/// stem keeps it; later ones become `<stem>_1`, `<stem>_2`, ... skipping any name
/// already taken.
pub fn unique_output_paths(inputs: &[PathBuf], output_dir: &Path) -> Vec<(PathBuf, PathBuf)> {
    let mut taken = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let stem = file_stem(input);
            let mut name = stem.clone();
            let mut suffix = 0;
            while !taken.insert(name.clone()) {
                suffix += 1;
                name = format!("{stem}_{suffix}");
            }
            artifact_paths(&name, output_dir)
        })
        .collect()
}

fn file_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

fn artifact_paths(name: &str, output_dir: &Path) -> (PathBuf, PathBuf) {
    (
        output_dir.join(format!("{name}_greened.png")),
        output_dir.join(format!("{name}_clustered.png")),
    )
}

async fn run_job(
    pipeline: Arc<ClusterPipeline>,
    permits: Arc<Semaphore>,
    input: PathBuf,
    outputs: (PathBuf, PathBuf),
) -> Result<BatchOutput> {
    let permit = permits
        .acquire_owned()
        .await
        .map_err(|_| ClusterError::BatchClosed)?;

    tokio::task::spawn_blocking(move || {
        let _permit = permit;
        process_file(&pipeline, &input, outputs)
    })
    .await?
}

fn process_file(
    pipeline: &ClusterPipeline,
    input: &Path,
    (greened, clustered): (PathBuf, PathBuf),
) -> Result<BatchOutput> {
    let pixels = image_helper::load(input)?;
    let report = pipeline.process(pixels);

    image_helper::save_png(&greened, &report.greened)?;
    image_helper::save_png(&clustered, &report.clustered)?;

    Ok(BatchOutput {
        input: input.to_path_buf(),
        greened,
        clustered,
        clusters: report.cluster_sizes.len(),
        kept: report.summary.kept,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::core_modules::pixel_grid::PixelGrid;

    fn write_fixture(path: &Path, bright_rows: usize) {
        let grid = PixelGrid::from_fn(12, 12, |row, _| {
            if row < bright_rows { Pixel::opaque(250, 0, 0) } else { Pixel::opaque(5, 0, 0) }
        });
        image_helper::save_png(path, &grid).expect("Error Saving File.");
    }

    #[test]
    fn output_paths_use_the_input_stem() {
        let (greened, clustered) = output_paths(Path::new("/in/terrain.jpg"), Path::new("/out"));
        assert_eq!(greened, PathBuf::from("/out/terrain_greened.png"));
        assert_eq!(clustered, PathBuf::from("/out/terrain_clustered.png"));
    }

    #[test]
    fn shared_stems_get_numbered_outputs() {
        let inputs = vec![
            PathBuf::from("/a/frame.png"),
            PathBuf::from("/b/frame.jpg"),
            PathBuf::from("/c/frame_1.png"),
            PathBuf::from("/d/other.png"),
        ];

        let outputs = unique_output_paths(&inputs, Path::new("/out"));

        let greened: Vec<PathBuf> = outputs.into_iter().map(|(greened, _)| greened).collect();
        assert_eq!(
            greened,
            vec![
                PathBuf::from("/out/frame_greened.png"),
                PathBuf::from("/out/frame_1_greened.png"),
                PathBuf::from("/out/frame_1_1_greened.png"),
                PathBuf::from("/out/other_greened.png"),
            ]
        );
    }

    #[tokio::test]
    async fn inputs_with_the_same_stem_keep_separate_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let mut inputs = Vec::new();
        for (sub, bright_rows) in [("a", 0), ("b", 4)] {
            std::fs::create_dir(dir.path().join(sub)).unwrap();
            let path = dir.path().join(sub).join("frame.png");
            write_fixture(&path, bright_rows);
            inputs.push(path);
        }
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        let processor = BatchProcessor::new(PipelineConfig::default(), 2);

        let results = processor.run(inputs, &out).await;

        let first = results[0].outcome.as_ref().expect("job should succeed");
        let second = results[1].outcome.as_ref().expect("job should succeed");
        assert_ne!(first.greened, second.greened);
        assert_ne!(first.clustered, second.clustered);
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 4);
        // Each file holds its own image's result.
        assert_eq!(first.clusters, 0);
        assert_eq!(second.clusters, 1);
        let second_clustered = image_helper::load(&second.clustered).unwrap();
        assert!(second_clustered.get(0, 0).unwrap().is_opaque());
        let first_clustered = image_helper::load(&first.clustered).unwrap();
        assert_eq!(first_clustered.get(0, 0), Some(Pixel::EVICTED));
    }

    #[tokio::test]
    async fn processes_every_input_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let inputs: Vec<PathBuf> = (0..5)
            .map(|i| {
                let path = dir.path().join(format!("frame_{i}.png"));
                write_fixture(&path, i * 2);
                path
            })
            .collect();
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        let processor = BatchProcessor::new(PipelineConfig::default(), 2);

        let results = processor.run(inputs.clone(), &out).await;

        assert_eq!(results.len(), 5);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.input, inputs[i]);
            let output = result.outcome.as_ref().expect("job should succeed");
            assert!(output.greened.exists());
            assert!(output.clustered.exists());
            // Row bands of 12 * 2i cells: one cluster whenever any row is bright.
            let expected = if i == 0 { 0 } else { 1 };
            assert_eq!(output.clusters, expected);
            assert_eq!(output.kept, expected);
        }
    }

    #[tokio::test]
    async fn a_bad_input_fails_alone() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        write_fixture(&good, 3);
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"not a png").unwrap();
        let processor = BatchProcessor::with_cpu_workers(PipelineConfig::default());

        let results = processor.run(vec![bad, good], dir.path()).await;

        assert!(results[0].outcome.is_err());
        assert!(results[1].outcome.is_ok());
    }
}
