use crate::core_modules::cluster_finder::cluster_finder::LabelOptions;
use crate::core_modules::mask_builder::{DEFAULT_THRESHOLD, MaskOptions};
use crate::core_modules::pixel::pixel::{IntensityChannel, Pixel};
use crate::core_modules::recolorer::{DEFAULT_SIZE_THRESHOLD, RecolorOptions};
use crate::error::{ClusterError, Result};
use crate::pipeline::PipelineConfig;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Prefix for environment overrides, e.g. `CUTOUT_THRESHOLD=100`.
pub const ENV_PREFIX: &str = "CUTOUT";

/// Separator for list-valued overrides, e.g. `CUTOUT_SENTINEL=0,0,0,255`.
pub const ENV_LIST_SEPARATOR: &str = ",";

/// User-facing configuration. Layered as defaults, then an optional file, then
/// `CUTOUT_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Intensity at or above which a pixel is foreground.
    pub threshold: u8,
    /// Clusters smaller than this are evicted.
    pub size_threshold: usize,
    /// Which channel is compared against `threshold`.
    pub channel: IntensityChannel,
    /// RGBA written over background and evicted clusters.
    pub sentinel: [u8; 4],
    /// Concurrent images in batch mode. Defaults to the number of CPUs.
    pub workers: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            size_threshold: DEFAULT_SIZE_THRESHOLD,
            channel: IntensityChannel::Red,
            sentinel: Pixel::EVICTED.to_array(),
            workers: None,
        }
    }
}

impl Settings {
    /// Loads settings from an optional config file plus the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, Self::environment())
    }

    /// The `CUTOUT_*` environment layer. Scalars parse directly; `sentinel` takes
    /// four comma-separated bytes with no spaces.
    pub fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(ENV_LIST_SEPARATOR)
            .with_list_parse_key("sentinel")
    }

    /// Loads settings from an optional config file with `environment` layered on top.
    pub fn load_from(path: Option<&Path>, environment: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(environment);

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(ClusterError::InvalidConfig(
                "workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of images processed concurrently in batch mode.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        let sentinel = Pixel::from(self.sentinel);
        PipelineConfig {
            mask: MaskOptions {
                threshold: self.threshold,
                channel: self.channel,
                sentinel,
            },
            label: LabelOptions::default(),
            recolor: RecolorOptions {
                size_threshold: self.size_threshold,
                sentinel,
            },
        }
    }
}
