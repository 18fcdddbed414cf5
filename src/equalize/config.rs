//! Strategy selection and the optional dedicated thread pool.

use std::fmt;
use std::str::FromStr;

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use super::buffer::PixelBuffer;
use super::channel_parallel::ChannelParallelEqualizer;
use super::error::{EqualizeError, Result};
use super::partition::validate_workers;
use super::sequential::SequentialEqualizer;
use super::spatial::{SpatialLocalHistogramEqualizer, SpatialSharedHistogramEqualizer};
use super::Equalize;

// ============================================================================
// Strategy
// ============================================================================

/// Which equalization engine to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    Sequential,
    ChannelParallel,
    SpatialShared,
    #[default]
    SpatialLocal,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Sequential,
        Strategy::ChannelParallel,
        Strategy::SpatialShared,
        Strategy::SpatialLocal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::ChannelParallel => "channel-parallel",
            Strategy::SpatialShared => "spatial-shared",
            Strategy::SpatialLocal => "spatial-local",
        }
    }

    /// `true` for the row-partitioned strategies.
    pub fn uses_workers(self) -> bool {
        matches!(self, Strategy::SpatialShared | Strategy::SpatialLocal)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = EqualizeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "sequential" | "single" => Ok(Strategy::Sequential),
            "channel-parallel" | "channel" => Ok(Strategy::ChannelParallel),
            "spatial-shared" | "shared" => Ok(Strategy::SpatialShared),
            "spatial-local" | "local" => Ok(Strategy::SpatialLocal),
            _ => Err(EqualizeError::UnknownStrategy {
                name: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// EqualizerConfig
// ============================================================================

/// Settings for an [`Equalizer`].
///
/// # Fields
/// * `strategy` - Engine to run (default: spatial-local)
/// * `workers` - Row partitions for the spatial strategies. `None` picks
///   `min(threads, height)`; an explicit value outside `1..=height` is an error
/// * `threads` - Size of a dedicated rayon pool. `None` uses the global pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EqualizerConfig {
    pub strategy: Strategy,
    pub workers: Option<u32>,
    pub threads: Option<usize>,
}

impl EqualizerConfig {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn with_workers(mut self, workers: u32) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Worker count to use for an image of `height` rows on `threads` threads.
    pub fn resolve_workers(&self, height: u32, threads: usize) -> Result<u32> {
        match self.workers {
            Some(workers) => {
                validate_workers(workers, height)?;
                Ok(workers)
            }
            None => {
                let threads = u32::try_from(threads).unwrap_or(u32::MAX);
                Ok(threads.clamp(1, height.max(1)))
            }
        }
    }

    /// Instantiate the configured strategy for an image of `height` rows.
    pub fn build(&self, height: u32, threads: usize) -> Result<Box<dyn Equalize>> {
        let equalizer: Box<dyn Equalize> = match self.strategy {
            Strategy::Sequential => Box::new(SequentialEqualizer),
            Strategy::ChannelParallel => Box::new(ChannelParallelEqualizer),
            Strategy::SpatialShared => Box::new(SpatialSharedHistogramEqualizer::new(
                self.resolve_workers(height, threads)?,
            )),
            Strategy::SpatialLocal => Box::new(SpatialLocalHistogramEqualizer::new(
                self.resolve_workers(height, threads)?,
            )),
        };
        Ok(equalizer)
    }
}

// ============================================================================
// Equalizer
// ============================================================================

/// A configured strategy plus the thread pool it runs on.
pub struct Equalizer {
    config: EqualizerConfig,
    pool: Option<ThreadPool>,
}

impl fmt::Debug for Equalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Equalizer")
            .field("config", &self.config)
            .field("pool_threads", &self.pool.as_ref().map(|p| p.current_num_threads()))
            .finish()
    }
}

impl Equalizer {
    /// Build the dedicated pool if `config.threads` is set.
    pub fn new(config: EqualizerConfig) -> Result<Self> {
        let pool = config
            .threads
            .map(|threads| {
                ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("histeq-worker-{i}"))
                    .build()
            })
            .transpose()?;

        debug!(strategy = %config.strategy, workers = ?config.workers, threads = ?config.threads, "equalizer configured");
        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &EqualizerConfig {
        &self.config
    }

    /// Threads available to the workers.
    pub fn threads(&self) -> usize {
        self.pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, |pool| pool.current_num_threads())
    }

    /// Equalize `input` into a new buffer.
    pub fn equalize(&self, input: &PixelBuffer) -> Result<PixelBuffer> {
        let mut output = input.allocate_like();
        self.equalize_into(input, &mut output)?;
        Ok(output)
    }

    /// Equalize `input` into a caller-provided buffer of the same size.
    pub fn equalize_into(&self, input: &PixelBuffer, output: &mut PixelBuffer) -> Result<()> {
        let strategy = self.config.build(input.height(), self.threads())?;
        match &self.pool {
            Some(pool) => pool.install(|| strategy.equalize_into(input, output)),
            None => strategy.equalize_into(input, output),
        }
    }
}
