//! Collector configuration parameters.

/// Default heap size in words.
pub const DEFAULT_HEAP_SIZE: usize = 64 * 1024;

/// Default number of allocations between scan steps.
pub const DEFAULT_SCAN_FREQUENCY: usize = 1;

/// Configuration for a [`TreadmillAllocator`].
///
/// `scan_frequency` is the only lever controlling amortized latency: it
/// bounds how much scanning happens per allocation, with a full
/// sweep-to-completion only inside a flip.
///
/// # Example
///
/// ```ignore
/// use ecru_gc::TreadmillConfig;
///
/// // scan on every third allocation
/// let config = TreadmillConfig {
///     scan_frequency: 3,
///     ..Default::default()
/// };
/// ```
///
/// [`TreadmillAllocator`]: crate::TreadmillAllocator
#[derive(Debug, Clone)]
pub struct TreadmillConfig {
    /// Size of the simulated heap in words.
    ///
    /// Fixed for the collector's lifetime; the heap never grows.
    ///
    /// Default: 64 Ki words
    pub heap_size: usize,

    /// Number of allocations that must pass before a scan is forced.
    ///
    /// Lower values spread collection work more evenly; `1` scans on every
    /// allocation. Must be positive.
    ///
    /// Default: 1
    pub scan_frequency: usize,
}

impl Default for TreadmillConfig {
    fn default() -> Self {
        Self {
            heap_size: DEFAULT_HEAP_SIZE,
            scan_frequency: DEFAULT_SCAN_FREQUENCY,
        }
    }
}

impl TreadmillConfig {
    /// A small-heap configuration, convenient for tests that want to force
    /// frequent flips.
    pub fn small() -> Self {
        Self {
            heap_size: 256,
            ..Default::default()
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.heap_size == 0 {
            return Err(ConfigError::ZeroHeapSize);
        }
        if self.scan_frequency == 0 {
            return Err(ConfigError::ZeroScanFrequency);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The heap must hold at least one word.
    ZeroHeapSize,
    /// The scan frequency must be positive.
    ZeroScanFrequency,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroHeapSize => write!(f, "heap size must be positive"),
            ConfigError::ZeroScanFrequency => write!(f, "scan frequency must be positive"),
        }
    }
}

impl std::error::Error for ConfigError {}
