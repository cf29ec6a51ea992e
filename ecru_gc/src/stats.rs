//! Collector statistics.
//!
//! Plain counters recorded by the collector as it works. The collector is
//! single-threaded by contract, so these are ordinary fields, not atomics.

/// Counters describing collector activity since construction.
#[derive(Debug, Clone, Default)]
pub struct GcStats {
    /// Payload objects allocated through the collector.
    pub allocations: u64,
    /// Payload objects explicitly freed by the caller.
    pub frees: u64,
    /// Scan steps that actually processed a grey node.
    pub scans: u64,
    /// Completed flips.
    pub flips: u64,
    /// Ring nodes created (roots at construction plus one per flip).
    pub nodes_created: u64,
    /// Condemned payloads reclaimed by flips.
    pub objects_reclaimed: u64,
}

impl GcStats {
    /// Create zeroed statistics.
    pub const fn new() -> Self {
        Self {
            allocations: 0,
            frees: 0,
            scans: 0,
            flips: 0,
            nodes_created: 0,
            objects_reclaimed: 0,
        }
    }

    #[inline]
    pub(crate) fn record_allocation(&mut self) {
        self.allocations += 1;
    }

    #[inline]
    pub(crate) fn record_free(&mut self) {
        self.frees += 1;
    }

    #[inline]
    pub(crate) fn record_scan(&mut self) {
        self.scans += 1;
    }

    #[inline]
    pub(crate) fn record_flip(&mut self) {
        self.flips += 1;
    }

    #[inline]
    pub(crate) fn record_node(&mut self) {
        self.nodes_created += 1;
    }

    #[inline]
    pub(crate) fn record_reclaimed(&mut self) {
        self.objects_reclaimed += 1;
    }
}

impl std::fmt::Display for GcStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "allocations: {} ({} explicitly freed, {} reclaimed)",
            self.allocations, self.frees, self.objects_reclaimed
        )?;
        write!(
            f,
            "collection: {} scans, {} flips, {} ring nodes",
            self.scans, self.flips, self.nodes_created
        )
    }
}
