//! Platform sizing of the interrupt controller.

use fe310_hal::{Priority, SourceId};

/// Source slots on FE310-G002 (52 sources plus the reserved slot 0).
pub const FE310_NUM_SOURCES: usize = 53;

/// Sizing of one controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlicParams {
    /// Number of source slots, including the reserved slot 0.
    pub num_sources: usize,
    pub num_contexts: usize,
    pub max_priority: Priority,
    /// Highest priority whose handlers may call into the kernel.
    pub max_kernel_priority: Priority,
}

impl PlicParams {
    /// FE310-G002: sources 1..=52, one context, priorities 1..=7.
    pub const FE310_G002: PlicParams = PlicParams {
        num_sources: FE310_NUM_SOURCES,
        num_contexts: 1,
        max_priority: Priority::new_unchecked(7),
        max_kernel_priority: Priority::new_unchecked(5),
    };

    /// Number of 32-bit words in each pending/enable bitmap.
    pub const fn bitmap_words(&self) -> usize {
        self.num_sources.div_ceil(32)
    }

    /// Whether `source` exists on this platform.
    pub const fn has_source(&self, source: SourceId) -> bool {
        source.index() < self.num_sources
    }

    /// Ids of every real source, in ascending order.
    pub fn sources(&self) -> impl Iterator<Item = SourceId> {
        (1..self.num_sources as u32).map(SourceId::from_raw)
    }
}

impl Default for PlicParams {
    fn default() -> Self {
        Self::FE310_G002
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fe310_sizing() {
        let params = PlicParams::default();

        assert_eq!(params.bitmap_words(), 2);
        assert_eq!(params.sources().count(), 52);
        assert!(params.has_source(SourceId::from_raw(52)));
        assert!(!params.has_source(SourceId::from_raw(53)));
        assert!(params.max_kernel_priority <= params.max_priority);
    }
}
