//! Collector configuration

use crate::error::{GcError, Result};

/// Heap budget used when the host passes zero (1MB)
pub const DEFAULT_HEAP_BUDGET: usize = 1024 * 1024;

/// Occupancy ratio above which allocation collects first
pub const DEFAULT_TRIGGER_RATIO: f64 = 0.75;

/// GC configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GcConfig {
    /// Heap byte budget (default: 1MB)
    ///
    /// The budget drives collection policy only. Allocation may exceed it.
    pub heap_budget: usize,
    /// GC trigger ratio (default: 0.75)
    pub trigger_ratio: f64,
    /// Maximum number of root entries (default: unbounded)
    pub max_roots: Option<usize>,
    /// Maximum number of edge records (default: unbounded)
    pub max_edges: Option<usize>,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            heap_budget: DEFAULT_HEAP_BUDGET,
            trigger_ratio: DEFAULT_TRIGGER_RATIO,
            max_roots: None,
            max_edges: None,
        }
    }
}

impl GcConfig {
    /// Config with the given heap budget, zero meaning the default
    pub fn with_heap_budget(heap_budget: usize) -> Self {
        Self {
            heap_budget,
            ..Self::default()
        }
        .normalized()
    }

    /// Replace a zero budget with the default
    pub fn normalized(mut self) -> Self {
        if self.heap_budget == 0 {
            self.heap_budget = DEFAULT_HEAP_BUDGET;
        }
        self
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if !self.trigger_ratio.is_finite()
            || self.trigger_ratio <= 0.0
            || self.trigger_ratio > 1.0
        {
            return Err(GcError::InvalidArgument(
                "trigger ratio must be in (0.0, 1.0]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_budget_uses_default() {
        let config = GcConfig::with_heap_budget(0);
        assert_eq!(config.heap_budget, DEFAULT_HEAP_BUDGET);
        assert_eq!(config.trigger_ratio, 0.75);
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        for ratio in [0.0, -0.5, 1.5, f64::NAN, f64::INFINITY] {
            let config = GcConfig {
                trigger_ratio: ratio,
                ..GcConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(GcError::InvalidArgument(_))
            ));
        }
        assert!(GcConfig::default().validate().is_ok());
    }
}
