//! Tabu Search configuration.

use crate::error::TabuError;

/// Configuration parameters for Tabu Search.
///
/// # Examples
///
/// ```
/// use u_tabu::tabu::TabuConfig;
///
/// let config = TabuConfig::default()
///     .with_max_iterations(1000)
///     .with_tabu_capacity(50)
///     .with_batch_size(20);
/// assert_eq!(config.max_iterations, 1000);
/// assert_eq!(config.tabu_capacity, 50);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TabuConfig {
    /// Maximum number of entries held in tabu memory. The oldest entry is
    /// evicted once this bound is exceeded.
    pub tabu_capacity: usize,
    /// Maximum number of iterations before the run stops.
    pub max_iterations: usize,
    /// Number of neighbor candidates a domain draws per iteration.
    ///
    /// Domains with a fixed neighborhood (maze adjacency, single-swap
    /// timetabling) ignore it.
    pub batch_size: usize,
    /// Random seed (None for a fresh random seed).
    pub seed: Option<u64>,
}

impl Default for TabuConfig {
    fn default() -> Self {
        Self {
            tabu_capacity: 10,
            max_iterations: 100,
            batch_size: 1,
            seed: None,
        }
    }
}

impl TabuConfig {
    /// Sets the tabu memory bound.
    pub fn with_tabu_capacity(mut self, capacity: usize) -> Self {
        self.tabu_capacity = capacity;
        self
    }

    /// Sets the maximum number of iterations.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the number of neighbor candidates drawn per iteration.
    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.batch_size = n;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), TabuError> {
        if self.tabu_capacity == 0 {
            return Err(TabuError::InvalidConfig(
                "tabu_capacity must be at least 1".into(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(TabuError::InvalidConfig(
                "max_iterations must be at least 1".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(TabuError::InvalidConfig(
                "batch_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabu_config_defaults() {
        let config = TabuConfig::default();
        assert_eq!(config.tabu_capacity, 10);
        assert_eq!(config.max_iterations, 100);
        assert_eq!(config.batch_size, 1);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tabu_config_builder() {
        let config = TabuConfig::default()
            .with_tabu_capacity(100)
            .with_max_iterations(1000)
            .with_batch_size(50)
            .with_seed(123);

        assert_eq!(config.tabu_capacity, 100);
        assert_eq!(config.max_iterations, 1000);
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.seed, Some(123));
    }

    #[test]
    fn test_validate_zero_capacity() {
        let config = TabuConfig::default().with_tabu_capacity(0);
        assert!(matches!(
            config.validate(),
            Err(TabuError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_zero_iterations() {
        assert!(TabuConfig::default()
            .with_max_iterations(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_zero_batch() {
        assert!(TabuConfig::default().with_batch_size(0).validate().is_err());
    }
}
