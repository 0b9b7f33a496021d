//! Replay configuration.

use quill_core::Dpi;

/// Settings passed explicitly into every replay.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayConfig {
    /// Resolution recordings were authored at. Replay scales by
    /// `surface.logical_dpi() / reference_dpi` on each axis.
    pub reference_dpi: Dpi,
    /// Deepest allowed nesting of `Begin` blocks, the top-level block
    /// counting as 1.
    pub max_block_depth: usize,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            reference_dpi: Dpi::STANDARD,
            max_block_depth: 64,
        }
    }
}

/// Reasons a [`PlayConfig`] is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A reference DPI component is zero, negative, or not finite.
    #[error("reference DPI must be finite and positive, got {x}×{y}")]
    InvalidDpi {
        /// Horizontal component.
        x: f64,
        /// Vertical component.
        y: f64,
    },
    /// Nesting depth of zero would reject even the top-level block.
    #[error("max_block_depth must be at least 1")]
    ZeroDepth,
}

impl PlayConfig {
    /// Check the configuration before replay starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Dpi { x, y } = self.reference_dpi;
        if !(x.is_finite() && y.is_finite() && x > 0.0 && y > 0.0) {
            return Err(ConfigError::InvalidDpi { x, y });
        }
        if self.max_block_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        Ok(())
    }

    /// Same configuration with a different reference resolution.
    pub fn with_reference_dpi(mut self, dpi: Dpi) -> Self {
        self.reference_dpi = dpi;
        self
    }

    /// Same configuration with a different nesting limit.
    pub fn with_max_block_depth(mut self, depth: usize) -> Self {
        self.max_block_depth = depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(PlayConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_dpi() {
        for dpi in [
            Dpi::new(0.0, 96.0),
            Dpi::new(96.0, -1.0),
            Dpi::new(f64::NAN, 96.0),
            Dpi::new(96.0, f64::INFINITY),
        ] {
            let cfg = PlayConfig::default().with_reference_dpi(dpi);
            assert!(matches!(cfg.validate(), Err(ConfigError::InvalidDpi { .. })));
        }
    }

    #[test]
    fn rejects_zero_depth() {
        let cfg = PlayConfig::default().with_max_block_depth(0);
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroDepth));
    }
}
