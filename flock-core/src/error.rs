use core::fmt;

/// Rejected simulation configuration.
///
/// Every setter validates before applying, so a rejected update leaves the
/// previous configuration in effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Weights scale steering forces and must be finite and non-negative.
    NegativeWeight { name: &'static str, value: f32 },
    /// Radii, speeds, forces and cell sizes must be finite and positive.
    NonPositive { name: &'static str, value: f32 },
    /// A fraction or ratio outside its closed interval.
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    InvalidSpeedRange { min: f32, max: f32 },
    EmptyBounds { axis: usize, extent: f32 },
    /// Level-of-detail distances must increase and cadences be at least 1.
    InvalidLod(&'static str),
    InvalidCamera(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NegativeWeight { name, value } => {
                write!(f, "{} must be a non-negative number, got {}", name, value)
            }
            ConfigError::NonPositive { name, value } => {
                write!(f, "{} must be a positive number, got {}", name, value)
            }
            ConfigError::OutOfRange { name, value, min, max } => {
                write!(f, "{} must be between {} and {}, got {}", name, min, max, value)
            }
            ConfigError::InvalidSpeedRange { min, max } => {
                write!(f, "initial speed range {}..{} is invalid", min, max)
            }
            ConfigError::EmptyBounds { axis, extent } => {
                write!(f, "bounds extent on axis {} must be positive, got {}", axis, extent)
            }
            ConfigError::InvalidLod(reason) => write!(f, "invalid level-of-detail settings: {}", reason),
            ConfigError::InvalidCamera(reason) => write!(f, "invalid camera: {}", reason),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

pub(crate) fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeWeight { name, value })
    }
}

pub(crate) fn within(name: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, value, min, max })
    }
}

pub(crate) fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}
