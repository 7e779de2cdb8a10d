use thiserror::Error;

use crate::shared::constants::{DEFAULT_MIN_NEIGHBORS, DEFAULT_SCALE_FACTOR};

#[derive(Error, Debug, PartialEq)]
pub enum ParamsError {
    #[error("scale factor must be greater than 1.0, got {0}")]
    ScaleFactor(f64),
    #[error("minimum size {min:?} exceeds maximum size {max:?}")]
    SizeRange { min: (u32, u32), max: (u32, u32) },
}

/// Multi-scale search settings for cascade detection.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionParams {
    scale_factor: f64,
    min_neighbors: usize,
    min_size: (u32, u32),
    max_size: Option<(u32, u32)>,
}

impl DetectionParams {
    pub fn new(scale_factor: f64, min_neighbors: usize) -> Result<Self, ParamsError> {
        // Also rejects NaN.
        if !(scale_factor > 1.0) {
            return Err(ParamsError::ScaleFactor(scale_factor));
        }
        Ok(Self {
            scale_factor,
            min_neighbors,
            min_size: (0, 0),
            max_size: None,
        })
    }

    pub fn with_min_size(mut self, min_size: (u32, u32)) -> Result<Self, ParamsError> {
        self.min_size = min_size;
        self.check_sizes()?;
        Ok(self)
    }

    pub fn with_max_size(mut self, max_size: (u32, u32)) -> Result<Self, ParamsError> {
        self.max_size = Some(max_size);
        self.check_sizes()?;
        Ok(self)
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn min_neighbors(&self) -> usize {
        self.min_neighbors
    }

    pub fn min_size(&self) -> (u32, u32) {
        self.min_size
    }

    pub fn max_size(&self) -> Option<(u32, u32)> {
        self.max_size
    }

    fn check_sizes(&self) -> Result<(), ParamsError> {
        match self.max_size {
            Some(max) if self.min_size.0 > max.0 || self.min_size.1 > max.1 => {
                Err(ParamsError::SizeRange {
                    min: self.min_size,
                    max,
                })
            }
            _ => Ok(()),
        }
    }
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
            min_size: (0, 0),
            max_size: None,
        }
    }
}
