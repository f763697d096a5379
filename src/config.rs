//! Simulation configuration
//!
//! Distance-like settings (`max_step`, `convergence_threshold`) are expressed
//! as fractions of `ideal_edge_length`, so one config works at any scale.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};
use crate::io::{IoError, IoResult};

// =============================================================================
// Default Constants
// =============================================================================

/// Default number of iterations
pub const DEFAULT_ITERATIONS: usize = 100;

/// Default seed for the initial placement
pub const DEFAULT_SEED: u64 = 42;

/// Default resting distance between connected nodes
pub const DEFAULT_IDEAL_EDGE_LENGTH: f64 = 1.0;

/// Default repulsion constant (multiplies `k² / d`)
pub const DEFAULT_REPULSION: f64 = 1.0;

/// Node count above which Barnes-Hut approximation is used
pub const DEFAULT_APPROXIMATION_THRESHOLD: usize = 2000;

/// Default Barnes-Hut theta approximation threshold (0 = exact)
pub const DEFAULT_THETA: f64 = 0.9;

/// Default starting temperature (force-to-displacement scale)
pub const DEFAULT_INITIAL_TEMPERATURE: f64 = 0.1;

/// Default per-iteration multiplier for exponential cooling
pub const DEFAULT_COOLING_FACTOR: f64 = 0.95;

/// Default maximum per-iteration movement, as a fraction of the ideal edge length
pub const DEFAULT_MAX_STEP: f64 = 0.5;

/// Default convergence threshold, as a fraction of the ideal edge length
pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 1e-4;

/// Layout dimensionality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Dimensions {
    Two,
    #[default]
    Three,
}

impl Dimensions {
    pub fn count(self) -> usize {
        match self {
            Dimensions::Two => 2,
            Dimensions::Three => 3,
        }
    }
}

impl TryFrom<u8> for Dimensions {
    type Error = LayoutError;

    fn try_from(value: u8) -> LayoutResult<Self> {
        match value {
            2 => Ok(Dimensions::Two),
            3 => Ok(Dimensions::Three),
            other => Err(LayoutError::config(
                "dimensions",
                other,
                "only 2 and 3 are supported",
            )),
        }
    }
}

impl From<Dimensions> for u8 {
    fn from(dim: Dimensions) -> u8 {
        dim.count() as u8
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}D", self.count())
    }
}

/// How the temperature decreases across iterations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CoolingSchedule {
    /// Falls linearly from the initial temperature to `min_temperature`
    Linear,
    /// Multiplied by `factor` every iteration, floored at `min_temperature`
    Exponential { factor: f64 },
}

impl Default for CoolingSchedule {
    fn default() -> Self {
        CoolingSchedule::Exponential {
            factor: DEFAULT_COOLING_FACTOR,
        }
    }
}

/// Configuration for the force simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// 2D or 3D output
    pub dimensions: Dimensions,
    /// Iteration budget
    pub iterations: usize,
    /// Seed for the initial placement
    pub seed: u64,
    /// Resting distance between connected nodes (`k`)
    pub ideal_edge_length: f64,
    /// Repulsion strength between every node pair
    pub repulsion: f64,
    /// Pull toward the origin, 0 disables it
    pub gravity: f64,
    /// Temperature decay
    pub cooling: CoolingSchedule,
    /// Temperature of the first iteration
    pub initial_temperature: f64,
    /// Temperature floor
    pub min_temperature: f64,
    /// Largest movement of a node in one iteration (fraction of `k`)
    pub max_step: f64,
    /// Stop early once no node moves further than this (fraction of `k`)
    pub convergence_threshold: f64,
    /// Node count above which repulsion is approximated
    pub approximation_threshold: usize,
    /// Barnes-Hut opening criterion
    pub theta: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dimensions: Dimensions::default(),
            iterations: DEFAULT_ITERATIONS,
            seed: DEFAULT_SEED,
            ideal_edge_length: DEFAULT_IDEAL_EDGE_LENGTH,
            repulsion: DEFAULT_REPULSION,
            gravity: 0.0,
            cooling: CoolingSchedule::default(),
            initial_temperature: DEFAULT_INITIAL_TEMPERATURE,
            min_temperature: 0.0,
            max_step: DEFAULT_MAX_STEP,
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
            approximation_threshold: DEFAULT_APPROXIMATION_THRESHOLD,
            theta: DEFAULT_THETA,
        }
    }
}

fn positive(field: &'static str, value: f64) -> LayoutResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::config(field, value, "must be positive and finite"))
    }
}

fn non_negative(field: &'static str, value: f64) -> LayoutResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LayoutError::config(
            field,
            value,
            "must be non-negative and finite",
        ))
    }
}

impl SimulationConfig {
    /// 2D configuration with otherwise default settings
    pub fn two_dimensional() -> Self {
        Self {
            dimensions: Dimensions::Two,
            ..Self::default()
        }
    }

    /// Check every setting before any simulation work starts
    pub fn validate(&self) -> LayoutResult<()> {
        if self.iterations == 0 {
            return Err(LayoutError::config(
                "iterations",
                self.iterations,
                "must be positive",
            ));
        }
        if self.approximation_threshold == 0 {
            return Err(LayoutError::config(
                "approximation_threshold",
                self.approximation_threshold,
                "must be positive",
            ));
        }
        positive("ideal_edge_length", self.ideal_edge_length)?;
        positive("repulsion", self.repulsion)?;
        positive("initial_temperature", self.initial_temperature)?;
        positive("max_step", self.max_step)?;
        non_negative("gravity", self.gravity)?;
        non_negative("min_temperature", self.min_temperature)?;
        non_negative("convergence_threshold", self.convergence_threshold)?;
        non_negative("theta", self.theta)?;

        if self.min_temperature > self.initial_temperature {
            return Err(LayoutError::config(
                "min_temperature",
                self.min_temperature,
                "must not exceed initial_temperature",
            ));
        }
        if let CoolingSchedule::Exponential { factor } = self.cooling {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(LayoutError::config(
                    "cooling.factor",
                    factor,
                    "must be in (0, 1]",
                ));
            }
        }
        Ok(())
    }

    /// Temperature used by iteration `iteration` (0-based)
    pub fn temperature(&self, iteration: usize) -> f64 {
        let t0 = self.initial_temperature;
        let floor = self.min_temperature;
        match self.cooling {
            CoolingSchedule::Linear => {
                let progress = iteration as f64 / self.iterations as f64;
                t0 - (t0 - floor) * progress.min(1.0)
            }
            CoolingSchedule::Exponential { factor } => {
                (t0 * factor.powi(iteration.min(i32::MAX as usize) as i32)).max(floor)
            }
        }
    }

    /// Maximum movement per iteration in layout units
    pub fn max_step_length(&self) -> f64 {
        self.max_step * self.ideal_edge_length
    }

    /// Convergence threshold in layout units
    pub fn convergence_distance(&self) -> f64 {
        self.convergence_threshold * self.ideal_edge_length
    }

    /// Load a configuration file (JSON or YAML, chosen by extension)
    pub fn from_file(path: &Path) -> IoResult<Self> {
        let text = fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| IoError::UnknownExtension(path.display().to_string()))?;

        let config: Self = match ext.to_ascii_lowercase().as_str() {
            "json" => serde_json::from_str(&text).map_err(|e| IoError::Parse(e.to_string()))?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&text).map_err(|e| IoError::Parse(e.to_string()))?
            }
            other => return Err(IoError::UnsupportedFormat(other.to_string())),
        };
        config.validate()?;
        Ok(config)
    }
}
