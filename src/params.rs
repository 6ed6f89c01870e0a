//! Tunable generation parameters
//!
//! Every "odds" field is a chance out of 16: a roll of `0..16` below the value
//! succeeds.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::WorldError;
use crate::junction::MAX_ID;

/// Smallest grid that leaves room for the inset landmass and coastline blocks
pub const MIN_DIMENSION: usize = 16;

/// Largest grid side; keeps town ids and tile indices comfortably in range
pub const MAX_DIMENSION: usize = 1024;

/// Configuration parameters for island generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Grid width in tiles (default: 100)
    pub width: usize,
    /// Grid height in tiles (default: 64)
    pub height: usize,
    /// Numbered highways to lay out
    pub route_count: usize,
    /// Curvy named roads laid after the highways
    pub rural_road_count: usize,

    /// Chance of carving a 9x9 notch out of each coastal block
    pub notch_odds: u32,
    /// Chance of pushing a 3x3 block across a coastal boundary (each way)
    pub edge_block_odds: u32,
    /// Chance of stair-stepping a slab corner
    pub slab_fix_odds: u32,
    /// Chance an open tile joins a neighboring town in a growth pass
    pub town_growth_odds: u32,

    /// Highways keep going past a junction when the roll is at or below this
    pub route_persistence: u32,
    /// Same for streets and rural roads
    pub street_persistence: u32,
    /// Highways shorter than this never stop at a junction
    pub route_min_persist_length: u32,
    pub street_min_persist_length: u32,
    /// Chance of joining an existing route on a shared leg
    pub overlap_odds: u32,
    /// Tiles before a highway may run into the last route it met
    pub remeet_window: u32,
    /// Consecutive forced steps tolerated before giving up
    pub max_forced_steps: u32,
    /// Forced-step cutoff only applies past this length
    pub forced_min_length: u32,
    /// Tiles before the direction bias may be re-rolled
    pub bias_min_length: u32,
    /// Chance of re-rolling the direction bias
    pub bias_change_odds: u32,
    /// Chance a re-roll returns to the walk's natural bias
    pub bias_return_odds: u32,
    /// Weight added to the biased bin each step
    pub bias_boost: u32,

    /// Prior over {sharp left, left, straight, right, sharp right} for highways and city streets
    pub route_prior: [u32; 5],
    /// Prior for rural roads; weaker straight bin
    pub rural_prior: [u32; 5],

    pub highway_max_length: u32,
    pub rural_road_max_length: u32,

    /// Random probes per start-point search mode
    pub start_search_tries: u32,
    /// Route layout attempts allowed per requested route
    pub route_attempts_per_route: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            width: 100,
            height: 64,
            route_count: 10,
            rural_road_count: 10,
            notch_odds: 5,
            edge_block_odds: 5,
            slab_fix_odds: 7,
            town_growth_odds: 12,
            route_persistence: 10,
            street_persistence: 8,
            route_min_persist_length: 8,
            street_min_persist_length: 6,
            overlap_odds: 12,
            remeet_window: 12,
            max_forced_steps: 5,
            forced_min_length: 15,
            bias_min_length: 12,
            bias_change_odds: 3,
            bias_return_odds: 6,
            bias_boost: 20,
            route_prior: [5, 10, 30, 10, 5],
            rural_prior: [5, 10, 15, 10, 5],
            highway_max_length: 300,
            rural_road_max_length: 96,
            start_search_tries: 200,
            route_attempts_per_route: 20,
        }
    }
}

impl GenerationParams {
    /// Read parameters from a JSON file; missing fields take their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| WorldError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        let params: Self = serde_json::from_str(&text).map_err(|source| WorldError::ConfigParse {
            path: path.display().to_string(),
            source,
        })?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), WorldError> {
        validate_dimensions(self.width, self.height)?;

        if self.route_count > MAX_ID as usize {
            return Err(WorldError::InvalidParam {
                name: "route_count",
                reason: format!("at most {} routes", MAX_ID),
            });
        }
        if self.rural_road_count > MAX_ID as usize {
            return Err(WorldError::InvalidParam {
                name: "rural_road_count",
                reason: format!("at most {} named roads", MAX_ID),
            });
        }
        let odds = [
            ("notch_odds", self.notch_odds),
            ("edge_block_odds", self.edge_block_odds),
            ("slab_fix_odds", self.slab_fix_odds),
            ("town_growth_odds", self.town_growth_odds),
            ("route_persistence", self.route_persistence),
            ("street_persistence", self.street_persistence),
            ("overlap_odds", self.overlap_odds),
            ("bias_change_odds", self.bias_change_odds),
            ("bias_return_odds", self.bias_return_odds),
        ];
        for (name, value) in odds {
            if value > 16 {
                return Err(WorldError::InvalidParam {
                    name,
                    reason: format!("{} is not a chance out of 16", value),
                });
            }
        }
        if self.route_prior.iter().sum::<u32>() == 0 {
            return Err(WorldError::InvalidParam {
                name: "route_prior",
                reason: "all weights are zero".to_string(),
            });
        }
        if self.rural_prior.iter().sum::<u32>() == 0 {
            return Err(WorldError::InvalidParam {
                name: "rural_prior",
                reason: "all weights are zero".to_string(),
            });
        }
        Ok(())
    }

    /// Cap on highway layout attempts before giving up on the rest
    pub fn max_route_attempts(&self) -> usize {
        self.route_count
            .saturating_mul(self.route_attempts_per_route.max(1) as usize)
    }
}

/// Check a grid size against the supported range
pub fn validate_dimensions(width: usize, height: usize) -> Result<(), WorldError> {
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return Err(WorldError::InvalidDimensions {
            width,
            height,
            reason: "each side must be at least 16 tiles",
        });
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(WorldError::InvalidDimensions {
            width,
            height,
            reason: "each side must be at most 1024 tiles",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = GenerationParams::default();
        assert_eq!(params.width, 100);
        assert_eq!(params.height, 64);
        assert_eq!(params.route_count, 10);
        assert!(params.validate().is_ok());
        assert_eq!(params.max_route_attempts(), 200);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let params: GenerationParams = serde_json::from_str(r#"{ "width": 40, "route_count": 3 }"#).unwrap();
        assert_eq!(params.width, 40);
        assert_eq!(params.height, 64);
        assert_eq!(params.route_count, 3);
        assert_eq!(params.route_prior, [5, 10, 30, 10, 5]);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let tiny = GenerationParams {
            width: 8,
            ..GenerationParams::default()
        };
        assert!(matches!(tiny.validate(), Err(WorldError::InvalidDimensions { .. })));

        let odds = GenerationParams {
            overlap_odds: 17,
            ..GenerationParams::default()
        };
        assert!(matches!(
            odds.validate(),
            Err(WorldError::InvalidParam { name: "overlap_odds", .. })
        ));

        let rural = GenerationParams {
            rural_road_count: MAX_ID as usize + 1,
            ..GenerationParams::default()
        };
        assert!(matches!(
            rural.validate(),
            Err(WorldError::InvalidParam { name: "rural_road_count", .. })
        ));
    }

    #[test]
    fn test_load_json_reports_missing_file() {
        let err = GenerationParams::load_json("/nonexistent/island.json").unwrap_err();
        assert!(matches!(err, WorldError::ConfigIo { .. }));
    }
}
