// Data-driven simulation configuration.
//
// All tunable model parameters live here in `SimConfig`, loaded from JSON at
// startup. The sim itself never uses magic numbers for anything a field
// study would re-estimate — it reads from the config. Fixed biological
// constants that are part of the model structure (tidal period, dispersal
// kernel shape, judgement windows) stay as constants in their modules.
//
// Parameters are grouped into nested sub-structs: `DispersalParams` for the
// seed journey, `SeedBankParams` for the optional dormancy variant, and
// `ClusteringParams` for the end-of-run spatial diagnostic.
//
// See also: `sim.rs` which owns the `SimConfig` as part of `SimState`,
// `environment.rs` for how `stoch_max` and `adjustment_factor` shape each
// year, `seed.rs` for the dispersal parameters in action.
//
// **Critical constraint: determinism.** Config values feed directly into
// simulation logic. Identical seed + config + landscape must give identical
// runs, so nothing here may depend on ambient state.

use serde::{Deserialize, Serialize};

/// Parameters of the hydrochory seed journey.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DispersalParams {
    /// Whether floating seeds actually ride the river. When false, a seed
    /// that would have floated resolves its whole journey with one
    /// closed-form implantation draw at the drop point.
    pub hydrochory_enabled: bool,

    /// Probability that a dropped seed reaches the water at all (seeds
    /// dropped onto open water always do).
    pub hydrochory_probability: f64,

    /// Per-hour probability that a floating seed leaves the water and
    /// implants on the marsh.
    pub implantation_rate: f64,

    /// Maximum hop distance (map units) from the marsh boundary when a
    /// floating seed exits the water.
    pub implantation_max_distance: f64,

    /// Probability that an implanted seed survives the winter to
    /// germination.
    pub winter_survival_rate: f64,

    /// Empirical seed float times (hours), sorted ascending. A floating
    /// seed's budget is drawn uniformly from this list, with tie walk-back
    /// and gap resampling to undo the nightly batching in the source
    /// observations.
    pub seed_float_times: Vec<u32>,
}

/// Parameters of the optional seed-bank (dormancy) variant.
///
/// The variant is off by default: with `seed_bank_rate` at zero every
/// winter-surviving seed germinates immediately and no `BankedSeed` agents
/// are ever created.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeedBankParams {
    /// Probability that a winter-surviving seed enters the bank instead of
    /// germinating or dying. Zero disables the variant.
    pub seed_bank_rate: f64,

    /// Probability that a winter-surviving seed germinates. Only consulted
    /// when the variant is enabled.
    pub germination_rate: f64,
}

/// Parameters of the end-of-run DBSCAN diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusteringParams {
    /// Neighborhood radius (map units).
    pub epsilon: f64,

    /// Minimum neighborhood size for a core point. At 1, every point joins
    /// a cluster and the partition is the connected components of the
    /// epsilon graph.
    pub min_points: usize,

    /// Population above which clustering is skipped (quadratic cost).
    pub dbscan_cutoff: usize,
}

/// All tunable parameters of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Upper bound of the yearly environmental multiplier. Each year draws
    /// one shared multiplier log-uniformly from [1/stoch_max, stoch_max].
    /// Must be greater than 1.
    pub stoch_max: f64,

    /// Experimental survival adjustment applied (under a square root,
    /// alongside crowding) after the warm-up years.
    pub adjustment_factor: f64,

    /// Year horizon: the run ends at the boundary that reaches this year.
    pub max_year_count: u32,

    /// Population ceiling: the run ends when the year's reproducing
    /// population exceeds this.
    pub max_population_count: usize,

    /// Carrying capacity of one raster cell's plot. Also anchors the
    /// thriving/transient classification thresholds (80% / 20% of it).
    pub carrying_capacity: u32,

    pub dispersal: DispersalParams,
    pub seed_bank: SeedBankParams,
    pub clustering: ClusteringParams,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            stoch_max: 2.0,
            adjustment_factor: 1.0,
            max_year_count: 100,
            max_population_count: 150_000,
            carrying_capacity: 50,
            dispersal: DispersalParams {
                hydrochory_enabled: true,
                hydrochory_probability: 0.340,
                implantation_rate: 0.0005,
                implantation_max_distance: 4.0,
                winter_survival_rate: 0.379,
                seed_float_times: default_float_time_profile(),
            },
            seed_bank: SeedBankParams {
                seed_bank_rate: 0.0,
                germination_rate: 0.5,
            },
            clustering: ClusteringParams {
                epsilon: 25.0,
                min_points: 1,
                dbscan_cutoff: 25_000,
            },
        }
    }
}

/// A compact built-in float-time profile (hours afloat), for runs that do
/// not supply site observations. Sorted, with the tie runs and coarse tail
/// gaps typical of batched release-recapture counts.
pub fn default_float_time_profile() -> Vec<u32> {
    vec![
        2, 3, 3, 4, 5, 5, 5, 6, 7, 8, 8, 9, 10, 11, 12, 12, 13, 14, 15, 16, //
        17, 18, 19, 21, 22, 24, 24, 26, 28, 30, 33, 36, 40, 45, 45, 52, 60, //
        60, 60, 71, 71, 85, 96, 110, 110, 128, 128, 150, 150, 150, 172, 196, //
        220, 247, 280, 310, 340, 380, 420, 460, 480, 504,
    ]
}

impl SimConfig {
    /// Check the parameter ranges the model depends on. Returns the first
    /// problem found.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.stoch_max > 1.0) {
            return Err(format!("stoch_max must be > 1, got {}", self.stoch_max));
        }
        if !(self.adjustment_factor > 0.0) {
            return Err(format!(
                "adjustment_factor must be > 0, got {}",
                self.adjustment_factor
            ));
        }
        if self.max_year_count == 0 {
            return Err("max_year_count must be at least 1".to_string());
        }
        if self.carrying_capacity == 0 {
            return Err("carrying_capacity must be at least 1".to_string());
        }
        for (name, p) in [
            ("hydrochory_probability", self.dispersal.hydrochory_probability),
            ("implantation_rate", self.dispersal.implantation_rate),
            ("winter_survival_rate", self.dispersal.winter_survival_rate),
            ("seed_bank_rate", self.seed_bank.seed_bank_rate),
            ("germination_rate", self.seed_bank.germination_rate),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("{name} must be a probability, got {p}"));
            }
        }
        if self.seed_bank.seed_bank_rate + self.seed_bank.germination_rate > 1.0 {
            return Err(format!(
                "seed_bank_rate + germination_rate must not exceed 1, got {}",
                self.seed_bank.seed_bank_rate + self.seed_bank.germination_rate
            ));
        }
        if !(self.dispersal.implantation_max_distance > 0.0) {
            return Err(format!(
                "implantation_max_distance must be > 0, got {}",
                self.dispersal.implantation_max_distance
            ));
        }
        if self.dispersal.seed_float_times.is_empty() {
            return Err("seed_float_times must not be empty".to_string());
        }
        if !self.dispersal.seed_float_times.is_sorted() {
            return Err("seed_float_times must be sorted ascending".to_string());
        }
        if !(self.clustering.epsilon > 0.0) {
            return Err(format!(
                "epsilon must be > 0, got {}",
                self.clustering.epsilon
            ));
        }
        if self.clustering.min_points == 0 {
            return Err("min_points must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn default_config_serializes() {
        let config = SimConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let restored: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn config_loads_from_json_string() {
        let json = r#"{
            "stoch_max": 4.0,
            "adjustment_factor": 0.9,
            "max_year_count": 50,
            "max_population_count": 80000,
            "carrying_capacity": 40,
            "dispersal": {
                "hydrochory_enabled": false,
                "hydrochory_probability": 0.25,
                "implantation_rate": 0.001,
                "implantation_max_distance": 4.0,
                "winter_survival_rate": 0.379,
                "seed_float_times": [1, 2, 2, 5, 9, 30]
            },
            "seed_bank": {
                "seed_bank_rate": 0.1,
                "germination_rate": 0.5
            },
            "clustering": {
                "epsilon": 25.0,
                "min_points": 1,
                "dbscan_cutoff": 25000
            }
        }"#;
        let config: SimConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.stoch_max, 4.0);
        assert_eq!(config.max_year_count, 50);
        assert!(!config.dispersal.hydrochory_enabled);
        assert_eq!(config.dispersal.seed_float_times, vec![1, 2, 2, 5, 9, 30]);
        assert_eq!(config.seed_bank.seed_bank_rate, 0.1);
        assert_eq!(config.clustering.dbscan_cutoff, 25_000);
    }

    #[test]
    fn validate_rejects_bad_parameters() {
        let mut config = SimConfig::default();
        config.stoch_max = 1.0;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.dispersal.implantation_rate = 1.5;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.dispersal.seed_float_times = vec![5, 3, 9];
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.seed_bank.seed_bank_rate = 0.6;
        config.seed_bank.germination_rate = 0.6;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.clustering.min_points = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_float_profile_is_sorted_with_ties() {
        let profile = default_float_time_profile();
        assert!(profile.is_sorted());
        // The profile keeps the batching artifacts the de-noising step
        // exists for: tie runs and gaps wider than six hours.
        assert!(profile.windows(2).any(|w| w[0] == w[1]));
        assert!(profile.windows(2).any(|w| w[1] - w[0] > 6));
    }
}
