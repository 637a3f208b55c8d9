//! Scoring tables for the pattern detector and the placement advisor.
//!
//! Every value has a default, and every struct deserializes with `#[serde(default)]`, so a
//! configuration file only needs to list the values it overrides:
//!
//! ```json
//! { "advisor": { "connectivity": { "burst": -80.0 } } }
//! ```

use serde::{Deserialize, Serialize};

use crate::phase::Phase;

/// Complete scoring configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub pattern: PatternScoringConfig,
    pub advisor: AdvisorConfig,
}

/// Constants of the fold detector's quality score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternScoringConfig {
    pub basic_fold: u32,
    pub extended_fold: u32,
    pub points_per_chain: u32,
    /// Chains beyond this count earn nothing extra.
    pub max_scored_chains: usize,
    pub aux_row: AuxRowBonus,
    pub leftover: LeftoverBonus,
    pub tail_shape: TailShapeMultipliers,
    pub base_weight: f32,
    pub tail_weight: f32,
}

impl Default for PatternScoringConfig {
    fn default() -> Self {
        Self {
            basic_fold: 100,
            extended_fold: 120,
            points_per_chain: 10,
            max_scored_chains: 5,
            aux_row: AuxRowBonus::default(),
            leftover: LeftoverBonus::default(),
            tail_shape: TailShapeMultipliers::default(),
            base_weight: 0.5,
            tail_weight: 0.5,
        }
    }
}

/// Bonus by how the chain uses the row above the fold on the right side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuxRowBonus {
    pub rightmost_only: u32,
    pub rightmost_two: u32,
    pub partial: u32,
    pub unused: u32,
}

impl Default for AuxRowBonus {
    fn default() -> Self {
        Self {
            rightmost_only: 15,
            rightmost_two: 10,
            partial: 5,
            unused: 0,
        }
    }
}

/// Bonus by what remains in the evaluation region after the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeftoverBonus {
    pub none: u32,
    pub multiple_colors: u32,
    pub connected_three: u32,
    pub connected_two: u32,
    pub separated: u32,
}

impl Default for LeftoverBonus {
    fn default() -> Self {
        Self {
            none: 20,
            multiple_colors: 0,
            connected_three: 18,
            connected_two: 15,
            separated: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TailShapeMultipliers {
    pub y: f32,
    pub broad: f32,
    pub corner: f32,
    pub staircase: f32,
    pub unclassified: f32,
}

impl Default for TailShapeMultipliers {
    fn default() -> Self {
        Self {
            y: 1.5,
            broad: 1.3,
            corner: 1.2,
            staircase: 1.0,
            unclassified: 1.0,
        }
    }
}

/// Constants of the placement scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub fold: FoldScoring,
    pub tail: TailScoring,
    pub connectivity: ConnectivityScoring,
    pub height: HeightScoring,
    pub chain_simulation: ChainSimulationScoring,
    pub weights: PhaseWeightTable,
    /// Puyos in the tail columns' bottom four rows that move the game into completion.
    pub completion_tail_cells: usize,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            fold: FoldScoring::default(),
            tail: TailScoring::default(),
            connectivity: ConnectivityScoring::default(),
            height: HeightScoring::default(),
            chain_simulation: ChainSimulationScoring::default(),
            weights: PhaseWeightTable::default(),
            completion_tail_cells: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldScoring {
    /// Bonus for a correct color on a slot, indexed by tier.
    pub tier_bonus: [f32; 3],
    /// Applied to the bonus while the tier below is incomplete.
    pub prerequisite_multiplier: f32,
    pub wrong_color: f32,
    /// Fold-column cell above the template rows.
    pub too_high: f32,
    /// Fold-column cell inside the template rows but off the template.
    pub off_template: f32,
}

impl Default for FoldScoring {
    fn default() -> Self {
        Self {
            tier_bonus: [20.0, 18.0, 15.0],
            prerequisite_multiplier: 0.5,
            wrong_color: -25.0,
            too_high: -20.0,
            off_template: -5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TailScoring {
    pub tail_column: f32,
    pub same_color_neighbor: f32,
    pub bottom_rows: f32,
    pub balanced_heights: f32,
    pub layered_column: f32,
    pub tower: f32,
    pub too_high: f32,
}

impl Default for TailScoring {
    fn default() -> Self {
        Self {
            tail_column: 10.0,
            same_color_neighbor: 6.0,
            bottom_rows: 5.0,
            balanced_heights: 8.0,
            layered_column: 3.0,
            tower: -15.0,
            too_high: -10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivityScoring {
    pub pair: f32,
    pub triple: f32,
    pub burst: f32,
    pub vertical_triple: f32,
    pub misplaced_triple: f32,
}

impl Default for ConnectivityScoring {
    fn default() -> Self {
        Self {
            pair: 10.0,
            triple: 25.0,
            burst: -50.0,
            vertical_triple: -10.0,
            misplaced_triple: -10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightScoring {
    /// Rows `0..=critical_row` are critical.
    pub critical_row: usize,
    pub critical: f32,
    /// Rows up to `warning_row` below the critical zone are a warning.
    pub warning_row: usize,
    pub warning: f32,
}

impl Default for HeightScoring {
    fn default() -> Self {
        Self {
            critical_row: 2,
            critical: -30.0,
            warning_row: 4,
            warning: -15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSimulationScoring {
    pub pattern_bonus: f32,
    pub per_chain: f32,
}

impl Default for ChainSimulationScoring {
    fn default() -> Self {
        Self {
            pattern_bonus: 10.0,
            per_chain: 15.0,
        }
    }
}

/// Multipliers applied to each term's raw score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseWeights {
    pub fold_progress: f32,
    pub chain_tail: f32,
    pub connectivity: f32,
    pub height: f32,
    pub chain_simulation: f32,
    pub lookahead: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseWeightTable {
    pub fold_building: PhaseWeights,
    pub chain_tail: PhaseWeights,
    pub completion: PhaseWeights,
}

impl Default for PhaseWeightTable {
    fn default() -> Self {
        Self {
            fold_building: PhaseWeights {
                fold_progress: 4.0,
                chain_tail: 0.0,
                connectivity: 0.5,
                height: 1.5,
                chain_simulation: 0.0,
                lookahead: 0.5,
            },
            chain_tail: PhaseWeights {
                fold_progress: 0.5,
                chain_tail: 1.0,
                connectivity: 1.0,
                height: 1.0,
                chain_simulation: 5.0,
                lookahead: 0.5,
            },
            completion: PhaseWeights {
                fold_progress: 0.2,
                chain_tail: 1.0,
                connectivity: 1.0,
                height: 1.0,
                chain_simulation: 5.0,
                lookahead: 0.3,
            },
        }
    }
}

impl PhaseWeightTable {
    #[must_use]
    pub fn get(&self, phase: Phase) -> &PhaseWeights {
        match phase {
            Phase::FoldBuilding => &self.fold_building,
            Phase::ChainTail => &self.chain_tail,
            Phase::Completion => &self.completion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: ScoringConfig =
            serde_json::from_str(r#"{ "advisor": { "connectivity": { "burst": -80.0 } } }"#)
                .unwrap();
        assert!((config.advisor.connectivity.burst + 80.0).abs() < f32::EPSILON);
        assert!((config.advisor.connectivity.triple - 25.0).abs() < f32::EPSILON);
        assert_eq!(config.pattern, PatternScoringConfig::default());
        assert_eq!(config.advisor.completion_tail_cells, 6);
    }

    #[test]
    fn test_empty_object_is_default() {
        let config: ScoringConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ScoringConfig::default());
    }

    #[test]
    fn test_weights_by_phase() {
        let table = PhaseWeightTable::default();
        assert!((table.get(Phase::FoldBuilding).fold_progress - 4.0).abs() < f32::EPSILON);
        assert!(table.get(Phase::FoldBuilding).chain_simulation.abs() < f32::EPSILON);
        assert!((table.get(Phase::Completion).lookahead - 0.3).abs() < f32::EPSILON);
    }
}
