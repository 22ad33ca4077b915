//! Graded Response Action Plan reference data.
//!
//! GRAP stages are regulatory measures for the Delhi-NCR region. The table is
//! static; the only logic is deciding which stage a category activates.

use serde::Serialize;

use super::Category;

/// One GRAP stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GrapStage {
    /// Stage number, 1 through 4.
    pub stage: u8,
    /// Human readable trigger condition.
    pub trigger: &'static str,
    /// Measures enforced at this stage.
    pub actions: &'static [&'static str],
}

/// All GRAP stages in ascending order.
pub const GRAP_STAGES: [GrapStage; 4] = [
    GrapStage {
        stage: 1,
        trigger: "AQI 201-300 (Poor)",
        actions: &[
            "Intensify road sweeping and water sprinkling",
            "Strictly enforce dust control at construction sites",
            "Increase bus and metro frequency",
            "Advisory on avoiding diesel generators",
        ],
    },
    GrapStage {
        stage: 2,
        trigger: "AQI 301-400 (Very Poor)",
        actions: &[
            "Stop use of coal and firewood",
            "Increase parking fees by 3-4 times",
            "Restrict diesel generator use except for essential services",
            "Encourage work from home",
        ],
    },
    GrapStage {
        stage: 3,
        trigger: "AQI 401-450 (Severe)",
        actions: &[
            "Ban construction activities",
            "Stop entry of trucks except essential goods",
            "Consider odd-even scheme for vehicles",
            "Close brick kilns and hot mix plants",
        ],
    },
    GrapStage {
        stage: 4,
        trigger: "AQI >450 (Severe+)",
        actions: &[
            "Stop all construction including highways",
            "Entry of trucks banned completely",
            "Schools shift to online mode",
            "50% staff work from home",
            "Emergency measures for power plants",
        ],
    },
];

/// The highest GRAP stage in force for a category, or 0 when none applies.
#[must_use]
pub fn grap_stage(category: Category) -> u8 {
    match category {
        Category::Poor => 1,
        Category::VeryPoor => 2,
        Category::Severe => 4,
        Category::Good | Category::Satisfactory | Category::Moderate => 0,
    }
}

/// Every stage in force for a category. Stages are cumulative.
#[must_use]
pub fn active_grap_stages(category: Category) -> Vec<&'static GrapStage> {
    let active = grap_stage(category);
    GRAP_STAGES.iter().filter(|s| s.stage <= active).collect()
}
