use serde::{Deserialize, Serialize};

use super::match_entity::TeamRef;

/// One row of a tournament points table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub team: TeamRef,
    pub rank: u32,
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    pub points: u32,

    /// Net run rate. Left unset when the upstream omits it - never
    /// fabricated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_run_rate: Option<f64>,
}
