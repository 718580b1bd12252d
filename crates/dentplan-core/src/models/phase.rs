//! Phase model definition.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::{Item, PhaseStatus};

/// An ordered stage within a plan, grouping items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Phase {
    pub id: u64,

    /// ID of the parent plan
    pub plan_id: u64,

    /// Position within the plan, contiguous from 1
    pub phase_number: u32,

    pub name: String,

    #[serde(default)]
    pub status: PhaseStatus,

    pub start_date: Option<Date>,
    pub completion_date: Option<Date>,

    pub estimated_days: Option<u32>,

    #[serde(default)]
    pub items: Vec<Item>,
}
