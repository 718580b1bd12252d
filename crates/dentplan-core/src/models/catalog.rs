//! Catalog services and treatment templates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A billable clinical service from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub price: Decimal,
    pub specialization: Option<String>,
    pub estimated_minutes: Option<u32>,
    pub active: bool,
}

/// A reusable treatment template: phases of catalog services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Template {
    pub id: u64,
    pub code: String,
    pub name: String,

    /// Doctors creating a plan from this template must share it
    pub specialization: Option<String>,

    pub active: bool,

    #[serde(default)]
    pub phases: Vec<TemplatePhase>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplatePhase {
    pub phase_number: u32,
    pub name: String,
    pub estimated_days: Option<u32>,

    #[serde(default)]
    pub items: Vec<TemplateItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateItem {
    pub service_id: u64,

    /// Expanded into this many plan items
    pub quantity: u32,

    /// Overrides the service price when set
    pub price: Option<Decimal>,
}
