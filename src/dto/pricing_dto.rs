use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body for registering a material in the pricing table.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MaterialPriceCreate {
    #[validate(length(min = 1, max = 100))]
    pub material_name: String,

    #[validate(range(exclusive_min = 0.0))]
    pub base_price_per_unit: f64,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_unit")]
    pub unit: String,

    /// Multiplier for part complexity
    #[validate(range(min = 0.5, max = 3.0))]
    #[serde(default = "default_complexity")]
    pub machining_complexity_factor: f64,

    #[validate(range(min = 1))]
    #[serde(default = "default_minimum_order")]
    pub minimum_order_quantity: i64,

    /// Quantity at which the bulk discount applies
    #[validate(range(min = 1))]
    #[serde(default = "default_bulk_threshold")]
    pub bulk_discount_threshold: i64,

    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(default = "default_bulk_percentage")]
    pub bulk_discount_percentage: f64,

    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_labor_rate")]
    pub labor_cost_per_hour: f64,

    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_hours_per_unit")]
    pub estimated_hours_per_unit: f64,

    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(default = "default_markup")]
    pub markup_percentage: f64,
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_unit() -> String {
    "kg".to_string()
}

fn default_complexity() -> f64 {
    1.0
}

fn default_minimum_order() -> i64 {
    1
}

fn default_bulk_threshold() -> i64 {
    10
}

fn default_bulk_percentage() -> f64 {
    5.0
}

fn default_labor_rate() -> f64 {
    500.0
}

fn default_hours_per_unit() -> f64 {
    1.0
}

fn default_markup() -> f64 {
    20.0
}

/// Partial update of the mutable pricing fields. Unknown fields are
/// rejected at deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct MaterialPriceUpdate {
    #[validate(range(exclusive_min = 0.0))]
    pub base_price_per_unit: Option<f64>,

    #[validate(range(min = 0.5, max = 3.0))]
    pub machining_complexity_factor: Option<f64>,

    #[validate(range(min = 1))]
    pub minimum_order_quantity: Option<i64>,

    #[validate(range(min = 1))]
    pub bulk_discount_threshold: Option<i64>,

    #[validate(range(min = 0.0, max = 100.0))]
    pub bulk_discount_percentage: Option<f64>,

    #[validate(range(exclusive_min = 0.0))]
    pub labor_cost_per_hour: Option<f64>,

    #[validate(range(exclusive_min = 0.0))]
    pub estimated_hours_per_unit: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0))]
    pub markup_percentage: Option<f64>,
}

/// Request body for the quote-estimate calculator.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PricingCalculationRequest {
    #[validate(length(min = 1, max = 100))]
    pub material: String,

    #[validate(range(min = 1))]
    pub quantity: i64,

    /// Part complexity multiplier; defaults to the material's stored factor
    #[validate(range(min = 0.5, max = 3.0))]
    pub complexity_factor: Option<f64>,

    /// Delivery timeline preference in days
    #[validate(range(min = 1))]
    pub delivery_days: Option<i64>,
}

/// Itemized estimate; monetary values rounded to 2 decimals here and
/// nowhere earlier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingCalculationResponse {
    pub material: String,
    pub quantity: i64,
    pub base_material_cost: f64,
    pub labor_cost: f64,
    pub subtotal: f64,
    pub bulk_discount: f64,
    pub subtotal_after_discount: f64,
    pub markup: f64,
    pub total_price: f64,
    pub price_per_unit: f64,
    pub currency: String,
    pub complexity_factor: f64,
    pub estimated_delivery_days: i64,
}

/// One material's computed rate entry in the live-cost payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRateItem {
    pub id: i64,
    pub material: String,
    pub cost_per_kg: f64,
    pub labor_cost_per_hour: f64,
    pub machine_cost_per_hour: f64,
    pub minimum_order: i64,
}

/// Snapshot of all tracked materials' rates plus provenance and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveRatesResponse {
    pub updated_at: DateTime<Utc>,
    pub source: String,
    pub currency: String,
    pub items: Vec<MaterialRateItem>,
}
