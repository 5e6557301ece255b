use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Reference pricing data for one material, independently managed and not
/// tied to any file or quote lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MaterialPrice {
    pub id: i64,
    pub material_name: String,
    pub base_price_per_unit: f64,
    pub currency: String,
    pub unit: String,
    pub machining_complexity_factor: f64,
    pub minimum_order_quantity: i64,
    pub bulk_discount_threshold: i64,
    pub bulk_discount_percentage: f64,
    pub labor_cost_per_hour: f64,
    pub estimated_hours_per_unit: f64,
    pub markup_percentage: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
