use std::sync::Arc;

use partbroker_backend::dto::pricing_dto::{
    MaterialPriceCreate, MaterialPriceUpdate, PricingCalculationRequest,
};
use partbroker_backend::repository::db;
use partbroker_backend::repository::material_price_repo::SqliteMaterialPriceRepository;
use partbroker_backend::service::pricing_service::{PricingService, PricingServiceImpl};
use partbroker_backend::util::error::ServiceError;

async fn setup_service() -> PricingServiceImpl {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    db::init_schema(&pool).await.expect("Failed to apply schema");
    PricingServiceImpl::new(Arc::new(SqliteMaterialPriceRepository::new(pool)))
}

fn steel() -> MaterialPriceCreate {
    MaterialPriceCreate {
        material_name: "Steel".to_string(),
        base_price_per_unit: 55.0,
        currency: "INR".to_string(),
        unit: "kg".to_string(),
        machining_complexity_factor: 1.0,
        minimum_order_quantity: 10,
        bulk_discount_threshold: 25,
        bulk_discount_percentage: 5.0,
        labor_cost_per_hour: 350.0,
        estimated_hours_per_unit: 1.0,
        markup_percentage: 20.0,
    }
}

#[tokio::test]
async fn test_estimate_worked_example() {
    let service = setup_service().await;
    service.create_material(steel()).await.expect("Failed to create material");

    let estimate = service
        .calculate_estimate(PricingCalculationRequest {
            material: "Steel".to_string(),
            quantity: 25,
            complexity_factor: Some(1.0),
            delivery_days: None,
        })
        .await
        .expect("Failed to calculate estimate");

    assert_eq!(estimate.base_material_cost, 1375.0);
    assert_eq!(estimate.labor_cost, 8750.0);
    assert_eq!(estimate.subtotal, 10125.0);
    assert_eq!(estimate.bulk_discount, 506.25);
    assert_eq!(estimate.subtotal_after_discount, 9618.75);
    assert_eq!(estimate.markup, 1923.75);
    assert_eq!(estimate.total_price, 11542.5);
    assert_eq!(estimate.price_per_unit, 461.7);
    assert_eq!(estimate.currency, "INR");
    assert_eq!(estimate.estimated_delivery_days, 5);
}

#[tokio::test]
async fn test_bulk_discount_boundary() {
    let service = setup_service().await;
    service.create_material(steel()).await.expect("Failed to create material");

    // Exactly at the threshold the discount applies.
    let at_threshold = service
        .calculate_estimate(PricingCalculationRequest {
            material: "Steel".to_string(),
            quantity: 25,
            complexity_factor: None,
            delivery_days: None,
        })
        .await
        .expect("Failed to calculate estimate");
    assert!(at_threshold.bulk_discount > 0.0);

    // One unit below it does not.
    let below_threshold = service
        .calculate_estimate(PricingCalculationRequest {
            material: "Steel".to_string(),
            quantity: 24,
            complexity_factor: None,
            delivery_days: None,
        })
        .await
        .expect("Failed to calculate estimate");
    assert_eq!(below_threshold.bulk_discount, 0.0);
    assert_eq!(below_threshold.subtotal, below_threshold.subtotal_after_discount);
}

#[tokio::test]
async fn test_quantity_below_minimum_order_fails() {
    let service = setup_service().await;
    service.create_material(steel()).await.expect("Failed to create material");

    let result = service
        .calculate_estimate(PricingCalculationRequest {
            material: "Steel".to_string(),
            quantity: 9,
            complexity_factor: Some(3.0),
            delivery_days: Some(2),
        })
        .await;
    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
}

#[tokio::test]
async fn test_estimate_for_unknown_material_fails() {
    let service = setup_service().await;

    let result = service
        .calculate_estimate(PricingCalculationRequest {
            material: "Unobtainium".to_string(),
            quantity: 100,
            complexity_factor: None,
            delivery_days: None,
        })
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_complexity_defaults_to_stored_factor() {
    let service = setup_service().await;
    let mut material = steel();
    material.machining_complexity_factor = 2.0;
    service.create_material(material).await.expect("Failed to create material");

    let estimate = service
        .calculate_estimate(PricingCalculationRequest {
            material: "Steel".to_string(),
            quantity: 10,
            complexity_factor: None,
            delivery_days: None,
        })
        .await
        .expect("Failed to calculate estimate");
    // 55 * 10 * 2.0
    assert_eq!(estimate.base_material_cost, 1100.0);
    assert_eq!(estimate.complexity_factor, 2.0);
}

#[tokio::test]
async fn test_duplicate_material_name_conflicts() {
    let service = setup_service().await;
    service.create_material(steel()).await.expect("Failed to create material");

    let result = service.create_material(steel()).await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn test_partial_update_changes_only_named_fields() {
    let service = setup_service().await;
    service.create_material(steel()).await.expect("Failed to create material");

    let updated = service
        .update_material(
            "Steel",
            MaterialPriceUpdate {
                base_price_per_unit: Some(60.0),
                machining_complexity_factor: None,
                minimum_order_quantity: None,
                bulk_discount_threshold: Some(30),
                bulk_discount_percentage: None,
                labor_cost_per_hour: None,
                estimated_hours_per_unit: None,
                markup_percentage: None,
            },
        )
        .await
        .expect("Failed to update material");

    assert_eq!(updated.base_price_per_unit, 60.0);
    assert_eq!(updated.bulk_discount_threshold, 30);
    // Untouched fields keep their values.
    assert_eq!(updated.labor_cost_per_hour, 350.0);
    assert_eq!(updated.minimum_order_quantity, 10);
}

#[tokio::test]
async fn test_update_unknown_material_fails() {
    let service = setup_service().await;
    let result = service
        .update_material(
            "Ghost",
            MaterialPriceUpdate {
                base_price_per_unit: Some(1.0),
                machining_complexity_factor: None,
                minimum_order_quantity: None,
                bulk_discount_threshold: None,
                bulk_discount_percentage: None,
                labor_cost_per_hour: None,
                estimated_hours_per_unit: None,
                markup_percentage: None,
            },
        )
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_update_rejects_unknown_fields_at_the_boundary() {
    let raw = serde_json::json!({ "base_price_per_unit": 42.0, "colour": "red" });
    let parsed: Result<MaterialPriceUpdate, _> = serde_json::from_value(raw);
    assert!(parsed.is_err());
}

#[tokio::test]
async fn test_delete_material() {
    let service = setup_service().await;
    service.create_material(steel()).await.expect("Failed to create material");

    assert!(service.delete_material("Steel").await.expect("Failed to delete"));
    assert!(!service.delete_material("Steel").await.expect("Failed to delete"));
    assert!(matches!(
        service.get_material("Steel").await,
        Err(ServiceError::NotFound(_))
    ));
}
