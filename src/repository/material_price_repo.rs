use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use sqlx::{QueryBuilder, Sqlite};
use tracing::{error, info};

use crate::dto::pricing_dto::MaterialPriceUpdate;
use crate::model::material_price::MaterialPrice;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait MaterialPriceRepository: Send + Sync {
    async fn create(&self, price: NewMaterialPrice) -> RepositoryResult<MaterialPrice>;
    async fn get_by_name(&self, material_name: &str) -> RepositoryResult<MaterialPrice>;
    async fn list(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<MaterialPrice>>;
    /// Partial update of the mutable pricing fields; the update struct
    /// enumerates them explicitly, there is no patch-by-field-name.
    async fn update(
        &self,
        material_name: &str,
        update: &MaterialPriceUpdate,
    ) -> RepositoryResult<MaterialPrice>;
    async fn delete(&self, material_name: &str) -> RepositoryResult<bool>;
}

/// Fields supplied when registering a material.
#[derive(Debug, Clone)]
pub struct NewMaterialPrice {
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
}

pub struct SqliteMaterialPriceRepository {
    pool: SqlitePool,
}

impl SqliteMaterialPriceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteMaterialPriceRepository { pool }
    }
}

#[async_trait]
impl MaterialPriceRepository for SqliteMaterialPriceRepository {
    #[tracing::instrument(skip(self, price), fields(material_name = %price.material_name))]
    async fn create(&self, price: NewMaterialPrice) -> RepositoryResult<MaterialPrice> {
        info!("Creating material price for '{}'", price.material_name);

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO material_prices (material_name, base_price_per_unit, currency, unit, \
             machining_complexity_factor, minimum_order_quantity, bulk_discount_threshold, \
             bulk_discount_percentage, labor_cost_per_hour, estimated_hours_per_unit, \
             markup_percentage, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&price.material_name)
        .bind(price.base_price_per_unit)
        .bind(&price.currency)
        .bind(&price.unit)
        .bind(price.machining_complexity_factor)
        .bind(price.minimum_order_quantity)
        .bind(price.bulk_discount_threshold)
        .bind(price.bulk_discount_percentage)
        .bind(price.labor_cost_per_hour)
        .bind(price.estimated_hours_per_unit)
        .bind(price.markup_percentage)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match RepositoryError::from(e) {
            RepositoryError::AlreadyExists(_) => {
                error!("Material '{}' already exists", price.material_name);
                RepositoryError::already_exists(format!(
                    "Material '{}' already exists",
                    price.material_name
                ))
            }
            other => other,
        })?;

        info!("Material price created successfully");
        Ok(MaterialPrice {
            id: result.last_insert_rowid(),
            material_name: price.material_name,
            base_price_per_unit: price.base_price_per_unit,
            currency: price.currency,
            unit: price.unit,
            machining_complexity_factor: price.machining_complexity_factor,
            minimum_order_quantity: price.minimum_order_quantity,
            bulk_discount_threshold: price.bulk_discount_threshold,
            bulk_discount_percentage: price.bulk_discount_percentage,
            labor_cost_per_hour: price.labor_cost_per_hour,
            estimated_hours_per_unit: price.estimated_hours_per_unit,
            markup_percentage: price.markup_percentage,
            created_at: now,
            updated_at: now,
        })
    }

    #[tracing::instrument(skip(self), fields(material_name = %material_name))]
    async fn get_by_name(&self, material_name: &str) -> RepositoryResult<MaterialPrice> {
        let price = sqlx::query_as::<_, MaterialPrice>(
            "SELECT * FROM material_prices WHERE material_name = ?",
        )
        .bind(material_name)
        .fetch_optional(&self.pool)
        .await?;
        match price {
            Some(price) => Ok(price),
            None => {
                error!("Material '{}' not found", material_name);
                Err(RepositoryError::not_found(format!(
                    "Material '{}' not found in pricing database",
                    material_name
                )))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(limit = limit, offset = offset))]
    async fn list(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<MaterialPrice>> {
        let prices = sqlx::query_as::<_, MaterialPrice>(
            "SELECT * FROM material_prices ORDER BY material_name LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        info!("Fetched {} material prices", prices.len());
        Ok(prices)
    }

    #[tracing::instrument(skip(self, update), fields(material_name = %material_name))]
    async fn update(
        &self,
        material_name: &str,
        update: &MaterialPriceUpdate,
    ) -> RepositoryResult<MaterialPrice> {
        info!("Updating material price for '{}'", material_name);

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("UPDATE material_prices SET updated_at = ");
        builder.push_bind(Utc::now());
        if let Some(v) = update.base_price_per_unit {
            builder.push(", base_price_per_unit = ");
            builder.push_bind(v);
        }
        if let Some(v) = update.machining_complexity_factor {
            builder.push(", machining_complexity_factor = ");
            builder.push_bind(v);
        }
        if let Some(v) = update.minimum_order_quantity {
            builder.push(", minimum_order_quantity = ");
            builder.push_bind(v);
        }
        if let Some(v) = update.bulk_discount_threshold {
            builder.push(", bulk_discount_threshold = ");
            builder.push_bind(v);
        }
        if let Some(v) = update.bulk_discount_percentage {
            builder.push(", bulk_discount_percentage = ");
            builder.push_bind(v);
        }
        if let Some(v) = update.labor_cost_per_hour {
            builder.push(", labor_cost_per_hour = ");
            builder.push_bind(v);
        }
        if let Some(v) = update.estimated_hours_per_unit {
            builder.push(", estimated_hours_per_unit = ");
            builder.push_bind(v);
        }
        if let Some(v) = update.markup_percentage {
            builder.push(", markup_percentage = ");
            builder.push_bind(v);
        }
        builder.push(" WHERE material_name = ");
        builder.push_bind(material_name);

        let result = builder.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            error!("Material '{}' not found for update", material_name);
            return Err(RepositoryError::not_found(format!(
                "Material '{}' not found in pricing database",
                material_name
            )));
        }

        info!("Material price updated successfully");
        self.get_by_name(material_name).await
    }

    #[tracing::instrument(skip(self), fields(material_name = %material_name))]
    async fn delete(&self, material_name: &str) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM material_prices WHERE material_name = ?")
            .bind(material_name)
            .execute(&self.pool)
            .await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Deleted material price for '{}'", material_name);
        }
        Ok(deleted)
    }
}
