use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::product::{Product, ProductImage, ProductRequest, ProductUpdateRequest, category_from_db, condition_from_db};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

const PRODUCT_COLUMNS: &str = r#"
    id, title, description, category::text as category, condition::text as condition,
    price_per_day, images, owner_id, location, is_available, created_at
"#;

pub(crate) fn map_row_to_product(row: &PgRow) -> Product {
    let images: Vec<ProductImage> = serde_json::from_value(row.get::<serde_json::Value, _>("images")).unwrap_or_default();

    Product {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        category: category_from_db(row.get::<String, _>("category")),
        condition: condition_from_db(row.get::<String, _>("condition")),
        price_per_day: row.get("price_per_day"),
        images,
        owner_id: row.get("owner_id"),
        location: row.get("location"),
        is_available: row.get("is_available"),
        created_at: row.get("created_at"),
    }
}

impl PostgresRepository {
    pub async fn create_product(&self, owner_id: &Uuid, request: &ProductRequest) -> Result<Product, AppError> {
        let images = serde_json::to_value(&request.images).unwrap_or_else(|_| serde_json::Value::Array(vec![]));

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO products (title, description, category, condition, price_per_day, images, owner_id, location)
            VALUES ($1, $2, $3::product_category, $4::product_condition, $5, $6, $7, $8)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.category.as_db())
        .bind(request.condition.as_db())
        .bind(request.price_per_day)
        .bind(&images)
        .bind(owner_id)
        .bind(&request.location)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::db("Failed to create product", e))?;

        Ok(map_row_to_product(&row))
    }

    pub async fn get_product_by_id(&self, id: &Uuid) -> Result<Option<Product>, AppError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_product))
    }

    /// Public listing: available products, newest first, with optional
    /// category / free-text / location filters.
    pub async fn list_products(
        &self,
        category: Option<&str>,
        search: Option<&str>,
        location: Option<&str>,
    ) -> Result<Vec<Product>, AppError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE is_available = TRUE
              AND ($1::text IS NULL OR category::text = $1)
              AND ($2::text IS NULL OR title ILIKE '%' || $2 || '%' OR description ILIKE '%' || $2 || '%')
              AND ($3::text IS NULL OR location ILIKE '%' || $3 || '%')
            ORDER BY created_at DESC
            "#
        ))
        .bind(category)
        .bind(search)
        .bind(location)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::db("Failed to list products", e))?;

        Ok(rows.iter().map(map_row_to_product).collect())
    }

    pub async fn list_products_by_owner(&self, owner_id: &Uuid) -> Result<Vec<Product>, AppError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::db("Failed to list products", e))?;

        Ok(rows.iter().map(map_row_to_product).collect())
    }

    pub async fn update_product(&self, id: &Uuid, request: &ProductUpdateRequest) -> Result<Product, AppError> {
        let images = match &request.images {
            Some(images) => Some(serde_json::to_value(images).unwrap_or_else(|_| serde_json::Value::Array(vec![]))),
            None => None,
        };

        let row = sqlx::query(&format!(
            r#"
            UPDATE products
            SET title = COALESCE($1, title),
                description = COALESCE($2, description),
                category = COALESCE($3::product_category, category),
                condition = COALESCE($4::product_condition, condition),
                price_per_day = COALESCE($5, price_per_day),
                images = COALESCE($6, images),
                location = COALESCE($7, location),
                is_available = COALESCE($8, is_available)
            WHERE id = $9
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(request.title.as_deref())
        .bind(request.description.as_deref())
        .bind(request.category.map(|c| c.as_db()))
        .bind(request.condition.map(|c| c.as_db()))
        .bind(request.price_per_day)
        .bind(images)
        .bind(request.location.as_deref())
        .bind(request.is_available)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::db("Failed to update product", e))?;

        row.as_ref().map(map_row_to_product).ok_or(AppError::NotFound("Product not found".to_string()))
    }

    pub async fn delete_product(&self, id: &Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::db("Failed to delete product", e))?;

        Ok(())
    }

    /// Whether a paid, non-terminal rental currently blocks this product.
    /// Consulted at rental creation in addition to the stored availability
    /// flag, so a stale flag cannot admit a double booking.
    pub async fn has_blocking_rental(&self, product_id: &Uuid) -> Result<bool, AppError> {
        let row: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM rentals
                WHERE product_id = $1
                  AND payment_status = 'paid'
                  AND status NOT IN ('completed', 'cancelled')
            )
            "#,
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }
}
