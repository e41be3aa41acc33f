use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema)]
pub enum Category {
    Electronics,
    Books,
    Cycles,
    Gadgets,
    Furniture,
    Clothing,
    Sports,
    Tools,
    Other,
}

impl Category {
    pub fn as_db(self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Books => "Books",
            Category::Cycles => "Cycles",
            Category::Gadgets => "Gadgets",
            Category::Furniture => "Furniture",
            Category::Clothing => "Clothing",
            Category::Sports => "Sports",
            Category::Tools => "Tools",
            Category::Other => "Other",
        }
    }
}

pub fn category_from_db<T: AsRef<str>>(value: T) -> Category {
    match value.as_ref() {
        "Electronics" => Category::Electronics,
        "Books" => Category::Books,
        "Cycles" => Category::Cycles,
        "Gadgets" => Category::Gadgets,
        "Furniture" => Category::Furniture,
        "Clothing" => Category::Clothing,
        "Sports" => Category::Sports,
        "Tools" => Category::Tools,
        "Other" => Category::Other,
        other => panic!("Unknown product category: {}", other),
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema)]
pub enum Condition {
    New,
    #[serde(rename = "Like New")]
    LikeNew,
    Good,
    Fair,
    Poor,
}

impl Condition {
    pub fn as_db(self) -> &'static str {
        match self {
            Condition::New => "New",
            Condition::LikeNew => "Like New",
            Condition::Good => "Good",
            Condition::Fair => "Fair",
            Condition::Poor => "Poor",
        }
    }
}

pub fn condition_from_db<T: AsRef<str>>(value: T) -> Condition {
    match value.as_ref() {
        "New" => Condition::New,
        "Like New" => Condition::LikeNew,
        "Good" => Condition::Good,
        "Fair" => Condition::Fair,
        "Poor" => Condition::Poor,
        other => panic!("Unknown product condition: {}", other),
    }
}

/// An image hosted on the external asset host. `public_id` is the host-side
/// handle needed to delete the asset later.
#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema)]
pub struct ProductImage {
    pub url: String,
    pub public_id: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub condition: Condition,
    /// Daily rate in whole currency units.
    pub price_per_day: i64,
    pub images: Vec<ProductImage>,
    pub owner_id: Uuid,
    pub location: String,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
    pub category: Category,
    pub condition: Condition,
    #[validate(range(min = 1))]
    pub price_per_day: i64,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[validate(length(min = 1))]
    pub location: String,
}

/// Partial update; absent fields keep their current values.
#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct ProductUpdateRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 1000))]
    pub description: Option<String>,
    pub category: Option<Category>,
    pub condition: Option<Condition>,
    #[validate(range(min = 1))]
    pub price_per_day: Option<i64>,
    pub images: Option<Vec<ProductImage>>,
    #[validate(length(min = 1))]
    pub location: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub condition: Condition,
    pub price_per_day: i64,
    pub images: Vec<ProductImage>,
    pub owner_id: Uuid,
    pub location: String,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            description: product.description.clone(),
            category: product.category,
            condition: product.condition,
            price_per_day: product.price_per_day,
            images: product.images.clone(),
            owner_id: product.owner_id,
            location: product.location.clone(),
            is_available: product.is_available,
            created_at: product.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_db_text() {
        for category in [
            Category::Electronics,
            Category::Books,
            Category::Cycles,
            Category::Gadgets,
            Category::Furniture,
            Category::Clothing,
            Category::Sports,
            Category::Tools,
            Category::Other,
        ] {
            assert_eq!(category_from_db(category.as_db()), category);
        }
    }

    #[test]
    fn condition_db_text_matches_display_labels() {
        assert_eq!(Condition::LikeNew.as_db(), "Like New");
        assert_eq!(condition_from_db("Like New"), Condition::LikeNew);
    }

    #[test]
    #[should_panic(expected = "Unknown product category")]
    fn unknown_category_panics() {
        category_from_db("Vehicles");
    }

    #[test]
    fn product_request_rejects_zero_price() {
        let request = ProductRequest {
            title: "Mountain bike".to_string(),
            description: "A bike".to_string(),
            category: Category::Cycles,
            condition: Condition::Good,
            price_per_day: 0,
            images: vec![],
            location: "Pune".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
