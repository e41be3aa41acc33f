pub mod auth;
pub mod error;
pub mod health;
pub mod payment;
pub mod product;
pub mod rental;
pub mod upload;
