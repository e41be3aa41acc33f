pub mod postgres_repository;
pub mod product;
pub mod rental;
pub mod user;
