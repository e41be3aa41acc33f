pub mod payment;
pub mod product;
pub mod rental;
pub mod upload;
pub mod user;
