pub mod assets;
pub mod email;
pub mod payment;
