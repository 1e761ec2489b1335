pub mod health;
pub mod receipt;
