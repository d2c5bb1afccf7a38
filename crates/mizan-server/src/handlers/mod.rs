pub mod context;
pub mod harvest;
pub mod health;
