pub mod effects;
pub mod store;
