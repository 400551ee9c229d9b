pub mod library;
pub mod plan;
