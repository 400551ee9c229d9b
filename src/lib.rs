pub mod cli;
pub mod collab;
pub mod config;
pub mod observability;
