pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod render;
pub mod server;
