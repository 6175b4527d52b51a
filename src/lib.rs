pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod output;
pub mod youtube;
