pub mod app;
pub mod components;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod markdown;
pub mod theme;
