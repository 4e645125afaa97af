pub mod api_connection;
pub mod cli;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod logging;
pub mod meal_analyzer;
pub mod nutrition_summary;
pub mod retry;
pub mod server;
