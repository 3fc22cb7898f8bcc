pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod routes;
pub mod schedule_api;
pub mod session;
pub mod state;
pub mod views;
