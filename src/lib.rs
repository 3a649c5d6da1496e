pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod inventory;
pub mod models;
pub mod services;
pub mod state;
