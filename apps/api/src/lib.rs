pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod tracker;
pub mod transfer;
