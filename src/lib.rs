pub mod assistant;
pub mod audit;
pub mod channel;
pub mod config;
pub mod db;
pub mod dto;
pub mod engine;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
