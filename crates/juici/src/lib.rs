pub mod catalog;
pub mod config;
pub mod errors;
pub mod models;
pub mod service;
pub mod store;
pub mod transport;
