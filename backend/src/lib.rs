pub mod config;
pub mod docs;
pub mod error;
pub mod response;

pub mod file_processing;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
