pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
pub mod services;
pub mod types;
pub mod validation;

#[cfg(test)]
pub mod testing;
