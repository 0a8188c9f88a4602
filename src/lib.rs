pub mod admin;
pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod plans;
pub mod state;
pub mod subscriptions;
