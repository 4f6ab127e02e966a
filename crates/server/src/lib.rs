pub mod config;
pub mod store;
pub mod version;
pub mod web;
