pub mod contact_routes;
pub mod message_routes;
pub mod settings_routes;
pub mod stats_routes;
