//! Data contract shared between the SMS gateway server and its clients.

pub mod api;
pub mod encoding;
pub mod events;
pub mod models;

pub use events::{GatewayEvent, StoreSnapshot};
pub use models::{
    Contact, ContactPatch, DashboardStats, FieldError, Message, MessageDirection, MessageStatus,
    NewContact, NewMessage, Setting, SettingUpdate,
};
