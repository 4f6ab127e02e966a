use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

pub const DEFAULT_CONTACT_GROUP: &str = "General";
pub const DEFAULT_SETTING_CATEGORY: &str = "general";
pub const DEFAULT_SIM_SLOT: i32 = 1;

fn default_group() -> String {
    DEFAULT_CONTACT_GROUP.to_string()
}

fn default_sim_slot() -> i32 {
    DEFAULT_SIM_SLOT
}

fn default_category() -> String {
    DEFAULT_SETTING_CATEGORY.to_string()
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// A required field failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(field, format!("{field} is required")));
    }
    Ok(())
}

// --- Contacts ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub group: String,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a contact. `id` and `createdAt` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub name: String,
    pub phone: String,
    #[serde(default = "default_group")]
    pub group: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl NewContact {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            group: default_group(),
            email: None,
            avatar: None,
            is_favorite: false,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        require_text("name", &self.name)?;
        require_text("phone", &self.phone)?;
        Ok(())
    }

    pub fn into_contact(self, id: i32, created_at: DateTime<Utc>) -> Contact {
        Contact {
            id,
            name: self.name,
            phone: self.phone,
            group: self.group,
            email: self.email,
            avatar: self.avatar,
            is_favorite: self.is_favorite,
            created_at,
        }
    }
}

/// Partial contact update. Absent fields are left untouched; for the nullable
/// fields an explicit `null` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub avatar: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl ContactPatch {
    pub fn validate(&self) -> Result<(), FieldError> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(phone) = &self.phone {
            require_text("phone", phone)?;
        }
        Ok(())
    }

    pub fn apply_to(self, contact: &mut Contact) {
        if let Some(name) = self.name {
            contact.name = name;
        }
        if let Some(phone) = self.phone {
            contact.phone = phone;
        }
        if let Some(group) = self.group {
            contact.group = group;
        }
        if let Some(email) = self.email {
            contact.email = email;
        }
        if let Some(avatar) = self.avatar {
            contact.avatar = avatar;
        }
        if let Some(is_favorite) = self.is_favorite {
            contact.is_favorite = is_favorite;
        }
    }
}

// --- Messages ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageDirection {
    Inbound,
    Outbound,
}

impl MessageDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageDirection::Inbound => "inbound",
            MessageDirection::Outbound => "outbound",
        }
    }
}

impl FromStr for MessageDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbound" => Ok(MessageDirection::Inbound),
            "outbound" => Ok(MessageDirection::Outbound),
            _ => Err(()),
        }
    }
}

impl fmt::Display for MessageDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a message. Only `Queued -> Sent` is ever driven by the gateway;
/// the remaining states come from seeded history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Queued,
    Sent,
    Delivered,
    Failed,
    Received,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Queued => "queued",
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Failed => "failed",
            MessageStatus::Received => "received",
        }
    }
}

impl FromStr for MessageStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(MessageStatus::Queued),
            "sent" => Ok(MessageStatus::Sent),
            "delivered" => Ok(MessageStatus::Delivered),
            "failed" => Ok(MessageStatus::Failed),
            "received" => Ok(MessageStatus::Received),
            _ => Err(()),
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i32,
    pub direction: MessageDirection,
    pub status: MessageStatus,
    pub recipient: String,
    pub content: String,
    pub sim_slot: i32,
    pub timestamp: DateTime<Utc>,
}

/// Payload for sending a message. `id`, `timestamp` and `status` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub direction: MessageDirection,
    pub recipient: String,
    pub content: String,
    #[serde(default = "default_sim_slot")]
    pub sim_slot: i32,
}

impl NewMessage {
    pub fn outbound(recipient: impl Into<String>, content: impl Into<String>, sim_slot: i32) -> Self {
        Self {
            direction: MessageDirection::Outbound,
            recipient: recipient.into(),
            content: content.into(),
            sim_slot,
        }
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        require_text("recipient", &self.recipient)?;
        require_text("content", &self.content)?;
        if self.sim_slot < 1 {
            return Err(FieldError::new("simSlot", "simSlot must be 1 or greater"));
        }
        Ok(())
    }

    pub fn into_message(self, id: i32, timestamp: DateTime<Utc>) -> Message {
        Message {
            id,
            direction: self.direction,
            status: MessageStatus::Queued,
            recipient: self.recipient,
            content: self.content,
            sim_slot: self.sim_slot,
            timestamp,
        }
    }
}

// --- Settings ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: i32,
    pub key: String,
    pub value: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingUpdate {
    pub value: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl SettingUpdate {
    pub fn validate(&self) -> Result<(), FieldError> {
        require_text("value", &self.value)
    }

    pub fn category_or_default(&self) -> String {
        self.category.clone().unwrap_or_else(default_category)
    }
}

// --- Dashboard ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_sent: u64,
    pub total_received: u64,
    pub failed: u64,
    pub credits: f64,
    pub active_sims: u32,
    pub signal_strength: u8,
}
