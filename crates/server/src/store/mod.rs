//! In-memory SMS gateway state.
//!
//! [`GatewayStore`] holds contacts, message history, dashboard figures and
//! modem settings. Every operation first sleeps for a configured latency to
//! stand in for a real modem or backend, then applies its change atomically
//! under a single lock and publishes a [`GatewayEvent`] to subscribers.
//!
//! Outbound messages are stored as `queued` and flipped to `sent` by a
//! deferred task after [`StoreTimings::delivery_delay`]. Those tasks are owned
//! by the store and are aborted by [`GatewayStore::shutdown`] or on drop.

pub mod broadcaster;
pub mod delivery;
pub mod query;
pub mod seed;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use smsgate_common::encoding::estimate_segments;
use smsgate_common::{
    Contact, ContactPatch, DashboardStats, FieldError, GatewayEvent, Message, NewContact,
    NewMessage, Setting, SettingUpdate, StoreSnapshot,
};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use self::broadcaster::EventBroadcaster;
use self::delivery::DeliveryScheduler;
pub use self::query::{ContactFilter, MessageFilter};
pub use self::seed::SeedData;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i32 },
}

impl From<FieldError> for StoreError {
    fn from(err: FieldError) -> Self {
        StoreError::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

/// Simulated latencies of the mock gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreTimings {
    pub startup_delay: Duration,
    pub contact_latency: Duration,
    pub send_latency: Duration,
    pub delivery_delay: Duration,
    pub settings_latency: Duration,
}

impl Default for StoreTimings {
    fn default() -> Self {
        Self {
            startup_delay: Duration::from_millis(1000),
            contact_latency: Duration::from_millis(500),
            send_latency: Duration::from_millis(800),
            delivery_delay: Duration::from_millis(2000),
            settings_latency: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug)]
pub(crate) struct StoreState {
    contacts: Vec<Contact>,
    /// Newest first.
    messages: Vec<Message>,
    stats: DashboardStats,
    settings: Vec<Setting>,
    loading: bool,
}

fn next_id(ids: impl Iterator<Item = i32>) -> i32 {
    ids.max().map_or(1, |max| max + 1)
}

#[derive(Debug)]
pub struct GatewayStore {
    state: Arc<Mutex<StoreState>>,
    broadcaster: EventBroadcaster,
    deliveries: DeliveryScheduler,
    startup_task: AbortHandle,
    timings: StoreTimings,
}

impl GatewayStore {
    /// Builds the store and starts its startup timer. Must be called from
    /// within a tokio runtime.
    pub fn new(seed: SeedData, timings: StoreTimings) -> Self {
        let state = Arc::new(Mutex::new(StoreState {
            contacts: seed.contacts,
            messages: seed.messages,
            stats: seed.stats,
            settings: seed.settings,
            loading: true,
        }));
        let broadcaster = EventBroadcaster::default();

        let startup_task = {
            let state = Arc::downgrade(&state);
            let broadcaster = broadcaster.clone();
            let delay = timings.startup_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let Some(state) = state.upgrade() else {
                    return;
                };
                let mut guard = state.lock().await;
                guard.loading = false;
                info!(
                    contacts = guard.contacts.len(),
                    messages = guard.messages.len(),
                    "Gateway store ready."
                );
                broadcaster.publish(GatewayEvent::Ready);
            })
            .abort_handle()
        };

        Self {
            state,
            broadcaster,
            deliveries: DeliveryScheduler::new(),
            startup_task,
            timings,
        }
    }

    pub fn timings(&self) -> StoreTimings {
        self.timings
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.broadcaster.subscribe()
    }

    // --- Read model ---

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.loading
    }

    pub async fn contacts(&self, filter: &ContactFilter) -> Vec<Contact> {
        let state = self.state.lock().await;
        state
            .contacts
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect()
    }

    pub async fn contact(&self, id: i32) -> Option<Contact> {
        let state = self.state.lock().await;
        state.contacts.iter().find(|c| c.id == id).cloned()
    }

    pub async fn messages(&self, filter: &MessageFilter) -> Vec<Message> {
        let state = self.state.lock().await;
        filter.apply(state.messages.iter())
    }

    pub async fn message(&self, id: i32) -> Option<Message> {
        let state = self.state.lock().await;
        state.messages.iter().find(|m| m.id == id).cloned()
    }

    pub async fn stats(&self) -> DashboardStats {
        self.state.lock().await.stats.clone()
    }

    pub async fn settings(&self) -> Vec<Setting> {
        self.state.lock().await.settings.clone()
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.lock().await;
        StoreSnapshot {
            contacts: state.contacts.clone(),
            messages: state.messages.clone(),
            stats: state.stats.clone(),
            settings: state.settings.clone(),
            loading: state.loading,
        }
    }

    pub fn pending_deliveries(&self) -> usize {
        self.deliveries.pending_count()
    }

    // --- Mutations ---

    pub async fn add_contact(&self, new_contact: NewContact) -> Result<Contact, StoreError> {
        new_contact.validate()?;
        tokio::time::sleep(self.timings.contact_latency).await;

        let mut state = self.state.lock().await;
        let id = next_id(state.contacts.iter().map(|c| c.id));
        let contact = new_contact.into_contact(id, Utc::now());
        state.contacts.push(contact.clone());
        self.broadcaster.publish(GatewayEvent::ContactAdded(contact.clone()));

        info!(contact_id = id, name = %contact.name, "Contact added.");
        Ok(contact)
    }

    pub async fn update_contact(&self, id: i32, patch: ContactPatch) -> Result<Contact, StoreError> {
        patch.validate()?;
        tokio::time::sleep(self.timings.contact_latency).await;

        let mut state = self.state.lock().await;
        let contact = state
            .contacts
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound { entity: "Contact", id })?;
        patch.apply_to(contact);
        let updated = contact.clone();
        self.broadcaster.publish(GatewayEvent::ContactUpdated(updated.clone()));

        info!(contact_id = id, "Contact updated.");
        Ok(updated)
    }

    pub async fn delete_contact(&self, id: i32) -> Result<(), StoreError> {
        tokio::time::sleep(self.timings.contact_latency).await;

        let mut state = self.state.lock().await;
        let position = state
            .contacts
            .iter()
            .position(|c| c.id == id)
            .ok_or(StoreError::NotFound { entity: "Contact", id })?;
        state.contacts.remove(position);
        self.broadcaster.publish(GatewayEvent::ContactDeleted { id });

        info!(contact_id = id, "Contact deleted.");
        Ok(())
    }

    /// Queues an outbound message and schedules its transition to `sent`.
    ///
    /// `totalSent` is bumped here rather than derived from the history, so the
    /// dashboard figure and the message list are allowed to disagree.
    pub async fn send_message(&self, new_message: NewMessage) -> Result<Message, StoreError> {
        new_message.validate()?;
        let estimate = estimate_segments(&new_message.content);
        tokio::time::sleep(self.timings.send_latency).await;

        let mut state = self.state.lock().await;
        let id = next_id(state.messages.iter().map(|m| m.id));
        let message = new_message.into_message(id, Utc::now());
        state.messages.insert(0, message.clone());
        state.stats.total_sent += 1;
        self.broadcaster.publish(GatewayEvent::MessageQueued(message.clone()));
        self.broadcaster.publish(GatewayEvent::StatsUpdated(state.stats.clone()));

        self.deliveries.schedule(
            id,
            Arc::downgrade(&self.state),
            self.broadcaster.clone(),
            self.timings.delivery_delay,
        );
        drop(state);

        info!(
            message_id = id,
            recipient = %message.recipient,
            sim_slot = message.sim_slot,
            encoding = ?estimate.encoding,
            segments = estimate.segments,
            "Message queued."
        );
        Ok(message)
    }

    /// Updates the value of `key`, or creates the setting if it does not exist yet.
    pub async fn update_setting(&self, key: &str, update: SettingUpdate) -> Result<Setting, StoreError> {
        if key.trim().is_empty() {
            return Err(StoreError::Validation {
                field: "key",
                message: "key is required".to_string(),
            });
        }
        update.validate()?;
        tokio::time::sleep(self.timings.settings_latency).await;

        let mut state = self.state.lock().await;
        let setting = match state.settings.iter_mut().find(|s| s.key == key) {
            Some(existing) => {
                existing.value = update.value;
                if let Some(category) = update.category {
                    existing.category = category;
                }
                existing.clone()
            }
            None => {
                let setting = Setting {
                    id: next_id(state.settings.iter().map(|s| s.id)),
                    key: key.to_string(),
                    category: update.category_or_default(),
                    value: update.value,
                };
                state.settings.push(setting.clone());
                setting
            }
        };
        self.broadcaster.publish(GatewayEvent::SettingUpdated(setting.clone()));

        info!(key = %setting.key, category = %setting.category, "Setting saved.");
        Ok(setting)
    }

    /// Stops the startup timer and cancels every pending delivery transition.
    /// Messages that were still queued stay queued.
    pub fn shutdown(&self) {
        self.startup_task.abort();
        let pending = self.deliveries.pending_count();
        if pending > 0 {
            warn!(pending, "Shutting down with deliveries still pending.");
        } else {
            debug!("Gateway store shut down.");
        }
        self.deliveries.close();
    }
}

impl Drop for GatewayStore {
    fn drop(&mut self) {
        self.startup_task.abort();
        self.deliveries.close();
    }
}
