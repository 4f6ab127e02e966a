use chrono::{DateTime, Duration, Utc};
use smsgate_common::{
    Contact, DashboardStats, Message, MessageDirection, MessageStatus, Setting,
};

use crate::config::ModemSettings;

const SEED_MESSAGE_COUNT: i32 = 15;

/// Initial contents of a [`GatewayStore`](super::GatewayStore).
#[derive(Debug, Clone)]
pub struct SeedData {
    pub contacts: Vec<Contact>,
    pub messages: Vec<Message>,
    pub stats: DashboardStats,
    pub settings: Vec<Setting>,
}

impl SeedData {
    /// The sample address book, history and dashboard figures the gateway starts with.
    pub fn demo(now: DateTime<Utc>, modem: &ModemSettings) -> Self {
        Self {
            contacts: demo_contacts(now),
            messages: demo_messages(now),
            stats: demo_stats(),
            settings: modem_settings(modem),
        }
    }

    pub fn empty() -> Self {
        Self {
            contacts: Vec::new(),
            messages: Vec::new(),
            stats: DashboardStats {
                total_sent: 0,
                total_received: 0,
                failed: 0,
                credits: 0.0,
                active_sims: 0,
                signal_strength: 0,
            },
            settings: Vec::new(),
        }
    }
}

fn contact(id: i32, name: &str, phone: &str, group: &str, email: &str, favorite: bool, now: DateTime<Utc>) -> Contact {
    Contact {
        id,
        name: name.to_string(),
        phone: phone.to_string(),
        group: group.to_string(),
        email: Some(email.to_string()),
        avatar: None,
        is_favorite: favorite,
        created_at: now,
    }
}

fn demo_contacts(now: DateTime<Utc>) -> Vec<Contact> {
    vec![
        contact(1, "Alice Johnson", "+15550101", "Family", "alice@example.com", true, now),
        contact(2, "Bob Smith", "+15550102", "Work", "bob@corp.com", false, now),
        contact(3, "Carol White", "+15550103", "Friends", "carol@live.com", true, now),
    ]
}

/// Every third message is an outbound reminder to Bob; the rest are inbound
/// verification codes. Every fifth message failed. One message per day back.
fn demo_messages(now: DateTime<Utc>) -> Vec<Message> {
    (0..SEED_MESSAGE_COUNT)
        .map(|i| {
            let outbound = i % 3 == 0;
            let status = if i % 5 == 0 {
                MessageStatus::Failed
            } else if outbound {
                MessageStatus::Sent
            } else {
                MessageStatus::Received
            };
            Message {
                id: i + 1,
                direction: if outbound { MessageDirection::Outbound } else { MessageDirection::Inbound },
                status,
                recipient: if outbound { "+15550102" } else { "+15550101" }.to_string(),
                content: if outbound {
                    "Hey, are we still on for the meeting?"
                } else {
                    "Your verification code is 123456"
                }
                .to_string(),
                sim_slot: 1,
                timestamp: now - Duration::days(i64::from(i)),
            }
        })
        .collect()
}

fn demo_stats() -> DashboardStats {
    DashboardStats {
        total_sent: 1245,
        total_received: 850,
        failed: 23,
        credits: 45.50,
        active_sims: 2,
        signal_strength: 85,
    }
}

fn modem_settings(modem: &ModemSettings) -> Vec<Setting> {
    [
        ("com_port", modem.com_port.clone()),
        ("baud_rate", modem.baud_rate.to_string()),
        ("smsc_number", modem.smsc_number.clone()),
        ("delivery_reports", modem.delivery_reports.to_string()),
        ("multipart_sms", modem.multipart_sms.to_string()),
    ]
    .into_iter()
    .zip(1..)
    .map(|((key, value), id)| Setting {
        id,
        key: key.to_string(),
        value,
        category: "modem".to_string(),
    })
    .collect()
}
