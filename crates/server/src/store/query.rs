use smsgate_common::{Contact, Message, MessageDirection};

/// Address book search: case-insensitive on the name, plain substring on the phone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFilter {
    pub search: Option<String>,
}

impl ContactFilter {
    pub fn matches(&self, contact: &Contact) -> bool {
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                contact.name.to_lowercase().contains(&term.to_lowercase())
                    || contact.phone.contains(term)
            }
        }
    }
}

/// History search: case-insensitive on the content, plain substring on the
/// recipient, optionally narrowed to one direction and truncated to `limit`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    pub search: Option<String>,
    pub direction: Option<MessageDirection>,
    pub limit: Option<usize>,
}

impl MessageFilter {
    pub fn matches(&self, message: &Message) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                message.content.to_lowercase().contains(&term.to_lowercase())
                    || message.recipient.contains(term)
            }
        };
        let matches_direction = self.direction.map_or(true, |d| d == message.direction);
        matches_search && matches_direction
    }

    pub fn apply<'a>(&self, messages: impl Iterator<Item = &'a Message>) -> Vec<Message> {
        messages
            .filter(|m| self.matches(m))
            .take(self.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}
