//! WhatsApp Cloud API notification envelope.

use crate::models::ContentType;
use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

pub const BUSINESS_ACCOUNT_OBJECT: &str = "whatsapp_business_account";
pub const MESSAGES_FIELD: &str = "messages";

/// Entries and changes stay raw so one malformed change cannot reject its siblings.
#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: ChangeValue,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub contacts: Vec<Value>,
    #[serde(default)]
    pub messages: Vec<Value>,
    #[serde(default)]
    pub statuses: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub phone_number_id: Option<String>,
    #[serde(default)]
    pub display_phone_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub wa_id: Option<String>,
    #[serde(default)]
    pub profile: Option<Profile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    from: String,
    id: String,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<RawText>,
    #[serde(default)]
    image: Option<RawMedia>,
    #[serde(default)]
    document: Option<RawMedia>,
    #[serde(default)]
    location: Option<RawLocation>,
}

#[derive(Debug, Deserialize)]
struct RawText {
    #[serde(default)]
    body: String,
}

#[derive(Debug, Deserialize)]
struct RawMedia {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    caption: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    latitude: f64,
    longitude: f64,
}

/// One customer message, normalized for the pipeline.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub phone_number_id: String,
    pub from: String,
    pub contact_name: Option<String>,
    pub wa_message_id: String,
    pub timestamp: DateTime<Utc>,
    pub message_type: ContentType,
    pub content: String,
    pub media_id: Option<String>,
    pub raw: Value,
}

impl InboundMessage {
    /// Only non-empty text goes to the assistant.
    pub fn wants_reply(&self) -> bool {
        self.message_type == ContentType::Text && !self.content.trim().is_empty()
    }

    pub fn metadata(&self) -> Value {
        json!({
            "from": self.from,
            "phone_number_id": self.phone_number_id,
            "provider_timestamp": self.timestamp,
            "message": self.raw,
        })
    }
}

/// Delivery receipt, logged only.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub recipient_id: Option<String>,
}

#[derive(Debug, Default)]
pub struct Extracted {
    pub messages: Vec<InboundMessage>,
    pub statuses: Vec<StatusEvent>,
    /// Entries that could not be read, with the reason.
    pub rejected: Vec<String>,
}

fn parse_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|value| value.parse::<i64>().ok())
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or_else(Utc::now)
}

fn contact_name(contacts: &[Contact], from: &str) -> Option<String> {
    contacts
        .iter()
        .find(|c| c.wa_id.as_deref() == Some(from))
        .or_else(|| contacts.first())
        .and_then(|c| c.profile.as_ref())
        .and_then(|p| p.name.clone())
        .filter(|name| !name.is_empty())
}

fn content_of(raw: &RawMessage) -> (ContentType, String, Option<String>) {
    match raw.kind.as_str() {
        "text" => (
            ContentType::Text,
            raw.text.as_ref().map(|t| t.body.clone()).unwrap_or_default(),
            None,
        ),
        "image" | "document" => {
            let (kind, media) = if raw.kind == "image" {
                (ContentType::Image, raw.image.as_ref())
            } else {
                (ContentType::Document, raw.document.as_ref())
            };
            let media_id = media.and_then(|m| m.id.clone());
            let caption = media
                .filter(|m| m.id.is_some())
                .and_then(|m| m.caption.clone())
                .unwrap_or_default();
            (kind, caption, media_id)
        }
        "location" => match &raw.location {
            Some(location) => (
                ContentType::Location,
                format!("Location: {}, {}", location.latitude, location.longitude),
                None,
            ),
            None => (ContentType::Location, "Location: unknown".to_string(), None),
        },
        other => (ContentType::Other, format!("[{other} message]"), None),
    }
}

fn read<T: DeserializeOwned>(what: &str, raw: Value) -> Result<T, String> {
    serde_path_to_error::deserialize(raw)
        .map_err(|err| format!("{what}: {}: {}", err.path(), err.inner()))
}

impl InboundMessage {
    pub fn parse(phone_number_id: &str, contacts: &[Contact], raw: Value) -> Result<Self, String> {
        let message: RawMessage = serde_path_to_error::deserialize(&raw)
            .map_err(|err| format!("{}: {}", err.path(), err.inner()))?;
        let (message_type, content, media_id) = content_of(&message);

        Ok(Self {
            phone_number_id: phone_number_id.to_string(),
            contact_name: contact_name(contacts, &message.from),
            wa_message_id: message.id,
            timestamp: parse_timestamp(message.timestamp.as_deref()),
            from: message.from,
            message_type,
            content,
            media_id,
            raw,
        })
    }
}

impl WebhookEnvelope {
    /// Flattens the envelope. Envelopes for other objects and non-message fields yield nothing.
    pub fn extract(self) -> Extracted {
        let mut extracted = Extracted::default();
        if self.object != BUSINESS_ACCOUNT_OBJECT {
            return extracted;
        }

        let mut changes = vec![];
        for raw in self.entry {
            match read::<Entry>("entry", raw) {
                Ok(entry) => changes.extend(entry.changes),
                Err(err) => extracted.rejected.push(err),
            }
        }

        for raw in changes {
            let change = match read::<Change>("change", raw) {
                Ok(change) => change,
                Err(err) => {
                    extracted.rejected.push(err);
                    continue;
                }
            };
            if change.field != MESSAGES_FIELD {
                continue;
            }
            let value = change.value;

            for raw in value.statuses {
                match read::<StatusEvent>("status", raw) {
                    Ok(status) => extracted.statuses.push(status),
                    Err(err) => extracted.rejected.push(err),
                }
            }

            if value.messages.is_empty() {
                continue;
            }
            let Some(phone_number_id) = value.metadata.and_then(|m| m.phone_number_id) else {
                extracted
                    .rejected
                    .push("messages without metadata.phone_number_id".to_string());
                continue;
            };
            // an unreadable contact only costs the display name
            let contacts: Vec<Contact> = value
                .contacts
                .into_iter()
                .filter_map(|raw| serde_json::from_value(raw).ok())
                .collect();
            for raw in value.messages {
                match InboundMessage::parse(&phone_number_id, &contacts, raw) {
                    Ok(message) => extracted.messages.push(message),
                    Err(err) => extracted.rejected.push(err),
                }
            }
        }

        extracted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(messages: Value) -> WebhookEnvelope {
        serde_json::from_value(json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "WABA",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "metadata": { "phone_number_id": "PN1", "display_phone_number": "261" },
                        "contacts": [
                            { "wa_id": "261000", "profile": { "name": "Other" } },
                            { "wa_id": "261340000000", "profile": { "name": "Rivo" } }
                        ],
                        "messages": messages,
                        "statuses": [{ "id": "wamid.out", "status": "read", "recipient_id": "261" }]
                    }
                }]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn extracts_each_content_type() {
        let extracted = envelope(json!([
            { "from": "261340000000", "id": "w1", "timestamp": "1700000000", "type": "text", "text": { "body": "Bonjour" } },
            { "from": "261340000000", "id": "w2", "timestamp": "1700000001", "type": "image", "image": { "id": "media-1", "caption": "photo" } },
            { "from": "261340000000", "id": "w3", "timestamp": "1700000002", "type": "location", "location": { "latitude": -18.9, "longitude": 47.5 } },
            { "from": "261340000000", "id": "w4", "timestamp": "1700000003", "type": "sticker", "sticker": {} }
        ]))
        .extract();

        assert!(extracted.rejected.is_empty());
        assert_eq!(extracted.statuses.len(), 1);
        let messages = extracted.messages;
        assert_eq!(messages.len(), 4);

        assert_eq!(messages[0].content, "Bonjour");
        assert_eq!(messages[0].contact_name.as_deref(), Some("Rivo"));
        assert_eq!(messages[0].timestamp.timestamp(), 1_700_000_000);
        assert!(messages[0].wants_reply());

        assert_eq!(messages[1].message_type, ContentType::Image);
        assert_eq!(messages[1].content, "photo");
        assert_eq!(messages[1].media_id.as_deref(), Some("media-1"));
        assert!(!messages[1].wants_reply());

        assert_eq!(messages[2].content, "Location: -18.9, 47.5");
        assert_eq!(messages[3].content, "[sticker message]");
        assert_eq!(messages[3].message_type, ContentType::Other);
    }

    #[test]
    fn malformed_message_does_not_reject_siblings() {
        let extracted = envelope(json!([
            { "id": "broken", "type": "text" },
            { "from": "261340000000", "id": "w2", "timestamp": "1700000001", "type": "text", "text": { "body": "ok" } }
        ]))
        .extract();

        assert_eq!(extracted.messages.len(), 1);
        assert_eq!(extracted.messages[0].wa_message_id, "w2");
        assert_eq!(extracted.rejected.len(), 1);
    }

    #[test]
    fn malformed_change_does_not_reject_siblings() {
        let envelope: WebhookEnvelope = serde_json::from_value(json!({
            "object": "whatsapp_business_account",
            "entry": [
                {
                    "changes": [
                        {
                            "field": "messages",
                            "value": {
                                "metadata": { "display_phone_number": "261" },
                                "statuses": [{ "id": "wamid.out", "status": "delivered" }]
                            }
                        },
                        {
                            "field": "messages",
                            "value": {
                                "metadata": { "display_phone_number": "261" },
                                "messages": [{ "from": "261", "id": "lost", "type": "text", "text": { "body": "?" } }]
                            }
                        },
                        { "field": "messages", "value": "garbage" },
                        {
                            "field": "messages",
                            "value": {
                                "metadata": { "phone_number_id": "PN1" },
                                "contacts": [{ "wa_id": "261340000000", "profile": "Rivo" }],
                                "messages": [{ "from": "261340000000", "id": "w1", "type": "text", "text": { "body": "Bonjour" } }]
                            }
                        }
                    ]
                },
                { "changes": "not-a-list" }
            ]
        }))
        .unwrap();

        let extracted = envelope.extract();

        assert_eq!(extracted.messages.len(), 1);
        assert_eq!(extracted.messages[0].wa_message_id, "w1");
        assert_eq!(extracted.messages[0].phone_number_id, "PN1");
        assert_eq!(extracted.messages[0].contact_name, None);
        assert_eq!(extracted.statuses.len(), 1);
        assert_eq!(extracted.rejected.len(), 3);
    }

    #[test]
    fn other_objects_are_ignored() {
        let envelope: WebhookEnvelope = serde_json::from_value(json!({
            "object": "page",
            "entry": [{ "changes": [{ "field": "messages", "value": { "messages": [] } }] }]
        }))
        .unwrap();
        let extracted = envelope.extract();
        assert!(extracted.messages.is_empty());
        assert!(extracted.statuses.is_empty());
    }
}
