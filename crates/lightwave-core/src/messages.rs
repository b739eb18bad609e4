use std::sync::{Arc, Mutex, MutexGuard};

use rand::Rng;
use tracing::{info, warn};
use uuid::Uuid;

use lightwave_db::kv::KvStore;
use lightwave_types::models::{
    Message, MessageKind, OrbColor, OrbSize, Position, Viewport, now_millis,
};

use crate::error::{Error, Result};

/// KV key holding the whole message collection as one JSON array.
const MESSAGES_KEY: &str = "cosmicMessages";

/// Creation input. `kind` is derived from which fields are populated; an
/// empty text string counts as absent.
#[derive(Debug, Default)]
pub struct MessageDraft {
    pub text: Option<String>,
    pub audio_id: Option<Uuid>,
    pub image_id: Option<Uuid>,
    pub sender_name: Option<String>,
    pub viewport: Viewport,
}

/// Ordered collection of messages, mirrored to the persistence port as a
/// whole-collection JSON overwrite on every mutation. One lock guards both
/// the in-memory vector and the write, so persist order equals mutation
/// order.
pub struct MessageStore {
    kv: Arc<dyn KvStore>,
    messages: Mutex<Vec<Message>>,
}

impl MessageStore {
    /// Loads the persisted collection. A corrupt payload degrades to an
    /// empty collection rather than refusing to start.
    pub fn load(kv: Arc<dyn KvStore>) -> Result<Self> {
        let messages = match kv.get(MESSAGES_KEY)? {
            Some(raw) => match serde_json::from_str::<Vec<Message>>(&raw) {
                Ok(messages) => messages,
                Err(e) => {
                    warn!("Corrupt {} payload, starting empty: {}", MESSAGES_KEY, e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        info!("Loaded {} messages", messages.len());
        Ok(Self {
            kv,
            messages: Mutex::new(messages),
        })
    }

    pub fn create(&self, draft: MessageDraft) -> Result<Message> {
        let text = draft.text.filter(|t| !t.is_empty());
        let kind = derive_kind(text.as_deref(), draft.audio_id, draft.image_id)?;

        let mut rng = rand::rng();
        let text_len = text.as_deref().map_or(0, str::len);

        let message = Message {
            id: Uuid::new_v4(),
            text,
            kind,
            position: scatter_position(&mut rng, draft.viewport),
            color: OrbColor::ALL[rng.random_range(0..OrbColor::ALL.len())],
            size: pick_size(&mut rng, text_len),
            created: now_millis(),
            sender_name: draft.sender_name,
            is_from_current_user: true,
            reply_to: None,
            audio_id: draft.audio_id,
            image_id: draft.image_id,
        };

        let mut messages = self.lock()?;
        messages.push(message.clone());
        self.persist(&messages)?;
        Ok(message)
    }

    /// All messages in insertion order.
    pub fn list(&self) -> Result<Vec<Message>> {
        Ok(self.lock()?.clone())
    }

    /// Creates a text reply carrying `reply_to = original_id`. The original
    /// is not required to exist; a dangling back-reference is tolerated.
    pub fn reply(
        &self,
        original_id: Uuid,
        text: &str,
        sender_name: Option<String>,
        viewport: Viewport,
    ) -> Result<Message> {
        if text.is_empty() {
            return Err(Error::Validation("reply text must not be empty".into()));
        }

        let mut rng = rand::rng();
        let message = Message {
            id: Uuid::new_v4(),
            text: Some(text.to_string()),
            kind: MessageKind::Text,
            position: scatter_position(&mut rng, viewport),
            color: OrbColor::Blue,
            size: OrbSize::Sm,
            created: now_millis(),
            sender_name,
            is_from_current_user: true,
            reply_to: Some(original_id),
            audio_id: None,
            image_id: None,
        };

        let mut messages = self.lock()?;
        messages.push(message.clone());
        self.persist(&messages)?;
        Ok(message)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Message>>> {
        self.messages
            .lock()
            .map_err(|e| Error::Storage(anyhow::anyhow!("message lock poisoned: {}", e)))
    }

    fn persist(&self, messages: &[Message]) -> Result<()> {
        let raw = serde_json::to_string(messages)?;
        self.kv.set(MESSAGES_KEY, &raw)?;
        Ok(())
    }
}

fn derive_kind(
    text: Option<&str>,
    audio_id: Option<Uuid>,
    image_id: Option<Uuid>,
) -> Result<MessageKind> {
    let populated =
        usize::from(text.is_some()) + usize::from(audio_id.is_some()) + usize::from(image_id.is_some());

    match populated {
        0 => Err(Error::Validation(
            "a message needs text, audio, or an image".into(),
        )),
        1 if text.is_some() => Ok(MessageKind::Text),
        1 if audio_id.is_some() => Ok(MessageKind::Audio),
        1 => Ok(MessageKind::Image),
        _ => Ok(MessageKind::Mixed),
    }
}

/// Release point inside the 10–90% width, 20–80% height band of the
/// viewport, keeping orbs clear of the screen edges.
fn scatter_position<R: Rng>(rng: &mut R, viewport: Viewport) -> Position {
    Position {
        x: (rng.random::<f64>() * 0.8 + 0.1) * viewport.width,
        y: (rng.random::<f64>() * 0.6 + 0.2) * viewport.height,
    }
}

/// Orb size from text length, with the jitter the web client used: long
/// texts are mostly large, short ones mostly small.
fn pick_size<R: Rng>(rng: &mut R, text_len: usize) -> OrbSize {
    if text_len > 100 {
        if rng.random::<f64>() < 0.1 {
            OrbSize::Md
        } else {
            OrbSize::Lg
        }
    } else if text_len < 20 {
        let r = rng.random::<f64>();
        if r < 0.05 {
            OrbSize::Lg
        } else if r < 0.35 {
            OrbSize::Md
        } else {
            OrbSize::Sm
        }
    } else {
        let r = rng.random::<f64>();
        if r < 0.2 {
            OrbSize::Lg
        } else if r < 0.4 {
            OrbSize::Sm
        } else {
            OrbSize::Md
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightwave_db::kv::MemoryKv;

    fn store() -> (Arc<MemoryKv>, MessageStore) {
        let kv = Arc::new(MemoryKv::new());
        let store = MessageStore::load(kv.clone()).unwrap();
        (kv, store)
    }

    fn text_draft(text: &str) -> MessageDraft {
        MessageDraft {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn kind_reflects_populated_fields() {
        let (_kv, store) = store();

        let text = store.create(text_draft("hi")).unwrap();
        assert_eq!(text.kind, MessageKind::Text);

        let audio = store
            .create(MessageDraft {
                audio_id: Some(Uuid::new_v4()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(audio.kind, MessageKind::Audio);

        let image = store
            .create(MessageDraft {
                image_id: Some(Uuid::new_v4()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(image.kind, MessageKind::Image);

        let mixed = store
            .create(MessageDraft {
                text: Some("with narration".into()),
                audio_id: Some(Uuid::new_v4()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(mixed.kind, MessageKind::Mixed);
    }

    #[test]
    fn empty_draft_is_rejected_and_store_unchanged() {
        let (_kv, store) = store();

        let err = store.create(MessageDraft::default()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        // An empty text string counts as absent
        let err = store.create(text_draft("")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn persisted_collection_round_trips() {
        let (kv, store) = store();

        store.create(text_draft("first")).unwrap();
        store
            .create(MessageDraft {
                text: Some("second".into()),
                image_id: Some(Uuid::new_v4()),
                sender_name: Some("Nova".into()),
                ..Default::default()
            })
            .unwrap();
        let original = store.list().unwrap();

        // A fresh store over the same KV sees an equal collection
        let reloaded = MessageStore::load(kv).unwrap();
        assert_eq!(reloaded.list().unwrap(), original);
    }

    #[test]
    fn corrupt_payload_degrades_to_empty() {
        let kv = Arc::new(MemoryKv::new());
        kv.set(MESSAGES_KEY, "{not json").unwrap();

        let store = MessageStore::load(kv).unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn reply_links_back_and_leaves_original_unchanged() {
        let (_kv, store) = store();

        let original = store.create(text_draft("hi")).unwrap();
        let reply = store
            .reply(original.id, "hello back", None, Viewport::default())
            .unwrap();

        assert_eq!(reply.reply_to, Some(original.id));
        assert_eq!(reply.kind, MessageKind::Text);
        assert_eq!(reply.color, OrbColor::Blue);
        assert_eq!(reply.size, OrbSize::Sm);

        let all = store.list().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], original);
    }

    #[test]
    fn reply_to_unknown_id_is_tolerated() {
        let (_kv, store) = store();

        // Dangling back-reference: no existence check, no error
        let reply = store
            .reply(Uuid::new_v4(), "into the void", None, Viewport::default())
            .unwrap();
        assert!(reply.reply_to.is_some());
    }

    #[test]
    fn position_stays_inside_viewport_band() {
        let (_kv, store) = store();
        let viewport = Viewport {
            width: 1000.0,
            height: 500.0,
        };

        for _ in 0..50 {
            let m = store
                .create(MessageDraft {
                    text: Some("drift".into()),
                    viewport,
                    ..Default::default()
                })
                .unwrap();
            assert!(m.position.x >= 100.0 && m.position.x <= 900.0);
            assert!(m.position.y >= 100.0 && m.position.y <= 400.0);
        }
    }
}
