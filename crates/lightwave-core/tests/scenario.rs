//! End-to-end walk through the message lifecycle: register, release a
//! light-wave, capture it as another user, spend the free budget, subscribe,
//! and reply.

use std::sync::Arc;

use lightwave_core::auth::AuthService;
use lightwave_core::error::Error;
use lightwave_core::messages::{MessageDraft, MessageStore};
use lightwave_core::subscription::SubscriptionService;
use lightwave_core::unlock::UnlockGate;
use lightwave_db::kv::{KvStore, MemoryKv};
use lightwave_types::models::{MessageKind, Plan, Viewport};

struct World {
    kv: Arc<MemoryKv>,
    auth: AuthService,
    messages: MessageStore,
    subscriptions: Arc<SubscriptionService>,
    gate: UnlockGate,
}

fn world() -> World {
    let kv: Arc<MemoryKv> = Arc::new(MemoryKv::new());
    let shared: Arc<dyn KvStore> = kv.clone();
    let subscriptions = Arc::new(SubscriptionService::new(shared.clone()));
    World {
        auth: AuthService::new(shared.clone()),
        messages: MessageStore::load(shared).unwrap(),
        gate: UnlockGate::new(subscriptions.clone()),
        subscriptions,
        kv,
    }
}

#[tokio::test(start_paused = true)]
async fn full_lifecycle() {
    let w = world();

    let sender = w
        .auth
        .register("nova@example.com", "secret123", Some("Nova".into()))
        .unwrap();
    let reader = w.auth.register("13912345678", "secret123", None).unwrap();

    // Release a text light-wave
    let message = w
        .messages
        .create(MessageDraft {
            text: Some("hi".into()),
            sender_name: Some(sender.nickname.clone()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(message.kind, MessageKind::Text);
    assert!(message.created > 0);

    let listed = w.messages.list().unwrap();
    assert_eq!(listed, vec![message.clone()]);

    // The reader spends the whole free budget, this message first
    let outcome = w.gate.unlock(reader.id, message.id).unwrap();
    assert!(outcome.newly_unlocked);
    assert_eq!(outcome.free_remaining, Some(2));

    for _ in 0..2 {
        w.gate.unlock(reader.id, uuid::Uuid::new_v4()).unwrap();
    }
    assert!(matches!(
        w.gate.unlock(reader.id, uuid::Uuid::new_v4()),
        Err(Error::SubscriptionRequired)
    ));

    // Subscribing lifts the gate
    w.subscriptions.subscribe(Plan::Yearly).await.unwrap();
    assert!(w.gate.unlock(reader.id, uuid::Uuid::new_v4()).unwrap().newly_unlocked);

    // Reply links back; the original is untouched
    let reply = w
        .messages
        .reply(
            message.id,
            "hello back",
            Some(reader.nickname.clone()),
            Viewport::default(),
        )
        .unwrap();
    assert_eq!(reply.reply_to, Some(message.id));

    let all = w.messages.list().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], message);

    // Everything durable survives a reload from the same KV
    let reloaded = MessageStore::load(w.kv.clone()).unwrap();
    assert_eq!(reloaded.list().unwrap(), all);
    let subs = SubscriptionService::new(w.kv.clone());
    assert!(subs.is_subscribed().unwrap());
    assert_eq!(subs.free_orb_count().unwrap(), 3);
}
