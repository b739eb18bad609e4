use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::subscription::SubscriptionService;

/// Result of a successful unlock attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockOutcome {
    /// False when the message was already unlocked this session.
    pub newly_unlocked: bool,
    /// Free unlocks left after this attempt; `None` under a subscription.
    pub free_remaining: Option<u32>,
}

/// One-way Locked → Unlocked gate. Unlock sets are in-memory only and do
/// not survive a restart; budget and subscription state persist through
/// [`SubscriptionService`].
pub struct UnlockGate {
    subscriptions: Arc<SubscriptionService>,
    // Also serializes unlock attempts: held across the whole
    // check/increment/mark sequence so the budget is consumed atomically
    // with the transition.
    sessions: Mutex<HashMap<Uuid, HashSet<Uuid>>>,
}

impl UnlockGate {
    pub fn new(subscriptions: Arc<SubscriptionService>) -> Self {
        Self {
            subscriptions,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_unlocked(&self, user_id: Uuid, message_id: Uuid) -> bool {
        self.sessions
            .lock()
            .map(|sessions| {
                sessions
                    .get(&user_id)
                    .is_some_and(|set| set.contains(&message_id))
            })
            .unwrap_or(false)
    }

    /// Attempts the Locked → Unlocked transition for one message.
    ///
    /// An active subscription unlocks unconditionally. Otherwise exactly
    /// one unit of free budget is consumed, and only for a message not
    /// already unlocked this session. With the budget spent the attempt
    /// fails with [`Error::SubscriptionRequired`] and the message stays
    /// locked.
    pub fn unlock(&self, user_id: Uuid, message_id: Uuid) -> Result<UnlockOutcome> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|e| Error::Storage(anyhow::anyhow!("session lock poisoned: {}", e)))?;

        if self.subscriptions.is_subscribed()? {
            let newly = sessions.entry(user_id).or_default().insert(message_id);
            return Ok(UnlockOutcome {
                newly_unlocked: newly,
                free_remaining: None,
            });
        }

        let already = sessions
            .get(&user_id)
            .is_some_and(|set| set.contains(&message_id));
        if already {
            return Ok(UnlockOutcome {
                newly_unlocked: false,
                free_remaining: Some(self.subscriptions.free_remaining()?),
            });
        }

        if !self.subscriptions.can_unlock_free()? {
            return Err(Error::SubscriptionRequired);
        }

        let used = self.subscriptions.increment_free_orb_count()?;
        sessions.entry(user_id).or_default().insert(message_id);
        debug!("Free unlock {} of {} used", used, crate::subscription::FREE_ORB_LIMIT);

        Ok(UnlockOutcome {
            newly_unlocked: true,
            free_remaining: Some(self.subscriptions.free_remaining()?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightwave_db::kv::MemoryKv;
    use lightwave_types::models::Plan;

    fn gate() -> (Arc<SubscriptionService>, UnlockGate) {
        let subs = Arc::new(SubscriptionService::new(Arc::new(MemoryKv::new())));
        let gate = UnlockGate::new(subs.clone());
        (subs, gate)
    }

    #[test]
    fn three_free_unlocks_then_refusal() {
        let (subs, gate) = gate();
        let user = Uuid::new_v4();

        for expected_remaining in [2, 1, 0] {
            let outcome = gate.unlock(user, Uuid::new_v4()).unwrap();
            assert!(outcome.newly_unlocked);
            assert_eq!(outcome.free_remaining, Some(expected_remaining));
        }

        // Fourth distinct message is refused and the budget stays spent at 3
        let fourth = Uuid::new_v4();
        let err = gate.unlock(user, fourth).unwrap_err();
        assert!(matches!(err, Error::SubscriptionRequired));
        assert!(!gate.is_unlocked(user, fourth));
        assert_eq!(subs.free_orb_count().unwrap(), 3);
    }

    #[test]
    fn repeat_unlock_consumes_no_budget() {
        let (subs, gate) = gate();
        let user = Uuid::new_v4();
        let message = Uuid::new_v4();

        assert!(gate.unlock(user, message).unwrap().newly_unlocked);
        let again = gate.unlock(user, message).unwrap();
        assert!(!again.newly_unlocked);
        assert_eq!(subs.free_orb_count().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn subscription_overrides_spent_budget() {
        let (subs, gate) = gate();
        let user = Uuid::new_v4();

        for _ in 0..3 {
            gate.unlock(user, Uuid::new_v4()).unwrap();
        }
        assert!(matches!(
            gate.unlock(user, Uuid::new_v4()),
            Err(Error::SubscriptionRequired)
        ));

        subs.subscribe(Plan::Monthly).await.unwrap();

        // Unconditional from here on, budget untouched
        let outcome = gate.unlock(user, Uuid::new_v4()).unwrap();
        assert!(outcome.newly_unlocked);
        assert_eq!(outcome.free_remaining, None);
        assert_eq!(subs.free_orb_count().unwrap(), 3);
    }

    #[test]
    fn budget_cap_holds_under_concurrent_unlocks() {
        let subs = Arc::new(SubscriptionService::new(Arc::new(MemoryKv::new())));
        let gate = Arc::new(UnlockGate::new(subs.clone()));
        let user = Uuid::new_v4();

        let barrier = Arc::new(std::sync::Barrier::new(16));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let gate = gate.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    gate.unlock(user, Uuid::new_v4()).is_ok()
                })
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&ok| ok)
            .count();

        assert_eq!(successes, 3);
        assert_eq!(subs.free_orb_count().unwrap(), 3);
    }

    #[test]
    fn unlock_sets_are_per_user() {
        let (_subs, gate) = gate();
        let message = Uuid::new_v4();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        gate.unlock(alice, message).unwrap();
        assert!(gate.is_unlocked(alice, message));
        assert!(!gate.is_unlocked(bob, message));
    }
}
