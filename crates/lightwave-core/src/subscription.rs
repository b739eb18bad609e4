use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use lightwave_db::kv::KvStore;
use lightwave_types::models::{Plan, SubscriptionInfo, now_millis};

use crate::error::Result;

const SUBSCRIPTION_KEY: &str = "cosmic_subscription";
const FREE_ORB_COUNT_KEY: &str = "cosmic_free_orb_count";

/// How many orbs can be unlocked without a subscription.
pub const FREE_ORB_LIMIT: u32 = 3;

/// Simulated payment-provider round trip. There is no real provider yet;
/// once the delay elapses the subscription is simply recorded.
const PROVIDER_DELAY: Duration = Duration::from_millis(1000);

/// Subscription record plus the free-unlock counter, both persisted through
/// the KV port. The record is lazily re-checked for expiry on every read.
pub struct SubscriptionService {
    kv: Arc<dyn KvStore>,
}

impl SubscriptionService {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Raw stored record; an absent or corrupt record reads as unsubscribed.
    pub fn info(&self) -> Result<SubscriptionInfo> {
        let info = match self.kv.get(SUBSCRIPTION_KEY)? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Corrupt {} payload: {}", SUBSCRIPTION_KEY, e);
                SubscriptionInfo::none()
            }),
            None => SubscriptionInfo::none(),
        };
        Ok(info)
    }

    fn save_info(&self, info: &SubscriptionInfo) -> Result<()> {
        let raw = serde_json::to_string(info)?;
        self.kv.set(SUBSCRIPTION_KEY, &raw)?;
        Ok(())
    }

    /// Active iff the stored flag is set and `end_date` has not passed. An
    /// expired record is rewritten to unsubscribed on the spot, so a stale
    /// `is_subscribed: true` never survives a check.
    pub fn is_subscribed(&self) -> Result<bool> {
        let info = self.info()?;
        if !info.is_subscribed {
            return Ok(false);
        }

        if let Some(end) = info.end_date
            && end < now_millis()
        {
            info!("Subscription expired at {}, clearing", end);
            self.save_info(&SubscriptionInfo::none())?;
            return Ok(false);
        }

        Ok(true)
    }

    /// Records a new subscription after the simulated provider delay.
    /// Overwrites whatever was stored before; there is no rollback path.
    pub async fn subscribe(&self, plan: Plan) -> Result<SubscriptionInfo> {
        tokio::time::sleep(PROVIDER_DELAY).await;

        let now = now_millis();
        let info = SubscriptionInfo {
            is_subscribed: true,
            plan: Some(plan),
            start_date: Some(now),
            end_date: Some(now + plan.duration().num_milliseconds()),
        };
        self.save_info(&info)?;

        info!("Subscribed to {:?} plan until {:?}", plan, info.end_date);
        Ok(info)
    }

    pub fn free_orb_count(&self) -> Result<u32> {
        let count = self
            .kv
            .get(FREE_ORB_COUNT_KEY)?
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0);
        Ok(count)
    }

    /// Consumes one unit of the free-unlock budget. Monotone; never called
    /// unless `can_unlock_free` just said yes.
    pub fn increment_free_orb_count(&self) -> Result<u32> {
        let count = self.free_orb_count()? + 1;
        self.kv.set(FREE_ORB_COUNT_KEY, &count.to_string())?;
        Ok(count)
    }

    pub fn can_unlock_free(&self) -> Result<bool> {
        Ok(self.free_orb_count()? < FREE_ORB_LIMIT)
    }

    pub fn free_remaining(&self) -> Result<u32> {
        Ok(FREE_ORB_LIMIT.saturating_sub(self.free_orb_count()?))
    }
}
