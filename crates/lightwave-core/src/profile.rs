use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;

use lightwave_db::kv::KvStore;

use crate::error::{Error, Result};

const NICKNAME_KEY: &str = "userNickname";
const AVATAR_KEY: &str = "userAvatar";

/// Display-profile fields kept directly in the KV layer, separate from the
/// account record so they survive logout.
pub struct ProfileStore {
    kv: Arc<dyn KvStore>,
}

impl ProfileStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    pub fn nickname(&self) -> Result<Option<String>> {
        Ok(self.kv.get(NICKNAME_KEY)?)
    }

    pub fn set_nickname(&self, nickname: &str) -> Result<()> {
        if nickname.is_empty() {
            return Err(Error::Validation("nickname must not be empty".into()));
        }
        self.kv.set(NICKNAME_KEY, nickname)?;
        Ok(())
    }

    pub fn avatar(&self) -> Result<Option<String>> {
        Ok(self.kv.get(AVATAR_KEY)?)
    }

    /// Stores the avatar as a data URL. A base64 payload that does not
    /// decode is rejected up front instead of failing at render time.
    pub fn set_avatar(&self, data_url: &str) -> Result<()> {
        if !data_url.starts_with("data:") {
            return Err(Error::Validation("avatar must be a data URL".into()));
        }
        if let Some((_, payload)) = data_url.split_once(";base64,")
            && B64.decode(payload).is_err()
        {
            return Err(Error::Validation("avatar payload is not valid base64".into()));
        }
        self.kv.set(AVATAR_KEY, data_url)?;
        Ok(())
    }
}
