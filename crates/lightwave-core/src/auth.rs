use std::collections::HashMap;
use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use lightwave_db::kv::KvStore;
use lightwave_types::models::{User, now_millis};

use crate::error::{Error, Result};

const USERS_KEY: &str = "cosmic_users";
const CREDENTIALS_KEY: &str = "cosmic_credentials";
const NICKNAME_KEY: &str = "userNickname";

const MIN_PASSWORD_LEN: usize = 6;

/// Account registry over the KV port: a `cosmic_users` JSON array plus a
/// `cosmic_credentials` map from credential to Argon2 PHC string. The web
/// client stored plaintext passwords here; that is not carried over.
pub struct AuthService {
    kv: Arc<dyn KvStore>,
}

impl AuthService {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Registers a new account. The credential must be a well-formed email
    /// address or mobile number; re-registering an existing credential is a
    /// conflict.
    pub fn register(
        &self,
        credential: &str,
        password: &str,
        nickname: Option<String>,
    ) -> Result<User> {
        let is_email = is_valid_email(credential);
        let is_phone = is_valid_phone(credential);

        if !is_email && !is_phone {
            return Err(Error::Validation(
                "enter a valid email address or mobile number".into(),
            ));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(Error::Validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let mut users = self.users()?;
        let taken = users.iter().any(|u| {
            u.email.as_deref() == Some(credential) || u.phone.as_deref() == Some(credential)
        });
        if taken {
            return Err(Error::Conflict("this account is already registered".into()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::Storage(anyhow::anyhow!("password hashing failed: {}", e)))?
            .to_string();

        let user = User {
            id: Uuid::new_v4(),
            email: is_email.then(|| credential.to_string()),
            phone: is_phone.then(|| credential.to_string()),
            nickname: nickname
                .filter(|n| !n.is_empty())
                .unwrap_or_else(default_nickname),
            avatar: None,
            created_at: now_millis(),
        };

        // Credential map first: if the user write below fails, the taken
        // check (which reads users) still passes, so the registration can
        // simply be retried. The reverse order would strand a user that
        // can never log in.
        let mut credentials = self.credentials()?;
        credentials.insert(credential.to_string(), password_hash);
        self.save_credentials(&credentials)?;

        users.push(user.clone());
        self.save_users(&users)?;

        self.kv.set(NICKNAME_KEY, &user.nickname)?;

        info!("Registered user {} ({})", user.nickname, user.id);
        Ok(user)
    }

    /// Verifies a credential/password pair. Wrong password and absent
    /// account both answer with the same auth error.
    pub fn login(&self, credential: &str, password: &str) -> Result<User> {
        let credentials = self.credentials()?;
        let stored = credentials
            .get(credential)
            .ok_or_else(|| Error::Auth("invalid credential or password".into()))?;

        let parsed = PasswordHash::new(stored)
            .map_err(|e| Error::Storage(anyhow::anyhow!("corrupt password hash: {}", e)))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| Error::Auth("invalid credential or password".into()))?;

        let users = self.users()?;
        let user = users
            .into_iter()
            .find(|u| {
                u.email.as_deref() == Some(credential) || u.phone.as_deref() == Some(credential)
            })
            .ok_or_else(|| Error::Auth("account not found".into()))?;

        self.kv.set(NICKNAME_KEY, &user.nickname)?;

        Ok(user)
    }

    pub fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users()?.into_iter().find(|u| u.id == id))
    }

    fn users(&self) -> Result<Vec<User>> {
        let users = match self.kv.get(USERS_KEY)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };
        Ok(users)
    }

    fn save_users(&self, users: &[User]) -> Result<()> {
        self.kv.set(USERS_KEY, &serde_json::to_string(users)?)?;
        Ok(())
    }

    fn credentials(&self) -> Result<HashMap<String, String>> {
        let map = match self.kv.get(CREDENTIALS_KEY)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => HashMap::new(),
        };
        Ok(map)
    }

    fn save_credentials(&self, credentials: &HashMap<String, String>) -> Result<()> {
        self.kv
            .set(CREDENTIALS_KEY, &serde_json::to_string(credentials)?)?;
        Ok(())
    }
}

fn default_nickname() -> String {
    format!("Voyager{}", rand::rng().random_range(0..1000))
}

/// `local@domain.tld` with no whitespace and a dotted domain.
fn is_valid_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    let clean = |part: &str| !part.is_empty() && !part.contains(['@', ' ', '\t', '\n']);
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    clean(local) && clean(host) && clean(tld)
}

/// CN mobile number: 11 digits, `1` then `3`–`9`.
fn is_valid_phone(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 11
        && bytes[0] == b'1'
        && (b'3'..=b'9').contains(&bytes[1])
        && bytes.iter().all(u8::is_ascii_digit)
}
