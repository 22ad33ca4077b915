//! Mock phone-number accounts.
//!
//! [`CredentialStore`] keeps a users collection and a session in a
//! [`KeyValueStore`], plus at most one outstanding one-time code in memory.
//! Every operation reports a plain success flag. Storage failures are logged
//! and swallowed, and in-memory state stays authoritative for the rest of
//! the process.
//!
//! Persisted layout:
//!
//! - [`USERS_KEY`] holds a JSON object mapping phone number to
//!   `{"password": <obfuscated>, "user": {id, phone, name?, createdAt}}`.
//! - [`SESSION_KEY`] holds the signed-in user as JSON, or is absent.

mod clock;
mod otp;
pub mod password;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use clock::{Clock, ManualClock, SystemClock};
pub use otp::{random_code, Otp, OtpGrant, CODE_DIGITS};

use crate::config::AuthConfig;
use crate::storage::KeyValueStore;

/// Storage key of the users collection.
pub const USERS_KEY: &str = "vayuwatch_users";

/// Storage key of the active session.
pub const SESSION_KEY: &str = "vayuwatch_session";

/// A registered account's public profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// `user_<unix millis at creation>`.
    pub id: String,
    /// Phone number, the account key.
    pub phone: String,
    /// Display name, if one was given at signup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Creation time, RFC 3339 on the wire.
    pub created_at: DateTime<Utc>,
}

/// One entry of the users collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Obfuscated password, see [`password::obfuscate`].
    pub password: String,
    /// The profile.
    pub user: User,
}

/// Users collection keyed by phone number.
pub type Users = BTreeMap<String, UserRecord>;

/// Account store over an injected key/value backend and clock.
#[derive(Debug)]
pub struct CredentialStore<S: KeyValueStore> {
    storage: S,
    clock: Arc<dyn Clock>,
    config: AuthConfig,
    users: Users,
    session: Option<User>,
    pending_otp: Option<Otp>,
}

impl<S: KeyValueStore> CredentialStore<S> {
    /// Create a store, restoring any persisted session.
    ///
    /// A session that fails to parse is removed from storage and the store
    /// starts signed out.
    pub fn new(storage: S, clock: Arc<dyn Clock>, config: AuthConfig) -> Self {
        let mut store = Self {
            storage,
            clock,
            config,
            users: Users::new(),
            session: None,
            pending_otp: None,
        };
        store.users = store.load_users();
        store.session = store.restore_session();
        store
    }

    /// Register `phone` and sign in as the new user.
    ///
    /// Returns `false` if the phone number is already registered.
    pub async fn signup(&mut self, phone: &str, password: &str, name: Option<&str>) -> bool {
        tokio::time::sleep(self.config.signup_delay()).await;

        let mut users = self.load_users();
        if users.contains_key(phone) {
            debug!("Signup rejected, {} already registered", phone);
            return false;
        }

        let user = self.new_user(phone, name.map(str::to_string));
        users.insert(
            phone.to_string(),
            UserRecord {
                password: password::obfuscate(password),
                user: user.clone(),
            },
        );
        self.save_users(users);
        self.start_session(user);

        info!("Registered {}", phone);
        true
    }

    /// Sign in with a password.
    ///
    /// Returns `false` for an unknown phone or a wrong password; the current
    /// session is left as it was.
    pub async fn login(&mut self, phone: &str, password: &str) -> bool {
        tokio::time::sleep(self.config.login_delay()).await;

        let users = self.load_users();
        let Some(record) = users.get(phone) else {
            debug!("Login rejected, {} not registered", phone);
            return false;
        };
        if !password::matches(&record.password, password) {
            debug!("Login rejected, wrong password for {}", phone);
            return false;
        }

        let user = record.user.clone();
        self.users = users;
        self.start_session(user);
        info!("Signed in {}", phone);
        true
    }

    /// Issue a one-time code for `phone`, replacing any outstanding code.
    ///
    /// In demo mode the code is always the configured demo code.
    pub fn send_otp(&mut self, phone: &str) -> OtpGrant {
        let code = match self.config.demo_code() {
            Some(demo) => demo.to_string(),
            None => random_code(&mut rand::rng()),
        };
        let expires_at = self.otp_expiry();

        let otp = Otp {
            code,
            phone: phone.to_string(),
            expires_at,
        };
        let grant = otp.grant();
        self.pending_otp = Some(otp);

        debug!("Issued one-time code for {} valid until {}", phone, expires_at);
        grant
    }

    /// Check a one-time code, consuming the outstanding code on success.
    ///
    /// In demo mode the demo code is accepted for any phone, whether or not
    /// a code was requested. A failed check leaves the outstanding code in
    /// place.
    pub fn verify_otp(&mut self, phone: &str, code: &str) -> bool {
        if self.config.demo_code() == Some(code) {
            self.pending_otp = None;
            return true;
        }

        let now = self.clock.now();
        let Some(otp) = &self.pending_otp else {
            return false;
        };
        if otp.accepts(phone, code, now) {
            self.pending_otp = None;
            return true;
        }
        if otp.phone == phone && now > otp.expires_at {
            debug!("One-time code for {} expired at {}", phone, otp.expires_at);
        }
        false
    }

    /// Sign in with a one-time code, registering the phone on first use.
    ///
    /// Accounts created here get a random placeholder password and no name.
    pub async fn login_with_otp(&mut self, phone: &str, code: &str) -> bool {
        tokio::time::sleep(self.config.otp_login_delay()).await;

        if !self.verify_otp(phone, code) {
            return false;
        }

        let mut users = self.load_users();
        let user = if let Some(record) = users.get(phone) {
            record.user.clone()
        } else {
            let user = self.new_user(phone, None);
            let placeholder = password::placeholder(&mut rand::rng());
            users.insert(
                phone.to_string(),
                UserRecord {
                    password: password::obfuscate(&placeholder),
                    user: user.clone(),
                },
            );
            self.save_users(users);
            info!("Registered {} through one-time code", phone);
            user
        };

        self.start_session(user);
        info!("Signed in {} with one-time code", phone);
        true
    }

    /// Replace the password of a registered phone.
    ///
    /// Returns `false` if the phone is not registered. The session is not
    /// touched.
    pub fn reset_password(&mut self, phone: &str, new_password: &str) -> bool {
        let mut users = self.load_users();
        let Some(record) = users.get_mut(phone) else {
            debug!("Password reset rejected, {} not registered", phone);
            return false;
        };
        record.password = password::obfuscate(new_password);
        self.save_users(users);

        info!("Password reset for {}", phone);
        true
    }

    /// Sign out and drop any outstanding one-time code. Safe to repeat.
    pub fn logout(&mut self) {
        if let Some(user) = self.session.take() {
            info!("Signed out {}", user.phone);
        }
        self.pending_otp = None;
        self.remove(SESSION_KEY);
    }

    /// The signed-in user.
    #[must_use]
    pub fn current_user(&self) -> Option<&User> {
        self.session.as_ref()
    }

    /// Whether anyone is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// The outstanding one-time code, if any.
    #[must_use]
    pub fn pending_otp(&self) -> Option<&Otp> {
        self.pending_otp.as_ref()
    }

    /// Registered users as last read from storage.
    #[must_use]
    pub fn users(&self) -> &Users {
        &self.users
    }

    /// Account settings in effect.
    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// The backing store.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Give back the backing store.
    #[must_use]
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn new_user(&self, phone: &str, name: Option<String>) -> User {
        let now = self.clock.now();
        User {
            id: format!("user_{}", now.timestamp_millis()),
            phone: phone.to_string(),
            name,
            created_at: now,
        }
    }

    fn otp_expiry(&self) -> DateTime<Utc> {
        let now = self.clock.now();
        chrono::Duration::from_std(self.config.otp_ttl())
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn start_session(&mut self, user: User) {
        match serde_json::to_string(&user) {
            Ok(json) => self.write(SESSION_KEY, &json),
            Err(e) => warn!("Failed to serialize session: {}", e),
        }
        self.session = Some(user);
    }

    fn restore_session(&mut self) -> Option<User> {
        let json = self.read(SESSION_KEY)?;
        match serde_json::from_str::<User>(&json) {
            Ok(user) => {
                debug!("Restored session for {}", user.phone);
                Some(user)
            }
            Err(e) => {
                warn!("Discarding unreadable session: {}", e);
                self.remove(SESSION_KEY);
                None
            }
        }
    }

    /// Current users collection. Unreadable storage falls back to the last
    /// known copy; an unparseable blob counts as empty.
    fn load_users(&self) -> Users {
        let json = match self.storage.get(USERS_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => return Users::new(),
            Err(e) => {
                warn!("Failed to read {}: {}", USERS_KEY, e);
                return self.users.clone();
            }
        };
        serde_json::from_str(&json).unwrap_or_else(|e| {
            warn!("Treating unreadable users collection as empty: {}", e);
            Users::new()
        })
    }

    fn save_users(&mut self, users: Users) {
        match serde_json::to_string(&users) {
            Ok(json) => self.write(USERS_KEY, &json),
            Err(e) => warn!("Failed to serialize users collection: {}", e),
        }
        self.users = users;
    }

    fn read(&self, key: &str) -> Option<String> {
        self.storage.get(key).unwrap_or_else(|e| {
            warn!("Failed to read {}: {}", key, e);
            None
        })
    }

    fn write(&mut self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            warn!("Failed to write {}: {}", key, e);
        }
    }

    fn remove(&mut self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            warn!("Failed to remove {}: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::storage::MemoryStore;
    use chrono::{Duration, TimeZone};

    const PHONE: &str = "9999999999";

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 3, 9, 0, 0).unwrap()
    }

    fn demo_store() -> (CredentialStore<MemoryStore>, Arc<ManualClock>) {
        store_with(MemoryStore::new(), AuthConfig::without_delays())
    }

    fn strict_store() -> (CredentialStore<MemoryStore>, Arc<ManualClock>) {
        let config = AuthConfig {
            demo_mode: false,
            ..AuthConfig::without_delays()
        };
        store_with(MemoryStore::new(), config)
    }

    fn store_with<S: KeyValueStore>(
        storage: S,
        config: AuthConfig,
    ) -> (CredentialStore<S>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        let store = CredentialStore::new(storage, clock.clone(), config);
        (store, clock)
    }

    /// Rejects every operation, like a browser in private mode.
    #[derive(Debug, Default)]
    struct FailingStore;

    fn refused(what: &str) -> Error {
        Error::Io(std::io::Error::new(std::io::ErrorKind::Other, what))
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(refused("read refused"))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(refused("quota exceeded"))
        }

        fn remove(&mut self, _key: &str) -> Result<()> {
            Err(refused("remove refused"))
        }
    }

    #[tokio::test]
    async fn test_signup_then_duplicate_fails() {
        let (mut store, _) = demo_store();

        assert!(store.signup(PHONE, "secret", Some("Asha")).await);
        assert!(store.is_authenticated());

        let user = store.current_user().unwrap();
        assert_eq!(user.phone, PHONE);
        assert_eq!(user.name.as_deref(), Some("Asha"));
        assert_eq!(user.id, format!("user_{}", start().timestamp_millis()));
        assert_eq!(user.created_at, start());

        assert!(!store.signup(PHONE, "other", None).await);
        assert_eq!(store.users().len(), 1);
    }

    #[tokio::test]
    async fn test_signup_persists_layout() {
        let (mut store, _) = demo_store();
        assert!(store.signup(PHONE, "secret", None).await);

        let raw = store.storage().get(USERS_KEY).unwrap().unwrap();
        let users: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entry = &users[PHONE];
        assert_eq!(entry["password"], "c2VjcmV0");
        assert_eq!(entry["user"]["phone"], PHONE);
        assert!(entry["user"]["createdAt"].is_string());
        assert!(entry["user"].get("name").is_none());

        let session = store.storage().get(SESSION_KEY).unwrap().unwrap();
        let session: User = serde_json::from_str(&session).unwrap();
        assert_eq!(Some(&session), store.current_user());
    }

    #[tokio::test]
    async fn test_login_right_and_wrong_password() {
        let (mut store, _) = demo_store();
        assert!(store.signup(PHONE, "secret", Some("Asha")).await);
        store.logout();

        assert!(!store.login(PHONE, "wrong").await);
        assert!(!store.is_authenticated());

        assert!(store.login(PHONE, "secret").await);
        let user = store.current_user().unwrap();
        assert_eq!(user.phone, PHONE);
        assert_eq!(user.name.as_deref(), Some("Asha"));
    }

    #[tokio::test]
    async fn test_failed_login_keeps_existing_session() {
        let (mut store, _) = demo_store();
        assert!(store.signup(PHONE, "secret", None).await);
        assert!(store.signup("8888888888", "other", None).await);

        assert!(!store.login(PHONE, "nope").await);
        assert_eq!(store.current_user().unwrap().phone, "8888888888");
    }

    #[tokio::test]
    async fn test_login_unknown_phone() {
        let (mut store, _) = demo_store();
        assert!(!store.login("1234567890", "secret").await);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_send_otp_demo_code() {
        let (mut store, _) = demo_store();
        let grant = store.send_otp(PHONE);

        assert_eq!(grant.code, "123456");
        assert_eq!(grant.expires_at, start() + Duration::seconds(60));
        assert_eq!(store.pending_otp().unwrap().phone, PHONE);
    }

    #[test]
    fn test_send_otp_overwrites_previous() {
        let (mut store, clock) = strict_store();
        let first = store.send_otp(PHONE);
        clock.advance(Duration::seconds(5));
        let second = store.send_otp("8888888888");

        let pending = store.pending_otp().unwrap();
        assert_eq!(pending.phone, "8888888888");
        assert_eq!(pending.expires_at, second.expires_at);
        assert!(!store.verify_otp(PHONE, &first.code));
    }

    #[test]
    fn test_verify_otp_consumed_once() {
        let (mut store, _) = strict_store();
        let grant = store.send_otp(PHONE);
        assert_eq!(grant.code.len(), CODE_DIGITS);

        assert!(store.verify_otp(PHONE, &grant.code));
        assert!(store.pending_otp().is_none());
        assert!(!store.verify_otp(PHONE, &grant.code));
    }

    #[test]
    fn test_verify_otp_expiry() {
        let (mut store, clock) = strict_store();
        let grant = store.send_otp(PHONE);

        clock.advance(Duration::seconds(60));
        assert!(store.verify_otp(PHONE, &grant.code));

        let grant = store.send_otp(PHONE);
        clock.advance(Duration::seconds(60) + Duration::milliseconds(1));
        assert!(!store.verify_otp(PHONE, &grant.code));
        // Failure keeps the code around.
        assert!(store.pending_otp().is_some());
    }

    #[test]
    fn test_verify_otp_wrong_phone_or_code() {
        let (mut store, _) = strict_store();
        let grant = store.send_otp(PHONE);

        assert!(!store.verify_otp("8888888888", &grant.code));
        let wrong = if grant.code == "000000" { "000001" } else { "000000" };
        assert!(!store.verify_otp(PHONE, wrong));
        assert!(store.verify_otp(PHONE, &grant.code));
    }

    #[test]
    fn test_verify_without_request() {
        let (mut strict, _) = strict_store();
        assert!(!strict.verify_otp(PHONE, "123456"));

        let (mut demo, _) = demo_store();
        assert!(demo.verify_otp(PHONE, "123456"));
        assert!(!demo.verify_otp(PHONE, "654321"));
    }

    #[test]
    fn test_demo_code_bypasses_expiry_and_clears_pending() {
        let (mut store, clock) = demo_store();
        store.send_otp("8888888888");
        clock.advance(Duration::minutes(10));

        assert!(store.verify_otp(PHONE, "123456"));
        assert!(store.pending_otp().is_none());
    }

    #[tokio::test]
    async fn test_login_with_otp_provisions_account() {
        let (mut store, _) = demo_store();
        let grant = store.send_otp(PHONE);

        assert!(store.login_with_otp(PHONE, &grant.code).await);
        let user = store.current_user().unwrap().clone();
        assert_eq!(user.phone, PHONE);
        assert!(user.name.is_none());

        let record = &store.users()[PHONE];
        let placeholder = password::reveal(&record.password).unwrap();
        assert!(placeholder.starts_with(password::PLACEHOLDER_PREFIX));

        // Second login reuses the account.
        store.logout();
        assert!(store.login_with_otp(PHONE, "123456").await);
        assert_eq!(store.current_user(), Some(&user));
        assert_eq!(store.users().len(), 1);
    }

    #[tokio::test]
    async fn test_login_with_otp_existing_account_keeps_password() {
        let (mut store, _) = strict_store();
        assert!(store.signup(PHONE, "secret", Some("Asha")).await);
        store.logout();

        let grant = store.send_otp(PHONE);
        assert!(store.login_with_otp(PHONE, &grant.code).await);
        assert_eq!(
            store.current_user().unwrap().name.as_deref(),
            Some("Asha")
        );

        store.logout();
        assert!(store.login(PHONE, "secret").await);
    }

    #[tokio::test]
    async fn test_login_with_bad_otp() {
        let (mut store, _) = strict_store();
        store.send_otp(PHONE);
        assert!(!store.login_with_otp(PHONE, "abcdef").await);
        assert!(!store.is_authenticated());
        assert!(store.users().is_empty());
    }

    #[tokio::test]
    async fn test_reset_password() {
        let (mut store, _) = demo_store();
        assert!(!store.reset_password(PHONE, "new"));

        assert!(store.signup(PHONE, "old", None).await);
        assert!(store.reset_password(PHONE, "new"));
        assert!(store.is_authenticated());

        store.logout();
        assert!(!store.login(PHONE, "old").await);
        assert!(store.login(PHONE, "new").await);
    }

    #[tokio::test]
    async fn test_logout_idempotent() {
        let (mut store, _) = demo_store();
        assert!(store.signup(PHONE, "secret", None).await);
        store.send_otp(PHONE);

        store.logout();
        assert!(!store.is_authenticated());
        assert!(store.pending_otp().is_none());
        assert_eq!(store.storage().get(SESSION_KEY).unwrap(), None);

        store.logout();
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_session_restored_on_construction() {
        let (mut store, _) = demo_store();
        assert!(store.signup(PHONE, "secret", None).await);
        let user = store.current_user().cloned();

        let (restored, _) = store_with(store.into_storage(), AuthConfig::without_delays());
        assert!(restored.is_authenticated());
        assert_eq!(restored.current_user().cloned(), user);
        assert_eq!(restored.users().len(), 1);
    }

    #[test]
    fn test_corrupt_session_is_cleared() {
        let mut storage = MemoryStore::new();
        storage.set(SESSION_KEY, "{not json").unwrap();

        let (store, _) = store_with(storage, AuthConfig::without_delays());
        assert!(!store.is_authenticated());
        assert_eq!(store.storage().get(SESSION_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_users_treated_as_empty() {
        let mut storage = MemoryStore::new();
        storage.set(USERS_KEY, "[1, 2").unwrap();

        let (mut store, _) = store_with(storage, AuthConfig::without_delays());
        assert!(store.users().is_empty());
        assert!(!store.login(PHONE, "secret").await);

        assert!(store.signup(PHONE, "secret", None).await);
        let raw = store.storage().get(USERS_KEY).unwrap().unwrap();
        let users: Users = serde_json::from_str(&raw).unwrap();
        assert!(users.contains_key(PHONE));
    }

    #[tokio::test]
    async fn test_failing_storage_keeps_memory_state() {
        let (mut store, _) = store_with(FailingStore, AuthConfig::without_delays());
        assert!(!store.is_authenticated());

        assert!(store.signup(PHONE, "secret", None).await);
        assert!(store.is_authenticated());
        assert!(!store.signup(PHONE, "secret", None).await);

        store.logout();
        assert!(!store.is_authenticated());
        assert!(store.login(PHONE, "secret").await);
        assert!(store.reset_password(PHONE, "fresh"));
    }

    #[tokio::test]
    async fn test_signup_waits_configured_delay() {
        let config = AuthConfig {
            signup_delay_ms: 30,
            ..AuthConfig::without_delays()
        };
        let (mut store, _) = store_with(MemoryStore::new(), config);

        let started = std::time::Instant::now();
        assert!(store.signup(PHONE, "secret", None).await);
        assert!(started.elapsed() >= std::time::Duration::from_millis(30));
    }

    #[test]
    fn test_user_json_shape() {
        let user: User = serde_json::from_str(
            r#"{"id":"user_1730624400000","phone":"9999999999","createdAt":"2024-11-03T09:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(user.created_at, start());
        assert!(user.name.is_none());

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["createdAt"], "2024-11-03T09:00:00Z");
        assert!(json.get("name").is_none());
    }
}
