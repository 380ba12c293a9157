//! Admin session gate
//!
//! A single shared secret unlocks the admin surface. A successful login
//! stores its time (milliseconds since the epoch) under [`ADMIN_AUTH_TIME`];
//! the session stays valid for [`SESSION_TTL_MS`] after that.

use encore_core::{PreferenceStore, Result};
use std::sync::Arc;

/// Preference key holding the last login time
pub const ADMIN_AUTH_TIME: &str = "adminAuthTime";

/// Session lifetime: 7 days
pub const SESSION_TTL_MS: i64 = 604_800_000;

/// Current time in milliseconds since the epoch
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Result of a login attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Secret matched; session recorded
    Granted,

    /// Nothing was entered
    EmptyInput,

    /// Secret did not match
    Rejected,
}

/// Login gate over a preference store
pub struct AdminSession<P: PreferenceStore + ?Sized> {
    preferences: Arc<P>,
    secret: String,
}

impl<P: PreferenceStore + ?Sized> AdminSession<P> {
    pub fn new(preferences: Arc<P>, secret: impl Into<String>) -> Self {
        Self {
            preferences,
            secret: secret.into(),
        }
    }

    /// Check `input` against the secret and record the login time on success
    ///
    /// Surrounding whitespace in `input` is ignored.
    ///
    /// # Errors
    /// Returns an error if the login time cannot be stored
    pub async fn login(&self, input: &str, now_ms: i64) -> Result<LoginOutcome> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(LoginOutcome::EmptyInput);
        }

        if input != self.secret {
            tracing::warn!("Admin login rejected");
            return Ok(LoginOutcome::Rejected);
        }

        self.preferences
            .set_preference(ADMIN_AUTH_TIME, &now_ms.to_string())
            .await?;
        tracing::info!("Admin login granted");

        Ok(LoginOutcome::Granted)
    }

    /// Whether a login happened less than [`SESSION_TTL_MS`] before `now_ms`
    ///
    /// # Errors
    /// Returns an error if the preference store cannot be read
    pub async fn is_authenticated(&self, now_ms: i64) -> Result<bool> {
        let Some(stamp) = self.preferences.get_preference(ADMIN_AUTH_TIME).await? else {
            return Ok(false);
        };

        match stamp.trim().parse::<i64>() {
            Ok(logged_in_at) => Ok(now_ms.saturating_sub(logged_in_at) < SESSION_TTL_MS),
            Err(_) => {
                tracing::warn!("Ignoring unreadable {} value {:?}", ADMIN_AUTH_TIME, stamp);
                Ok(false)
            }
        }
    }

    /// Forget the recorded login
    ///
    /// # Errors
    /// Returns an error if the preference cannot be removed
    pub async fn logout(&self) -> Result<()> {
        self.preferences.remove_preference(ADMIN_AUTH_TIME).await?;
        tracing::info!("Admin logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryPreferences(Mutex<HashMap<String, String>>);

    #[async_trait]
    impl PreferenceStore for MemoryPreferences {
        async fn get_preference(&self, key: &str) -> Result<Option<String>> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        async fn set_preference(&self, key: &str, value: &str) -> Result<()> {
            self.0.lock().unwrap().insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn remove_preference(&self, key: &str) -> Result<()> {
            self.0.lock().unwrap().remove(key);
            Ok(())
        }
    }

    fn session() -> (Arc<MemoryPreferences>, AdminSession<MemoryPreferences>) {
        let preferences = Arc::new(MemoryPreferences::default());
        let session = AdminSession::new(Arc::clone(&preferences), "letmein");
        (preferences, session)
    }

    #[tokio::test]
    async fn login_trims_and_records_time() {
        let (preferences, session) = session();

        let outcome = session.login("  letmein \n", 1_000).await.unwrap();

        assert_eq!(outcome, LoginOutcome::Granted);
        assert_eq!(
            preferences.get_preference(ADMIN_AUTH_TIME).await.unwrap(),
            Some("1000".to_string())
        );
    }

    #[tokio::test]
    async fn empty_and_wrong_input_are_refused() {
        let (preferences, session) = session();

        assert_eq!(session.login("   ", 0).await.unwrap(), LoginOutcome::EmptyInput);
        assert_eq!(session.login("nope", 0).await.unwrap(), LoginOutcome::Rejected);
        assert_eq!(preferences.get_preference(ADMIN_AUTH_TIME).await.unwrap(), None);
    }

    #[tokio::test]
    async fn session_expires_after_seven_days() {
        let (_, session) = session();
        let start = 1_700_000_000_000;
        session.login("letmein", start).await.unwrap();

        assert!(session.is_authenticated(start).await.unwrap());
        assert!(session.is_authenticated(start + SESSION_TTL_MS - 1).await.unwrap());
        assert!(!session.is_authenticated(start + SESSION_TTL_MS).await.unwrap());
    }

    #[tokio::test]
    async fn logout_ends_session() {
        let (_, session) = session();
        session.login("letmein", 10).await.unwrap();

        session.logout().await.unwrap();

        assert!(!session.is_authenticated(10).await.unwrap());
    }

    #[tokio::test]
    async fn garbage_timestamp_is_not_a_session() {
        let (preferences, session) = session();
        preferences.set_preference(ADMIN_AUTH_TIME, "yesterday").await.unwrap();

        assert!(!session.is_authenticated(0).await.unwrap());
    }
}
