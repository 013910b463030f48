use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    repo_types::User,
};
use crate::{db::StoreError, error::ApiError, state::AppState};

pub const REGISTERED: &str = "User registered successfully.";
pub const LOGGED_IN: &str = "Login successful.";

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.-]{1,50}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

fn validate_credentials(username: &str, password: &str) -> Result<(), ApiError> {
    if username.is_empty() || password.is_empty() {
        return Err(ApiError::Validation(
            "Username and password are required.".into(),
        ));
    }
    if !is_valid_username(username) {
        return Err(ApiError::Validation(
            "Username may only contain letters, digits, '.', '_' or '-' (max 50).".into(),
        ));
    }
    Ok(())
}

#[derive(Debug)]
pub struct LoginSuccess {
    pub user: User,
    pub access_token: String,
}

pub async fn register_user(
    st: &AppState,
    username: &str,
    password: &str,
) -> Result<User, ApiError> {
    let username = username.trim();
    validate_credentials(username, password)?;

    if st.users.find_by_username(username).await?.is_some() {
        warn!(%username, "username already taken");
        return Err(ApiError::Conflict("Username already taken.".into()));
    }

    let hash = hash_password(password).map_err(|e| ApiError::Internal(e.to_string()))?;

    match st.users.create(username, &hash).await {
        Ok(user) => {
            info!(user_id = %user.user_id, %username, "user registered");
            Ok(user)
        }
        // Lost a race against a concurrent registration.
        Err(StoreError::UniqueViolation { .. }) => {
            warn!(%username, "username already taken");
            Err(ApiError::Conflict("Username already taken.".into()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login_user(
    st: &AppState,
    username: &str,
    password: &str,
) -> Result<LoginSuccess, ApiError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(ApiError::Validation(
            "Username and password are required.".into(),
        ));
    }

    let Some(mut user) = st.users.find_by_username(username).await? else {
        warn!(%username, "login unknown user");
        return Err(ApiError::NotFound("User not found.".into()));
    };

    if let Some(max_attempts) = st.config.max_login_attempts {
        if user.login_attempts >= max_attempts {
            warn!(%username, attempts = user.login_attempts, "login refused, account locked");
            return Err(ApiError::Locked { max_attempts });
        }
    }

    let ok = verify_password(password, &user.password_hash).map_err(|e| {
        error!(error = %e, user_id = %user.user_id, "stored hash unreadable");
        ApiError::Internal(e.to_string())
    })?;

    if !ok {
        let attempts = st.users.record_failed_login(username).await?;
        warn!(%username, attempts, "login invalid password");
        return Err(ApiError::InvalidCredentials { attempts });
    }

    user.last_login = Some(st.users.record_successful_login(username).await?);
    user.login_attempts = 0;

    let access_token = JwtKeys::from(&st.config.jwt)
        .sign(user.user_id, &user.username)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!(user_id = %user.user_id, %username, "user logged in");
    Ok(LoginSuccess { user, access_token })
}

pub async fn profile(st: &AppState, user_id: Uuid) -> Result<User, ApiError> {
    st.users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use time::OffsetDateTime;

    use super::*;
    use crate::auth::repo::UserRepo;
    use crate::config::AppConfig;
    use crate::db::memory::MemoryStore;

    /// Lookups by name always miss, as if another registration landed after
    /// the pre-check.
    #[derive(Default)]
    struct LateWriter(MemoryStore);

    #[async_trait]
    impl UserRepo for LateWriter {
        async fn create(&self, username: &str, hash: &str) -> Result<User, StoreError> {
            self.0.create(username, hash).await
        }
        async fn find_by_username(&self, _: &str) -> Result<Option<User>, StoreError> {
            Ok(None)
        }
        async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
            self.0.find_by_id(user_id).await
        }
        async fn record_failed_login(&self, username: &str) -> Result<i32, StoreError> {
            self.0.record_failed_login(username).await
        }
        async fn record_successful_login(
            &self,
            username: &str,
        ) -> Result<OffsetDateTime, StoreError> {
            self.0.record_successful_login(username).await
        }
    }

    #[test]
    fn username_rules() {
        assert!(is_valid_username("celestine"));
        assert!(is_valid_username("j.doe-01_x"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username(&"a".repeat(51)));
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let st = AppState::fake();
        register_user(&st, "celestine", "mySecretPassword").await.unwrap();

        let err = register_user(&st, "celestine", "other").await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(err.to_string(), "Username already taken.");
    }

    #[tokio::test]
    async fn registration_stores_hash_not_plaintext() {
        let st = AppState::fake();
        let user = register_user(&st, "  celestine ", "mySecretPassword").await.unwrap();
        assert_eq!(user.username, "celestine");
        assert_eq!(user.login_attempts, 0);
        assert!(user.last_login.is_none());
        assert_ne!(user.password_hash, "mySecretPassword");
        assert!(verify_password("mySecretPassword", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn empty_fields_are_rejected() {
        let st = AppState::fake();
        let err = register_user(&st, "", "pw").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        let err = register_user(&st, "bob", "").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        let err = login_user(&st, "   ", "pw").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let st = AppState::fake();
        let err = login_user(&st, "ghost", "pw").await.err().unwrap();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.to_string(), "User not found.");
    }

    #[tokio::test]
    async fn wrong_password_increments_by_one_each_time() {
        let st = AppState::fake();
        register_user(&st, "celestine", "right").await.unwrap();

        for expected in 1..=3 {
            match login_user(&st, "celestine", "wrong").await {
                Err(ApiError::InvalidCredentials { attempts }) => assert_eq!(attempts, expected),
                other => panic!("expected invalid credentials, got {:?}", other.err()),
            }
        }
        let stored = st.users.find_by_username("celestine").await.unwrap().unwrap();
        assert_eq!(stored.login_attempts, 3);
    }

    #[tokio::test]
    async fn successful_login_resets_attempts_and_stamps_last_login() {
        let st = AppState::fake();
        register_user(&st, "celestine", "right").await.unwrap();
        let _ = login_user(&st, "celestine", "wrong").await;
        let _ = login_user(&st, "celestine", "wrong").await;

        let ok = login_user(&st, "celestine", "right").await.unwrap();
        assert_eq!(ok.user.login_attempts, 0);
        assert!(ok.user.last_login.is_some());
        assert!(!ok.access_token.is_empty());

        let stored = st.users.find_by_username("celestine").await.unwrap().unwrap();
        assert_eq!(stored.login_attempts, 0);
        assert_eq!(stored.last_login, ok.user.last_login);

        let claims = JwtKeys::from(&st.config.jwt).verify(&ok.access_token).unwrap();
        assert_eq!(claims.sub, ok.user.user_id);
    }

    #[tokio::test]
    async fn attempts_never_block_without_threshold() {
        let st = AppState::fake();
        register_user(&st, "celestine", "right").await.unwrap();
        for _ in 0..10 {
            let _ = login_user(&st, "celestine", "wrong").await;
        }
        assert!(login_user(&st, "celestine", "right").await.is_ok());
    }

    #[tokio::test]
    async fn threshold_locks_account() {
        let mut cfg = AppConfig::for_tests();
        cfg.max_login_attempts = Some(2);
        let st = AppState::fake_with(cfg);
        register_user(&st, "celestine", "right").await.unwrap();

        let _ = login_user(&st, "celestine", "wrong").await;
        let _ = login_user(&st, "celestine", "wrong").await;

        let err = login_user(&st, "celestine", "right").await.err().unwrap();
        assert!(matches!(err, ApiError::Locked { max_attempts: 2 }));

        // A locked login does not keep counting.
        let stored = st.users.find_by_username("celestine").await.unwrap().unwrap();
        assert_eq!(stored.login_attempts, 2);
    }

    #[tokio::test]
    async fn profile_of_missing_user_is_unauthorized() {
        let st = AppState::fake();
        let err = profile(&st, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn concurrent_registration_of_same_name_conflicts() {
        let users = Arc::new(LateWriter::default());
        users.create("celestine", "existing-hash").await.unwrap();
        let st = AppState::from_parts(
            Arc::new(AppConfig::for_tests()),
            users as Arc<dyn UserRepo>,
            Arc::new(MemoryStore::default()),
        );

        let err = register_user(&st, "celestine", "mySecretPassword").await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(err.to_string(), "Username already taken.");
    }

    #[tokio::test]
    async fn account_with_bcrypt_hash_can_log_in() {
        let st = AppState::fake();
        let legacy = bcrypt::hash("mySecretPassword", 4).unwrap();
        st.users.create("celestine", &legacy).await.unwrap();

        assert!(matches!(
            login_user(&st, "celestine", "wrong").await,
            Err(ApiError::InvalidCredentials { attempts: 1 })
        ));
        let ok = login_user(&st, "celestine", "mySecretPassword").await.unwrap();
        assert_eq!(ok.user.login_attempts, 0);
    }
}
