use std::sync::Arc;

use domains::{DomainError, Identity, PasswordHasher, Result, TokenIssuer, User, UserRepository};
use tracing::{info, warn};

use crate::validation;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Registration, login and account lookup.
pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self { users, hasher, tokens }
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<User> {
        let username = validation::username(username)?;
        validation::password(password)?;

        let hash = self.hasher.hash(password)?;
        let user = self.users.create(&username, &hash).await?;
        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Returns a bearer token and the account it was issued for.
    pub async fn login(&self, username: &str, password: &str) -> Result<(String, User)> {
        let username = username.trim();
        if username.is_empty() || password.trim().is_empty() {
            return Err(DomainError::Validation("Username and password are required fields".into()));
        }

        let user = match self.users.find_by_username(username).await? {
            Some(user) => user,
            None => return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.into())),
        };
        if !self.hasher.verify(password, &user.password_hash) {
            warn!(user_id = user.id, "login with bad password");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        let token = self.tokens.issue(&user)?;
        Ok((token, user))
    }

    /// Resolves a bearer token to the caller it was issued for.
    pub fn authenticate(&self, token: &str) -> Result<Identity> {
        self.tokens.verify(token)
    }

    pub async fn get(&self, id: i64) -> Result<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(DomainError::not_found("User", id))
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        self.users.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{MockPasswordHasher, MockTokenIssuer, MockUserRepository};
    use mockall::predicate::eq;

    fn user(id: i64, username: &str) -> User {
        User { id, username: username.into(), password_hash: "hashed".into(), created_at: Utc::now() }
    }

    #[tokio::test]
    async fn register_hashes_before_storing() {
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_hash().with(eq("password123")).returning(|_| Ok("hashed".into()));

        let mut users = MockUserRepository::new();
        users
            .expect_create()
            .with(eq("john_doe"), eq("hashed"))
            .times(1)
            .returning(|name, _| Ok(user(1, name)));

        let svc = UserService::new(Arc::new(users), Arc::new(hasher), Arc::new(MockTokenIssuer::new()));
        let created = svc.register("  john_doe ", "password123").await.unwrap();
        assert_eq!(created.username, "john_doe");
    }

    #[tokio::test]
    async fn register_validates_input() {
        let svc = UserService::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockPasswordHasher::new()),
            Arc::new(MockTokenIssuer::new()),
        );
        assert!(matches!(svc.register("jo", "password123").await, Err(DomainError::Validation(_))));
        assert!(matches!(svc.register("john_doe", "short").await, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn login_rejects_unknown_user_and_bad_password_alike() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|name| Ok((name == "john_doe").then(|| user(1, name))));
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_verify().returning(|_, _| false);

        let svc = UserService::new(Arc::new(users), Arc::new(hasher), Arc::new(MockTokenIssuer::new()));
        let unknown = svc.login("nobody", "password123").await.unwrap_err();
        let wrong = svc.login("john_doe", "wrong-password").await.unwrap_err();
        assert_eq!(unknown, wrong);
        assert_eq!(unknown, DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    #[tokio::test]
    async fn login_issues_token() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|name| Ok(Some(user(1, name))));
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_verify().with(eq("password123"), eq("hashed")).returning(|_, _| true);
        let mut tokens = MockTokenIssuer::new();
        tokens.expect_issue().returning(|u| Ok(format!("token-for-{}", u.id)));

        let svc = UserService::new(Arc::new(users), Arc::new(hasher), Arc::new(tokens));
        let (token, user) = svc.login("john_doe", "password123").await.unwrap();
        assert_eq!(token, "token-for-1");
        assert_eq!(user.id, 1);
    }
}
