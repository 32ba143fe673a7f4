use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use axum_helpers::{AppError, CurrentUser, JwtAuth, TokenAuthenticator};
use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, User};
use crate::repository::UserRepository;

/// Registration, login and bearer-token authentication
pub struct AuthService<R: UserRepository> {
    repository: Arc<R>,
    jwt: JwtAuth,
}

impl<R: UserRepository> Clone for AuthService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            jwt: self.jwt.clone(),
        }
    }
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(repository: R, jwt: JwtAuth) -> Self {
        Self {
            repository: Arc::new(repository),
            jwt,
        }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterRequest) -> UserResult<AuthResponse> {
        input.validate()?;

        if self.repository.get_by_email(&input.email).await?.is_some() {
            return Err(UserError::DuplicateEmail(input.email));
        }

        let password_hash = hash_password(&input.password)?;
        let user = self
            .repository
            .create(User::new(input.name, &input.email, password_hash))
            .await?;

        self.issue(user, "User registered successfully")
    }

    /// Unknown email and wrong password fail identically.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginRequest) -> UserResult<AuthResponse> {
        input.validate()?;

        let user = self
            .repository
            .get_by_email(&input.email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }

        self.issue(user, "Login successful")
    }

    /// Resolves a bearer token to a stored user.
    #[instrument(skip_all)]
    pub async fn authenticate_token(&self, token: &str) -> UserResult<User> {
        let claims = self.jwt.verify_token(token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected token");
            UserError::InvalidToken("Invalid or expired token".to_string())
        })?;

        let user_id = claims
            .user_id()
            .ok_or_else(|| UserError::InvalidToken("Invalid token subject".to_string()))?;

        self.repository
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| UserError::InvalidToken("User not found".to_string()))
    }

    fn issue(&self, user: User, message: &str) -> UserResult<AuthResponse> {
        let access_token = self
            .jwt
            .create_token(user.id, &user.email)
            .map_err(|e| UserError::TokenSigning(e.to_string()))?;

        Ok(AuthResponse {
            message: message.to_string(),
            access_token,
            user: user.into(),
        })
    }
}

#[async_trait]
impl<R: UserRepository + 'static> TokenAuthenticator for AuthService<R> {
    async fn authenticate(&self, token: &str) -> Result<CurrentUser, AppError> {
        Ok(self.authenticate_token(token).await?.into())
    }
}

pub fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
