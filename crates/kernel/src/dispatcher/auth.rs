//! Registration, login, and logout.

use tracing::{info, warn};

use super::operation::CredentialsArgs;
use super::result::AuthPayload;
use super::{Dispatcher, MAX_TEXT_LEN, bounded, required};
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::models::user::verify_dummy_password;

/// Message for every failed login. It never says which half was wrong.
const INVALID_CREDENTIALS: &str = "invalid email or password";

impl Dispatcher {
    /// Register the one and only account.
    pub(super) async fn register(&self, args: CredentialsArgs) -> AppResult<User> {
        if self.users.count_users().await? >= 1 {
            return Err(AppError::Forbidden(
                "registration is closed: an account already exists".to_string(),
            ));
        }

        let email = bounded("email", required("email", &args.email)?, MAX_TEXT_LEN)?;
        required("password", &args.password)?;

        let user = self.users.create_user(email, &args.password).await?;
        info!(user_id = %user.id, "account registered");

        Ok(user)
    }

    /// Exchange credentials for a session token.
    pub(super) async fn login(&self, args: CredentialsArgs) -> AppResult<AuthPayload> {
        let email = args.email.trim();

        // A NUL can never match a stored email and Postgres refuses it as a bind.
        let lookup = if email.contains('\0') {
            Err(AppError::NotFound("user".to_string()))
        } else {
            self.users.get_user_by_email(email).await
        };

        let user = match lookup {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => {
                verify_dummy_password(&args.password);
                warn!("login failed");
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
            Err(e) => return Err(e),
        };

        if !self.users.check_password(&user, &args.password) {
            warn!("login failed");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.sessions.create_session(user.id, &user.email)?;
        info!(user_id = %user.id, "user logged in");

        Ok(AuthPayload { token, user })
    }

    /// Drop the caller's session. Idempotent.
    pub(super) fn logout(&self, token: Option<&str>) -> bool {
        if let Some(token) = token {
            self.sessions.delete_session(token);
            info!("user logged out");
        }
        true
    }
}
