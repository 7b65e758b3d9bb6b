use chrono::Utc;
use tracing::{info, warn};

use super::{MarketplaceService, ServiceError};
use crate::marketplace::credentials::{hash_password, verify_password};
use crate::marketplace::domain::{Profile, ProfileUpdate, User, UserId, UserRole, UserStatus};
use crate::marketplace::input::{LoginInput, RegisterInput};
use crate::marketplace::photos::PhotoStorage;
use crate::marketplace::repository::{MarketplaceStore, RepositoryError};

const USER_EXISTS: &str = "User already exists";
const BAD_CREDENTIALS: &str = "Invalid email or password";
const ADMIN_SIGNUP_DISABLED: &str = "Admin registration is disabled";

/// Account plus the bearer token issued for it.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

impl<S, P> MarketplaceService<S, P>
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    /// Create an account and sign it in. New accounts start out pending moderation.
    pub fn register(&self, input: RegisterInput) -> Result<AuthSession, ServiceError> {
        let registration = input.validate()?;
        if registration.role == UserRole::Admin && !self.policy.allow_admin_signup {
            return Err(ServiceError::Validation(ADMIN_SIGNUP_DISABLED.to_string()));
        }

        if self
            .store
            .find_user_by_email(&registration.email)?
            .is_some()
        {
            return Err(ServiceError::Validation(USER_EXISTS.to_string()));
        }

        let user = User {
            id: UserId::generate(),
            email: registration.email,
            password_hash: hash_password(&registration.password)?,
            role: registration.role,
            status: UserStatus::Pending,
            profile: Profile::for_role(registration.role),
            created_at: Utc::now(),
        };

        let user = match self.store.insert_user(user) {
            Ok(user) => user,
            Err(RepositoryError::Conflict) => {
                return Err(ServiceError::Validation(USER_EXISTS.to_string()))
            }
            Err(other) => return Err(other.into()),
        };

        info!(user_id = %user.id, role = %user.role, "account registered");
        let token = self.tokens.issue(&user.id)?;
        Ok(AuthSession { token, user })
    }

    pub fn login(&self, input: LoginInput) -> Result<AuthSession, ServiceError> {
        let (email, password) = input.validate()?;

        let user = match self.store.find_user_by_email(&email)? {
            Some(user) if verify_password(&password, &user.password_hash)? => user,
            _ => {
                warn!("rejected login attempt");
                return Err(ServiceError::Unauthorized(BAD_CREDENTIALS));
            }
        };

        let token = self.tokens.issue(&user.id)?;
        Ok(AuthSession { token, user })
    }

    pub fn update_profile(
        &self,
        actor: &User,
        update: ProfileUpdate,
    ) -> Result<User, ServiceError> {
        self.store
            .modify_user(&actor.id, |user| user.profile.merge(update))?
            .ok_or(ServiceError::NotFound("User not found"))
    }

    pub fn user(&self, id: &str) -> Result<User, ServiceError> {
        UserId::parse(id)
            .map(|id| self.store.fetch_user(&id))
            .transpose()?
            .flatten()
            .ok_or(ServiceError::NotFound("User not found"))
    }
}
