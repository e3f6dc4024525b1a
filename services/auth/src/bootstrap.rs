//! First-boot admin account

use common::ServiceResult;
use tracing::{info, warn};

use crate::{
    models::{NewUser, User},
    repositories::UserRepository,
};

pub const ADMIN_USERNAME: &str = "admin";

/// Make sure the admin account exists with a usable password hash and
/// its default categories.
pub async fn ensure_admin(users: &UserRepository, password: &str) -> ServiceResult<User> {
    let admin = match users.find_by_username(ADMIN_USERNAME).await? {
        Some(admin) if UserRepository::is_valid_hash(&admin.password_hash) => {
            users.seed_defaults(admin.id).await?;
            admin
        }
        Some(admin) => {
            warn!("Admin password hash is not a valid PHC string, re-hashing");
            let hash = UserRepository::hash_password(password)?;
            users.update_password_hash(admin.id, &hash).await?;
            users.seed_defaults(admin.id).await?;
            users.find_by_id(admin.id).await?.unwrap_or(admin)
        }
        None => {
            info!("Creating admin account");
            users
                .create(&NewUser {
                    username: ADMIN_USERNAME.to_string(),
                    password_hash: UserRepository::hash_password(password)?,
                    first_name: Some("Admin".to_string()),
                    last_name: Some("User".to_string()),
                })
                .await?
        }
    };

    Ok(admin)
}
