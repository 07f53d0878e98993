use tracing::{error, info};

use crate::auth::{Caller, IdentityError, Policy};
use crate::models::{Role, RoleCheck};
use crate::state::AppState;
use crate::utils::AppError;

/// Role of the calling user.
pub async fn check_admin(state: &AppState, caller: &Caller) -> Result<RoleCheck, AppError> {
    let user_id = state.gate.authorize(caller, Policy::Authenticated).await?;
    let role = state.gate.role_of(user_id).await;

    Ok(RoleCheck {
        user_id: user_id.to_string(),
        role,
        is_admin: role == Role::Admin,
    })
}

pub async fn set_role(
    state: &AppState,
    caller: &Caller,
    target_user_id: &str,
    role: &str,
) -> Result<(), AppError> {
    let user_id = state
        .gate
        .authorize(caller, Policy::Admin("assign roles"))
        .await?;
    let role: Role = role.parse().map_err(AppError::Validation)?;

    match state.gate.set_role(target_user_id, role).await {
        Ok(()) => {
            info!(admin_id = %user_id, target = %target_user_id, role = %role, "User role updated");
            Ok(())
        }
        Err(IdentityError::UserNotFound(_)) => Err(AppError::NotFound("User not found".to_string())),
        Err(e) => {
            error!(target = %target_user_id, error = %e, "Failed to update user role");
            Err(AppError::ExternalService("Failed to update user role".to_string()))
        }
    }
}
