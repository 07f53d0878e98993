use axum::extract::State;
use axum::response::Response;

use crate::actions::roles;
use crate::auth::Caller;
use crate::models::RoleAssignment;
use crate::state::AppState;
use crate::utils::response::{empty_success, success};
use crate::utils::{ApiJson, ApiPath, AppError};

pub async fn my_role(State(state): State<AppState>, caller: Caller) -> Result<Response, AppError> {
    let check = roles::check_admin(&state, &caller).await?;
    Ok(success(check, "Role check successful"))
}

pub async fn set_user_role(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(user_id): ApiPath<String>,
    ApiJson(assignment): ApiJson<RoleAssignment>,
) -> Result<Response, AppError> {
    roles::set_role(&state, &caller, &user_id, &assignment.role).await?;
    Ok(empty_success("User role updated successfully"))
}
