use crate::models::auth::responses::UserInfoResponse;
use crate::models::users::entities::User;
use crate::services::authorization::role_permissions;

/// 当前用户及其角色权限
pub fn me(user: User) -> UserInfoResponse {
    let permissions = role_permissions(user.role).to_vec();
    UserInfoResponse { user, permissions }
}
