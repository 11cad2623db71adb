//! Controller de usuarios

use validator::Validate;

use crate::dto::user_dto::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::dto::ApiResponse;
use crate::services::user_service::{NewUser, UserUpdate};
use crate::services::UserService;
use crate::store::EntityStore;
use crate::utils::errors::AppResult;

pub struct UserController<S: EntityStore> {
    users: UserService<S>,
}

impl<S: EntityStore> UserController<S> {
    pub fn new(store: S) -> Self {
        Self {
            users: UserService::new(store),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<UserResponse>> {
        let users = self.users.list().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<UserResponse> {
        Ok(self.users.get(id).await?.into())
    }

    pub async fn list_by_role(&self, role: &str) -> AppResult<Vec<UserResponse>> {
        let users = self.users.list_by_role(role).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn search_by_name(&self, name: Option<&str>) -> AppResult<Vec<UserResponse>> {
        let users = self.users.search_by_name(name.unwrap_or("")).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn create(&self, request: CreateUserRequest) -> AppResult<ApiResponse<UserResponse>> {
        request.validate()?;

        let user = self
            .users
            .create(NewUser {
                username: request.username,
                name: request.name,
                role: request.role,
                email: request.email,
                phone: request.phone,
            })
            .await?;

        Ok(ApiResponse::success_with_message(
            user.into(),
            "Usuario creado exitosamente".to_string(),
        ))
    }

    pub async fn update(
        &self,
        id: &str,
        request: UpdateUserRequest,
    ) -> AppResult<ApiResponse<UserResponse>> {
        request.validate()?;

        let user = self
            .users
            .update(
                id,
                UserUpdate {
                    username: request.username,
                    name: request.name,
                    role: request.role,
                    email: request.email,
                    phone: request.phone,
                    status: request.status,
                },
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            user.into(),
            "Usuario actualizado exitosamente".to_string(),
        ))
    }

    pub async fn update_status(&self, id: &str, status: &str) -> AppResult<UserResponse> {
        Ok(self.users.update_status(id, status).await?.into())
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.users.delete(id).await
    }
}
