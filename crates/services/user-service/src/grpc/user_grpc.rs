//! gRPC implementation for UserService.

use std::sync::Arc;

use tonic::{Request, Response, Status};

use crate::service::UserService;
use domain::{CreateUser, Filters, MetaData, UserUpdate};
use proto::user::{
    user_service_server::UserService as UserServiceProto, CreateUserRequest, DeleteUserRequest,
    GetUserRequest, ListUsersRequest, ListUsersResponse, MetaData as MetaDataProto,
    UpdateUserRequest, UserResponse,
};

/// gRPC service wrapper for UserService.
pub struct UserGrpcService {
    service: Arc<dyn UserService>,
}

impl UserGrpcService {
    /// Create a new gRPC service wrapper.
    pub fn new(service: Arc<dyn UserService>) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl UserServiceProto for UserGrpcService {
    async fn create_user(
        &self,
        request: Request<CreateUserRequest>,
    ) -> Result<Response<UserResponse>, Status> {
        let req = request.into_inner();
        let input = CreateUser {
            name: req.name,
            email: req.email,
            age: req.age,
        };

        let user = self.service.create_user(input).await.map_err(Status::from)?;
        Ok(Response::new(user_to_proto(&user)))
    }

    async fn get_user(
        &self,
        request: Request<GetUserRequest>,
    ) -> Result<Response<UserResponse>, Status> {
        let req = request.into_inner();

        let user = self.service.get_user(req.id).await.map_err(Status::from)?;
        Ok(Response::new(user_to_proto(&user)))
    }

    async fn list_users(
        &self,
        request: Request<ListUsersRequest>,
    ) -> Result<Response<ListUsersResponse>, Status> {
        let req = request.into_inner();
        let filters = Filters::from_params(
            req.page.map(i64::from),
            req.page_size.map(i64::from),
            req.sort,
        );

        let (users, metadata) = self
            .service
            .list_users(filters)
            .await
            .map_err(Status::from)?;

        Ok(Response::new(ListUsersResponse {
            users: users.iter().map(user_to_proto).collect(),
            metadata: Some(metadata_to_proto(&metadata)),
        }))
    }

    async fn delete_user(
        &self,
        request: Request<DeleteUserRequest>,
    ) -> Result<Response<UserResponse>, Status> {
        let req = request.into_inner();

        let user = self.service.delete_user(req.id).await.map_err(Status::from)?;
        Ok(Response::new(user_to_proto(&user)))
    }

    async fn update_user(
        &self,
        request: Request<UpdateUserRequest>,
    ) -> Result<Response<UserResponse>, Status> {
        let req = request.into_inner();
        let changes = UserUpdate {
            name: req.name,
            email: req.email,
            age: req.age,
        };

        let user = self
            .service
            .update_user(req.id, changes)
            .await
            .map_err(Status::from)?;
        Ok(Response::new(user_to_proto(&user)))
    }
}

/// Convert domain User to proto UserResponse.
fn user_to_proto(user: &domain::User) -> UserResponse {
    UserResponse {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        age: user.age,
        version: user.version,
        created_at: user.created_at.to_rfc3339(),
    }
}

fn metadata_to_proto(meta: &MetaData) -> MetaDataProto {
    MetaDataProto {
        current_page: meta.current_page,
        page_size: meta.page_size,
        first_page: meta.first_page,
        last_page: meta.last_page,
        total_records: meta.total_records,
    }
}
