//! End-to-end tests over a real gRPC connection backed by the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Channel, Server};
use tonic::Code;
use tonic_types::StatusExt;

use proto::user::{
    CreateUserRequest, DeleteUserRequest, GetUserRequest, ListUsersRequest, UpdateUserRequest,
};
use proto::UserServiceClient;
use user_service_lib::grpc_service;
use user_service_lib::repository::InMemoryUserStore;

async fn spawn_server() -> UserServiceClient<Channel> {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let service = grpc_service(Arc::new(InMemoryUserStore::new()), Duration::from_secs(3));

    tokio::spawn(async move {
        Server::builder()
            .add_service(service)
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    UserServiceClient::connect(format!("http://{addr}"))
        .await
        .unwrap()
}

fn create_request(name: &str, email: &str, age: i32) -> CreateUserRequest {
    CreateUserRequest {
        name: name.to_string(),
        email: email.to_string(),
        age,
    }
}

#[tokio::test]
async fn test_create_and_get() {
    let mut client = spawn_server().await;

    let created = client
        .create_user(create_request("Andrew", "andrew@google.com", 31))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(created.id, 1);
    assert_eq!(created.version, 1);
    assert!(chrono::DateTime::parse_from_rfc3339(&created.created_at).is_ok());

    let fetched = client
        .get_user(GetUserRequest { id: created.id })
        .await
        .unwrap()
        .into_inner();

    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_reports_field_violations() {
    let mut client = spawn_server().await;

    let status = client
        .create_user(create_request("", "andrew.com", 0))
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(status.message(), "invalid request");

    let bad_request = status.get_details_bad_request().unwrap();
    let mut violations: Vec<(String, String)> = bad_request
        .field_violations
        .into_iter()
        .map(|v| (v.field, v.description))
        .collect();
    violations.sort();

    assert_eq!(
        violations,
        vec![
            ("age".to_string(), "must be greater than 0".to_string()),
            ("email".to_string(), "must be a valid email address".to_string()),
            ("name".to_string(), "must be provided".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_get_rejects_non_positive_id() {
    let mut client = spawn_server().await;

    let status = client.get_user(GetUserRequest { id: 0 }).await.unwrap_err();

    assert_eq!(status.code(), Code::InvalidArgument);
}

#[tokio::test]
async fn test_get_missing_user() {
    let mut client = spawn_server().await;

    let status = client.get_user(GetUserRequest { id: 7 }).await.unwrap_err();

    assert_eq!(status.code(), Code::NotFound);
    assert_eq!(status.message(), "user not found");
}

#[tokio::test]
async fn test_list_defaults_and_metadata() {
    let mut client = spawn_server().await;
    for i in 0..3 {
        client
            .create_user(create_request(&format!("User{i}"), &format!("user{i}@example.com"), 20 + i))
            .await
            .unwrap();
    }

    let response = client
        .list_users(ListUsersRequest::default())
        .await
        .unwrap()
        .into_inner();

    let ids: Vec<i64> = response.users.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let metadata = response.metadata.unwrap();
    assert_eq!(metadata.current_page, 1);
    assert_eq!(metadata.page_size, 20);
    assert_eq!(metadata.first_page, 1);
    assert_eq!(metadata.last_page, 1);
    assert_eq!(metadata.total_records, 3);

    let response = client
        .list_users(ListUsersRequest {
            page: Some(1),
            page_size: Some(2),
            sort: Some("-age".to_string()),
        })
        .await
        .unwrap()
        .into_inner();

    let ids: Vec<i64> = response.users.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![3, 2]);
    assert_eq!(response.metadata.unwrap().last_page, 2);
}

#[tokio::test]
async fn test_list_empty_store() {
    let mut client = spawn_server().await;

    let response = client
        .list_users(ListUsersRequest::default())
        .await
        .unwrap()
        .into_inner();

    assert!(response.users.is_empty());
    let metadata = response.metadata.unwrap();
    assert_eq!(metadata.total_records, 0);
    assert_eq!(metadata.current_page, 0);
}

#[tokio::test]
async fn test_list_rejects_unknown_sort() {
    let mut client = spawn_server().await;

    let status = client
        .list_users(ListUsersRequest {
            sort: Some("password".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::InvalidArgument);
    let bad_request = status.get_details_bad_request().unwrap();
    assert_eq!(bad_request.field_violations.len(), 1);
    assert_eq!(bad_request.field_violations[0].field, "sort");
    assert_eq!(bad_request.field_violations[0].description, "invalid sort value");
}

#[tokio::test]
async fn test_update_partial_fields() {
    let mut client = spawn_server().await;
    let created = client
        .create_user(create_request("Andrew", "andrew@google.com", 31))
        .await
        .unwrap()
        .into_inner();

    let updated = client
        .update_user(UpdateUserRequest {
            id: created.id,
            name: Some("John".to_string()),
            email: None,
            age: Some(21),
        })
        .await
        .unwrap()
        .into_inner();

    assert_eq!(updated.name, "John");
    assert_eq!(updated.email, "andrew@google.com");
    assert_eq!(updated.age, 21);
    assert_eq!(updated.version, 2);
    assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
async fn test_update_missing_user() {
    let mut client = spawn_server().await;

    let status = client
        .update_user(UpdateUserRequest {
            id: 5,
            name: Some("John".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::NotFound);
}

#[tokio::test]
async fn test_delete_twice() {
    let mut client = spawn_server().await;
    let created = client
        .create_user(create_request("Andrew", "andrew@google.com", 31))
        .await
        .unwrap()
        .into_inner();

    let deleted = client
        .delete_user(DeleteUserRequest { id: created.id })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(deleted.id, created.id);

    let status = client
        .delete_user(DeleteUserRequest { id: created.id })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
    assert_eq!(status.message(), "user not found");
}
