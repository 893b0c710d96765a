// 会话与请求通道测试
mod common;

use common::{error_xml, fast_config, task_xml, MockServer, TOKEN};
use vcd_director::{VcdClient, VcdError};

#[tokio::test]
async fn test_login_stores_token() {
    let server = MockServer::start().await;
    server.on_with_headers(
        "POST",
        "/api/sessions",
        200,
        vec![("x-vcloud-authorization", "abc123")],
        r#"<Session xmlns="http://www.vmware.com/vcloud/v1.5" user="admin" org="my-org"/>"#,
    );

    let client = VcdClient::new(&server.url("/api/"), fast_config()).unwrap();
    client.login("my-org", "admin", "secret").await.unwrap();
    assert_eq!(client.token().await.unwrap(), "abc123");

    let login = &server.requests_to("POST", "/api/sessions")[0];
    assert_eq!(login.accept.as_deref(), Some("application/*+xml;version=5.5"));
    // admin@my-org:secret
    assert_eq!(
        login.authorization.as_deref(),
        Some("Basic YWRtaW5AbXktb3JnOnNlY3JldA==")
    );
}

#[tokio::test]
async fn test_login_accepts_access_token_header() {
    let server = MockServer::start().await;
    server.on_with_headers(
        "POST",
        "/api/sessions",
        200,
        vec![("X-VMWARE-VCLOUD-ACCESS-TOKEN", "jwt-token")],
        "<Session/>",
    );

    let client = VcdClient::new(&server.url("/api"), fast_config()).unwrap();
    client.login("my-org", "admin", "secret").await.unwrap();
    assert_eq!(client.token().await.unwrap(), "jwt-token");
}

#[tokio::test]
async fn test_login_rejected() {
    let server = MockServer::start().await;
    server.on(
        "POST",
        "/api/sessions",
        401,
        error_xml(401, "UNAUTHORIZED", "bad credentials"),
    );

    let client = VcdClient::new(&server.url("/api"), fast_config()).unwrap();
    let err = client.login("my-org", "admin", "wrong").await.unwrap_err();
    assert!(matches!(err, VcdError::AuthError(ref msg) if msg.contains("bad credentials")));
    assert!(client.token().await.is_err());
}

#[tokio::test]
async fn test_login_without_token_header() {
    let server = MockServer::start().await;
    server.on("POST", "/api/sessions", 200, "<Session/>");

    let client = VcdClient::new(&server.url("/api"), fast_config()).unwrap();
    let err = client.login("my-org", "admin", "secret").await.unwrap_err();
    assert!(matches!(err, VcdError::AuthError(_)));
}

#[tokio::test]
async fn test_logout_forgets_token() {
    let server = MockServer::start().await;
    server.on("DELETE", "/api/session", 204, "");

    let client = server.client().await;
    client.logout().await.unwrap();

    assert!(client.token().await.is_err());
    let logout = &server.requests_to("DELETE", "/api/session")[0];
    assert_eq!(logout.auth_token.as_deref(), Some(TOKEN));

    // 未登录时登出不发请求
    client.logout().await.unwrap();
    assert_eq!(server.requests_to("DELETE", "/api/session").len(), 1);
}

#[tokio::test]
async fn test_requests_carry_token_and_accept() {
    let server = MockServer::start().await;
    server.on("GET", "/api/task/t-1", 200, task_xml(&server, "t-1", "success"));

    let client = server.client().await;
    let task = client.task(&server.url("/api/task/t-1")).await.unwrap();
    assert_eq!(task.task().status, "success");

    let request = &server.requests()[0];
    assert_eq!(request.auth_token.as_deref(), Some(TOKEN));
    assert_eq!(request.accept.as_deref(), Some("application/*+xml;version=5.5"));
}

#[tokio::test]
async fn test_api_error_carries_server_message() {
    let server = MockServer::start().await;
    server.on(
        "GET",
        "/api/vApp/vapp-1",
        403,
        error_xml(403, "ACCESS_TO_RESOURCE_IS_FORBIDDEN", "Access is forbidden"),
    );

    let client = server.client().await;
    let err = client.vapp(&server.url("/api/vApp/vapp-1")).await.err().unwrap();
    assert_eq!(err.status_code(), Some(403));
    assert!(err.to_string().contains("Access is forbidden"));
}

#[tokio::test]
async fn test_unauthenticated_request_fails_locally() {
    let server = MockServer::start().await;
    let client = VcdClient::new(&server.url("/api"), fast_config()).unwrap();

    let err = client.vapp(&server.url("/api/vApp/vapp-1")).await.err().unwrap();
    assert!(matches!(err, VcdError::AuthError(_)));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_invalid_href() {
    let server = MockServer::start().await;
    let client = server.client().await;

    let err = client.vapp("not-a-url").await.err().unwrap();
    assert!(matches!(err, VcdError::InvalidInput(_)));
}
