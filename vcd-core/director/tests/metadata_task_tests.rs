// 元数据与任务集成测试
mod common;

use std::time::Duration;

use common::{failed_task_xml, fast_config, task_xml, vapp_xml, MockServer, TOKEN};
use vcd_director::{MetadataType, TaskStatus, TypedValue, VcdClient, VcdError};

const VAPP: &str = "/api/vApp/vapp-1";

#[tokio::test]
async fn test_metadata_get_add_delete() {
    let server = MockServer::start().await;
    server.on("GET", VAPP, 200, vapp_xml(&server, 8, true));
    server.on(
        "GET",
        "/api/vApp/vapp-1/metadata/",
        200,
        r#"<Metadata xmlns="http://www.vmware.com/vcloud/v1.5" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
            <MetadataEntry>
                <Key>env</Key>
                <TypedValue xsi:type="MetadataStringValue"><Value>prod</Value></TypedValue>
            </MetadataEntry>
        </Metadata>"#,
    );
    server.on("PUT", "/api/vApp/vapp-1/metadata/env", 202, task_xml(&server, "t-m1", "running"));
    server.on("DELETE", "/api/vApp/vapp-1/metadata/env", 202, task_xml(&server, "t-m2", "running"));

    let client = server.client().await;
    let vapp = client.vapp(&server.url(VAPP)).await.unwrap();

    let metadata = vapp.metadata().await.unwrap();
    assert_eq!(metadata.get("env").map(|v| v.value.as_str()), Some("prod"));

    vapp.add_metadata("env", "staging").await.unwrap();
    vapp.delete_metadata("env").await.unwrap();

    let put = &server.requests_to("PUT", "/api/vApp/vapp-1/metadata/env")[0];
    assert_eq!(
        put.content_type.as_deref(),
        Some("application/vnd.vmware.vcloud.metadata.value+xml")
    );
    assert!(put.body.contains("<MetadataValue "));
    assert!(put.body.contains("xsi:type=\"MetadataStringValue\""));
    assert!(put.body.contains("<Value>staging</Value>"));

    assert_eq!(server.requests_to("DELETE", "/api/vApp/vapp-1/metadata/env").len(), 1);
}

#[tokio::test]
async fn test_typed_metadata_on_any_resource() {
    let server = MockServer::start().await;
    server.on(
        "PUT",
        "/api/vdc/vdc-1/metadata/max%20vms",
        202,
        task_xml(&server, "t-m3", "running"),
    );

    let client = server.client().await;
    client
        .metadata(&server.url("/api/vdc/vdc-1"))
        .add_typed("max vms", TypedValue::new(MetadataType::Number, "20"))
        .await
        .unwrap();

    let put = &server.requests_to("PUT", "/api/vdc/vdc-1/metadata/max%20vms")[0];
    assert!(put.body.contains("xsi:type=\"MetadataNumberValue\""));
    assert!(put.body.contains("<Value>20</Value>"));
}

#[tokio::test]
async fn test_task_wait_success() {
    let server = MockServer::start().await;
    server.on("GET", "/api/task/t-1", 200, task_xml(&server, "t-1", "queued"));
    server.on("GET", "/api/task/t-1", 200, task_xml(&server, "t-1", "running"));
    server.on("GET", "/api/task/t-1", 200, task_xml(&server, "t-1", "success"));

    let client = server.client().await;
    let mut task = client.task(&server.url("/api/task/t-1")).await.unwrap();
    assert_eq!(task.task().task_status(), TaskStatus::Queued);

    task.wait_completion().await.unwrap();
    assert_eq!(task.task().task_status(), TaskStatus::Success);
    assert_eq!(server.requests_to("GET", "/api/task/t-1").len(), 3);
}

#[tokio::test]
async fn test_task_wait_error() {
    let server = MockServer::start().await;
    server.on("GET", "/api/task/t-2", 200, task_xml(&server, "t-2", "running"));
    server.on("GET", "/api/task/t-2", 200, failed_task_xml(&server, "t-2", "disk full"));

    let client = server.client().await;
    let mut task = client.task(&server.url("/api/task/t-2")).await.unwrap();

    let err = task.wait_completion().await.unwrap_err();
    assert!(matches!(err, VcdError::TaskFailed(ref msg) if msg == "disk full"));
}

#[tokio::test]
async fn test_task_wait_canceled_is_not_failure() {
    let server = MockServer::start().await;
    server.on("GET", "/api/task/t-3", 200, task_xml(&server, "t-3", "canceled"));

    let client = server.client().await;
    let mut task = client.task(&server.url("/api/task/t-3")).await.unwrap();
    task.wait_completion().await.unwrap();
    assert_eq!(task.task().task_status(), TaskStatus::Canceled);
}

#[tokio::test]
async fn test_task_wait_unrecognized_status_ends_wait() {
    let server = MockServer::start().await;
    server.on("GET", "/api/task/t-6", 200, task_xml(&server, "t-6", "running"));
    server.on("GET", "/api/task/t-6", 200, task_xml(&server, "t-6", "paused"));

    let client = server.client().await;
    let mut task = client.task(&server.url("/api/task/t-6")).await.unwrap();
    task.wait_completion().await.unwrap();

    assert_eq!(task.task().task_status(), TaskStatus::Unknown);
    // 保留服务端原始状态
    assert_eq!(task.task().status, "paused");
    assert_eq!(server.requests_to("GET", "/api/task/t-6").len(), 2);
}

#[tokio::test]
async fn test_task_wait_timeout() {
    let server = MockServer::start().await;
    server.on("GET", "/api/task/t-4", 200, task_xml(&server, "t-4", "running"));

    let mut config = fast_config();
    config.task_timeout = 0;
    config.task_poll_interval = Duration::from_millis(10);
    let client = VcdClient::new(&server.url("/api"), config).unwrap();
    client.set_token(TOKEN).await;

    let mut task = client.task(&server.url("/api/task/t-4")).await.unwrap();
    let err = task.wait_completion().await.unwrap_err();
    assert!(matches!(err, VcdError::Timeout(_)));
}

#[tokio::test]
async fn test_task_cancel() {
    let server = MockServer::start().await;
    server.on("GET", "/api/task/t-5", 200, task_xml(&server, "t-5", "running"));
    server.on("POST", "/api/task/t-5/action/cancel", 204, "");

    let client = server.client().await;
    let task = client.task(&server.url("/api/task/t-5")).await.unwrap();
    task.cancel().await.unwrap();

    assert_eq!(server.requests_to("POST", "/api/task/t-5/action/cancel").len(), 1);
}
