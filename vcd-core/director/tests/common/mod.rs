// 集成测试公共设施：内置 vCD 模拟服务器
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::Response;
use axum::Router;
use vcd_director::{ClientConfig, VcdClient};

pub const TOKEN: &str = "test-session-token";

/// 预置响应
#[derive(Clone)]
struct Canned {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

/// 服务器记录的请求
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub auth_token: Option<String>,
    pub accept: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Default)]
struct MockState {
    routes: HashMap<(String, String), VecDeque<Canned>>,
    requests: Vec<Recorded>,
}

type Shared = Arc<Mutex<MockState>>;

pub struct MockServer {
    base: String,
    state: Shared,
}

impl MockServer {
    pub async fn start() -> Self {
        // 初始化日志，RUST_LOG 控制级别
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vcd_director=debug")),
            )
            .with_test_writer()
            .try_init();

        let state: Shared = Arc::new(Mutex::new(MockState::default()));
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{}", addr),
            state,
        }
    }

    /// 服务器上某路径的完整 URL
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// 追加一个响应；队列只剩最后一个时重复返回它
    pub fn on(&self, method: &str, path: &str, status: u16, body: impl Into<String>) {
        self.on_with_headers(method, path, status, Vec::new(), body);
    }

    pub fn on_with_headers(
        &self,
        method: &str,
        path: &str,
        status: u16,
        headers: Vec<(&str, &str)>,
        body: impl Into<String>,
    ) {
        let canned = Canned {
            status,
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.into(),
        };
        self.state
            .lock()
            .unwrap()
            .routes
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back(canned);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// 已登录的客户端，轮询间隔缩短到毫秒级
    pub async fn client(&self) -> VcdClient {
        let client = VcdClient::new(&self.url("/api"), fast_config()).unwrap();
        client.set_token(TOKEN).await;
        client
    }
}

pub fn fast_config() -> ClientConfig {
    ClientConfig {
        max_retry_timeout: 5,
        task_poll_interval: Duration::from_millis(10),
        task_timeout: 5,
        status_poll_interval: Duration::from_millis(10),
        ..ClientConfig::default()
    }
}

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    };

    let mut state = state.lock().unwrap();
    state.requests.push(Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        content_type: header("content-type"),
        auth_token: header("x-vcloud-authorization"),
        accept: header("accept"),
        authorization: header("authorization"),
        body,
    });

    let key = (method.to_string(), uri.path().to_string());
    let canned = match state.routes.get_mut(&key) {
        Some(queue) if queue.len() > 1 => queue.pop_front(),
        Some(queue) => queue.front().cloned(),
        None => None,
    };

    let canned = canned.unwrap_or_else(|| Canned {
        status: 404,
        headers: Vec::new(),
        body: error_xml(404, "RESOURCE_NOT_FOUND", &format!("No route for {}", uri.path())),
    });

    let mut builder = Response::builder()
        .status(StatusCode::from_u16(canned.status).unwrap())
        .header("content-type", "application/*+xml;version=5.5");
    for (k, v) in &canned.headers {
        builder = builder.header(k.as_str(), v.as_str());
    }
    builder.body(Body::from(canned.body)).unwrap()
}

// ============================================
// XML 夹具
// ============================================

pub fn error_xml(major: u16, minor: &str, message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Error xmlns="http://www.vmware.com/vcloud/v1.5" minorErrorCode="{minor}" message="{message}" majorErrorCode="{major}"/>"#
    )
}

pub fn task_xml(server: &MockServer, id: &str, status: &str) -> String {
    let href = server.url(&format!("/api/task/{}", id));
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Task xmlns="http://www.vmware.com/vcloud/v1.5" status="{status}" operationName="vappUpdate" name="task"
      href="{href}" id="urn:vcloud:task:{id}" type="application/vnd.vmware.vcloud.task+xml">
    <Link rel="task:cancel" href="{href}/action/cancel"/>
</Task>"#
    )
}

pub fn failed_task_xml(server: &MockServer, id: &str, message: &str) -> String {
    let href = server.url(&format!("/api/task/{}", id));
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Task xmlns="http://www.vmware.com/vcloud/v1.5" status="error" name="task" href="{href}">
    <Error message="{message}" majorErrorCode="500" minorErrorCode="INTERNAL_SERVER_ERROR"/>
</Task>"#
    )
}

/// vApp 文档；`with_vm` 控制是否带一台虚拟机
pub fn vapp_xml(server: &MockServer, status: i32, with_vm: bool) -> String {
    let href = server.url("/api/vApp/vapp-1");
    let vdc = server.url("/api/vdc/vdc-1");
    let vm = server.url("/api/vApp/vm-1");
    let children = if with_vm {
        format!(
            r#"<Children>
        <Vm status="{status}" name="web-01" href="{vm}" type="application/vnd.vmware.vcloud.vm+xml">
            <NetworkConnectionSection href="{vm}/networkConnectionSection/">
                <ovf:Info>Specifies the available VM network connections</ovf:Info>
                <PrimaryNetworkConnectionIndex>0</PrimaryNetworkConnectionIndex>
            </NetworkConnectionSection>
            <StorageProfile href="{vdc}/sp-old" name="silver"/>
            <ovf:ProductSection>
                <ovf:Info>Information about the installed software</ovf:Info>
                <ovf:Property ovf:type="string" ovf:key="hostname" ovf:value="" ovf:userConfigurable="true">
                    <ovf:Value ovf:value="old-host"/>
                </ovf:Property>
                <ovf:Property ovf:type="string" ovf:key="role" ovf:value="web" ovf:userConfigurable="true"/>
            </ovf:ProductSection>
        </Vm>
    </Children>"#
        )
    } else {
        String::new()
    };

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<VApp xmlns="http://www.vmware.com/vcloud/v1.5" xmlns:ovf="http://schemas.dmtf.org/ovf/envelope/1"
      deployed="false" status="{status}" name="web" href="{href}"
      type="application/vnd.vmware.vcloud.vApp+xml">
    <Link rel="up" href="{vdc}" type="application/vnd.vmware.vcloud.vdc+xml"/>
    <Description>web tier</Description>
    <NetworkConfigSection href="{href}/networkConfigSection/">
        <ovf:Info>The configuration parameters for logical networks</ovf:Info>
        <NetworkConfig networkName="org-net">
            <Configuration>
                <ParentNetwork href="{base}/api/admin/network/org-1" name="org-net"/>
                <FenceMode>bridged</FenceMode>
            </Configuration>
            <IsDeployed>true</IsDeployed>
        </NetworkConfig>
    </NetworkConfigSection>
    {children}
</VApp>"#,
        base = server.url(""),
    )
}

pub fn vdc_xml(server: &MockServer) -> String {
    let href = server.url("/api/vdc/vdc-1");
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Vdc xmlns="http://www.vmware.com/vcloud/v1.5" status="1" name="vdc-a" href="{href}">
    <VdcStorageProfiles>
        <VdcStorageProfile href="{href}/sp-gold" name="gold" type="application/vnd.vmware.vcloud.vdcStorageProfile+xml"/>
        <VdcStorageProfile href="{href}/sp-old" name="silver"/>
    </VdcStorageProfiles>
</Vdc>"#
    )
}

pub fn template_xml(server: &MockServer, status: i32) -> String {
    let href = server.url("/api/vAppTemplate/vappTemplate-1");
    let vm = server.url("/api/vAppTemplate/vm-t1");
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<VAppTemplate xmlns="http://www.vmware.com/vcloud/v1.5" xmlns:ovf="http://schemas.dmtf.org/ovf/envelope/1"
    status="{status}" name="centos" href="{href}">
    <Children>
        <Vm name="centos-vm" href="{vm}">
            <NetworkConnectionSection href="{vm}/networkConnectionSection/"
                type="application/vnd.vmware.vcloud.networkConnectionSection+xml">
                <ovf:Info>Specifies the available VM network connections</ovf:Info>
                <PrimaryNetworkConnectionIndex>0</PrimaryNetworkConnectionIndex>
            </NetworkConnectionSection>
        </Vm>
    </Children>
</VAppTemplate>"#
    )
}
