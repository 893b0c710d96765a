//! vCloud Director 客户端核心实现

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::api::{MetadataApi, TaskApi, VAppApi, VdcApi};
use crate::error::{Result, VcdError};
use crate::models::{Task, VApp, VAppTemplate, VcdErrorDocument};
use crate::xml::{from_xml, href_with_suffix, to_xml};

/// 认证令牌请求头
pub const AUTH_HEADER: &str = "x-vcloud-authorization";

/// 新版本服务端返回的访问令牌头
pub const ACCESS_TOKEN_HEADER: &str = "X-VMWARE-VCLOUD-ACCESS-TOKEN";

/// vCloud Director 客户端配置
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// 连接超时（秒）
    pub connect_timeout: u64,

    /// 请求超时（秒）
    pub request_timeout: u64,

    /// 是否验证 SSL 证书
    pub verify_ssl: bool,

    /// API 版本（写入 Accept 头）
    pub api_version: String,

    /// 开机前等待 vApp 脱离 UNRESOLVED 状态的最长时间（秒）
    pub max_retry_timeout: u64,

    /// 任务轮询间隔
    pub task_poll_interval: Duration,

    /// 等待任务完成的最长时间（秒）
    pub task_timeout: u64,

    /// vApp 状态轮询间隔
    pub status_poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: 10,
            request_timeout: 60,
            verify_ssl: true,
            api_version: "5.5".to_string(),
            max_retry_timeout: 60,
            task_poll_interval: Duration::from_secs(3),
            task_timeout: 3600,
            status_poll_interval: Duration::from_millis(200),
        }
    }
}

/// vCloud Director 客户端
pub struct VcdClient {
    /// API 基础 URL（如 `https://vcd.example.com/api`）
    base_url: String,

    /// HTTP 客户端
    http_client: Client,

    /// 会话令牌
    auth_token: Arc<RwLock<Option<String>>>,

    /// 配置
    config: ClientConfig,
}

impl VcdClient {
    /// 创建新的 vCloud Director 客户端
    pub fn new(base_url: &str, config: ClientConfig) -> Result<Self> {
        if base_url.trim().is_empty() {
            return Err(VcdError::ConfigError("API 地址不能为空".to_string()));
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| VcdError::HttpError(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
            auth_token: Arc::new(RwLock::new(None)),
            config,
        })
    }

    /// 登录组织，获取会话令牌
    ///
    /// # Arguments
    /// * `org` - 组织名称
    /// * `username` - 用户名
    /// * `password` - 密码
    pub async fn login(&self, org: &str, username: &str, password: &str) -> Result<()> {
        info!("vCD 客户端登录: {}@{}", username, org);

        let url = format!("{}/sessions", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .basic_auth(format!("{}@{}", username, org), Some(password))
            .header("Accept", self.accept_header())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            warn!("vCD 登录失败: {} - {}", status, message);
            return Err(VcdError::AuthError(format!("登录失败 [{}]: {}", status.as_u16(), message)));
        }

        let headers = response.headers();
        let token = headers
            .get(AUTH_HEADER)
            .or_else(|| headers.get(ACCESS_TOKEN_HEADER))
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| VcdError::AuthError("响应中未包含会话令牌".to_string()))?
            .to_string();

        *self.auth_token.write().await = Some(token);

        info!("vCD 客户端登录成功");
        Ok(())
    }

    /// 使用已有令牌（跳过登录）
    pub async fn set_token(&self, token: &str) {
        *self.auth_token.write().await = Some(token.to_string());
    }

    /// 注销会话
    pub async fn logout(&self) -> Result<()> {
        let token = self.auth_token.write().await.take();
        let Some(token) = token else {
            return Ok(());
        };

        info!("vCD 客户端登出");
        let url = format!("{}/session", self.base_url);
        let response = self
            .http_client
            .delete(&url)
            .header("Accept", self.accept_header())
            .header(AUTH_HEADER, token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            warn!("vCD 登出失败: {} - {}", status, message);
            return Err(VcdError::ApiError(status.as_u16(), message));
        }
        Ok(())
    }

    /// 获取 vApp API（先拉取 vApp 文档）
    pub async fn vapp(&self, href: &str) -> Result<VAppApi<'_>> {
        let vapp: VApp = self.get_xml(href_with_suffix(href, "")?).await?;
        Ok(VAppApi::new(self, vapp))
    }

    /// 基于已有 vApp 文档获取 vApp API
    pub fn vapp_from(&self, vapp: VApp) -> VAppApi<'_> {
        VAppApi::new(self, vapp)
    }

    /// 获取任务 API（先拉取任务文档）
    pub async fn task(&self, href: &str) -> Result<TaskApi<'_>> {
        let task: Task = self.get_xml(href_with_suffix(href, "")?).await?;
        Ok(TaskApi::new(self, task))
    }

    /// 基于已有任务文档获取任务 API
    pub fn task_from(&self, task: Task) -> TaskApi<'_> {
        TaskApi::new(self, task)
    }

    /// 获取任意资源的元数据 API
    pub fn metadata(&self, href: &str) -> MetadataApi<'_> {
        MetadataApi::new(self, href)
    }

    /// 获取 VDC API
    pub fn vdc(&self, href: &str) -> VdcApi<'_> {
        VdcApi::new(self, href)
    }

    /// 查询 vApp 模板
    pub async fn vapp_template(&self, href: &str) -> Result<VAppTemplate> {
        info!("查询 vApp 模板: {}", href);
        self.get_xml(href_with_suffix(href, "")?).await
    }

    /// GET 并解码 XML 文档
    pub(crate) async fn get_xml<R: DeserializeOwned>(&self, url: Url) -> Result<R> {
        let body = self.execute(Method::GET, url, None).await?;
        from_xml(&body)
    }

    /// 发送 XML 请求体并解码响应
    pub(crate) async fn send_xml<T: Serialize, R: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        content_type: &str,
        root: &str,
        body: &T,
    ) -> Result<R> {
        let payload = to_xml(root, body)?;
        debug!("vCD 请求报文: {}", payload);
        let body = self
            .execute(method, url, Some((content_type, payload)))
            .await?;
        from_xml(&body)
    }

    /// 发送无请求体的请求并解码响应
    pub(crate) async fn send_empty<R: DeserializeOwned>(&self, method: Method, url: Url) -> Result<R> {
        let body = self.execute(method, url, None).await?;
        from_xml(&body)
    }

    /// 发送 XML 请求体，响应为任务
    pub(crate) async fn send_task<T: Serialize>(
        &self,
        method: Method,
        url: Url,
        content_type: &str,
        root: &str,
        body: &T,
    ) -> Result<TaskApi<'_>> {
        let task: Task = self.send_xml(method, url, content_type, root, body).await?;
        Ok(TaskApi::new(self, task))
    }

    /// 发送无请求体的请求，响应为任务
    pub(crate) async fn send_empty_task(&self, method: Method, url: Url) -> Result<TaskApi<'_>> {
        let task: Task = self.send_empty(method, url).await?;
        Ok(TaskApi::new(self, task))
    }

    /// 发送无请求体的请求，忽略响应内容
    pub(crate) async fn execute_no_content(&self, method: Method, url: Url) -> Result<()> {
        self.execute(method, url, None).await?;
        Ok(())
    }

    /// 发送 HTTP 请求，返回响应体文本
    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<(&str, String)>,
    ) -> Result<String> {
        debug!("vCD API 请求: {} {}", method, url);

        let token = self.token().await?;

        let mut request = self
            .http_client
            .request(method, url)
            .header("Accept", self.accept_header())
            .header(AUTH_HEADER, token);

        if let Some((content_type, payload)) = body {
            request = request.header("Content-Type", content_type).body(payload);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            warn!("API 请求失败: {} - {}", status, message);
            return Err(VcdError::ApiError(status.as_u16(), message));
        }

        Ok(response.text().await?)
    }

    fn accept_header(&self) -> String {
        format!("application/*+xml;version={}", self.config.api_version)
    }

    /// 获取基础 URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 获取配置
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// 获取当前会话令牌
    pub async fn token(&self) -> Result<String> {
        let token = self.auth_token.read().await;
        token
            .clone()
            .ok_or_else(|| VcdError::AuthError("未认证，请先登录".to_string()))
    }
}

/// 读取错误响应：优先解析 vCD 错误文档，否则返回原始文本
async fn error_message(response: Response) -> String {
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "无法读取错误响应".to_string());

    match from_xml::<VcdErrorDocument>(&text) {
        Ok(doc) if !doc.message.is_empty() => doc.to_string(),
        _ => text,
    }
}
