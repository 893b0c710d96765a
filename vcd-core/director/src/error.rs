//! vCloud Director 客户端错误定义

use thiserror::Error;

/// vCloud Director 客户端错误类型
#[derive(Error, Debug)]
pub enum VcdError {
    #[error("HTTP 错误: {0}")]
    HttpError(String),

    #[error("认证错误: {0}")]
    AuthError(String),

    #[error("API 错误 [{0}]: {1}")]
    ApiError(u16, String),

    #[error("XML 解析错误: {0}")]
    ParseError(String),

    #[error("XML 编码错误: {0}")]
    EncodeError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("超时错误: {0}")]
    Timeout(String),

    #[error("资源不存在: {0}")]
    NotFound(String),

    #[error("参数错误: {0}")]
    InvalidInput(String),

    #[error("任务执行失败: {0}")]
    TaskFailed(String),

    #[error("操作失败: {0}")]
    OperationFailed(String),
}

impl VcdError {
    /// 服务端返回的 HTTP 状态码（仅 `ApiError` 有）
    pub fn status_code(&self) -> Option<u16> {
        match self {
            VcdError::ApiError(code, _) => Some(*code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for VcdError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            VcdError::Timeout(e.to_string())
        } else {
            VcdError::HttpError(e.to_string())
        }
    }
}

impl From<quick_xml::DeError> for VcdError {
    fn from(e: quick_xml::DeError) -> Self {
        VcdError::ParseError(e.to_string())
    }
}

impl From<url::ParseError> for VcdError {
    fn from(e: url::ParseError) -> Self {
        VcdError::InvalidInput(format!("无效的 HREF: {}", e))
    }
}

/// vCloud Director 客户端结果类型
pub type Result<T> = std::result::Result<T, VcdError>;
