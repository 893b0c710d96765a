//! XML 报文编解码
//!
//! vCloud Director 的请求与响应全部是 XML 文档：
//! - 请求体统一带 XML 声明头，命名空间以属性形式显式写出
//! - 响应按本地名称匹配元素和属性（忽略 `ovf:`/`vcloud:` 等前缀），未知内容直接忽略

use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::error::{Result, VcdError};

/// XML 声明头
pub const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// 将请求结构体编码为完整 XML 文档
///
/// # Arguments
/// * `root` - 根元素名称（可带命名空间前缀，如 `vcloud:Item`）
/// * `value` - 请求结构体
pub fn to_xml<T: Serialize>(root: &str, value: &T) -> Result<String> {
    let body = quick_xml::se::to_string_with_root(root, value)
        .map_err(|e| VcdError::EncodeError(e.to_string()))?;
    Ok(format!("{}{}", XML_HEADER, body))
}

/// 将响应 XML 解码为结构体
pub fn from_xml<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(quick_xml::de::from_str(body)?)
}

/// 在资源 HREF 后追加路径
///
/// 例如 `https://vcd/api/vApp/vapp-1` + `/power/action/powerOn`。
/// HREF 必须是绝对地址。
pub fn href_with_suffix(href: &str, suffix: &str) -> Result<Url> {
    if href.is_empty() {
        return Err(VcdError::InvalidInput("资源 HREF 为空".to_string()));
    }

    let mut url = Url::parse(href)?;
    if suffix.is_empty() {
        return Ok(url);
    }

    let path = format!("{}{}", url.path(), suffix);
    url.set_path(&path);
    Ok(url)
}
