//! 元数据 API
//!
//! 适用于任何带 `/metadata` 子资源的对象（vApp、虚拟机、VDC 等）。

use reqwest::Method;
use tracing::info;
use url::Url;

use crate::api::TaskApi;
use crate::client::VcdClient;
use crate::error::{Result, VcdError};
use crate::models::{mime, Metadata, MetadataValue, TypedValue};
use crate::xml::href_with_suffix;

/// 元数据 API
pub struct MetadataApi<'a> {
    client: &'a VcdClient,
    href: String,
}

impl<'a> MetadataApi<'a> {
    pub(crate) fn new(client: &'a VcdClient, href: &str) -> Self {
        Self {
            client,
            href: href.to_string(),
        }
    }

    fn entry_url(&self, key: &str) -> Result<Url> {
        if key.is_empty() {
            return Err(VcdError::InvalidInput("元数据 key 不能为空".to_string()));
        }
        href_with_suffix(&self.href, &format!("/metadata/{}", urlencoding::encode(key)))
    }

    /// 查询全部元数据
    pub async fn get(&self) -> Result<Metadata> {
        info!("查询元数据: {}", self.href);
        let url = href_with_suffix(&self.href, "/metadata/")?;
        self.client.get_xml(url).await
    }

    /// 写入字符串元数据
    pub async fn add(&self, key: &str, value: &str) -> Result<TaskApi<'a>> {
        self.add_typed(key, TypedValue::string(value)).await
    }

    /// 写入带类型的元数据
    pub async fn add_typed(&self, key: &str, value: TypedValue) -> Result<TaskApi<'a>> {
        info!("写入元数据: {} {}={} ({})", self.href, key, value.value, value.xsi_type);
        let client = self.client;
        let url = self.entry_url(key)?;
        client
            .send_task(
                Method::PUT,
                url,
                mime::METADATA_VALUE,
                "MetadataValue",
                &MetadataValue::new(value),
            )
            .await
    }

    /// 删除元数据
    pub async fn delete(&self, key: &str) -> Result<TaskApi<'a>> {
        info!("删除元数据: {} {}", self.href, key);
        let client = self.client;
        let url = self.entry_url(key)?;
        client.send_empty_task(Method::DELETE, url).await
    }
}
