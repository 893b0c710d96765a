//! VDC 查询 API

use tracing::info;

use crate::client::VcdClient;
use crate::error::{Result, VcdError};
use crate::models::{Reference, Vdc};
use crate::xml::href_with_suffix;

/// VDC 查询 API
pub struct VdcApi<'a> {
    client: &'a VcdClient,
    href: String,
}

impl<'a> VdcApi<'a> {
    pub(crate) fn new(client: &'a VcdClient, href: &str) -> Self {
        Self {
            client,
            href: href.to_string(),
        }
    }

    /// 查询 VDC 详情
    pub async fn get(&self) -> Result<Vdc> {
        info!("查询 VDC: {}", self.href);
        let url = href_with_suffix(&self.href, "")?;
        self.client.get_xml(url).await
    }

    /// 按名称查找存储策略引用
    pub async fn find_storage_profile_reference(&self, name: &str) -> Result<Reference> {
        let vdc = self.get().await?;
        vdc.find_storage_profile(name)
            .cloned()
            .ok_or_else(|| VcdError::NotFound(format!("VDC {} 中不存在存储策略 {}", vdc.name, name)))
    }
}
