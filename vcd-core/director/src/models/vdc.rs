//! 虚拟数据中心模型

use serde::Deserialize;

use super::common::{Link, Reference};

/// 组织 VDC
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Vdc {
    #[serde(rename = "@href", default)]
    pub href: String,

    #[serde(rename = "@id", default)]
    pub id: String,

    #[serde(rename = "@name", default)]
    pub name: String,

    #[serde(rename = "@status", default)]
    pub status: i32,

    #[serde(rename = "Link", default)]
    pub links: Vec<Link>,

    #[serde(rename = "Description")]
    pub description: Option<String>,

    #[serde(rename = "VdcStorageProfiles")]
    pub storage_profiles: Option<VdcStorageProfiles>,
}

impl Vdc {
    pub fn storage_profiles(&self) -> &[Reference] {
        self.storage_profiles
            .as_ref()
            .map(|p| p.profiles.as_slice())
            .unwrap_or(&[])
    }

    /// 按名称查找存储策略引用
    pub fn find_storage_profile(&self, name: &str) -> Option<&Reference> {
        self.storage_profiles().iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VdcStorageProfiles {
    #[serde(rename = "VdcStorageProfile", default)]
    pub profiles: Vec<Reference>,
}
