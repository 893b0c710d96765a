//! 通用数据模型：链接、引用、命名空间与内容类型

use serde::{Deserialize, Serialize};

// ============================================
// XML 命名空间
// ============================================

/// vCloud 命名空间
pub const XMLNS_VCLOUD: &str = "http://www.vmware.com/vcloud/v1.5";

/// OVF 信封命名空间
pub const XMLNS_OVF: &str = "http://schemas.dmtf.org/ovf/envelope/1";

/// XML Schema 实例命名空间
pub const XMLNS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// CIM 资源分配设置命名空间（虚拟硬件条目）
pub const XMLNS_RASD: &str =
    "http://schemas.dmtf.org/wbem/wscim/1/cim-schema/2/CIM_ResourceAllocationSettingData";

/// VMware OVF 扩展命名空间
pub const XMLNS_VMW: &str = "http://www.vmware.com/schema/ovf";

// ============================================
// 内容类型
// ============================================

/// vCloud 厂商内容类型
pub mod mime {
    pub const VDC: &str = "application/vnd.vmware.vcloud.vdc+xml";
    pub const VM: &str = "application/vnd.vmware.vcloud.vm+xml";
    pub const RECOMPOSE_VAPP_PARAMS: &str = "application/vnd.vmware.vcloud.recomposeVAppParams+xml";
    pub const DEPLOY_VAPP_PARAMS: &str = "application/vnd.vmware.vcloud.deployVAppParams+xml";
    pub const UNDEPLOY_VAPP_PARAMS: &str = "application/vnd.vmware.vcloud.undeployVAppParams+xml";
    pub const GUEST_CUSTOMIZATION_SECTION: &str =
        "application/vnd.vmware.vcloud.guestCustomizationSection+xml";
    pub const NETWORK_CONNECTION_SECTION: &str =
        "application/vnd.vmware.vcloud.networkConnectionSection+xml";
    pub const NETWORK_CONFIG_SECTION: &str = "application/vnd.vmware.vcloud.networkConfigSection+xml";
    /// 提交网络配置时服务端要求的写法（全小写）
    pub const NETWORK_CONFIG_SECTION_PUT: &str =
        "application/vnd.vmware.vcloud.networkconfigsection+xml";
    pub const RASD_ITEM: &str = "application/vnd.vmware.vcloud.rasdItem+xml";
    pub const PRODUCT_SECTIONS: &str = "application/vnd.vmware.vcloud.productSections+xml";
    pub const METADATA: &str = "application/vnd.vmware.vcloud.metadata+xml";
    pub const METADATA_VALUE: &str = "application/vnd.vmware.vcloud.metadata.value+xml";
}

/// 资源链接
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// 关系（edit / up / down / remove ...）
    #[serde(rename = "@rel", default)]
    pub rel: String,

    /// 目标地址
    #[serde(rename = "@href", default)]
    pub href: String,

    /// 目标内容类型
    #[serde(rename = "@type", default, skip_serializing_if = "String::is_empty")]
    pub link_type: String,

    /// 目标名称
    #[serde(rename = "@name", default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Link {
    /// 可编辑链接
    pub fn edit(href: &str, link_type: &str) -> Self {
        Self {
            rel: "edit".to_string(),
            href: href.to_string(),
            link_type: link_type.to_string(),
            name: String::new(),
        }
    }
}

/// 资源引用
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "@href", default, skip_serializing_if = "String::is_empty")]
    pub href: String,

    #[serde(rename = "@id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(rename = "@type", default, skip_serializing_if = "String::is_empty")]
    pub ref_type: String,

    #[serde(rename = "@name", default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Reference {
    /// 仅包含 HREF 和名称的引用
    pub fn new(href: &str, name: &str) -> Self {
        Self {
            href: href.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }
}

/// 在链接列表中按内容类型查找
pub fn find_link_by_type<'a>(links: &'a [Link], link_type: &str) -> Option<&'a Link> {
    links.iter().find(|link| link.link_type == link_type)
}
