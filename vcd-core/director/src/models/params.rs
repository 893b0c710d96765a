//! 请求参数模型
//!
//! 这里的结构体只用于构造请求体；字段顺序即服务端 schema 要求的元素顺序，
//! 属性字段统一放在最前面。

use serde::{Deserialize, Serialize};

use super::common::{Link, Reference, XMLNS_OVF, XMLNS_RASD, XMLNS_VCLOUD, XMLNS_VMW, XMLNS_XSI};
use super::network::{NetworkAssignment, NetworkConnectionSection};

// ============================================
// 重组 vApp
// ============================================

/// 重组 vApp 请求（添加 / 删除虚拟机）
#[derive(Debug, Clone, Serialize)]
pub struct RecomposeVAppParams {
    #[serde(rename = "@xmlns:ovf")]
    pub xmlns_ovf: String,

    #[serde(rename = "@xmlns:xsi")]
    pub xmlns_xsi: String,

    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "@deploy")]
    pub deploy: bool,

    #[serde(rename = "@name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "@powerOn")]
    pub power_on: bool,

    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "SourcedItem", skip_serializing_if = "Option::is_none")]
    pub sourced_item: Option<SourcedCompositionItemParam>,

    #[serde(rename = "AllEULAsAccepted", skip_serializing_if = "Option::is_none")]
    pub all_eulas_accepted: Option<bool>,

    #[serde(rename = "DeleteItem", skip_serializing_if = "Option::is_none")]
    pub delete_item: Option<DeleteItem>,
}

impl Default for RecomposeVAppParams {
    fn default() -> Self {
        Self {
            xmlns_ovf: XMLNS_OVF.to_string(),
            xmlns_xsi: XMLNS_XSI.to_string(),
            xmlns: XMLNS_VCLOUD.to_string(),
            deploy: false,
            name: None,
            power_on: false,
            description: None,
            sourced_item: None,
            all_eulas_accepted: None,
            delete_item: None,
        }
    }
}

/// 重组时加入的源条目
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourcedCompositionItemParam {
    #[serde(rename = "Source")]
    pub source: Reference,

    #[serde(rename = "VmGeneralParams", skip_serializing_if = "Option::is_none")]
    pub vm_general_params: Option<VmGeneralParams>,

    #[serde(rename = "InstantiationParams", skip_serializing_if = "Option::is_none")]
    pub instantiation_params: Option<InstantiationParams>,

    #[serde(rename = "NetworkAssignment", skip_serializing_if = "Vec::is_empty")]
    pub network_assignment: Vec<NetworkAssignment>,

    #[serde(rename = "VmCapabilities", skip_serializing_if = "Option::is_none")]
    pub vm_capabilities: Option<VmCapabilities>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VmGeneralParams {
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "NeedsCustomization", skip_serializing_if = "Option::is_none")]
    pub needs_customization: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InstantiationParams {
    #[serde(rename = "NetworkConnectionSection", skip_serializing_if = "Option::is_none")]
    pub network_connection_section: Option<NetworkConnectionSection>,
}

/// CPU / 内存热添加能力
#[derive(Debug, Clone, Default, Serialize)]
pub struct VmCapabilities {
    #[serde(rename = "MemoryHotAddEnabled")]
    pub memory_hot_add_enabled: bool,

    #[serde(rename = "CpuHotAddEnabled")]
    pub cpu_hot_add_enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeleteItem {
    #[serde(rename = "@href")]
    pub href: String,
}

// ============================================
// 部署 / 取消部署
// ============================================

#[derive(Debug, Clone, Serialize)]
pub struct DeployVAppParams {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "@powerOn")]
    pub power_on: bool,

    #[serde(rename = "@deploymentLeaseSeconds", skip_serializing_if = "Option::is_none")]
    pub deployment_lease_seconds: Option<u32>,

    #[serde(rename = "@forceCustomization", skip_serializing_if = "Option::is_none")]
    pub force_customization: Option<bool>,
}

impl Default for DeployVAppParams {
    fn default() -> Self {
        Self {
            xmlns: XMLNS_VCLOUD.to_string(),
            power_on: false,
            deployment_lease_seconds: None,
            force_customization: None,
        }
    }
}

/// 取消部署时对虚拟机执行的电源操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndeployPowerAction {
    PowerOff,
    Suspend,
    Shutdown,
    Force,
    Default,
}

impl UndeployPowerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PowerOff => "powerOff",
            Self::Suspend => "suspend",
            Self::Shutdown => "shutdown",
            Self::Force => "force",
            Self::Default => "default",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "poweroff" => Some(Self::PowerOff),
            "suspend" => Some(Self::Suspend),
            "shutdown" => Some(Self::Shutdown),
            "force" => Some(Self::Force),
            "default" => Some(Self::Default),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UndeployVAppParams {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "UndeployPowerAction", skip_serializing_if = "Option::is_none")]
    pub undeploy_power_action: Option<String>,
}

impl UndeployVAppParams {
    pub fn new(action: UndeployPowerAction) -> Self {
        Self {
            xmlns: XMLNS_VCLOUD.to_string(),
            undeploy_power_action: Some(action.as_str().to_string()),
        }
    }
}

// ============================================
// 虚拟机定制
// ============================================

/// 客户机操作系统定制
#[derive(Debug, Clone, Serialize)]
pub struct GuestCustomizationSection {
    #[serde(rename = "@xmlns:ovf")]
    pub xmlns_ovf: String,

    #[serde(rename = "@xmlns:xsi")]
    pub xmlns_xsi: String,

    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "@href", skip_serializing_if = "String::is_empty")]
    pub href: String,

    #[serde(rename = "@type", skip_serializing_if = "String::is_empty")]
    pub section_type: String,

    #[serde(rename = "ovf:Info")]
    pub info: String,

    #[serde(rename = "Enabled", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(rename = "ChangeSid", skip_serializing_if = "Option::is_none")]
    pub change_sid: Option<bool>,

    #[serde(rename = "CustomizationScript", skip_serializing_if = "Option::is_none")]
    pub customization_script: Option<String>,

    #[serde(rename = "ComputerName", skip_serializing_if = "Option::is_none")]
    pub computer_name: Option<String>,
}

impl GuestCustomizationSection {
    pub fn new(vm_href: &str, section_type: &str) -> Self {
        Self {
            xmlns_ovf: XMLNS_OVF.to_string(),
            xmlns_xsi: XMLNS_XSI.to_string(),
            xmlns: XMLNS_VCLOUD.to_string(),
            href: vm_href.to_string(),
            section_type: section_type.to_string(),
            info: "Specifies Guest OS Customization Settings".to_string(),
            enabled: None,
            change_sid: None,
            customization_script: None,
            computer_name: None,
        }
    }
}

/// 虚拟硬件条目（CPU / 内存）
///
/// 根元素为 `vcloud:Item`，字段带 `rasd:` / `vmw:` / `vcloud:` 前缀。
#[derive(Debug, Clone, Serialize)]
pub struct RasdItem {
    #[serde(rename = "@xmlns:rasd")]
    pub xmlns_rasd: String,

    #[serde(rename = "@xmlns:vcloud")]
    pub xmlns_vcloud: String,

    #[serde(rename = "@xmlns:xsi")]
    pub xmlns_xsi: String,

    #[serde(rename = "@xmlns:vmw", skip_serializing_if = "Option::is_none")]
    pub xmlns_vmw: Option<String>,

    #[serde(rename = "@vcloud:href")]
    pub vcloud_href: String,

    #[serde(rename = "@vcloud:type")]
    pub vcloud_type: String,

    #[serde(rename = "rasd:AllocationUnits")]
    pub allocation_units: String,

    #[serde(rename = "rasd:Description")]
    pub description: String,

    #[serde(rename = "rasd:ElementName")]
    pub element_name: String,

    #[serde(rename = "rasd:InstanceID")]
    pub instance_id: u32,

    #[serde(rename = "rasd:Reservation")]
    pub reservation: u32,

    #[serde(rename = "rasd:ResourceType")]
    pub resource_type: u32,

    #[serde(rename = "rasd:VirtualQuantity")]
    pub virtual_quantity: u32,

    #[serde(rename = "rasd:Weight")]
    pub weight: u32,

    #[serde(rename = "vmw:CoresPerSocket", skip_serializing_if = "Option::is_none")]
    pub cores_per_socket: Option<u32>,

    #[serde(rename = "vcloud:Link")]
    pub link: Link,
}

impl RasdItem {
    /// CPU 条目：资源类型 3，实例 ID 4
    pub fn cpu(vm_href: &str, cpu_count: u32, cores_per_socket: Option<u32>) -> Self {
        let href = format!("{}/virtualHardwareSection/cpu", vm_href);
        Self {
            xmlns_rasd: XMLNS_RASD.to_string(),
            xmlns_vcloud: XMLNS_VCLOUD.to_string(),
            xmlns_xsi: XMLNS_XSI.to_string(),
            xmlns_vmw: Some(XMLNS_VMW.to_string()),
            vcloud_href: href.clone(),
            vcloud_type: super::common::mime::RASD_ITEM.to_string(),
            allocation_units: "hertz * 10^6".to_string(),
            description: "Number of Virtual CPUs".to_string(),
            element_name: format!("{} virtual CPU(s)", cpu_count),
            instance_id: 4,
            reservation: 0,
            resource_type: 3,
            virtual_quantity: cpu_count,
            weight: 0,
            cores_per_socket,
            link: Link::edit(&href, super::common::mime::RASD_ITEM),
        }
    }

    /// 内存条目（MB）：资源类型 4，实例 ID 5
    pub fn memory(vm_href: &str, size_mb: u32) -> Self {
        let href = format!("{}/virtualHardwareSection/memory", vm_href);
        Self {
            xmlns_rasd: XMLNS_RASD.to_string(),
            xmlns_vcloud: XMLNS_VCLOUD.to_string(),
            xmlns_xsi: XMLNS_XSI.to_string(),
            xmlns_vmw: None,
            vcloud_href: href.clone(),
            vcloud_type: super::common::mime::RASD_ITEM.to_string(),
            allocation_units: "byte * 2^20".to_string(),
            description: "Memory Size".to_string(),
            element_name: format!("{} MB of memory", size_mb),
            instance_id: 5,
            reservation: 0,
            resource_type: 4,
            virtual_quantity: size_mb,
            weight: 0,
            cores_per_socket: None,
            link: Link::edit(&href, super::common::mime::RASD_ITEM),
        }
    }
}

/// 修改虚拟机名称 / 存储策略
#[derive(Debug, Clone, Serialize)]
pub struct VmUpdateParams {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "StorageProfile", skip_serializing_if = "Option::is_none")]
    pub storage_profile: Option<Reference>,
}

impl VmUpdateParams {
    pub fn new(name: &str) -> Self {
        Self {
            xmlns: XMLNS_VCLOUD.to_string(),
            name: name.to_string(),
            storage_profile: None,
        }
    }
}

// ============================================
// OVF 产品属性
// ============================================

/// OVF 产品段（虚拟机上读取，修改后回写）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductSection {
    #[serde(
        rename(serialize = "ovf:Info", deserialize = "Info"),
        skip_serializing_if = "Option::is_none"
    )]
    pub info: Option<String>,

    #[serde(
        rename(serialize = "ovf:Property", deserialize = "Property"),
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub properties: Vec<Property>,
}

impl ProductSection {
    /// 按 key 覆盖属性值，返回实际修改的数量
    pub fn apply_values<'a, I>(&mut self, values: I) -> usize
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut changed = 0;
        for (key, value) in values {
            if let Some(property) = self.properties.iter_mut().find(|p| &p.key == key) {
                property.value = Some(PropertyValue { value: value.clone() });
                changed += 1;
            }
        }
        changed
    }
}

/// OVF 属性
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename(serialize = "@ovf:key", deserialize = "@key"), default)]
    pub key: String,

    #[serde(
        rename(serialize = "@ovf:type", deserialize = "@type"),
        skip_serializing_if = "Option::is_none"
    )]
    pub property_type: Option<String>,

    /// 默认值
    #[serde(rename(serialize = "@ovf:value", deserialize = "@value"), default)]
    pub default_value: String,

    #[serde(
        rename(serialize = "@ovf:userConfigurable", deserialize = "@userConfigurable"),
        default
    )]
    pub user_configurable: bool,

    #[serde(
        rename(serialize = "ovf:Label", deserialize = "Label"),
        skip_serializing_if = "Option::is_none"
    )]
    pub label: Option<String>,

    #[serde(
        rename(serialize = "ovf:Description", deserialize = "Description"),
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,

    /// 当前值
    #[serde(
        rename(serialize = "ovf:Value", deserialize = "Value"),
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<PropertyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyValue {
    #[serde(rename(serialize = "@ovf:value", deserialize = "@value"), default)]
    pub value: String,
}

/// 产品段列表（PUT productSections 的根元素）
#[derive(Debug, Clone, Serialize)]
pub struct ProductSectionList {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "@xmlns:ovf")]
    pub xmlns_ovf: String,

    #[serde(rename = "ovf:ProductSection", skip_serializing_if = "Option::is_none")]
    pub product_section: Option<ProductSection>,
}

impl ProductSectionList {
    pub fn new(section: ProductSection) -> Self {
        Self {
            xmlns: XMLNS_VCLOUD.to_string(),
            xmlns_ovf: XMLNS_OVF.to_string(),
            product_section: Some(section),
        }
    }
}
