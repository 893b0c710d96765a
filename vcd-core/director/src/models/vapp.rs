//! vApp / 虚拟机 / vApp 模板数据模型

use serde::Deserialize;

use super::common::{Link, Reference};
use super::network::{NetworkConfigSection, NetworkConnectionSection};
use super::params::ProductSection;
use super::task::TasksInProgress;

/// vApp 状态码
///
/// 服务端以整数返回，取值 -1..=19。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAppStatus {
    FailedCreation,
    Unresolved,
    Resolved,
    Deployed,
    Suspended,
    PoweredOn,
    WaitingForInput,
    Unknown,
    /// 无法识别（含服务端返回的未定义状态码）
    Unrecognized,
    PoweredOff,
    InconsistentState,
    Mixed,
    DescriptorPending,
    CopyingContents,
    DiskContentsPending,
    Quarantined,
    QuarantineExpired,
    Rejected,
    TransferTimeout,
    VAppUndeployed,
    VAppPartiallyDeployed,
}

impl VAppStatus {
    /// 从服务端状态码创建
    pub fn from_code(code: i32) -> Self {
        match code {
            -1 => Self::FailedCreation,
            0 => Self::Unresolved,
            1 => Self::Resolved,
            2 => Self::Deployed,
            3 => Self::Suspended,
            4 => Self::PoweredOn,
            5 => Self::WaitingForInput,
            6 => Self::Unknown,
            8 => Self::PoweredOff,
            9 => Self::InconsistentState,
            10 => Self::Mixed,
            11 => Self::DescriptorPending,
            12 => Self::CopyingContents,
            13 => Self::DiskContentsPending,
            14 => Self::Quarantined,
            15 => Self::QuarantineExpired,
            16 => Self::Rejected,
            17 => Self::TransferTimeout,
            18 => Self::VAppUndeployed,
            19 => Self::VAppPartiallyDeployed,
            _ => Self::Unrecognized,
        }
    }

    /// 状态名称（与服务端文档一致）
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FailedCreation => "FAILED_CREATION",
            Self::Unresolved => "UNRESOLVED",
            Self::Resolved => "RESOLVED",
            Self::Deployed => "DEPLOYED",
            Self::Suspended => "SUSPENDED",
            Self::PoweredOn => "POWERED_ON",
            Self::WaitingForInput => "WAITING_FOR_INPUT",
            Self::Unknown => "UNKNOWN",
            Self::Unrecognized => "UNRECOGNIZED",
            Self::PoweredOff => "POWERED_OFF",
            Self::InconsistentState => "INCONSISTENT_STATE",
            Self::Mixed => "MIXED",
            Self::DescriptorPending => "DESCRIPTOR_PENDING",
            Self::CopyingContents => "COPYING_CONTENTS",
            Self::DiskContentsPending => "DISK_CONTENTS_PENDING",
            Self::Quarantined => "QUARANTINED",
            Self::QuarantineExpired => "QUARANTINE_EXPIRED",
            Self::Rejected => "REJECTED",
            Self::TransferTimeout => "TRANSFER_TIMEOUT",
            Self::VAppUndeployed => "VAPP_UNDEPLOYED",
            Self::VAppPartiallyDeployed => "VAPP_PARTIALLY_DEPLOYED",
        }
    }

    /// 按名称解析（大小写不敏感）
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.to_uppercase();
        (-1..=19)
            .map(Self::from_code)
            .find(|status| status.as_str() == upper)
    }
}

impl std::fmt::Display for VAppStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// vApp
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VApp {
    #[serde(rename = "@href", default)]
    pub href: String,

    #[serde(rename = "@id", default)]
    pub id: String,

    #[serde(rename = "@name", default)]
    pub name: String,

    #[serde(rename = "@type", default)]
    pub vapp_type: String,

    /// 状态码，见 [`VAppStatus`]
    #[serde(rename = "@status", default)]
    pub status: i32,

    #[serde(rename = "@deployed", default)]
    pub deployed: bool,

    #[serde(rename = "Link", default)]
    pub links: Vec<Link>,

    #[serde(rename = "Description")]
    pub description: Option<String>,

    #[serde(rename = "Tasks")]
    pub tasks: Option<TasksInProgress>,

    #[serde(rename = "NetworkConfigSection")]
    pub network_config_section: Option<NetworkConfigSection>,

    #[serde(rename = "Children")]
    pub children: Option<VAppChildren>,
}

impl VApp {
    /// 第一台虚拟机（大部分定制操作只作用于它）
    pub fn first_vm(&self) -> Option<&Vm> {
        self.children.as_ref().and_then(|c| c.vms.first())
    }

    pub fn vms(&self) -> &[Vm] {
        self.children.as_ref().map(|c| c.vms.as_slice()).unwrap_or(&[])
    }
}

/// vApp 子节点
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VAppChildren {
    #[serde(rename = "Vm", default)]
    pub vms: Vec<Vm>,
}

/// 虚拟机
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Vm {
    #[serde(rename = "@href", default)]
    pub href: String,

    #[serde(rename = "@id", default)]
    pub id: String,

    #[serde(rename = "@name", default)]
    pub name: String,

    #[serde(rename = "@type", default)]
    pub vm_type: String,

    #[serde(rename = "@status", default)]
    pub status: i32,

    #[serde(rename = "@deployed", default)]
    pub deployed: bool,

    #[serde(rename = "Link", default)]
    pub links: Vec<Link>,

    #[serde(rename = "Description")]
    pub description: Option<String>,

    #[serde(rename = "Tasks")]
    pub tasks: Option<TasksInProgress>,

    #[serde(rename = "NetworkConnectionSection")]
    pub network_connection_section: Option<NetworkConnectionSection>,

    #[serde(rename = "StorageProfile")]
    pub storage_profile: Option<Reference>,

    #[serde(rename = "ProductSection")]
    pub product_section: Option<ProductSection>,
}

/// vApp 模板
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VAppTemplate {
    #[serde(rename = "@href", default)]
    pub href: String,

    #[serde(rename = "@id", default)]
    pub id: String,

    #[serde(rename = "@name", default)]
    pub name: String,

    /// 状态码；8 表示已解析且关机，可用于创建虚拟机
    #[serde(rename = "@status", default)]
    pub status: i32,

    #[serde(rename = "Link", default)]
    pub links: Vec<Link>,

    #[serde(rename = "Description")]
    pub description: Option<String>,

    #[serde(rename = "Children")]
    pub children: Option<VAppChildren>,
}

impl VAppTemplate {
    pub fn first_vm(&self) -> Option<&Vm> {
        self.children.as_ref().and_then(|c| c.vms.first())
    }
}
