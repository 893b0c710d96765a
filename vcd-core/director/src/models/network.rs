//! 网络数据模型
//!
//! 包括 vApp 网络配置（NetworkConfigSection）和虚拟机网卡连接（NetworkConnectionSection）。
//! 这两类文档需要"读取 → 修改 → 回写"，因此同时支持编解码：
//! 编码时写出 `ovf:` 前缀，解码时按本地名称匹配。

use serde::{Deserialize, Serialize};

use super::common::{Link, Reference};
use super::services::{
    FirewallService, IpsecVpnService, NatService, RouterInfo, StaticRoutingService,
    SyslogServerSettings,
};

/// 网络隔离模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceMode {
    /// 桥接到上级网络
    Bridged,
    /// 隔离网络
    Isolated,
    /// NAT 路由
    NatRouted,
}

impl FenceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bridged => "bridged",
            Self::Isolated => "isolated",
            Self::NatRouted => "natRouted",
        }
    }
}

/// 网卡 IP 分配模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpAllocationMode {
    None,
    Dhcp,
    Pool,
    Manual,
}

impl IpAllocationMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "NONE" => Some(Self::None),
            "DHCP" => Some(Self::Dhcp),
            "POOL" => Some(Self::Pool),
            "MANUAL" => Some(Self::Manual),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Dhcp => "DHCP",
            Self::Pool => "POOL",
            Self::Manual => "MANUAL",
        }
    }
}

// ============================================
// vApp 网络配置
// ============================================

/// vApp 网络配置段
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfigSection {
    #[serde(rename = "@xmlns", default, skip_serializing_if = "String::is_empty")]
    pub xmlns: String,

    #[serde(rename = "@xmlns:ovf", default, skip_serializing_if = "String::is_empty")]
    pub xmlns_ovf: String,

    #[serde(rename = "@href", default, skip_serializing_if = "String::is_empty")]
    pub href: String,

    #[serde(rename = "@type", default, skip_serializing_if = "String::is_empty")]
    pub section_type: String,

    #[serde(rename(serialize = "ovf:Info", deserialize = "Info"), default)]
    pub info: String,

    #[serde(rename = "Link", default, skip_serializing)]
    pub links: Vec<Link>,

    #[serde(rename = "NetworkConfig", default, skip_serializing_if = "Vec::is_empty")]
    pub network_config: Vec<VAppNetworkConfiguration>,
}

impl NetworkConfigSection {
    /// 按名称查找网络配置
    pub fn find(&self, network_name: &str) -> Option<&VAppNetworkConfiguration> {
        self.network_config
            .iter()
            .find(|config| config.network_name == network_name)
    }
}

/// 单个 vApp 网络
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VAppNetworkConfiguration {
    #[serde(rename = "@href", default, skip_serializing_if = "String::is_empty")]
    pub href: String,

    #[serde(rename = "@type", default, skip_serializing_if = "String::is_empty")]
    pub config_type: String,

    #[serde(rename = "@networkName", default)]
    pub network_name: String,

    #[serde(rename = "Link", default, skip_serializing)]
    pub links: Vec<Link>,

    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "Configuration", skip_serializing_if = "Option::is_none")]
    pub configuration: Option<NetworkConfiguration>,

    #[serde(rename = "IsDeployed", default)]
    pub is_deployed: bool,
}

/// 网络配置详情（字段顺序即服务端要求的元素顺序）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfiguration {
    #[serde(rename = "IpScopes", skip_serializing_if = "Option::is_none")]
    pub ip_scopes: Option<IpScopes>,

    #[serde(rename = "ParentNetwork", skip_serializing_if = "Option::is_none")]
    pub parent_network: Option<Reference>,

    #[serde(rename = "FenceMode", default)]
    pub fence_mode: String,

    #[serde(rename = "RetainNetInfoAcrossDeployments", skip_serializing_if = "Option::is_none")]
    pub retain_net_info_across_deployments: Option<bool>,

    #[serde(rename = "Features", skip_serializing_if = "Option::is_none")]
    pub features: Option<NetworkFeatures>,

    #[serde(rename = "SyslogServerSettings", skip_serializing_if = "Option::is_none")]
    pub syslog_server_settings: Option<SyslogServerSettings>,

    #[serde(rename = "RouterInfo", skip_serializing_if = "Option::is_none")]
    pub router_info: Option<RouterInfo>,

    #[serde(rename = "SubInterface", skip_serializing_if = "Option::is_none")]
    pub sub_interface: Option<bool>,

    #[serde(rename = "DistributedInterface", skip_serializing_if = "Option::is_none")]
    pub distributed_interface: Option<bool>,

    #[serde(rename = "GuestVlanAllowed", skip_serializing_if = "Option::is_none")]
    pub guest_vlan_allowed: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpScopes {
    #[serde(rename = "IpScope")]
    pub ip_scope: IpScope,
}

/// IP 作用域
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpScope {
    #[serde(rename = "IsInherited", default)]
    pub is_inherited: bool,

    #[serde(rename = "Gateway", skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,

    #[serde(rename = "Netmask", skip_serializing_if = "Option::is_none")]
    pub netmask: Option<String>,

    #[serde(rename = "Dns1", skip_serializing_if = "Option::is_none")]
    pub dns1: Option<String>,

    #[serde(rename = "Dns2", skip_serializing_if = "Option::is_none")]
    pub dns2: Option<String>,

    #[serde(rename = "DnsSuffix", skip_serializing_if = "Option::is_none")]
    pub dns_suffix: Option<String>,

    #[serde(rename = "IsEnabled", default)]
    pub is_enabled: bool,

    #[serde(rename = "IpRanges", skip_serializing_if = "Option::is_none")]
    pub ip_ranges: Option<IpRanges>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpRanges {
    #[serde(rename = "IpRange", default, skip_serializing_if = "Vec::is_empty")]
    pub ip_range: Vec<IpRange>,
}

/// IP 地址段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpRange {
    #[serde(rename = "StartAddress", default)]
    pub start_address: String,

    #[serde(rename = "EndAddress", default)]
    pub end_address: String,
}

impl IpRange {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start_address: start.to_string(),
            end_address: end.to_string(),
        }
    }
}

/// 网络服务
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkFeatures {
    #[serde(rename = "DhcpService", skip_serializing_if = "Option::is_none")]
    pub dhcp_service: Option<DhcpService>,

    #[serde(rename = "FirewallService", skip_serializing_if = "Option::is_none")]
    pub firewall_service: Option<FirewallService>,

    #[serde(rename = "NatService", skip_serializing_if = "Option::is_none")]
    pub nat_service: Option<NatService>,

    #[serde(rename = "IpsecVpnService", skip_serializing_if = "Option::is_none")]
    pub ipsec_vpn_service: Option<IpsecVpnService>,

    #[serde(rename = "StaticRoutingService", skip_serializing_if = "Option::is_none")]
    pub static_routing_service: Option<StaticRoutingService>,
}

/// DHCP 服务
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DhcpService {
    #[serde(rename = "IsEnabled", default)]
    pub is_enabled: bool,

    #[serde(rename = "DefaultLeaseTime", skip_serializing_if = "Option::is_none")]
    pub default_lease_time: Option<u32>,

    #[serde(rename = "MaxLeaseTime", default)]
    pub max_lease_time: u32,

    #[serde(rename = "IpRange", skip_serializing_if = "Option::is_none")]
    pub ip_range: Option<IpRange>,

    #[serde(rename = "RouterIp", skip_serializing_if = "Option::is_none")]
    pub router_ip: Option<String>,

    #[serde(rename = "SubMask", skip_serializing_if = "Option::is_none")]
    pub sub_mask: Option<String>,

    #[serde(rename = "PrimaryNameServer", skip_serializing_if = "Option::is_none")]
    pub primary_name_server: Option<String>,

    #[serde(rename = "SecondaryNameServer", skip_serializing_if = "Option::is_none")]
    pub secondary_name_server: Option<String>,

    #[serde(rename = "DomainName", skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,
}

/// 组织 VDC 网络（仅取引用所需字段）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrgVdcNetwork {
    #[serde(rename = "@href", default)]
    pub href: String,

    #[serde(rename = "@id", default)]
    pub id: String,

    #[serde(rename = "@name", default)]
    pub name: String,

    #[serde(rename = "Description")]
    pub description: Option<String>,
}

impl OrgVdcNetwork {
    pub fn new(name: &str, href: &str) -> Self {
        Self {
            name: name.to_string(),
            href: href.to_string(),
            ..Default::default()
        }
    }
}

// ============================================
// 虚拟机网卡连接
// ============================================

/// 虚拟机网卡连接段
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConnectionSection {
    #[serde(rename = "@xmlns", default, skip_serializing_if = "String::is_empty")]
    pub xmlns: String,

    #[serde(rename = "@xmlns:ovf", default, skip_serializing_if = "String::is_empty")]
    pub xmlns_ovf: String,

    #[serde(rename = "@href", default, skip_serializing_if = "String::is_empty")]
    pub href: String,

    #[serde(rename = "@type", default, skip_serializing_if = "String::is_empty")]
    pub section_type: String,

    #[serde(rename(serialize = "ovf:Info", deserialize = "Info"), default)]
    pub info: String,

    #[serde(rename = "PrimaryNetworkConnectionIndex", default)]
    pub primary_network_connection_index: u32,

    #[serde(rename = "NetworkConnection", default, skip_serializing_if = "Vec::is_empty")]
    pub network_connection: Vec<NetworkConnection>,

    #[serde(rename = "Link", default, skip_serializing)]
    pub links: Vec<Link>,
}

/// 单块网卡连接
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConnection {
    #[serde(rename = "@network", default)]
    pub network: String,

    #[serde(rename = "@needsCustomization", skip_serializing_if = "Option::is_none")]
    pub needs_customization: Option<bool>,

    #[serde(rename = "NetworkConnectionIndex", default)]
    pub network_connection_index: u32,

    #[serde(rename = "IpAddress", skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    #[serde(rename = "ExternalIpAddress", skip_serializing_if = "Option::is_none")]
    pub external_ip_address: Option<String>,

    #[serde(rename = "IsConnected", default)]
    pub is_connected: bool,

    #[serde(rename = "MACAddress", skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,

    #[serde(rename = "IpAddressAllocationMode", default)]
    pub ip_address_allocation_mode: String,

    #[serde(rename = "NetworkAdapterType", skip_serializing_if = "Option::is_none")]
    pub network_adapter_type: Option<String>,
}

/// 重组 vApp 时虚拟机网络到 vApp 网络的映射
#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkAssignment {
    #[serde(rename = "@innerNetwork")]
    pub inner_network: String,

    #[serde(rename = "@containerNetwork")]
    pub container_network: String,
}
