//! vApp 网络配置 API
//!
//! vApp 网络配置只能整体提交：每次修改都要带上完整的网络列表
//! （新增的、修改的和保持不变的）。

use reqwest::Method;
use tracing::{debug, info};

use crate::api::{TaskApi, VAppApi};
use crate::error::{Result, VcdError};
use crate::models::common::{XMLNS_OVF, XMLNS_VCLOUD};
use crate::models::{
    mime, DhcpService, FenceMode, IpRange, IpRanges, IpScope, IpScopes, NetworkConfigSection,
    NetworkConfiguration, NetworkFeatures, OrgVdcNetwork, Reference, VAppNetworkConfiguration,
};
use crate::xml::href_with_suffix;

/// 提交网络配置时使用的说明文字
const NETWORK_CONFIG_INFO: &str = "Configuration parameters for logical networks";

/// 隔离网络的 DHCP 设置
#[derive(Debug, Clone, Default)]
pub struct DhcpSettings {
    pub is_enabled: bool,
    pub max_lease_time: u32,
    pub default_lease_time: Option<u32>,
    pub ip_range: Option<IpRange>,
}

/// 新建 vApp 隔离网络的参数
#[derive(Debug, Clone, Default)]
pub struct VAppNetworkSettings {
    pub name: String,
    pub gateway: String,
    pub netmask: String,
    pub dns1: Option<String>,
    pub dns2: Option<String>,
    pub dns_suffix: Option<String>,
    pub guest_vlan_allowed: Option<bool>,
    pub static_ip_ranges: Vec<IpRange>,
    pub dhcp_settings: Option<DhcpSettings>,
}

impl VAppNetworkSettings {
    /// 校验必填项
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(VcdError::InvalidInput("网络名称不能为空".to_string()));
        }
        if self.gateway.is_empty() {
            return Err(VcdError::InvalidInput("网关地址不能为空".to_string()));
        }
        if self.netmask.is_empty() {
            return Err(VcdError::InvalidInput("子网掩码不能为空".to_string()));
        }
        if let Some(range) = self
            .static_ip_ranges
            .iter()
            .find(|range| range.start_address.is_empty())
        {
            return Err(VcdError::InvalidInput(format!(
                "静态地址段缺少起始地址: -{}",
                range.end_address
            )));
        }
        if let Some(dhcp) = &self.dhcp_settings {
            let range = dhcp
                .ip_range
                .as_ref()
                .ok_or_else(|| VcdError::InvalidInput("缺少 DHCP 地址段".to_string()))?;
            if range.start_address.is_empty() {
                return Err(VcdError::InvalidInput("DHCP 地址段缺少起始地址".to_string()));
            }
        }
        Ok(())
    }

    /// 构造隔离网络配置
    ///
    /// 静态地址段和 DHCP 地址段没有结束地址时都视为单个地址。
    pub fn to_configuration(&self) -> VAppNetworkConfiguration {
        let features = self.dhcp_settings.as_ref().map(|dhcp| NetworkFeatures {
            dhcp_service: Some(DhcpService {
                is_enabled: dhcp.is_enabled,
                default_lease_time: dhcp.default_lease_time,
                max_lease_time: dhcp.max_lease_time,
                ip_range: dhcp.ip_range.as_ref().map(single_address_range),
                ..Default::default()
            }),
            ..Default::default()
        });

        VAppNetworkConfiguration {
            network_name: self.name.clone(),
            configuration: Some(NetworkConfiguration {
                ip_scopes: Some(IpScopes {
                    ip_scope: IpScope {
                        is_inherited: false,
                        gateway: Some(self.gateway.clone()),
                        netmask: Some(self.netmask.clone()),
                        dns1: self.dns1.clone(),
                        dns2: self.dns2.clone(),
                        dns_suffix: self.dns_suffix.clone(),
                        is_enabled: true,
                        ip_ranges: Some(IpRanges {
                            ip_range: self
                                .static_ip_ranges
                                .iter()
                                .map(single_address_range)
                                .collect(),
                        }),
                    },
                }),
                fence_mode: FenceMode::Isolated.as_str().to_string(),
                features,
                guest_vlan_allowed: self.guest_vlan_allowed,
                ..Default::default()
            }),
            is_deployed: false,
            ..Default::default()
        }
    }
}

/// 结束地址为空的地址段补全为单个地址
fn single_address_range(range: &IpRange) -> IpRange {
    let mut range = range.clone();
    if range.end_address.is_empty() {
        range.end_address = range.start_address.clone();
    }
    range
}

/// 桥接到组织 VDC 网络的配置
fn bridged_configuration(network: &OrgVdcNetwork) -> VAppNetworkConfiguration {
    VAppNetworkConfiguration {
        network_name: network.name.clone(),
        configuration: Some(NetworkConfiguration {
            parent_network: Some(Reference {
                href: network.href.clone(),
                ..Default::default()
            }),
            fence_mode: FenceMode::Bridged.as_str().to_string(),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn full_section(network_config: Vec<VAppNetworkConfiguration>) -> NetworkConfigSection {
    NetworkConfigSection {
        xmlns: XMLNS_VCLOUD.to_string(),
        xmlns_ovf: XMLNS_OVF.to_string(),
        section_type: mime::NETWORK_CONFIG_SECTION.to_string(),
        info: NETWORK_CONFIG_INFO.to_string(),
        network_config,
        ..Default::default()
    }
}

impl<'a> VAppApi<'a> {
    /// 查询 vApp 网络配置
    pub async fn network_config_section(&self) -> Result<NetworkConfigSection> {
        if self.href().is_empty() {
            return Err(VcdError::InvalidInput("vApp HREF 为空".to_string()));
        }

        info!("查询 vApp 网络配置: {}", self.vapp().name);
        let url = href_with_suffix(self.href(), "/networkConfigSection/")?;
        self.client().get_xml(url).await
    }

    /// 用组织 VDC 网络替换 vApp 网络配置（全部桥接）
    pub async fn add_raw_network_config(&self, org_networks: &[OrgVdcNetwork]) -> Result<TaskApi<'a>> {
        info!("设置 vApp 网络: {} ({} 个组织网络)", self.vapp().name, org_networks.len());
        let configs = org_networks.iter().map(bridged_configuration).collect();
        self.update_network_configurations(configs).await
    }

    /// 追加一个桥接到组织 VDC 网络的配置
    pub async fn append_network_config(&self, org_network: &OrgVdcNetwork) -> Result<TaskApi<'a>> {
        info!("追加 vApp 网络: {} -> {}", self.vapp().name, org_network.name);

        let mut section = self.network_config_section().await?;
        section.network_config.push(bridged_configuration(org_network));
        self.update_network_configurations(section.network_config).await
    }

    /// 新建 vApp 隔离网络
    pub async fn add_isolated_network(&mut self, settings: &VAppNetworkSettings) -> Result<TaskApi<'a>> {
        settings.validate()?;
        info!("新建 vApp 隔离网络: {} -> {}", self.vapp().name, settings.name);

        let mut configs = self
            .vapp()
            .network_config_section
            .as_ref()
            .map(|s| s.network_config.clone())
            .unwrap_or_default();
        configs.push(settings.to_configuration());

        let task = self.update_network_configurations(configs.clone()).await?;
        self.vapp_mut()
            .network_config_section
            .get_or_insert_with(NetworkConfigSection::default)
            .network_config = configs;
        Ok(task)
    }

    /// 删除 vApp 隔离网络
    pub async fn remove_isolated_network(&mut self, name: &str) -> Result<TaskApi<'a>> {
        if name.is_empty() {
            return Err(VcdError::InvalidInput("网络名称不能为空".to_string()));
        }
        info!("删除 vApp 网络: {} -> {}", self.vapp().name, name);

        let mut configs = self
            .vapp()
            .network_config_section
            .as_ref()
            .map(|s| s.network_config.clone())
            .unwrap_or_default();
        let before = configs.len();
        configs.retain(|config| config.network_name != name);
        if configs.len() == before {
            return Err(VcdError::NotFound(format!("vApp 网络 {} 不存在", name)));
        }

        let task = self.update_network_configurations(configs.clone()).await?;
        if let Some(section) = self.vapp_mut().network_config_section.as_mut() {
            section.network_config = configs;
        }
        Ok(task)
    }

    /// 提交完整的 vApp 网络列表
    pub async fn update_network_configurations(
        &self,
        network_config: Vec<VAppNetworkConfiguration>,
    ) -> Result<TaskApi<'a>> {
        debug!("提交 vApp 网络配置: {} 个网络", network_config.len());

        let client = self.client();
        let url = href_with_suffix(self.href(), "/networkConfigSection/")?;
        client
            .send_task(
                Method::PUT,
                url,
                mime::NETWORK_CONFIG_SECTION_PUT,
                "NetworkConfigSection",
                &full_section(network_config),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::to_xml;

    fn settings() -> VAppNetworkSettings {
        VAppNetworkSettings {
            name: "isolated-net".to_string(),
            gateway: "192.168.2.1".to_string(),
            netmask: "255.255.255.0".to_string(),
            dns1: Some("8.8.8.8".to_string()),
            static_ip_ranges: vec![IpRange::new("192.168.2.10", "192.168.2.20")],
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_required_fields() {
        assert!(settings().validate().is_ok());

        let mut s = settings();
        s.name.clear();
        assert!(matches!(s.validate(), Err(VcdError::InvalidInput(_))));

        let mut s = settings();
        s.gateway.clear();
        assert!(s.validate().is_err());

        let mut s = settings();
        s.netmask.clear();
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_validate_dhcp_range() {
        let mut s = settings();
        s.dhcp_settings = Some(DhcpSettings {
            is_enabled: true,
            ..Default::default()
        });
        assert!(s.validate().is_err());

        s.dhcp_settings = Some(DhcpSettings {
            is_enabled: true,
            ip_range: Some(IpRange::new("", "192.168.2.120")),
            ..Default::default()
        });
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_isolated_configuration() {
        let mut s = settings();
        s.guest_vlan_allowed = Some(true);
        s.dhcp_settings = Some(DhcpSettings {
            is_enabled: true,
            max_lease_time: 7200,
            default_lease_time: Some(3600),
            ip_range: Some(IpRange::new("192.168.2.100", "")),
        });

        let config = s.to_configuration();
        assert_eq!(config.network_name, "isolated-net");
        assert!(!config.is_deployed);

        let inner = config.configuration.as_ref().unwrap();
        assert_eq!(inner.fence_mode, "isolated");
        assert_eq!(inner.guest_vlan_allowed, Some(true));

        let scope = &inner.ip_scopes.as_ref().unwrap().ip_scope;
        assert!(!scope.is_inherited);
        assert!(scope.is_enabled);
        assert_eq!(scope.dns1.as_deref(), Some("8.8.8.8"));

        // 单地址 DHCP 段
        let dhcp = inner.features.as_ref().unwrap().dhcp_service.as_ref().unwrap();
        assert_eq!(dhcp.ip_range, Some(IpRange::new("192.168.2.100", "192.168.2.100")));
    }

    #[test]
    fn test_single_address_static_ranges() {
        let mut s = settings();
        s.static_ip_ranges = vec![
            IpRange::new("192.168.2.10", "192.168.2.20"),
            IpRange::new("192.168.2.30", ""),
        ];
        assert!(s.validate().is_ok());

        let config = s.to_configuration();
        let scope = &config.configuration.as_ref().unwrap().ip_scopes.as_ref().unwrap().ip_scope;
        assert_eq!(
            scope.ip_ranges.as_ref().unwrap().ip_range,
            vec![
                IpRange::new("192.168.2.10", "192.168.2.20"),
                IpRange::new("192.168.2.30", "192.168.2.30"),
            ]
        );

        let xml = to_xml("NetworkConfig", &config).unwrap();
        assert!(!xml.contains("<EndAddress/>"));
        assert!(!xml.contains("<EndAddress></EndAddress>"));

        s.static_ip_ranges.push(IpRange::new("", "192.168.2.40"));
        assert!(matches!(s.validate(), Err(VcdError::InvalidInput(_))));
    }

    #[test]
    fn test_isolated_configuration_without_dhcp() {
        let config = settings().to_configuration();
        assert!(config.configuration.unwrap().features.is_none());
    }

    #[test]
    fn test_full_section_encoding() {
        let section = full_section(vec![bridged_configuration(&OrgVdcNetwork::new(
            "org-net",
            "https://vcd.local/api/admin/network/org-1",
        ))]);
        let xml = to_xml("NetworkConfigSection", &section).unwrap();

        assert!(xml.contains("<ovf:Info>Configuration parameters for logical networks</ovf:Info>"));
        assert!(xml.contains("type=\"application/vnd.vmware.vcloud.networkConfigSection+xml\""));
        assert!(xml.contains("<ParentNetwork href=\"https://vcd.local/api/admin/network/org-1\"/>"));
        assert!(xml.contains("<FenceMode>bridged</FenceMode>"));
        assert!(xml.contains("<IsDeployed>false</IsDeployed>"));
    }
}
