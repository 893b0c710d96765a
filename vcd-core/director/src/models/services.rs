//! vApp 网络服务模型
//!
//! NAT 路由网络上的防火墙、NAT、静态路由与 IPsec VPN 配置。
//! 修改网络配置段时这些元素会原样回写，字段一律可选，收到什么写回什么。

use serde::{Deserialize, Serialize};

use super::common::Reference;

/// 路由器外部地址
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouterInfo {
    #[serde(rename = "ExternalIp", default)]
    pub external_ip: String,
}

/// 系统日志服务器
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyslogServerSettings {
    #[serde(rename = "SyslogServerIp1", skip_serializing_if = "Option::is_none")]
    pub syslog_server_ip1: Option<String>,

    #[serde(rename = "SyslogServerIp2", skip_serializing_if = "Option::is_none")]
    pub syslog_server_ip2: Option<String>,
}

// ============================================
// 防火墙
// ============================================

/// 防火墙服务
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirewallService {
    #[serde(rename = "IsEnabled", default)]
    pub is_enabled: bool,

    /// 默认动作 (allow, drop)
    #[serde(rename = "DefaultAction", skip_serializing_if = "Option::is_none")]
    pub default_action: Option<String>,

    #[serde(rename = "LogDefaultAction", skip_serializing_if = "Option::is_none")]
    pub log_default_action: Option<bool>,

    #[serde(rename = "FirewallRule", default, skip_serializing_if = "Vec::is_empty")]
    pub firewall_rule: Vec<FirewallRule>,
}

/// 防火墙规则（字段顺序即元素顺序）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirewallRule {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "IsEnabled", skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,

    #[serde(rename = "MatchOnTranslate", skip_serializing_if = "Option::is_none")]
    pub match_on_translate: Option<bool>,

    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "Policy", skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,

    #[serde(rename = "Protocols", skip_serializing_if = "Option::is_none")]
    pub protocols: Option<FirewallRuleProtocols>,

    #[serde(rename = "IcmpSubType", skip_serializing_if = "Option::is_none")]
    pub icmp_sub_type: Option<String>,

    #[serde(rename = "Port", skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,

    #[serde(rename = "DestinationPortRange", skip_serializing_if = "Option::is_none")]
    pub destination_port_range: Option<String>,

    #[serde(rename = "DestinationIp", skip_serializing_if = "Option::is_none")]
    pub destination_ip: Option<String>,

    #[serde(rename = "DestinationVm", skip_serializing_if = "Option::is_none")]
    pub destination_vm: Option<VmSelection>,

    #[serde(rename = "SourcePort", skip_serializing_if = "Option::is_none")]
    pub source_port: Option<i32>,

    #[serde(rename = "SourcePortRange", skip_serializing_if = "Option::is_none")]
    pub source_port_range: Option<String>,

    #[serde(rename = "SourceIp", skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,

    #[serde(rename = "SourceVm", skip_serializing_if = "Option::is_none")]
    pub source_vm: Option<VmSelection>,

    #[serde(rename = "Direction", skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,

    #[serde(rename = "EnableLogging", skip_serializing_if = "Option::is_none")]
    pub enable_logging: Option<bool>,
}

/// 防火墙规则匹配的协议
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirewallRuleProtocols {
    #[serde(rename = "Tcp", skip_serializing_if = "Option::is_none")]
    pub tcp: Option<bool>,

    #[serde(rename = "Udp", skip_serializing_if = "Option::is_none")]
    pub udp: Option<bool>,

    #[serde(rename = "Icmp", skip_serializing_if = "Option::is_none")]
    pub icmp: Option<bool>,

    #[serde(rename = "Any", skip_serializing_if = "Option::is_none")]
    pub any: Option<bool>,

    #[serde(rename = "Other", skip_serializing_if = "Option::is_none")]
    pub other: Option<String>,
}

/// 按虚拟机网卡选择规则端点
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VmSelection {
    #[serde(rename = "VAppScopedVmId", default)]
    pub vapp_scoped_vm_id: String,

    #[serde(rename = "VmNicId", default)]
    pub vm_nic_id: u32,

    /// 地址类型 (assigned, NAT)
    #[serde(rename = "IpType", default)]
    pub ip_type: String,
}

// ============================================
// NAT
// ============================================

/// NAT 服务
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NatService {
    #[serde(rename = "IsEnabled", default)]
    pub is_enabled: bool,

    /// NAT 类型 (ipTranslation, portForwarding)
    #[serde(rename = "NatType", skip_serializing_if = "Option::is_none")]
    pub nat_type: Option<String>,

    #[serde(rename = "Policy", skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,

    #[serde(rename = "NatRule", default, skip_serializing_if = "Vec::is_empty")]
    pub nat_rule: Vec<NatRule>,

    #[serde(rename = "ExternalIp", skip_serializing_if = "Option::is_none")]
    pub external_ip: Option<String>,
}

/// NAT 规则；规则体五选一
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NatRule {
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "RuleType", skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<String>,

    #[serde(rename = "IsEnabled", skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,

    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "GatewayNatRule", skip_serializing_if = "Option::is_none")]
    pub gateway_nat_rule: Option<GatewayNatRule>,

    #[serde(rename = "OneToOneBasicRule", skip_serializing_if = "Option::is_none")]
    pub one_to_one_basic_rule: Option<NatOneToOneBasicRule>,

    #[serde(rename = "OneToOneVmRule", skip_serializing_if = "Option::is_none")]
    pub one_to_one_vm_rule: Option<NatOneToOneVmRule>,

    #[serde(rename = "PortForwardingRule", skip_serializing_if = "Option::is_none")]
    pub port_forwarding_rule: Option<NatPortForwardingRule>,

    #[serde(rename = "VmRule", skip_serializing_if = "Option::is_none")]
    pub vm_rule: Option<NatVmRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayNatRule {
    #[serde(rename = "Interface", skip_serializing_if = "Option::is_none")]
    pub interface: Option<Reference>,

    #[serde(rename = "OriginalIp", default)]
    pub original_ip: String,

    #[serde(rename = "OriginalPort", skip_serializing_if = "Option::is_none")]
    pub original_port: Option<String>,

    #[serde(rename = "TranslatedIp", default)]
    pub translated_ip: String,

    #[serde(rename = "TranslatedPort", skip_serializing_if = "Option::is_none")]
    pub translated_port: Option<String>,

    #[serde(rename = "Protocol", skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    #[serde(rename = "IcmpSubType", skip_serializing_if = "Option::is_none")]
    pub icmp_sub_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NatOneToOneBasicRule {
    #[serde(rename = "MappingMode", default)]
    pub mapping_mode: String,

    #[serde(rename = "ExternalIpAddress", default)]
    pub external_ip_address: String,

    #[serde(rename = "InternalIpAddress", default)]
    pub internal_ip_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NatOneToOneVmRule {
    #[serde(rename = "MappingMode", default)]
    pub mapping_mode: String,

    #[serde(rename = "ExternalIpAddress", skip_serializing_if = "Option::is_none")]
    pub external_ip_address: Option<String>,

    #[serde(rename = "VAppScopedVmId", default)]
    pub vapp_scoped_vm_id: String,

    #[serde(rename = "VmNicId", default)]
    pub vm_nic_id: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NatPortForwardingRule {
    #[serde(rename = "ExternalIpAddress", default)]
    pub external_ip_address: String,

    #[serde(rename = "ExternalPort", default)]
    pub external_port: u32,

    #[serde(rename = "InternalIpAddress", default)]
    pub internal_ip_address: String,

    #[serde(rename = "InternalPort", default)]
    pub internal_port: u32,

    #[serde(rename = "Protocol", skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NatVmRule {
    #[serde(rename = "ExternalIpAddress", skip_serializing_if = "Option::is_none")]
    pub external_ip_address: Option<String>,

    #[serde(rename = "ExternalPort", default)]
    pub external_port: i32,

    #[serde(rename = "VAppScopedVmId", default)]
    pub vapp_scoped_vm_id: String,

    #[serde(rename = "VmNicId", default)]
    pub vm_nic_id: u32,

    #[serde(rename = "InternalPort", default)]
    pub internal_port: i32,

    #[serde(rename = "Protocol", skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

// ============================================
// 静态路由
// ============================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticRoutingService {
    #[serde(rename = "IsEnabled", default)]
    pub is_enabled: bool,

    #[serde(rename = "StaticRoute", default, skip_serializing_if = "Vec::is_empty")]
    pub static_route: Vec<StaticRoute>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticRoute {
    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "Network", default)]
    pub network: String,

    #[serde(rename = "NextHopIp", default)]
    pub next_hop_ip: String,

    /// 出口 (Internal, External)
    #[serde(rename = "Interface", skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,

    #[serde(rename = "GatewayInterface", skip_serializing_if = "Option::is_none")]
    pub gateway_interface: Option<Reference>,
}

// ============================================
// IPsec VPN
// ============================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpsecVpnService {
    #[serde(rename = "IsEnabled", default)]
    pub is_enabled: bool,

    #[serde(rename = "ExternalIpAddress", skip_serializing_if = "Option::is_none")]
    pub external_ip_address: Option<String>,

    #[serde(rename = "PublicIpAddress", skip_serializing_if = "Option::is_none")]
    pub public_ip_address: Option<String>,

    #[serde(rename = "IpsecVpnTunnel", default, skip_serializing_if = "Vec::is_empty")]
    pub ipsec_vpn_tunnel: Vec<IpsecVpnTunnel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpsecVpnTunnel {
    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "PeerIpAddress", skip_serializing_if = "Option::is_none")]
    pub peer_ip_address: Option<String>,

    #[serde(rename = "PeerId", skip_serializing_if = "Option::is_none")]
    pub peer_id: Option<String>,

    #[serde(rename = "LocalIpAddress", skip_serializing_if = "Option::is_none")]
    pub local_ip_address: Option<String>,

    #[serde(rename = "LocalId", skip_serializing_if = "Option::is_none")]
    pub local_id: Option<String>,

    #[serde(rename = "LocalSubnet", default, skip_serializing_if = "Vec::is_empty")]
    pub local_subnet: Vec<IpsecVpnSubnet>,

    #[serde(rename = "PeerSubnet", default, skip_serializing_if = "Vec::is_empty")]
    pub peer_subnet: Vec<IpsecVpnSubnet>,

    #[serde(rename = "SharedSecret", skip_serializing_if = "Option::is_none")]
    pub shared_secret: Option<String>,

    #[serde(rename = "SharedSecretEncrypted", skip_serializing_if = "Option::is_none")]
    pub shared_secret_encrypted: Option<bool>,

    #[serde(rename = "EncryptionProtocol", skip_serializing_if = "Option::is_none")]
    pub encryption_protocol: Option<String>,

    #[serde(rename = "Mtu", skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,

    #[serde(rename = "IsEnabled", skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,

    #[serde(rename = "IsOperational", skip_serializing_if = "Option::is_none")]
    pub is_operational: Option<bool>,

    #[serde(rename = "ErrorDetails", skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpsecVpnSubnet {
    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "Gateway", default)]
    pub gateway: String,

    #[serde(rename = "Netmask", default)]
    pub netmask: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::network::NetworkConfiguration;
    use crate::xml::{from_xml, to_xml};

    const ROUTED_CONFIGURATION: &str = r#"<Configuration>
        <ParentNetwork href="https://vcd.local/api/admin/network/org-1" name="org-net"/>
        <FenceMode>natRouted</FenceMode>
        <RetainNetInfoAcrossDeployments>false</RetainNetInfoAcrossDeployments>
        <Features>
            <FirewallService>
                <IsEnabled>true</IsEnabled>
                <DefaultAction>drop</DefaultAction>
                <LogDefaultAction>false</LogDefaultAction>
                <FirewallRule>
                    <IsEnabled>true</IsEnabled>
                    <Description>ssh-in</Description>
                    <Policy>allow</Policy>
                    <Protocols>
                        <Tcp>true</Tcp>
                    </Protocols>
                    <Port>22</Port>
                    <DestinationPortRange>22</DestinationPortRange>
                    <DestinationIp>Any</DestinationIp>
                    <SourcePort>-1</SourcePort>
                    <SourcePortRange>Any</SourcePortRange>
                    <SourceIp>Any</SourceIp>
                    <EnableLogging>false</EnableLogging>
                </FirewallRule>
                <FirewallRule>
                    <IsEnabled>true</IsEnabled>
                    <Description>egress</Description>
                    <Policy>allow</Policy>
                    <Protocols>
                        <Any>true</Any>
                    </Protocols>
                    <DestinationIp>external</DestinationIp>
                    <SourceIp>internal</SourceIp>
                    <EnableLogging>false</EnableLogging>
                </FirewallRule>
            </FirewallService>
            <NatService>
                <IsEnabled>true</IsEnabled>
                <NatType>portForwarding</NatType>
                <Policy>allowTraffic</Policy>
                <NatRule>
                    <Id>65537</Id>
                    <VmRule>
                        <ExternalIpAddress>10.10.0.50</ExternalIpAddress>
                        <ExternalPort>2222</ExternalPort>
                        <VAppScopedVmId>a1b2c3</VAppScopedVmId>
                        <VmNicId>0</VmNicId>
                        <InternalPort>22</InternalPort>
                        <Protocol>TCP</Protocol>
                    </VmRule>
                </NatRule>
            </NatService>
            <StaticRoutingService>
                <IsEnabled>true</IsEnabled>
                <StaticRoute>
                    <Name>lab</Name>
                    <Network>172.16.0.0/16</Network>
                    <NextHopIp>10.10.0.1</NextHopIp>
                    <Interface>External</Interface>
                </StaticRoute>
            </StaticRoutingService>
        </Features>
        <SyslogServerSettings>
            <SyslogServerIp1>10.10.0.9</SyslogServerIp1>
        </SyslogServerSettings>
        <RouterInfo>
            <ExternalIp>10.10.0.50</ExternalIp>
        </RouterInfo>
        <GuestVlanAllowed>false</GuestVlanAllowed>
    </Configuration>"#;

    #[test]
    fn test_decode_routed_services() {
        let config: NetworkConfiguration = from_xml(ROUTED_CONFIGURATION).unwrap();
        let features = config.features.as_ref().unwrap();

        let firewall = features.firewall_service.as_ref().unwrap();
        assert!(firewall.is_enabled);
        assert_eq!(firewall.default_action.as_deref(), Some("drop"));
        assert_eq!(firewall.firewall_rule.len(), 2);
        let ssh = &firewall.firewall_rule[0];
        assert_eq!(ssh.port, Some(22));
        assert_eq!(ssh.source_port, Some(-1));
        assert_eq!(ssh.protocols.as_ref().unwrap().tcp, Some(true));
        assert_eq!(firewall.firewall_rule[1].protocols.as_ref().unwrap().any, Some(true));

        let nat = features.nat_service.as_ref().unwrap();
        assert_eq!(nat.nat_type.as_deref(), Some("portForwarding"));
        let vm_rule = nat.nat_rule[0].vm_rule.as_ref().unwrap();
        assert_eq!(vm_rule.external_port, 2222);
        assert_eq!(vm_rule.vapp_scoped_vm_id, "a1b2c3");

        let routing = features.static_routing_service.as_ref().unwrap();
        assert_eq!(routing.static_route[0].next_hop_ip, "10.10.0.1");

        assert_eq!(config.router_info.as_ref().unwrap().external_ip, "10.10.0.50");
        assert_eq!(
            config.syslog_server_settings.as_ref().unwrap().syslog_server_ip1.as_deref(),
            Some("10.10.0.9")
        );
    }

    #[test]
    fn test_routed_services_survive_rewrite() {
        let config: NetworkConfiguration = from_xml(ROUTED_CONFIGURATION).unwrap();
        let xml = to_xml("Configuration", &config).unwrap();

        let reparsed: NetworkConfiguration = from_xml(&xml).unwrap();
        assert_eq!(reparsed.features, config.features);
        assert_eq!(reparsed.router_info, config.router_info);
        assert_eq!(reparsed.syslog_server_settings, config.syslog_server_settings);

        // 元素顺序：Features, SyslogServerSettings, RouterInfo, GuestVlanAllowed
        let features = xml.find("<Features>").unwrap();
        let syslog = xml.find("<SyslogServerSettings>").unwrap();
        let router = xml.find("<RouterInfo>").unwrap();
        let vlan = xml.find("<GuestVlanAllowed>").unwrap();
        assert!(features < syslog && syslog < router && router < vlan);

        // 服务顺序：防火墙, NAT, 静态路由
        let firewall = xml.find("<FirewallService>").unwrap();
        let nat = xml.find("<NatService>").unwrap();
        let routing = xml.find("<StaticRoutingService>").unwrap();
        assert!(firewall < nat && nat < routing);
    }
}
