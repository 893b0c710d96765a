//! vCloud Director XML 文档模型

pub mod common;
pub mod metadata;
pub mod network;
pub mod params;
pub mod services;
pub mod task;
pub mod vapp;
pub mod vdc;

pub use common::{find_link_by_type, mime, Link, Reference};
pub use metadata::{Metadata, MetadataEntry, MetadataType, MetadataValue, TypedValue};
pub use network::{
    DhcpService, FenceMode, IpAllocationMode, IpRange, IpRanges, IpScope, IpScopes,
    NetworkAssignment, NetworkConfigSection, NetworkConfiguration, NetworkConnection,
    NetworkConnectionSection, NetworkFeatures, OrgVdcNetwork, VAppNetworkConfiguration,
};
pub use params::{
    DeleteItem, DeployVAppParams, GuestCustomizationSection, InstantiationParams,
    ProductSection, ProductSectionList, Property, PropertyValue, RasdItem,
    RecomposeVAppParams, SourcedCompositionItemParam, UndeployPowerAction,
    UndeployVAppParams, VmCapabilities, VmGeneralParams, VmUpdateParams,
};
pub use services::{
    FirewallRule, FirewallRuleProtocols, FirewallService, GatewayNatRule, IpsecVpnService,
    IpsecVpnSubnet, IpsecVpnTunnel, NatOneToOneBasicRule, NatOneToOneVmRule,
    NatPortForwardingRule, NatRule, NatService, NatVmRule, RouterInfo, StaticRoute,
    StaticRoutingService, SyslogServerSettings, VmSelection,
};
pub use task::{Task, TaskStatus, TasksInProgress, VcdErrorDocument};
pub use vapp::{VApp, VAppChildren, VAppStatus, VAppTemplate, Vm};
pub use vdc::{Vdc, VdcStorageProfiles};
