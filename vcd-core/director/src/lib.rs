//! vCloud Director vApp 客户端
//!
//! 基于 vCloud Director REST/XML API 的轻量客户端：构造 XML 请求体、
//! 发送 HTTP 请求、解码 XML 响应并轮询异步任务。
//!
//! # 功能
//!
//! - **会话管理** (`VcdClient`): 组织登录、令牌维护、登出
//! - **vApp 管理** (`VAppApi`): 电源操作、部署、删除、添加/移除虚拟机、状态等待
//! - **虚拟机定制**: 客户机定制、CPU/内存、存储策略、名称、OVF 属性
//! - **网络管理**: vApp 网络配置、隔离网络增删、网卡连接
//! - **元数据** (`MetadataApi`): 查询、写入、删除
//! - **任务** (`TaskApi`): 等待完成、取消
//!
//! # 示例
//!
//! ```ignore
//! use vcd_director::{ClientConfig, VcdClient, VAppStatus};
//!
//! let client = VcdClient::new("https://vcd.example.com/api", ClientConfig::default())?;
//! client.login("my-org", "admin", "password").await?;
//!
//! let mut vapp = client.vapp("https://vcd.example.com/api/vApp/vapp-1").await?;
//! vapp.power_on().await?.wait_completion().await?;
//! vapp.block_while_status(VAppStatus::PoweredOff, 120).await?;
//!
//! vapp.add_metadata("env", "prod").await?.wait_completion().await?;
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod models;
pub mod xml;

pub use client::{ClientConfig, VcdClient};
pub use error::{Result, VcdError};

// 导出 API 模块
pub use api::{
    resolve_ip_allocation, DhcpSettings, MetadataApi, TaskApi, VAppApi, VAppNetworkSettings,
    VdcApi, VmNetworkSpec,
};

// 导出数据模型
pub use models::{
    // 状态枚举
    FenceMode, IpAllocationMode, MetadataType, TaskStatus, UndeployPowerAction, VAppStatus,

    // 资源文档
    Link, Metadata, MetadataEntry, NetworkConfigSection, NetworkConnection,
    NetworkConnectionSection, OrgVdcNetwork, Reference, Task, TypedValue, VApp,
    VAppNetworkConfiguration, VAppTemplate, Vdc, Vm,

    // 网络配置
    IpRange, IpScope,
};
