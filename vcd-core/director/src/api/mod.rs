//! vCloud Director API 模块
//!
//! - vApp 管理 (VAppApi)，网络配置操作也挂在 VAppApi 上
//! - 任务轮询 (TaskApi)
//! - 元数据 (MetadataApi)
//! - VDC 查询 (VdcApi)

pub mod metadata;
pub mod network;
pub mod task;
pub mod vapp;
pub mod vdc;

pub use metadata::MetadataApi;
pub use network::{DhcpSettings, VAppNetworkSettings};
pub use task::TaskApi;
pub use vapp::{resolve_ip_allocation, VAppApi, VmNetworkSpec};
pub use vdc::VdcApi;
