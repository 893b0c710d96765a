//! vApp 管理 API
//!
//! 提供 vApp 的完整生命周期管理，包括：
//! - 电源操作：开机、关机、重启、重置、挂起、关闭客户机
//! - 部署操作：部署、取消部署、删除
//! - 组成变更：从模板添加虚拟机、移除虚拟机
//! - 虚拟机定制：客户机定制、CPU/内存、存储策略、名称、OVF 属性
//! - 状态等待：阻塞直到 vApp 离开指定状态

use std::collections::HashMap;
use std::net::IpAddr;

use reqwest::Method;
use tokio::time::{Duration, Instant};
use tracing::{debug, info};

use crate::api::TaskApi;
use crate::client::VcdClient;
use crate::error::{Result, VcdError};
use crate::models::{
    find_link_by_type, mime, DeleteItem, DeployVAppParams, GuestCustomizationSection,
    InstantiationParams, IpAllocationMode, Metadata, NetworkAssignment, NetworkConnection,
    NetworkConnectionSection, ProductSectionList, RasdItem, RecomposeVAppParams, Reference,
    SourcedCompositionItemParam, UndeployPowerAction, UndeployVAppParams, VApp, VAppStatus,
    VAppTemplate, Vdc, Vm, VmCapabilities, VmGeneralParams, VmUpdateParams,
};
use crate::xml::href_with_suffix;

/// vApp 模板可用于创建虚拟机时的状态码（已解析且关机）
const TEMPLATE_READY_STATUS: i32 = 8;

/// 从模板添加虚拟机时的单个网卡配置
#[derive(Debug, Clone, Default)]
pub struct VmNetworkSpec {
    /// 连接的网络名称（同时作为 vApp 网络映射）
    pub org_network: String,

    /// IP 配置：`dhcp` / `allocated` / `none` / IP 地址，为空时使用 `ip_allocation_mode`
    pub ip: String,

    /// `ip` 为空时的分配模式
    pub ip_allocation_mode: Option<IpAllocationMode>,

    /// 网卡类型（如 `VMXNET3`）
    pub adapter_type: Option<String>,

    /// 是否为主网卡
    pub is_primary: bool,
}

impl VmNetworkSpec {
    pub fn new(org_network: &str, ip: &str) -> Self {
        Self {
            org_network: org_network.to_string(),
            ip: ip.to_string(),
            ..Default::default()
        }
    }
}

/// 解析网卡 IP 配置，返回（分配模式，IP 地址）
///
/// 无法识别的非空字符串按 DHCP 处理，地址默认为 `Any`。
pub fn resolve_ip_allocation(ip: &str, fallback: Option<IpAllocationMode>) -> (IpAllocationMode, String) {
    let any = "Any".to_string();
    match ip {
        "dhcp" => (IpAllocationMode::Dhcp, any),
        "allocated" => (IpAllocationMode::Pool, any),
        "none" => (IpAllocationMode::None, any),
        "" => (fallback.unwrap_or(IpAllocationMode::None), any),
        other => match other.parse::<IpAddr>() {
            Ok(_) => (IpAllocationMode::Manual, other.to_string()),
            Err(_) => (IpAllocationMode::Dhcp, any),
        },
    }
}

/// vApp 管理 API
///
/// 持有一份 vApp 文档缓存，需要最新状态的操作会先刷新。
pub struct VAppApi<'a> {
    client: &'a VcdClient,
    vapp: VApp,
}

impl<'a> VAppApi<'a> {
    /// 创建新的 vApp API 实例
    pub(crate) fn new(client: &'a VcdClient, vapp: VApp) -> Self {
        Self { client, vapp }
    }

    /// 当前缓存的 vApp 文档
    pub fn vapp(&self) -> &VApp {
        &self.vapp
    }

    pub fn href(&self) -> &str {
        &self.vapp.href
    }

    pub(crate) fn client(&self) -> &'a VcdClient {
        self.client
    }

    pub(crate) fn vapp_mut(&mut self) -> &mut VApp {
        &mut self.vapp
    }

    /// 重新拉取 vApp 文档
    pub async fn refresh(&mut self) -> Result<()> {
        if self.vapp.href.is_empty() {
            return Err(VcdError::InvalidInput("vApp HREF 为空，无法刷新".to_string()));
        }

        let url = href_with_suffix(&self.vapp.href, "")?;
        self.vapp = self.client.get_xml(url).await?;
        Ok(())
    }

    /// 第一台虚拟机，vApp 没有子节点时报错
    fn first_vm(&self) -> Result<&Vm> {
        self.vapp.first_vm().ok_or_else(|| {
            VcdError::InvalidInput(format!("vApp {} 不包含任何虚拟机", self.vapp.name))
        })
    }

    fn first_vm_href(&self) -> Result<String> {
        let vm = self.first_vm()?;
        if vm.href.is_empty() {
            return Err(VcdError::InvalidInput("虚拟机 HREF 为空".to_string()));
        }
        Ok(vm.href.clone())
    }

    /// 查询 vApp 所在的 VDC
    pub async fn parent_vdc(&self) -> Result<Vdc> {
        let link = find_link_by_type(&self.vapp.links, mime::VDC).ok_or_else(|| {
            VcdError::NotFound(format!("vApp {} 没有上级 VDC 链接", self.vapp.name))
        })?;
        self.client.vdc(&link.href).get().await
    }

    // ============================================
    // 组成变更
    // ============================================

    /// 从 vApp 模板添加虚拟机
    ///
    /// # Arguments
    /// * `networks` - 网卡配置，按顺序分配网卡序号
    /// * `template` - vApp 模板（必须已解析且关机）
    /// * `name` - 新虚拟机名称
    /// * `accept_all_eulas` - 是否自动接受许可协议
    pub async fn add_vm(
        &self,
        networks: &[VmNetworkSpec],
        template: &VAppTemplate,
        name: &str,
        accept_all_eulas: bool,
    ) -> Result<TaskApi<'a>> {
        info!("添加虚拟机: {} -> vApp {}", name, self.vapp.name);

        let source_vm = template
            .first_vm()
            .ok_or_else(|| VcdError::InvalidInput("vApp 模板为空".to_string()))?;
        if template.status != TEMPLATE_READY_STATUS {
            return Err(VcdError::InvalidInput(format!(
                "vApp 模板 {} 状态为 {}，需要已解析且关机",
                template.name,
                VAppStatus::from_code(template.status)
            )));
        }

        let template_section = source_vm.network_connection_section.as_ref();
        let mut section = NetworkConnectionSection {
            info: "Network config for sourced item".to_string(),
            href: template_section.map(|s| s.href.clone()).unwrap_or_default(),
            section_type: template_section.map(|s| s.section_type.clone()).unwrap_or_default(),
            primary_network_connection_index: template_section
                .map(|s| s.primary_network_connection_index)
                .unwrap_or_default(),
            ..Default::default()
        };
        let mut assignments = Vec::with_capacity(networks.len());

        for (index, network) in networks.iter().enumerate() {
            let (mode, address) = resolve_ip_allocation(&network.ip, network.ip_allocation_mode);
            debug!(
                "网卡 {}: 网络 {} 模式 {} 地址 {}",
                index,
                network.org_network,
                mode.as_str(),
                address
            );

            section.network_connection.push(NetworkConnection {
                network: network.org_network.clone(),
                network_connection_index: index as u32,
                ip_address: Some(address),
                is_connected: true,
                ip_address_allocation_mode: mode.as_str().to_string(),
                network_adapter_type: network.adapter_type.clone().filter(|t| !t.is_empty()),
                ..Default::default()
            });

            if network.is_primary {
                section.primary_network_connection_index = index as u32;
            }

            assignments.push(NetworkAssignment {
                inner_network: network.org_network.clone(),
                container_network: network.org_network.clone(),
            });
        }

        let params = RecomposeVAppParams {
            name: Some(self.vapp.name.clone()),
            description: self.vapp.description.clone(),
            sourced_item: Some(SourcedCompositionItemParam {
                source: Reference::new(&source_vm.href, name),
                vm_general_params: Some(VmGeneralParams {
                    name: Some(name.to_string()),
                    description: None,
                    needs_customization: Some(true),
                }),
                instantiation_params: Some(InstantiationParams {
                    network_connection_section: Some(section),
                }),
                network_assignment: assignments,
                vm_capabilities: Some(VmCapabilities {
                    memory_hot_add_enabled: true,
                    cpu_hot_add_enabled: true,
                }),
            }),
            all_eulas_accepted: Some(accept_all_eulas),
            ..Default::default()
        };

        self.recompose(&params).await
    }

    /// 从 vApp 中移除虚拟机，等待删除完成
    pub async fn remove_vm(&mut self, vm: &Vm) -> Result<()> {
        info!("移除虚拟机: {} <- vApp {}", vm.name, self.vapp.name);

        self.refresh().await?;

        let pending = self
            .vapp
            .tasks
            .as_ref()
            .map(|t| t.tasks.clone())
            .unwrap_or_default();
        for task in pending {
            debug!("等待 vApp 上的任务: {}", task.href);
            self.client.task_from(task).wait_completion().await?;
        }

        let params = RecomposeVAppParams {
            delete_item: Some(DeleteItem { href: vm.href.clone() }),
            ..Default::default()
        };

        let mut task = self.recompose(&params).await?;
        task.wait_completion().await
    }

    async fn recompose(&self, params: &RecomposeVAppParams) -> Result<TaskApi<'a>> {
        let client = self.client;
        let url = href_with_suffix(&self.vapp.href, "/action/recomposeVApp")?;
        client
            .send_task(
                Method::POST,
                url,
                mime::RECOMPOSE_VAPP_PARAMS,
                "RecomposeVAppParams",
                params,
            )
            .await
    }

    // ============================================
    // 电源与部署
    // ============================================

    async fn power_action(&self, action: &str) -> Result<TaskApi<'a>> {
        let client = self.client;
        let url = href_with_suffix(&self.vapp.href, &format!("/power/action/{}", action))?;
        client.send_empty_task(Method::POST, url).await
    }

    /// 开机（先等待 vApp 离开 UNRESOLVED 状态）
    pub async fn power_on(&mut self) -> Result<TaskApi<'a>> {
        info!("vApp 开机: {}", self.vapp.name);
        let timeout = self.client.config().max_retry_timeout;
        self.block_while_status(VAppStatus::Unresolved, timeout).await?;
        self.power_action("powerOn").await
    }

    /// 关机（强制断电）
    pub async fn power_off(&self) -> Result<TaskApi<'a>> {
        info!("vApp 关机: {}", self.vapp.name);
        self.power_action("powerOff").await
    }

    /// 重启
    pub async fn reboot(&self) -> Result<TaskApi<'a>> {
        info!("vApp 重启: {}", self.vapp.name);
        self.power_action("reboot").await
    }

    /// 重置
    pub async fn reset(&self) -> Result<TaskApi<'a>> {
        info!("vApp 重置: {}", self.vapp.name);
        self.power_action("reset").await
    }

    /// 挂起
    pub async fn suspend(&self) -> Result<TaskApi<'a>> {
        info!("vApp 挂起: {}", self.vapp.name);
        self.power_action("suspend").await
    }

    /// 关闭客户机操作系统
    pub async fn shutdown(&self) -> Result<TaskApi<'a>> {
        info!("vApp 关闭客户机: {}", self.vapp.name);
        self.power_action("shutdown").await
    }

    /// 取消部署（断电）
    pub async fn undeploy(&self) -> Result<TaskApi<'a>> {
        self.undeploy_with(UndeployPowerAction::PowerOff).await
    }

    /// 以指定电源操作取消部署
    pub async fn undeploy_with(&self, action: UndeployPowerAction) -> Result<TaskApi<'a>> {
        info!("vApp 取消部署: {} ({})", self.vapp.name, action.as_str());
        let client = self.client;
        let url = href_with_suffix(&self.vapp.href, "/action/undeploy")?;
        client
            .send_task(
                Method::POST,
                url,
                mime::UNDEPLOY_VAPP_PARAMS,
                "UndeployVAppParams",
                &UndeployVAppParams::new(action),
            )
            .await
    }

    /// 部署（不开机）
    pub async fn deploy(&self) -> Result<TaskApi<'a>> {
        info!("vApp 部署: {}", self.vapp.name);
        let client = self.client;
        let url = href_with_suffix(&self.vapp.href, "/action/deploy")?;
        client
            .send_task(
                Method::POST,
                url,
                mime::DEPLOY_VAPP_PARAMS,
                "DeployVAppParams",
                &DeployVAppParams::default(),
            )
            .await
    }

    /// 删除 vApp
    pub async fn delete(&self) -> Result<TaskApi<'a>> {
        info!("删除 vApp: {}", self.vapp.name);
        let client = self.client;
        let url = href_with_suffix(&self.vapp.href, "")?;
        client.send_empty_task(Method::DELETE, url).await
    }

    // ============================================
    // 状态
    // ============================================

    /// 刷新并返回 vApp 状态
    pub async fn status(&mut self) -> Result<VAppStatus> {
        self.refresh().await?;
        Ok(VAppStatus::from_code(self.vapp.status))
    }

    /// 阻塞直到 vApp 状态不再是 `unwanted`
    ///
    /// 每隔 `status_poll_interval` 查询一次状态，`timeout_secs` 秒后返回超时错误。
    pub async fn block_while_status(&mut self, unwanted: VAppStatus, timeout_secs: u64) -> Result<()> {
        info!("等待 vApp {} 离开状态 {}", self.vapp.name, unwanted);

        let interval = self.client.config().status_poll_interval;
        let deadline = Instant::now() + Duration::from_secs(timeout_secs);

        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {
                    return Err(VcdError::Timeout(format!(
                        "等待 vApp 离开状态 {} 超时，已等待 {} 秒",
                        unwanted, timeout_secs
                    )));
                }
                _ = tokio::time::sleep(interval) => {
                    let current = self.status().await.map_err(|e| {
                        VcdError::OperationFailed(format!("无法获取 vApp 状态: {}", e))
                    })?;
                    if current != unwanted {
                        debug!("vApp {} 当前状态 {}", self.vapp.name, current);
                        return Ok(());
                    }
                }
            }
        }
    }

    // ============================================
    // 虚拟机定制
    // ============================================

    /// 在第一台虚拟机上执行定制脚本
    pub async fn run_customization_script(
        &mut self,
        computer_name: &str,
        script: &str,
    ) -> Result<TaskApi<'a>> {
        self.customize(computer_name, script, false).await
    }

    /// 定制第一台虚拟机的客户机操作系统
    pub async fn customize(
        &mut self,
        computer_name: &str,
        script: &str,
        change_sid: bool,
    ) -> Result<TaskApi<'a>> {
        info!("定制虚拟机: vApp {} 计算机名 {}", self.vapp.name, computer_name);

        self.refresh().await?;
        let vm_href = self.first_vm_href()?;

        let mut section = GuestCustomizationSection::new(&vm_href, mime::GUEST_CUSTOMIZATION_SECTION);
        section.enabled = Some(true);
        section.change_sid = Some(change_sid);
        section.customization_script = Some(script.to_string());
        section.computer_name = Some(computer_name.to_string());

        let client = self.client;
        let url = href_with_suffix(&vm_href, "/guestCustomizationSection/")?;
        client
            .send_task(
                Method::PUT,
                url,
                mime::GUEST_CUSTOMIZATION_SECTION,
                "GuestCustomizationSection",
                &section,
            )
            .await
    }

    /// 查询第一台虚拟机的网卡连接
    pub async fn network_connection_section(&self) -> Result<NetworkConnectionSection> {
        let vm_href = self.first_vm_href()?;
        info!("查询虚拟机网卡连接: {}", vm_href);
        let url = href_with_suffix(&vm_href, "/networkConnectionSection/")?;
        self.client.get_xml(url).await
    }

    /// 回写第一台虚拟机的网卡连接
    pub async fn set_network_connection_section(
        &self,
        mut section: NetworkConnectionSection,
    ) -> Result<TaskApi<'a>> {
        let vm_href = self.first_vm_href()?;
        info!("修改虚拟机网卡连接: {}", vm_href);

        section.xmlns = crate::models::common::XMLNS_VCLOUD.to_string();
        section.xmlns_ovf = crate::models::common::XMLNS_OVF.to_string();
        if section.info.is_empty() {
            section.info = "Specifies the available VM network connections".to_string();
        }

        let client = self.client;
        let url = href_with_suffix(&vm_href, "/networkConnectionSection/")?;
        client
            .send_task(
                Method::PUT,
                url,
                mime::NETWORK_CONNECTION_SECTION,
                "NetworkConnectionSection",
                &section,
            )
            .await
    }

    /// 修改 vCPU 数量
    pub async fn change_cpu_count(&mut self, cpu_count: u32) -> Result<TaskApi<'a>> {
        self.change_cpu_count_with_cores(cpu_count, None).await
    }

    /// 修改 vCPU 数量及每插槽核数
    pub async fn change_cpu_count_with_cores(
        &mut self,
        cpu_count: u32,
        cores_per_socket: Option<u32>,
    ) -> Result<TaskApi<'a>> {
        info!("修改 vCPU: vApp {} -> {} (每插槽核数 {:?})", self.vapp.name, cpu_count, cores_per_socket);

        self.refresh().await?;
        let vm_href = self.first_vm_href()?;
        let item = RasdItem::cpu(&vm_href, cpu_count, cores_per_socket);
        self.put_hardware_item(&vm_href, "/virtualHardwareSection/cpu", &item).await
    }

    /// 修改内存大小（MB）
    pub async fn change_memory_size(&mut self, size_mb: u32) -> Result<TaskApi<'a>> {
        info!("修改内存: vApp {} -> {} MB", self.vapp.name, size_mb);

        self.refresh().await?;
        let vm_href = self.first_vm_href()?;
        let item = RasdItem::memory(&vm_href, size_mb);
        self.put_hardware_item(&vm_href, "/virtualHardwareSection/memory", &item).await
    }

    async fn put_hardware_item(&self, vm_href: &str, suffix: &str, item: &RasdItem) -> Result<TaskApi<'a>> {
        let client = self.client;
        let url = href_with_suffix(vm_href, suffix)?;
        client
            .send_task(Method::PUT, url, mime::RASD_ITEM, "vcloud:Item", item)
            .await
    }

    /// 修改第一台虚拟机的存储策略
    pub async fn change_storage_profile(&mut self, name: &str) -> Result<TaskApi<'a>> {
        info!("修改存储策略: vApp {} -> {}", self.vapp.name, name);

        self.refresh().await?;
        let vm = self.first_vm()?;
        let vm_href = vm.href.clone();
        let vm_name = vm.name.clone();

        let vdc = self.parent_vdc().await?;
        let profile = vdc.find_storage_profile(name).cloned().ok_or_else(|| {
            VcdError::NotFound(format!("VDC {} 中不存在存储策略 {}", vdc.name, name))
        })?;

        let mut params = VmUpdateParams::new(&vm_name);
        params.storage_profile = Some(profile);
        self.put_vm(&vm_href, &params).await
    }

    /// 修改第一台虚拟机名称
    pub async fn change_vm_name(&mut self, name: &str) -> Result<TaskApi<'a>> {
        info!("修改虚拟机名称: vApp {} -> {}", self.vapp.name, name);

        self.refresh().await?;
        let vm_href = self.first_vm_href()?;
        self.put_vm(&vm_href, &VmUpdateParams::new(name)).await
    }

    async fn put_vm(&self, vm_href: &str, params: &VmUpdateParams) -> Result<TaskApi<'a>> {
        let client = self.client;
        let url = href_with_suffix(vm_href, "")?;
        client.send_task(Method::PUT, url, mime::VM, "Vm", params).await
    }

    /// 设置第一台虚拟机的 OVF 属性值
    ///
    /// 只修改已存在的属性，未知 key 忽略。
    pub async fn set_ovf(&mut self, parameters: &HashMap<String, String>) -> Result<TaskApi<'a>> {
        info!("设置 OVF 属性: vApp {} ({} 项)", self.vapp.name, parameters.len());

        self.refresh().await?;
        let vm = self.first_vm()?;
        let vm_href = vm.href.clone();
        let mut section = vm.product_section.clone().ok_or_else(|| {
            VcdError::InvalidInput(format!("vApp {} 的虚拟机没有 ProductSection", self.vapp.name))
        })?;

        let changed = section.apply_values(parameters);
        debug!("OVF 属性修改数量: {}", changed);

        let client = self.client;
        let url = href_with_suffix(&vm_href, "/productSections")?;
        client
            .send_task(
                Method::PUT,
                url,
                mime::PRODUCT_SECTIONS,
                "ProductSectionList",
                &ProductSectionList::new(section),
            )
            .await
    }

    // ============================================
    // 元数据
    // ============================================

    /// 查询 vApp 元数据
    pub async fn metadata(&self) -> Result<Metadata> {
        self.client.metadata(&self.vapp.href).get().await
    }

    /// 添加字符串元数据
    pub async fn add_metadata(&self, key: &str, value: &str) -> Result<TaskApi<'a>> {
        let client = self.client;
        client.metadata(&self.vapp.href).add(key, value).await
    }

    /// 删除元数据
    pub async fn delete_metadata(&self, key: &str) -> Result<TaskApi<'a>> {
        let client = self.client;
        client.metadata(&self.vapp.href).delete(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_ip_keywords() {
        assert_eq!(resolve_ip_allocation("dhcp", None), (IpAllocationMode::Dhcp, "Any".to_string()));
        assert_eq!(resolve_ip_allocation("allocated", None), (IpAllocationMode::Pool, "Any".to_string()));
        assert_eq!(
            resolve_ip_allocation("none", Some(IpAllocationMode::Pool)),
            (IpAllocationMode::None, "Any".to_string())
        );
    }

    #[test]
    fn test_resolve_ip_address() {
        assert_eq!(
            resolve_ip_allocation("10.0.0.15", None),
            (IpAllocationMode::Manual, "10.0.0.15".to_string())
        );
        assert_eq!(
            resolve_ip_allocation("fe80::1", None),
            (IpAllocationMode::Manual, "fe80::1".to_string())
        );
        // 非法地址按 DHCP 处理
        assert_eq!(resolve_ip_allocation("10.0.0", None), (IpAllocationMode::Dhcp, "Any".to_string()));
    }

    #[test]
    fn test_resolve_ip_fallback() {
        assert_eq!(
            resolve_ip_allocation("", Some(IpAllocationMode::Pool)),
            (IpAllocationMode::Pool, "Any".to_string())
        );
        assert_eq!(resolve_ip_allocation("", None), (IpAllocationMode::None, "Any".to_string()));
    }
}
