//! vApp 管理命令

use crate::commands::common::{
    close_vcd_client, create_vcd_client, finish_task, parse_ip_range, parse_key_values,
};
use crate::commands::output::{output_formatted, OutputFormat, TableRow};
use crate::{MetadataAction, NetworkAction, VappAction, VappTarget};
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use tracing::info;
use vcd_director::{
    DhcpSettings, MetadataType, OrgVdcNetwork, TypedValue, UndeployPowerAction, VAppApi,
    VAppNetworkConfiguration, VAppNetworkSettings, VAppStatus, VcdClient, Vm,
};

/// 虚拟机行
#[derive(Debug, Serialize)]
struct VmRow {
    name: String,
    status: String,
    storage_profile: String,
    href: String,
}

impl From<&Vm> for VmRow {
    fn from(vm: &Vm) -> Self {
        Self {
            name: vm.name.clone(),
            status: VAppStatus::from_code(vm.status).to_string(),
            storage_profile: vm
                .storage_profile
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            href: vm.href.clone(),
        }
    }
}

impl TableRow for VmRow {
    fn headers() -> Vec<&'static str> {
        vec!["虚拟机", "状态", "存储策略", "HREF"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.status.clone(),
            self.storage_profile.clone(),
            self.href.clone(),
        ]
    }
}

/// vApp 概要 (JSON 输出)
#[derive(Debug, Serialize)]
struct VAppSummary {
    name: String,
    href: String,
    status: String,
    deployed: bool,
    vms: Vec<VmRow>,
}

/// vApp 网络行
#[derive(Debug, Serialize)]
struct NetworkRow {
    name: String,
    fence_mode: String,
    parent_network: String,
    deployed: bool,
}

impl From<&VAppNetworkConfiguration> for NetworkRow {
    fn from(config: &VAppNetworkConfiguration) -> Self {
        let configuration = config.configuration.as_ref();
        Self {
            name: config.network_name.clone(),
            fence_mode: configuration.map(|c| c.fence_mode.clone()).unwrap_or_default(),
            parent_network: configuration
                .and_then(|c| c.parent_network.as_ref())
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            deployed: config.is_deployed,
        }
    }
}

impl TableRow for NetworkRow {
    fn headers() -> Vec<&'static str> {
        vec!["网络", "模式", "上级网络", "已部署"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.fence_mode.clone(),
            self.parent_network.clone(),
            self.deployed.to_string(),
        ]
    }
}

/// 元数据行
#[derive(Debug, Serialize)]
struct MetadataRow {
    key: String,
    value_type: String,
    value: String,
}

impl TableRow for MetadataRow {
    fn headers() -> Vec<&'static str> {
        vec!["Key", "类型", "值"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.key.clone(), self.value_type.clone(), self.value.clone()]
    }
}

impl VappAction {
    /// 子命令指向的 vApp 及配置
    pub fn target(&self) -> &VappTarget {
        match self {
            Self::Status { target, .. }
            | Self::PowerOn { target, .. }
            | Self::PowerOff { target, .. }
            | Self::Reboot { target, .. }
            | Self::Reset { target, .. }
            | Self::Suspend { target, .. }
            | Self::Shutdown { target, .. }
            | Self::Deploy { target, .. }
            | Self::Undeploy { target, .. }
            | Self::Delete { target, .. }
            | Self::WaitStatus { target, .. }
            | Self::Rename { target, .. }
            | Self::Cpu { target, .. }
            | Self::Memory { target, .. }
            | Self::StorageProfile { target, .. }
            | Self::Customize { target, .. }
            | Self::SetOvf { target, .. } => target,
            Self::Network { action } => match action {
                NetworkAction::List { target, .. }
                | NetworkAction::AddIsolated { target, .. }
                | NetworkAction::Remove { target, .. }
                | NetworkAction::Attach { target, .. } => target,
            },
            Self::Metadata { action } => match action {
                MetadataAction::List { target, .. }
                | MetadataAction::Set { target, .. }
                | MetadataAction::Delete { target, .. } => target,
            },
        }
    }
}

/// 登录后执行子命令，结束时登出
pub async fn handle(action: VappAction) -> Result<()> {
    let client = create_vcd_client(action.target().config.as_deref()).await?;
    let result = run(&client, action).await;
    close_vcd_client(&client).await;
    result
}

async fn run(client: &VcdClient, action: VappAction) -> Result<()> {
    match action {
        VappAction::Status { target, format } => show_status(client, &target, &format).await,
        VappAction::PowerOn { target, wait } => {
            let mut vapp = load_vapp(client, &target.href).await?;
            let task = vapp.power_on().await.context("开机失败")?;
            finish_task(task, wait.wait, "开机").await
        }
        VappAction::PowerOff { target, wait } => {
            let vapp = load_vapp(client, &target.href).await?;
            let task = vapp.power_off().await.context("关机失败")?;
            finish_task(task, wait.wait, "关机").await
        }
        VappAction::Reboot { target, wait } => {
            let vapp = load_vapp(client, &target.href).await?;
            let task = vapp.reboot().await.context("重启失败")?;
            finish_task(task, wait.wait, "重启").await
        }
        VappAction::Reset { target, wait } => {
            let vapp = load_vapp(client, &target.href).await?;
            let task = vapp.reset().await.context("重置失败")?;
            finish_task(task, wait.wait, "重置").await
        }
        VappAction::Suspend { target, wait } => {
            let vapp = load_vapp(client, &target.href).await?;
            let task = vapp.suspend().await.context("挂起失败")?;
            finish_task(task, wait.wait, "挂起").await
        }
        VappAction::Shutdown { target, wait } => {
            let vapp = load_vapp(client, &target.href).await?;
            let task = vapp.shutdown().await.context("客户机关机失败")?;
            finish_task(task, wait.wait, "客户机关机").await
        }
        VappAction::Deploy { target, wait } => {
            let vapp = load_vapp(client, &target.href).await?;
            let task = vapp.deploy().await.context("部署失败")?;
            finish_task(task, wait.wait, "部署").await
        }
        VappAction::Undeploy {
            target,
            wait,
            action,
        } => {
            let power_action = UndeployPowerAction::from_str(&action)
                .with_context(|| format!("未知的电源动作: {}", action))?;
            let vapp = load_vapp(client, &target.href).await?;
            let task = vapp.undeploy_with(power_action).await.context("取消部署失败")?;
            finish_task(task, wait.wait, "取消部署").await
        }
        VappAction::Delete { target, wait } => {
            let vapp = load_vapp(client, &target.href).await?;
            let task = vapp.delete().await.context("删除 vApp 失败")?;
            finish_task(task, wait.wait, "删除").await
        }
        VappAction::WaitStatus {
            target,
            status,
            timeout,
        } => wait_status(client, &target, &status, timeout).await,
        VappAction::Rename { target, wait, name } => {
            let mut vapp = load_vapp(client, &target.href).await?;
            let task = vapp.change_vm_name(&name).await.context("修改虚拟机名称失败")?;
            finish_task(task, wait.wait, "重命名").await
        }
        VappAction::Cpu {
            target,
            wait,
            count,
            cores_per_socket,
        } => {
            let mut vapp = load_vapp(client, &target.href).await?;
            let task = match cores_per_socket {
                Some(cores) => vapp.change_cpu_count_with_cores(count, Some(cores)).await,
                None => vapp.change_cpu_count(count).await,
            }
            .context("修改 CPU 数量失败")?;
            finish_task(task, wait.wait, "修改 CPU").await
        }
        VappAction::Memory {
            target,
            wait,
            size_mb,
        } => {
            let mut vapp = load_vapp(client, &target.href).await?;
            let task = vapp.change_memory_size(size_mb).await.context("修改内存失败")?;
            finish_task(task, wait.wait, "修改内存").await
        }
        VappAction::StorageProfile { target, wait, name } => {
            let mut vapp = load_vapp(client, &target.href).await?;
            let task = vapp
                .change_storage_profile(&name)
                .await
                .context("修改存储策略失败")?;
            finish_task(task, wait.wait, "修改存储策略").await
        }
        VappAction::Customize {
            target,
            wait,
            computer_name,
            script,
            change_sid,
        } => {
            let script = match script {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("读取定制脚本失败: {}", path))?,
                None => String::new(),
            };
            let mut vapp = load_vapp(client, &target.href).await?;
            let task = vapp
                .customize(&computer_name, &script, change_sid)
                .await
                .context("定制虚拟机失败")?;
            finish_task(task, wait.wait, "定制").await
        }
        VappAction::SetOvf {
            target,
            wait,
            properties,
        } => {
            let parameters = parse_key_values(&properties)?;
            let mut vapp = load_vapp(client, &target.href).await?;
            let task = vapp.set_ovf(&parameters).await.context("设置 OVF 属性失败")?;
            finish_task(task, wait.wait, "设置 OVF 属性").await
        }
        VappAction::Network { action } => handle_network(client, action).await,
        VappAction::Metadata { action } => handle_metadata(client, action).await,
    }
}

async fn load_vapp<'a>(client: &'a VcdClient, href: &str) -> Result<VAppApi<'a>> {
    client
        .vapp(href)
        .await
        .with_context(|| format!("获取 vApp 失败: {}", href))
}

/// 查看 vApp 状态
async fn show_status(client: &VcdClient, target: &VappTarget, format: &str) -> Result<()> {
    let vapp = load_vapp(client, &target.href).await?;
    let model = vapp.vapp();

    let vms: Vec<VmRow> = model.vms().iter().map(VmRow::from).collect();
    let status = VAppStatus::from_code(model.status).to_string();

    match OutputFormat::parse(format) {
        OutputFormat::Json => {
            let summary = VAppSummary {
                name: model.name.clone(),
                href: model.href.clone(),
                status,
                deployed: model.deployed,
                vms,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Table => {
            println!("{} {}", "vApp:".bold(), model.name.cyan().bold());
            println!("  状态:   {}", status.yellow());
            println!("  已部署: {}", model.deployed);
            println!();
            if vms.is_empty() {
                println!("{}", "vApp 中没有虚拟机".yellow());
            } else {
                output_formatted(&vms, format)?;
            }
        }
    }
    Ok(())
}

/// 阻塞直到 vApp 离开指定状态
async fn wait_status(
    client: &VcdClient,
    target: &VappTarget,
    status: &str,
    timeout: u64,
) -> Result<()> {
    let unwanted =
        VAppStatus::from_name(status).with_context(|| format!("未知的 vApp 状态: {}", status))?;

    let mut vapp = load_vapp(client, &target.href).await?;

    info!("等待 vApp {} 离开状态 {}", vapp.vapp().name, unwanted);
    vapp.block_while_status(unwanted, timeout)
        .await
        .context("等待 vApp 状态变化失败")?;

    let current = vapp.status().await.context("查询 vApp 状态失败")?;
    println!(
        "{} vApp 已离开状态 {}，当前状态: {}",
        "✓".green().bold(),
        unwanted,
        current.to_string().yellow()
    );
    Ok(())
}

async fn handle_network(client: &VcdClient, action: NetworkAction) -> Result<()> {
    match action {
        NetworkAction::List { target, format } => {
            let vapp = load_vapp(client, &target.href).await?;
            let section = vapp
                .network_config_section()
                .await
                .context("获取网络配置失败")?;
            let rows: Vec<NetworkRow> = section.network_config.iter().map(NetworkRow::from).collect();
            output_formatted(&rows, &format)
        }
        NetworkAction::AddIsolated {
            target,
            wait,
            name,
            gateway,
            netmask,
            dns1,
            dns2,
            dns_suffix,
            static_ranges,
            dhcp_range,
            dhcp_max_lease,
        } => {
            let static_ip_ranges = static_ranges
                .iter()
                .map(|r| parse_ip_range(r))
                .collect::<Result<Vec<_>>>()?;
            let dhcp_settings = dhcp_range
                .as_deref()
                .map(|r| -> Result<DhcpSettings> {
                    Ok(DhcpSettings {
                        is_enabled: true,
                        max_lease_time: dhcp_max_lease,
                        default_lease_time: None,
                        ip_range: Some(parse_ip_range(r)?),
                    })
                })
                .transpose()?;

            let settings = VAppNetworkSettings {
                name,
                gateway,
                netmask,
                dns1,
                dns2,
                dns_suffix,
                guest_vlan_allowed: None,
                static_ip_ranges,
                dhcp_settings,
            };

            let mut vapp = load_vapp(client, &target.href).await?;
            let task = vapp
                .add_isolated_network(&settings)
                .await
                .context("添加隔离网络失败")?;
            finish_task(task, wait.wait, "添加隔离网络").await
        }
        NetworkAction::Remove { target, wait, name } => {
            let mut vapp = load_vapp(client, &target.href).await?;
            let task = vapp
                .remove_isolated_network(&name)
                .await
                .context("删除网络失败")?;
            finish_task(task, wait.wait, "删除网络").await
        }
        NetworkAction::Attach {
            target,
            wait,
            name,
            network_href,
        } => {
            let vapp = load_vapp(client, &target.href).await?;
            let task = vapp
                .append_network_config(&OrgVdcNetwork::new(&name, &network_href))
                .await
                .context("接入组织网络失败")?;
            finish_task(task, wait.wait, "接入组织网络").await
        }
    }
}

async fn handle_metadata(client: &VcdClient, action: MetadataAction) -> Result<()> {
    match action {
        MetadataAction::List { target, format } => {
            let vapp = load_vapp(client, &target.href).await?;
            let metadata = vapp.metadata().await.context("获取元数据失败")?;
            let rows: Vec<MetadataRow> = metadata
                .entries
                .iter()
                .map(|entry| MetadataRow {
                    key: entry.key.clone(),
                    value_type: entry
                        .typed_value
                        .kind()
                        .map(|k| k.xsi_type().to_string())
                        .unwrap_or_else(|| entry.typed_value.xsi_type.clone()),
                    value: entry.typed_value.value.clone(),
                })
                .collect();
            output_formatted(&rows, &format)
        }
        MetadataAction::Set {
            target,
            wait,
            key,
            value,
            value_type,
        } => {
            let kind = MetadataType::from_str(&value_type)
                .with_context(|| format!("未知的元数据类型: {}", value_type))?;
            let task = client
                .metadata(&target.href)
                .add_typed(&key, TypedValue::new(kind, &value))
                .await
                .context("写入元数据失败")?;
            finish_task(task, wait.wait, "写入元数据").await
        }
        MetadataAction::Delete { target, wait, key } => {
            let task = client
                .metadata(&target.href)
                .delete(&key)
                .await
                .context("删除元数据失败")?;
            finish_task(task, wait.wait, "删除元数据").await
        }
    }
}
