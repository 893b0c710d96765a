//! vCD CLI 应用

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "vcd")]
#[command(about = "vCloud Director vApp 管理工具", long_about = None)]
#[command(version)]
struct Cli {
    /// 日志级别
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// vApp 管理
    Vapp {
        #[command(subcommand)]
        action: VappAction,
    },

    /// 任务管理
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
}

/// 所有 vApp 子命令共享的参数
#[derive(clap::Args, Clone)]
pub struct VappTarget {
    /// vApp 的 HREF
    #[arg(long)]
    pub href: String,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<String>,
}

/// 提交任务后是否等待其结束
#[derive(clap::Args, Clone)]
pub struct WaitFlag {
    /// 等待任务完成
    #[arg(short, long)]
    pub wait: bool,
}

#[derive(Subcommand)]
pub enum VappAction {
    /// 查看 vApp 状态与虚拟机
    Status {
        #[command(flatten)]
        target: VappTarget,

        /// 输出格式 (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// 开机 (先等待 vApp 离开 UNRESOLVED 状态)
    PowerOn {
        #[command(flatten)]
        target: VappTarget,
        #[command(flatten)]
        wait: WaitFlag,
    },

    /// 关机 (强制断电)
    PowerOff {
        #[command(flatten)]
        target: VappTarget,
        #[command(flatten)]
        wait: WaitFlag,
    },

    /// 重启客户机
    Reboot {
        #[command(flatten)]
        target: VappTarget,
        #[command(flatten)]
        wait: WaitFlag,
    },

    /// 硬重置
    Reset {
        #[command(flatten)]
        target: VappTarget,
        #[command(flatten)]
        wait: WaitFlag,
    },

    /// 挂起
    Suspend {
        #[command(flatten)]
        target: VappTarget,
        #[command(flatten)]
        wait: WaitFlag,
    },

    /// 客户机关机
    Shutdown {
        #[command(flatten)]
        target: VappTarget,
        #[command(flatten)]
        wait: WaitFlag,
    },

    /// 部署
    Deploy {
        #[command(flatten)]
        target: VappTarget,
        #[command(flatten)]
        wait: WaitFlag,
    },

    /// 取消部署
    Undeploy {
        #[command(flatten)]
        target: VappTarget,
        #[command(flatten)]
        wait: WaitFlag,

        /// 取消部署时的电源动作 (powerOff, suspend, shutdown, force, default)
        #[arg(long, default_value = "powerOff")]
        action: String,
    },

    /// 删除 vApp
    Delete {
        #[command(flatten)]
        target: VappTarget,
        #[command(flatten)]
        wait: WaitFlag,
    },

    /// 阻塞直到 vApp 离开指定状态
    WaitStatus {
        #[command(flatten)]
        target: VappTarget,

        /// 要等待离开的状态名，如 UNRESOLVED
        #[arg(short, long)]
        status: String,

        /// 超时 (秒)
        #[arg(short, long, default_value = "60")]
        timeout: u64,
    },

    /// 修改第一台虚拟机名称
    Rename {
        #[command(flatten)]
        target: VappTarget,
        #[command(flatten)]
        wait: WaitFlag,

        /// 新名称
        #[arg(short, long)]
        name: String,
    },

    /// 修改第一台虚拟机 CPU 数量
    Cpu {
        #[command(flatten)]
        target: VappTarget,
        #[command(flatten)]
        wait: WaitFlag,

        /// 虚拟 CPU 数量
        #[arg(long)]
        count: u32,

        /// 每插槽核数
        #[arg(long)]
        cores_per_socket: Option<u32>,
    },

    /// 修改第一台虚拟机内存大小
    Memory {
        #[command(flatten)]
        target: VappTarget,
        #[command(flatten)]
        wait: WaitFlag,

        /// 内存大小 (MB)
        #[arg(short, long)]
        size_mb: u32,
    },

    /// 修改第一台虚拟机存储策略
    StorageProfile {
        #[command(flatten)]
        target: VappTarget,
        #[command(flatten)]
        wait: WaitFlag,

        /// 所属 VDC 中的存储策略名
        #[arg(short, long)]
        name: String,
    },

    /// 定制第一台虚拟机的客户机操作系统
    Customize {
        #[command(flatten)]
        target: VappTarget,
        #[command(flatten)]
        wait: WaitFlag,

        /// 计算机名
        #[arg(long)]
        computer_name: String,

        /// 定制脚本文件
        #[arg(long)]
        script: Option<String>,

        /// 重新生成 SID (Windows)
        #[arg(long)]
        change_sid: bool,
    },

    /// 设置第一台虚拟机的 OVF 属性
    SetOvf {
        #[command(flatten)]
        target: VappTarget,
        #[command(flatten)]
        wait: WaitFlag,

        /// 属性，格式 key=value，可重复
        #[arg(short, long = "property", required = true)]
        properties: Vec<String>,
    },

    /// vApp 网络管理
    Network {
        #[command(subcommand)]
        action: NetworkAction,
    },

    /// vApp 元数据管理
    Metadata {
        #[command(subcommand)]
        action: MetadataAction,
    },
}

#[derive(Subcommand)]
pub enum NetworkAction {
    /// 列出 vApp 网络
    List {
        #[command(flatten)]
        target: VappTarget,

        /// 输出格式 (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// 添加隔离网络
    AddIsolated {
        #[command(flatten)]
        target: VappTarget,
        #[command(flatten)]
        wait: WaitFlag,

        /// 网络名
        #[arg(short, long)]
        name: String,

        /// 网关
        #[arg(long)]
        gateway: String,

        /// 子网掩码
        #[arg(long)]
        netmask: String,

        #[arg(long)]
        dns1: Option<String>,

        #[arg(long)]
        dns2: Option<String>,

        #[arg(long)]
        dns_suffix: Option<String>,

        /// 静态地址池，格式 start-end，可重复
        #[arg(long = "static-range")]
        static_ranges: Vec<String>,

        /// DHCP 地址池，格式 start-end 或单个地址
        #[arg(long)]
        dhcp_range: Option<String>,

        /// DHCP 最长租期 (秒)
        #[arg(long, default_value = "7200")]
        dhcp_max_lease: u32,
    },

    /// 删除 vApp 网络
    Remove {
        #[command(flatten)]
        target: VappTarget,
        #[command(flatten)]
        wait: WaitFlag,

        /// 网络名
        #[arg(short, long)]
        name: String,
    },

    /// 以桥接方式接入组织 VDC 网络
    Attach {
        #[command(flatten)]
        target: VappTarget,
        #[command(flatten)]
        wait: WaitFlag,

        /// 组织网络名
        #[arg(short, long)]
        name: String,

        /// 组织网络 HREF
        #[arg(long)]
        network_href: String,
    },
}

#[derive(Subcommand)]
pub enum MetadataAction {
    /// 列出元数据
    List {
        #[command(flatten)]
        target: VappTarget,

        /// 输出格式 (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// 写入元数据
    Set {
        #[command(flatten)]
        target: VappTarget,
        #[command(flatten)]
        wait: WaitFlag,

        #[arg(short, long)]
        key: String,

        #[arg(short, long)]
        value: String,

        /// 值类型 (string, number, boolean, datetime)
        #[arg(short = 't', long = "type", default_value = "string")]
        value_type: String,
    },

    /// 删除元数据
    Delete {
        #[command(flatten)]
        target: VappTarget,
        #[command(flatten)]
        wait: WaitFlag,

        #[arg(short, long)]
        key: String,
    },
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// 等待任务完成
    Wait {
        /// 任务 HREF
        #[arg(long)]
        href: String,

        /// 配置文件路径
        #[arg(short, long)]
        config: Option<String>,
    },

    /// 取消任务
    Cancel {
        /// 任务 HREF
        #[arg(long)]
        href: String,

        /// 配置文件路径
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("vCD CLI 启动");

    match cli.command {
        Commands::Vapp { action } => commands::vapp::handle(action).await?,
        Commands::Task { action } => commands::task::handle(action).await?,
    }

    Ok(())
}
