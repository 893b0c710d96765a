//! CLI 配置管理
//!
//! 配置来源优先级: 环境变量 > 配置文件 > 默认值
//!
//! 配置文件查找顺序:
//! 1. `--config` 指定的路径 (或环境变量 `VCD_CONFIG`)
//! 2. `./config/vcd.toml`
//! 3. `~/.config/vcd/vcd.toml`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use vcd_director::ClientConfig;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config/vcd.toml";

/// CLI 配置文件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VcdFileConfig {
    /// vCloud Director 连接配置
    #[serde(default)]
    pub vcd: VcdConfig,
}

/// vCloud Director 连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcdConfig {
    /// API 根地址，如 https://vcd.example.com/api
    #[serde(default)]
    pub base_url: String,

    /// 组织名
    #[serde(default)]
    pub org: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,

    /// 连接超时 (秒)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// 开机前等待 vApp 离开 UNRESOLVED 状态的最长时间 (秒)
    #[serde(default = "default_max_retry_timeout")]
    pub max_retry_timeout: u64,

    /// 等待任务完成的最长时间 (秒)
    #[serde(default = "default_task_timeout")]
    pub task_timeout: u64,
}

fn default_verify_ssl() -> bool {
    true
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_retry_timeout() -> u64 {
    60
}

fn default_task_timeout() -> u64 {
    3600
}

impl Default for VcdConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            org: String::new(),
            username: String::new(),
            password: String::new(),
            verify_ssl: default_verify_ssl(),
            connect_timeout: default_connect_timeout(),
            max_retry_timeout: default_max_retry_timeout(),
            task_timeout: default_task_timeout(),
        }
    }
}

impl VcdConfig {
    /// 加载配置并应用环境变量覆盖
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match Self::resolve_path(path) {
            Some(path) => Self::load_from_path(&path)?,
            None => Self::default(),
        };

        config.apply_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// 从指定文件加载，不做校验
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {:?}", path))?;

        let file: VcdFileConfig = toml::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {:?}", path))?;

        Ok(file.vcd)
    }

    /// 确定配置文件路径；显式指定但不存在的路径也原样返回，由读取时报错
    fn resolve_path(path: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = path {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = env::var("VCD_CONFIG") {
            return Some(PathBuf::from(path));
        }

        let local = PathBuf::from(DEFAULT_CONFIG_PATH);
        if local.exists() {
            return Some(local);
        }

        dirs::home_dir()
            .map(|home| home.join(".config").join("vcd").join("vcd.toml"))
            .filter(|path| path.exists())
    }

    fn apply_env_vars(&mut self) -> Result<()> {
        if let Ok(url) = env::var("VCD_BASE_URL") {
            self.base_url = url;
        }
        if let Ok(org) = env::var("VCD_ORG") {
            self.org = org;
        }
        if let Ok(user) = env::var("VCD_USERNAME") {
            self.username = user;
        }
        if let Ok(password) = env::var("VCD_PASSWORD") {
            self.password = password;
        }
        if let Ok(verify) = env::var("VCD_VERIFY_SSL") {
            self.verify_ssl = verify
                .parse()
                .context("VCD_VERIFY_SSL 取值无效，应为 true 或 false")?;
        }
        Ok(())
    }

    /// 校验必填项
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            anyhow::bail!("未配置 vCD 地址 (base_url 或 VCD_BASE_URL)");
        }
        if self.org.trim().is_empty() {
            anyhow::bail!("未配置组织名 (org 或 VCD_ORG)");
        }
        if self.username.trim().is_empty() {
            anyhow::bail!("未配置用户名 (username 或 VCD_USERNAME)");
        }
        Ok(())
    }

    /// 转换为客户端配置
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            connect_timeout: self.connect_timeout,
            verify_ssl: self.verify_ssl,
            max_retry_timeout: self.max_retry_timeout,
            task_timeout: self.task_timeout,
            ..ClientConfig::default()
        }
    }
}
