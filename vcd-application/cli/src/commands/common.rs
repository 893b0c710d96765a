//! 公共工具函数模块
//!
//! 提供各命令模块共享的功能，包括：
//! - vCD 客户端创建、登录和登出
//! - 任务提交后的等待与结果输出
//! - 命令行参数解析

use crate::config::VcdConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use std::collections::HashMap;
use tracing::{info, warn};
use vcd_director::{IpRange, TaskApi, VcdClient};

/// 加载配置，创建并登录 vCD 客户端
pub async fn create_vcd_client(config_path: Option<&str>) -> Result<VcdClient> {
    let config = VcdConfig::load(config_path).context("加载 vCD 配置失败")?;

    let client =
        VcdClient::new(&config.base_url, config.client_config()).context("创建 vCD 客户端失败")?;

    client
        .login(&config.org, &config.username, &config.password)
        .await
        .context("vCD 登录失败")?;

    info!("已登录 vCD: {}", client.base_url());
    Ok(client)
}

/// 结束 vCD 会话；登出失败只记警告，不影响命令结果
pub async fn close_vcd_client(client: &VcdClient) {
    if let Err(e) = client.logout().await {
        warn!("vCD 登出失败: {}", e);
    }
}

/// 输出已提交的任务；`wait` 为真时等待其结束
pub async fn finish_task(mut task: TaskApi<'_>, wait: bool, action: &str) -> Result<()> {
    println!(
        "{} {} 已提交: {}",
        "✓".green().bold(),
        action,
        task.task().href.cyan()
    );

    if !wait {
        return Ok(());
    }

    task.wait_completion()
        .await
        .with_context(|| format!("{} 任务未成功完成", action))?;

    println!(
        "{} {} 完成 (状态: {})",
        "✓".green().bold(),
        action,
        task.task().task_status().as_str().yellow()
    );
    Ok(())
}

/// 解析 `key=value` 列表
pub fn parse_key_values(pairs: &[String]) -> Result<HashMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .with_context(|| format!("参数格式错误，应为 key=value: {}", pair))?;
            let key = key.trim();
            if key.is_empty() {
                anyhow::bail!("参数 key 不能为空: {}", pair);
            }
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

/// 解析 `start-end` 地址段；只有单个地址时结束地址留空
pub fn parse_ip_range(range: &str) -> Result<IpRange> {
    let range = range.trim();
    if range.is_empty() {
        anyhow::bail!("地址段不能为空");
    }

    match range.split_once('-') {
        Some((start, end)) if !start.trim().is_empty() => {
            Ok(IpRange::new(start.trim(), end.trim()))
        }
        Some(_) => anyhow::bail!("地址段缺少起始地址: {}", range),
        None => Ok(IpRange::new(range, "")),
    }
}
