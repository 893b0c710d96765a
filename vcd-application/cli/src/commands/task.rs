//! 任务管理命令

use crate::commands::common::{close_vcd_client, create_vcd_client, finish_task};
use crate::TaskAction;
use anyhow::{Context, Result};
use colored::Colorize;
use vcd_director::VcdClient;

/// 登录后执行子命令，结束时登出
pub async fn handle(action: TaskAction) -> Result<()> {
    let config = match &action {
        TaskAction::Wait { config, .. } | TaskAction::Cancel { config, .. } => config.clone(),
    };
    let client = create_vcd_client(config.as_deref()).await?;
    let result = run(&client, action).await;
    close_vcd_client(&client).await;
    result
}

async fn run(client: &VcdClient, action: TaskAction) -> Result<()> {
    match action {
        TaskAction::Wait { href, .. } => {
            let task = client
                .task(&href)
                .await
                .with_context(|| format!("获取任务失败: {}", href))?;

            let name = task.task().operation_name.clone();
            finish_task(task, true, &format!("任务 {}", name)).await
        }
        TaskAction::Cancel { href, .. } => {
            let task = client
                .task(&href)
                .await
                .with_context(|| format!("获取任务失败: {}", href))?;

            if !task.task().task_status().is_pending() {
                println!(
                    "{} 任务已结束 (状态: {})，无需取消",
                    "!".yellow().bold(),
                    task.task().status
                );
                return Ok(());
            }

            task.cancel().await.context("取消任务失败")?;
            println!("{} 已请求取消任务: {}", "✓".green().bold(), href.cyan());
            Ok(())
        }
    }
}
