//! 异步任务 API
//!
//! vCD 上几乎所有修改操作都返回任务，调用方通过轮询任务状态等待结果。

use std::time::Duration;

use reqwest::Method;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::client::VcdClient;
use crate::error::{Result, VcdError};
use crate::models::{Task, TaskStatus};
use crate::xml::href_with_suffix;

/// 任务 API
pub struct TaskApi<'a> {
    client: &'a VcdClient,
    task: Task,
}

impl<'a> TaskApi<'a> {
    pub(crate) fn new(client: &'a VcdClient, task: Task) -> Self {
        Self { client, task }
    }

    /// 当前缓存的任务文档
    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn into_task(self) -> Task {
        self.task
    }

    /// 重新拉取任务文档
    pub async fn refresh(&mut self) -> Result<()> {
        if self.task.href.is_empty() {
            return Err(VcdError::InvalidInput("任务 HREF 为空，无法刷新".to_string()));
        }

        let url = href_with_suffix(&self.task.href, "")?;
        self.task = self.client.get_xml(url).await?;
        Ok(())
    }

    /// 刷新并返回任务状态
    pub async fn status(&mut self) -> Result<TaskStatus> {
        self.refresh().await?;
        Ok(self.task.task_status())
    }

    /// 等待任务结束
    ///
    /// 按 `task_poll_interval` 轮询，超过 `task_timeout` 秒返回超时错误。
    /// 只有 `error` 状态视为失败，`canceled` / `aborted` 正常返回。
    /// 无法识别的状态记一条警告后同样正常返回。
    pub async fn wait_completion(&mut self) -> Result<()> {
        let config = self.client.config();
        let interval = config.task_poll_interval;
        let timeout = Duration::from_secs(config.task_timeout);
        let deadline = Instant::now() + timeout;

        info!("等待任务完成: {} ({})", self.task.name, self.task.href);

        loop {
            self.refresh().await?;
            let status = self.task.task_status();
            debug!("任务 {} 状态: {}", self.task.href, status.as_str());

            if status == TaskStatus::Error {
                let message = self.task.failure_message();
                warn!("任务执行失败: {} - {}", self.task.href, message);
                return Err(VcdError::TaskFailed(message));
            }

            if status == TaskStatus::Unknown {
                warn!(
                    "任务状态无法识别，按已结束处理: {} 状态 {}",
                    self.task.href, self.task.status
                );
                return Ok(());
            }

            if !status.is_pending() {
                info!("任务结束: {} 状态 {}", self.task.href, status.as_str());
                return Ok(());
            }

            if Instant::now() + interval > deadline {
                return Err(VcdError::Timeout(format!(
                    "任务 {} 在 {} 秒内未完成，当前状态 {}",
                    self.task.href,
                    timeout.as_secs(),
                    status.as_str()
                )));
            }

            tokio::time::sleep(interval).await;
        }
    }

    /// 取消任务
    pub async fn cancel(&self) -> Result<()> {
        info!("取消任务: {}", self.task.href);
        let url = href_with_suffix(&self.task.href, "/action/cancel")?;
        self.client.execute_no_content(Method::POST, url).await
    }
}
