//! 异步任务模型

use serde::Deserialize;

use super::common::{Link, Reference};

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// 排队中
    Queued,
    /// 预处理中
    PreRunning,
    /// 执行中
    Running,
    /// 执行成功
    Success,
    /// 执行失败
    Error,
    /// 已取消
    Canceled,
    /// 已中止
    Aborted,
    /// 无法识别的状态
    Unknown,
}

impl TaskStatus {
    pub fn from_str(s: &str) -> Self {
        match s {
            "queued" => Self::Queued,
            "preRunning" => Self::PreRunning,
            "running" => Self::Running,
            "success" => Self::Success,
            "error" => Self::Error,
            "canceled" => Self::Canceled,
            "aborted" => Self::Aborted,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::PreRunning => "preRunning",
            Self::Running => "running",
            Self::Success => "success",
            Self::Error => "error",
            Self::Canceled => "canceled",
            Self::Aborted => "aborted",
            Self::Unknown => "unknown",
        }
    }

    /// 是否仍在等待或执行
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Queued | Self::PreRunning | Self::Running)
    }
}

/// vCloud 错误文档（任务失败或 HTTP 错误响应体）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VcdErrorDocument {
    #[serde(rename = "@message", default)]
    pub message: String,

    #[serde(rename = "@majorErrorCode", default)]
    pub major_error_code: i32,

    #[serde(rename = "@minorErrorCode", default)]
    pub minor_error_code: String,

    #[serde(rename = "@vendorSpecificErrorCode")]
    pub vendor_specific_error_code: Option<String>,
}

impl std::fmt::Display for VcdErrorDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (major={}, minor={})",
            self.message, self.major_error_code, self.minor_error_code
        )
    }
}

/// 异步任务
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Task {
    #[serde(rename = "@href", default)]
    pub href: String,

    #[serde(rename = "@id", default)]
    pub id: String,

    #[serde(rename = "@name", default)]
    pub name: String,

    #[serde(rename = "@type", default)]
    pub task_type: String,

    /// 原始状态字符串，见 [`Task::task_status`]
    #[serde(rename = "@status", default)]
    pub status: String,

    #[serde(rename = "@operation", default)]
    pub operation: String,

    #[serde(rename = "@operationName", default)]
    pub operation_name: String,

    #[serde(rename = "@startTime")]
    pub start_time: Option<String>,

    #[serde(rename = "@endTime")]
    pub end_time: Option<String>,

    #[serde(rename = "@cancelRequested", default)]
    pub cancel_requested: bool,

    #[serde(rename = "Link", default)]
    pub links: Vec<Link>,

    #[serde(rename = "Description")]
    pub description: Option<String>,

    #[serde(rename = "Owner")]
    pub owner: Option<Reference>,

    #[serde(rename = "Error")]
    pub error: Option<VcdErrorDocument>,

    #[serde(rename = "Progress")]
    pub progress: Option<u32>,
}

impl Task {
    pub fn task_status(&self) -> TaskStatus {
        TaskStatus::from_str(&self.status)
    }

    /// 失败原因：优先取错误文档，其次任务描述
    pub fn failure_message(&self) -> String {
        if let Some(err) = &self.error {
            if !err.message.is_empty() {
                return err.message.clone();
            }
        }
        self.description
            .clone()
            .unwrap_or_else(|| format!("任务 {} 状态为 {}", self.name, self.status))
    }
}

/// 资源上正在执行的任务列表
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TasksInProgress {
    #[serde(rename = "Task", default)]
    pub tasks: Vec<Task>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::from_xml;

    #[test]
    fn test_task_status_mapping() {
        assert_eq!(TaskStatus::from_str("preRunning"), TaskStatus::PreRunning);
        assert_eq!(TaskStatus::from_str("success"), TaskStatus::Success);
        assert_eq!(TaskStatus::from_str("bogus"), TaskStatus::Unknown);
        assert!(TaskStatus::Queued.is_pending());
        assert!(TaskStatus::Running.is_pending());
        assert!(!TaskStatus::Aborted.is_pending());
        assert_eq!(TaskStatus::Canceled.as_str(), "canceled");
    }

    #[test]
    fn test_decode_failed_task() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<Task xmlns="http://www.vmware.com/vcloud/v1.5" status="error" operationName="vappDeploy"
      name="task" href="https://vcd.local/api/task/t-1" id="urn:vcloud:task:t-1"
      type="application/vnd.vmware.vcloud.task+xml" cancelRequested="false">
    <Link rel="task:cancel" href="https://vcd.local/api/task/t-1/action/cancel"/>
    <Owner type="application/vnd.vmware.vcloud.vApp+xml" name="web" href="https://vcd.local/api/vApp/vapp-1"/>
    <Error message="not enough resources" majorErrorCode="500" minorErrorCode="INTERNAL_SERVER_ERROR"/>
    <Progress>40</Progress>
</Task>"#;

        let task: Task = from_xml(xml).unwrap();
        assert_eq!(task.task_status(), TaskStatus::Error);
        assert_eq!(task.href, "https://vcd.local/api/task/t-1");
        assert_eq!(task.operation_name, "vappDeploy");
        assert_eq!(task.links.len(), 1);
        assert_eq!(task.owner.as_ref().map(|o| o.name.as_str()), Some("web"));
        assert_eq!(task.progress, Some(40));
        assert_eq!(task.failure_message(), "not enough resources");
    }

    #[test]
    fn test_failure_message_fallback() {
        let task = Task {
            name: "task".to_string(),
            status: "error".to_string(),
            description: Some("deploy failed".to_string()),
            ..Default::default()
        };
        assert_eq!(task.failure_message(), "deploy failed");
    }
}
