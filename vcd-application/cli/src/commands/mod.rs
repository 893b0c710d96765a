//! CLI 命令处理模块

pub mod common; // 公共工具函数
pub mod output; // 表格/JSON 输出
pub mod task;
pub mod vapp;
