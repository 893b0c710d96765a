//! CLI 通用输出格式化模块
//!
//! 提供 table/json 两种输出格式

use anyhow::Result;
use serde::Serialize;

/// 表格列宽
const COLUMN_WIDTH: usize = 24;

/// 可输出为表格行的数据 trait
pub trait TableRow {
    /// 返回表格列标题
    fn headers() -> Vec<&'static str>;

    /// 返回该项的表格行数据
    fn row(&self) -> Vec<String>;
}

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    /// 解析 `--format` 参数，未知取值按表格处理
    pub fn parse(format: &str) -> Self {
        match format.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Table,
        }
    }
}

fn format_line(cells: &[String]) -> String {
    cells
        .iter()
        .map(|c| format!("{:<width$}", c, width = COLUMN_WIDTH))
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end()
        .to_string()
}

/// 渲染表格文本
pub fn render_table<T: TableRow>(items: &[T]) -> String {
    let headers: Vec<String> = T::headers().iter().map(|h| h.to_string()).collect();
    let header_line = format_line(&headers);

    let mut lines = vec![header_line.clone(), "-".repeat(header_line.chars().count())];
    lines.extend(items.iter().map(|item| format_line(&item.row())));
    lines.join("\n")
}

/// 表格格式输出
pub fn print_table<T: TableRow>(items: &[T]) {
    println!("{}", render_table(items));
}

/// JSON 格式输出
pub fn print_json<T: Serialize>(items: &[T]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(items)?);
    Ok(())
}

/// 根据格式参数选择输出方式
pub fn output_formatted<T: TableRow + Serialize>(items: &[T], format: &str) -> Result<()> {
    match OutputFormat::parse(format) {
        OutputFormat::Json => print_json(items)?,
        OutputFormat::Table => print_table(items),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        name: String,
        status: String,
    }

    impl TableRow for Row {
        fn headers() -> Vec<&'static str> {
            vec!["名称", "状态"]
        }

        fn row(&self) -> Vec<String> {
            vec![self.name.clone(), self.status.clone()]
        }
    }

    #[test]
    fn test_render_table() {
        let rows = vec![
            Row { name: "web-01".to_string(), status: "POWERED_ON".to_string() },
            Row { name: "db-01".to_string(), status: "POWERED_OFF".to_string() },
        ];
        let table = render_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("名称"));
        assert!(lines[1].chars().all(|c| c == '-'));
        assert!(lines[2].starts_with("web-01"));
        assert!(lines[3].ends_with("POWERED_OFF"));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("table"), OutputFormat::Table);
        assert_eq!(OutputFormat::parse("yaml"), OutputFormat::Table);
    }
}
