use crate::log::formatter::LogFormatter;
use crate::log::record::LogRecord;
use anyhow::Result;

/// JSON 格式化器
///
/// 将日志记录序列化为一行 JSON
pub struct JsonFormatter {
    append_newline: bool,
}

impl JsonFormatter {
    pub fn new(append_newline: bool) -> Self {
        Self { append_newline }
    }

    pub fn append_newline(&mut self, append: bool) {
        self.append_newline = append;
    }

    pub fn is_appending_newline(&self) -> bool {
        self.append_newline
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl LogFormatter for JsonFormatter {
    fn format(&self, record: &LogRecord) -> Result<String> {
        // 直接序列化 LogRecord，复用其 Serialize 实现
        let mut output = serde_json::to_string(record)?;
        if self.append_newline {
            output.push('\n');
        }
        Ok(output)
    }

    /// 批量模式输出一个 JSON 数组
    fn format_batch(&self, records: &[LogRecord]) -> Result<String> {
        let mut output = serde_json::to_string(records)?;
        if self.append_newline {
            output.push('\n');
        }
        Ok(output)
    }
}
