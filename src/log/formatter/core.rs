use crate::log::record::LogRecord;
use anyhow::Result;

/// 日志格式化器 trait
///
/// 负责将 LogRecord 格式化为最终输出的字符串
pub trait LogFormatter: Send + Sync {
    /// 格式化单条日志记录
    fn format(&self, record: &LogRecord) -> Result<String>;

    /// 批量格式化，默认逐条拼接
    fn format_batch(&self, records: &[LogRecord]) -> Result<String> {
        let mut output = String::new();
        for record in records {
            output.push_str(&self.format(record)?);
        }
        Ok(output)
    }
}
