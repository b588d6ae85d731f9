use crate::log::record::LogRecord;
use anyhow::Result;

/// 日志记录处理器 trait
///
/// 在格式化之前修改记录，通常是往 extra 里追加数据
pub trait LogProcessor: Send + Sync {
    fn process(&self, record: LogRecord) -> Result<LogRecord>;
}
