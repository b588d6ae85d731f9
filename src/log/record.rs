use crate::log::level::LogLevel;
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::{Map, Value};

/// 日志记录
///
/// context 由调用方提供，extra 由 processor 填充
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    /// 日志消息
    pub message: String,
    /// 调用方提供的上下文
    pub context: Map<String, Value>,
    /// 日志级别
    pub level: LogLevel,
    /// logger 名称
    pub channel: String,
    /// 记录时间
    pub datetime: DateTime<Local>,
    /// processor 追加的数据
    pub extra: Map<String, Value>,
}

impl LogRecord {
    /// 创建新的日志记录
    pub fn new(channel: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Map::new(),
            level,
            channel: channel.into(),
            datetime: Local::now(),
            extra: Map::new(),
        }
    }

    /// 添加上下文
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// 添加 extra 数据
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// 级别名
    pub fn level_name(&self) -> &'static str {
        self.level.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_record_new() {
        let record = LogRecord::new("app", LogLevel::Info, "hello");
        assert_eq!(record.channel, "app");
        assert_eq!(record.level_name(), "INFO");
        assert_eq!(record.message, "hello");
        assert!(record.context.is_empty());
        assert!(record.extra.is_empty());
    }

    #[test]
    fn test_log_record_builders() {
        let record = LogRecord::new("app", LogLevel::Error, "failed")
            .with_context("user_id", 12345)
            .with_context("username", "alice")
            .with_extra("uid", "a1b2c3d");

        assert_eq!(record.context["user_id"], 12345);
        assert_eq!(record.context["username"], "alice");
        assert_eq!(record.extra["uid"], "a1b2c3d");
    }

    #[test]
    fn test_log_record_serialize() {
        let record = LogRecord::new("db", LogLevel::Warning, "slow query").with_context("ms", 1500);
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["channel"], "db");
        assert_eq!(value["level"], "WARNING");
        assert_eq!(value["message"], "slow query");
        assert_eq!(value["context"]["ms"], 1500);
        assert!(value["datetime"].is_string());
    }
}
