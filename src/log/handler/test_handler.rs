use crate::log::handler::{HandlerCore, LogHandler};
use crate::log::level::LogLevel;
use crate::log::record::LogRecord;
use anyhow::Result;
use std::sync::{Mutex, PoisonError};

/// 把记录保存在内存里，用于测试
#[derive(Default)]
pub struct TestHandler {
    core: HandlerCore,
    records: Mutex<Vec<(LogRecord, String)>>,
}

impl TestHandler {
    pub fn new(level: LogLevel, bubble: bool) -> Self {
        Self {
            core: HandlerCore::new(level, bubble),
            records: Mutex::new(Vec::new()),
        }
    }

    /// 经过 processor 处理后的记录
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().iter().map(|(record, _)| record.clone()).collect()
    }

    /// 格式化后的输出
    pub fn formatted(&self) -> Vec<String> {
        self.lock().iter().map(|(_, formatted)| formatted.clone()).collect()
    }

    pub fn has_records(&self, level: LogLevel) -> bool {
        self.lock().iter().any(|(record, _)| record.level == level)
    }

    pub fn has_record_that_contains(&self, message: &str, level: LogLevel) -> bool {
        self.lock()
            .iter()
            .any(|(record, _)| record.level == level && record.message.contains(message))
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(LogRecord, String)>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogHandler for TestHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn write(&self, record: &LogRecord, formatted: &str) -> Result<()> {
        self.lock().push((record.clone(), formatted.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_handler() -> Result<()> {
        let handler = TestHandler::new(LogLevel::Info, true);
        handler.handle(&LogRecord::new("app", LogLevel::Debug, "too low"))?;
        handler.handle(&LogRecord::new("app", LogLevel::Warning, "disk almost full"))?;

        assert_eq!(handler.records().len(), 1);
        assert!(handler.has_records(LogLevel::Warning));
        assert!(!handler.has_records(LogLevel::Debug));
        assert!(handler.has_record_that_contains("almost", LogLevel::Warning));
        assert!(handler.formatted()[0].contains("app.WARNING: disk almost full"));

        handler.clear();
        assert!(handler.records().is_empty());
        Ok(())
    }
}
