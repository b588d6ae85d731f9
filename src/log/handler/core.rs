use crate::log::formatter::{LineFormatter, LogFormatter};
use crate::log::level::LogLevel;
use crate::log::processor::LogProcessor;
use crate::log::record::LogRecord;
use anyhow::Result;
use smart_default::SmartDefault;
use std::sync::Arc;

/// Handler 共用的状态：最低级别、是否冒泡、formatter 和 processor 栈
#[derive(Clone, SmartDefault)]
pub struct HandlerCore {
    #[default(LogLevel::Debug)]
    level: LogLevel,
    #[default(true)]
    bubble: bool,
    #[default(Arc::new(LineFormatter::default()))]
    formatter: Arc<dyn LogFormatter>,
    processors: Vec<Arc<dyn LogProcessor>>,
}

impl HandlerCore {
    pub fn new(level: LogLevel, bubble: bool) -> Self {
        Self {
            level,
            bubble,
            ..Self::default()
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.level = level;
    }

    pub fn bubble(&self) -> bool {
        self.bubble
    }

    pub fn set_bubble(&mut self, bubble: bool) {
        self.bubble = bubble;
    }

    pub fn is_handling(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    pub fn formatter(&self) -> Arc<dyn LogFormatter> {
        self.formatter.clone()
    }

    pub fn set_formatter(&mut self, formatter: Arc<dyn LogFormatter>) {
        self.formatter = formatter;
    }

    /// 压栈，最后压入的最先执行
    pub fn push_processor(&mut self, processor: Arc<dyn LogProcessor>) {
        self.processors.insert(0, processor);
    }

    pub fn pop_processor(&mut self) -> Option<Arc<dyn LogProcessor>> {
        if self.processors.is_empty() {
            None
        } else {
            Some(self.processors.remove(0))
        }
    }

    /// 按执行顺序排列
    pub fn processors(&self) -> &[Arc<dyn LogProcessor>] {
        &self.processors
    }

    pub fn process_record(&self, record: LogRecord) -> Result<LogRecord> {
        self.processors
            .iter()
            .try_fold(record, |record, processor| processor.process(record))
    }
}

/// 日志处理器 trait
///
/// 负责过滤级别、执行 processor、格式化并写出日志。
/// `handle` 返回 true 表示记录已被消费，不再传给后续 handler。
pub trait LogHandler: Send + Sync {
    fn core(&self) -> &HandlerCore;

    fn core_mut(&mut self) -> &mut HandlerCore;

    /// 写出已经处理和格式化的记录
    fn write(&self, record: &LogRecord, formatted: &str) -> Result<()>;

    fn is_handling(&self, level: LogLevel) -> bool {
        self.core().is_handling(level)
    }

    fn handle(&self, record: &LogRecord) -> Result<bool> {
        if !self.is_handling(record.level) {
            return Ok(false);
        }

        let record = self.core().process_record(record.clone())?;
        let formatted = self.core().formatter().format(&record)?;
        self.write(&record, &formatted)?;

        Ok(!self.core().bubble())
    }

    fn handle_batch(&self, records: &[LogRecord]) -> Result<()> {
        for record in records {
            self.handle(record)?;
        }
        Ok(())
    }

    fn formatter(&self) -> Arc<dyn LogFormatter> {
        self.core().formatter()
    }

    fn set_formatter(&mut self, formatter: Arc<dyn LogFormatter>) {
        self.core_mut().set_formatter(formatter);
    }

    fn push_processor(&mut self, processor: Arc<dyn LogProcessor>) {
        self.core_mut().push_processor(processor);
    }

    fn pop_processor(&mut self) -> Option<Arc<dyn LogProcessor>> {
        self.core_mut().pop_processor()
    }

    /// 释放资源（默认实现为空操作）
    fn close(&self) -> Result<()> {
        Ok(())
    }
}
