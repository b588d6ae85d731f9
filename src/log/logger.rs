use crate::log::handler::{LogHandler, StreamHandler};
use crate::log::level::LogLevel;
use crate::log::processor::LogProcessor;
use crate::log::record::LogRecord;
use anyhow::Result;
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};

/// 日志通道
///
/// handler 和 processor 都以栈的方式挂载：最后压入的最先执行。
/// 没有任何 handler 时，第一次写日志会自动挂上一个输出到 stderr 的 StreamHandler。
pub struct Logger {
    name: String,
    handlers: RwLock<Vec<Arc<dyn LogHandler>>>,
    processors: RwLock<Vec<Arc<dyn LogProcessor>>>,
}

impl Logger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: RwLock::new(Vec::new()),
            processors: RwLock::new(Vec::new()),
        }
    }

    /// 按执行顺序给出 handler 和 processor
    pub fn with(
        name: impl Into<String>,
        handlers: Vec<Arc<dyn LogHandler>>,
        processors: Vec<Arc<dyn LogProcessor>>,
    ) -> Self {
        Self {
            name: name.into(),
            handlers: RwLock::new(handlers),
            processors: RwLock::new(processors),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn push_handler(&self, handler: Arc<dyn LogHandler>) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(0, handler);
    }

    pub fn pop_handler(&self) -> Option<Arc<dyn LogHandler>> {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        if handlers.is_empty() {
            None
        } else {
            Some(handlers.remove(0))
        }
    }

    /// 替换全部 handler，列表顺序即执行顺序
    pub fn set_handlers(&self, handlers: Vec<Arc<dyn LogHandler>>) {
        *self.handlers.write().unwrap_or_else(PoisonError::into_inner) = handlers;
    }

    /// 按执行顺序排列
    pub fn handlers(&self) -> Vec<Arc<dyn LogHandler>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn push_processor(&self, processor: Arc<dyn LogProcessor>) {
        self.processors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(0, processor);
    }

    pub fn pop_processor(&self) -> Option<Arc<dyn LogProcessor>> {
        let mut processors = self.processors.write().unwrap_or_else(PoisonError::into_inner);
        if processors.is_empty() {
            None
        } else {
            Some(processors.remove(0))
        }
    }

    /// 按执行顺序排列
    pub fn processors(&self) -> Vec<Arc<dyn LogProcessor>> {
        self.processors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 是否有 handler 处理该级别
    pub fn is_handling(&self, level: LogLevel) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|handler| handler.is_handling(level))
    }

    /// 记录日志
    ///
    /// 没有 handler 处理该级别时返回 false
    pub fn log(&self, record: LogRecord) -> Result<bool> {
        let handlers = {
            let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
            if handlers.is_empty() {
                handlers.push(Arc::new(StreamHandler::stderr()));
            }
            handlers.clone()
        };

        let Some(first) = handlers.iter().position(|h| h.is_handling(record.level)) else {
            return Ok(false);
        };

        let mut record = record;
        record.channel = self.name.clone();
        for processor in self.processors() {
            record = processor.process(record)?;
        }

        for handler in &handlers[first..] {
            if handler.handle(&record)? {
                break;
            }
        }
        Ok(true)
    }

    /// 记录带上下文的日志
    ///
    /// # 示例
    ///
    /// ```ignore
    /// logger.logm(LogLevel::Info, "user logged in", vec![
    ///     ("user_id", 12345.into()),
    ///     ("username", "alice".into()),
    /// ])?;
    /// ```
    pub fn logm(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        context: impl IntoIterator<Item = (impl Into<String>, Value)>,
    ) -> Result<bool> {
        let mut record = LogRecord::new(self.name.clone(), level, message);
        for (key, value) in context {
            record.context.insert(key.into(), value);
        }
        self.log(record)
    }

    pub fn debug(&self, message: impl Into<String>) -> Result<bool> {
        self.log(LogRecord::new(self.name.clone(), LogLevel::Debug, message))
    }

    pub fn info(&self, message: impl Into<String>) -> Result<bool> {
        self.log(LogRecord::new(self.name.clone(), LogLevel::Info, message))
    }

    pub fn notice(&self, message: impl Into<String>) -> Result<bool> {
        self.log(LogRecord::new(self.name.clone(), LogLevel::Notice, message))
    }

    pub fn warning(&self, message: impl Into<String>) -> Result<bool> {
        self.log(LogRecord::new(self.name.clone(), LogLevel::Warning, message))
    }

    pub fn error(&self, message: impl Into<String>) -> Result<bool> {
        self.log(LogRecord::new(self.name.clone(), LogLevel::Error, message))
    }

    pub fn critical(&self, message: impl Into<String>) -> Result<bool> {
        self.log(LogRecord::new(self.name.clone(), LogLevel::Critical, message))
    }

    pub fn alert(&self, message: impl Into<String>) -> Result<bool> {
        self.log(LogRecord::new(self.name.clone(), LogLevel::Alert, message))
    }

    pub fn emergency(&self, message: impl Into<String>) -> Result<bool> {
        self.log(LogRecord::new(self.name.clone(), LogLevel::Emergency, message))
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("handlers", &self.handlers().len())
            .field("processors", &self.processors().len())
            .finish()
    }
}
