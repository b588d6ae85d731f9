use crate::log::handler::{HandlerCore, LogHandler};
use crate::log::level::LogLevel;
use crate::log::record::LogRecord;
use anyhow::Result;
use std::sync::Arc;

/// 把记录转发给一组 handler
pub struct GroupHandler {
    core: HandlerCore,
    handlers: Vec<Arc<dyn LogHandler>>,
}

impl GroupHandler {
    pub fn new(handlers: Vec<Arc<dyn LogHandler>>, bubble: bool) -> Self {
        Self {
            core: HandlerCore::new(LogLevel::Debug, bubble),
            handlers,
        }
    }

    pub fn handlers(&self) -> &[Arc<dyn LogHandler>] {
        &self.handlers
    }
}

impl LogHandler for GroupHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn write(&self, record: &LogRecord, _formatted: &str) -> Result<()> {
        for handler in &self.handlers {
            handler.handle(record)?;
        }
        Ok(())
    }

    fn is_handling(&self, level: LogLevel) -> bool {
        self.handlers.iter().any(|handler| handler.is_handling(level))
    }

    /// 子 handler 自己负责格式化
    fn handle(&self, record: &LogRecord) -> Result<bool> {
        if !self.is_handling(record.level) {
            return Ok(false);
        }

        let record = self.core.process_record(record.clone())?;
        self.write(&record, "")?;

        Ok(!self.core.bubble())
    }

    fn close(&self) -> Result<()> {
        for handler in &self.handlers {
            handler.close()?;
        }
        Ok(())
    }
}
