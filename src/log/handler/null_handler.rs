use crate::log::handler::{HandlerCore, LogHandler};
use crate::log::level::LogLevel;
use crate::log::record::LogRecord;
use anyhow::Result;

/// 丢弃所有达到级别的记录，并阻止其继续冒泡
#[derive(Default)]
pub struct NullHandler {
    core: HandlerCore,
}

impl NullHandler {
    pub fn new(level: LogLevel) -> Self {
        Self {
            core: HandlerCore::new(level, false),
        }
    }
}

impl LogHandler for NullHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn write(&self, _record: &LogRecord, _formatted: &str) -> Result<()> {
        Ok(())
    }

    fn handle(&self, record: &LogRecord) -> Result<bool> {
        Ok(self.is_handling(record.level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handler() -> Result<()> {
        let handler = NullHandler::new(LogLevel::Warning);
        assert!(!handler.handle(&LogRecord::new("app", LogLevel::Info, "passes"))?);
        assert!(handler.handle(&LogRecord::new("app", LogLevel::Error, "swallowed"))?);
        Ok(())
    }
}
