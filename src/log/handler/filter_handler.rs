use crate::log::handler::{HandlerCore, LogHandler};
use crate::log::level::LogLevel;
use crate::log::record::LogRecord;
use anyhow::Result;
use std::collections::BTreeSet;
use std::sync::Arc;

/// 可接受级别：列表或区间
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptedLevels {
    List(Vec<LogLevel>),
    Range(LogLevel, LogLevel),
}

/// 只把指定级别的记录转发给被包装的 handler
pub struct FilterHandler {
    core: HandlerCore,
    handler: Arc<dyn LogHandler>,
    accepted: BTreeSet<LogLevel>,
}

impl FilterHandler {
    pub fn new(handler: Arc<dyn LogHandler>, accepted: AcceptedLevels, bubble: bool) -> Self {
        let mut filter = Self {
            core: HandlerCore::new(LogLevel::Debug, bubble),
            handler,
            accepted: BTreeSet::new(),
        };
        filter.set_accepted_levels(accepted);
        filter
    }

    pub fn set_accepted_levels(&mut self, accepted: AcceptedLevels) {
        self.accepted = match accepted {
            AcceptedLevels::List(levels) => levels.into_iter().collect(),
            AcceptedLevels::Range(min, max) => LogLevel::ALL
                .into_iter()
                .filter(|level| *level >= min && *level <= max)
                .collect(),
        };
    }

    /// 按级别从低到高排列
    pub fn accepted_levels(&self) -> Vec<LogLevel> {
        self.accepted.iter().copied().collect()
    }

    pub fn handler(&self) -> &Arc<dyn LogHandler> {
        &self.handler
    }
}

impl LogHandler for FilterHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn write(&self, record: &LogRecord, _formatted: &str) -> Result<()> {
        self.handler.handle(record)?;
        Ok(())
    }

    fn is_handling(&self, level: LogLevel) -> bool {
        self.accepted.contains(&level)
    }

    fn handle(&self, record: &LogRecord) -> Result<bool> {
        if !self.is_handling(record.level) {
            return Ok(false);
        }

        let record = self.core.process_record(record.clone())?;
        self.write(&record, "")?;

        Ok(!self.core.bubble())
    }

    fn close(&self) -> Result<()> {
        self.handler.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::handler::TestHandler;

    #[test]
    fn test_filter_handler_range() -> Result<()> {
        let inner = Arc::new(TestHandler::new(LogLevel::Debug, true));
        let filter = FilterHandler::new(
            inner.clone(),
            AcceptedLevels::Range(LogLevel::Info, LogLevel::Warning),
            true,
        );

        for level in [LogLevel::Debug, LogLevel::Info, LogLevel::Notice, LogLevel::Error] {
            filter.handle(&LogRecord::new("app", level, "msg"))?;
        }

        let levels: Vec<LogLevel> = inner.records().iter().map(|r| r.level).collect();
        assert_eq!(levels, vec![LogLevel::Info, LogLevel::Notice]);
        assert_eq!(
            filter.accepted_levels(),
            vec![LogLevel::Info, LogLevel::Notice, LogLevel::Warning]
        );
        Ok(())
    }

    #[test]
    fn test_filter_handler_list() -> Result<()> {
        let inner = Arc::new(TestHandler::new(LogLevel::Debug, true));
        let mut filter = FilterHandler::new(
            inner.clone(),
            AcceptedLevels::List(vec![LogLevel::Debug, LogLevel::Critical]),
            false,
        );

        assert!(filter.handle(&LogRecord::new("app", LogLevel::Critical, "kept"))?);
        assert!(!filter.handle(&LogRecord::new("app", LogLevel::Error, "dropped"))?);

        filter.set_accepted_levels(AcceptedLevels::List(vec![LogLevel::Error]));
        filter.handle(&LogRecord::new("app", LogLevel::Error, "now kept"))?;

        assert_eq!(inner.records().len(), 2);
        Ok(())
    }
}
