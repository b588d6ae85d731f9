use crate::log::processor::LogProcessor;
use crate::log::record::LogRecord;
use anyhow::Result;

/// 往 extra.process_id 写入当前进程 id
#[derive(Debug, Default, Clone)]
pub struct ProcessIdProcessor;

impl LogProcessor for ProcessIdProcessor {
    fn process(&self, mut record: LogRecord) -> Result<LogRecord> {
        record
            .extra
            .insert("process_id".to_string(), std::process::id().into());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::level::LogLevel;

    #[test]
    fn test_process_id_processor() -> Result<()> {
        let record = ProcessIdProcessor.process(LogRecord::new("app", LogLevel::Info, "msg"))?;
        assert_eq!(record.extra["process_id"], std::process::id());
        Ok(())
    }
}
