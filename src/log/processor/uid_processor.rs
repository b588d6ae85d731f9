use crate::log::processor::LogProcessor;
use crate::log::record::LogRecord;
use anyhow::{bail, Result};
use rand::Rng;
use serde_json::Value;

/// 往 extra.uid 写入一个实例级的随机 id，用于关联同一次请求的日志
#[derive(Debug, Clone)]
pub struct UidProcessor {
    uid: String,
}

impl UidProcessor {
    pub const MAX_LENGTH: usize = 32;

    pub fn new(length: usize) -> Result<Self> {
        if length == 0 || length > Self::MAX_LENGTH {
            bail!("uid length must be between 1 and {}, got {}", Self::MAX_LENGTH, length);
        }

        let mut rng = rand::thread_rng();
        let uid = (0..length)
            .map(|_| char::from_digit(rng.gen_range(0..16), 16).unwrap_or('0'))
            .collect();
        Ok(Self { uid })
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }
}

impl LogProcessor for UidProcessor {
    fn process(&self, mut record: LogRecord) -> Result<LogRecord> {
        record.extra.insert("uid".to_string(), Value::String(self.uid.clone()));
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::level::LogLevel;

    #[test]
    fn test_uid_processor() -> Result<()> {
        let processor = UidProcessor::new(7)?;
        assert_eq!(processor.uid().len(), 7);
        assert!(processor.uid().chars().all(|c| c.is_ascii_hexdigit()));

        let first = processor.process(LogRecord::new("app", LogLevel::Info, "a"))?;
        let second = processor.process(LogRecord::new("app", LogLevel::Info, "b"))?;
        assert_eq!(first.extra["uid"], second.extra["uid"]);
        Ok(())
    }

    #[test]
    fn test_uid_processor_invalid_length() {
        assert!(UidProcessor::new(0).is_err());
        assert!(UidProcessor::new(33).is_err());
        assert!(UidProcessor::new(32).is_ok());
    }
}
