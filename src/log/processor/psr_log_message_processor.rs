use crate::log::processor::LogProcessor;
use crate::log::record::LogRecord;
use anyhow::Result;
use serde_json::Value;

/// 用 context 中的值替换消息里的 `{key}` 占位符
#[derive(Debug, Default, Clone)]
pub struct PsrLogMessageProcessor;

impl PsrLogMessageProcessor {
    pub fn new() -> Self {
        Self
    }
}

fn interpolate(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

impl LogProcessor for PsrLogMessageProcessor {
    fn process(&self, mut record: LogRecord) -> Result<LogRecord> {
        if !record.message.contains('{') {
            return Ok(record);
        }

        let mut message = record.message.clone();
        for (key, value) in &record.context {
            let placeholder = format!("{{{}}}", key);
            if message.contains(&placeholder) {
                message = message.replace(&placeholder, &interpolate(value));
            }
        }
        record.message = message;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::level::LogLevel;

    #[test]
    fn test_psr_log_message_processor() -> Result<()> {
        let record = LogRecord::new("app", LogLevel::Info, "user {name} logged in {count} times {missing}")
            .with_context("name", "alice")
            .with_context("count", 3);

        let record = PsrLogMessageProcessor::new().process(record)?;
        assert_eq!(record.message, "user alice logged in 3 times {missing}");
        Ok(())
    }

    #[test]
    fn test_psr_log_message_processor_structured_values() -> Result<()> {
        let record = LogRecord::new("app", LogLevel::Info, "{empty}|{tags}")
            .with_context("empty", Value::Null)
            .with_context("tags", serde_json::json!(["a", "b"]));

        let record = PsrLogMessageProcessor::new().process(record)?;
        assert_eq!(record.message, r#"|["a","b"]"#);
        Ok(())
    }
}
