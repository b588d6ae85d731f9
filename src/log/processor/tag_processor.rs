use crate::log::processor::LogProcessor;
use crate::log::record::LogRecord;
use anyhow::Result;
use serde_json::Value;

/// 往 extra.tags 写入固定的标签
#[derive(Debug, Default, Clone)]
pub struct TagProcessor {
    tags: Vec<String>,
}

impl TagProcessor {
    pub fn new(tags: Vec<String>) -> Self {
        Self { tags }
    }

    pub fn add_tags(&mut self, tags: Vec<String>) {
        self.tags.extend(tags);
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = tags;
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl LogProcessor for TagProcessor {
    fn process(&self, mut record: LogRecord) -> Result<LogRecord> {
        let tags = self.tags.iter().cloned().map(Value::String).collect();
        record.extra.insert("tags".to_string(), Value::Array(tags));
        Ok(record)
    }
}
