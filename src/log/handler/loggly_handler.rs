use crate::log::formatter::JsonFormatter;
use crate::log::handler::{HandlerCore, LogHandler};
use crate::log::level::LogLevel;
use crate::log::record::LogRecord;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://logs-01.loggly.com";

const TAG_HEADER: &str = "X-LOGGLY-TAG";

/// 发送到 Loggly HTTP 接口的处理器，默认使用 JSON 格式
pub struct LogglyHandler {
    core: HandlerCore,
    token: String,
    endpoint: String,
    tags: Vec<String>,
    client: Client,
}

impl LogglyHandler {
    pub fn new(token: &str, level: LogLevel, bubble: bool, endpoint: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .context("failed to build http client")?;

        let mut core = HandlerCore::new(level, bubble);
        core.set_formatter(Arc::new(JsonFormatter::default()));

        Ok(Self {
            core,
            token: token.to_string(),
            endpoint: endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
                .trim_end_matches('/')
                .to_string(),
            tags: Vec::new(),
            client,
        })
    }

    /// 替换全部标签
    pub fn set_tag(&mut self, tags: Vec<String>) {
        self.tags = tags;
    }

    pub fn add_tag(&mut self, tags: Vec<String>) {
        self.tags.extend(tags);
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn send(&self, path: &str, body: String) -> Result<()> {
        let url = format!("{}/{}/{}/", self.endpoint, path, self.token);
        let mut request = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        if !self.tags.is_empty() {
            request = request.header(TAG_HEADER, self.tags.join(","));
        }

        request
            .send()
            .with_context(|| format!("failed to send log to {}", url))?
            .error_for_status()
            .with_context(|| format!("loggly rejected log at {}", url))?;
        Ok(())
    }
}

impl LogHandler for LogglyHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn write(&self, _record: &LogRecord, formatted: &str) -> Result<()> {
        self.send("inputs", formatted.trim_end().to_string())
    }

    /// 批量记录走 bulk 接口，一行一条
    fn handle_batch(&self, records: &[LogRecord]) -> Result<()> {
        let formatter = self.core.formatter();
        let mut lines = Vec::with_capacity(records.len());
        for record in records.iter().filter(|r| self.is_handling(r.level)) {
            let record = self.core.process_record(record.clone())?;
            lines.push(formatter.format(&record)?.trim_end().to_string());
        }

        if lines.is_empty() {
            return Ok(());
        }
        self.send("bulk", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_loggly_handler_send() -> Result<()> {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/inputs/token123/")
            .match_header("x-loggly-tag", "web,prod")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Regex("disk almost full".to_string()))
            .with_status(200)
            .create();

        let mut handler = LogglyHandler::new("token123", LogLevel::Debug, true, Some(server.url()))?;
        handler.set_tag(vec!["web".to_string()]);
        handler.add_tag(vec!["prod".to_string()]);
        handler.handle(&LogRecord::new("app", LogLevel::Warning, "disk almost full"))?;

        mock.assert();
        Ok(())
    }

    #[test]
    fn test_loggly_handler_bulk() -> Result<()> {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/bulk/token123/")
            .match_body(Matcher::Regex("first(.|\n)*second".to_string()))
            .with_status(200)
            .create();

        let handler = LogglyHandler::new("token123", LogLevel::Info, true, Some(format!("{}/", server.url())))?;
        handler.handle_batch(&[
            LogRecord::new("app", LogLevel::Info, "first"),
            LogRecord::new("app", LogLevel::Debug, "filtered"),
            LogRecord::new("app", LogLevel::Error, "second"),
        ])?;

        mock.assert();
        Ok(())
    }

    #[test]
    fn test_loggly_handler_error_status() -> Result<()> {
        let mut server = mockito::Server::new();
        let _mock = server.mock("POST", "/inputs/bad/").with_status(403).create();

        let handler = LogglyHandler::new("bad", LogLevel::Debug, true, Some(server.url()))?;
        assert!(handler.handle(&LogRecord::new("app", LogLevel::Info, "msg")).is_err());
        Ok(())
    }

    #[test]
    fn test_loggly_handler_defaults() -> Result<()> {
        let handler = LogglyHandler::new("token", LogLevel::Debug, true, None)?;
        assert_eq!(handler.endpoint(), DEFAULT_ENDPOINT);
        assert!(handler.tags().is_empty());
        Ok(())
    }
}
