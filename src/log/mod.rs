//! 日志模块
//!
//! 配置层要组装的日志组件：级别、记录、formatter、handler、processor、
//! Logger 以及按名称索引的 logger 表。
//!
//! # 特性
//!
//! - RFC 5424 日志级别：Debug, Info, Notice, Warning, Error, Critical, Alert, Emergency
//! - 格式化器：LineFormatter、JsonFormatter
//! - 输出：StreamHandler、RotatingFileHandler、LogglyHandler 等
//! - handler 与 processor 按栈挂载，最后挂上的最先执行
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use cascade::log::*;
//! use std::sync::Arc;
//!
//! fn main() -> anyhow::Result<()> {
//!     let logger = Logger::new("app");
//!     logger.push_handler(Arc::new(StreamHandler::stdout()));
//!     logger.push_processor(Arc::new(UidProcessor::new(8)?));
//!
//!     logger.info("Application started")?;
//!     logger.error("Connection failed")?;
//!
//!     Ok(())
//! }
//! ```

pub mod formatter;
pub mod handler;
pub mod level;
pub mod logger;
pub mod processor;
pub mod record;
pub mod registry;

pub use formatter::{JsonFormatter, LineFormatter, LogFormatter};
pub use handler::{
    AcceptedLevels, FilterHandler, GroupHandler, HandlerCore, LogHandler, LogglyHandler,
    NullHandler, RotatingFileHandler, StreamHandler, TestHandler,
};
pub use level::LogLevel;
pub use logger::Logger;
pub use processor::{
    LogProcessor, ProcessIdProcessor, PsrLogMessageProcessor, TagProcessor, UidProcessor,
};
pub use record::LogRecord;
pub use registry::Registry;

// 注册函数
pub use formatter::register_formatters;
pub use handler::register_handlers;
pub use processor::register_processors;
