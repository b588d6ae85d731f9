//! Cascade - 声明式日志配置
//!
//! 用一份数据（文件、JSON/YAML 文本或已解析的结构）描述 "有哪些 logger，
//! 各自挂哪些 handler、formatter 和 processor"，而不是写一堆初始化代码。
//!
//! ## 模块
//!
//! - **cfg**: 配置核心（类型描述、选项解析、ClassLoader、各类加载器、配置编排）
//! - **log**: 被配置的日志组件（级别、记录、formatter、handler、processor、Logger）
//! - **cascade**: 进程级入口（`file_config`、`get_logger` 等）
//!
//! ## 快速开始
//!
//! ```rust
//! use serde_json::json;
//!
//! fn main() -> anyhow::Result<()> {
//!     cascade::load_config_from_options(json!({
//!         "formatters": {
//!             "spaced": {"format": "%datetime% %channel%.%level_name%  %message%\n"}
//!         },
//!         "handlers": {
//!             "console": {"class": "StreamHandler", "stream": "stdout", "formatter": "spaced", "level": "info"}
//!         },
//!         "loggers": {
//!             "app": {"handlers": ["console"]}
//!         }
//!     }))?;
//!
//!     cascade::get_logger("app")?.info("configured")?;
//!     Ok(())
//! }
//! ```

pub mod cascade;
pub mod cfg;
pub mod error;
pub mod log;
pub mod util;

pub use cascade::{
    create_logger, file_config, get_config, get_logger, load_config_from_options,
    load_config_from_string, logger, registry,
};
pub use cfg::{register_class, Config, ConfigPhase, Resource, TypeDescriptor};
pub use error::{CascadeError, Result};
pub use log::{LogFormatter, LogHandler, LogLevel, LogProcessor, LogRecord, Logger, Registry};
