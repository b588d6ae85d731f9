//! 进程级入口
//!
//! 配置和 logger 都放在 [`Registry::global`] 上，应用启动时调用一次
//! [`file_config`]，之后在任何地方用 [`get_logger`] 按名称取 logger。
//!
//! ```rust,no_run
//! fn main() -> anyhow::Result<()> {
//!     cascade::file_config("config/logging.yaml")?;
//!
//!     let logger = cascade::get_logger("app")?;
//!     logger.info("service started")?;
//!     Ok(())
//! }
//! ```

use once_cell::sync::Lazy;
use serde_json::Value as JsonValue;
use std::sync::{Arc, PoisonError, RwLock};

use crate::cfg::{Config, Resource};
use crate::error::{CascadeError, Result};
use crate::log::{LogHandler, LogProcessor, Logger, Registry};

static CONFIG: Lazy<RwLock<Option<Arc<Config>>>> = Lazy::new(|| RwLock::new(None));

/// 进程内共享的 logger 表
pub fn registry() -> Arc<Registry> {
    Registry::global()
}

/// 创建并注册 logger，列表顺序即执行顺序
///
/// 名称为空或已经注册时返回 `InvalidArgument`
pub fn create_logger(
    name: &str,
    handlers: Vec<Arc<dyn LogHandler>>,
    processors: Vec<Arc<dyn LogProcessor>>,
) -> Result<Arc<Logger>> {
    if name.is_empty() {
        return Err(CascadeError::InvalidArgument(
            "logger name must not be empty".to_string(),
        ));
    }

    let logger = Arc::new(Logger::with(name, handlers, processors));
    registry().add_logger(logger.clone(), false)?;
    Ok(logger)
}

/// 获取 logger，不存在时创建一个没有 handler 的 logger
pub fn get_logger(name: &str) -> Result<Arc<Logger>> {
    registry().get_or_create(name)
}

/// [`get_logger`] 的别名
pub fn logger(name: &str) -> Result<Arc<Logger>> {
    get_logger(name)
}

/// 最近一次成功应用的配置
pub fn get_config() -> Option<Arc<Config>> {
    CONFIG.read().unwrap_or_else(PoisonError::into_inner).clone()
}

/// 从文件、JSON/YAML 文本或已解析的结构加载配置
pub fn file_config(resource: impl Into<Resource>) -> Result<()> {
    let config = Config::apply(resource, registry())?;
    *CONFIG.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(config));
    Ok(())
}

/// 从 JSON 或 YAML 文本加载配置
pub fn load_config_from_string(config: &str) -> Result<()> {
    file_config(Resource::Text(config.to_string()))
}

/// 从已解析的结构加载配置
pub fn load_config_from_options(options: JsonValue) -> Result<()> {
    file_config(Resource::Options(options))
}
