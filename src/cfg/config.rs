// 配置编排：解析资源，依次构建 formatter、processor、handler 和 logger

use indexmap::IndexMap;
use std::sync::Arc;

use crate::cfg::loader::{
    FormatterLoader, FormatterPool, HandlerLoader, HandlerPool, LoggerLoader, ProcessorLoader,
    ProcessorPool,
};
use crate::cfg::options::{OptionValue, OptionsMap};
use crate::cfg::source::{ConfigLoader, Resource};
use crate::error::{CascadeError, Result};
use crate::log::logger::Logger;
use crate::log::registry::Registry;

/// 配置所处的阶段，只会向前推进
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigPhase {
    Unconfigured,
    Parsed,
    FormattersBuilt,
    ProcessorsBuilt,
    HandlersBuilt,
    LoggersBuilt,
}

/// 一次完整的配置过程
///
/// 后面的阶段可以按 id 引用前面阶段构建的对象，所以构建顺序固定为
/// formatters、processors、handlers、loggers。
///
/// # 示例
///
/// ```rust
/// use cascade::cfg::{Config, ConfigPhase};
/// use cascade::log::Registry;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let registry = Arc::new(Registry::new());
/// let mut config = Config::new(json!({
///     "formatters": {"dashed": {"format": "%channel%-%level_name%: %message%\n"}},
///     "handlers": {"console": {"stream": "stdout", "formatter": "dashed"}},
///     "loggers": {"app": {"handlers": ["console"]}}
/// }), registry.clone());
/// config.load()?;
/// config.configure()?;
///
/// assert_eq!(config.phase(), ConfigPhase::LoggersBuilt);
/// assert!(registry.has_logger("app"));
/// # Ok::<(), cascade::CascadeError>(())
/// ```
pub struct Config {
    loader: ConfigLoader,
    registry: Arc<Registry>,
    phase: ConfigPhase,
    options: OptionsMap,
    formatters: FormatterPool,
    processors: ProcessorPool,
    handlers: HandlerPool,
    loggers: IndexMap<String, Arc<Logger>>,
}

impl Config {
    pub const DISABLE_EXISTING_LOGGERS: &'static str = "disable_existing_loggers";

    pub fn new(resource: impl Into<Resource>, registry: Arc<Registry>) -> Self {
        Self {
            loader: ConfigLoader::new(resource),
            registry,
            phase: ConfigPhase::Unconfigured,
            options: OptionsMap::new(),
            formatters: FormatterPool::new(),
            processors: ProcessorPool::new(),
            handlers: HandlerPool::new(),
            loggers: IndexMap::new(),
        }
    }

    /// 解析并构建，相当于依次调用 `load` 和 `configure`
    pub fn apply(resource: impl Into<Resource>, registry: Arc<Registry>) -> Result<Self> {
        let mut config = Self::new(resource, registry);
        config.load()?;
        config.configure()?;
        Ok(config)
    }

    /// 解析配置资源
    pub fn load(&mut self) -> Result<()> {
        self.expect_phase(ConfigPhase::Unconfigured, "load")?;
        self.options = self.loader.load()?;
        self.advance(ConfigPhase::Parsed);
        Ok(())
    }

    /// 构建全部对象
    ///
    /// 没有显式关闭 `disable_existing_loggers` 时先清空 registry。
    /// 缺少 `loggers` 时在其他阶段完成后返回 `MissingLoggersSection`；
    /// 中途失败不会回滚已注册的 logger。
    pub fn configure(&mut self) -> Result<()> {
        self.expect_phase(ConfigPhase::Parsed, "configure")?;

        if self.disable_existing_loggers()? {
            log::debug!("clear existing loggers");
            self.registry.clear();
        }

        for (id, options) in section(&self.options, "formatters")? {
            let formatter = FormatterLoader::new(options)?.load()?;
            self.formatters.insert(id, formatter);
        }
        self.advance(ConfigPhase::FormattersBuilt);

        for (id, options) in section(&self.options, "processors")? {
            let processor = ProcessorLoader::new(options)?.load()?;
            self.processors.insert(id, processor);
        }
        self.advance(ConfigPhase::ProcessorsBuilt);

        for (id, options) in section(&self.options, "handlers")? {
            let handler =
                HandlerLoader::new(options, &self.formatters, &self.processors, &self.handlers)?
                    .load()?;
            self.handlers.insert(id, handler);
        }
        self.advance(ConfigPhase::HandlersBuilt);

        if !self.options.contains_key("loggers") {
            return Err(CascadeError::MissingLoggersSection);
        }
        for (name, options) in section(&self.options, "loggers")? {
            let logger = LoggerLoader::new(
                &name,
                &options,
                &self.handlers,
                &self.processors,
                &self.registry,
            )?
            .load()?;
            self.loggers.insert(name, logger);
        }
        self.advance(ConfigPhase::LoggersBuilt);

        Ok(())
    }

    pub fn phase(&self) -> ConfigPhase {
        self.phase
    }

    pub fn options(&self) -> &OptionsMap {
        &self.options
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn formatters(&self) -> &FormatterPool {
        &self.formatters
    }

    pub fn processors(&self) -> &ProcessorPool {
        &self.processors
    }

    pub fn handlers(&self) -> &HandlerPool {
        &self.handlers
    }

    pub fn loggers(&self) -> &IndexMap<String, Arc<Logger>> {
        &self.loggers
    }

    fn disable_existing_loggers(&self) -> Result<bool> {
        match self.options.get(Self::DISABLE_EXISTING_LOGGERS) {
            None => Ok(true),
            Some(value) if value.is_null() => Ok(true),
            Some(value) => value.as_type::<bool>().map_err(|e| {
                CascadeError::InvalidArgument(format!(
                    "{} must be a boolean: {}",
                    Self::DISABLE_EXISTING_LOGGERS,
                    e
                ))
            }),
        }
    }

    fn expect_phase(&self, expected: ConfigPhase, operation: &str) -> Result<()> {
        if self.phase != expected {
            return Err(CascadeError::InvalidArgument(format!(
                "cannot {} a configuration in phase {:?}",
                operation, self.phase
            )));
        }
        Ok(())
    }

    fn advance(&mut self, phase: ConfigPhase) {
        log::debug!("configuration phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("phase", &self.phase)
            .field("formatters", &self.formatters.keys().collect::<Vec<_>>())
            .field("processors", &self.processors.keys().collect::<Vec<_>>())
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("loggers", &self.loggers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// 取出某一节的 (id, 选项) 列表，缺失的节为空；空条目视为空选项表
fn section(options: &OptionsMap, name: &str) -> Result<Vec<(String, OptionsMap)>> {
    let entries = match options.get(name) {
        None => return Ok(Vec::new()),
        Some(value) if value.is_null() => return Ok(Vec::new()),
        Some(OptionValue::Map(entries)) => entries,
        Some(other) => {
            return Err(CascadeError::InvalidArgument(format!(
                "\"{}\" must be a map of id to options, found {}",
                name,
                other.describe()
            )))
        }
    };

    entries
        .iter()
        .map(|(id, value)| match value {
            OptionValue::Map(map) => Ok((id.clone(), map.clone())),
            value if value.is_null() => Ok((id.clone(), OptionsMap::new())),
            other => Err(CascadeError::InvalidArgument(format!(
                "options of {} \"{}\" must be a map, found {}",
                name,
                id,
                other.describe()
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::level::LogLevel;
    use serde_json::json;
    use std::io::Read;
    use tempfile::NamedTempFile;

    fn configure(value: serde_json::Value, registry: &Arc<Registry>) -> Result<Config> {
        Config::apply(value, registry.clone())
    }

    #[test]
    fn test_config_phases() -> anyhow::Result<()> {
        let registry = Arc::new(Registry::new());
        let mut config = Config::new(json!({"loggers": {"x": {}}}), registry);
        assert_eq!(config.phase(), ConfigPhase::Unconfigured);

        config.load()?;
        assert_eq!(config.phase(), ConfigPhase::Parsed);

        config.configure()?;
        assert_eq!(config.phase(), ConfigPhase::LoggersBuilt);

        // 不能重复构建
        assert!(matches!(config.configure(), Err(CascadeError::InvalidArgument(_))));
        Ok(())
    }

    #[test]
    fn test_minimal_logger() -> anyhow::Result<()> {
        let registry = Arc::new(Registry::new());
        let config = configure(json!({"loggers": {"x": {}}}), &registry)?;

        assert_eq!(registry.names(), vec!["x"]);
        let logger = registry.get("x").ok_or_else(|| anyhow::anyhow!("missing logger"))?;
        assert!(logger.handlers().is_empty());
        assert!(logger.processors().is_empty());
        assert!(config.formatters().is_empty());
        assert!(config.handlers().is_empty());
        Ok(())
    }

    #[test]
    fn test_null_logger_entry() -> anyhow::Result<()> {
        let registry = Arc::new(Registry::new());
        Config::apply("loggers:\n  quiet:\n", registry.clone())?;
        assert!(registry.has_logger("quiet"));
        Ok(())
    }

    #[test]
    fn test_missing_loggers_section() {
        let registry = Arc::new(Registry::new());
        let mut config = Config::new(
            json!({"formatters": {"f": {}}, "handlers": {"h": {"class": "NullHandler"}}}),
            registry,
        );
        assert!(config.load().is_ok());

        assert!(matches!(config.configure(), Err(CascadeError::MissingLoggersSection)));
        // 其他阶段照常构建
        assert_eq!(config.phase(), ConfigPhase::HandlersBuilt);
        assert_eq!(config.formatters().len(), 1);
        assert_eq!(config.handlers().len(), 1);
    }

    #[test]
    fn test_formatter_identity() -> anyhow::Result<()> {
        let registry = Arc::new(Registry::new());
        let config = configure(
            json!({
                "formatters": {"f": {"class": "JsonFormatter"}},
                "handlers": {"h": {"class": "TestHandler", "formatter": "f"}},
                "loggers": {"l": {"handlers": ["h"]}}
            }),
            &registry,
        )?;

        let formatter = config.formatters()["f"].clone();
        let handler = config.handlers()["h"].clone();
        assert!(Arc::ptr_eq(&handler.formatter(), &formatter));

        let logger = registry.get("l").ok_or_else(|| anyhow::anyhow!("missing logger"))?;
        assert!(Arc::ptr_eq(&logger.handlers()[0], &handler));
        Ok(())
    }

    #[test]
    fn test_end_to_end_file_output() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        let registry = Arc::new(Registry::new());
        configure(
            json!({
                "formatters": {"plain": {"format": "%channel%.%level_name%: %message% %extra%\n"}},
                "processors": {
                    "tags": {"class": "TagProcessor", "tags": ["web"]},
                    "pid": {"class": "ProcessIdProcessor"}
                },
                "handlers": {
                    "file": {
                        "stream": file.path().display().to_string(),
                        "level": "INFO",
                        "formatter": "plain",
                        "processors": ["tags"]
                    }
                },
                "loggers": {"web": {"handlers": ["file"], "processors": ["pid"]}}
            }),
            &registry,
        )?;

        let logger = registry.get("web").ok_or_else(|| anyhow::anyhow!("missing logger"))?;
        logger.debug("ignored")?;
        logger.info("served")?;

        let mut content = String::new();
        file.read_to_string(&mut content)?;
        assert!(!content.contains("ignored"));
        assert!(content.starts_with("web.INFO: served "));
        assert!(content.contains("\"tags\":[\"web\"]"));
        assert!(content.contains("process_id"));
        Ok(())
    }

    #[test]
    fn test_composite_handlers() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        let registry = Arc::new(Registry::new());
        let config = configure(
            json!({
                "formatters": {"message": {"format": "%message%\n"}},
                "handlers": {
                    "file": {"stream": file.path().display().to_string(), "formatter": "message"},
                    "errors_only": {"class": "FilterHandler", "handler": "file", "min_level_or_list": "error"},
                    "group": {"class": "GroupHandler", "handlers": ["errors_only"]}
                },
                "loggers": {"app": {"handlers": ["group"]}}
            }),
            &registry,
        )?;

        let logger = registry.get("app").ok_or_else(|| anyhow::anyhow!("missing logger"))?;
        logger.warning("skipped")?;
        logger.error("kept")?;

        assert!(!config.handlers()["group"].is_handling(LogLevel::Warning));
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        assert_eq!(content, "kept\n");
        Ok(())
    }

    #[test]
    fn test_disable_existing_loggers() -> anyhow::Result<()> {
        let registry = Arc::new(Registry::new());
        configure(json!({"loggers": {"first": {}}}), &registry)?;

        configure(json!({"loggers": {"second": {}}}), &registry)?;
        assert_eq!(registry.names(), vec!["second"]);

        configure(
            json!({"disable_existing_loggers": false, "loggers": {"third": {}}}),
            &registry,
        )?;
        assert_eq!(registry.names(), vec!["second", "third"]);
        Ok(())
    }

    #[test]
    fn test_invalid_sections() {
        let registry = Arc::new(Registry::new());
        assert!(matches!(
            configure(json!({"loggers": ["x"]}), &registry),
            Err(CascadeError::InvalidArgument(_))
        ));
        assert!(matches!(
            configure(json!({"loggers": {"x": 1}}), &registry),
            Err(CascadeError::InvalidArgument(_))
        ));
        assert!(matches!(
            configure(json!({"disable_existing_loggers": "yes", "loggers": {}}), &registry),
            Err(CascadeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_missing_reference_keeps_earlier_loggers() -> anyhow::Result<()> {
        let registry = Arc::new(Registry::new());
        let result = configure(
            json!({"loggers": {"ok": {}, "broken": {"handlers": ["nope"]}}}),
            &registry,
        );

        assert!(matches!(result, Err(CascadeError::ReferenceNotFound { .. })));
        assert!(registry.has_logger("ok"));
        assert!(!registry.has_logger("broken"));
        Ok(())
    }
}
