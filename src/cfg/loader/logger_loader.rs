use std::sync::Arc;

use super::{HandlerPool, ProcessorPool};
use crate::cfg::options::{OptionValue, OptionsMap};
use crate::error::{CascadeError, Result};
use crate::log::handler::LogHandler;
use crate::log::logger::Logger;
use crate::log::processor::LogProcessor;
use crate::log::registry::Registry;

/// Logger 装配器
///
/// 不走 ClassLoader：只把 `handlers`、`processors` 中的 id 换成池里的对象，
/// 再挂到 registry 中同名的 logger 上。
pub struct LoggerLoader {
    logger: Arc<Logger>,
    handlers: Vec<Arc<dyn LogHandler>>,
    processors: Vec<Arc<dyn LogProcessor>>,
}

impl LoggerLoader {
    /// 引用全部解析成功后才会在 registry 中取得或创建 logger
    pub fn new(
        name: &str,
        options: &OptionsMap,
        handlers: &HandlerPool,
        processors: &ProcessorPool,
        registry: &Registry,
    ) -> Result<Self> {
        let handlers = Self::resolve_handlers(name, options, handlers)?;
        let processors = Self::resolve_processors(name, options, processors)?;
        let logger = registry.get_or_create(name)?;

        Ok(Self {
            logger,
            handlers,
            processors,
        })
    }

    /// 按声明顺序解析 `handlers`
    pub fn resolve_handlers(
        name: &str,
        options: &OptionsMap,
        pool: &HandlerPool,
    ) -> Result<Vec<Arc<dyn LogHandler>>> {
        resolve_ids(name, options.get("handlers"), "handler", pool)
    }

    /// 按声明顺序解析 `processors`
    pub fn resolve_processors(
        name: &str,
        options: &OptionsMap,
        pool: &ProcessorPool,
    ) -> Result<Vec<Arc<dyn LogProcessor>>> {
        resolve_ids(name, options.get("processors"), "processor", pool)
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    /// handler 和 processor 都倒序压栈，执行顺序与声明顺序一致
    pub fn load(self) -> Result<Arc<Logger>> {
        for handler in self.handlers.into_iter().rev() {
            self.logger.push_handler(handler);
        }
        for processor in self.processors.into_iter().rev() {
            self.logger.push_processor(processor);
        }
        log::debug!("logger \"{}\" loaded", self.logger.name());
        Ok(self.logger)
    }
}

fn resolve_ids<T: ?Sized>(
    name: &str,
    value: Option<&OptionValue>,
    kind: &'static str,
    pool: &indexmap::IndexMap<String, Arc<T>>,
) -> Result<Vec<Arc<T>>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };

    value
        .clone()
        .into_list()
        .into_iter()
        .map(|item| {
            let id = item.as_str().ok_or_else(|| {
                CascadeError::InvalidArgument(format!(
                    "logger \"{}\": {} references must be ids, found {:?}",
                    name, kind, item
                ))
            })?;
            pool.get(id).cloned().ok_or_else(|| CascadeError::ReferenceNotFound {
                kind,
                id: id.to_string(),
                owner: format!("logger \"{}\"", name),
            })
        })
        .collect()
}
