use crate::error::{CascadeError, Result};
use crate::log::logger::Logger;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;

static GLOBAL_REGISTRY: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(Registry::new()));

/// 按名称索引的 logger 表
///
/// 同一个名称最多对应一个 logger。进程内共用一份 [`Registry::global`]，
/// 测试里可以各自 `Registry::new()` 一份互不干扰。
#[derive(Debug, Default)]
pub struct Registry {
    loggers: DashMap<String, Arc<Logger>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 进程内共享的 registry
    pub fn global() -> Arc<Registry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// 注册 logger，名称已存在且 `overwrite` 为 false 时报错
    pub fn add_logger(&self, logger: Arc<Logger>, overwrite: bool) -> Result<()> {
        let name = logger.name().to_string();
        if name.is_empty() {
            return Err(CascadeError::InvalidArgument(
                "logger name must not be empty".to_string(),
            ));
        }

        match self.loggers.entry(name) {
            Entry::Occupied(mut entry) => {
                if !overwrite {
                    return Err(CascadeError::InvalidArgument(format!(
                        "logger \"{}\" already exists",
                        entry.key()
                    )));
                }
                entry.insert(logger);
            }
            Entry::Vacant(entry) => {
                entry.insert(logger);
            }
        }
        Ok(())
    }

    pub fn has_logger(&self, name: &str) -> bool {
        self.loggers.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.get(name).map(|entry| entry.value().clone())
    }

    /// 获取 logger，不存在时创建并注册
    pub fn get_or_create(&self, name: &str) -> Result<Arc<Logger>> {
        if name.is_empty() {
            return Err(CascadeError::InvalidArgument(
                "logger name must not be empty".to_string(),
            ));
        }

        let logger = self
            .loggers
            .entry(name.to_string())
            .or_insert_with(|| {
                log::debug!("create logger \"{}\"", name);
                Arc::new(Logger::new(name))
            })
            .value()
            .clone();
        Ok(logger)
    }

    pub fn remove_logger(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.remove(name).map(|(_, logger)| logger)
    }

    pub fn clear(&self) {
        self.loggers.clear();
    }

    /// 已注册的名称，按字典序
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loggers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}
