// 额外选项解析

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use crate::cfg::descriptor::TypeDescriptor;
use crate::cfg::options::OptionsMap;
use crate::error::{CascadeError, Result};

/// 自定义选项处理函数的查询接口
pub trait ExtraOptionLookup {
    fn can_handle(&self, option: &str) -> bool;
}

type CacheKey = (String, Vec<String>);

// (class, 排序后的选项名) -> 能通过 setter 或字段处理的选项名
static RECOGNIZED: Lazy<RwLock<HashMap<CacheKey, Arc<HashSet<String>>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

pub(crate) fn evict(class: &str) {
    RECOGNIZED
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .retain(|(cached, _), _| cached != class);
}

/// 额外选项解析器
///
/// 构造参数以外的选项必须能落到 setter、字段或自定义处理函数上，否则报错。
/// setter 和字段的匹配结果按选项名集合缓存；自定义处理函数每次都重新查询，
/// 因为同一个 class 在不同加载器里可能挂着不同的处理函数。
pub struct ExtraOptionsResolver {
    class: String,
    params: Vec<String>,
    recognized: Arc<HashSet<String>>,
}

impl ExtraOptionsResolver {
    pub fn new(descriptor: &TypeDescriptor, params: Vec<String>) -> Self {
        let class = descriptor.name().to_string();
        let key = (class.clone(), Self::params_key(&params));

        let cached = RECOGNIZED
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();

        let recognized = match cached {
            Some(recognized) => recognized,
            None => {
                let recognized: HashSet<String> = params
                    .iter()
                    .filter(|name| descriptor.has_method(name) || descriptor.has_field(name))
                    .cloned()
                    .collect();
                let recognized = Arc::new(recognized);
                RECOGNIZED
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(key, recognized.clone());
                recognized
            }
        };

        Self {
            class,
            params,
            recognized,
        }
    }

    /// 选项名集合的缓存键，与顺序无关
    pub fn params_key(params: &[String]) -> Vec<String> {
        let mut key = params.to_vec();
        key.sort();
        key.dedup();
        key
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// 解析额外选项，只保留可处理的选项，顺序不变
    pub fn resolve(
        &self,
        options: OptionsMap,
        lookup: Option<&dyn ExtraOptionLookup>,
    ) -> Result<OptionsMap> {
        for name in self.params.iter().chain(options.keys()) {
            let dispatchable = self.recognized.contains(name)
                || lookup.is_some_and(|lookup| lookup.can_handle(name));
            if !dispatchable {
                return Err(CascadeError::UndefinedOption {
                    class: self.class.clone(),
                    option: name.clone(),
                });
            }
        }

        Ok(options
            .into_iter()
            .filter(|(name, _)| self.params.contains(name))
            .collect())
    }
}
