// 构造参数解析

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::cfg::descriptor::{ParamSpec, ResolvedConstructorArgs, TypeDescriptor};
use crate::cfg::options::{OptionValue, OptionsMap};
use crate::error::{CascadeError, Result};

/// 每个 class 的构造参数表
#[derive(Debug)]
struct ConstructorRules {
    params: Vec<ParamSpec>,
    positions: HashMap<String, usize>,
}

impl ConstructorRules {
    fn new(descriptor: &TypeDescriptor) -> Self {
        let params = descriptor.params().to_vec();
        let positions = params
            .iter()
            .map(|param| (param.name.clone(), param.position))
            .collect();
        Self { params, positions }
    }
}

static RULES: Lazy<RwLock<HashMap<String, Arc<ConstructorRules>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

pub(crate) fn evict(class: &str) {
    RULES
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(class);
}

/// 构造参数解析器
///
/// 把选项按参数名绑定到构造参数上，缺省的可选参数取默认值，
/// 结果按参数位置排列，与选项的书写顺序无关。
pub struct ConstructorResolver {
    class: String,
    rules: Arc<ConstructorRules>,
}

impl ConstructorResolver {
    pub fn new(descriptor: &TypeDescriptor) -> Self {
        let class = descriptor.name().to_string();
        let cached = RULES
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&class)
            .cloned();

        let rules = match cached {
            Some(rules) => rules,
            None => {
                let rules = Arc::new(ConstructorRules::new(descriptor));
                RULES
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(class.clone(), rules.clone());
                rules
            }
        };

        Self { class, rules }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// 构造参数，按位置排列
    pub fn constructor_args(&self) -> &[ParamSpec] {
        &self.rules.params
    }

    pub fn has_arg(&self, name: &str) -> bool {
        self.rules.positions.contains_key(name)
    }

    /// 解析构造参数
    ///
    /// 选项中出现非构造参数时返回 `UnknownOption`，
    /// 必填参数缺失时返回 `MissingRequiredOption`。
    pub fn resolve(&self, mut options: OptionsMap) -> Result<ResolvedConstructorArgs> {
        if let Some(unknown) = options.keys().find(|name| !self.has_arg(name)) {
            return Err(CascadeError::UnknownOption {
                class: self.class.clone(),
                option: unknown.clone(),
            });
        }

        let mut names = Vec::with_capacity(self.rules.params.len());
        let mut values = Vec::with_capacity(self.rules.params.len());
        for param in &self.rules.params {
            let value = match (options.shift_remove(&param.name), &param.default) {
                (Some(value), _) => value,
                (None, Some(default)) => OptionValue::from(default.clone()),
                (None, None) => {
                    return Err(CascadeError::MissingRequiredOption {
                        class: self.class.clone(),
                        option: param.name.clone(),
                    })
                }
            };
            names.push(param.name.clone());
            values.push(value);
        }

        Ok(ResolvedConstructorArgs::new(self.class.clone(), names, values))
    }
}
