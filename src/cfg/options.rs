//! 选项树
//!
//! 配置文档解析后得到的是纯数据（JSON 值），加载过程中子配置会被替换成
//! 已经构造好的对象，所以选项值是"数据或实例"的混合体。

use crate::error::{CascadeError, Result};
use crate::log::formatter::LogFormatter;
use crate::log::handler::LogHandler;
use crate::log::processor::LogProcessor;
use anyhow::{anyhow, Context};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 保持文档顺序的选项表
pub type OptionsMap = IndexMap<String, OptionValue>;

/// 加载完成的对象
#[derive(Clone)]
pub enum Instance {
    Formatter(Arc<dyn LogFormatter>),
    Handler(Arc<dyn LogHandler>),
    Processor(Arc<dyn LogProcessor>),
    /// 不属于日志体系的普通对象
    Object(Arc<dyn Any + Send + Sync>),
}

impl Instance {
    pub fn kind(&self) -> &'static str {
        match self {
            Instance::Formatter(_) => "formatter",
            Instance::Handler(_) => "handler",
            Instance::Processor(_) => "processor",
            Instance::Object(_) => "object",
        }
    }

    pub fn into_formatter(self) -> Option<Arc<dyn LogFormatter>> {
        match self {
            Instance::Formatter(formatter) => Some(formatter),
            _ => None,
        }
    }

    pub fn into_handler(self) -> Option<Arc<dyn LogHandler>> {
        match self {
            Instance::Handler(handler) => Some(handler),
            _ => None,
        }
    }

    pub fn into_processor(self) -> Option<Arc<dyn LogProcessor>> {
        match self {
            Instance::Processor(processor) => Some(processor),
            _ => None,
        }
    }

    /// 取出普通对象并还原成具体类型
    pub fn downcast<T: Any + Send + Sync>(self) -> Option<Arc<T>> {
        match self {
            Instance::Object(object) => object.downcast::<T>().ok(),
            _ => None,
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance({})", self.kind())
    }
}

/// 选项值
#[derive(Clone, Debug)]
pub enum OptionValue {
    /// 标量或无法再展开的 JSON 值
    Value(JsonValue),
    Map(OptionsMap),
    List(Vec<OptionValue>),
    Instance(Instance),
}

impl OptionValue {
    pub fn null() -> Self {
        OptionValue::Value(JsonValue::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, OptionValue::Value(JsonValue::Null))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Value(JsonValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&OptionsMap> {
        match self {
            OptionValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            OptionValue::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// 转回 JSON，包含实例时失败
    pub fn to_json(&self) -> anyhow::Result<JsonValue> {
        match self {
            OptionValue::Value(value) => Ok(value.clone()),
            OptionValue::Map(map) => {
                let mut object = serde_json::Map::with_capacity(map.len());
                for (key, value) in map {
                    object.insert(key.clone(), value.to_json()?);
                }
                Ok(JsonValue::Object(object))
            }
            OptionValue::List(items) => items
                .iter()
                .map(OptionValue::to_json)
                .collect::<anyhow::Result<Vec<_>>>()
                .map(JsonValue::Array),
            OptionValue::Instance(instance) => {
                Err(anyhow!("expected plain data, found a loaded {}", instance.kind()))
            }
        }
    }

    /// 反序列化为具体类型
    pub fn as_type<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        let value = self.to_json()?;
        serde_json::from_value(value.clone()).with_context(|| format!("unexpected value {}", value))
    }

    /// 列表展开为元素，其余值视为单元素列表
    pub fn into_list(self) -> Vec<OptionValue> {
        match self {
            OptionValue::List(items) => items,
            other => vec![other],
        }
    }

    pub fn into_formatter(self) -> anyhow::Result<Arc<dyn LogFormatter>> {
        match self {
            OptionValue::Instance(Instance::Formatter(formatter)) => Ok(formatter),
            other => Err(anyhow!("expected a formatter, found {}", other.describe())),
        }
    }

    pub fn into_handler(self) -> anyhow::Result<Arc<dyn LogHandler>> {
        match self {
            OptionValue::Instance(Instance::Handler(handler)) => Ok(handler),
            other => Err(anyhow!("expected a handler, found {}", other.describe())),
        }
    }

    pub fn into_processor(self) -> anyhow::Result<Arc<dyn LogProcessor>> {
        match self {
            OptionValue::Instance(Instance::Processor(processor)) => Ok(processor),
            other => Err(anyhow!("expected a processor, found {}", other.describe())),
        }
    }

    pub fn into_handlers(self) -> anyhow::Result<Vec<Arc<dyn LogHandler>>> {
        self.into_list().into_iter().map(OptionValue::into_handler).collect()
    }

    pub fn into_processors(self) -> anyhow::Result<Vec<Arc<dyn LogProcessor>>> {
        self.into_list().into_iter().map(OptionValue::into_processor).collect()
    }

    /// 取出普通对象并还原成具体类型
    pub fn into_object<T: Any + Send + Sync>(self) -> anyhow::Result<Arc<T>> {
        match self {
            OptionValue::Instance(instance @ Instance::Object(_)) => instance
                .downcast::<T>()
                .ok_or_else(|| anyhow!("object is not a {}", std::any::type_name::<T>())),
            other => Err(anyhow!("expected an object, found {}", other.describe())),
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            OptionValue::Value(value) => value.to_string(),
            OptionValue::Map(_) => "a map".to_string(),
            OptionValue::List(_) => "a list".to_string(),
            OptionValue::Instance(instance) => format!("a {}", instance.kind()),
        }
    }
}

impl From<JsonValue> for OptionValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Object(object) => OptionValue::Map(
                object.into_iter().map(|(k, v)| (k, OptionValue::from(v))).collect(),
            ),
            JsonValue::Array(items) => {
                OptionValue::List(items.into_iter().map(OptionValue::from).collect())
            }
            scalar => OptionValue::Value(scalar),
        }
    }
}

impl From<Instance> for OptionValue {
    fn from(instance: Instance) -> Self {
        OptionValue::Instance(instance)
    }
}

impl From<OptionsMap> for OptionValue {
    fn from(map: OptionsMap) -> Self {
        OptionValue::Map(map)
    }
}

/// 从 JSON 对象构造选项表
pub fn options_from_json(value: JsonValue) -> Result<OptionsMap> {
    match OptionValue::from(value) {
        OptionValue::Map(map) => Ok(map),
        other => Err(CascadeError::InvalidArgument(format!(
            "expected a map of options, found {}",
            other.describe()
        ))),
    }
}
