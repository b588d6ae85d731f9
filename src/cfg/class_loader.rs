//! 通用对象加载器
//!
//! 按选项中的 `class` 找到类型描述，先递归构造嵌套的 class 选项，
//! 再把剩余选项拆成构造参数和额外选项：前者用于构造，后者依次交给
//! setter、字段或自定义处理函数。

use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::descriptor::{AnyObject, HandlerView, ResolvedConstructorArgs, TypeDescriptor};
use super::loader;
use super::options::{Instance, OptionValue, OptionsMap};
use super::registry::{self, DEFAULT_OBJECT_CLASS};
use super::resolver::{ConstructorResolver, ExtraOptionLookup, ExtraOptionsResolver};
use crate::error::{CascadeError, Result};
use crate::log::handler::LogHandler;
use crate::util::snake_to_camel_case;

/// 对所有 class 生效的处理函数使用的 class 名
pub const WILDCARD: &str = "*";

/// 自定义选项处理函数
pub type ExtraOptionHandler =
    Arc<dyn for<'a, 'b> Fn(&'a mut Target<'b>, OptionValue) -> anyhow::Result<()> + Send + Sync>;

/// 处理函数看到的目标对象
pub struct Target<'a> {
    class: &'a str,
    object: &'a mut AnyObject,
    handler_view: Option<HandlerView>,
}

impl<'a> Target<'a> {
    pub fn new(class: &'a str, object: &'a mut AnyObject, handler_view: Option<HandlerView>) -> Self {
        Self {
            class,
            object,
            handler_view,
        }
    }

    pub fn class(&self) -> &str {
        self.class
    }

    /// 还原成具体类型
    pub fn downcast_mut<T: std::any::Any>(&mut self) -> Option<&mut T> {
        self.object.downcast_mut::<T>()
    }

    /// 以 handler 身份访问，目标不是 handler 时返回 None
    pub fn as_handler(&mut self) -> Option<&mut dyn LogHandler> {
        let view = self.handler_view?;
        view(&mut *self.object)
    }
}

/// 自定义选项处理函数表
///
/// 以 (class, 选项名) 为键，class 为 `*` 时对所有 class 生效。
/// 查找时通配项优先于具体 class。
#[derive(Clone, Default)]
pub struct ExtraOptionHandlers {
    handlers: HashMap<String, HashMap<String, ExtraOptionHandler>>,
}

impl ExtraOptionHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册处理函数，选项名会被规范化
    pub fn register<F>(&mut self, class: &str, option: &str, handler: F)
    where
        F: for<'a, 'b> Fn(&'a mut Target<'b>, OptionValue) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.handlers
            .entry(class.to_string())
            .or_default()
            .insert(snake_to_camel_case(option), Arc::new(handler));
    }

    pub fn with<F>(mut self, class: &str, option: &str, handler: F) -> Self
    where
        F: for<'a, 'b> Fn(&'a mut Target<'b>, OptionValue) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register(class, option, handler);
        self
    }

    pub fn can_handle(&self, class: &str, option: &str) -> bool {
        self.get(class, option).is_some()
    }

    pub fn get(&self, class: &str, option: &str) -> Option<&ExtraOptionHandler> {
        [WILDCARD, class]
            .into_iter()
            .find_map(|key| self.handlers.get(key).and_then(|handlers| handlers.get(option)))
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for ExtraOptionHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self
            .handlers
            .iter()
            .flat_map(|(class, options)| options.keys().map(move |option| format!("{}::{}", class, option)))
            .collect();
        keys.sort();
        f.debug_struct("ExtraOptionHandlers").field("handlers", &keys).finish()
    }
}

/// 通用对象加载器
pub struct ClassLoader {
    class: String,
    descriptor: Arc<TypeDescriptor>,
    raw_options: OptionsMap,
    option_handlers: Arc<ExtraOptionHandlers>,
}

impl ClassLoader {
    /// 使用通用默认 class、不带自定义处理函数
    pub fn new(options: OptionsMap) -> Result<Self> {
        Self::with_default_class(options, DEFAULT_OBJECT_CLASS, Arc::new(ExtraOptionHandlers::new()))
    }

    /// 指定默认 class 和自定义处理函数表
    pub fn with_default_class(
        options: OptionsMap,
        default_class: &str,
        option_handlers: Arc<ExtraOptionHandlers>,
    ) -> Result<Self> {
        let mut raw_options = Self::options_to_camel_case(options);
        let class = match raw_options.shift_remove("class") {
            None | Some(OptionValue::Value(JsonValue::Null)) => default_class.to_string(),
            Some(OptionValue::Value(JsonValue::String(class))) => class,
            Some(_) => {
                return Err(CascadeError::InvalidArgument(
                    "option 'class' must be a string".to_string(),
                ))
            }
        };
        let descriptor = registry::descriptor(&class)?;

        Ok(Self {
            class,
            descriptor,
            raw_options,
            option_handlers,
        })
    }

    /// 顶层选项名统一转成 camelCase，嵌套的选项留给递归加载
    pub fn options_to_camel_case(options: OptionsMap) -> OptionsMap {
        options
            .into_iter()
            .map(|(name, value)| (snake_to_camel_case(&name), value))
            .collect()
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// 规范化后、尚未处理的选项
    pub fn options(&self) -> &OptionsMap {
        &self.raw_options
    }

    pub fn extra_option_handler(&self, option: &str) -> Option<ExtraOptionHandler> {
        self.option_handlers.get(&self.class, option).cloned()
    }

    /// 构造对象并应用全部选项
    pub fn load(mut self) -> Result<Instance> {
        self.load_child_classes()?;
        let (args, extra) = self.resolve_options()?;

        log::debug!("construct [{}] with {} argument(s)", self.class, args.len());
        let mut object = self.descriptor.construct(args)?;
        self.load_extra_options(extra, &mut *object)?;

        self.descriptor.publish(object)
    }

    /// 值为带已注册 class 的 map 时就地替换成构造好的对象
    ///
    /// 子对象使用与其类别对应的自定义处理函数表。
    fn load_child_classes(&mut self) -> Result<()> {
        for value in self.raw_options.values_mut() {
            let child_class = value
                .as_map()
                .and_then(|map| map.get("class"))
                .and_then(OptionValue::as_str)
                .filter(|class| registry::class_exists(class))
                .map(str::to_string);
            let Some(child_class) = child_class else {
                continue;
            };

            let kind = registry::descriptor(&child_class)?.kind();
            if let OptionValue::Map(map) = std::mem::replace(value, OptionValue::null()) {
                log::debug!("load nested [{}]", child_class);
                let child = ClassLoader::with_default_class(
                    map,
                    DEFAULT_OBJECT_CLASS,
                    loader::extra_option_handlers(kind),
                )?;
                *value = OptionValue::Instance(child.load()?);
            }
        }
        Ok(())
    }

    /// 拆分构造参数和额外选项，分别解析
    fn resolve_options(&mut self) -> Result<(ResolvedConstructorArgs, OptionsMap)> {
        let options = std::mem::take(&mut self.raw_options);

        let constructor_resolver = ConstructorResolver::new(&self.descriptor);
        let (constructor_options, extra_options): (OptionsMap, OptionsMap) = options
            .into_iter()
            .partition(|(name, _)| constructor_resolver.has_arg(name));

        let extra_resolver = ExtraOptionsResolver::new(
            &self.descriptor,
            extra_options.keys().cloned().collect(),
        );

        let args = constructor_resolver.resolve(constructor_options)?;
        let extra = extra_resolver.resolve(extra_options, Some(&*self))?;
        Ok((args, extra))
    }

    /// 依次尝试 setter、字段、自定义处理函数
    fn load_extra_options(&self, extra: OptionsMap, object: &mut AnyObject) -> Result<()> {
        for (name, value) in extra {
            let applied = if self.descriptor.has_method(&name) {
                self.descriptor.call_method(object, &name, value.into_list())
            } else if self.descriptor.has_field(&name) {
                self.descriptor.set_field(object, &name, value)
            } else if let Some(handler) = self.extra_option_handler(&name) {
                let mut target = Target::new(&self.class, object, self.descriptor.handler_view());
                Some(handler(&mut target, value))
            } else {
                None
            };

            match applied {
                Some(Ok(())) => {}
                Some(Err(source)) => {
                    return Err(CascadeError::InvalidOption {
                        class: self.class.clone(),
                        option: name,
                        source,
                    })
                }
                None => {
                    return Err(CascadeError::UndefinedOption {
                        class: self.class.clone(),
                        option: name,
                    })
                }
            }
        }
        Ok(())
    }
}

impl ExtraOptionLookup for ClassLoader {
    fn can_handle(&self, option: &str) -> bool {
        self.option_handlers.can_handle(&self.class, option)
    }
}
