//! 类型描述
//!
//! 每个可以出现在配置里的 class 都在注册时给出一份描述：构造参数
//! （按位置、可选参数带默认值）、可调用的 setter、可直接赋值的字段，
//! 以及构造函数本身。加载器只通过描述操作对象，不依赖具体类型。

use crate::cfg::options::{Instance, OptionValue};
use crate::error::{CascadeError, Result};
use crate::log::formatter::LogFormatter;
use crate::log::handler::LogHandler;
use crate::log::processor::LogProcessor;
use crate::util::snake_to_camel_case;
use anyhow::{anyhow, Context};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// 构造中、尚未发布的对象
pub type AnyObject = dyn Any + Send + Sync;

type Constructor = Box<dyn Fn(ResolvedConstructorArgs) -> anyhow::Result<Box<AnyObject>> + Send + Sync>;
type MethodSetter = Box<dyn Fn(&mut AnyObject, Vec<OptionValue>) -> anyhow::Result<()> + Send + Sync>;
type FieldSetter = Box<dyn Fn(&mut AnyObject, OptionValue) -> anyhow::Result<()> + Send + Sync>;
type Publisher = fn(Box<AnyObject>) -> Option<Instance>;

/// 把构造中的对象当作 handler 访问
pub type HandlerView = fn(&mut AnyObject) -> Option<&mut dyn LogHandler>;

/// 对象所属的日志组件类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Formatter,
    Handler,
    Processor,
    Object,
}

/// 构造参数
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    /// camelCase 参数名
    pub name: String,
    pub position: usize,
    /// None 表示必填
    pub default: Option<JsonValue>,
}

impl ParamSpec {
    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

/// 按构造参数顺序排好的实参
#[derive(Debug, Clone)]
pub struct ResolvedConstructorArgs {
    class: String,
    names: Vec<String>,
    values: Vec<OptionValue>,
}

impl ResolvedConstructorArgs {
    pub fn new(class: impl Into<String>, names: Vec<String>, values: Vec<OptionValue>) -> Self {
        Self {
            class: class.into(),
            names,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[OptionValue] {
        &self.values
    }

    pub fn get(&self, position: usize) -> Option<&OptionValue> {
        self.values.get(position)
    }

    /// 取走指定位置的实参，原位置留下 null
    pub fn take(&mut self, position: usize) -> anyhow::Result<OptionValue> {
        let slot = self
            .values
            .get_mut(position)
            .ok_or_else(|| anyhow!("{} has no constructor argument #{}", self.class, position))?;
        Ok(std::mem::replace(slot, OptionValue::null()))
    }

    /// 将指定位置的实参反序列化为具体类型
    pub fn parse<T: DeserializeOwned>(&self, position: usize) -> anyhow::Result<T> {
        let value = self
            .get(position)
            .ok_or_else(|| anyhow!("{} has no constructor argument #{}", self.class, position))?;
        value
            .as_type()
            .with_context(|| format!("invalid value for '{}'", self.names[position]))
    }

    pub fn into_values(self) -> Vec<OptionValue> {
        self.values
    }
}

/// 取 setter 的第 index 个实参
pub fn method_arg<T: DeserializeOwned>(args: &[OptionValue], index: usize) -> anyhow::Result<T> {
    args.get(index)
        .ok_or_else(|| anyhow!("missing argument #{}", index))?
        .as_type()
}

/// 注册到 class 表中的类型描述
pub struct TypeDescriptor {
    name: String,
    kind: ObjectKind,
    params: Vec<ParamSpec>,
    methods: HashMap<String, MethodSetter>,
    fields: HashMap<String, FieldSetter>,
    construct: Constructor,
    publish: Publisher,
    handler_view: Option<HandlerView>,
}

impl TypeDescriptor {
    pub fn formatter<T: LogFormatter + 'static>(name: &str) -> DescriptorBuilder<T> {
        DescriptorBuilder::new(name, ObjectKind::Formatter, publish_formatter::<T>, None)
    }

    pub fn handler<T: LogHandler + 'static>(name: &str) -> DescriptorBuilder<T> {
        DescriptorBuilder::new(
            name,
            ObjectKind::Handler,
            publish_handler::<T>,
            Some(view_handler::<T>),
        )
    }

    pub fn processor<T: LogProcessor + 'static>(name: &str) -> DescriptorBuilder<T> {
        DescriptorBuilder::new(name, ObjectKind::Processor, publish_processor::<T>, None)
    }

    pub fn object<T: Any + Send + Sync>(name: &str) -> DescriptorBuilder<T> {
        DescriptorBuilder::new(name, ObjectKind::Object, publish_object::<T>, None)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// 构造参数，按位置排列
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn handler_view(&self) -> Option<HandlerView> {
        self.handler_view
    }

    pub(crate) fn construct(&self, args: ResolvedConstructorArgs) -> Result<Box<AnyObject>> {
        (self.construct)(args).map_err(|source| CascadeError::Construction {
            class: self.name.clone(),
            source,
        })
    }

    pub(crate) fn call_method(&self, object: &mut AnyObject, name: &str, args: Vec<OptionValue>) -> Option<anyhow::Result<()>> {
        self.methods.get(name).map(|setter| setter(object, args))
    }

    pub(crate) fn set_field(&self, object: &mut AnyObject, name: &str, value: OptionValue) -> Option<anyhow::Result<()>> {
        self.fields.get(name).map(|setter| setter(object, value))
    }

    pub(crate) fn publish(&self, object: Box<AnyObject>) -> Result<Instance> {
        (self.publish)(object).ok_or_else(|| CascadeError::UnexpectedKind {
            class: self.name.clone(),
            expected: kind_name(self.kind),
        })
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&String> = self.methods.keys().collect();
        methods.sort();
        let mut fields: Vec<&String> = self.fields.keys().collect();
        fields.sort();
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("params", &self.params)
            .field("methods", &methods)
            .field("fields", &fields)
            .finish()
    }
}

/// 类型描述构建器
///
/// 参数名、setter 名、字段名可以用 snake_case 书写，注册时统一转成 camelCase。
///
/// ```
/// use cascade::cfg::TypeDescriptor;
///
/// #[derive(Default)]
/// struct Mailer {
///     host: String,
///     retries: u32,
/// }
///
/// let descriptor = TypeDescriptor::object::<Mailer>("Mailer")
///     .param("host")
///     .method("set_retries", |mailer, args| {
///         mailer.retries = cascade::cfg::method_arg(&args, 0)?;
///         Ok(())
///     })
///     .constructor(|args| {
///         Ok(Mailer { host: args.parse(0)?, ..Default::default() })
///     });
///
/// assert_eq!(descriptor.params()[0].name, "host");
/// assert!(descriptor.has_method("setRetries"));
/// ```
pub struct DescriptorBuilder<T> {
    name: String,
    kind: ObjectKind,
    params: Vec<ParamSpec>,
    methods: HashMap<String, MethodSetter>,
    fields: HashMap<String, FieldSetter>,
    publish: Publisher,
    handler_view: Option<HandlerView>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> DescriptorBuilder<T> {
    fn new(name: &str, kind: ObjectKind, publish: Publisher, handler_view: Option<HandlerView>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            params: Vec::new(),
            methods: HashMap::new(),
            fields: HashMap::new(),
            publish,
            handler_view,
            _marker: PhantomData,
        }
    }

    /// 必填构造参数
    pub fn param(mut self, name: &str) -> Self {
        let position = self.params.len();
        self.params.push(ParamSpec {
            name: snake_to_camel_case(name),
            position,
            default: None,
        });
        self
    }

    /// 带默认值的构造参数
    pub fn param_default(mut self, name: &str, default: impl Into<JsonValue>) -> Self {
        let position = self.params.len();
        self.params.push(ParamSpec {
            name: snake_to_camel_case(name),
            position,
            default: Some(default.into()),
        });
        self
    }

    /// setter，列表值会被展开为多个实参
    pub fn method<F>(mut self, name: &str, setter: F) -> Self
    where
        F: Fn(&mut T, Vec<OptionValue>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let class = self.name.clone();
        self.methods.insert(
            snake_to_camel_case(name),
            Box::new(move |object: &mut AnyObject, args: Vec<OptionValue>| -> anyhow::Result<()> {
                let target = object
                    .downcast_mut::<T>()
                    .ok_or_else(|| anyhow!("object is not a {}", class))?;
                setter(target, args)
            }),
        );
        self
    }

    /// 可直接赋值的公开字段
    pub fn field<F>(mut self, name: &str, setter: F) -> Self
    where
        F: Fn(&mut T, OptionValue) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let class = self.name.clone();
        self.fields.insert(
            snake_to_camel_case(name),
            Box::new(move |object: &mut AnyObject, value: OptionValue| -> anyhow::Result<()> {
                let target = object
                    .downcast_mut::<T>()
                    .ok_or_else(|| anyhow!("object is not a {}", class))?;
                setter(target, value)
            }),
        );
        self
    }

    /// 给出构造函数，完成描述
    pub fn constructor<F>(self, construct: F) -> TypeDescriptor
    where
        F: Fn(ResolvedConstructorArgs) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        TypeDescriptor {
            name: self.name,
            kind: self.kind,
            params: self.params,
            methods: self.methods,
            fields: self.fields,
            construct: Box::new(move |args: ResolvedConstructorArgs| -> anyhow::Result<Box<AnyObject>> {
                Ok(Box::new(construct(args)?))
            }),
            publish: self.publish,
            handler_view: self.handler_view,
        }
    }
}

impl<T: Any + Send + Sync + Default> DescriptorBuilder<T> {
    /// 无参构造，使用 Default
    pub fn default_constructor(self) -> TypeDescriptor {
        self.constructor(|_| Ok(T::default()))
    }
}

fn kind_name(kind: ObjectKind) -> &'static str {
    match kind {
        ObjectKind::Formatter => "formatter",
        ObjectKind::Handler => "handler",
        ObjectKind::Processor => "processor",
        ObjectKind::Object => "object",
    }
}

fn publish_formatter<T: LogFormatter + 'static>(object: Box<AnyObject>) -> Option<Instance> {
    let formatter = object.downcast::<T>().ok()?;
    Some(Instance::Formatter(Arc::new(*formatter)))
}

fn publish_handler<T: LogHandler + 'static>(object: Box<AnyObject>) -> Option<Instance> {
    let handler = object.downcast::<T>().ok()?;
    Some(Instance::Handler(Arc::new(*handler)))
}

fn publish_processor<T: LogProcessor + 'static>(object: Box<AnyObject>) -> Option<Instance> {
    let processor = object.downcast::<T>().ok()?;
    Some(Instance::Processor(Arc::new(*processor)))
}

fn publish_object<T: Any + Send + Sync>(object: Box<AnyObject>) -> Option<Instance> {
    let object = object.downcast::<T>().ok()?;
    Some(Instance::Object(Arc::new(*object)))
}

fn view_handler<T: LogHandler + 'static>(object: &mut AnyObject) -> Option<&mut dyn LogHandler> {
    object
        .downcast_mut::<T>()
        .map(|handler| handler as &mut dyn LogHandler)
}
