//! cfg 模块 - 声明式日志配置
//!
//! 把一份配置（文件、JSON/YAML 文本或已解析的结构）变成一组装配好的 logger：
//!
//! - [`ClassLoader`]：按 `class` 选项找到类型描述，拆分构造参数与额外选项，
//!   递归构建嵌套对象，再通过 setter、字段或自定义处理函数应用额外选项
//! - [`FormatterLoader`] / [`ProcessorLoader`] / [`HandlerLoader`]：各自的默认 class、
//!   id 引用替换和自定义处理函数
//! - [`LoggerLoader`]：按 id 把 handler、processor 挂到 logger 上
//! - [`Config`]：按固定阶段编排整个配置过程
//!
//! 自定义类型通过 [`TypeDescriptor`] 描述后用 [`register_class`] 注册即可在配置里引用。

mod class_loader;
mod config;
pub mod descriptor;
pub mod loader;
mod options;
mod registry;
pub mod resolver;
mod source;

pub use class_loader::{ClassLoader, ExtraOptionHandler, ExtraOptionHandlers, Target, WILDCARD};
pub use config::{Config, ConfigPhase};
pub use descriptor::{
    method_arg, AnyObject, DescriptorBuilder, HandlerView, ObjectKind, ParamSpec,
    ResolvedConstructorArgs, TypeDescriptor,
};
pub use loader::{
    FormatterLoader, FormatterPool, HandlerLoader, HandlerPool, LoggerLoader, ProcessorLoader,
    ProcessorPool,
};
pub use options::{options_from_json, Instance, OptionValue, OptionsMap};
pub use registry::{
    class_exists, descriptor, register_class, registered_classes, EmptyObject,
    DEFAULT_OBJECT_CLASS,
};
pub use resolver::{ConstructorResolver, ExtraOptionLookup, ExtraOptionsResolver};
pub use source::{ConfigLoader, Format, Resource};
