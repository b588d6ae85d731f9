//! 各类日志组件的专用加载器
//!
//! 在通用加载器之上指定默认 class、解析对其他组件的引用，
//! 并挂上各自的自定义选项处理函数。

mod formatter_loader;
mod handler_loader;
mod logger_loader;
mod processor_loader;

pub use formatter_loader::FormatterLoader;
pub use handler_loader::HandlerLoader;
pub use logger_loader::LoggerLoader;
pub use processor_loader::ProcessorLoader;

use indexmap::IndexMap;
use std::sync::Arc;

use super::class_loader::ExtraOptionHandlers;
use super::descriptor::ObjectKind;
use crate::log::formatter::LogFormatter;
use crate::log::handler::LogHandler;
use crate::log::processor::LogProcessor;

/// 按 id 索引的已构建 formatter
pub type FormatterPool = IndexMap<String, Arc<dyn LogFormatter>>;
/// 按 id 索引的已构建 processor
pub type ProcessorPool = IndexMap<String, Arc<dyn LogProcessor>>;
/// 按 id 索引的已构建 handler
pub type HandlerPool = IndexMap<String, Arc<dyn LogHandler>>;

/// 某类组件使用的自定义处理函数表
pub(crate) fn extra_option_handlers(kind: ObjectKind) -> Arc<ExtraOptionHandlers> {
    match kind {
        ObjectKind::Formatter => FormatterLoader::extra_option_handlers(),
        ObjectKind::Handler => HandlerLoader::extra_option_handlers(),
        ObjectKind::Processor | ObjectKind::Object => ProcessorLoader::extra_option_handlers(),
    }
}
