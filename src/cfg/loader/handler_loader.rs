use once_cell::sync::Lazy;
use std::sync::Arc;

use super::{FormatterPool, HandlerPool, ProcessorPool};
use crate::cfg::class_loader::{ClassLoader, ExtraOptionHandlers, Target, WILDCARD};
use crate::cfg::options::{Instance, OptionValue, OptionsMap};
use crate::error::{CascadeError, Result};
use crate::log::handler::{LogHandler, LogglyHandler};

fn handler_of<'t>(target: &'t mut Target<'_>) -> anyhow::Result<&'t mut dyn LogHandler> {
    let class = target.class().to_string();
    target
        .as_handler()
        .ok_or_else(|| anyhow::anyhow!("{} is not a handler", class))
}

static EXTRA_OPTION_HANDLERS: Lazy<Arc<ExtraOptionHandlers>> = Lazy::new(|| {
    let handlers = ExtraOptionHandlers::new()
        .with(WILDCARD, "formatter", |target, value| {
            handler_of(target)?.set_formatter(value.into_formatter()?);
            Ok(())
        })
        // processor 以栈的方式挂载，倒序压入后按声明顺序执行
        .with(WILDCARD, "processors", |target, value| {
            let processors = value.into_processors()?;
            let handler = handler_of(target)?;
            for processor in processors.into_iter().rev() {
                handler.push_processor(processor);
            }
            Ok(())
        })
        .with("LogglyHandler", "tags", |target, value| {
            let tags: Vec<String> = match value {
                OptionValue::List(_) => value.as_type()?,
                single => vec![single.as_type()?],
            };
            target
                .downcast_mut::<LogglyHandler>()
                .ok_or_else(|| anyhow::anyhow!("not a LogglyHandler"))?
                .set_tag(tags);
            Ok(())
        });
    Arc::new(handlers)
});

/// Handler 加载器，默认 class 为 StreamHandler
///
/// 构造前先把 `formatter`、`processors`、`handlers`、`handler` 中的 id
/// 替换成已构建的对象。
pub struct HandlerLoader {
    loader: ClassLoader,
}

impl HandlerLoader {
    pub const DEFAULT_CLASS: &'static str = "StreamHandler";

    pub fn new(
        mut options: OptionsMap,
        formatters: &FormatterPool,
        processors: &ProcessorPool,
        handlers: &HandlerPool,
    ) -> Result<Self> {
        Self::populate_formatter(&mut options, formatters)?;
        Self::populate_processors(&mut options, processors)?;
        Self::populate_handlers(&mut options, handlers)?;

        let loader = ClassLoader::with_default_class(
            options,
            Self::DEFAULT_CLASS,
            Self::extra_option_handlers(),
        )?;
        Ok(Self { loader })
    }

    pub fn extra_option_handlers() -> Arc<ExtraOptionHandlers> {
        EXTRA_OPTION_HANDLERS.clone()
    }

    pub fn class(&self) -> &str {
        self.loader.class()
    }

    pub fn load(self) -> Result<Arc<dyn LogHandler>> {
        let class = self.loader.class().to_string();
        self.loader
            .load()?
            .into_handler()
            .ok_or(CascadeError::UnexpectedKind {
                class,
                expected: "handler",
            })
    }

    fn populate_formatter(options: &mut OptionsMap, formatters: &FormatterPool) -> Result<()> {
        if let Some(value) = options.get_mut("formatter") {
            if let Some(id) = value.as_str() {
                let formatter = lookup(formatters, "formatter", id)?;
                *value = OptionValue::Instance(Instance::Formatter(formatter));
            }
        }
        Ok(())
    }

    fn populate_processors(options: &mut OptionsMap, processors: &ProcessorPool) -> Result<()> {
        if let Some(value) = options.get_mut("processors") {
            resolve_list(value, "processor", |id| {
                lookup(processors, "processor", id).map(Instance::Processor)
            })?;
        }
        Ok(())
    }

    fn populate_handlers(options: &mut OptionsMap, handlers: &HandlerPool) -> Result<()> {
        if let Some(value) = options.get_mut("handlers") {
            resolve_list(value, "handler", |id| {
                lookup(handlers, "handler", id).map(Instance::Handler)
            })?;
        }
        if let Some(value) = options.get_mut("handler") {
            if let Some(id) = value.as_str() {
                let handler = lookup(handlers, "handler", id)?;
                *value = OptionValue::Instance(Instance::Handler(handler));
            }
        }
        Ok(())
    }
}

fn lookup<T: ?Sized>(
    pool: &indexmap::IndexMap<String, Arc<T>>,
    kind: &'static str,
    id: &str,
) -> Result<Arc<T>> {
    pool.get(id).cloned().ok_or_else(|| CascadeError::ReferenceNotFound {
        kind,
        id: id.to_string(),
        owner: "handler".to_string(),
    })
}

/// 把 id 列表就地替换成对象，单个 id 视为只有一个元素的列表
fn resolve_list<F>(value: &mut OptionValue, kind: &'static str, resolve: F) -> Result<()>
where
    F: Fn(&str) -> Result<Instance>,
{
    let items = std::mem::replace(value, OptionValue::null()).into_list();
    let mut resolved = Vec::with_capacity(items.len());
    for item in items {
        match item {
            OptionValue::Value(serde_json::Value::String(id)) => {
                resolved.push(OptionValue::Instance(resolve(&id)?))
            }
            instance @ OptionValue::Instance(_) => resolved.push(instance),
            other => {
                return Err(CascadeError::InvalidArgument(format!(
                    "{} references must be ids, found {:?}",
                    kind, other
                )))
            }
        }
    }
    *value = OptionValue::List(resolved);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::options::options_from_json;
    use crate::log::formatter::{LineFormatter, LogFormatter};
    use crate::log::handler::TestHandler;
    use crate::log::level::LogLevel;
    use crate::log::processor::LogProcessor;
    use crate::log::record::LogRecord;
    use serde_json::{json, Value};

    struct Recorder(&'static str);

    impl LogProcessor for Recorder {
        fn process(&self, mut record: LogRecord) -> anyhow::Result<LogRecord> {
            if let Value::Array(items) = record.extra.entry("order").or_insert_with(|| json!([])) {
                items.push(json!(self.0));
            }
            Ok(record)
        }
    }

    fn pools() -> (FormatterPool, ProcessorPool, HandlerPool) {
        let mut formatters = FormatterPool::new();
        formatters.insert(
            "extra_only".to_string(),
            Arc::new(LineFormatter::new(Some("%extra%\n".to_string()), None, false, false)),
        );

        let mut processors = ProcessorPool::new();
        for name in ["a", "b", "c"] {
            processors.insert(name.to_string(), Arc::new(Recorder(name)));
        }

        let mut handlers = HandlerPool::new();
        handlers.insert("memory".to_string(), Arc::new(TestHandler::default()));
        (formatters, processors, handlers)
    }

    fn load(options: Value) -> Result<Arc<dyn LogHandler>> {
        let (formatters, processors, handlers) = pools();
        HandlerLoader::new(options_from_json(options)?, &formatters, &processors, &handlers)?.load()
    }

    #[test]
    fn test_handler_loader_default_class() -> anyhow::Result<()> {
        let (formatters, processors, handlers) = pools();
        let loader = HandlerLoader::new(
            options_from_json(json!({"stream": "stderr"}))?,
            &formatters,
            &processors,
            &handlers,
        )?;
        assert_eq!(loader.class(), "StreamHandler");
        loader.load()?;
        Ok(())
    }

    #[test]
    fn test_handler_loader_formatter_identity() -> anyhow::Result<()> {
        let (formatters, processors, handlers) = pools();
        let handler = HandlerLoader::new(
            options_from_json(json!({"stream": "stderr", "formatter": "extra_only"}))?,
            &formatters,
            &processors,
            &handlers,
        )?
        .load()?;

        let expected: &Arc<dyn LogFormatter> = &formatters["extra_only"];
        assert!(Arc::ptr_eq(&handler.formatter(), expected));
        Ok(())
    }

    #[test]
    fn test_handler_loader_processor_order() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("order.log");
        let handler = load(json!({
            "stream": path.to_str().unwrap(),
            "formatter": "extra_only",
            "processors": ["a", "b", "c"],
        }))?;

        handler.handle(&LogRecord::new("app", LogLevel::Info, "msg"))?;
        let contents = std::fs::read_to_string(&path)?;
        assert_eq!(contents.trim_end(), r#"{"order":["a","b","c"]}"#);
        Ok(())
    }

    #[test]
    fn test_handler_loader_missing_references() {
        let cases = [
            (json!({"stream": "stderr", "formatter": "nope"}), "formatter"),
            (json!({"stream": "stderr", "processors": ["a", "nope"]}), "processor"),
            (json!({"class": "GroupHandler", "handlers": ["memory", "nope"]}), "handler"),
            (json!({"class": "FilterHandler", "handler": "nope"}), "handler"),
        ];

        for (options, expected_kind) in cases {
            match load(options) {
                Err(CascadeError::ReferenceNotFound { kind, id, .. }) => {
                    assert_eq!(kind, expected_kind);
                    assert_eq!(id, "nope");
                }
                other => panic!("unexpected result: {:?}", other.map(|_| ())),
            }
        }
    }

    #[test]
    fn test_handler_loader_composite_references() -> anyhow::Result<()> {
        let group = load(json!({"class": "GroupHandler", "handlers": ["memory"]}))?;
        assert!(group.is_handling(LogLevel::Debug));

        let filter = load(json!({
            "class": "FilterHandler",
            "handler": "memory",
            "min_level_or_list": "error",
        }))?;
        assert!(filter.is_handling(LogLevel::Critical));
        assert!(!filter.is_handling(LogLevel::Warning));
        Ok(())
    }

    #[test]
    fn test_handler_loader_loggly_tags() -> anyhow::Result<()> {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/inputs/token/")
            .match_header("x-loggly-tag", "web,prod")
            .with_status(200)
            .create();

        let handler = load(json!({
            "class": "LogglyHandler",
            "token": "token",
            "endpoint": server.url(),
            "tags": ["web", "prod"],
        }))?;
        handler.handle(&LogRecord::new("app", LogLevel::Info, "msg"))?;

        mock.assert();
        Ok(())
    }

    #[test]
    fn test_handler_loader_inline_formatter() -> anyhow::Result<()> {
        let handler = load(json!({
            "stream": "stderr",
            "formatter": {"class": "JsonFormatter"},
        }))?;
        let formatted = handler
            .formatter()
            .format(&LogRecord::new("app", LogLevel::Info, "msg"))?;
        assert!(formatted.starts_with('{'));
        Ok(())
    }
}
