use crate::cfg::{method_arg, register_class, DescriptorBuilder, OptionValue, TypeDescriptor};
use crate::log::handler::{
    AcceptedLevels, FilterHandler, GroupHandler, LogHandler, LogglyHandler, NullHandler,
    RotatingFileHandler, StreamHandler, TestHandler,
};
use crate::log::level::LogLevel;
use anyhow::Result;
use serde_json::Value;

/// 所有 handler 共有的 setter
fn with_bubble_setter<T: LogHandler + 'static>(builder: DescriptorBuilder<T>) -> DescriptorBuilder<T> {
    builder.method("set_bubble", |handler, args| {
        handler.core_mut().set_bubble(method_arg(&args, 0)?);
        Ok(())
    })
}

/// 按自身级别过滤的 handler 才有 set_level，组合 handler 的级别由子 handler 决定
fn with_core_setters<T: LogHandler + 'static>(builder: DescriptorBuilder<T>) -> DescriptorBuilder<T> {
    with_bubble_setter(builder).method("set_level", |handler, args| {
        handler.core_mut().set_level(method_arg(&args, 0)?);
        Ok(())
    })
}

/// 单个级别区间参数或级别列表
fn accepted_levels(min_level_or_list: &OptionValue, max_level: Option<&OptionValue>) -> Result<AcceptedLevels> {
    if let OptionValue::List(_) = min_level_or_list {
        return Ok(AcceptedLevels::List(min_level_or_list.as_type()?));
    }

    let max = match max_level {
        Some(value) => value.as_type()?,
        None => LogLevel::Emergency,
    };
    Ok(AcceptedLevels::Range(min_level_or_list.as_type()?, max))
}

/// 内置 Handler 的类型描述
pub fn handler_descriptors() -> Vec<TypeDescriptor> {
    vec![
        with_core_setters(TypeDescriptor::handler::<StreamHandler>("StreamHandler"))
            .param("stream")
            .param_default("level", "debug")
            .param_default("bubble", true)
            .param_default("file_permission", Value::Null)
            .constructor(|args| {
                StreamHandler::new(
                    &args.parse::<String>(0)?,
                    args.parse(1)?,
                    args.parse(2)?,
                    args.parse(3)?,
                )
            }),
        with_core_setters(TypeDescriptor::handler::<RotatingFileHandler>("RotatingFileHandler"))
            .param("filename")
            .param_default("max_files", 0)
            .param_default("level", "debug")
            .param_default("bubble", true)
            .param_default("file_permission", Value::Null)
            .method("set_filename_format", |handler, args| {
                handler.set_filename_format(
                    &method_arg::<String>(&args, 0)?,
                    &method_arg::<String>(&args, 1)?,
                )
            })
            .constructor(|args| {
                Ok(RotatingFileHandler::new(
                    &args.parse::<String>(0)?,
                    args.parse(1)?,
                    args.parse(2)?,
                    args.parse(3)?,
                    args.parse(4)?,
                ))
            }),
        with_bubble_setter(TypeDescriptor::handler::<GroupHandler>("GroupHandler"))
            .param("handlers")
            .param_default("bubble", true)
            .constructor(|mut args| {
                let handlers = args.take(0)?.into_handlers()?;
                Ok(GroupHandler::new(handlers, args.parse(1)?))
            }),
        with_bubble_setter(TypeDescriptor::handler::<FilterHandler>("FilterHandler"))
            .param("handler")
            .param_default("min_level_or_list", "debug")
            .param_default("max_level", "emergency")
            .param_default("bubble", true)
            .method("set_accepted_levels", |handler, args| {
                let min_level_or_list = args
                    .first()
                    .ok_or_else(|| anyhow::anyhow!("missing argument #0"))?;
                handler.set_accepted_levels(accepted_levels(min_level_or_list, args.get(1))?);
                Ok(())
            })
            .constructor(|mut args| {
                let handler = args.take(0)?.into_handler()?;
                let accepted = accepted_levels(&args.take(1)?, args.get(2))?;
                Ok(FilterHandler::new(handler, accepted, args.parse(3)?))
            }),
        with_core_setters(TypeDescriptor::handler::<NullHandler>("NullHandler"))
            .param_default("level", "debug")
            .constructor(|args| Ok(NullHandler::new(args.parse(0)?))),
        with_core_setters(TypeDescriptor::handler::<TestHandler>("TestHandler"))
            .param_default("level", "debug")
            .param_default("bubble", true)
            .constructor(|args| Ok(TestHandler::new(args.parse(0)?, args.parse(1)?))),
        with_core_setters(TypeDescriptor::handler::<LogglyHandler>("LogglyHandler"))
            .param("token")
            .param_default("level", "debug")
            .param_default("bubble", true)
            .param_default("endpoint", Value::Null)
            .method("add_tag", |handler, args| {
                let tags = (0..args.len())
                    .map(|index| method_arg(&args, index))
                    .collect::<Result<Vec<String>>>()?;
                handler.add_tag(tags);
                Ok(())
            })
            .constructor(|args| {
                LogglyHandler::new(
                    &args.parse::<String>(0)?,
                    args.parse(1)?,
                    args.parse(2)?,
                    args.parse(3)?,
                )
            }),
    ]
}

/// 注册所有 Handler 实现
pub fn register_handlers() {
    for descriptor in handler_descriptors() {
        register_class(descriptor);
    }
}
