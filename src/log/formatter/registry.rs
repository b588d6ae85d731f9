use crate::cfg::{register_class, TypeDescriptor};
use crate::log::formatter::{JsonFormatter, LineFormatter};
use serde_json::Value;

/// 内置 Formatter 的类型描述
///
/// 开关类选项都是构造参数，不再重复注册同名 setter（构造参数优先匹配，setter 永远不会被调用）。
/// LineFormatter 的 `include_stacktraces` 不是普通 setter，由 FormatterLoader 的自定义处理函数负责。
pub fn formatter_descriptors() -> Vec<TypeDescriptor> {
    vec![
        TypeDescriptor::formatter::<LineFormatter>("LineFormatter")
            .param_default("format", Value::Null)
            .param_default("date_format", Value::Null)
            .param_default("allow_inline_line_breaks", false)
            .param_default("ignore_empty_context_and_extra", false)
            .constructor(|args| {
                Ok(LineFormatter::new(
                    args.parse(0)?,
                    args.parse(1)?,
                    args.parse(2)?,
                    args.parse(3)?,
                ))
            }),
        TypeDescriptor::formatter::<JsonFormatter>("JsonFormatter")
            .param_default("append_newline", true)
            .constructor(|args| Ok(JsonFormatter::new(args.parse(0)?))),
    ]
}

/// 注册所有 Formatter 实现
pub fn register_formatters() {
    for descriptor in formatter_descriptors() {
        register_class(descriptor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::{descriptor, options_from_json, ClassLoader};
    use crate::log::level::LogLevel;
    use crate::log::record::LogRecord;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn test_register_formatters() {
        register_formatters();

        let line = descriptor("LineFormatter").unwrap();
        let names: Vec<&str> = line.params().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["format", "dateFormat", "allowInlineLineBreaks", "ignoreEmptyContextAndExtra"]
        );
        // 与构造参数同名的 setter 不可达
        for name in &names {
            assert!(!line.has_method(name), "{}", name);
        }
        assert!(!line.has_method("includeStacktraces"));

        let json = descriptor("JsonFormatter").unwrap();
        assert!(!json.has_method("appendNewline"));
    }

    #[test]
    fn test_switch_options_reach_constructor() -> Result<()> {
        let options = options_from_json(json!({
            "class": "LineFormatter",
            "format": "%message%|%context%",
            "allowInlineLineBreaks": true,
            "ignore_empty_context_and_extra": true,
        }))?;

        let formatter = ClassLoader::new(options)?.load()?.into_formatter().unwrap();
        let record = LogRecord::new("app", LogLevel::Info, "a\nb");
        assert_eq!(formatter.format(&record)?, "a\nb|");
        Ok(())
    }

    #[test]
    fn test_create_line_formatter() -> Result<()> {
        let options = options_from_json(json!({
            "class": "LineFormatter",
            "format": "%channel%|%message%",
        }))?;

        let formatter = ClassLoader::new(options)?.load()?.into_formatter().unwrap();
        let record = LogRecord::new("app", LogLevel::Info, "msg");
        assert_eq!(formatter.format(&record)?, "app|msg");

        Ok(())
    }

    #[test]
    fn test_create_json_formatter() -> Result<()> {
        let options = options_from_json(json!({
            "class": "JsonFormatter",
            "append_newline": false,
        }))?;

        let formatter = ClassLoader::new(options)?.load()?.into_formatter().unwrap();
        let formatted = formatter.format(&LogRecord::new("app", LogLevel::Info, "msg"))?;
        assert!(!formatted.ends_with('\n'));

        Ok(())
    }
}
