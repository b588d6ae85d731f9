use crate::log::formatter::LogFormatter;
use crate::log::record::LogRecord;
use anyhow::Result;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// 默认的单行格式
pub const SIMPLE_FORMAT: &str = "[%datetime%] %channel%.%level_name%: %message% %context% %extra%\n";

/// 默认的时间格式（chrono strftime 语法）
pub const SIMPLE_DATE: &str = "%Y-%m-%d %H:%M:%S";

/// 单行文本格式化器
///
/// 支持的占位符：`%datetime%` `%channel%` `%level_name%` `%level%` `%message%`
/// `%context%` `%extra%`，以及引用单个键的 `%context.key%` / `%extra.key%`。
/// 被单独引用的键不会再出现在 `%context%` / `%extra%` 中。
pub struct LineFormatter {
    format: String,
    date_format: String,
    allow_inline_line_breaks: bool,
    ignore_empty_context_and_extra: bool,
    include_stacktraces: bool,
}

impl LineFormatter {
    pub fn new(
        format: Option<String>,
        date_format: Option<String>,
        allow_inline_line_breaks: bool,
        ignore_empty_context_and_extra: bool,
    ) -> Self {
        Self {
            format: format.unwrap_or_else(|| SIMPLE_FORMAT.to_string()),
            date_format: date_format.unwrap_or_else(|| SIMPLE_DATE.to_string()),
            allow_inline_line_breaks,
            ignore_empty_context_and_extra,
            include_stacktraces: false,
        }
    }

    /// 是否输出 exception 的调用栈
    ///
    /// 打开后同时允许多行输出
    pub fn include_stacktraces(&mut self, include: bool) {
        self.include_stacktraces = include;
        if include {
            self.allow_inline_line_breaks = true;
        }
    }

    pub fn allow_inline_line_breaks(&mut self, allow: bool) {
        self.allow_inline_line_breaks = allow;
    }

    pub fn ignore_empty_context_and_extra(&mut self, ignore: bool) {
        self.ignore_empty_context_and_extra = ignore;
    }

    pub fn format_string(&self) -> &str {
        &self.format
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn is_including_stacktraces(&self) -> bool {
        self.include_stacktraces
    }

    pub fn is_allowing_inline_line_breaks(&self) -> bool {
        self.allow_inline_line_breaks
    }

    fn replace_newlines(&self, text: &str) -> String {
        if self.allow_inline_line_breaks {
            return text.to_string();
        }
        text.replace("\r\n", " ").replace(['\r', '\n'], " ")
    }

    fn stringify(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::String(s) => self.replace_newlines(s),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(items) if items.is_empty() => "[]".to_string(),
            other => self.replace_newlines(&other.to_string()),
        }
    }

    fn stringify_map(&self, map: &Map<String, Value>) -> String {
        if map.is_empty() {
            return "[]".to_string();
        }

        let mut normalized = Map::with_capacity(map.len());
        for (key, value) in map {
            if key == "exception" {
                normalized.insert(key.clone(), Value::String(self.render_exception(value)));
            } else {
                normalized.insert(key.clone(), value.clone());
            }
        }
        self.replace_newlines(&Value::Object(normalized).to_string())
    }

    /// exception 约定为 `{"class", "message", "code", "file", "trace"}` 形式的对象
    fn render_exception(&self, value: &Value) -> String {
        let Some(exception) = value.as_object() else {
            return self.stringify(value);
        };

        let field = |name: &str| exception.get(name).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });

        let mut rendered = format!(
            "[object] ({}(code: {}): {}",
            field("class").unwrap_or_else(|| "Error".to_string()),
            field("code").unwrap_or_else(|| "0".to_string()),
            field("message").unwrap_or_default(),
        );
        if let Some(file) = field("file") {
            rendered.push_str(" at ");
            rendered.push_str(&file);
        }
        rendered.push(')');

        if self.include_stacktraces {
            if let Some(trace) = field("trace") {
                rendered.push_str("\n[stacktrace]\n");
                rendered.push_str(&trace);
                rendered.push('\n');
            }
        }

        rendered
    }
}

impl Default for LineFormatter {
    fn default() -> Self {
        Self::new(None, None, false, false)
    }
}

/// 扫描模板中的 `%name%` 占位符
fn placeholders(template: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('%') {
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(end) if is_placeholder_name(&after[..end]) => {
                found.push(&after[..end]);
                rest = &after[end + 1..];
            }
            _ => rest = after,
        }
    }
    found
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
}

/// 单遍替换，避免消息内容里的 `%xxx%` 被二次展开
fn render<F>(template: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut output = String::with_capacity(template.len() + 64);
    let mut rest = template;
    while let Some(start) = rest.find('%') {
        output.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(end) if is_placeholder_name(&after[..end]) => match lookup(&after[..end]) {
                Some(value) => {
                    output.push_str(&value);
                    rest = &after[end + 1..];
                }
                None => {
                    output.push('%');
                    rest = after;
                }
            },
            _ => {
                output.push('%');
                rest = after;
            }
        }
    }
    output.push_str(rest);
    output
}

impl LogFormatter for LineFormatter {
    fn format(&self, record: &LogRecord) -> Result<String> {
        let mut inlined_context = HashSet::new();
        let mut inlined_extra = HashSet::new();
        for name in placeholders(&self.format) {
            if let Some(key) = name.strip_prefix("context.") {
                inlined_context.insert(key.to_string());
            } else if let Some(key) = name.strip_prefix("extra.") {
                inlined_extra.insert(key.to_string());
            }
        }

        let context: Map<String, Value> = record
            .context
            .iter()
            .filter(|(k, _)| !inlined_context.contains(*k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let extra: Map<String, Value> = record
            .extra
            .iter()
            .filter(|(k, _)| !inlined_extra.contains(*k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let mut output = render(&self.format, |name| match name {
            "datetime" => Some(record.datetime.format(&self.date_format).to_string()),
            "channel" => Some(record.channel.clone()),
            "level_name" => Some(record.level_name().to_string()),
            "level" => Some(record.level.code().to_string()),
            "message" => Some(self.replace_newlines(&record.message)),
            "context" if self.ignore_empty_context_and_extra && context.is_empty() => {
                Some(String::new())
            }
            "extra" if self.ignore_empty_context_and_extra && extra.is_empty() => {
                Some(String::new())
            }
            "context" => Some(self.stringify_map(&context)),
            "extra" => Some(self.stringify_map(&extra)),
            other => {
                if let Some(key) = other.strip_prefix("context.") {
                    Some(record.context.get(key).map(|v| self.stringify(v)).unwrap_or_default())
                } else if let Some(key) = other.strip_prefix("extra.") {
                    Some(record.extra.get(key).map(|v| self.stringify(v)).unwrap_or_default())
                } else {
                    None
                }
            }
        });

        if self.ignore_empty_context_and_extra {
            // 空占位会在行尾留下多余空格
            let newline = output.ends_with('\n');
            let trimmed = output.trim_end().len();
            output.truncate(trimmed);
            if newline {
                output.push('\n');
            }
        }

        Ok(output)
    }
}
