// 配置来源：文件、字符串或已经解析好的结构

use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

use crate::cfg::options::{options_from_json, OptionsMap};
use crate::error::{CascadeError, Result};

/// 配置文档格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Json5,
    Yaml,
    Toml,
}

impl Format {
    /// 按扩展名识别，未知扩展名返回 None
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Format::Json),
            "json5" => Some(Format::Json5),
            "yml" | "yaml" => Some(Format::Yaml),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }

    /// 字符串内容以 `{` 或 `[` 开头视为 JSON，其余按 YAML 解析
    pub fn detect(text: &str) -> Self {
        match text.trim_start().chars().next() {
            Some('{') | Some('[') => Format::Json,
            _ => Format::Yaml,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Json5 => "json5",
            Format::Yaml => "yaml",
            Format::Toml => "toml",
        }
    }

    /// 空白文档解析为 null
    pub fn parse(&self, text: &str) -> Result<JsonValue> {
        if text.trim().is_empty() {
            return Ok(JsonValue::Null);
        }
        let parsed = match self {
            Format::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            Format::Json5 => json5::from_str(text).map_err(|e| e.to_string()),
            Format::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
            Format::Toml => toml::from_str(text).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| CascadeError::Parse {
            format: self.name(),
            message,
        })
    }
}

/// 配置资源
#[derive(Debug, Clone)]
pub enum Resource {
    /// 配置文件路径，格式由扩展名决定
    Path(PathBuf),
    /// JSON 或 YAML 文本
    Text(String),
    /// 已经解析好的配置
    Options(JsonValue),
}

impl Resource {
    /// 不含换行且指向已存在文件的字符串视为路径，否则视为文本
    pub fn detect(input: &str) -> Self {
        if !input.contains('\n') && !input.trim().is_empty() && Path::new(input).is_file() {
            Resource::Path(PathBuf::from(input))
        } else {
            Resource::Text(input.to_string())
        }
    }
}

impl From<&str> for Resource {
    fn from(input: &str) -> Self {
        Resource::detect(input)
    }
}

impl From<String> for Resource {
    fn from(input: String) -> Self {
        Resource::detect(&input)
    }
}

impl From<&Path> for Resource {
    fn from(path: &Path) -> Self {
        Resource::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for Resource {
    fn from(path: PathBuf) -> Self {
        Resource::Path(path)
    }
}

impl From<JsonValue> for Resource {
    fn from(value: JsonValue) -> Self {
        Resource::Options(value)
    }
}

/// 把配置资源解析成选项表
///
/// # 示例
///
/// ```rust
/// use cascade::cfg::{ConfigLoader, Resource};
///
/// let options = ConfigLoader::new(Resource::Text("loggers:\n  app: {}\n".to_string())).load()?;
/// assert!(options.contains_key("loggers"));
/// # Ok::<(), cascade::CascadeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    resource: Resource,
}

impl ConfigLoader {
    pub fn new(resource: impl Into<Resource>) -> Self {
        Self {
            resource: resource.into(),
        }
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn load(&self) -> Result<OptionsMap> {
        let value = match &self.resource {
            Resource::Path(path) => Self::load_file(path)?,
            Resource::Text(text) => Format::detect(text).parse(text)?,
            Resource::Options(value) => value.clone(),
        };

        // 空文档等价于空配置
        match value {
            JsonValue::Null => Ok(OptionsMap::new()),
            value => options_from_json(value),
        }
    }

    fn load_file(path: &Path) -> Result<JsonValue> {
        let content =
            std::fs::read_to_string(path).map_err(|source| CascadeError::UnreadableResource {
                path: path.display().to_string(),
                source,
            })?;

        let format = Format::from_path(path).ok_or_else(|| {
            CascadeError::InvalidArgument(format!(
                "unsupported configuration file extension: \"{}\"",
                path.display()
            ))
        })?;

        log::debug!("load {} configuration from {}", format.name(), path.display());
        format.parse(&content)
    }
}
