use thiserror::Error;

/// 配置过程中的统一错误类型
///
/// 所有错误都是同步、致命的：当前这一次配置直接失败，不做重试。
/// 错误信息带上 class、option 或引用 id，方便定位出错的配置项。
#[derive(Error, Debug)]
pub enum CascadeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("class '{0}' not found")]
    ClassNotFound(String),

    #[error("missing required option '{option}' for class '{class}'")]
    MissingRequiredOption { class: String, option: String },

    #[error("unknown constructor option '{option}' for class '{class}'")]
    UnknownOption { class: String, option: String },

    #[error("option '{option}' is not defined for class '{class}' (no setter, field or custom handler)")]
    UndefinedOption { class: String, option: String },

    #[error("cannot add {kind} \"{id}\" to {owner}: {kind} not found")]
    ReferenceNotFound {
        kind: &'static str,
        id: String,
        owner: String,
    },

    #[error("cannot configure loggers: no logger configuration options provided")]
    MissingLoggersSection,

    #[error("unable to read \"{path}\"")]
    UnreadableResource {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("class '{class}' does not build a {expected}")]
    UnexpectedKind { class: String, expected: &'static str },

    #[error("failed to construct '{class}'")]
    Construction {
        class: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid value for option '{option}' of class '{class}'")]
    InvalidOption {
        class: String,
        option: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to parse {format} configuration: {message}")]
    Parse { format: &'static str, message: String },
}

pub type Result<T> = std::result::Result<T, CascadeError>;
