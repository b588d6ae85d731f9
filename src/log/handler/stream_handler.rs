use crate::log::handler::{HandlerCore, LogHandler};
use crate::log::level::LogLevel;
use crate::log::record::LogRecord;
use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

enum Stream {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

/// 流输出处理器
///
/// `stream` 为 `stdout`、`stderr` 或文件路径，文件以追加方式打开，父目录不存在时自动创建
pub struct StreamHandler {
    core: HandlerCore,
    url: String,
    stream: Stream,
}

impl StreamHandler {
    pub fn new(stream: &str, level: LogLevel, bubble: bool, file_permission: Option<u32>) -> Result<Self> {
        let target = match stream {
            "stdout" => Stream::Stdout,
            "stderr" => Stream::Stderr,
            path => Stream::File(Mutex::new(open_append(Path::new(path), file_permission)?)),
        };

        Ok(Self {
            core: HandlerCore::new(level, bubble),
            url: stream.to_string(),
            stream: target,
        })
    }

    pub fn stdout() -> Self {
        Self {
            core: HandlerCore::default(),
            url: "stdout".to_string(),
            stream: Stream::Stdout,
        }
    }

    pub fn stderr() -> Self {
        Self {
            core: HandlerCore::default(),
            url: "stderr".to_string(),
            stream: Stream::Stderr,
        }
    }

    /// 输出目标
    pub fn url(&self) -> &str {
        &self.url
    }
}

pub(crate) fn open_append(path: &Path, file_permission: Option<u32>) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    #[cfg(unix)]
    if let Some(mode) = file_permission {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = file_permission;

    Ok(file)
}

impl LogHandler for StreamHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn write(&self, _record: &LogRecord, formatted: &str) -> Result<()> {
        match &self.stream {
            Stream::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(formatted.as_bytes())?;
                out.flush()?;
            }
            Stream::Stderr => {
                let mut out = std::io::stderr().lock();
                out.write_all(formatted.as_bytes())?;
                out.flush()?;
            }
            Stream::File(file) => {
                let mut file = file.lock().unwrap_or_else(PoisonError::into_inner);
                file.write_all(formatted.as_bytes())?;
                file.flush()?;
            }
        }
        Ok(())
    }
}
