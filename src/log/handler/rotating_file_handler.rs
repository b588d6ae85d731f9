use crate::log::handler::stream_handler::open_append;
use crate::log::handler::{HandlerCore, LogHandler};
use crate::log::level::LogLevel;
use crate::log::record::LogRecord;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

pub const DEFAULT_FILENAME_FORMAT: &str = "{filename}-{date}";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

struct CurrentFile {
    path: PathBuf,
    file: File,
}

/// 按日期切分的文件处理器
///
/// `app.log` 实际写入 `app-2024-01-02.log`，日期变化时切换文件，
/// `max_files` 大于 0 时只保留最新的若干个文件
pub struct RotatingFileHandler {
    core: HandlerCore,
    filename: PathBuf,
    max_files: usize,
    file_permission: Option<u32>,
    filename_format: String,
    date_format: String,
    current: Mutex<Option<CurrentFile>>,
}

impl RotatingFileHandler {
    pub fn new(
        filename: &str,
        max_files: usize,
        level: LogLevel,
        bubble: bool,
        file_permission: Option<u32>,
    ) -> Self {
        Self {
            core: HandlerCore::new(level, bubble),
            filename: PathBuf::from(filename),
            max_files,
            file_permission,
            filename_format: DEFAULT_FILENAME_FORMAT.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            current: Mutex::new(None),
        }
    }

    /// 设置文件名模板，模板中必须包含 `{date}`
    pub fn set_filename_format(&mut self, filename_format: &str, date_format: &str) -> Result<()> {
        if !filename_format.contains("{date}") {
            anyhow::bail!("filename format must contain {{date}}, got \"{}\"", filename_format);
        }
        self.filename_format = filename_format.to_string();
        self.date_format = date_format.to_string();
        *self.current.get_mut().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    /// 指定时间对应的文件
    pub fn timed_filename(&self, now: DateTime<Local>) -> PathBuf {
        self.filename_for(&now.format(&self.date_format).to_string(), false)
    }

    fn filename_for(&self, date: &str, escape: bool) -> PathBuf {
        let stem = self
            .filename
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = if escape { glob::Pattern::escape(&stem) } else { stem };

        let mut name = self
            .filename_format
            .replace("{filename}", &stem)
            .replace("{date}", date);
        if let Some(extension) = self.filename.extension() {
            name.push('.');
            name.push_str(&extension.to_string_lossy());
        }

        let dir = self.filename.parent().unwrap_or_else(|| Path::new(""));
        if escape {
            PathBuf::from(glob::Pattern::escape(&dir.to_string_lossy())).join(name)
        } else {
            dir.join(name)
        }
    }

    /// 删除超出保留数量的旧文件
    fn rotate(&self) -> Result<()> {
        if self.max_files == 0 {
            return Ok(());
        }

        let pattern = self.filename_for("*", true);
        let pattern = pattern.to_string_lossy();
        let mut files: Vec<PathBuf> = glob::glob(&pattern)
            .with_context(|| format!("invalid rotation pattern {}", pattern))?
            .filter_map(|entry| entry.ok())
            .collect();

        // 日期格式保证字典序即时间序
        files.sort();
        files.reverse();
        for stale in files.into_iter().skip(self.max_files) {
            if let Err(err) = std::fs::remove_file(&stale) {
                log::debug!("failed to remove rotated file {}: {}", stale.display(), err);
            }
        }
        Ok(())
    }
}

impl LogHandler for RotatingFileHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn write(&self, _record: &LogRecord, formatted: &str) -> Result<()> {
        let path = self.timed_filename(Local::now());
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);

        if current.as_ref().map(|c| &c.path) != Some(&path) {
            let file = open_append(&path, self.file_permission)?;
            *current = Some(CurrentFile { path, file });
            self.rotate()?;
        }

        if let Some(current) = current.as_mut() {
            current.file.write_all(formatted.as_bytes())?;
            current.file.flush()?;
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rotating_file_handler_timed_filename() {
        let handler = RotatingFileHandler::new("/var/log/app.log", 0, LogLevel::Debug, true, None);
        let now = Local::now();

        let expected = format!("/var/log/app-{}.log", now.format("%Y-%m-%d"));
        assert_eq!(handler.timed_filename(now), PathBuf::from(expected));
    }

    #[test]
    fn test_rotating_file_handler_write() -> Result<()> {
        let dir = TempDir::new()?;
        let filename = dir.path().join("app.log");
        let handler = RotatingFileHandler::new(filename.to_str().unwrap(), 0, LogLevel::Debug, true, None);

        handler.handle(&LogRecord::new("app", LogLevel::Info, "rotated message"))?;

        let contents = std::fs::read_to_string(handler.timed_filename(Local::now()))?;
        assert!(contents.contains("rotated message"));
        Ok(())
    }

    #[test]
    fn test_rotating_file_handler_max_files() -> Result<()> {
        let dir = TempDir::new()?;
        for date in ["2001-01-01", "2001-01-02", "2001-01-03"] {
            std::fs::write(dir.path().join(format!("app-{}.log", date)), "old\n")?;
        }
        std::fs::write(dir.path().join("other.log"), "unrelated\n")?;

        let filename = dir.path().join("app.log");
        let handler = RotatingFileHandler::new(filename.to_str().unwrap(), 2, LogLevel::Debug, true, None);
        handler.handle(&LogRecord::new("app", LogLevel::Info, "today"))?;

        assert!(handler.timed_filename(Local::now()).exists());
        assert!(dir.path().join("app-2001-01-03.log").exists());
        assert!(!dir.path().join("app-2001-01-02.log").exists());
        assert!(!dir.path().join("app-2001-01-01.log").exists());
        assert!(dir.path().join("other.log").exists());
        Ok(())
    }

    #[test]
    fn test_rotating_file_handler_filename_format() -> Result<()> {
        let mut handler = RotatingFileHandler::new("logs/app.log", 0, LogLevel::Debug, true, None);
        assert!(handler.set_filename_format("{filename}", "%Y").is_err());

        handler.set_filename_format("{date}_{filename}", "%Y")?;
        let now = Local::now();
        assert_eq!(
            handler.timed_filename(now),
            PathBuf::from(format!("logs/{}_app.log", now.format("%Y")))
        );
        Ok(())
    }
}
