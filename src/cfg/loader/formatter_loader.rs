use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::cfg::class_loader::{ClassLoader, ExtraOptionHandlers};
use crate::cfg::options::OptionsMap;
use crate::error::{CascadeError, Result};
use crate::log::formatter::{LineFormatter, LogFormatter};

static EXTRA_OPTION_HANDLERS: Lazy<Arc<ExtraOptionHandlers>> = Lazy::new(|| {
    // include_stacktraces 同时打开多行输出，不是普通 setter
    Arc::new(ExtraOptionHandlers::new().with(
        FormatterLoader::DEFAULT_CLASS,
        "include_stacktraces",
        |target, value| {
            let include: bool = value.as_type()?;
            let class = target.class().to_string();
            target
                .downcast_mut::<LineFormatter>()
                .ok_or_else(|| anyhow::anyhow!("{} is not a LineFormatter", class))?
                .include_stacktraces(include);
            Ok(())
        },
    ))
});

/// Formatter 加载器，默认 class 为 LineFormatter
pub struct FormatterLoader {
    loader: ClassLoader,
}

impl FormatterLoader {
    pub const DEFAULT_CLASS: &'static str = "LineFormatter";

    pub fn new(options: OptionsMap) -> Result<Self> {
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

    pub fn load(self) -> Result<Arc<dyn LogFormatter>> {
        let class = self.loader.class().to_string();
        self.loader
            .load()?
            .into_formatter()
            .ok_or(CascadeError::UnexpectedKind {
                class,
                expected: "formatter",
            })
    }
}
