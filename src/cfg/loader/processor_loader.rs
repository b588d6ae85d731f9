use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::cfg::class_loader::{ClassLoader, ExtraOptionHandlers};
use crate::cfg::options::OptionsMap;
use crate::cfg::registry::DEFAULT_OBJECT_CLASS;
use crate::error::{CascadeError, Result};
use crate::log::processor::LogProcessor;

static EXTRA_OPTION_HANDLERS: Lazy<Arc<ExtraOptionHandlers>> =
    Lazy::new(|| Arc::new(ExtraOptionHandlers::new()));

/// Processor 加载器，没有专用默认 class
pub struct ProcessorLoader {
    loader: ClassLoader,
}

impl ProcessorLoader {
    pub fn new(options: OptionsMap) -> Result<Self> {
        let loader = ClassLoader::with_default_class(
            options,
            DEFAULT_OBJECT_CLASS,
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

    pub fn load(self) -> Result<Arc<dyn LogProcessor>> {
        let class = self.loader.class().to_string();
        self.loader
            .load()?
            .into_processor()
            .ok_or(CascadeError::UnexpectedKind {
                class,
                expected: "processor",
            })
    }
}
