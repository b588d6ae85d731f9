mod core;
mod process_id_processor;
mod psr_log_message_processor;
mod registry;
mod tag_processor;
mod uid_processor;

pub use core::LogProcessor;
pub use process_id_processor::ProcessIdProcessor;
pub use psr_log_message_processor::PsrLogMessageProcessor;
pub use registry::{processor_descriptors, register_processors};
pub use tag_processor::TagProcessor;
pub use uid_processor::UidProcessor;
