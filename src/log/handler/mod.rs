mod core;
mod filter_handler;
mod group_handler;
mod loggly_handler;
mod null_handler;
mod registry;
mod rotating_file_handler;
mod stream_handler;
mod test_handler;

pub use core::{HandlerCore, LogHandler};
pub use filter_handler::{AcceptedLevels, FilterHandler};
pub use group_handler::GroupHandler;
pub use loggly_handler::LogglyHandler;
pub use null_handler::NullHandler;
pub use registry::{handler_descriptors, register_handlers};
pub use rotating_file_handler::RotatingFileHandler;
pub use stream_handler::StreamHandler;
pub use test_handler::TestHandler;
