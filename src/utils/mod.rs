pub mod actions;
pub mod deps;
pub mod disk_space;
pub mod humanize;
pub mod interrupt;
pub mod logger;

pub use actions::{PostRunActions, SystemActions};
pub use deps::check_tool;
pub use disk_space::has_enough_space;
pub use humanize::{format_duration, format_file_size};
pub use interrupt::cancel_on_interrupt;
pub use logger::init_logging;
