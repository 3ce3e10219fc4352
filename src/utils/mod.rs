pub mod environment;
pub mod terminal;

pub use environment::{get_config_dir, get_data_dir, get_default_export_dir, get_log_dir};
pub use terminal::{sanitize_for_display, strip_ansi_codes};
