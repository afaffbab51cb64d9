pub mod error;
pub mod time_window;
