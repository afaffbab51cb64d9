pub mod theme;
pub mod format;
pub mod charts;
pub mod page;
