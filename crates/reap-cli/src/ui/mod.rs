//! Terminal output

pub mod output;
pub mod summary;
pub mod theme;

pub use output::ConsoleReporter;
pub use theme::Theme;
