//! UI Theme
//!
//! Colors, icons and column widths shared by every command's output.

use crossterm::style::Color;

/// Default theme for reap output
#[derive(Debug, Clone)]
pub struct Theme {
    /// Colors for different UI elements
    pub colors: ColorScheme,
    /// Status icons
    pub icons: Icons,
    /// Column widths
    pub layout: Layout,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            colors: ColorScheme::default(),
            icons: Icons::default(),
            layout: Layout::default(),
        }
    }
}

/// Color scheme for UI elements
#[derive(Debug, Clone)]
pub struct ColorScheme {
    /// Company ids
    pub company: Color,
    /// Counts, cutoffs and other secondary info
    pub secondary: Color,
    /// Headers and labels
    pub header: Color,
    /// Success states
    pub success: Color,
    /// Warning states
    pub warning: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            company: Color::Cyan,
            secondary: Color::DarkGrey,
            header: Color::DarkGrey,
            success: Color::Green,
            warning: Color::Yellow,
        }
    }
}

/// Status icons
#[derive(Debug, Clone)]
pub struct Icons {
    /// Bucket fully removed (✓)
    pub success: &'static str,
    /// Bucket only partially removed (⚠)
    pub warning: &'static str,
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            success: "✓",
            warning: "⚠",
        }
    }
}

/// Column widths
#[derive(Debug, Clone)]
pub struct Layout {
    /// Width allocated for the company column
    pub company_width: usize,
    /// Width allocated for the retention days column
    pub days_width: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            company_width: 24,
            days_width: 6,
        }
    }
}

/// Format a count with the matching noun form.
pub fn plural(count: u64, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

/// Format an elapsed duration the way the summary line shows it.
pub fn format_elapsed(elapsed: std::time::Duration) -> String {
    let ms = elapsed.as_millis();
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}
