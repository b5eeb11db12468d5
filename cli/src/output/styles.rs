//! Stylesheet for check verdicts and report sections

use owo_colors::Style;

/// Colors used by the terminal renderers. `Default` is fully plain.
#[derive(Default, Clone)]
pub struct Styles {
    /// Check that behaved as expected
    pub pass: Style,
    /// Check that did not
    pub fail: Style,
    /// Skipped stages and kept workspaces
    pub warning: Style,
    /// In-progress stage
    pub step: Style,
    /// Attempt counts, elapsed times, report keys
    pub dim: Style,
    pub emphasis: Style,
    pub heading: Style,
}

impl Styles {
    /// The colored stylesheet used on a TTY.
    #[must_use]
    pub fn colored() -> Self {
        Self {
            pass: Style::new().green(),
            fail: Style::new().red().bold(),
            warning: Style::new().yellow(),
            step: Style::new().cyan(),
            dim: Style::new().dimmed(),
            emphasis: Style::new().bold(),
            heading: Style::new().bold().underline(),
        }
    }
}
