//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use crate::models::Photo;

/// Trait for human-readable key-value output.
///
/// Implemented by entity types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for Photo {
    fn pretty_print(&self) -> String {
        let header = format!("Photo {}", self.id);
        let divider = "─".repeat(header.len().max(30));

        let mut lines = vec![
            header,
            divider,
            format!("Title:          {}", self.title),
            format!("Owner:          {} ({})", self.owner_name, self.owner),
        ];

        if let Some(ref taken) = self.date_taken {
            lines.push(format!("Taken:          {}", taken.format("%Y-%m-%d %H:%M:%S UTC")));
        }

        lines.push(format!("Description:    {}", self.description));
        lines.push(format!("Image:          {}", self.image_url()));

        let visibility = match (self.ispublic, self.isfriend, self.isfamily) {
            (true, _, _) => "public",
            (false, true, true) => "friends and family",
            (false, true, false) => "friends",
            (false, false, true) => "family",
            (false, false, false) => "private",
        };
        lines.push(format!("Visibility:     {}", visibility));

        lines.join("\n")
    }
}
