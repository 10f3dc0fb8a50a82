//! Tabular rendering of a dataset
//!
//! Read-only projections for reporting: a fixed-width text table
//! (`Display`) and CSV export. Both show timestamps as UTC dates.

use crate::query::dataset::PostDataset;
use crate::records::RenderedPost;
use std::io;

/// Column headers and widths of the text table
const COLUMNS: &[(&str, usize)] = &[
    ("Posted", 19),
    ("User", 18),
    ("Status", 12),
    ("Category", 14),
    ("Topic", 32),
    ("Text", 40),
];

impl PostDataset {
    /// Display views of every record, in sort order
    pub fn rendered(&self) -> Vec<RenderedPost<'_>> {
        self.iter().map(|post| post.render()).collect()
    }

    /// Write the dataset as CSV with a header row
    pub fn write_csv<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for view in self.rendered() {
            csv_writer.serialize(view)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

impl std::fmt::Display for PostDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return writeln!(f, "No posts");
        }

        let header: Vec<String> = COLUMNS
            .iter()
            .map(|(name, width)| format!("{:<width$}", name, width = *width))
            .collect();
        writeln!(f, "{}", header.join(" | ").trim_end())?;

        let total_width = COLUMNS.iter().map(|(_, w)| w + 3).sum::<usize>() - 3;
        writeln!(f, "{}", "-".repeat(total_width))?;

        for view in self.rendered() {
            let posted = match (&view.post_time, view.empty) {
                (Some(time), _) => time.clone(),
                (None, Some(true)) => "(no posts)".to_string(),
                (None, _) => "-".to_string(),
            };
            let cells = [
                posted.as_str(),
                view.username,
                view.member_status.unwrap_or("-"),
                view.category.unwrap_or("-"),
                view.topic.unwrap_or("-"),
                view.text.unwrap_or("-"),
            ];

            let row: Vec<String> = cells
                .iter()
                .zip(COLUMNS)
                .map(|(cell, (_, width))| format!("{:<width$}", clip(cell, *width), width = *width))
                .collect();
            writeln!(f, "{}", row.join(" | ").trim_end())?;
        }

        write!(f, "{} record(s)", self.len())
    }
}

/// Shorten to at most `width` characters, marking the cut with "..."
fn clip(s: &str, width: usize) -> String {
    let single_line = s.replace(['\n', '\r'], " ");
    if single_line.chars().count() <= width {
        return single_line;
    }
    let kept: String = single_line.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}
