/// Writes the analysis report, JSON evidence, and parser-ready SQL to disk.
pub mod formatter;
/// Plain-text detector summaries and the markdown analysis report.
pub mod report;
