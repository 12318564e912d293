//! Statistics report over crawled URLs
//!
//! This module renders the aggregate [`Stats`] computed by the URL store.

use crate::output::{emit, OutputFormat, OutputResult};
use crate::storage::Stats;

/// Prints statistics to stdout as text or JSON
pub fn print_stats(stats: &Stats, format: OutputFormat) -> OutputResult<()> {
    emit(format, stats, format_stats)
}

/// Formats statistics as a human-readable report
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn format_stats(stats: &Stats) -> String {
    let mut out = String::new();

    out.push_str("=== Crawl Statistics ===\n\n");

    out.push_str("Overview:\n");
    out.push_str(&format!(
        "  Total crawled URLs: {}\n",
        stats.total_crawled_urls
    ));
    out.push_str(&format!(
        "  Errors during crawling: {} ({:.1}%)\n",
        stats.total_errors_during_crawling,
        percentage(stats.total_errors_during_crawling, stats.total_crawled_urls)
    ));
    out.push('\n');

    if !stats.status_code_stats.is_empty() {
        out.push_str("URLs by Status Code:\n");
        for (status, count) in &stats.status_code_stats {
            out.push_str(&format!(
                "  {}: {} ({:.1}%)\n",
                status,
                count,
                percentage(*count, stats.total_crawled_urls)
            ));
        }
        out.push('\n');
    }

    if !stats.domain_stats.is_empty() {
        out.push_str(&format!("Domains ({}):\n", stats.domain_stats.len()));
        for domain in &stats.domain_stats {
            let name = if domain.domain.is_empty() {
                "(unknown)"
            } else {
                domain.domain.as_str()
            };
            out.push_str(&format!("  {}: {}\n", name, domain.total_crawled_urls));
        }
    }

    out
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}
