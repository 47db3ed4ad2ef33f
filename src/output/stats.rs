//! Console summary of a run
//!
//! This module prints the counts, timings and top-ranked pages of a run to
//! stdout.

use crate::output::{GraphSource, RunSummary};
use std::time::Duration;

/// Prints a run summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The summary to display
pub fn print_summary(summary: &RunSummary) {
    println!("=== Sitegraph Summary ===\n");

    println!("Run:");
    println!("  Root: {}", summary.root_url);
    if let Some(run_id) = summary.run_id {
        println!("  Run ID: {}", run_id);
    }
    let source = match summary.source {
        GraphSource::Crawl => "fresh crawl",
        GraphSource::Loaded => "saved graph",
    };
    println!("  Source: {}", source);
    println!();

    println!("Graph:");
    println!("  Nodes: {}", summary.analysis.node_count);
    println!("  Edges: {}", summary.analysis.edge_count);
    println!(
        "  Errored pages: {} ({:.1}%)",
        summary.analysis.errored_nodes,
        summary.error_rate()
    );
    println!("  Pages without out-links: {}", summary.analysis.dangling_nodes);
    println!();

    if !summary.analysis.degree_sample.is_empty() {
        println!("Degree sample:");
        for (url, degree) in &summary.analysis.degree_sample {
            println!("  {:>4}  {}", degree, url);
        }
        println!();
    }

    if !summary.top_ranks.is_empty() {
        println!(
            "Top pages ({} of {} ranked):",
            summary.top_ranks.len(),
            summary.ranked_pages
        );
        for (url, rank) in &summary.top_ranks {
            println!("  {:.6}  {}", rank, url);
        }
        println!();
    }

    println!("Timings:");
    let graph_label = match summary.source {
        GraphSource::Crawl => "Concurrent time",
        GraphSource::Loaded => "Load time",
    };
    println!("  {}: {}", graph_label, format_duration(summary.timings.graph));
    println!("  Page rank time: {}", format_duration(summary.timings.rank));
    println!(
        "  Analyze graph time: {}",
        format_duration(summary.timings.analyze)
    );
}

/// Formats a duration as seconds with millisecond precision
pub fn format_duration(duration: Duration) -> String {
    format!("{:.3}s", duration.as_secs_f64())
}
