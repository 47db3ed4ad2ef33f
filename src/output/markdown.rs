//! Markdown summary generation
//!
//! This module generates a human-readable markdown report of a run,
//! including graph statistics, the degree sample and the top-ranked pages.

use crate::output::stats::format_duration;
use crate::output::{GraphSource, OutputError, OutputResult, RunSummary};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary of a run to `output_path`
///
/// # Arguments
///
/// * `summary` - The run summary data
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_summary(summary: &RunSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let write_err = |source| OutputError::Write {
        path: output_path.display().to_string(),
        source,
    };
    let mut file = File::create(output_path).map_err(write_err)?;
    file.write_all(markdown.as_bytes()).map_err(write_err)?;

    Ok(())
}

/// Formats a run summary as markdown
pub fn format_markdown_summary(summary: &RunSummary) -> String {
    let mut md = String::new();

    md.push_str("# Sitegraph Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Root**: {}\n", summary.root_url));
    if let Some(run_id) = summary.run_id {
        md.push_str(&format!("- **Run ID**: {}\n", run_id));
    }
    let source = match summary.source {
        GraphSource::Crawl => "fresh crawl",
        GraphSource::Loaded => "saved graph",
    };
    md.push_str(&format!("- **Source**: {}\n", source));
    if !summary.config_hash.is_empty() {
        md.push_str(&format!("- **Config Hash**: {}\n", summary.config_hash));
    }
    md.push('\n');

    md.push_str("## Graph Statistics\n\n");
    md.push_str(&format!("- **Nodes**: {}\n", summary.analysis.node_count));
    md.push_str(&format!("- **Edges**: {}\n", summary.analysis.edge_count));
    md.push_str(&format!(
        "- **Errored Pages**: {} ({:.2}%)\n",
        summary.analysis.errored_nodes,
        summary.error_rate()
    ));
    md.push_str(&format!(
        "- **Pages Without Out-links**: {}\n\n",
        summary.analysis.dangling_nodes
    ));

    md.push_str("## Timings\n\n");
    md.push_str("| Phase | Time |\n");
    md.push_str("|-------|------|\n");
    md.push_str(&format!("| Graph | {} |\n", format_duration(summary.timings.graph)));
    md.push_str(&format!("| Rank | {} |\n", format_duration(summary.timings.rank)));
    md.push_str(&format!(
        "| Analyze | {} |\n\n",
        format_duration(summary.timings.analyze)
    ));

    if !summary.top_ranks.is_empty() {
        md.push_str("## Top Pages\n\n");
        md.push_str("| Rank | URL |\n");
        md.push_str("|------|-----|\n");
        for (url, rank) in &summary.top_ranks {
            md.push_str(&format!("| {:.6} | {} |\n", rank, url));
        }
        md.push('\n');
    }

    if !summary.analysis.degree_sample.is_empty() {
        md.push_str("## Degree Sample\n\n");
        md.push_str("| Degree | URL |\n");
        md.push_str("|--------|-----|\n");
        for (url, degree) in &summary.analysis.degree_sample {
            md.push_str(&format!("| {} | {} |\n", degree, url));
        }
        md.push('\n');
    }

    md
}
