//! Common display utilities for CLI commands.

use colored::Colorize;
use snapgraph::{CleanupReport, ObjectVersion, Snapshot};

const MAX_DISPLAY_ITEMS: usize = 20;

/// One-line description of a snapshot.
pub fn snapshot_label(snapshot: &Snapshot) -> String {
    let label = format!(
        "{} {} ({}/{})",
        snapshot.snapshot_id.to_string().white().bold(),
        snapshot.app_short_name,
        snapshot.snapshot_name,
        snapshot.branch_name
    );

    if snapshot.is_toolkit {
        format!("{label} {}", "[toolkit]".cyan())
    } else {
        label
    }
}

/// One-line description of an object version.
pub fn object_label(version: &ObjectVersion) -> String {
    let kind = match &version.subtype {
        Some(subtype) => format!("{}/{subtype}", version.object_type),
        None => version.object_type.clone(),
    };

    format!(
        "{} {} {}",
        version.object_version_id.to_string().white().bold(),
        version.name,
        format!("[{kind}]").dimmed()
    )
}

/// Print labels as a bulleted list, truncated after `MAX_DISPLAY_ITEMS`.
///
/// If `labels` is empty, prints `empty_message` instead.
pub fn print_list(labels: &[String], empty_message: &str) {
    if labels.is_empty() {
        println!("    {}", empty_message.dimmed());
        return;
    }

    for label in labels.iter().take(MAX_DISPLAY_ITEMS) {
        println!("    {} {label}", "•".dimmed());
    }

    if labels.len() > MAX_DISPLAY_ITEMS {
        println!(
            "    {} ... and {} more",
            "•".dimmed(),
            labels.len() - MAX_DISPLAY_ITEMS
        );
    }
}

/// Print a list of snapshots.
pub fn print_snapshots(snapshots: &[Snapshot], empty_message: &str) {
    let labels: Vec<String> = snapshots.iter().map(snapshot_label).collect();
    print_list(&labels, empty_message);
}

/// Print a list of object versions.
pub fn print_object_versions(versions: &[ObjectVersion], empty_message: &str) {
    let labels: Vec<String> = versions.iter().map(object_label).collect();
    print_list(&labels, empty_message);
}

/// Print per-relation counts of a cleanup run.
pub fn print_cleanup(report: &CleanupReport) {
    let rows = [
        ("Memberships", report.memberships),
        ("Object versions", report.object_versions),
        ("Object dependencies", report.object_dependencies),
        ("Snapshot dependencies", report.snapshot_dependencies),
        ("Toolkit snapshots", report.snapshots),
    ];

    for (name, count) in rows {
        let count = if count == 0 {
            count.to_string().dimmed()
        } else {
            count.to_string().yellow()
        };
        println!("    {}: {count}", name.dimmed());
    }
}

#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
