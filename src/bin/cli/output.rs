//! Output formatting for CLI operations.

use serde_json::{Value, json};
use resvfs::{DirEntry, FileType, NodeId, RefreshSummary, TreeCache};

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats a mirrored tree
    fn format_tree(&self, tree: &TreeCache, summary: &RefreshSummary) -> String;

    /// Formats a directory listing
    fn format_listing(&self, entries: &[DirEntry]) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_tree(&self, tree: &TreeCache, summary: &RefreshSummary) -> String {
        let mut output = String::new();
        let mut file_count = 0;
        let mut dir_count = 0;

        for (depth, id) in tree.walk(tree.root()) {
            let node = &tree[id];
            if depth > 0 {
                if node.is_dir() {
                    dir_count += 1;
                } else {
                    file_count += 1;
                }
            }

            output.push_str(&"  ".repeat(depth));
            output.push_str(node.name());
            if node.is_dir() && depth > 0 {
                output.push('/');
            }
            if node.file_type() != FileType::None {
                output.push_str(&format!(" [{}]", node.file_type()));
            }
            output.push('\n');
        }

        output.push_str(&"-".repeat(40));
        output.push('\n');
        output.push_str(&format!(
            "{} files, {} directories\n",
            file_count, dir_count
        ));

        if !summary.failures.is_empty() {
            output.push_str("\nIncomplete:\n");
            for (path, error) in &summary.failures {
                output.push_str(&format!("  {}: {}\n", path, error));
            }
        }

        output
    }

    fn format_listing(&self, entries: &[DirEntry]) -> String {
        let mut output = String::new();

        output.push_str(&format!("{:<8} {:<14} {}\n", "Kind", "Type", "Path"));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        for entry in entries {
            let file_type = entry.storage().file_type();
            let type_str = if file_type == FileType::None {
                "-"
            } else {
                file_type.label()
            };
            output.push_str(&format!(
                "{:<8} {:<14} {}\n",
                entry.kind().label(),
                type_str,
                entry.storage().path()
            ));
        }

        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!("{} entries\n", entries.len()));

        output
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl JsonFormatter {
    fn node_to_json(tree: &TreeCache, id: NodeId) -> Value {
        let node = &tree[id];
        let children: Vec<_> = node
            .children()
            .iter()
            .map(|&child| Self::node_to_json(tree, child))
            .collect();

        json!({
            "name": node.name(),
            "path": node.storage().path().as_str(),
            "kind": node.kind().label(),
            "file_type": node.file_type().label(),
            "children": children,
        })
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_tree(&self, tree: &TreeCache, summary: &RefreshSummary) -> String {
        let obj = json!({
            "root": Self::node_to_json(tree, tree.root()),
            "complete": summary.is_complete(),
            "failures": summary
                .failures
                .iter()
                .map(|(p, e)| json!({"path": p.as_str(), "error": e.to_string()}))
                .collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_listing(&self, entries: &[DirEntry]) -> String {
        let items: Vec<_> = entries
            .iter()
            .map(|e| {
                json!({
                    "name": e.name(),
                    "path": e.storage().path().as_str(),
                    "kind": e.kind().label(),
                    "file_type": e.storage().file_type().label(),
                })
            })
            .collect();

        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}
