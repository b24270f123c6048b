//! Best-effort node state reporting.
//!
//! Runs before the tracing subscriber exists, so findings go to stdout.
//! Nothing here can fail the bootstrap.

use std::fs;
use std::path::PathBuf;

use dockhand_config::NodePaths;
use walkdir::WalkDir;

/// What the diagnostic pass found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeReport {
    /// Size of the node registry configuration, when readable.
    pub config_bytes: Option<usize>,
    /// Files found under the trust anchor directory.
    pub trust_files: Vec<PathBuf>,
    /// Problems encountered, already printed.
    pub problems: Vec<String>,
}

/// Read the node configuration and enumerate trust anchors, printing what was found.
#[must_use]
pub fn report_node_state(paths: &NodePaths) -> NodeReport {
    let mut report = NodeReport::default();

    match fs::read(&paths.config_json) {
        Ok(content) => {
            println!(
                "node config {} read: {} bytes",
                paths.config_json.display(),
                content.len()
            );
            report.config_bytes = Some(content.len());
        }
        Err(err) => report.problem(format!(
            "error reading {}: {err}",
            paths.config_json.display()
        )),
    }

    for entry in WalkDir::new(&paths.trust_anchors).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_dir() => {}
            Ok(entry) => {
                println!("file found: {}", entry.path().display());
                report.trust_files.push(entry.into_path());
            }
            Err(err) => report.problem(format!(
                "error traversing {}: {err}",
                paths.trust_anchors.display()
            )),
        }
    }

    report
}

impl NodeReport {
    fn problem(&mut self, message: String) {
        println!("{message}");
        self.problems.push(message);
    }
}
