//! Inspect command implementation.

use nestdb_core::{document_depth, PersistenceGateway};
use serde::Serialize;
use std::path::Path;

/// Snapshot inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Snapshot path.
    pub path: String,
    /// Snapshot file size in bytes.
    pub file_size: u64,
    /// Number of namespaces.
    pub namespace_count: usize,
    /// Per-namespace statistics, sorted by namespace.
    pub namespaces: Vec<NamespaceStats>,
}

/// Statistics for a single namespace.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct NamespaceStats {
    /// Namespace name.
    pub name: String,
    /// Number of top-level keys.
    pub keys: usize,
    /// Deepest nesting of objects and arrays, counting the document itself.
    pub depth: usize,
    /// Size of the document serialized as JSON.
    pub json_size: usize,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let result = inspect(path)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Reads the snapshot at `path` and computes statistics.
pub fn inspect(path: &Path) -> Result<InspectResult, Box<dyn std::error::Error>> {
    if path.as_os_str().is_empty() {
        return Err("Snapshot path required for inspect".into());
    }
    if !path.exists() {
        return Err(format!("No snapshot found at {:?}", path).into());
    }

    let snapshot = PersistenceGateway::new(Some(path.to_path_buf())).restore()?;

    let mut namespaces = snapshot
        .iter()
        .map(|(name, doc)| {
            Ok(NamespaceStats {
                name: name.clone(),
                keys: doc.len(),
                depth: document_depth(doc),
                json_size: serde_json::to_vec(doc)?.len(),
            })
        })
        .collect::<Result<Vec<_>, serde_json::Error>>()?;
    namespaces.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(InspectResult {
        path: path.display().to_string(),
        file_size: std::fs::metadata(path)?.len(),
        namespace_count: namespaces.len(),
        namespaces,
    })
}

fn print_text_output(result: &InspectResult) {
    println!("NestDB Snapshot Inspection");
    println!("==========================");
    println!();
    println!("Path: {}", result.path);
    println!("Size: {} bytes", format_size(result.file_size));
    println!("Namespaces: {}", result.namespace_count);

    if !result.namespaces.is_empty() {
        println!();
        for ns in &result.namespaces {
            println!(
                "  [{}] {} keys, depth {}, {} bytes",
                ns.name,
                ns.keys,
                ns.depth,
                format_size(ns.json_size as u64)
            );
        }
    }
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{}", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn inspect_counts_namespaces() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("persist.json");
        fs::write(
            &path,
            br#"{"b": {"x": 1, "y": {"z": [1, [2]]}}, "a": {}}"#,
        )
        .unwrap();

        let result = inspect(&path).unwrap();
        assert_eq!(result.namespace_count, 2);
        assert_eq!(result.namespaces[0].name, "a");
        assert_eq!(result.namespaces[0].keys, 0);
        assert_eq!(result.namespaces[0].depth, 1);
        assert_eq!(result.namespaces[1].name, "b");
        assert_eq!(result.namespaces[1].keys, 2);
        assert_eq!(result.namespaces[1].depth, 4);
    }

    #[test]
    fn inspect_missing_file_fails() {
        let temp = tempdir().unwrap();
        assert!(inspect(&temp.path().join("missing.json")).is_err());
        assert!(inspect(Path::new("")).is_err());
    }

    #[test]
    fn size_formatting() {
        assert_eq!(format_size(512), "512");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
