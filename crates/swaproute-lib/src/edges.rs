//! Sources of tradable pairs and their weights.
//!
//! The route engine never hardcodes its edge set: each refresh pulls the full
//! list from an [`EdgeSource`] and hands it to the store.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;

use crate::error::{Error, Result};
use crate::graph::Edge;

/// Illustrative seed pairs for the default token set. Weights carry no unit.
static SEED_EDGES: Lazy<Vec<Edge>> = Lazy::new(|| {
    vec![
        Edge::new("bitcoin", "ethereum", 0.1),
        Edge::new("ethereum", "litecoin", 0.2),
    ]
});

/// Supplies the complete edge set for one refresh.
pub trait EdgeSource: Send + Sync {
    fn edges(&self) -> Result<Vec<Edge>>;
}

/// The built-in seed edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeedEdges;

impl EdgeSource for SeedEdges {
    fn edges(&self) -> Result<Vec<Edge>> {
        Ok(SEED_EDGES.clone())
    }
}

/// A fixed, caller-provided edge list.
#[derive(Debug, Clone, Default)]
pub struct StaticEdges(pub Vec<Edge>);

impl EdgeSource for StaticEdges {
    fn edges(&self) -> Result<Vec<Edge>> {
        Ok(self.0.clone())
    }
}

/// Edge list stored as a JSON array of `{source, target, weight}` objects.
///
/// The file is re-read on every refresh so operators can swap pool weights
/// without restarting.
#[derive(Debug, Clone)]
pub struct EdgeFile {
    path: PathBuf,
}

impl EdgeFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EdgeSource for EdgeFile {
    fn edges(&self) -> Result<Vec<Edge>> {
        let contents = fs::read_to_string(&self.path)?;
        serde_json::from_str(&contents).map_err(|e| Error::EdgeFile {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn seed_edges_link_default_tokens() {
        let edges = SeedEdges.edges().expect("seed edges");
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0], Edge::new("bitcoin", "ethereum", 0.1));
        assert_eq!(edges[1], Edge::new("ethereum", "litecoin", 0.2));
    }

    #[test]
    fn edge_file_reads_json_array() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"[{{"source":"a","target":"b","weight":0.25}},{{"source":"b","target":"c","weight":1}}]"#
        )
        .expect("write edges");

        let edges = EdgeFile::new(file.path()).edges().expect("parse edges");
        assert_eq!(edges, vec![Edge::new("a", "b", 0.25), Edge::new("b", "c", 1.0)]);
    }

    #[test]
    fn edge_file_reports_parse_errors_with_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"[{{"source":"a"}}]"#).expect("write edges");

        let error = EdgeFile::new(file.path()).edges().expect_err("missing fields");
        assert!(matches!(error, Error::EdgeFile { .. }));
        assert!(error.to_string().contains("failed to parse edge file"));
    }

    #[test]
    fn missing_edge_file_is_io_error() {
        let error = EdgeFile::new("/nonexistent/edges.json")
            .edges()
            .expect_err("missing file");
        assert!(matches!(error, Error::Io(_)));
    }
}
