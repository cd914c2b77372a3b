//! File-based persistence for flow graphs.
//!
//! Flows are stored as individual pretty-printed JSON files named by graph
//! id under one directory. The engine never touches this module: it only
//! ever receives an already-loaded graph.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{new_id, now_millis, FlowGraph};

/// Persistence error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Directory-backed flow store.
pub struct FlowStore {
    dir: PathBuf,
}

impl FlowStore {
    /// Opens (creating if needed) the store directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Saves or updates a flow graph.
    pub fn save(&self, graph: &FlowGraph) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(graph)?;
        fs::write(self.path_for(&graph.id), json)?;
        debug!(graph_id = %graph.id, name = %graph.name, "flow saved");
        Ok(())
    }

    /// Loads a flow graph by id. `None` if absent or unreadable.
    pub fn load(&self, id: &str) -> Option<FlowGraph> {
        let text = fs::read_to_string(self.path_for(id)).ok()?;
        match serde_json::from_str(&text) {
            Ok(graph) => Some(graph),
            Err(e) => {
                warn!(graph_id = %id, error = %e, "skipping corrupt flow file");
                None
            }
        }
    }

    /// All readable flows, most recently updated first. Corrupt files are
    /// skipped, not fatal.
    pub fn list_all(&self) -> Result<Vec<FlowGraph>, StoreError> {
        let mut flows = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                if let Some(graph) = read_graph(&path) {
                    flows.push(graph);
                }
            }
        }
        flows.sort_by_key(|g| std::cmp::Reverse(g.updated_at));
        Ok(flows)
    }

    /// Deletes a flow by id. Returns true when a file was removed.
    pub fn delete(&self, id: &str) -> bool {
        fs::remove_file(self.path_for(id)).is_ok()
    }

    pub fn exists(&self, id: &str) -> bool {
        self.path_for(id).exists()
    }

    /// Writes one flow to an arbitrary path for sharing.
    pub fn export_to(&self, id: &str, target: &Path) -> Result<bool, StoreError> {
        let Some(graph) = self.load(id) else {
            return Ok(false);
        };
        fs::write(target, serde_json::to_string_pretty(&graph)?)?;
        debug!(graph_id = %id, target = %target.display(), "flow exported");
        Ok(true)
    }

    /// Imports a flow from an arbitrary path. The imported flow gets a new
    /// id to avoid collisions and is saved into the store.
    pub fn import_from(&self, source: &Path) -> Result<FlowGraph, StoreError> {
        let text = fs::read_to_string(source)?;
        let imported: FlowGraph = serde_json::from_str(&text)?;
        let graph = FlowGraph {
            id: new_id(),
            name: format!("{} (imported)", imported.name),
            updated_at: now_millis(),
            ..imported
        };
        self.save(&graph)?;
        Ok(graph)
    }
}

fn read_graph(path: &Path) -> Option<FlowGraph> {
    let text = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&text) {
        Ok(graph) => Some(graph),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping corrupt flow file");
            None
        }
    }
}
