//! Android library dependency graph.
//!
//! Each [`LibraryNode`] contributes optional resource, asset and native
//! library directories. [`DependencyGraph::transitive`] turns the closure of
//! some roots into an immutable [`TransitiveDependencies`] snapshot.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::DfsPostOrder;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::assets::{AssetSource, AssetsClosure};
use crate::target::BuildTarget;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
  #[error("unknown target: {0}")]
  UnknownTarget(String),

  #[error("{dependent} depends on unknown target {dependency}")]
  UnknownDependency { dependent: String, dependency: String },

  #[error("target declared twice: {0}")]
  DuplicateTarget(String),

  #[error("dependency cycle detected at {0}")]
  Cycle(String),
}

/// One Android library in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryNode {
  pub target: BuildTarget,
  #[serde(default)]
  pub res: Option<PathBuf>,
  #[serde(default)]
  pub assets: Option<PathBuf>,
  #[serde(default)]
  pub native_libs: Option<PathBuf>,
  /// Keep this library's non-English strings in the default resources.
  #[serde(default)]
  pub has_whitelisted_strings: bool,
  #[serde(default)]
  pub deps: Vec<BuildTarget>,
}

impl LibraryNode {
  pub fn new(target: BuildTarget) -> Self {
    Self {
      target,
      res: None,
      assets: None,
      native_libs: None,
      has_whitelisted_strings: false,
      deps: Vec::new(),
    }
  }
}

/// What a dependency closure provides to resource packaging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitiveDependencies {
  /// Resource directories, dependents before their dependencies.
  pub resource_directories: Vec<PathBuf>,
  pub whitelisted_string_dirs: BTreeSet<PathBuf>,
  /// Asset directories, dependencies before their dependents.
  pub assets: AssetsClosure,
}

/// Dependency graph of Android libraries. Edges point from a library to its
/// dependencies.
pub struct DependencyGraph {
  graph: DiGraph<LibraryNode, ()>,
  nodes: HashMap<BuildTarget, NodeIndex>,
}

impl DependencyGraph {
  pub fn new(libraries: impl IntoIterator<Item = LibraryNode>) -> Result<Self, GraphError> {
    let mut graph = DiGraph::new();
    let mut nodes = HashMap::new();

    for library in libraries {
      let target = library.target.clone();
      if nodes.contains_key(&target) {
        return Err(GraphError::DuplicateTarget(target.to_string()));
      }
      let idx = graph.add_node(library);
      nodes.insert(target, idx);
    }

    let indices: Vec<NodeIndex> = graph.node_indices().collect();
    for idx in indices {
      let deps = graph[idx].deps.clone();
      for dep in deps {
        let dep_idx = *nodes.get(&dep).ok_or_else(|| GraphError::UnknownDependency {
          dependent: graph[idx].target.to_string(),
          dependency: dep.to_string(),
        })?;
        graph.add_edge(idx, dep_idx, ());
      }
    }

    toposort(&graph, None).map_err(|cycle| GraphError::Cycle(graph[cycle.node_id()].target.to_string()))?;

    Ok(Self { graph, nodes })
  }

  pub fn len(&self) -> usize {
    self.graph.node_count()
  }

  pub fn is_empty(&self) -> bool {
    self.graph.node_count() == 0
  }

  pub fn get(&self, target: &BuildTarget) -> Option<&LibraryNode> {
    self.nodes.get(target).map(|&idx| &self.graph[idx])
  }

  /// Libraries reachable from `roots`, each after all of its dependencies.
  pub fn post_order(&self, roots: &[BuildTarget]) -> Result<Vec<&LibraryNode>, GraphError> {
    let mut order = Vec::new();
    let mut seen = BTreeSet::new();
    for root in roots {
      let start = *self
        .nodes
        .get(root)
        .ok_or_else(|| GraphError::UnknownTarget(root.to_string()))?;
      let mut dfs = DfsPostOrder::new(&self.graph, start);
      while let Some(idx) = dfs.next(&self.graph) {
        if seen.insert(idx) {
          order.push(&self.graph[idx]);
        }
      }
    }
    Ok(order)
  }

  /// Collect the resource and asset directories of the closure of `roots`.
  pub fn transitive(&self, roots: &[BuildTarget]) -> Result<TransitiveDependencies, GraphError> {
    let order = self.post_order(roots)?;
    let mut deps = TransitiveDependencies::default();

    for library in &order {
      if let Some(assets) = &library.assets {
        deps
          .assets
          .assets_directories
          .push(AssetSource::new(assets, library.target.clone()));
      }
      if let Some(native) = &library.native_libs {
        deps
          .assets
          .native_lib_assets_directories
          .push(AssetSource::new(native, library.target.clone()));
      }
      if let Some(res) = &library.res
        && library.has_whitelisted_strings
      {
        deps.whitelisted_string_dirs.insert(res.clone());
      }
    }

    deps.resource_directories = order.iter().rev().filter_map(|library| library.res.clone()).collect();

    debug!(
      libraries = order.len(),
      res = deps.resource_directories.len(),
      assets = deps.assets.assets_directories.len(),
      native_libs = deps.assets.native_lib_assets_directories.len(),
      "computed transitive dependencies"
    );
    Ok(deps)
  }
}
