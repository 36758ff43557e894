//! Dependency graph for s6-rc service definitions.
//!
//! Each module is a directory under the `s6-rc.d` tree; the files inside its
//! `dependencies.d` directory name the modules it depends on. Edges point from
//! the dependency to the dependent module.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::diagram::{sanitize, Diagram, Direction, Edge, Kind, Node, Statement};
use crate::error::{CiflowError, Result};

const DEPENDENCIES_DIR: &str = "dependencies.d";

/// Module name to the sorted names of the modules it depends on.
pub type Dependencies = BTreeMap<String, Vec<String>>;

fn sorted_entries(dir: &Path) -> Result<Vec<fs::DirEntry>> {
    let read_err = |source| CiflowError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(read_err)?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(read_err)?;
    entries.sort_by_key(fs::DirEntry::file_name);
    Ok(entries)
}

/// Collects the dependency list of every module directory in `tree`.
///
/// # Errors
///
/// Returns `MissingDirectory` when `tree` is not a directory, or `Read` when
/// it or one of the `dependencies.d` directories cannot be listed.
pub fn read_dependencies(tree: &Path) -> Result<Dependencies> {
    if !tree.is_dir() {
        return Err(CiflowError::MissingDirectory(tree.to_path_buf()));
    }

    let mut deps = Dependencies::new();
    for entry in sorted_entries(tree)? {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let module = entry.file_name().to_string_lossy().into_owned();
        let dep_dir = path.join(DEPENDENCIES_DIR);
        let mut parents = Vec::new();
        if dep_dir.is_dir() {
            for dep in sorted_entries(&dep_dir)? {
                if dep.path().is_file() {
                    parents.push(dep.file_name().to_string_lossy().into_owned());
                }
            }
        }

        debug!("Module {module} depends on [{}]", parents.join(", "));
        deps.insert(module, parents);
    }

    info!("Read {} s6-rc modules from {}", deps.len(), tree.display());
    Ok(deps)
}

/// Builds a `graph TD` with one edge per dependency.
///
/// Modules without dependencies, and dependencies that have no module
/// directory of their own, are listed as bare nodes so nothing is dropped.
pub fn build_diagram(deps: &Dependencies) -> Diagram {
    let mut diagram = Diagram::new(Kind::Graph, Direction::TopDown);
    let mut standalone = BTreeSet::new();

    for (module, parents) in deps {
        let target = sanitize(module);
        if parents.is_empty() {
            standalone.insert(target);
            continue;
        }
        for parent in parents {
            diagram
                .statements
                .push(Statement::Edge(Edge::link(sanitize(parent), target.clone())));
        }
    }

    let referenced_only: BTreeSet<String> = deps
        .values()
        .flatten()
        .filter(|parent| !deps.contains_key(parent.as_str()))
        .map(|parent| sanitize(parent))
        .collect();

    diagram.statements.extend(
        standalone
            .into_iter()
            .chain(referenced_only)
            .map(|id| Statement::Node(Node::bare(id))),
    );

    diagram
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::render;
    use std::path::PathBuf;

    fn module(tree: &Path, name: &str, parents: &[&str]) -> PathBuf {
        let dir = tree.join(name);
        fs::create_dir_all(dir.join(DEPENDENCIES_DIR)).unwrap();
        for parent in parents {
            fs::write(dir.join(DEPENDENCIES_DIR).join(parent), "").unwrap();
        }
        dir
    }

    #[test]
    fn test_read_dependencies_sorted() {
        let tree = tempfile::tempdir().unwrap();
        module(tree.path(), "svc-nginx", &["init-config", "base"]);
        module(tree.path(), "base", &[]);
        fs::create_dir_all(tree.path().join("no-deps-dir")).unwrap();
        fs::write(tree.path().join("README"), "not a module").unwrap();

        let deps = read_dependencies(tree.path()).unwrap();

        assert_eq!(
            deps.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["base", "no-deps-dir", "svc-nginx"]
        );
        assert_eq!(deps["svc-nginx"], vec!["base", "init-config"]);
        assert!(deps["no-deps-dir"].is_empty());
    }

    #[test]
    fn test_missing_tree_is_fatal() {
        let tree = tempfile::tempdir().unwrap();
        let err = read_dependencies(&tree.path().join("absent")).unwrap_err();
        assert!(matches!(err, CiflowError::MissingDirectory(_)));
    }

    #[test]
    fn test_build_diagram_edges_and_free_nodes() {
        let deps: Dependencies = [
            ("base".to_string(), vec![]),
            (
                "svc-nginx".to_string(),
                vec!["base".to_string(), "init-config".to_string()],
            ),
            ("legacy".to_string(), vec![]),
        ]
        .into_iter()
        .collect();

        let diagram = build_diagram(&deps);

        assert!(diagram.has_edge("base", "svc_nginx"));
        assert!(diagram.has_edge("init_config", "svc_nginx"));
        assert_eq!(
            render(&diagram),
            "graph TD\n    base --> svc_nginx\n    init_config --> svc_nginx\n    base\n    legacy\n    init_config\n"
        );
    }
}
