//! Category trees and the flattener
//!
//! A category tree is read from JSON as nested `{id, name, children}` nodes
//! and flattened into `/`-joined paths in pre-order.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{Error, Result};

/// Separator between ancestor names in a category path
pub const PATH_SEPARATOR: &str = "/";

/// A node of a category tree as it appears in the input file
///
/// `id` and `name` are optional at the serde level so that a node missing
/// either one is reported as a malformed tree rather than a parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<CategoryNode>>,
}

impl CategoryNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            children: None,
        }
    }

    pub fn with_children(mut self, children: Vec<CategoryNode>) -> Self {
        self.children = Some(children);
        self
    }
}

/// One flattened category: its id, full path and own name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryPath {
    pub id: String,
    pub full_path: String,
    pub name: String,
}

/// Read a category tree (a JSON array of root nodes) from disk
pub fn read_tree(path: &Path) -> Result<Vec<CategoryNode>> {
    let content = fs::read_to_string(path).map_err(|e| Error::io("read", path, e))?;
    serde_json::from_str(&content).map_err(|e| Error::TreeFormat {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Flatten root nodes into pre-order category paths
pub fn flatten(roots: &[CategoryNode]) -> Result<Vec<CategoryPath>> {
    flatten_with_prefix(roots, "")
}

/// Flatten nodes whose ancestors are already joined into `prefix`
pub fn flatten_with_prefix(nodes: &[CategoryNode], prefix: &str) -> Result<Vec<CategoryPath>> {
    let mut paths = Vec::new();
    walk(nodes, prefix, &mut paths)?;
    Ok(paths)
}

fn walk(nodes: &[CategoryNode], prefix: &str, out: &mut Vec<CategoryPath>) -> Result<()> {
    for (index, node) in nodes.iter().enumerate() {
        let id = required(node.id.as_deref(), "id", prefix, index)?;
        let name = required(node.name.as_deref(), "name", prefix, index)?;

        let full_path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}{PATH_SEPARATOR}{name}")
        };

        out.push(CategoryPath {
            id: id.to_string(),
            full_path: full_path.clone(),
            name: name.to_string(),
        });

        if let Some(children) = &node.children {
            walk(children, &full_path, out)?;
        }
    }
    Ok(())
}

fn required<'a>(
    value: Option<&'a str>,
    field: &'static str,
    prefix: &str,
    index: usize,
) -> Result<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => {
            let parent = if prefix.is_empty() { "<root>" } else { prefix };
            Err(Error::MalformedTree {
                location: format!("{parent}[{index}]"),
                field,
            })
        }
    }
}
