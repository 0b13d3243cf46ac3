// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Box-drawing text rendering for snapshots.
//!
//! ```
//! use nodetree::tree_format::{TreeNode, format_tree};
//!
//! let root = TreeNode::new("srv")
//!     .with_child(TreeNode::new("a.txt"))
//!     .with_child(TreeNode::new("logs").with_child(TreeNode::new("today.log")));
//!
//! assert_eq!(format_tree(&root), "srv\n├── a.txt\n└─┬ logs\n  └── today.log\n");
//! ```

use std::fmt;

/// A labelled entry in a rendered tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub label: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }
}

/// Render `root` and everything below it, one entry per line
#[must_use]
pub fn format_tree(root: &TreeNode) -> String {
    let mut output = format!("{}\n", root.label);
    render_children(&mut output, &root.children, "");
    output
}

fn render_children(output: &mut String, children: &[TreeNode], prefix: &str) {
    for (index, child) in children.iter().enumerate() {
        let last = index + 1 == children.len();
        let connector = match (last, child.children.is_empty()) {
            (false, true) => "├──",
            (false, false) => "├─┬",
            (true, true) => "└──",
            (true, false) => "└─┬",
        };
        output.push_str(&format!("{prefix}{connector} {}\n", child.label));

        if !child.children.is_empty() {
            let rail = if last { ' ' } else { '│' };
            render_children(output, &child.children, &format!("{prefix}{rail} "));
        }
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_tree(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_connectors() {
        let root = TreeNode::new("/")
            .with_child(TreeNode::new("a"))
            .with_child(TreeNode::new("b"));
        assert_eq!(format_tree(&root), "/\n├── a\n└── b\n");
    }

    #[test]
    fn test_rails_continue_under_open_siblings() {
        let root = TreeNode::new("root")
            .with_child(
                TreeNode::new("d1")
                    .with_child(TreeNode::new("x"))
                    .with_child(TreeNode::new("y")),
            )
            .with_child(TreeNode::new("d2").with_child(TreeNode::new("z")));

        let output = format_tree(&root);
        assert!(output.contains("├─┬ d1\n│ ├── x\n│ └── y\n"));
        assert!(output.contains("└─┬ d2\n  └── z\n"));
    }

    #[test]
    fn test_display_matches_format() {
        let root = TreeNode::new("only");
        assert_eq!(root.to_string(), "only\n");
    }
}
