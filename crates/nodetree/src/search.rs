// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Search over cached state. Nothing here touches the backend: a subtree
//! that was never scanned is simply not searched.

use crate::error::Result;
use crate::node::Node;
use crate::tree::Tree;

impl Tree {
    /// First cached node below `path` whose full path contains `needle`.
    ///
    /// Direct children are checked before any of them is descended into.
    pub fn find_from(&self, path: &str, needle: &str) -> Result<Option<&Node>> {
        let children = self.children(path)?;
        if let Some(hit) = children.iter().find(|c| c.full_path().contains(needle)) {
            return Ok(Some(*hit));
        }
        for child in children {
            if let Some(hit) = self.find_from(child.full_path(), needle)? {
                return Ok(Some(hit));
            }
        }
        Ok(None)
    }

    /// Every cached node below `path` whose full path contains `needle`,
    /// depth first: each match is followed by the matches inside it before
    /// the next sibling is visited.
    pub fn find_all_from(&self, path: &str, needle: &str) -> Result<Vec<&Node>> {
        let mut found = Vec::new();
        self.collect_from(path, &mut |node| node.full_path().contains(needle), &mut found)?;
        Ok(found)
    }

    pub fn find(&self, needle: &str) -> Result<Option<&Node>> {
        self.find_from(&self.root_path, needle)
    }

    pub fn find_all(&self, needle: &str) -> Result<Vec<&Node>> {
        self.find_all_from(&self.root_path, needle)
    }

    /// All cached nodes below `path`, each parent before its children
    pub fn descendants(&self, path: &str) -> Result<Vec<&Node>> {
        let mut found = Vec::new();
        self.collect_from(path, &mut |_| true, &mut found)?;
        Ok(found)
    }

    fn collect_from<'t>(
        &'t self,
        path: &str,
        keep: &mut dyn FnMut(&Node) -> bool,
        found: &mut Vec<&'t Node>,
    ) -> Result<()> {
        for child in self.children(path)? {
            if keep(child) {
                found.push(child);
            }
            self.collect_from(child.full_path(), keep, found)?;
        }
        Ok(())
    }
}
