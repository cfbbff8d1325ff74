// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Output node hierarchy
//!
//! Nodes own their children directly; there is no sharing and no parent
//! pointer. A [`Model`] holds one root node per extracted level of detail.

use crate::Mesh;

/// Named tree element with an optional mesh
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
    pub name: String,
    pub mesh: Option<Mesh>,
    pub children: Vec<Node>,
}

impl Node {
    /// Create an empty node
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mesh: None,
            children: Vec::new(),
        }
    }

    /// Attach a mesh, dropping it when it has no triangles
    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.set_mesh(mesh);
        self
    }

    /// Attach a mesh, dropping it when it has no triangles
    pub fn set_mesh(&mut self, mesh: Mesh) {
        self.mesh = if mesh.is_empty() { None } else { Some(mesh) };
    }

    /// Append a child and return it for further building
    pub fn add_child(&mut self, child: Node) -> &mut Node {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Whether this node carries a mesh with triangles
    pub fn has_mesh(&self) -> bool {
        self.mesh.as_ref().is_some_and(|m| !m.is_empty())
    }

    /// Number of meshes in this subtree
    pub fn mesh_count(&self) -> usize {
        self.iter().filter(|n| n.has_mesh()).count()
    }

    /// First node named `name` in depth-first pre-order (including self)
    pub fn find_by_name(&self, name: &str) -> Option<&Node> {
        self.iter().find(|n| n.name == name)
    }

    /// Depth-first pre-order traversal starting at this node
    pub fn iter(&self) -> NodeIter<'_> {
        NodeIter { stack: vec![self] }
    }

    /// Drop every descendant whose subtree has no mesh
    ///
    /// Returns whether this node's subtree still holds a mesh.
    pub fn erase_empty_children(&mut self) -> bool {
        self.children.retain_mut(|child| child.erase_empty_children());
        self.has_mesh() || !self.children.is_empty()
    }
}

/// Depth-first pre-order iterator over a node subtree
pub struct NodeIter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Extraction result: ordered root nodes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    pub root_nodes: Vec<Node>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a root node and return it for further building
    pub fn add_node(&mut self, node: Node) -> &mut Node {
        self.root_nodes.push(node);
        let last = self.root_nodes.len() - 1;
        &mut self.root_nodes[last]
    }

    pub fn root_node_count(&self) -> usize {
        self.root_nodes.len()
    }

    pub fn root_node(&self, index: usize) -> Option<&Node> {
        self.root_nodes.get(index)
    }

    /// Every node of every root, depth-first pre-order
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.root_nodes.iter().flat_map(Node::iter)
    }

    /// Number of meshes in the whole model
    pub fn mesh_count(&self) -> usize {
        self.root_nodes.iter().map(Node::mesh_count).sum()
    }

    /// First node named `name` across all roots
    pub fn find_by_name(&self, name: &str) -> Option<&Node> {
        self.iter().find(|n| n.name == name)
    }

    /// Remove nodes whose subtree contains no mesh
    ///
    /// Root nodes are kept even when empty, so the model still has one root
    /// per level of detail. Idempotent.
    pub fn erase_empty_nodes(&mut self) {
        for root in &mut self.root_nodes {
            root.erase_empty_children();
        }
    }
}
