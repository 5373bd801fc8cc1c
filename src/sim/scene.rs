//! Scene graph seam between the simulation and the presentation layer
//!
//! The simulation never draws. It attaches and detaches display nodes and
//! pushes their transform/alpha through the [`Scene`] trait. [`SceneGraph`] is
//! the retained implementation used by the browser bridge (which serializes a
//! snapshot for the JS renderer) and by tests.

use std::collections::HashMap;

use glam::Vec2;
use serde::Serialize;

use super::obstacles::AlienLook;
use super::particles::ParticleShape;

/// Handle to a display node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The scene root. Always attached.
    pub const ROOT: NodeId = NodeId(0);
}

/// What a node looks like. The renderer decides how to draw it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Sprite {
    /// Invisible container
    Group,
    /// Expanding white disc behind an explosion
    Flash { radius: f32, color: u32 },
    Particle { shape: ParticleShape, color: u32 },
    Alien(AlienLook),
    Text { text: String, size: f32, color: u32 },
}

/// Independently settable node properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeProps {
    pub pos: Vec2,
    pub alpha: f32,
    pub rotation: f32,
    pub scale: f32,
}

impl NodeProps {
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            ..Default::default()
        }
    }
}

impl Default for NodeProps {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            alpha: 1.0,
            rotation: 0.0,
            scale: 1.0,
        }
    }
}

/// Retained display tree the simulation writes into
pub trait Scene {
    /// Attach a new child under `parent`. Returns `None` if `parent` is gone.
    fn attach(&mut self, parent: NodeId, sprite: Sprite, props: NodeProps) -> Option<NodeId>;

    /// Detach a node and its whole subtree. Returns `false` if it was not attached.
    fn detach(&mut self, node: NodeId) -> bool;

    fn is_attached(&self, node: NodeId) -> bool;

    /// Update a node's properties. Ignored for detached nodes.
    fn set_props(&mut self, node: NodeId, props: NodeProps);

    /// Create an empty grouping node on the root
    fn create_group(&mut self, pos: Vec2) -> Option<NodeId> {
        self.attach(NodeId::ROOT, Sprite::Group, NodeProps::at(pos))
    }
}

#[derive(Debug, Clone)]
struct SceneNode {
    parent: NodeId,
    sprite: Sprite,
    props: NodeProps,
    children: Vec<NodeId>,
}

/// A node flattened to world space for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub sprite: Sprite,
    pub pos: Vec2,
    pub alpha: f32,
    pub rotation: f32,
    pub scale: f32,
}

/// In-memory [`Scene`] implementation
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: HashMap<NodeId, SceneNode>,
    root_children: Vec<NodeId>,
    next_id: u32,
    /// Every node successfully detached, in order
    detach_log: Vec<NodeId>,
    /// Detach calls on nodes that were already gone
    redundant_detaches: usize,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attached nodes (root excluded)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn sprite(&self, node: NodeId) -> Option<&Sprite> {
        self.nodes.get(&node).map(|n| &n.sprite)
    }

    pub fn props(&self, node: NodeId) -> Option<NodeProps> {
        self.nodes.get(&node).map(|n| n.props)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).map(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        if node == NodeId::ROOT {
            return &self.root_children;
        }
        self.nodes
            .get(&node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// How many times `node` was detached (0 or 1 for a well-behaved caller)
    pub fn detach_count(&self, node: NodeId) -> usize {
        self.detach_log.iter().filter(|&&n| n == node).count()
    }

    pub fn redundant_detaches(&self) -> usize {
        self.redundant_detaches
    }

    /// Count attached nodes matching a predicate
    pub fn count_where(&self, pred: impl Fn(&Sprite) -> bool) -> usize {
        self.nodes.values().filter(|n| pred(&n.sprite)).count()
    }

    /// Flatten the tree to world space in draw order (parents before children)
    pub fn snapshot(&self) -> Vec<NodeSnapshot> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let root = NodeProps::default();
        for &child in &self.root_children {
            self.flatten(child, &root, &mut out);
        }
        out
    }

    fn flatten(&self, id: NodeId, parent: &NodeProps, out: &mut Vec<NodeSnapshot>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let world = NodeProps {
            pos: parent.pos + node.props.pos,
            alpha: parent.alpha * node.props.alpha,
            rotation: node.props.rotation,
            scale: node.props.scale,
        };
        out.push(NodeSnapshot {
            id,
            sprite: node.sprite.clone(),
            pos: world.pos,
            alpha: world.alpha,
            rotation: world.rotation,
            scale: world.scale,
        });
        // Children inherit position and alpha, not the parent's own scale
        let inherited = NodeProps {
            scale: 1.0,
            ..world
        };
        for &child in &node.children {
            self.flatten(child, &inherited, out);
        }
    }

    fn remove_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            for child in node.children {
                self.remove_subtree(child);
            }
        }
    }
}

impl Scene for SceneGraph {
    fn attach(&mut self, parent: NodeId, sprite: Sprite, props: NodeProps) -> Option<NodeId> {
        if !self.is_attached(parent) {
            log::debug!("attach under detached parent {:?} ignored", parent);
            return None;
        }
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.insert(
            id,
            SceneNode {
                parent,
                sprite,
                props,
                children: Vec::new(),
            },
        );
        if parent == NodeId::ROOT {
            self.root_children.push(id);
        } else if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        Some(id)
    }

    fn detach(&mut self, node: NodeId) -> bool {
        let Some(parent) = self.parent(node) else {
            self.redundant_detaches += 1;
            log::debug!("detach of missing node {:?} ignored", node);
            return false;
        };
        if parent == NodeId::ROOT {
            self.root_children.retain(|&c| c != node);
        } else if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|&c| c != node);
        }
        self.remove_subtree(node);
        self.detach_log.push(node);
        true
    }

    fn is_attached(&self, node: NodeId) -> bool {
        node == NodeId::ROOT || self.nodes.contains_key(&node)
    }

    fn set_props(&mut self, node: NodeId, props: NodeProps) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.props = props;
        }
    }
}
