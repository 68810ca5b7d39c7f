use crate::error::CommandError;
use crate::synth::{RenderContext, Synth};
use collider_ports::{NodeId, ROOT_NODE};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddAction {
    Head,
    Tail,
    Before,
    After,
}

impl AddAction {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(AddAction::Head),
            1 => Some(AddAction::Tail),
            2 => Some(AddAction::Before),
            3 => Some(AddAction::After),
            _ => None,
        }
    }
}

enum NodeKind {
    Group { children: Vec<NodeId> },
    Synth(Box<Synth>),
}

struct Node {
    parent: Option<NodeId>,
    running: bool,
    kind: NodeKind,
}

/// Groups and synths keyed by id, rendered depth-first from the root group.
pub struct NodeTree {
    nodes: HashMap<NodeId, Node>,
    // Work list reused across walks; deep chains never touch the call stack.
    pending: Vec<NodeId>,
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTree {
    /// A tree holding only the root group, which starts stopped.
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            ROOT_NODE,
            Node {
                parent: None,
                running: false,
                kind: NodeKind::Group {
                    children: Vec::new(),
                },
            },
        );
        Self {
            nodes,
            pending: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn is_running(&self, id: NodeId) -> Option<bool> {
        self.nodes.get(&id).map(|node| node.running)
    }

    pub fn root_running(&self) -> bool {
        self.is_running(ROOT_NODE).unwrap_or(false)
    }

    pub fn set_root_running(&mut self, running: bool) {
        if let Some(root) = self.nodes.get_mut(&ROOT_NODE) {
            root.running = running;
        }
    }

    pub fn set_running(&mut self, id: NodeId, running: bool) -> Result<(), CommandError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(CommandError::UnknownNode(id))?;
        node.running = running;
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> Option<&[NodeId]> {
        match &self.nodes.get(&id)?.kind {
            NodeKind::Group { children } => Some(children),
            NodeKind::Synth(_) => None,
        }
    }

    pub fn synth(&self, id: NodeId) -> Option<&Synth> {
        match &self.nodes.get(&id)?.kind {
            NodeKind::Synth(synth) => Some(synth),
            NodeKind::Group { .. } => None,
        }
    }

    pub fn add_group(&mut self, id: NodeId, action: AddAction, target: NodeId) -> Result<(), CommandError> {
        self.insert(
            id,
            NodeKind::Group {
                children: Vec::new(),
            },
            action,
            target,
        )
    }

    pub fn add_synth(
        &mut self,
        id: NodeId,
        synth: Synth,
        action: AddAction,
        target: NodeId,
    ) -> Result<(), CommandError> {
        self.insert(id, NodeKind::Synth(Box::new(synth)), action, target)
    }

    fn insert(&mut self, id: NodeId, kind: NodeKind, action: AddAction, target: NodeId) -> Result<(), CommandError> {
        if self.nodes.contains_key(&id) {
            return Err(CommandError::DuplicateNode(id));
        }
        let target_node = self
            .nodes
            .get(&target)
            .ok_or(CommandError::UnknownNode(target))?;

        let (parent, position) = match action {
            AddAction::Head | AddAction::Tail => match &target_node.kind {
                NodeKind::Group { children } => {
                    let position = if action == AddAction::Head { 0 } else { children.len() };
                    (target, position)
                }
                NodeKind::Synth(_) => return Err(CommandError::NotAGroup(target)),
            },
            AddAction::Before | AddAction::After => {
                let parent = target_node.parent.ok_or(CommandError::NotAGroup(target))?;
                let siblings = self.children(parent).ok_or(CommandError::NotAGroup(parent))?;
                let index = siblings
                    .iter()
                    .position(|&child| child == target)
                    .ok_or(CommandError::UnknownNode(target))?;
                let position = if action == AddAction::Before { index } else { index + 1 };
                (parent, position)
            }
        };

        if let Some(Node {
            kind: NodeKind::Group { children },
            ..
        }) = self.nodes.get_mut(&parent)
        {
            children.insert(position, id);
        }
        self.nodes.insert(
            id,
            Node {
                parent: Some(parent),
                running: true,
                kind,
            },
        );
        Ok(())
    }

    /// Removes a node and its whole subtree. Freeing the root only empties it.
    pub fn free(&mut self, id: NodeId) -> Result<(), CommandError> {
        let node = self.nodes.get_mut(&id).ok_or(CommandError::UnknownNode(id))?;
        if id == ROOT_NODE {
            let children = match &mut node.kind {
                NodeKind::Group { children } => std::mem::take(children),
                NodeKind::Synth(_) => Vec::new(),
            };
            for child in children {
                self.remove_subtree(child);
            }
            return Ok(());
        }
        if let Some(parent) = node.parent {
            if let Some(Node {
                kind: NodeKind::Group { children },
                ..
            }) = self.nodes.get_mut(&parent)
            {
                children.retain(|&child| child != id);
            }
        }
        self.remove_subtree(id);
        Ok(())
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            if let Some(Node {
                kind: NodeKind::Group { children },
                ..
            }) = self.nodes.remove(&id)
            {
                pending.extend(children);
            }
        }
    }

    /// Sets a parameter on a synth, or on every synth below a group.
    pub fn set_param(&mut self, id: NodeId, index: usize, value: f32) -> Result<(), CommandError> {
        if !self.nodes.contains_key(&id) {
            return Err(CommandError::UnknownNode(id));
        }
        let mut pending = std::mem::take(&mut self.pending);
        pending.clear();
        pending.push(id);
        while let Some(id) = pending.pop() {
            match self.nodes.get_mut(&id).map(|node| &mut node.kind) {
                Some(NodeKind::Synth(synth)) => {
                    synth.set_param(index, value);
                }
                Some(NodeKind::Group { children }) => pending.extend(children.iter().copied()),
                None => {}
            }
        }
        self.pending = pending;
        Ok(())
    }

    /// Renders every running node in order; a stopped group skips its subtree.
    pub fn process(&mut self, ctx: &mut RenderContext<'_>) {
        let mut pending = std::mem::take(&mut self.pending);
        pending.clear();
        pending.push(ROOT_NODE);
        while let Some(id) = pending.pop() {
            let Some(node) = self.nodes.get_mut(&id) else {
                continue;
            };
            if !node.running {
                continue;
            }
            match &mut node.kind {
                NodeKind::Synth(synth) => synth.process(ctx),
                NodeKind::Group { children } => pending.extend(children.iter().rev().copied()),
            }
        }
        self.pending = pending;
    }
}
