//! Render graph definition and compilation

use crate::render_graph::pass::*;

/// The main render graph structure
pub struct RenderGraph {
    passes: Vec<Box<dyn RenderPass>>,
    pass_nodes: Vec<PassNode>,
    next_pass_id: u32,
}

impl RenderGraph {
    pub fn new() -> Self {
        Self {
            passes: Vec::new(),
            pass_nodes: Vec::new(),
            next_pass_id: 0,
        }
    }

    /// Add a render pass to the graph
    pub fn add_pass<P: RenderPass + 'static>(&mut self, pass: P) -> PassId {
        let id = PassId(self.next_pass_id);
        self.next_pass_id += 1;

        self.pass_nodes.push(PassNode {
            id,
            name: pass.name().to_string(),
            event: pass.event(),
        });
        self.passes.push(Box::new(pass));

        log::debug!(
            "Added pass '{}' at {:?}",
            self.pass_nodes[self.pass_nodes.len() - 1].name,
            self.pass_nodes[self.pass_nodes.len() - 1].event
        );

        id
    }

    /// Compile the graph - order passes by event, keeping insertion order for ties
    pub fn compile(&self) -> CompiledGraph {
        let mut nodes: Vec<&PassNode> = self.pass_nodes.iter().collect();
        nodes.sort_by_key(|node| node.event);

        CompiledGraph {
            pass_order: nodes.into_iter().map(|node| node.id).collect(),
        }
    }

    /// Get pass by ID
    pub fn get_pass(&self, id: PassId) -> Option<&dyn RenderPass> {
        let index = self.pass_nodes.iter().position(|n| n.id == id)?;
        Some(self.passes[index].as_ref())
    }

    /// Get mutable pass by ID
    pub fn get_pass_mut(&mut self, id: PassId) -> Option<&mut (dyn RenderPass + 'static)> {
        let index = self.pass_nodes.iter().position(|n| n.id == id)?;
        Some(self.passes[index].as_mut())
    }

    /// Get pass node by ID
    pub fn get_pass_node(&self, id: PassId) -> Option<&PassNode> {
        self.pass_nodes.iter().find(|n| n.id == id)
    }
}

impl Default for RenderGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Compiled render graph with execution order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledGraph {
    pub pass_order: Vec<PassId>,
}
