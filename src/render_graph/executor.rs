//! Render graph executor

use crate::backend::traits::*;
use crate::render_graph::graph::*;
use crate::scene::RenderingData;

/// Executor for running the compiled render graph once per frame
#[derive(Debug, Default)]
pub struct RenderGraphExecutor {
    frame_index: u64,
}

impl RenderGraphExecutor {
    pub fn new() -> Self {
        Self { frame_index: 0 }
    }

    /// Number of frames executed so far
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Execute the render graph
    ///
    /// Passes run in compiled order. The first failing pass aborts the frame and its
    /// error is returned; the passes after it do not run.
    pub fn execute(
        &mut self,
        graph: &mut RenderGraph,
        compiled: &CompiledGraph,
        ctx: &mut dyn RenderContext,
        rendering_data: &RenderingData,
    ) -> BackendResult<()> {
        log::trace!(
            "Frame {}: executing {} passes",
            self.frame_index,
            compiled.pass_order.len()
        );

        for &pass_id in &compiled.pass_order {
            let Some(pass) = graph.get_pass_mut(pass_id) else {
                log::warn!("Compiled graph references missing pass {:?}", pass_id);
                continue;
            };

            if let Err(err) = pass.execute(ctx, rendering_data) {
                log::error!("Pass '{}' failed: {}", pass.name(), err);
                return Err(err);
            }
        }

        self.frame_index += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::RecordingContext;
    use crate::render_graph::pass::{RenderPass, RenderPassEvent};
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct LoggingPass {
        name: String,
        event: RenderPassEvent,
        fail: bool,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl LoggingPass {
        fn new(name: &str, event: RenderPassEvent, log: &Rc<RefCell<Vec<String>>>) -> Self {
            Self {
                name: name.to_string(),
                event,
                fail: false,
                log: Rc::clone(log),
            }
        }
    }

    impl RenderPass for LoggingPass {
        fn name(&self) -> &str {
            &self.name
        }

        fn event(&self) -> RenderPassEvent {
            self.event
        }

        fn execute(
            &mut self,
            _ctx: &mut dyn RenderContext,
            _rendering_data: &RenderingData,
        ) -> BackendResult<()> {
            self.log.borrow_mut().push(self.name.clone());
            if self.fail {
                Err(BackendError::DeviceLost)
            } else {
                Ok(())
            }
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_passes_run_in_event_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut graph = RenderGraph::new();
        graph.add_pass(LoggingPass::new(
            "post",
            RenderPassEvent::BeforeRenderingPostProcessing,
            &log,
        ));
        graph.add_pass(LoggingPass::new(
            "main",
            RenderPassEvent::BeforeRenderingOpaques,
            &log,
        ));
        graph.add_pass(LoggingPass::new(
            "main-overlay",
            RenderPassEvent::BeforeRenderingOpaques,
            &log,
        ));

        let compiled = graph.compile();
        let mut executor = RenderGraphExecutor::new();
        let mut ctx = RecordingContext::new();
        executor
            .execute(&mut graph, &compiled, &mut ctx, &RenderingData::default())
            .unwrap();

        assert_eq!(*log.borrow(), vec!["main", "main-overlay", "post"]);
        assert_eq!(executor.frame_index(), 1);
    }

    #[test]
    fn test_failure_aborts_frame() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut graph = RenderGraph::new();
        let mut failing = LoggingPass::new("fails", RenderPassEvent::BeforeRendering, &log);
        failing.fail = true;
        graph.add_pass(failing);
        graph.add_pass(LoggingPass::new("later", RenderPassEvent::AfterRendering, &log));

        let compiled = graph.compile();
        let mut executor = RenderGraphExecutor::new();
        let mut ctx = RecordingContext::new();
        let result = executor.execute(&mut graph, &compiled, &mut ctx, &RenderingData::default());

        assert_eq!(result, Err(BackendError::DeviceLost));
        assert_eq!(*log.borrow(), vec!["fails"]);
        assert_eq!(executor.frame_index(), 0);
    }

    #[test]
    fn test_pass_lookup_and_downcast() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut graph = RenderGraph::new();
        let id = graph.add_pass(LoggingPass::new("main", RenderPassEvent::AfterRenderingOpaques, &log));

        assert_eq!(graph.get_pass_node(id).map(|n| n.event), Some(RenderPassEvent::AfterRenderingOpaques));
        let pass = graph.get_pass(id).unwrap();
        assert!(pass.as_any().downcast_ref::<LoggingPass>().is_some());
    }
}
