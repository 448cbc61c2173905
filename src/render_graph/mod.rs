//! Render Graph System
//!
//! Passes are scheduled by [`RenderPassEvent`] and record their work through a
//! [`RenderContext`](crate::backend::RenderContext). Native render passes with
//! subpasses are opened through the scoped API in [`scope`].

pub mod attachment;
pub mod command;
pub mod drawing;
pub mod executor;
pub mod graph;
pub mod pass;
pub mod scope;

pub use attachment::*;
pub use command::*;
pub use drawing::*;
pub use executor::*;
pub use graph::*;
pub use pass::*;
pub use scope::*;
