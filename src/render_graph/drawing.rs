//! Draw filtering and sorting.
//!
//! Passes never walk the visible set themselves. They describe *which* renderers to
//! draw ([`FilteringSettings`]) and *in what order* ([`DrawingSettings`]), and the
//! render context resolves that against the frame's [`CullingResults`].

use std::cmp::Ordering;

use bitflags::bitflags;
use glam::Vec3;

use crate::scene::RenderingData;

/// Light-mode tag selecting which shader pass of a material is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderTagId(String);

impl ShaderTagId {
    /// Tag of the forward lighting pass.
    pub const UNIVERSAL_FORWARD: &'static str = "UniversalForward";

    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for ShaderTagId {
    fn default() -> Self {
        Self::new(Self::UNIVERSAL_FORWARD)
    }
}

/// Inclusive range of render queue values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderQueueRange {
    pub lower: i32,
    pub upper: i32,
}

impl RenderQueueRange {
    /// Highest queue value still considered opaque (alpha test included).
    pub const OPAQUE_MAX: i32 = 2500;
    /// Highest valid queue value.
    pub const MAX: i32 = 5000;

    pub fn new(lower: i32, upper: i32) -> Self {
        Self { lower, upper }
    }

    pub fn opaque() -> Self {
        Self::new(0, Self::OPAQUE_MAX)
    }

    pub fn transparent() -> Self {
        Self::new(Self::OPAQUE_MAX + 1, Self::MAX)
    }

    pub fn all() -> Self {
        Self::new(0, Self::MAX)
    }

    pub fn contains(&self, queue: i32) -> bool {
        queue >= self.lower && queue <= self.upper
    }
}

/// Selects which visible renderers take part in a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilteringSettings {
    pub render_queue_range: RenderQueueRange,
    /// Bit `n` enables layer `n`.
    pub layer_mask: u32,
}

impl FilteringSettings {
    pub fn new(render_queue_range: RenderQueueRange) -> Self {
        Self {
            render_queue_range,
            layer_mask: u32::MAX,
        }
    }

    pub fn with_layer_mask(mut self, layer_mask: u32) -> Self {
        self.layer_mask = layer_mask;
        self
    }

    pub fn accepts(&self, renderer: &VisibleRenderer) -> bool {
        let layer_bit = 1u32.checked_shl(renderer.layer).unwrap_or(0);
        self.render_queue_range.contains(renderer.render_queue) && self.layer_mask & layer_bit != 0
    }
}

bitflags! {
    /// How draws are ordered.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SortingCriteria: u32 {
        const SORTING_LAYER = 1 << 0;
        const RENDER_QUEUE = 1 << 1;
        const BACK_TO_FRONT = 1 << 2;
        const QUANTIZED_FRONT_TO_BACK = 1 << 3;
        const OPTIMIZE_STATE_CHANGES = 1 << 4;
        const CANVAS_ORDER = 1 << 5;

        /// Typical ordering for opaque geometry.
        const COMMON_OPAQUE = Self::SORTING_LAYER.bits()
            | Self::RENDER_QUEUE.bits()
            | Self::QUANTIZED_FRONT_TO_BACK.bits()
            | Self::OPTIMIZE_STATE_CHANGES.bits()
            | Self::CANVAS_ORDER.bits();
        /// Typical ordering for transparent geometry.
        const COMMON_TRANSPARENT = Self::SORTING_LAYER.bits()
            | Self::RENDER_QUEUE.bits()
            | Self::BACK_TO_FRONT.bits()
            | Self::OPTIMIZE_STATE_CHANGES.bits();
    }
}

/// Which shader pass to draw and how to order the draws.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingSettings {
    pub shader_tag: ShaderTagId,
    pub sorting_criteria: SortingCriteria,
    /// Distances for depth sorting are measured from here.
    pub camera_position: Vec3,
}

impl DrawingSettings {
    /// Build drawing settings for the camera being rendered.
    pub fn new(
        shader_tag: &ShaderTagId,
        rendering_data: &RenderingData,
        sorting_criteria: SortingCriteria,
    ) -> Self {
        Self {
            shader_tag: shader_tag.clone(),
            sorting_criteria,
            camera_position: rendering_data.camera_data.camera.position,
        }
    }
}

/// A renderer that survived culling this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleRenderer {
    pub id: u32,
    pub render_queue: i32,
    pub layer: u32,
    pub sorting_layer: i32,
    pub material_id: u32,
    pub world_position: Vec3,
    /// Shader passes the renderer's material provides.
    pub shader_tags: Vec<ShaderTagId>,
}

impl VisibleRenderer {
    /// Opaque renderer on layer 0 drawn with the forward tag.
    pub fn new(id: u32, render_queue: i32, world_position: Vec3) -> Self {
        Self {
            id,
            render_queue,
            layer: 0,
            sorting_layer: 0,
            material_id: 0,
            world_position,
            shader_tags: vec![ShaderTagId::default()],
        }
    }

    pub fn with_material(mut self, material_id: u32) -> Self {
        self.material_id = material_id;
        self
    }

    pub fn with_layer(mut self, layer: u32) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_sorting_layer(mut self, sorting_layer: i32) -> Self {
        self.sorting_layer = sorting_layer;
        self
    }

    pub fn with_shader_tags(mut self, tags: Vec<ShaderTagId>) -> Self {
        self.shader_tags = tags;
        self
    }
}

/// Visible set produced by the host's culling step.
#[derive(Debug, Clone, Default)]
pub struct CullingResults {
    pub visible_renderers: Vec<VisibleRenderer>,
}

/// Depth bucket size for quantized front-to-back sorting, in world units.
const DEPTH_QUANTIZATION: f32 = 0.25;

impl CullingResults {
    pub fn new(visible_renderers: Vec<VisibleRenderer>) -> Self {
        Self { visible_renderers }
    }

    /// Select and order the renderers a draw call would submit.
    pub fn prepare_draws(
        &self,
        drawing: &DrawingSettings,
        filtering: &FilteringSettings,
    ) -> Vec<&VisibleRenderer> {
        let mut draws: Vec<&VisibleRenderer> = self
            .visible_renderers
            .iter()
            .filter(|r| filtering.accepts(r))
            .filter(|r| r.shader_tags.contains(&drawing.shader_tag))
            .collect();

        let criteria = drawing.sorting_criteria;
        let eye = drawing.camera_position;
        draws.sort_by(|a, b| compare_renderers(a, b, criteria, eye));

        log::trace!(
            "Prepared {} of {} visible renderers for tag {}",
            draws.len(),
            self.visible_renderers.len(),
            drawing.shader_tag.name()
        );
        draws
    }
}

fn compare_renderers(
    a: &VisibleRenderer,
    b: &VisibleRenderer,
    criteria: SortingCriteria,
    eye: Vec3,
) -> Ordering {
    let mut order = Ordering::Equal;

    if criteria.contains(SortingCriteria::SORTING_LAYER) {
        order = order.then(a.sorting_layer.cmp(&b.sorting_layer));
    }
    if criteria.contains(SortingCriteria::RENDER_QUEUE) {
        order = order.then(a.render_queue.cmp(&b.render_queue));
    }

    let dist_a = a.world_position.distance(eye);
    let dist_b = b.world_position.distance(eye);
    if criteria.contains(SortingCriteria::BACK_TO_FRONT) {
        order = order.then(dist_b.total_cmp(&dist_a));
    } else if criteria.contains(SortingCriteria::QUANTIZED_FRONT_TO_BACK) {
        let bucket_a = (dist_a / DEPTH_QUANTIZATION) as u32;
        let bucket_b = (dist_b / DEPTH_QUANTIZATION) as u32;
        order = order.then(bucket_a.cmp(&bucket_b));
    }

    if criteria.contains(SortingCriteria::OPTIMIZE_STATE_CHANGES) {
        order = order.then(a.material_id.cmp(&b.material_id));
    }

    order.then(a.id.cmp(&b.id))
}
