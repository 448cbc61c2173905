//! Integration tests for the main render pass.
//!
//! Every test runs the pass against the recording context and checks the
//! command stream it produces: scope nesting, attachment setup, subpass indices
//! and the draws issued in each subpass.

use std::sync::Arc;

use glam::{Mat4, Vec3, Vec4};
use rstest::rstest;

use subpass_renderer::backend::{
    BackendError, RecordedCommand, RecordingContext, RenderTargetDescriptor, RenderTargetId, TextureFormat,
    TextureViewHandle,
};
use subpass_renderer::backend::{LoadOp, StoreOp};
use subpass_renderer::pipeline::main_pass::{CAUSTICS_COMMAND_BUFFER, DEPTH_ATTACHMENT_INDEX};
use subpass_renderer::render_graph::{
    CullingResults, DepthAccess, RenderGraph, RenderGraphExecutor, RenderQueueRange,
    ShaderTagId, SortingCriteria, VisibleRenderer,
};
use subpass_renderer::resources::Material;
use subpass_renderer::{Camera, MainPassConfig, MainRenderPass, RenderPass, RenderPassEvent, RenderingData};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn background() -> Vec4 {
    Vec4::new(0.05, 0.1, 0.2, 0.0)
}

fn rendering_data() -> RenderingData {
    let camera = Camera::new(Vec3::ZERO).with_background_color(background());
    let target = RenderTargetDescriptor {
        width: 800,
        height: 600,
        ..Default::default()
    };

    RenderingData::new(camera, target).with_cull_results(CullingResults::new(vec![
        VisibleRenderer::new(1, 2000, Vec3::new(0.0, 0.0, -20.0)),
        VisibleRenderer::new(2, 2000, Vec3::new(0.0, 0.0, -3.0)),
        VisibleRenderer::new(3, 3000, Vec3::new(0.0, 0.0, -1.0)),
        VisibleRenderer::new(4, 2000, Vec3::new(0.0, 0.0, -5.0))
            .with_shader_tags(vec![ShaderTagId::new("ShadowCaster")]),
    ]))
}

fn record_frame(pass: &mut MainRenderPass) -> Vec<RecordedCommand> {
    init_logger();
    let mut ctx = RecordingContext::new();
    pass.execute(&mut ctx, &rendering_data())
        .expect("main pass should record");
    assert!(!ctx.is_in_render_pass());
    ctx.take_commands()
}

fn main_pass() -> MainRenderPass {
    MainRenderPass::new(
        RenderPassEvent::BeforeRenderingOpaques,
        Arc::new(Material::caustics()),
    )
}

// ============================================================================
// Command Stream
// ============================================================================

#[test]
fn test_command_order() {
    let commands = record_frame(&mut main_pass());
    let kinds: Vec<&str> = commands.iter().map(RecordedCommand::kind).collect();

    assert_eq!(
        kinds,
        vec![
            "begin_render_pass",
            "begin_subpass",
            "draw_renderers",
            "draw_skybox",
            "end_subpass",
            "begin_subpass",
            "draw_mesh",
            "end_subpass",
            "end_render_pass",
        ]
    );
}

#[test]
fn test_render_pass_attachments() {
    let commands = record_frame(&mut main_pass());
    let RecordedCommand::BeginRenderPass {
        width,
        height,
        sample_count,
        attachments,
        depth_attachment_index,
        ..
    } = &commands[0]
    else {
        panic!("expected BeginRenderPass, got {:?}", commands[0]);
    };

    assert_eq!((*width, *height), (800, 600));
    assert_eq!(*sample_count, 1);
    assert_eq!(attachments.len(), 2);
    assert_eq!(*depth_attachment_index, Some(DEPTH_ATTACHMENT_INDEX));

    let color = &attachments[0];
    assert_eq!(color.format, TextureFormat::Rg11b10Float);
    assert_eq!(color.load_op, LoadOp::Clear);
    assert_eq!(color.store_op, StoreOp::Store);
    assert_eq!(color.clear_color, background());
    assert_eq!(color.target, Some(RenderTargetId::CameraTarget));

    let depth = &attachments[1];
    assert!(depth.format.is_depth());
    assert_eq!(depth.target, None);
    assert_eq!(depth.store_op, StoreOp::Discard);
}

#[test]
fn test_designated_color_target() {
    let target = RenderTargetId::Texture(TextureViewHandle(42));
    let mut pass = main_pass();
    pass.set_color_target(target);

    let commands = record_frame(&mut pass);
    let RecordedCommand::BeginRenderPass { attachments, .. } = &commands[0] else {
        panic!("expected BeginRenderPass");
    };
    assert_eq!(attachments[0].target, Some(target));
}

#[test]
fn test_subpass_descriptors() {
    let commands = record_frame(&mut main_pass());
    let subpasses: Vec<_> = commands
        .iter()
        .filter_map(|cmd| match cmd {
            RecordedCommand::BeginSubpass { index, desc } => Some((*index, desc.clone())),
            _ => None,
        })
        .collect();

    assert_eq!(subpasses.len(), 2);

    let (index, opaque) = &subpasses[0];
    assert_eq!(*index, 0);
    assert_eq!(opaque.color_attachments, vec![0]);
    assert!(opaque.input_attachments.is_empty());
    assert_eq!(opaque.depth, DepthAccess::ReadWrite);

    let (index, caustics) = &subpasses[1];
    assert_eq!(*index, 1);
    assert_eq!(caustics.color_attachments, vec![0]);
    assert_eq!(caustics.input_attachments, vec![1]);
    assert_eq!(caustics.depth, DepthAccess::None);
}

// ============================================================================
// Draws
// ============================================================================

#[test]
fn test_opaque_draws_sorted_front_to_back() {
    let commands = record_frame(&mut main_pass());
    let draw = commands
        .iter()
        .find(|cmd| cmd.kind() == "draw_renderers")
        .expect("draw_renderers recorded");

    let RecordedCommand::DrawRenderers {
        subpass,
        renderer_ids,
        shader_tag,
        sorting_criteria,
        filtering,
    } = draw
    else {
        unreachable!();
    };

    assert_eq!(*subpass, 0);
    // Transparent (3) and shadow-only (4) renderers are filtered out.
    assert_eq!(renderer_ids, &vec![2, 1]);
    assert_eq!(shader_tag.name(), "UniversalForward");
    assert_eq!(*sorting_criteria, SortingCriteria::COMMON_OPAQUE);
    assert_eq!(filtering.render_queue_range, RenderQueueRange::opaque());
}

#[test]
fn test_skybox_uses_camera() {
    let commands = record_frame(&mut main_pass());
    assert!(commands.iter().any(|cmd| matches!(
        cmd,
        RecordedCommand::DrawSkybox { subpass: 0, camera } if camera == "Main Camera"
    )));
}

#[test]
fn test_caustics_fullscreen_draw() {
    let commands = record_frame(&mut main_pass());
    let draws: Vec<_> = commands
        .iter()
        .filter(|cmd| cmd.kind() == "draw_mesh")
        .collect();
    assert_eq!(draws.len(), 1);

    let RecordedCommand::DrawMesh {
        subpass,
        command_buffer,
        mesh,
        material,
        transform,
    } = draws[0]
    else {
        unreachable!();
    };
    assert_eq!(*subpass, 1);
    assert_eq!(command_buffer, CAUSTICS_COMMAND_BUFFER);
    assert_eq!(mesh, "fullscreen_quad");
    assert_eq!(material, "caustics");
    assert_eq!(*transform, Mat4::IDENTITY);
}

// ============================================================================
// Configuration
// ============================================================================

#[rstest]
#[case::single_sample(1)]
#[case::msaa_4x(4)]
#[case::msaa_64x(64)]
fn test_sample_count_from_config(#[case] sample_count: u32) {
    let config = MainPassConfig {
        sample_count,
        ..Default::default()
    };
    let mut pass = MainRenderPass::with_config(config, Arc::new(Material::caustics()));

    let commands = record_frame(&mut pass);
    assert!(matches!(
        &commands[0],
        RecordedCommand::BeginRenderPass { sample_count: s, .. } if *s == sample_count
    ));
}

#[rstest]
#[case::zero(0)]
#[case::not_power_of_two(3)]
#[case::above_max(128)]
fn test_unsupported_sample_count_rejected(#[case] sample_count: u32) {
    init_logger();
    let config = MainPassConfig {
        sample_count,
        ..Default::default()
    };
    let mut pass = MainRenderPass::with_config(config, Arc::new(Material::caustics()));
    let mut ctx = RecordingContext::new();

    assert_eq!(
        pass.execute(&mut ctx, &rendering_data()),
        Err(BackendError::InvalidSampleCount(sample_count))
    );
    assert!(ctx.commands().is_empty());
}

#[rstest]
#[case::hdr_half(TextureFormat::Rgba16Float, TextureFormat::Depth32Float)]
#[case::packed(TextureFormat::Rg11b10Float, TextureFormat::Depth24PlusStencil8)]
fn test_formats_from_config(#[case] color: TextureFormat, #[case] depth: TextureFormat) {
    let config = MainPassConfig {
        color_format: color,
        depth_format: depth,
        ..Default::default()
    };
    let mut pass = MainRenderPass::with_config(config, Arc::new(Material::caustics()));

    let commands = record_frame(&mut pass);
    let RecordedCommand::BeginRenderPass { attachments, .. } = &commands[0] else {
        panic!("expected BeginRenderPass");
    };
    assert_eq!(attachments[0].format, color);
    assert_eq!(attachments[1].format, depth);
}

#[test]
fn test_invalid_depth_format_rejected() {
    init_logger();
    let config = MainPassConfig {
        depth_format: TextureFormat::Rgba8Unorm,
        ..Default::default()
    };
    let mut pass = MainRenderPass::with_config(config, Arc::new(Material::caustics()));
    let mut ctx = RecordingContext::new();

    assert!(pass.execute(&mut ctx, &rendering_data()).is_err());
    assert!(ctx.commands().is_empty());
}

// ============================================================================
// Scheduling
// ============================================================================

#[rstest]
#[case::before_opaques(RenderPassEvent::BeforeRenderingOpaques, 1)]
#[case::after_skybox(RenderPassEvent::AfterRenderingSkybox, 2)]
fn test_scheduled_by_event(#[case] event: RenderPassEvent, #[case] expected_position: usize) {
    init_logger();
    let material = Arc::new(Material::caustics());
    let mut graph = RenderGraph::new();
    let shadows = graph.add_pass(MainRenderPass::new(
        RenderPassEvent::BeforeRenderingShadows,
        Arc::clone(&material),
    ));
    let post = graph.add_pass(MainRenderPass::new(
        RenderPassEvent::BeforeRenderingPostProcessing,
        Arc::clone(&material),
    ));
    let main = graph.add_pass(MainRenderPass::new(event, Arc::clone(&material)));
    graph.add_pass(MainRenderPass::new(
        RenderPassEvent::AfterRenderingOpaques,
        Arc::clone(&material),
    ));
    let compiled = graph.compile();

    assert_eq!(compiled.pass_order.first(), Some(&shadows));
    assert_eq!(compiled.pass_order[expected_position], main);
    assert_eq!(compiled.pass_order.last(), Some(&post));

    let mut ctx = RecordingContext::new();
    let mut executor = RenderGraphExecutor::new();
    executor
        .execute(&mut graph, &compiled, &mut ctx, &rendering_data())
        .unwrap();

    let passes = ctx
        .commands()
        .iter()
        .filter(|cmd| cmd.kind() == "begin_render_pass")
        .count();
    assert_eq!(passes, 4);
    assert_eq!(executor.frame_index(), 1);
}

#[test]
fn test_end_of_pass_failure_aborts_frame() {
    init_logger();
    let material = Arc::new(Material::caustics());
    let mut graph = RenderGraph::new();
    graph.add_pass(MainRenderPass::new(
        RenderPassEvent::BeforeRenderingOpaques,
        Arc::clone(&material),
    ));
    graph.add_pass(MainRenderPass::new(
        RenderPassEvent::AfterRenderingSkybox,
        Arc::clone(&material),
    ));
    let compiled = graph.compile();

    let mut ctx = RecordingContext::new();
    ctx.fail_next_end_render_pass(BackendError::RenderPassCreationFailed("no memory".into()));
    let mut executor = RenderGraphExecutor::new();

    assert_eq!(
        executor.execute(&mut graph, &compiled, &mut ctx, &rendering_data()),
        Err(BackendError::RenderPassCreationFailed("no memory".into()))
    );
    assert_eq!(executor.frame_index(), 0);
    assert!(!ctx.is_in_render_pass());

    let passes = ctx
        .commands()
        .iter()
        .filter(|cmd| cmd.kind() == "begin_render_pass")
        .count();
    assert_eq!(passes, 1);
}
