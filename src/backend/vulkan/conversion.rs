//! Type conversions between renderer types and Vulkan types.

use ash::vk;

use crate::backend::traits::{BackendError, BackendResult};
use crate::backend::types::{LoadOp, StoreOp, TextureFormat};
use crate::render_graph::attachment::AttachmentDescriptor;
use crate::render_graph::scope::{DepthAccess, RenderPassDescriptor, SubpassDescriptor};

/// Convert TextureFormat to Vulkan format.
pub fn convert_texture_format(format: TextureFormat) -> vk::Format {
    match format {
        TextureFormat::Rgba8Unorm => vk::Format::R8G8B8A8_UNORM,
        TextureFormat::Rgba8UnormSrgb => vk::Format::R8G8B8A8_SRGB,
        TextureFormat::Bgra8Unorm => vk::Format::B8G8R8A8_UNORM,
        TextureFormat::Bgra8UnormSrgb => vk::Format::B8G8R8A8_SRGB,
        TextureFormat::Rg11b10Float => vk::Format::B10G11R11_UFLOAT_PACK32,
        TextureFormat::Rgba16Float => vk::Format::R16G16B16A16_SFLOAT,
        TextureFormat::Rgba32Float => vk::Format::R32G32B32A32_SFLOAT,
        TextureFormat::Depth32Float => vk::Format::D32_SFLOAT,
        TextureFormat::Depth24PlusStencil8 => vk::Format::D24_UNORM_S8_UINT,
    }
}

pub fn convert_load_op(op: LoadOp) -> vk::AttachmentLoadOp {
    match op {
        LoadOp::Load => vk::AttachmentLoadOp::LOAD,
        LoadOp::Clear => vk::AttachmentLoadOp::CLEAR,
        LoadOp::DontCare => vk::AttachmentLoadOp::DONT_CARE,
    }
}

pub fn convert_store_op(op: StoreOp) -> vk::AttachmentStoreOp {
    match op {
        StoreOp::Store => vk::AttachmentStoreOp::STORE,
        StoreOp::Discard => vk::AttachmentStoreOp::DONT_CARE,
    }
}

/// Convert an MSAA sample count to Vulkan sample count flags.
///
/// Counts are checked by `RenderPassDescriptor::validate` before conversion.
pub fn convert_sample_count(count: u32) -> vk::SampleCountFlags {
    match count {
        2 => vk::SampleCountFlags::TYPE_2,
        4 => vk::SampleCountFlags::TYPE_4,
        8 => vk::SampleCountFlags::TYPE_8,
        16 => vk::SampleCountFlags::TYPE_16,
        32 => vk::SampleCountFlags::TYPE_32,
        64 => vk::SampleCountFlags::TYPE_64,
        _ => vk::SampleCountFlags::TYPE_1,
    }
}

/// Layout an attachment lives in between subpasses and across frames.
fn attachment_layout(format: TextureFormat) -> vk::ImageLayout {
    if format.is_depth() {
        vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL
    } else {
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL
    }
}

/// Describe one attachment slot.
///
/// Loaded attachments must arrive in their attachment layout. Everything else
/// starts undefined since its previous contents are not needed.
pub fn convert_attachment(
    attachment: &AttachmentDescriptor,
    sample_count: u32,
) -> vk::AttachmentDescription {
    let layout = attachment_layout(attachment.format);
    let (stencil_load_op, stencil_store_op) = if attachment.format.has_stencil() {
        (
            convert_load_op(attachment.load_op),
            convert_store_op(attachment.store_op),
        )
    } else {
        (
            vk::AttachmentLoadOp::DONT_CARE,
            vk::AttachmentStoreOp::DONT_CARE,
        )
    };

    vk::AttachmentDescription {
        format: convert_texture_format(attachment.format),
        samples: convert_sample_count(sample_count),
        load_op: convert_load_op(attachment.load_op),
        store_op: convert_store_op(attachment.store_op),
        stencil_load_op,
        stencil_store_op,
        initial_layout: match attachment.load_op {
            LoadOp::Load => layout,
            LoadOp::Clear | LoadOp::DontCare => vk::ImageLayout::UNDEFINED,
        },
        final_layout: layout,
        ..Default::default()
    }
}

/// Clear value for an attachment slot. Unused unless the slot clears.
pub fn convert_clear_value(attachment: &AttachmentDescriptor) -> vk::ClearValue {
    if attachment.is_depth() {
        vk::ClearValue {
            depth_stencil: vk::ClearDepthStencilValue {
                depth: attachment.clear_depth,
                stencil: attachment.clear_stencil,
            },
        }
    } else {
        vk::ClearValue {
            color: vk::ClearColorValue {
                float32: attachment.clear_color.to_array(),
            },
        }
    }
}

/// Attachment references of a single subpass.
#[derive(Debug, Clone, Default)]
pub struct SubpassReferences {
    pub colors: Vec<vk::AttachmentReference>,
    pub inputs: Vec<vk::AttachmentReference>,
    pub depth: Option<vk::AttachmentReference>,
}

impl SubpassReferences {
    fn from_descriptor(
        subpass: &SubpassDescriptor,
        formats: &[TextureFormat],
        depth_attachment_index: Option<usize>,
    ) -> Self {
        let colors = subpass
            .color_attachments
            .iter()
            .map(|&index| vk::AttachmentReference {
                attachment: index as u32,
                layout: if subpass.input_attachments.contains(&index) {
                    vk::ImageLayout::GENERAL
                } else {
                    vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL
                },
            })
            .collect();

        let inputs = subpass
            .input_attachments
            .iter()
            .map(|&index| {
                let layout = if formats[index].is_depth() {
                    vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL
                } else if subpass.color_attachments.contains(&index) {
                    vk::ImageLayout::GENERAL
                } else {
                    vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL
                };
                vk::AttachmentReference {
                    attachment: index as u32,
                    layout,
                }
            })
            .collect();

        let depth = match (subpass.effective_depth(depth_attachment_index), depth_attachment_index) {
            (DepthAccess::ReadWrite, Some(index)) => Some(vk::AttachmentReference {
                attachment: index as u32,
                layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
            }),
            (DepthAccess::ReadOnly, Some(index)) => Some(vk::AttachmentReference {
                attachment: index as u32,
                layout: vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL,
            }),
            _ => None,
        };

        Self {
            colors,
            inputs,
            depth,
        }
    }

    /// Vulkan subpass description borrowing these references.
    pub fn description(&self) -> vk::SubpassDescription<'_> {
        let description = vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&self.colors)
            .input_attachments(&self.inputs);

        match &self.depth {
            Some(depth) => description.depth_stencil_attachment(depth),
            None => description,
        }
    }
}

/// Everything needed to create a `vk::RenderPass` for a pass and its subpasses.
#[derive(Debug, Clone)]
pub struct VulkanRenderPassLayout {
    pub attachments: Vec<vk::AttachmentDescription>,
    pub subpasses: Vec<SubpassReferences>,
    pub dependencies: Vec<vk::SubpassDependency>,
}

impl VulkanRenderPassLayout {
    pub fn from_descriptor(
        desc: &RenderPassDescriptor,
        subpasses: &[SubpassDescriptor],
    ) -> BackendResult<Self> {
        desc.validate()?;
        if subpasses.is_empty() {
            return Err(BackendError::RenderPassCreationFailed(
                "render pass has no subpasses".to_string(),
            ));
        }

        let formats: Vec<TextureFormat> = desc.attachments.iter().map(|a| a.format).collect();
        for subpass in subpasses {
            subpass.validate(&formats, desc.depth_attachment_index)?;
        }

        let attachments = desc
            .attachments
            .iter()
            .map(|attachment| convert_attachment(attachment, desc.sample_count))
            .collect();

        let subpass_refs = subpasses
            .iter()
            .map(|subpass| {
                SubpassReferences::from_descriptor(subpass, &formats, desc.depth_attachment_index)
            })
            .collect();

        Ok(Self {
            attachments,
            subpasses: subpass_refs,
            dependencies: subpass_dependencies(subpasses.len() as u32),
        })
    }

    /// Create the render pass on `device`.
    pub fn create(&self, device: &ash::Device) -> BackendResult<vk::RenderPass> {
        let descriptions: Vec<vk::SubpassDescription> =
            self.subpasses.iter().map(SubpassReferences::description).collect();

        let render_pass_info = vk::RenderPassCreateInfo::default()
            .attachments(&self.attachments)
            .subpasses(&descriptions)
            .dependencies(&self.dependencies);

        unsafe {
            device
                .create_render_pass(&render_pass_info, None)
                .map_err(|e| BackendError::RenderPassCreationFailed(e.to_string()))
        }
    }
}

/// External dependency into the first subpass, then a by-region dependency
/// between each pair of consecutive subpasses so later subpasses can read
/// earlier outputs as input attachments.
pub fn subpass_dependencies(subpass_count: u32) -> Vec<vk::SubpassDependency> {
    let attachment_stages = vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
        | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS
        | vk::PipelineStageFlags::LATE_FRAGMENT_TESTS;
    let attachment_writes =
        vk::AccessFlags::COLOR_ATTACHMENT_WRITE | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE;

    let mut dependencies = vec![vk::SubpassDependency {
        src_subpass: vk::SUBPASS_EXTERNAL,
        dst_subpass: 0,
        src_stage_mask: attachment_stages,
        dst_stage_mask: attachment_stages,
        src_access_mask: vk::AccessFlags::empty(),
        dst_access_mask: attachment_writes,
        ..Default::default()
    }];

    for dst in 1..subpass_count {
        dependencies.push(vk::SubpassDependency {
            src_subpass: dst - 1,
            dst_subpass: dst,
            src_stage_mask: attachment_stages,
            dst_stage_mask: vk::PipelineStageFlags::FRAGMENT_SHADER | attachment_stages,
            src_access_mask: attachment_writes,
            dst_access_mask: vk::AccessFlags::INPUT_ATTACHMENT_READ
                | vk::AccessFlags::COLOR_ATTACHMENT_READ
                | vk::AccessFlags::COLOR_ATTACHMENT_WRITE
                | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ,
            dependency_flags: vk::DependencyFlags::BY_REGION,
        });
    }

    dependencies
}
