//! Image layout transition barriers.

use crate::init;
use ash::vk;

/// Access masks for a layout transition.
///
/// The source mask covers work that must finish on the old layout before
/// the transition; the destination mask gates work in the new layout.
/// Layouts outside the table map to empty masks.
pub fn transition_masks(
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
) -> (vk::AccessFlags, vk::AccessFlags) {
    let mut src_access = match old_layout {
        // Undefined is only valid as an initial layout, nothing to wait on
        vk::ImageLayout::UNDEFINED => vk::AccessFlags::empty(),
        // Preserve host writes into preinitialized linear images
        vk::ImageLayout::PREINITIALIZED => vk::AccessFlags::HOST_WRITE,
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL => vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
        vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL => {
            vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE
        }
        vk::ImageLayout::TRANSFER_SRC_OPTIMAL => vk::AccessFlags::TRANSFER_READ,
        vk::ImageLayout::TRANSFER_DST_OPTIMAL => vk::AccessFlags::TRANSFER_WRITE,
        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL => vk::AccessFlags::SHADER_READ,
        _ => vk::AccessFlags::empty(),
    };

    let dst_access = match new_layout {
        vk::ImageLayout::TRANSFER_DST_OPTIMAL => vk::AccessFlags::TRANSFER_WRITE,
        vk::ImageLayout::TRANSFER_SRC_OPTIMAL => vk::AccessFlags::TRANSFER_READ,
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL => vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
        vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL => {
            vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE
        }
        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL => {
            // Reads in the new layout must see pending host or copy writes
            // even when the old layout carries no access of its own
            if src_access.is_empty() {
                src_access = vk::AccessFlags::HOST_WRITE | vk::AccessFlags::TRANSFER_WRITE;
            }
            vk::AccessFlags::SHADER_READ
        }
        _ => vk::AccessFlags::empty(),
    };

    (src_access, dst_access)
}

/// Record an image memory barrier switching `image` between layouts.
///
/// # Safety
/// The command buffer must be recording and all handles must be valid.
pub unsafe fn set_image_layout_stages(
    device: &ash::Device,
    cmd: vk::CommandBuffer,
    image: vk::Image,
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
    subresource_range: vk::ImageSubresourceRange,
    src_stage_mask: vk::PipelineStageFlags,
    dst_stage_mask: vk::PipelineStageFlags,
) {
    let (src_access_mask, dst_access_mask) = transition_masks(old_layout, new_layout);

    let barrier = init::image_memory_barrier()
        .old_layout(old_layout)
        .new_layout(new_layout)
        .src_access_mask(src_access_mask)
        .dst_access_mask(dst_access_mask)
        .image(image)
        .subresource_range(subresource_range);

    device.cmd_pipeline_barrier(
        cmd,
        src_stage_mask,
        dst_stage_mask,
        vk::DependencyFlags::empty(),
        &[],
        &[],
        std::slice::from_ref(&barrier),
    );
}

/// [`set_image_layout_stages`] with both stage masks set to ALL_COMMANDS.
///
/// # Safety
/// The command buffer must be recording and all handles must be valid.
pub unsafe fn set_image_layout(
    device: &ash::Device,
    cmd: vk::CommandBuffer,
    image: vk::Image,
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
    subresource_range: vk::ImageSubresourceRange,
) {
    set_image_layout_stages(
        device,
        cmd,
        image,
        old_layout,
        new_layout,
        subresource_range,
        vk::PipelineStageFlags::ALL_COMMANDS,
        vk::PipelineStageFlags::ALL_COMMANDS,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_to_transfer_dst() {
        let (src, dst) = transition_masks(
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        );
        assert_eq!(src, vk::AccessFlags::empty());
        assert_eq!(dst, vk::AccessFlags::TRANSFER_WRITE);
    }

    #[test]
    fn transfer_dst_to_shader_read() {
        let (src, dst) = transition_masks(
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        );
        assert_eq!(src, vk::AccessFlags::TRANSFER_WRITE);
        assert_eq!(dst, vk::AccessFlags::SHADER_READ);
    }

    #[test]
    fn shader_read_with_empty_source_gains_write_waits() {
        let (src, dst) = transition_masks(
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        );
        assert_eq!(
            src,
            vk::AccessFlags::HOST_WRITE | vk::AccessFlags::TRANSFER_WRITE
        );
        assert_eq!(dst, vk::AccessFlags::SHADER_READ);
    }

    #[test]
    fn preinitialized_source_waits_on_host_writes() {
        let (src, _) = transition_masks(
            vk::ImageLayout::PREINITIALIZED,
            vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
        );
        assert_eq!(src, vk::AccessFlags::HOST_WRITE);
    }

    #[test]
    fn attachment_transitions() {
        let (src, dst) = transition_masks(
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        );
        assert_eq!(src, vk::AccessFlags::COLOR_ATTACHMENT_WRITE);
        assert_eq!(dst, vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE);
    }

    #[test]
    fn unhandled_layouts_map_to_empty() {
        let (src, dst) = transition_masks(
            vk::ImageLayout::GENERAL,
            vk::ImageLayout::PRESENT_SRC_KHR,
        );
        assert_eq!(src, vk::AccessFlags::empty());
        assert_eq!(dst, vk::AccessFlags::empty());
    }
}
