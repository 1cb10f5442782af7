//! One-shot 2D texture upload.

use crate::barrier::set_image_layout;
use crate::command::{create_command_buffer, flush_command_buffer, CommandPool};
use crate::context::GpuContext;
use crate::error::{GpuError, Result};
use crate::init;
use crate::memory::{allocate, StagingBuffer};
use ash::vk;

/// Upload settings with the usual sampled-texture defaults.
#[derive(Clone)]
pub struct TextureUploadOptions {
    /// Sampler magnification/minification filter.
    pub filter: vk::Filter,
    /// Target image usage; TRANSFER_DST is added when missing.
    pub usage: vk::ImageUsageFlags,
    /// Layout the image is left in after the upload.
    pub final_layout: vk::ImageLayout,
}

impl Default for TextureUploadOptions {
    fn default() -> Self {
        Self {
            filter: vk::Filter::LINEAR,
            usage: vk::ImageUsageFlags::SAMPLED,
            final_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        }
    }
}

/// A 2D texture in device-local memory, ready for sampling.
pub struct Texture2D {
    pub image: vk::Image,
    pub layout: vk::ImageLayout,
    pub memory: vk::DeviceMemory,
    pub view: vk::ImageView,
    pub sampler: vk::Sampler,
    pub width: u32,
    pub height: u32,
    pub mip_levels: u32,
    pub layer_count: u32,
    /// Descriptor info referencing the view and sampler.
    pub descriptor: vk::DescriptorImageInfo,
}

impl Texture2D {
    /// Create a texture from raw pixel data.
    ///
    /// Copies `pixels` through a host-visible staging buffer into an
    /// optimal-tiled device-local image, transitions it to
    /// `options.final_layout`, and builds the sampler, view, and
    /// descriptor. Blocks until the copy has finished executing.
    ///
    /// # Safety
    /// All handles must be valid and the pool must belong to `gpu`'s
    /// compute queue family.
    pub unsafe fn from_memory(
        gpu: &GpuContext,
        pool: &CommandPool,
        pixels: &[u8],
        format: vk::Format,
        width: u32,
        height: u32,
        options: &TextureUploadOptions,
    ) -> Result<Self> {
        if pixels.is_empty() {
            return Err(GpuError::InvalidState(
                "texture upload with empty pixel data".to_string(),
            ));
        }

        let device = gpu.device();
        let memory_properties = gpu.memory_properties();
        let mip_levels = 1;
        let layer_count = 1;

        // Separate command buffer so the upload does not disturb other
        // recordings on the pool
        let copy_cmd = create_command_buffer(device, pool, vk::CommandBufferLevel::PRIMARY)?;

        // Stage the raw pixel data in host-visible memory
        let staging = StagingBuffer::new(device, memory_properties, pixels.len() as vk::DeviceSize)?;
        staging.write_bytes(device, pixels)?;

        let copy_region = vk::BufferImageCopy::default()
            .image_subresource(
                vk::ImageSubresourceLayers::default()
                    .aspect_mask(vk::ImageAspectFlags::COLOR)
                    .mip_level(0)
                    .base_array_layer(0)
                    .layer_count(layer_count),
            )
            .image_extent(vk::Extent3D {
                width,
                height,
                depth: 1,
            });

        // Create the optimal-tiled target image
        let image_info = init::image_create_info()
            .image_type(vk::ImageType::TYPE_2D)
            .format(format)
            .mip_levels(mip_levels)
            .array_layers(layer_count)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .extent(vk::Extent3D {
                width,
                height,
                depth: 1,
            })
            .usage(upload_usage(options.usage));

        let image = device.create_image(&image_info, None)?;

        let requirements = device.get_image_memory_requirements(image);
        let memory = allocate(
            device,
            memory_properties,
            requirements,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        )?;
        device.bind_image_memory(image, memory, 0)?;

        let subresource_range = vk::ImageSubresourceRange::default()
            .aspect_mask(vk::ImageAspectFlags::COLOR)
            .base_mip_level(0)
            .level_count(mip_levels)
            .layer_count(layer_count);

        // The image is the copy destination first
        set_image_layout(
            device,
            copy_cmd,
            image,
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            subresource_range,
        );

        device.cmd_copy_buffer_to_image(
            copy_cmd,
            staging.buffer,
            image,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            std::slice::from_ref(&copy_region),
        );

        // Hand the image over to its final layout once the copy lands
        set_image_layout(
            device,
            copy_cmd,
            image,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            options.final_layout,
            subresource_range,
        );

        flush_command_buffer(device, gpu.compute_queue(), pool, copy_cmd)?;

        // Clean up staging resources
        staging.destroy(device);

        let sampler_info = vk::SamplerCreateInfo::default()
            .mag_filter(options.filter)
            .min_filter(options.filter)
            .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
            .address_mode_u(vk::SamplerAddressMode::REPEAT)
            .address_mode_v(vk::SamplerAddressMode::REPEAT)
            .address_mode_w(vk::SamplerAddressMode::REPEAT)
            .mip_lod_bias(0.0)
            .compare_op(vk::CompareOp::NEVER)
            .min_lod(0.0)
            .max_lod(0.0)
            .max_anisotropy(1.0);

        let sampler = device.create_sampler(&sampler_info, None)?;

        let view_info = vk::ImageViewCreateInfo::default()
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .subresource_range(subresource_range)
            .image(image);

        let view = device.create_image_view(&view_info, None)?;

        let descriptor = vk::DescriptorImageInfo::default()
            .sampler(sampler)
            .image_view(view)
            .image_layout(options.final_layout);

        tracing::debug!(width, height, ?format, "uploaded 2D texture");

        Ok(Self {
            image,
            layout: options.final_layout,
            memory,
            view,
            sampler,
            width,
            height,
            mip_levels,
            layer_count,
            descriptor,
        })
    }

    /// Destroy the texture's Vulkan resources.
    ///
    /// # Safety
    /// The device must be valid and the texture must not be in use.
    pub unsafe fn destroy(&self, device: &ash::Device) {
        device.destroy_image_view(self.view, None);
        device.destroy_sampler(self.sampler, None);
        device.destroy_image(self.image, None);
        device.free_memory(self.memory, None);
    }
}

/// Image usage for an upload target; staging requires TRANSFER_DST.
fn upload_usage(usage: vk::ImageUsageFlags) -> vk::ImageUsageFlags {
    if usage.contains(vk::ImageUsageFlags::TRANSFER_DST) {
        usage
    } else {
        usage | vk::ImageUsageFlags::TRANSFER_DST
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = TextureUploadOptions::default();
        assert_eq!(options.filter, vk::Filter::LINEAR);
        assert_eq!(options.usage, vk::ImageUsageFlags::SAMPLED);
        assert_eq!(
            options.final_layout,
            vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL
        );
    }

    #[test]
    fn upload_usage_forces_transfer_dst() {
        assert_eq!(
            upload_usage(vk::ImageUsageFlags::SAMPLED),
            vk::ImageUsageFlags::SAMPLED | vk::ImageUsageFlags::TRANSFER_DST
        );
    }

    #[test]
    fn upload_usage_keeps_existing_flags() {
        let usage = vk::ImageUsageFlags::STORAGE | vk::ImageUsageFlags::TRANSFER_DST;
        assert_eq!(upload_usage(usage), usage);
    }
}
