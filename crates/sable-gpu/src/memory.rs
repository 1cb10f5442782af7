//! Device memory selection and staging buffers.

use crate::error::{GpuError, Result};
use crate::init;
use ash::vk;

/// Find the index of a memory type with all requested property bits set.
///
/// `type_bits` is the mask from `VkMemoryRequirements`: bit `i` set means
/// memory type `i` is usable for the resource. The first qualifying index
/// wins.
pub fn find_memory_type_index(
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
    type_bits: u32,
    properties: vk::MemoryPropertyFlags,
) -> Option<u32> {
    let mut type_bits = type_bits;
    for i in 0..memory_properties.memory_type_count {
        if (type_bits & 1) == 1
            && memory_properties.memory_types[i as usize]
                .property_flags
                .contains(properties)
        {
            return Some(i);
        }
        type_bits >>= 1;
    }

    None
}

/// Like [`find_memory_type_index`], but no match is an error.
pub fn memory_type_index(
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
    type_bits: u32,
    properties: vk::MemoryPropertyFlags,
) -> Result<u32> {
    find_memory_type_index(memory_properties, type_bits, properties).ok_or(
        GpuError::NoSuitableMemoryType {
            type_bits,
            properties,
        },
    )
}

/// Allocate device memory satisfying the given requirements.
///
/// # Safety
/// The device must be valid and the memory properties must belong to its
/// physical device.
pub unsafe fn allocate(
    device: &ash::Device,
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
    requirements: vk::MemoryRequirements,
    properties: vk::MemoryPropertyFlags,
) -> Result<vk::DeviceMemory> {
    let alloc_info = init::memory_allocate_info()
        .allocation_size(requirements.size)
        .memory_type_index(memory_type_index(
            memory_properties,
            requirements.memory_type_bits,
            properties,
        )?);

    let memory = device.allocate_memory(&alloc_info, None)?;
    Ok(memory)
}

/// Host-visible staging buffer for one-shot uploads.
pub struct StagingBuffer {
    pub buffer: vk::Buffer,
    pub memory: vk::DeviceMemory,
    pub size: vk::DeviceSize,
}

impl StagingBuffer {
    /// Create a host-visible, host-coherent transfer source buffer.
    ///
    /// # Safety
    /// The device must be valid and the memory properties must belong to
    /// its physical device.
    pub unsafe fn new(
        device: &ash::Device,
        memory_properties: &vk::PhysicalDeviceMemoryProperties,
        size: vk::DeviceSize,
    ) -> Result<Self> {
        let buffer_info = init::buffer_create_info()
            .size(size)
            .usage(vk::BufferUsageFlags::TRANSFER_SRC)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = device.create_buffer(&buffer_info, None)?;
        let requirements = device.get_buffer_memory_requirements(buffer);

        let memory = allocate(
            device,
            memory_properties,
            requirements,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        )?;

        device.bind_buffer_memory(buffer, memory, 0)?;

        Ok(Self {
            buffer,
            memory,
            size,
        })
    }

    /// Copy bytes into the buffer through a transient mapping.
    ///
    /// # Safety
    /// The device must be valid and the buffer must not be in use by the
    /// GPU.
    pub unsafe fn write_bytes(&self, device: &ash::Device, data: &[u8]) -> Result<()> {
        if data.len() as vk::DeviceSize > self.size {
            return Err(GpuError::InvalidState(
                "data too large for staging buffer".to_string(),
            ));
        }

        let ptr = device.map_memory(self.memory, 0, vk::WHOLE_SIZE, vk::MemoryMapFlags::empty())?;
        std::ptr::copy_nonoverlapping(data.as_ptr(), ptr.cast::<u8>(), data.len());
        device.unmap_memory(self.memory);

        Ok(())
    }

    /// Destroy the buffer and free its memory.
    ///
    /// # Safety
    /// The device must be valid and the buffer must not be in use.
    pub unsafe fn destroy(&self, device: &ash::Device) {
        device.destroy_buffer(self.buffer, None);
        device.free_memory(self.memory, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn properties_with(types: &[vk::MemoryPropertyFlags]) -> vk::PhysicalDeviceMemoryProperties {
        let mut properties = vk::PhysicalDeviceMemoryProperties::default();
        properties.memory_type_count = types.len() as u32;
        for (i, &flags) in types.iter().enumerate() {
            properties.memory_types[i] = vk::MemoryType {
                property_flags: flags,
                heap_index: 0,
            };
        }
        properties
    }

    #[test]
    fn first_matching_type_wins() {
        let properties = properties_with(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        ]);

        assert_eq!(
            find_memory_type_index(
                &properties,
                0b111,
                vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
            ),
            Some(1)
        );
    }

    #[test]
    fn respects_type_bits_mask() {
        let properties = properties_with(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        ]);

        // Type 0 qualifies by properties but is masked out
        assert_eq!(
            find_memory_type_index(&properties, 0b10, vk::MemoryPropertyFlags::DEVICE_LOCAL),
            Some(1)
        );
    }

    #[test]
    fn requires_all_property_bits() {
        let properties = properties_with(&[vk::MemoryPropertyFlags::HOST_VISIBLE]);

        assert_eq!(
            find_memory_type_index(
                &properties,
                0b1,
                vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
            ),
            None
        );
    }

    #[test]
    fn no_match_is_an_error() {
        let properties = properties_with(&[vk::MemoryPropertyFlags::DEVICE_LOCAL]);

        let err = memory_type_index(&properties, 0b1, vk::MemoryPropertyFlags::HOST_VISIBLE)
            .unwrap_err();
        assert!(matches!(err, GpuError::NoSuitableMemoryType { type_bits: 0b1, .. }));
    }
}
