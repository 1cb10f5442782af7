//! Structure-initializer helpers.
//!
//! Each function returns a struct with its type tag set and only the
//! fields every call site needs filled in; everything else stays at the
//! API's zero default.

use ash::vk;

pub fn memory_allocate_info() -> vk::MemoryAllocateInfo<'static> {
    vk::MemoryAllocateInfo::default()
}

pub fn command_buffer_allocate_info(
    pool: vk::CommandPool,
    level: vk::CommandBufferLevel,
    buffer_count: u32,
) -> vk::CommandBufferAllocateInfo<'static> {
    vk::CommandBufferAllocateInfo::default()
        .command_pool(pool)
        .level(level)
        .command_buffer_count(buffer_count)
}

pub fn command_buffer_begin_info() -> vk::CommandBufferBeginInfo<'static> {
    vk::CommandBufferBeginInfo::default()
}

pub fn buffer_create_info() -> vk::BufferCreateInfo<'static> {
    vk::BufferCreateInfo::default()
}

pub fn image_create_info() -> vk::ImageCreateInfo<'static> {
    vk::ImageCreateInfo::default()
}

/// Image memory barrier with no queue family ownership transfer.
pub fn image_memory_barrier() -> vk::ImageMemoryBarrier<'static> {
    vk::ImageMemoryBarrier::default()
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
}

pub fn submit_info() -> vk::SubmitInfo<'static> {
    vk::SubmitInfo::default()
}

pub fn fence_create_info(flags: vk::FenceCreateFlags) -> vk::FenceCreateInfo<'static> {
    vk::FenceCreateInfo::default().flags(flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tags() {
        assert_eq!(
            memory_allocate_info().s_type,
            vk::StructureType::MEMORY_ALLOCATE_INFO
        );
        assert_eq!(
            command_buffer_begin_info().s_type,
            vk::StructureType::COMMAND_BUFFER_BEGIN_INFO
        );
        assert_eq!(buffer_create_info().s_type, vk::StructureType::BUFFER_CREATE_INFO);
        assert_eq!(image_create_info().s_type, vk::StructureType::IMAGE_CREATE_INFO);
        assert_eq!(submit_info().s_type, vk::StructureType::SUBMIT_INFO);
        assert_eq!(
            fence_create_info(vk::FenceCreateFlags::empty()).s_type,
            vk::StructureType::FENCE_CREATE_INFO
        );
    }

    #[test]
    fn command_buffer_allocate_fields() {
        let info = command_buffer_allocate_info(
            vk::CommandPool::null(),
            vk::CommandBufferLevel::SECONDARY,
            3,
        );
        assert_eq!(info.s_type, vk::StructureType::COMMAND_BUFFER_ALLOCATE_INFO);
        assert_eq!(info.level, vk::CommandBufferLevel::SECONDARY);
        assert_eq!(info.command_buffer_count, 3);
    }

    #[test]
    fn barrier_ignores_queue_family_ownership() {
        let barrier = image_memory_barrier();
        assert_eq!(barrier.s_type, vk::StructureType::IMAGE_MEMORY_BARRIER);
        assert_eq!(barrier.src_queue_family_index, vk::QUEUE_FAMILY_IGNORED);
        assert_eq!(barrier.dst_queue_family_index, vk::QUEUE_FAMILY_IGNORED);
    }

    #[test]
    fn fence_create_flags() {
        let info = fence_create_info(vk::FenceCreateFlags::SIGNALED);
        assert_eq!(info.flags, vk::FenceCreateFlags::SIGNALED);
    }
}
