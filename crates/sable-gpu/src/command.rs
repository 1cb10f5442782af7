//! Command buffer management.

use crate::error::Result;
use crate::init;
use crate::sync::{create_fence, wait_for_fence, DEFAULT_FENCE_TIMEOUT};
use ash::vk;

/// Command pool for allocating command buffers.
pub struct CommandPool {
    pool: vk::CommandPool,
    queue_family: u32,
}

impl CommandPool {
    /// Create a new command pool.
    ///
    /// # Safety
    /// The device must be valid and the queue family must exist.
    pub unsafe fn new(
        device: &ash::Device,
        queue_family: u32,
        flags: vk::CommandPoolCreateFlags,
    ) -> Result<Self> {
        let create_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(queue_family)
            .flags(flags);

        let pool = device.create_command_pool(&create_info, None)?;

        Ok(Self { pool, queue_family })
    }

    /// Get the raw pool handle.
    pub fn handle(&self) -> vk::CommandPool {
        self.pool
    }

    /// Get the queue family index.
    pub fn queue_family(&self) -> u32 {
        self.queue_family
    }

    /// Allocate a single command buffer.
    ///
    /// # Safety
    /// The device must be valid.
    pub unsafe fn allocate_command_buffer(
        &self,
        device: &ash::Device,
        level: vk::CommandBufferLevel,
    ) -> Result<vk::CommandBuffer> {
        let alloc_info = init::command_buffer_allocate_info(self.pool, level, 1);
        let buffers = device.allocate_command_buffers(&alloc_info)?;
        Ok(buffers[0])
    }

    /// Allocate multiple command buffers.
    ///
    /// # Safety
    /// The device must be valid.
    pub unsafe fn allocate_command_buffers(
        &self,
        device: &ash::Device,
        level: vk::CommandBufferLevel,
        count: u32,
    ) -> Result<Vec<vk::CommandBuffer>> {
        let alloc_info = init::command_buffer_allocate_info(self.pool, level, count);
        let buffers = device.allocate_command_buffers(&alloc_info)?;
        Ok(buffers)
    }

    /// Reset the command pool.
    ///
    /// # Safety
    /// The device must be valid and all command buffers from this pool must not be in use.
    pub unsafe fn reset(
        &self,
        device: &ash::Device,
        flags: vk::CommandPoolResetFlags,
    ) -> Result<()> {
        device.reset_command_pool(self.pool, flags)?;
        Ok(())
    }

    /// Destroy the command pool.
    ///
    /// # Safety
    /// The device must be valid and the pool must not be in use.
    pub unsafe fn destroy(&self, device: &ash::Device) {
        device.destroy_command_pool(self.pool, None);
    }
}

/// Begin recording a command buffer.
///
/// # Safety
/// The device and command buffer must be valid.
pub unsafe fn begin_command_buffer(
    device: &ash::Device,
    cmd: vk::CommandBuffer,
    flags: vk::CommandBufferUsageFlags,
) -> Result<()> {
    let begin_info = init::command_buffer_begin_info().flags(flags);
    device.begin_command_buffer(cmd, &begin_info)?;
    Ok(())
}

/// End recording a command buffer.
///
/// # Safety
/// The device and command buffer must be valid.
pub unsafe fn end_command_buffer(device: &ash::Device, cmd: vk::CommandBuffer) -> Result<()> {
    device.end_command_buffer(cmd)?;
    Ok(())
}

/// Allocate a command buffer from the pool and begin recording it.
///
/// # Safety
/// The device must be valid.
pub unsafe fn create_command_buffer(
    device: &ash::Device,
    pool: &CommandPool,
    level: vk::CommandBufferLevel,
) -> Result<vk::CommandBuffer> {
    let cmd = pool.allocate_command_buffer(device, level)?;
    begin_command_buffer(device, cmd, vk::CommandBufferUsageFlags::empty())?;
    Ok(cmd)
}

/// End a command buffer, submit it, and block until it has executed.
///
/// A null command buffer is a silent no-op. The submission is fenced and
/// waited on with [`DEFAULT_FENCE_TIMEOUT`]; the command buffer is freed
/// back to the pool afterwards.
///
/// # Safety
/// All handles must be valid and the queue must accept the pool's family.
pub unsafe fn flush_command_buffer(
    device: &ash::Device,
    queue: vk::Queue,
    pool: &CommandPool,
    cmd: vk::CommandBuffer,
) -> Result<()> {
    if cmd == vk::CommandBuffer::null() {
        return Ok(());
    }

    end_command_buffer(device, cmd)?;

    let command_buffers = [cmd];
    let submit_info = init::submit_info().command_buffers(&command_buffers);

    // Fence so we know the command buffer has finished executing
    let fence = create_fence(device, false)?;

    let wait_result = match device.queue_submit(queue, &[submit_info], fence) {
        Ok(()) => wait_for_fence(device, fence, DEFAULT_FENCE_TIMEOUT),
        Err(e) => Err(e.into()),
    };

    device.destroy_fence(fence, None);
    device.free_command_buffers(pool.handle(), &command_buffers);

    wait_result
}
