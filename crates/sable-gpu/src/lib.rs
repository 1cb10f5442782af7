//! Vulkan compute helper toolkit.
//!
//! This crate provides:
//! - Instance and device bring-up for headless compute work
//! - Structure-initializer helpers
//! - Command buffer allocation and synchronous flush
//! - Memory-type selection and staging buffers
//! - Image layout transition barriers
//! - One-shot 2D texture upload

pub mod barrier;
pub mod capabilities;
pub mod command;
pub mod context;
pub mod error;
pub mod init;
pub mod instance;
pub mod memory;
pub mod sync;
pub mod texture;

pub use barrier::{set_image_layout, set_image_layout_stages, transition_masks};
pub use capabilities::{GpuCapabilities, GpuVendor};
pub use command::{
    begin_command_buffer, create_command_buffer, end_command_buffer, flush_command_buffer,
    CommandPool,
};
pub use context::{GpuContext, GpuContextBuilder};
pub use error::{error_string, GpuError, Result};
pub use memory::{find_memory_type_index, memory_type_index, StagingBuffer};
pub use sync::{create_fence, reset_fence, wait_for_fence, DEFAULT_FENCE_TIMEOUT};
pub use texture::{Texture2D, TextureUploadOptions};
