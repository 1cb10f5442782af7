//! GPU error types and status-code formatting.

use ash::vk;
use thiserror::Error;

/// GPU-related errors.
#[derive(Error, Debug)]
pub enum GpuError {
    /// Vulkan error.
    #[error("Vulkan error: {}", error_string(*.0))]
    Vulkan(#[from] vk::Result),

    /// No suitable GPU found.
    #[error("No suitable GPU found")]
    NoSuitableDevice,

    /// No memory type satisfies the requested properties.
    #[error("No memory type matches type bits {type_bits:#x} with properties {properties:?}")]
    NoSuitableMemoryType {
        type_bits: u32,
        properties: vk::MemoryPropertyFlags,
    },

    /// Invalid state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, GpuError>;

/// Map a Vulkan status code to its name.
///
/// Codes outside the table come back as `"UNKNOWN_ERROR"`.
pub fn error_string(code: vk::Result) -> &'static str {
    match code {
        vk::Result::NOT_READY => "NOT_READY",
        vk::Result::TIMEOUT => "TIMEOUT",
        vk::Result::EVENT_SET => "EVENT_SET",
        vk::Result::EVENT_RESET => "EVENT_RESET",
        vk::Result::INCOMPLETE => "INCOMPLETE",
        vk::Result::ERROR_OUT_OF_HOST_MEMORY => "ERROR_OUT_OF_HOST_MEMORY",
        vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => "ERROR_OUT_OF_DEVICE_MEMORY",
        vk::Result::ERROR_INITIALIZATION_FAILED => "ERROR_INITIALIZATION_FAILED",
        vk::Result::ERROR_DEVICE_LOST => "ERROR_DEVICE_LOST",
        vk::Result::ERROR_MEMORY_MAP_FAILED => "ERROR_MEMORY_MAP_FAILED",
        vk::Result::ERROR_LAYER_NOT_PRESENT => "ERROR_LAYER_NOT_PRESENT",
        vk::Result::ERROR_EXTENSION_NOT_PRESENT => "ERROR_EXTENSION_NOT_PRESENT",
        vk::Result::ERROR_FEATURE_NOT_PRESENT => "ERROR_FEATURE_NOT_PRESENT",
        vk::Result::ERROR_INCOMPATIBLE_DRIVER => "ERROR_INCOMPATIBLE_DRIVER",
        vk::Result::ERROR_TOO_MANY_OBJECTS => "ERROR_TOO_MANY_OBJECTS",
        vk::Result::ERROR_FORMAT_NOT_SUPPORTED => "ERROR_FORMAT_NOT_SUPPORTED",
        vk::Result::ERROR_SURFACE_LOST_KHR => "ERROR_SURFACE_LOST_KHR",
        vk::Result::ERROR_NATIVE_WINDOW_IN_USE_KHR => "ERROR_NATIVE_WINDOW_IN_USE_KHR",
        vk::Result::SUBOPTIMAL_KHR => "SUBOPTIMAL_KHR",
        vk::Result::ERROR_OUT_OF_DATE_KHR => "ERROR_OUT_OF_DATE_KHR",
        vk::Result::ERROR_INCOMPATIBLE_DISPLAY_KHR => "ERROR_INCOMPATIBLE_DISPLAY_KHR",
        vk::Result::ERROR_VALIDATION_FAILED_EXT => "ERROR_VALIDATION_FAILED_EXT",
        vk::Result::ERROR_INVALID_SHADER_NV => "ERROR_INVALID_SHADER_NV",
        _ => "UNKNOWN_ERROR",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_status_codes() {
        assert_eq!(error_string(vk::Result::NOT_READY), "NOT_READY");
        assert_eq!(error_string(vk::Result::ERROR_DEVICE_LOST), "ERROR_DEVICE_LOST");
        assert_eq!(
            error_string(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY),
            "ERROR_OUT_OF_DEVICE_MEMORY"
        );
        assert_eq!(error_string(vk::Result::SUBOPTIMAL_KHR), "SUBOPTIMAL_KHR");
    }

    #[test]
    fn unknown_status_codes() {
        // SUCCESS is deliberately outside the table
        assert_eq!(error_string(vk::Result::SUCCESS), "UNKNOWN_ERROR");
        assert_eq!(error_string(vk::Result::from_raw(-12345)), "UNKNOWN_ERROR");
    }

    #[test]
    fn vulkan_error_display_uses_status_string() {
        let err = GpuError::from(vk::Result::ERROR_DEVICE_LOST);
        assert_eq!(err.to_string(), "Vulkan error: ERROR_DEVICE_LOST");
    }
}
