use std::time::Duration;

use pointmorph::{EasingCurve, DEFAULT_TRANSITION_DURATION};

/// Output color handling for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpaceMode {
    /// Same as `Gamma`: image bytes are shown unchanged.
    #[default]
    Auto,
    /// Treat image data as gamma-encoded; use non-sRGB surfaces and textures.
    Gamma,
    /// Decode images to linear light and let an sRGB swapchain re-encode them.
    Linear,
}

/// Anti-aliasing policy for the render pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuPowerPreference {
    Low,
    #[default]
    High,
}

/// What we learned about the adapter we ended up on.
#[derive(Debug, Clone)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
    pub max_texture_dimension: u32,
}

impl AdapterProfile {
    pub fn from_wgpu(info: &wgpu::AdapterInfo, limits: &wgpu::Limits) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
            max_texture_dimension: limits.max_texture_dimension_2d,
        }
    }

    /// True for CPU rasterizers such as llvmpipe, lavapipe or SwiftShader.
    pub fn is_software(&self) -> bool {
        if matches!(self.device_type, wgpu::DeviceType::Cpu) {
            return true;
        }
        let name = self.name.to_ascii_lowercase();
        ["llvmpipe", "lavapipe", "softpipe", "swiftshader"]
            .iter()
            .any(|needle| name.contains(needle))
    }
}

/// Immutable configuration passed to the renderer at start-up.
///
/// Mirrors the merged config file and CLI flags.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Optional FPS cap while a transition animates; None = every vblank.
    pub target_fps: Option<f32>,
    pub antialiasing: Antialiasing,
    pub color_space: ColorSpaceMode,
    pub gpu_power: GpuPowerPreference,
    /// Clear colour as sRGB components in `[0, 1]`.
    pub background: [f32; 3],
    /// Point edge in pixels at unit view depth.
    pub point_size: f32,
    pub stagger: f32,
    pub arc_height: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub camera_distance: f32,
    pub transition_duration: Duration,
    pub curve: EasingCurve,
    /// Gallery index shown first.
    pub start_index: usize,
    pub show_thumbnails: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            target_fps: None,
            antialiasing: Antialiasing::default(),
            color_space: ColorSpaceMode::default(),
            gpu_power: GpuPowerPreference::default(),
            background: [42.0 / 255.0, 37.0 / 255.0, 31.0 / 255.0],
            point_size: 1.0,
            stagger: 0.5,
            arc_height: 0.2,
            fov_degrees: 70.0,
            camera_distance: 1.0,
            transition_duration: DEFAULT_TRANSITION_DURATION,
            curve: EasingCurve::default(),
            start_index: 0,
            show_thumbnails: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, device_type: wgpu::DeviceType) -> AdapterProfile {
        AdapterProfile {
            name: name.into(),
            backend: wgpu::Backend::Vulkan,
            device_type,
            max_texture_dimension: 8192,
        }
    }

    #[test]
    fn detects_software_adapters() {
        assert!(profile("anything", wgpu::DeviceType::Cpu).is_software());
        assert!(profile("llvmpipe (LLVM 17.0.6, 256 bits)", wgpu::DeviceType::Other).is_software());
        assert!(!profile("AMD Radeon RX 7800 XT", wgpu::DeviceType::DiscreteGpu).is_software());
    }
}
