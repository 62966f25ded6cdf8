//! Common value types shared across backends

use bytemuck::bytes_of;
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Texture format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    Rgba16Float,
    Rgba32Float,
}

impl TextureFormat {
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::Rgba8Unorm
            | TextureFormat::Rgba8UnormSrgb
            | TextureFormat::Bgra8Unorm => 4,
            TextureFormat::Rgba16Float => 8,
            TextureFormat::Rgba32Float => 16,
        }
    }
}

/// Format used for intermediate pass outputs acquired from the pool.
pub const INTERMEDIATE_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

/// Texture descriptor
#[derive(Debug, Clone)]
pub struct TextureDescriptor {
    pub label: Option<String>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

impl TextureDescriptor {
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            label: None,
            width,
            height,
            format,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

/// Typed uniform value forwarded to the backend before a draw.
///
/// Shader fragments declare uniforms as opaque text; the engine only moves
/// these values from node params to the backend, it never interprets them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl UniformValue {
    /// Raw byte representation for upload. Booleans upload as a u32,
    /// matching the usual shader ABI.
    pub fn as_bytes(&self) -> Vec<u8> {
        match self {
            UniformValue::Float(v) => bytes_of(v).to_vec(),
            UniformValue::Int(v) => bytes_of(v).to_vec(),
            UniformValue::Bool(v) => bytes_of(&(*v as u32)).to_vec(),
            UniformValue::Vec2(v) => bytes_of(v).to_vec(),
            UniformValue::Vec3(v) => bytes_of(v).to_vec(),
            UniformValue::Vec4(v) => bytes_of(v).to_vec(),
            UniformValue::Mat4(v) => bytes_of(v).to_vec(),
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(v: Mat4) -> Self {
        UniformValue::Mat4(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_per_pixel() {
        assert_eq!(TextureFormat::Rgba8Unorm.bytes_per_pixel(), 4);
        assert_eq!(TextureFormat::Rgba16Float.bytes_per_pixel(), 8);
        assert_eq!(TextureFormat::Rgba32Float.bytes_per_pixel(), 16);
    }

    #[test]
    fn uniform_byte_sizes() {
        assert_eq!(UniformValue::Float(1.0).as_bytes().len(), 4);
        assert_eq!(UniformValue::Bool(true).as_bytes().len(), 4);
        assert_eq!(UniformValue::Vec4(Vec4::ONE).as_bytes().len(), 16);
        assert_eq!(UniformValue::Mat4(Mat4::IDENTITY).as_bytes().len(), 64);
    }
}
