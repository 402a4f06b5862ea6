use super::ImageType;

#[cfg(feature = "slotgfx-serde")]
use serde::{Deserialize, Serialize};

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum PixelFormat {
    /// Explicitly no attachment.
    #[default]
    None,
    R8,
    R8Sn,
    R8Ui,
    R8Si,
    R16,
    R16Sn,
    R16Ui,
    R16Si,
    R16F,
    Rg8,
    Rg8Sn,
    Rg8Ui,
    Rg8Si,
    R32Ui,
    R32Si,
    R32F,
    Rg16,
    Rg16Sn,
    Rg16Ui,
    Rg16Si,
    Rg16F,
    Rgba8,
    Srgb8A8,
    Rgba8Sn,
    Rgba8Ui,
    Rgba8Si,
    Bgra8,
    Rgb10A2,
    Rg11B10F,
    Rg32Ui,
    Rg32Si,
    Rg32F,
    Rgba16,
    Rgba16Sn,
    Rgba16Ui,
    Rgba16Si,
    Rgba16F,
    Rgba32Ui,
    Rgba32Si,
    Rgba32F,
    Depth,
    DepthStencil,
    Bc1Rgba,
    Bc2Rgba,
    Bc3Rgba,
    Bc4R,
    Bc4Rsn,
    Bc5Rg,
    Bc5Rgsn,
    Bc6hRgbf,
    Bc6hRgbuf,
    Bc7Rgba,
    Etc2Rgb8,
    Etc2Rgb8A1,
    Etc2Rgba8,
    Etc2Rg11,
    Etc2Rg11Sn,
}

impl PixelFormat {
    /// Bytes per texel for uncompressed formats, 0 for compressed ones.
    pub fn bytes_per_pixel(self) -> usize {
        use PixelFormat::*;
        match self {
            R8 | R8Sn | R8Ui | R8Si => 1,
            R16 | R16Sn | R16Ui | R16Si | R16F | Rg8 | Rg8Sn | Rg8Ui | Rg8Si => 2,
            R32Ui | R32Si | R32F | Rg16 | Rg16Sn | Rg16Ui | Rg16Si | Rg16F | Rgba8 | Srgb8A8
            | Rgba8Sn | Rgba8Ui | Rgba8Si | Bgra8 | Rgb10A2 | Rg11B10F | Depth | DepthStencil => 4,
            Rg32Ui | Rg32Si | Rg32F | Rgba16 | Rgba16Sn | Rgba16Ui | Rgba16Si | Rgba16F => 8,
            Rgba32Ui | Rgba32Si | Rgba32F => 16,
            _ => 0,
        }
    }

    /// Bytes per 4x4 block for block-compressed formats, 0 otherwise.
    pub fn block_bytes(self) -> usize {
        use PixelFormat::*;
        match self {
            Bc1Rgba | Bc4R | Bc4Rsn | Etc2Rgb8 | Etc2Rgb8A1 => 8,
            Bc2Rgba | Bc3Rgba | Bc5Rg | Bc5Rgsn | Bc6hRgbf | Bc6hRgbuf | Bc7Rgba | Etc2Rgba8
            | Etc2Rg11 | Etc2Rg11Sn => 16,
            _ => 0,
        }
    }

    pub fn is_compressed(self) -> bool {
        self.block_bytes() > 0
    }

    pub fn is_depth(self) -> bool {
        matches!(self, PixelFormat::Depth | PixelFormat::DepthStencil)
    }

    pub fn is_depth_stencil(self) -> bool {
        self == PixelFormat::DepthStencil
    }

    pub fn is_integer(self) -> bool {
        use PixelFormat::*;
        matches!(
            self,
            R8Ui | R8Si
                | R16Ui
                | R16Si
                | Rg8Ui
                | Rg8Si
                | R32Ui
                | R32Si
                | Rg16Ui
                | Rg16Si
                | Rgba8Ui
                | Rgba8Si
                | Rg32Ui
                | Rg32Si
                | Rgba16Ui
                | Rgba16Si
                | Rgba32Ui
                | Rgba32Si
        )
    }

    /// Number of bytes in one row of texels (or one row of blocks), rounded up
    /// to `align`.
    pub fn row_pitch(self, width: u32, align: usize) -> usize {
        let pitch = if self.is_compressed() {
            ((width as usize + 3) / 4).max(1) * self.block_bytes()
        } else {
            width as usize * self.bytes_per_pixel()
        };
        round_up(pitch, align)
    }

    pub fn num_rows(self, height: u32) -> usize {
        if self.is_compressed() {
            ((height as usize + 3) / 4).max(1)
        } else {
            height.max(1) as usize
        }
    }

    pub fn surface_pitch(self, width: u32, height: u32, row_align: usize) -> usize {
        self.num_rows(height) * self.row_pitch(width, row_align)
    }
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum VertexFormat {
    Float,
    Float2,
    Float3,
    Float4,
    Byte4,
    Byte4N,
    UByte4,
    UByte4N,
    Short2,
    Short2N,
    UShort2N,
    Short4,
    Short4N,
    UShort4N,
    UInt10N2,
    Half2,
    Half4,
}

impl VertexFormat {
    pub fn byte_size(self) -> u32 {
        use VertexFormat::*;
        match self {
            Float => 4,
            Float2 => 8,
            Float3 => 12,
            Float4 => 16,
            Byte4 | Byte4N | UByte4 | UByte4N => 4,
            Short2 | Short2N | UShort2N => 4,
            Short4 | Short4N | UShort4N => 8,
            UInt10N2 => 4,
            Half2 => 4,
            Half4 => 8,
        }
    }
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub enum UniformType {
    Float,
    Float2,
    Float3,
    Float4,
    Int,
    Int2,
    Int3,
    Int4,
    Mat4,
}

impl UniformType {
    pub fn byte_size(self, array_count: u32) -> usize {
        use UniformType::*;
        let elem = match self {
            Float | Int => 4,
            Float2 | Int2 => 8,
            Float3 | Int3 => 12,
            Float4 | Int4 => 16,
            Mat4 => 64,
        };
        elem * array_count.max(1) as usize
    }
}

pub fn round_up(value: usize, align: usize) -> usize {
    if align <= 1 {
        return value;
    }
    (value + align - 1) & !(align - 1)
}

pub fn num_faces(image_type: ImageType) -> usize {
    match image_type {
        ImageType::Cube => 6,
        _ => 1,
    }
}

/// Size in bytes of one face of mip level `mip`. 3D images shrink in depth
/// per mip; array layers do not.
pub fn subimage_size(
    fmt: PixelFormat,
    image_type: ImageType,
    width: u32,
    height: u32,
    num_slices: u32,
    mip: u32,
) -> usize {
    let mip_dim = |dim: u32| (dim >> mip).max(1);
    let slices = match image_type {
        ImageType::Dim3 => mip_dim(num_slices),
        ImageType::Array => num_slices.max(1),
        _ => 1,
    };
    fmt.surface_pitch(mip_dim(width), mip_dim(height), 1) * slices as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncompressed_pitch() {
        assert_eq!(PixelFormat::Rgba8.row_pitch(10, 1), 40);
        assert_eq!(PixelFormat::Rgba8.surface_pitch(10, 4, 1), 160);
        assert_eq!(PixelFormat::R8.row_pitch(3, 4), 4);
    }

    #[test]
    fn compressed_pitch_uses_blocks() {
        assert_eq!(PixelFormat::Bc1Rgba.row_pitch(8, 1), 16);
        assert_eq!(PixelFormat::Bc1Rgba.num_rows(8), 2);
        assert_eq!(PixelFormat::Bc3Rgba.surface_pitch(1, 1, 1), 16);
        assert!(PixelFormat::Bc7Rgba.is_compressed());
        assert!(!PixelFormat::Rgba8.is_compressed());
    }

    #[test]
    fn depth_formats() {
        assert!(PixelFormat::Depth.is_depth());
        assert!(PixelFormat::DepthStencil.is_depth_stencil());
        assert!(!PixelFormat::Rgba8.is_depth());
    }

    #[test]
    fn uniform_sizes_account_for_arrays() {
        assert_eq!(UniformType::Float4.byte_size(1), 16);
        assert_eq!(UniformType::Float4.byte_size(4), 64);
        assert_eq!(UniformType::Mat4.byte_size(0), 64);
    }

    #[test]
    fn subimage_sizes_per_type() {
        let fmt = PixelFormat::Rgba8;
        assert_eq!(subimage_size(fmt, ImageType::Dim2, 16, 8, 1, 0), 16 * 8 * 4);
        assert_eq!(subimage_size(fmt, ImageType::Dim2, 16, 8, 1, 1), 8 * 4 * 4);
        assert_eq!(subimage_size(fmt, ImageType::Dim2, 16, 8, 1, 5), 4);
        assert_eq!(subimage_size(fmt, ImageType::Dim3, 4, 4, 4, 1), 2 * 2 * 2 * 4);
        assert_eq!(subimage_size(fmt, ImageType::Array, 4, 4, 3, 1), 2 * 2 * 3 * 4);
        assert_eq!(num_faces(ImageType::Cube), 6);
    }

    #[test]
    fn round_up_to_four() {
        assert_eq!(round_up(0, 4), 0);
        assert_eq!(round_up(1, 4), 4);
        assert_eq!(round_up(100, 4), 100);
        assert_eq!(round_up(101, 4), 104);
    }
}
