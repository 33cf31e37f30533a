use std::fmt;

use ndarray::{ArrayView, IxDyn};

/// Element type carried by a buffer descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dtype {
    U8,
    U16,
    F32,
    F64,
}

impl Dtype {
    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            Dtype::U8 => 1,
            Dtype::U16 => 2,
            Dtype::F32 => 4,
            Dtype::F64 => 8,
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dtype::U8 => "uint8",
            Dtype::U16 => "uint16",
            Dtype::F32 => "float32",
            Dtype::F64 => "float64",
        };
        f.write_str(name)
    }
}

/// Shape/type descriptor for a caller-supplied pixel buffer.
///
/// `stride` holds per-axis byte strides. Strides describe how a buffer is
/// laid out but take no part in compatibility checks: a non-contiguous
/// buffer with a matching shape is accepted, and writes into it follow the
/// declared strides rather than assuming a packed layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeInfo {
    pub dtype: Dtype,
    pub shape: Vec<usize>,
    pub stride: Vec<isize>,
}

impl TypeInfo {
    /// Descriptor with packed row-major strides.
    pub fn packed(dtype: Dtype, shape: Vec<usize>) -> Self {
        let mut stride = vec![0isize; shape.len()];
        let mut acc = dtype.size() as isize;
        for (axis, extent) in shape.iter().enumerate().rev() {
            stride[axis] = acc;
            acc *= *extent as isize;
        }
        Self {
            dtype,
            shape,
            stride,
        }
    }

    /// Descriptor for one decoded frame: channel-major `(3, height, width)`.
    pub fn frame(height: usize, width: usize) -> Self {
        Self::packed(Dtype::U8, vec![3, height, width])
    }

    /// Descriptor for a whole video: `(frames, 3, height, width)`.
    pub fn video(frames: usize, height: usize, width: usize) -> Self {
        Self::packed(Dtype::U8, vec![frames, 3, height, width])
    }

    /// Captures the shape and strides of an actual byte buffer.
    pub fn of_view(view: &ArrayView<'_, u8, IxDyn>) -> Self {
        Self {
            dtype: Dtype::U8,
            shape: view.shape().to_vec(),
            stride: view.strides().to_vec(),
        }
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Number of bytes a packed buffer of this shape occupies.
    pub fn buffer_size(&self) -> usize {
        self.shape.iter().product::<usize>() * self.dtype.size()
    }

    /// True iff element type, rank and every axis extent match.
    /// Stride layout is deliberately ignored.
    pub fn is_compatible(&self, actual: &TypeInfo) -> bool {
        self.dtype == actual.dtype && self.shape == actual.shape
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.dtype)?;
        for (axis, extent) in self.shape.iter().enumerate() {
            if axis > 0 {
                write!(f, ",")?;
            }
            write!(f, "{extent}")?;
        }
        write!(f, ")")
    }
}
