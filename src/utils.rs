//! Shared, low-level helpers for moving between raw byte buffers and typed
//! element slices. All casts go through `bytemuck`, which checks length and
//! alignment; nothing here uses `unsafe`.

use crate::error::PforError;

/// Reinterprets a byte slice as a slice of `T` without copying.
///
/// # Errors
/// Returns `PforError::PodCast` if the length is not a multiple of
/// `size_of::<T>()` or the buffer is misaligned for `T`.
pub fn safe_bytes_to_typed_slice<T: bytemuck::Pod>(bytes: &[u8]) -> Result<&[T], PforError> {
    bytemuck::try_cast_slice(bytes).map_err(PforError::from)
}

/// Mutable counterpart of `safe_bytes_to_typed_slice`.
pub fn safe_bytes_to_typed_slice_mut<T: bytemuck::Pod>(
    bytes: &mut [u8],
) -> Result<&mut [T], PforError> {
    bytemuck::try_cast_slice_mut(bytes).map_err(PforError::from)
}
