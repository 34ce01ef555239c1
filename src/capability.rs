//! CPU capability probing for the wide (256-bit lane group) variant.
//!
//! The probe runs at most once per process; every later query reads the
//! memoized flag. Callers branch on the result explicitly: a codec built for the
//! wide variant on hardware without the extension is refused at construction.

use once_cell::sync::OnceCell;

use crate::config::BlockWidth;
use crate::error::PforError;

static WIDE_SUPPORT: OnceCell<bool> = OnceCell::new();

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn probe_wide() -> bool {
    is_x86_feature_detected!("avx2")
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn probe_wide() -> bool {
    false
}

/// Returns `true` if this CPU can run the 256-wide variant.
///
/// Safe to call any number of times from any thread; the answer never changes
/// for the lifetime of the process.
pub fn supports_wide_variant() -> bool {
    *WIDE_SUPPORT.get_or_init(|| {
        let supported = probe_wide();
        log::info!("capability probe: wide (256-bit) lane group supported = {}", supported);
        supported
    })
}

/// A snapshot of what the codec is allowed to use.
///
/// `detect()` reflects the hardware; `narrow_only()` withholds the wide
/// extension so the refusal path can be exercised on any machine. A snapshot
/// can never claim a capability the hardware lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    wide: bool,
}

impl Capabilities {
    pub fn detect() -> Self {
        Self {
            wide: supports_wide_variant(),
        }
    }

    pub const fn narrow_only() -> Self {
        Self { wide: false }
    }

    pub const fn wide(&self) -> bool {
        self.wide
    }

    /// Fails with `CapabilityMismatch` if `width` cannot run under these capabilities.
    pub fn require(&self, width: BlockWidth) -> Result<(), PforError> {
        if width.is_wide() && !self.wide {
            return Err(PforError::CapabilityMismatch { variant: width });
        }
        Ok(())
    }
}
