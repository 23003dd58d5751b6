use crate::foundation::error::{WeaselError, WeaselResult};

/// Absolute frame number in the input sequence.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// The following frame number.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Inclusive frame range `[first, last]`, the unit the command line speaks in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// First frame read.
    pub first: FrameIndex,
    /// Last frame read (inclusive).
    pub last: FrameIndex,
}

impl FrameRange {
    /// Create a validated range with `first <= last`.
    pub fn new(first: FrameIndex, last: FrameIndex) -> WeaselResult<Self> {
        if first.0 > last.0 {
            return Err(WeaselError::validation(
                "frame range start must be <= final frame",
            ));
        }
        Ok(Self { first, last })
    }

    /// Number of frames contained in the range, saturating at `u64::MAX`.
    pub fn len_frames(self) -> u64 {
        (self.last.0 - self.first.0).saturating_add(1)
    }
}

/// Frame dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Extent {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Extent {
    /// Build an extent.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels covered.
    pub fn pixel_count(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
