use crate::foundation::core::Extent;
use crate::foundation::error::{WeaselError, WeaselResult};
use crate::frame::model::Frame;

use super::{prepare, require_data};

/// Duplicate `src` into `dst`.
pub fn copy(src: &Frame, dst: &mut Frame) -> WeaselResult<()> {
    prepare(src, dst, "copy")?;
    dst.pixels_mut().copy_from_slice(src.pixels());
    Ok(())
}

/// `dst = src - background` over the overlapping region (minimum width and height).
pub fn subtract(src: &Frame, background: &Frame, dst: &mut Frame) -> WeaselResult<()> {
    let a = require_data(src, "subtract")?;
    let b = require_data(background, "subtract")?;
    let extent = Extent::new(a.width.min(b.width), a.height.min(b.height));
    dst.ensure_extent(extent)?;
    let w = extent.width as usize;
    let out = dst.pixels_mut();
    for y in 0..extent.height as usize {
        let lhs = &src.row(y)[..w];
        let rhs = &background.row(y)[..w];
        for ((o, &l), &r) in out[y * w..(y + 1) * w].iter_mut().zip(lhs).zip(rhs) {
            *o = l - r;
        }
    }
    Ok(())
}

/// Place `frames` side by side, left to right.
///
/// The result is as wide as all inputs together and as tall as the shortest one.
pub fn concatenate(frames: &[&Frame], dst: &mut Frame) -> WeaselResult<()> {
    if frames.is_empty() {
        return Err(WeaselError::execution("concatenate needs at least one frame"));
    }
    let mut width = 0u32;
    let mut height = u32::MAX;
    for f in frames {
        let e = require_data(f, "concatenate")?;
        width += e.width;
        height = height.min(e.height);
    }
    let extent = Extent::new(width, height);
    dst.ensure_extent(extent)?;

    let out_w = width as usize;
    let out = dst.pixels_mut();
    let mut x0 = 0usize;
    for f in frames {
        let fw = f.width() as usize;
        for y in 0..height as usize {
            out[y * out_w + x0..y * out_w + x0 + fw].copy_from_slice(f.row(y));
        }
        x0 += fw;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/ops/combine.rs"]
mod tests;
