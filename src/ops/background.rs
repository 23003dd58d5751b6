use crate::foundation::error::{WeaselError, WeaselResult};
use crate::frame::model::Frame;

use super::prepare;

fn check_window(frames: &[Frame], op: &str) -> WeaselResult<()> {
    if frames.is_empty() {
        return Err(WeaselError::execution(format!("{op} of an empty window")));
    }
    Ok(())
}

/// Per-pixel minimum across `frames`.
pub fn minimum(frames: &[Frame], dst: &mut Frame) -> WeaselResult<()> {
    check_window(frames, "minimum")?;
    prepare(&frames[0], dst, "minimum")?;
    let out = dst.pixels_mut();
    out.copy_from_slice(frames[0].pixels());
    for f in &frames[1..] {
        for (o, &v) in out.iter_mut().zip(f.pixels()) {
            if v < *o {
                *o = v;
            }
        }
    }
    Ok(())
}

/// Per-pixel arithmetic mean across `frames`.
pub fn average(frames: &[Frame], dst: &mut Frame) -> WeaselResult<()> {
    check_window(frames, "average")?;
    prepare(&frames[0], dst, "average")?;
    let out = dst.pixels_mut();
    out.copy_from_slice(frames[0].pixels());
    for f in &frames[1..] {
        for (o, &v) in out.iter_mut().zip(f.pixels()) {
            *o += v;
        }
    }
    let n = frames.len() as f32;
    for o in out.iter_mut() {
        *o /= n;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/ops/background.rs"]
mod tests;
