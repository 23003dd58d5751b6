use crate::foundation::error::WeaselResult;
use crate::frame::model::Frame;

use super::copy;

/// Median filter over a `(2r+1)^2` neighbourhood.
///
/// A radius below 1 or above half the width falls back to 1. Pixels closer than `r` to an edge
/// are copied.
pub fn despeckle_median(src: &Frame, dst: &mut Frame, radius: i32) -> WeaselResult<()> {
    copy(src, dst)?;
    let (w, h) = (src.width() as usize, src.height() as usize);
    let r = match usize::try_from(radius) {
        Ok(r) if r >= 1 && r <= w / 2 => r,
        _ => 1,
    };
    if w <= 2 * r || h <= 2 * r {
        return Ok(());
    }

    let n = (2 * r + 1) * (2 * r + 1);
    let mid = (n - 1) / 2;
    let mut vals = Vec::with_capacity(n);
    let out = dst.pixels_mut();
    for y in r..h - r {
        for x in r..w - r {
            vals.clear();
            for yy in y - r..=y + r {
                vals.extend_from_slice(&src.row(yy)[x - r..=x + r]);
            }
            let (_, median, _) = vals.select_nth_unstable_by(mid, f32::total_cmp);
            out[y * w + x] = *median;
        }
    }
    Ok(())
}

/// Kuwahara smoothing with quadrant half-width `half` (below 1 falls back to 1).
///
/// Each pixel takes the mean of whichever of its four `(half+1)^2` quadrants has the lowest
/// variance; ties keep the earlier quadrant. Border strips of width `half` are copied.
pub fn kuwahara(src: &Frame, dst: &mut Frame, half: i32) -> WeaselResult<()> {
    copy(src, dst)?;
    let (w, h) = (src.width() as usize, src.height() as usize);
    let l = usize::try_from(half).ok().filter(|l| *l >= 1).unwrap_or(1);
    if w <= 2 * l || h <= 2 * l {
        return Ok(());
    }

    let num = ((l + 1) * (l + 1)) as f32;
    let px = src.pixels();
    let out = dst.pixels_mut();
    let stats = |x0: usize, y0: usize| {
        let (mut sum, mut sum_sq) = (0.0f32, 0.0f32);
        for y in y0..=y0 + l {
            for &v in &px[y * w + x0..=y * w + x0 + l] {
                sum += v;
                sum_sq += v * v;
            }
        }
        let mean = sum / num;
        (mean, sum_sq / num - mean * mean)
    };

    for y in l..h - l {
        for x in l..w - l {
            let quadrants = [(x - l, y), (x, y), (x - l, y - l), (x, y - l)];
            let mut best = stats(quadrants[0].0, quadrants[0].1);
            for &(qx, qy) in &quadrants[1..] {
                let candidate = stats(qx, qy);
                if candidate.1 < best.1 {
                    best = candidate;
                }
            }
            out[y * w + x] = best.0;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/ops/filter.rs"]
mod tests;
