use crate::frame::model::Frame;

/// Stretch values so the minimum maps to 0 and the maximum to 1. A flat frame becomes all zeros.
pub fn normalize(frame: &mut Frame) {
    let px = frame.pixels_mut();
    let Some(&first) = px.first() else {
        return;
    };
    let (min, max) = px
        .iter()
        .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;
    if range <= 0.0 {
        px.fill(0.0);
        return;
    }
    let amp = 1.0 / range;
    for v in px.iter_mut() {
        *v = (*v - min) * amp;
    }
}

/// Multiply every pixel by `factor`.
pub fn amplify(frame: &mut Frame, factor: f32) {
    for v in frame.pixels_mut() {
        *v *= factor;
    }
}

/// Gamma correction relative to 1.0: negative values become 0, others `v^(1/g)`.
pub fn gamma(frame: &mut Frame, g: f32) {
    let exponent = 1.0 / g;
    for v in frame.pixels_mut() {
        *v = if *v < 0.0 { 0.0 } else { v.powf(exponent) };
    }
}

/// Add `delta` to every pixel.
pub fn offset(frame: &mut Frame, delta: f32) {
    for v in frame.pixels_mut() {
        *v += delta;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ops/point.rs"]
mod tests;
