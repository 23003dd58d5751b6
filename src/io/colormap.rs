use crate::foundation::error::{WeaselError, WeaselResult};

/// One control point of a [`ColorMap`]; channels are in `0..=255`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    /// Intensity the colour is pinned to.
    pub value: f32,
    /// Red, green, blue.
    pub rgb: [f32; 3],
}

/// Piecewise-linear intensity to RGB mapping used for colour output.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorMap {
    stops: Vec<ColorStop>,
}

impl ColorMap {
    /// Build a map from at least two stops with strictly increasing values.
    pub fn new(stops: Vec<ColorStop>) -> WeaselResult<Self> {
        if stops.len() < 2 {
            return Err(WeaselError::validation("a colour map needs at least two stops"));
        }
        if stops.windows(2).any(|w| w[1].value <= w[0].value) {
            return Err(WeaselError::validation(
                "colour map stops must have strictly increasing values",
            ));
        }
        Ok(Self { stops })
    }

    /// Black, red, yellow, white.
    pub fn yellow_temperature() -> Self {
        let stop = |value, rgb| ColorStop { value, rgb };
        Self {
            stops: vec![
                stop(0.00, [0.0, 0.0, 0.0]),
                stop(0.33, [255.0, 0.0, 0.0]),
                stop(0.67, [255.0, 255.0, 0.0]),
                stop(1.00, [255.0, 255.0, 255.0]),
            ],
        }
    }

    /// Colour of intensity `v`; values outside the stop range take the end colours.
    pub fn map(&self, v: f32) -> [u8; 3] {
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        if v.is_nan() || v <= first.value {
            return quantise(first.rgb);
        }
        if v >= last.value {
            return quantise(last.rgb);
        }
        let p = self
            .stops
            .iter()
            .position(|s| s.value >= v)
            .unwrap_or(self.stops.len() - 1);
        let (lo, hi) = (self.stops[p - 1], self.stops[p]);
        let span = hi.value - lo.value;
        let (w_hi, w_lo) = ((v - lo.value) / span, (hi.value - v) / span);
        let mut rgb = [0.0f32; 3];
        for (c, out) in rgb.iter_mut().enumerate() {
            *out = hi.rgb[c] * w_hi + lo.rgb[c] * w_lo;
        }
        quantise(rgb)
    }
}

fn quantise(rgb: [f32; 3]) -> [u8; 3] {
    rgb.map(|c| (0.5 + c) as u8)
}

#[cfg(test)]
#[path = "../../tests/unit/io/colormap.rs"]
mod tests;
