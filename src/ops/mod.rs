//! Frame operators.
//!
//! Operators that produce a new frame take `(src, dst)` and size `dst` on first use; a later size
//! mismatch is an execution error. Point operators rewrite a frame in place.

pub(crate) mod background;
pub(crate) mod blur;
pub(crate) mod combine;
pub(crate) mod filter;
pub(crate) mod point;

use crate::foundation::core::Extent;
use crate::foundation::error::{WeaselError, WeaselResult};
use crate::frame::model::Frame;

pub use background::{average, minimum};
pub use blur::{gauss_blur, gauss_kernel, sharpen, unsharp_mask};
pub use combine::{concatenate, copy, subtract};
pub use filter::{despeckle_median, kuwahara};
pub use point::{amplify, gamma, normalize, offset};

fn require_data(frame: &Frame, op: &str) -> WeaselResult<Extent> {
    if !frame.is_allocated() {
        return Err(WeaselError::execution(format!(
            "{op} reads a frame that holds no data"
        )));
    }
    Ok(frame.extent())
}

/// Size `dst` like `src` and return the shared extent.
fn prepare(src: &Frame, dst: &mut Frame, op: &str) -> WeaselResult<Extent> {
    let extent = require_data(src, op)?;
    dst.ensure_extent(extent)?;
    Ok(extent)
}
