//! Spiceweasel enhances camera frame sequences with small processing scripts.
//!
//! A script names targets built from the centre frame of a sliding window (`INPUT`), per-pixel
//! background estimates over the window (`MINIMUM`, `AVERAGE`) and other targets. The flow is:
//!
//! - Parse a script with [`parse_script`] and compile it with [`compile_program`]
//! - Build a [`Pipeline`] over a frame range and window size
//! - Stream frames from a [`FrameSource`] into a [`FrameSink`]
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod compile;
pub(crate) mod exec;
pub(crate) mod frame;
pub(crate) mod io;
/// Frame operators usable outside a script.
pub mod ops;
pub(crate) mod pipeline;
pub(crate) mod script;

pub use crate::foundation::core::{Extent, FrameIndex, FrameRange};
pub use crate::foundation::error::{WeaselError, WeaselResult};

pub use crate::compile::program::{FrameSlot, Operand, Operation, Program, Step};
pub use crate::compile::resolve::compile_program;
pub use crate::exec::executor::Executor;
pub use crate::frame::model::Frame;
pub use crate::frame::window::FrameWindow;
pub use crate::io::colormap::{ColorMap, ColorStop};
pub use crate::io::image_seq::{ImageSequenceSink, ImageSequenceSource, quantise_grey};
pub use crate::io::sink::{FrameSink, InMemorySink};
pub use crate::io::source::{FrameSource, InMemorySource};
pub use crate::io::template::{FrameFormat, FrameTemplate};
pub use crate::pipeline::session::{Cycle, Pipeline, PipelineOpts, PipelineStats, Threading};
pub use crate::script::command::{ArgKind, Command};
pub use crate::script::locate::{
    DEFAULT_SCRIPT, SCRIPT_EXTENSION, SCRIPT_PATH_ENV, SHARED_SCRIPT_DIR, ScriptSearch,
    locate_script,
};
pub use crate::script::parser::{
    AVERAGE, Arg, INPUT, Invocation, MINIMUM, OUTPUT, Target, parse_script,
};

/// Parse and compile script text in one go.
pub fn compile_script(text: &str) -> WeaselResult<Program> {
    compile_program(&parse_script(text)?)
}
