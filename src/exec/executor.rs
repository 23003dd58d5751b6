use smallvec::SmallVec;

use crate::compile::program::{FrameSlot, Operand, Operation, Program, Step};
use crate::foundation::error::{WeaselError, WeaselResult};
use crate::frame::model::Frame;
use crate::frame::window::FrameWindow;
use crate::ops;
use crate::script::command::Command;

/// Runs a compiled [`Program`] once per output frame.
///
/// The executor owns the temporaries; they keep their allocation between frames so only the first
/// run sizes them.
#[derive(Debug)]
pub struct Executor {
    program: Program,
    temps: Vec<Frame>,
}

impl Executor {
    /// Validate `program` and allocate (empty) temporaries for it.
    pub fn new(program: Program) -> WeaselResult<Self> {
        program.check_slots()?;
        let temps = vec![Frame::default(); program.temp_count() as usize];
        Ok(Self { program, temps })
    }

    /// The program being executed.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Compute one output frame from `window` into `output`.
    ///
    /// Background passes run first, then every step in order. `output` takes the sequence number
    /// and timestamp of the window's centre frame.
    pub fn run(&mut self, window: &FrameWindow, output: &mut Frame) -> WeaselResult<()> {
        let mut slots = Slots {
            input: window.center(),
            output: &mut *output,
            temps: &mut self.temps,
        };

        if let Some(slot) = self.program.minimum_slot() {
            let mut dst = slots.take(slot)?;
            let res = ops::minimum(window.frames(), &mut dst);
            slots.put(slot, dst);
            res?;
        }
        if let Some(slot) = self.program.average_slot() {
            let mut dst = slots.take(slot)?;
            let res = ops::average(window.frames(), &mut dst);
            slots.put(slot, dst);
            res?;
        }

        for (n, step) in self.program.steps().iter().enumerate() {
            let mut dst = slots.take(step.result)?;
            let res = apply(step, &slots, &mut dst);
            slots.put(step.result, dst);
            res.map_err(|err| match err {
                WeaselError::Execution(msg) => {
                    WeaselError::execution(format!("step {n} ({step}): {msg}"))
                }
                other => other,
            })?;
        }

        output.copy_metadata_from(window.center());
        Ok(())
    }
}

/// Binding of frame slots to storage for one run.
struct Slots<'a> {
    input: &'a Frame,
    output: &'a mut Frame,
    temps: &'a mut [Frame],
}

impl Slots<'_> {
    fn get(&self, slot: FrameSlot) -> WeaselResult<&Frame> {
        match slot {
            FrameSlot::Input => Ok(self.input),
            FrameSlot::Output => Ok(self.output),
            FrameSlot::Temp(id) => self
                .temps
                .get(id as usize)
                .ok_or_else(|| WeaselError::execution(format!("slot {slot} is not allocated"))),
        }
    }

    /// Move the frame out of a writable slot, leaving an empty placeholder.
    fn take(&mut self, slot: FrameSlot) -> WeaselResult<Frame> {
        match slot {
            FrameSlot::Input => Err(WeaselError::execution("INPUT is read-only")),
            FrameSlot::Output => Ok(std::mem::take(self.output)),
            FrameSlot::Temp(id) => self
                .temps
                .get_mut(id as usize)
                .map(std::mem::take)
                .ok_or_else(|| WeaselError::execution(format!("slot {slot} is not allocated"))),
        }
    }

    fn put(&mut self, slot: FrameSlot, frame: Frame) {
        match slot {
            FrameSlot::Input => {}
            FrameSlot::Output => *self.output = frame,
            FrameSlot::Temp(id) => {
                if let Some(dst) = self.temps.get_mut(id as usize) {
                    *dst = frame;
                }
            }
        }
    }
}

fn float_at(step: &Step, i: usize) -> WeaselResult<f32> {
    match step.operands.get(i) {
        Some(Operand::Float(v)) => Ok(*v),
        other => Err(WeaselError::execution(format!(
            "operand {i} should be a number, found {other:?}"
        ))),
    }
}

fn int_at(step: &Step, i: usize) -> WeaselResult<i32> {
    match step.operands.get(i) {
        Some(Operand::Int(v)) => Ok(*v),
        other => Err(WeaselError::execution(format!(
            "operand {i} should be an integer, found {other:?}"
        ))),
    }
}

fn frame_at(step: &Step, i: usize) -> WeaselResult<FrameSlot> {
    match step.operands.get(i) {
        Some(Operand::Frame(slot)) => Ok(*slot),
        other => Err(WeaselError::execution(format!(
            "operand {i} should be a frame, found {other:?}"
        ))),
    }
}

/// Run one step; `dst` has been moved out of `step.result`.
fn apply(step: &Step, slots: &Slots<'_>, dst: &mut Frame) -> WeaselResult<()> {
    for (i, op) in step.operands.iter().enumerate() {
        if *op == Operand::Frame(step.result) {
            return Err(WeaselError::execution(format!(
                "operand {i} aliases the result frame"
            )));
        }
    }

    let input_slot = match (step.operation, step.input) {
        (Operation::Concatenate, _) => {
            let frames = (0..step.operands.len())
                .map(|i| frame_at(step, i).and_then(|s| slots.get(s)))
                .collect::<WeaselResult<SmallVec<[&Frame; 4]>>>()?;
            return ops::concatenate(&frames, dst);
        }
        (_, Some(input)) => input,
        (op, None) => {
            return Err(WeaselError::execution(format!("{op:?} has no input frame")));
        }
    };

    if input_slot == step.result {
        // `dst` already holds the input.
        return match step.operation {
            Operation::Apply(cmd) if cmd.runs_in_place() => apply_in_place(cmd, step, dst),
            Operation::Copy => Ok(()),
            op => Err(WeaselError::execution(format!(
                "{op:?} cannot write over its own input"
            ))),
        };
    }

    let src = slots.get(input_slot)?;
    match step.operation {
        Operation::Copy => ops::copy(src, dst),
        Operation::Concatenate => Err(WeaselError::execution(
            "concatenate reads its operands, not an input frame",
        )),
        Operation::Apply(cmd) => match cmd {
            Command::Subtract => {
                let background = slots.get(frame_at(step, 0)?)?;
                ops::subtract(src, background, dst)
            }
            Command::Normalize | Command::Amplify | Command::Gamma | Command::Offset => {
                ops::copy(src, dst)?;
                apply_in_place(cmd, step, dst)
            }
            Command::DespeckleMedian => ops::despeckle_median(src, dst, int_at(step, 0)?),
            Command::Kuwahara => ops::kuwahara(src, dst, int_at(step, 0)?),
            Command::Sharpen => ops::sharpen(src, dst, float_at(step, 0)?),
            Command::UnsharpMask => {
                ops::unsharp_mask(src, dst, float_at(step, 0)?, float_at(step, 1)?)
            }
            Command::GaussBlur => ops::gauss_blur(src, dst, float_at(step, 0)?),
        },
    }
}

fn apply_in_place(cmd: Command, step: &Step, frame: &mut Frame) -> WeaselResult<()> {
    if !frame.is_allocated() {
        return Err(WeaselError::execution(format!(
            "{cmd} reads a frame that holds no data"
        )));
    }
    match cmd {
        Command::Normalize => ops::normalize(frame),
        Command::Amplify => ops::amplify(frame, float_at(step, 0)?),
        Command::Gamma => ops::gamma(frame, float_at(step, 0)?),
        Command::Offset => ops::offset(frame, float_at(step, 0)?),
        other => {
            return Err(WeaselError::execution(format!(
                "{other} cannot run in place"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/exec/executor.rs"]
mod tests;
