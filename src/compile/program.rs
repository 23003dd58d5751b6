use std::fmt;

use smallvec::SmallVec;

use crate::foundation::error::{WeaselError, WeaselResult};
use crate::script::command::Command;

/// Frame buffer addressed by a compiled step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameSlot {
    /// Centre frame of the input window.
    Input,
    /// Frame handed to the writer.
    Output,
    /// Executor-owned temporary, dense in `0..temp_count`.
    Temp(u32),
}

impl fmt::Display for FrameSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("INPUT"),
            Self::Output => f.write_str("OUTPUT"),
            Self::Temp(id) => write!(f, "<{id}>"),
        }
    }
}

/// Resolved step argument.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// Floating point literal.
    Float(f32),
    /// Integer literal.
    Int(i32),
    /// Another frame buffer.
    Frame(FrameSlot),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v:.6}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Frame(slot) => write!(f, "{slot}"),
        }
    }
}

/// What a step does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Run a script command.
    Apply(Command),
    /// Place the operand frames side by side, left to right.
    Concatenate,
    /// Duplicate the input frame.
    Copy,
}

impl Operation {
    fn label(self) -> &'static str {
        match self {
            Self::Apply(Command::Subtract) => "Subtract",
            Self::Apply(Command::Normalize) => "Normalize",
            Self::Apply(Command::Amplify) => "Multiply",
            Self::Apply(Command::Gamma) => "Gamma",
            Self::Apply(Command::Offset) => "Offset",
            Self::Apply(Command::DespeckleMedian) => "Median despeckle",
            Self::Apply(Command::Kuwahara) => "Kuwahara filter",
            Self::Apply(Command::Sharpen) => "Sharpen",
            Self::Apply(Command::UnsharpMask) => "Unsharp mask",
            Self::Apply(Command::GaussBlur) => "Gaussian blur",
            Self::Concatenate => "Concatenate",
            Self::Copy => "Copy",
        }
    }
}

/// One instruction of a compiled [`Program`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Step {
    /// Operation to run.
    pub operation: Operation,
    /// Frame the operation reads; `None` for [`Operation::Concatenate`], which reads its operands.
    pub input: Option<FrameSlot>,
    /// Frame the operation writes.
    pub result: FrameSlot,
    /// Extra arguments, in script order.
    pub operands: SmallVec<[Operand; 2]>,
}

impl Step {
    /// Every slot the step touches.
    pub fn slots(&self) -> impl Iterator<Item = FrameSlot> + '_ {
        self.input
            .into_iter()
            .chain(std::iter::once(self.result))
            .chain(self.operands.iter().filter_map(|op| match op {
                Operand::Frame(slot) => Some(*slot),
                _ => None,
            }))
    }

    fn rename(&mut self, from: FrameSlot, to: FrameSlot) {
        let swap = |slot: &mut FrameSlot| {
            if *slot == from {
                *slot = to;
            }
        };
        if let Some(input) = self.input.as_mut() {
            swap(input);
        }
        swap(&mut self.result);
        for op in self.operands.iter_mut() {
            if let Operand::Frame(slot) = op {
                swap(slot);
            }
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.operation, self.input) {
            (Operation::Apply(Command::Amplify), Some(input)) => {
                write!(f, "{input} * {}", self.operands[0])?;
            }
            (Operation::Apply(Command::Offset), Some(input)) => {
                write!(f, "{input} + {}", self.operands[0])?;
            }
            (Operation::Copy, Some(input)) => write!(f, "{input}")?,
            (op, input) => {
                write!(f, "{}(", op.label())?;
                let mut first = true;
                for slot in input {
                    write!(f, "{slot}")?;
                    first = false;
                }
                for operand in &self.operands {
                    if !first {
                        f.write_str(", ")?;
                    }
                    write!(f, "{operand}")?;
                    first = false;
                }
                f.write_str(")")?;
            }
        }
        write!(f, " => {}", self.result)
    }
}

/// Immutable, executable form of a script.
///
/// Temporaries are numbered densely from zero. `MINIMUM` and `AVERAGE` are computed once per output
/// frame into their slots before the steps run.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct Program {
    temp_count: u32,
    minimum_slot: Option<FrameSlot>,
    average_slot: Option<FrameSlot>,
    steps: Vec<Step>,
}

impl Program {
    /// Number of temporaries the executor has to own.
    pub fn temp_count(&self) -> u32 {
        self.temp_count
    }

    /// Slot receiving the per-pixel window minimum, when the script uses `MINIMUM`.
    pub fn minimum_slot(&self) -> Option<FrameSlot> {
        self.minimum_slot
    }

    /// Slot receiving the per-pixel window mean, when the script uses `AVERAGE`.
    pub fn average_slot(&self) -> Option<FrameSlot> {
        self.average_slot
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub(crate) fn alloc_temp(&mut self) -> FrameSlot {
        let slot = FrameSlot::Temp(self.temp_count);
        self.temp_count += 1;
        slot
    }

    pub(crate) fn minimum(&mut self) -> FrameSlot {
        match self.minimum_slot {
            Some(slot) => slot,
            None => {
                let slot = self.alloc_temp();
                self.minimum_slot = Some(slot);
                slot
            }
        }
    }

    pub(crate) fn average(&mut self) -> FrameSlot {
        match self.average_slot {
            Some(slot) => slot,
            None => {
                let slot = self.alloc_temp();
                self.average_slot = Some(slot);
                slot
            }
        }
    }

    pub(crate) fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Turn the most recently allocated temporary into [`FrameSlot::Output`].
    pub(crate) fn retire_into_output(&mut self, slot: FrameSlot) -> WeaselResult<()> {
        let last = self.temp_count.checked_sub(1).map(FrameSlot::Temp);
        if last != Some(slot) {
            return Err(WeaselError::resolution(format!(
                "could not compile script: OUTPUT resolved to {slot}, not the last allocated frame"
            )));
        }
        for step in &mut self.steps {
            step.rename(slot, FrameSlot::Output);
        }
        self.temp_count -= 1;
        Ok(())
    }

    /// Check that every slot refers to an allocated temporary or a sentinel.
    pub fn check_slots(&self) -> WeaselResult<()> {
        let in_range = |slot: FrameSlot| match slot {
            FrameSlot::Temp(id) => id < self.temp_count,
            FrameSlot::Input | FrameSlot::Output => true,
        };
        for special in [self.minimum_slot, self.average_slot].into_iter().flatten() {
            if !matches!(special, FrameSlot::Temp(_)) || !in_range(special) {
                return Err(WeaselError::validation(format!(
                    "background slot {special} is not a temporary"
                )));
            }
        }
        for (n, step) in self.steps.iter().enumerate() {
            if let Some(bad) = step.slots().find(|s| !in_range(*s)) {
                return Err(WeaselError::validation(format!(
                    "step {n} references unallocated slot {bad}"
                )));
            }
            if step.result == FrameSlot::Input {
                return Err(WeaselError::validation(format!(
                    "step {n} writes into INPUT"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Frames required: {}", self.temp_count)?;
        if let Some(slot) = self.minimum_slot {
            writeln!(f, "Calculate minimum => {slot}")?;
        }
        if let Some(slot) = self.average_slot {
            writeln!(f, "Calculate average => {slot}")?;
        }
        for step in &self.steps {
            writeln!(f, "{step}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/program.rs"]
mod tests;
