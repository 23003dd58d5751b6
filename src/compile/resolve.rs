use std::collections::HashMap;

use smallvec::SmallVec;

use crate::compile::program::{FrameSlot, Operand, Operation, Program, Step};
use crate::foundation::error::{WeaselError, WeaselResult};
use crate::script::parser::{AVERAGE, Arg, INPUT, MINIMUM, OUTPUT, Target};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Visit {
    Unvisited,
    InProgress,
    Done(FrameSlot),
}

struct Resolver<'a> {
    targets: &'a [Target],
    by_name: HashMap<&'a str, usize>,
    visits: Vec<Visit>,
}

/// Compile parsed targets into an executable [`Program`].
///
/// Only targets reachable from `OUTPUT` produce steps. The final `OUTPUT` slot is renamed to
/// [`FrameSlot::Output`] so the last step writes straight into the writer's buffer.
#[tracing::instrument(skip(targets), fields(targets = targets.len()))]
pub fn compile_program(targets: &[Target]) -> WeaselResult<Program> {
    let mut resolver = Resolver {
        targets,
        by_name: targets
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.as_str(), i))
            .collect(),
        visits: vec![Visit::Unvisited; targets.len()],
    };
    if !resolver.by_name.contains_key(OUTPUT) {
        return Err(WeaselError::resolution("frame OUTPUT is not defined"));
    }

    let mut program = Program::default();
    let output = resolver.resolve(OUTPUT, &mut program)?;
    program.retire_into_output(output)?;

    for (target, visit) in targets.iter().zip(&resolver.visits) {
        if *visit == Visit::Unvisited {
            tracing::warn!(
                target = %target.name,
                line = target.line,
                "target is never used by OUTPUT"
            );
        }
    }
    tracing::debug!(
        temps = program.temp_count(),
        steps = program.steps().len(),
        "program compiled"
    );
    Ok(program)
}

impl<'a> Resolver<'a> {
    fn resolve(&mut self, name: &str, program: &mut Program) -> WeaselResult<FrameSlot> {
        match name {
            INPUT => return Ok(FrameSlot::Input),
            MINIMUM => return Ok(program.minimum()),
            AVERAGE => return Ok(program.average()),
            _ => {}
        }

        let Some(&idx) = self.by_name.get(name) else {
            return Err(WeaselError::resolution(format!(
                "frame {name} is not defined"
            )));
        };
        let targets = self.targets;
        let target = &targets[idx];
        match self.visits[idx] {
            Visit::Done(slot) => return Ok(slot),
            Visit::InProgress => {
                return Err(WeaselError::resolution(format!(
                    "target {name} (line {}) has a circular dependency",
                    target.line
                )));
            }
            Visit::Unvisited => {}
        }
        self.visits[idx] = Visit::InProgress;

        let mut resolved: Vec<(&str, FrameSlot)> = Vec::new();
        for dep in target.dependencies() {
            let slot = self
                .resolve(dep, program)
                .map_err(|err| required_by(err, target))?;
            resolved.push((dep, slot));
        }
        let lookup = |dep: &str| -> WeaselResult<FrameSlot> {
            resolved
                .iter()
                .find(|(n, _)| *n == dep)
                .map(|(_, slot)| *slot)
                .ok_or_else(|| {
                    WeaselError::resolution(format!(
                        "frame {dep} was not resolved for target {}",
                        target.name
                    ))
                })
        };

        let mut slot = program.alloc_temp();
        let mut current = if target.input_names.len() > 1 {
            let operands = target
                .input_names
                .iter()
                .map(|n| lookup(n.as_str()).map(Operand::Frame))
                .collect::<WeaselResult<SmallVec<_>>>()?;
            program.push(Step {
                operation: Operation::Concatenate,
                input: None,
                result: slot,
                operands,
            });
            slot
        } else if target.operations.is_empty() {
            program.push(Step {
                operation: Operation::Copy,
                input: Some(lookup(target.input_names[0].as_str())?),
                result: slot,
                operands: SmallVec::new(),
            });
            slot
        } else {
            lookup(target.input_names[0].as_str())?
        };

        for inv in &target.operations {
            let operands = inv
                .args
                .iter()
                .map(|arg| match arg {
                    Arg::Frame(n) => lookup(n.as_str()).map(Operand::Frame),
                    Arg::Float(v) => Ok(Operand::Float(*v)),
                    Arg::Int(v) => Ok(Operand::Int(*v)),
                })
                .collect::<WeaselResult<SmallVec<_>>>()?;
            let mut result = slot;
            if !inv.command.runs_in_place() && current == result {
                result = program.alloc_temp();
                slot = result;
            }
            program.push(Step {
                operation: Operation::Apply(inv.command),
                input: Some(current),
                result,
                operands,
            });
            current = result;
        }

        self.visits[idx] = Visit::Done(slot);
        Ok(slot)
    }
}

fn required_by(err: WeaselError, target: &Target) -> WeaselError {
    match err {
        WeaselError::Resolution(msg) => WeaselError::resolution(format!(
            "{msg}\n  required by target {} (line {})",
            target.name, target.line
        )),
        other => other,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/resolve.rs"]
mod tests;
