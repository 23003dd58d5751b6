use smallvec::SmallVec;

use crate::foundation::error::{WeaselError, WeaselResult};
use crate::script::command::{ArgKind, Command};
use crate::script::lines::script_lines;

/// Reserved frame name for the centre frame of the input window.
pub const INPUT: &str = "INPUT";
/// Reserved frame name for the final result of the script.
pub const OUTPUT: &str = "OUTPUT";
/// Reserved frame name for the per-pixel minimum across the window.
pub const MINIMUM: &str = "MINIMUM";
/// Reserved frame name for the per-pixel mean across the window.
pub const AVERAGE: &str = "AVERAGE";

const PREDEFINED: [&str; 3] = [INPUT, MINIMUM, AVERAGE];

/// Literal argument of a step, typed according to the command signature.
#[derive(Clone, Debug, PartialEq)]
pub enum Arg {
    /// Reference to another frame by name.
    Frame(String),
    /// Floating point literal.
    Float(f32),
    /// Integer literal.
    Int(i32),
}

/// One processing step as written in the script.
#[derive(Clone, Debug, PartialEq)]
pub struct Invocation {
    /// Command to run.
    pub command: Command,
    /// Arguments matching [`Command::signature`].
    pub args: SmallVec<[Arg; 2]>,
    /// Script line of the step.
    pub line: usize,
}

/// A named target: its input frames and the processing steps applied to them.
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    /// Target name (`OUTPUT` for the script result).
    pub name: String,
    /// Line the target was defined on.
    pub line: usize,
    /// Input frame names in declaration order; concatenated left to right when more than one.
    pub input_names: Vec<String>,
    /// Processing steps in script order.
    pub operations: Vec<Invocation>,
}

impl Target {
    /// Every frame this target reads: its inputs, then frame-valued step arguments not already
    /// listed.
    pub fn dependencies(&self) -> Vec<&str> {
        let mut deps: Vec<&str> = self.input_names.iter().map(String::as_str).collect();
        for inv in &self.operations {
            for arg in &inv.args {
                if let Arg::Frame(name) = arg
                    && !deps.contains(&name.as_str())
                {
                    deps.push(name);
                }
            }
        }
        deps
    }
}

/// Parse script text into its target list.
///
/// The result always contains exactly one `OUTPUT` target.
#[tracing::instrument(skip(text), fields(bytes = text.len()))]
pub fn parse_script(text: &str) -> WeaselResult<Vec<Target>> {
    let mut targets: Vec<Target> = Vec::new();
    let mut last_line = 0;

    for (line, content) in script_lines(text) {
        last_line = line;
        if content.contains(':') {
            let target = parse_target_line(line, content, &targets)?;
            tracing::trace!(target = %target.name, line, "target defined");
            targets.push(target);
            continue;
        }

        let keyword = content.split_whitespace().next().unwrap_or_default();
        if keyword == "INCLUDE" {
            return Err(WeaselError::script(
                line,
                "INCLUDE is not supported; merge the scripts instead",
            ));
        }
        let Some(current) = targets.last_mut() else {
            return Err(WeaselError::script(
                line,
                format!("step {keyword} appears before any target definition"),
            ));
        };
        let inv = parse_step_line(line, content, &current.name)?;
        current.operations.push(inv);
    }

    if !targets.iter().any(|t| t.name == OUTPUT) {
        return Err(WeaselError::script(last_line, "no OUTPUT target defined"));
    }
    Ok(targets)
}

fn parse_target_line(line: usize, content: &str, existing: &[Target]) -> WeaselResult<Target> {
    let (name_part, input_part) = content.split_once(':').unwrap_or((content, ""));
    let name: String = name_part.chars().filter(|c| !c.is_whitespace()).collect();
    let inputs: String = input_part.chars().filter(|c| !c.is_whitespace()).collect();

    if name.is_empty() {
        return Err(WeaselError::script(line, "target name is empty"));
    }
    if PREDEFINED.contains(&name.as_str()) {
        return Err(WeaselError::script(
            line,
            format!("cannot use {name} as a target; it is a predefined frame"),
        ));
    }
    if let Some(prev) = existing.iter().find(|t| t.name == name) {
        let message = if name == OUTPUT {
            format!("output target already defined on line {}", prev.line)
        } else {
            format!("target {name} already defined on line {}", prev.line)
        };
        return Err(WeaselError::script(line, message));
    }
    if inputs.is_empty() {
        return Err(WeaselError::script(
            line,
            format!("no input for target {name}"),
        ));
    }

    let mut input_names = Vec::new();
    for part in inputs.split(',') {
        if part.is_empty() {
            return Err(WeaselError::script(
                line,
                format!("zero-length input for target {name} (extra comma?)"),
            ));
        }
        input_names.push(part.to_owned());
    }

    Ok(Target {
        name,
        line,
        input_names,
        operations: Vec::new(),
    })
}

fn parse_step_line(line: usize, content: &str, target: &str) -> WeaselResult<Invocation> {
    let mut tokens = content.split_whitespace();
    let keyword = tokens.next().unwrap_or_default();
    let command = Command::from_keyword(keyword).ok_or_else(|| {
        WeaselError::script(line, format!("unknown command {keyword} in target {target}"))
    })?;

    let raw: Vec<&str> = tokens.collect();
    let signature = command.signature();
    let arity_error = || {
        WeaselError::script(
            line,
            format!(
                "{command} in target {target} takes {}",
                command.describe_signature()
            ),
        )
    };
    if raw.len() != signature.len() {
        return Err(arity_error());
    }

    let mut args = SmallVec::new();
    for (token, kind) in raw.iter().zip(signature) {
        let arg = match kind {
            ArgKind::Frame => Arg::Frame((*token).to_owned()),
            ArgKind::Float => match token.parse::<f32>() {
                Ok(v) if v.is_finite() => Arg::Float(v),
                _ => return Err(arity_error()),
            },
            ArgKind::Int => token.parse::<i32>().map(Arg::Int).map_err(|_| arity_error())?,
        };
        args.push(arg);
    }

    Ok(Invocation {
        command,
        args,
        line,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/script/parser.rs"]
mod tests;
