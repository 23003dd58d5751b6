use super::*;
use crate::compile::resolve::compile_program;
use crate::foundation::core::{Extent, FrameIndex};
use crate::script::parser::parse_script;

fn executor(text: &str) -> Executor {
    let program = compile_program(&parse_script(text).unwrap()).unwrap();
    Executor::new(program).unwrap()
}

fn window(values: &[f32], extent: Extent) -> FrameWindow {
    let frames = values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let mut f = Frame::filled(FrameIndex(10 + i as u64), extent, v);
            f.time = i as f64 * 0.5;
            f
        })
        .collect();
    FrameWindow::new(frames).unwrap()
}

#[test]
fn amplify_doubles_the_centre_frame() {
    let mut exec = executor("OUTPUT: INPUT\n AMPLIFY 2.0");
    let win = window(&[0.3], Extent::new(2, 2));
    let mut out = Frame::default();
    exec.run(&win, &mut out).unwrap();
    assert_eq!(out.pixels(), &[0.6; 4]);
    assert_eq!(out.index, FrameIndex(10));
}

#[test]
fn output_takes_centre_metadata() {
    let mut exec = executor("OUTPUT: INPUT");
    let win = window(&[0.1, 0.2, 0.3], Extent::new(1, 1));
    let mut out = Frame::default();
    exec.run(&win, &mut out).unwrap();
    assert_eq!(out.index, FrameIndex(11));
    assert_eq!(out.time, 0.5);
    assert_eq!(out.pixels(), &[0.2]);
}

#[test]
fn background_subtraction_uses_window_minimum() {
    let mut exec = executor("BG: MINIMUM\nOUTPUT: INPUT\n SUBTRACT BG\n AMPLIFY 2");
    let win = window(&[0.25, 0.75, 0.5], Extent::new(3, 1));
    let mut out = Frame::default();
    exec.run(&win, &mut out).unwrap();
    assert_eq!(out.pixels(), &[1.0; 3]);
}

#[test]
fn average_feeds_several_targets() {
    let mut exec = executor("A: AVERAGE\n OFFSET 1\nB: AVERAGE\nOUTPUT: A, B");
    let win = window(&[0.0, 0.5, 1.0], Extent::new(1, 2));
    let mut out = Frame::default();
    exec.run(&win, &mut out).unwrap();
    assert_eq!(out.extent(), Extent::new(2, 2));
    assert_eq!(out.pixels(), &[1.5, 0.5, 1.5, 0.5]);
}

#[test]
fn concatenated_output_is_double_width() {
    let mut exec = executor("OUTPUT: INPUT, MINIMUM");
    let win = window(&[0.4, 0.8, 0.6], Extent::new(2, 1));
    let mut out = Frame::default();
    exec.run(&win, &mut out).unwrap();
    assert_eq!(out.extent(), Extent::new(4, 1));
    assert_eq!(out.pixels(), &[0.8, 0.8, 0.4, 0.4]);
}

#[test]
fn temporaries_are_reused_across_frames() {
    let mut exec = executor("OUTPUT: INPUT\n GAUSS_BLUR 1\n GAUSS_BLUR 1\n OFFSET 1");
    let extent = Extent::new(4, 4);
    let mut win = window(&[0.0, 0.25, 0.5], extent);
    let mut out = Frame::default();
    exec.run(&win, &mut out).unwrap();
    for &v in out.pixels() {
        assert!((v - 1.25).abs() < 1e-5);
    }

    let evicted = win
        .advance(Frame::filled(FrameIndex(13), extent, 0.75))
        .unwrap();
    assert_eq!(evicted.index, FrameIndex(10));
    exec.run(&win, &mut out).unwrap();
    assert_eq!(out.index, FrameIndex(12));
    for &v in out.pixels() {
        assert!((v - 1.5).abs() < 1e-5);
    }
}

#[test]
fn non_in_place_step_over_its_input_is_rejected() {
    let mut program = Program::default();
    let t = program.alloc_temp();
    program.push(Step {
        operation: Operation::Copy,
        input: Some(FrameSlot::Input),
        result: t,
        operands: SmallVec::new(),
    });
    program.push(Step {
        operation: Operation::Apply(Command::GaussBlur),
        input: Some(t),
        result: t,
        operands: smallvec::smallvec![Operand::Float(1.0)],
    });
    program.push(Step {
        operation: Operation::Copy,
        input: Some(t),
        result: FrameSlot::Output,
        operands: SmallVec::new(),
    });
    let mut exec = Executor::new(program).unwrap();
    let win = window(&[0.5], Extent::new(2, 2));
    let mut out = Frame::default();
    let err = exec.run(&win, &mut out).unwrap_err();
    assert!(matches!(err, WeaselError::Execution(_)));
    assert!(err.to_string().contains("cannot write over its own input"), "{err}");
}

#[test]
fn operand_aliasing_the_result_is_rejected() {
    let mut program = Program::default();
    program.push(Step {
        operation: Operation::Apply(Command::Subtract),
        input: Some(FrameSlot::Input),
        result: FrameSlot::Output,
        operands: smallvec::smallvec![Operand::Frame(FrameSlot::Output)],
    });
    let mut exec = Executor::new(program).unwrap();
    let win = window(&[0.5], Extent::new(1, 1));
    let mut out = Frame::default();
    let err = exec.run(&win, &mut out).unwrap_err();
    assert!(err.to_string().contains("aliases the result"), "{err}");
}

#[test]
fn programs_with_dangling_slots_are_refused() {
    let mut program = Program::default();
    program.push(Step {
        operation: Operation::Copy,
        input: Some(FrameSlot::Temp(0)),
        result: FrameSlot::Output,
        operands: SmallVec::new(),
    });
    assert!(Executor::new(program).is_err());
}
