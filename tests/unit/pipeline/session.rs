use super::*;
use crate::compile::resolve::compile_program;
use crate::foundation::core::Extent;
use crate::io::sink::InMemorySink;
use crate::io::source::InMemorySource;
use crate::script::parser::parse_script;

fn program(text: &str) -> Program {
    compile_program(&parse_script(text).unwrap()).unwrap()
}

fn ramp(first: u64, last: u64) -> InMemorySource {
    let frames = (first..=last)
        .map(|i| {
            let mut f = Frame::filled(FrameIndex(i), Extent::new(2, 1), i as f32);
            f.time = i as f64 / 25.0;
            f
        })
        .collect();
    InMemorySource::new(frames)
}

fn opts(first: u64, last: u64, window: usize, threading: Threading) -> PipelineOpts {
    PipelineOpts {
        range: FrameRange {
            first: FrameIndex(first),
            last: FrameIndex(last),
        },
        window,
        threading,
    }
}

fn run(text: &str, opts: PipelineOpts, source: &mut InMemorySource) -> (PipelineStats, InMemorySink) {
    let mut pipeline = Pipeline::new(program(text), opts).unwrap();
    let mut sink = InMemorySink::new();
    let stats = pipeline.run(source, &mut sink).unwrap();
    (stats, sink)
}

#[test]
fn cycle_flips_between_halves() {
    assert_eq!(Cycle::Zero.flip(), Cycle::One);
    assert_eq!(Cycle::One.flip().flip(), Cycle::One);
}

#[test]
fn opts_reject_even_or_empty_window() {
    assert!(opts(0, 9, 4, Threading::Threaded).validate().is_err());
    assert!(opts(0, 9, 0, Threading::Threaded).validate().is_err());
    assert!(opts(0, 9, 5, Threading::Threaded).validate().is_ok());
}

#[test]
fn opts_reject_window_longer_than_range() {
    let err = opts(3, 5, 5, Threading::Threaded).validate().unwrap_err();
    assert!(err.to_string().contains("not enough frames to fill buffer"));
    assert!(opts(3, 7, 5, Threading::Threaded).validate().is_ok());
}

#[test]
fn single_threaded_covers_centre_frames() {
    let mut source = ramp(0, 9);
    let (stats, sink) = run("OUTPUT: INPUT", opts(0, 9, 3, Threading::SingleThreaded), &mut source);
    let indices: Vec<u64> = sink.frames().iter().map(|f| f.index.0).collect();
    assert_eq!(indices, (1..=8).collect::<Vec<_>>());
    assert_eq!(stats.frames_read, 10);
    assert_eq!(stats.frames_written, 8);
    assert!(sink.ended());
}

#[test]
fn threaded_covers_centre_frames() {
    let mut source = ramp(0, 9);
    let (stats, sink) = run("OUTPUT: INPUT", opts(0, 9, 3, Threading::Threaded), &mut source);
    let indices: Vec<u64> = sink.frames().iter().map(|f| f.index.0).collect();
    assert_eq!(indices, (1..=8).collect::<Vec<_>>());
    assert_eq!(stats.frames_read, 10);
    assert_eq!(stats.frames_written, 8);
    assert_eq!(source.reads(), 10);
    assert!(sink.ended());
}

#[test]
fn only_the_final_output_is_flagged_last() {
    for threading in [Threading::Threaded, Threading::SingleThreaded] {
        let mut source = ramp(0, 6);
        let (_, sink) = run("OUTPUT: INPUT", opts(0, 6, 5, threading), &mut source);
        let flags: Vec<bool> = sink.frames().iter().map(|f| f.is_last).collect();
        assert_eq!(flags, vec![false, false, true]);
    }
}

#[test]
fn threaded_matches_single_threaded() {
    let script = "BG: MINIMUM\nOUTPUT: INPUT\n SUBTRACT BG\n AMPLIFY 3\n GAUSS_BLUR 0.8";
    let mut a = ramp(2, 14);
    let mut b = ramp(2, 14);
    let (_, inline) = run(script, opts(2, 14, 5, Threading::SingleThreaded), &mut a);
    let (_, threaded) = run(script, opts(2, 14, 5, Threading::Threaded), &mut b);
    assert_eq!(inline.frames(), threaded.frames());
    assert_eq!(threaded.frames().first().map(|f| f.index), Some(FrameIndex(4)));
    assert_eq!(threaded.frames().last().map(|f| f.index), Some(FrameIndex(12)));
}

#[test]
fn window_filling_the_range_yields_one_frame() {
    for threading in [Threading::Threaded, Threading::SingleThreaded] {
        let mut source = ramp(0, 4);
        let (stats, sink) = run("OUTPUT: AVERAGE", opts(0, 4, 5, threading), &mut source);
        assert_eq!(sink.frames().len(), 1);
        assert_eq!(sink.frames()[0].index, FrameIndex(2));
        assert_eq!(sink.frames()[0].pixels(), &[2.0, 2.0]);
        assert!(sink.frames()[0].is_last);
        assert_eq!(stats.frames_read, 5);
    }
}

#[test]
fn source_ending_early_stops_the_run() {
    for threading in [Threading::Threaded, Threading::SingleThreaded] {
        let mut source = ramp(0, 5);
        let (stats, sink) = run("OUTPUT: INPUT", opts(0, 100, 3, threading), &mut source);
        assert_eq!(sink.frames().len(), 4);
        assert!(sink.frames()[3].is_last);
        assert_eq!(stats.frames_read, 6);
    }
}

#[test]
fn source_too_short_for_window_fails() {
    let mut source = ramp(0, 1);
    let mut pipeline =
        Pipeline::new(program("OUTPUT: INPUT"), opts(0, 20, 3, Threading::Threaded)).unwrap();
    let mut sink = InMemorySink::new();
    let err = pipeline.run(&mut source, &mut sink).unwrap_err();
    assert!(err.to_string().contains("not enough frames to fill buffer"));
}

#[test]
fn missing_input_frame_surfaces_decode_error() {
    for threading in [Threading::Threaded, Threading::SingleThreaded] {
        let frames = [0u64, 1, 2, 3, 5, 6]
            .iter()
            .map(|&i| Frame::filled(FrameIndex(i), Extent::new(1, 1), 0.0))
            .collect();
        let mut source = InMemorySource::new(frames);
        let mut pipeline =
            Pipeline::new(program("OUTPUT: INPUT"), opts(0, 6, 3, threading)).unwrap();
        let mut sink = InMemorySink::new();
        let err = pipeline.run(&mut source, &mut sink).unwrap_err();
        assert!(matches!(err, WeaselError::Decode(_)), "{err:?}");
        assert!(!sink.ended());
    }
}

#[test]
fn frame_size_change_is_rejected() {
    let mut frames: Vec<Frame> = (0..4)
        .map(|i| Frame::filled(FrameIndex(i), Extent::new(2, 2), 0.0))
        .collect();
    frames.push(Frame::filled(FrameIndex(4), Extent::new(3, 2), 0.0));
    let mut source = InMemorySource::new(frames);
    let mut pipeline =
        Pipeline::new(program("OUTPUT: INPUT"), opts(0, 4, 3, Threading::Threaded)).unwrap();
    let mut sink = InMemorySink::new();
    assert!(pipeline.run(&mut source, &mut sink).is_err());
}

struct SlowSink {
    inner: InMemorySink,
    delay: std::time::Duration,
}

impl FrameSink for SlowSink {
    fn begin(&mut self) -> WeaselResult<()> {
        self.inner.begin()
    }

    fn push_frame(&mut self, frame: &Frame) -> WeaselResult<()> {
        std::thread::sleep(self.delay);
        self.inner.push_frame(frame)
    }

    fn end(&mut self) -> WeaselResult<()> {
        self.inner.end()
    }
}

struct FailingSink {
    fail_at: FrameIndex,
    pushed: Vec<FrameIndex>,
    ended: bool,
}

impl FrameSink for FailingSink {
    fn begin(&mut self) -> WeaselResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, frame: &Frame) -> WeaselResult<()> {
        if frame.index == self.fail_at {
            return Err(WeaselError::encode(format!("disk full at frame {}", frame.index.0)));
        }
        self.pushed.push(frame.index);
        Ok(())
    }

    fn end(&mut self) -> WeaselResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[test]
fn slow_sink_still_receives_the_final_frame() {
    for threading in [Threading::Threaded, Threading::SingleThreaded] {
        let mut source = ramp(0, 5);
        let mut pipeline = Pipeline::new(program("OUTPUT: INPUT"), opts(0, 5, 3, threading)).unwrap();
        let mut sink = SlowSink {
            inner: InMemorySink::new(),
            delay: std::time::Duration::from_millis(30),
        };
        let stats = pipeline.run(&mut source, &mut sink).unwrap();
        let indices: Vec<u64> = sink.inner.frames().iter().map(|f| f.index.0).collect();
        assert_eq!(indices, vec![1, 2, 3, 4], "{threading:?}");
        assert_eq!(stats.frames_written, 4);
        assert!(sink.inner.ended());
        assert!(sink.inner.frames()[3].is_last);
    }
}

#[test]
fn slow_sink_with_single_output_finishes() {
    for threading in [Threading::Threaded, Threading::SingleThreaded] {
        let mut source = ramp(0, 2);
        let mut pipeline = Pipeline::new(program("OUTPUT: INPUT"), opts(0, 2, 3, threading)).unwrap();
        let mut sink = SlowSink {
            inner: InMemorySink::new(),
            delay: std::time::Duration::from_millis(30),
        };
        let stats = pipeline.run(&mut source, &mut sink).unwrap();
        assert_eq!(stats.frames_written, 1);
        assert!(sink.inner.ended());
    }
}

#[test]
fn encode_failure_stops_the_run() {
    for threading in [Threading::Threaded, Threading::SingleThreaded] {
        let mut source = ramp(0, 9);
        let mut pipeline = Pipeline::new(program("OUTPUT: INPUT"), opts(0, 9, 3, threading)).unwrap();
        let mut sink = FailingSink {
            fail_at: FrameIndex(3),
            pushed: Vec::new(),
            ended: false,
        };
        let err = pipeline.run(&mut source, &mut sink).unwrap_err();
        assert!(matches!(err, WeaselError::Encode(_)), "{threading:?}: {err:?}");
        assert_eq!(sink.pushed, vec![FrameIndex(1), FrameIndex(2)]);
        assert!(!sink.ended);
    }
}
