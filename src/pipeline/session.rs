use std::sync::mpsc::{self, Receiver, RecvError, SyncSender};

use crate::compile::program::Program;
use crate::exec::executor::Executor;
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{WeaselError, WeaselResult};
use crate::frame::model::Frame;
use crate::frame::window::FrameWindow;
use crate::io::sink::FrameSink;
use crate::io::source::FrameSource;

/// How the pipeline stages are scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Threading {
    /// Reader and writer run on their own threads, overlapping with processing.
    #[default]
    Threaded,
    /// Read, process and write in turn on the calling thread.
    SingleThreaded,
}

/// Options controlling a [`Pipeline`] run.
#[derive(Clone, Debug)]
pub struct PipelineOpts {
    /// Input frames to read, inclusive.
    pub range: FrameRange,
    /// Number of frames in the sliding window; must be odd.
    pub window: usize,
    /// Stage scheduling.
    pub threading: Threading,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            range: FrameRange {
                first: FrameIndex(0),
                last: FrameIndex(0),
            },
            window: 1,
            threading: Threading::Threaded,
        }
    }
}

impl PipelineOpts {
    /// Check the window shape against the range.
    pub fn validate(&self) -> WeaselResult<()> {
        if self.range.first > self.range.last {
            return Err(WeaselError::validation(
                "frame range start must be <= final frame",
            ));
        }
        if self.window == 0 || self.window % 2 == 0 {
            return Err(WeaselError::validation(format!(
                "buffer size must be odd, got {}",
                self.window
            )));
        }
        if (self.window as u64) > self.range.len_frames() {
            return Err(WeaselError::validation(format!(
                "not enough frames to fill buffer: need {}, range {}..={} holds {}",
                self.window,
                self.range.first.0,
                self.range.last.0,
                self.range.len_frames()
            )));
        }
        Ok(())
    }
}

/// Counters reported by a finished run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Input frames decoded, including the pre-fill.
    pub frames_read: u64,
    /// Output frames handed to the sink.
    pub frames_written: u64,
}

/// Half of the double buffer a frame travels in.
///
/// Every hand-off between stages carries the cycle it belongs to; the coordinator alternates
/// cycles round by round and rejects a hand-off tagged with the wrong one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cycle {
    /// First half.
    Zero,
    /// Second half.
    One,
}

impl Cycle {
    /// The other half.
    pub fn flip(self) -> Self {
        match self {
            Self::Zero => Self::One,
            Self::One => Self::Zero,
        }
    }
}

/// A frame buffer in transit between stages.
#[derive(Debug)]
struct Slot {
    cycle: Cycle,
    frame: Frame,
}

/// Sliding-window frame processor: reads a frame range, runs a program per window position and
/// writes one output frame per centre frame.
#[derive(Debug)]
pub struct Pipeline {
    executor: Executor,
    opts: PipelineOpts,
}

impl Pipeline {
    /// Build a pipeline for `program`.
    pub fn new(program: Program, opts: PipelineOpts) -> WeaselResult<Self> {
        opts.validate()?;
        Ok(Self {
            executor: Executor::new(program)?,
            opts,
        })
    }

    /// The program run for every output frame.
    pub fn program(&self) -> &Program {
        self.executor.program()
    }

    /// Options the pipeline was built with.
    pub fn opts(&self) -> &PipelineOpts {
        &self.opts
    }

    /// Process the configured range from `source` into `sink`.
    ///
    /// Outputs cover the centre frames `first + (W-1)/2 ..= last - (W-1)/2`, fewer if the source
    /// ends early.
    #[tracing::instrument(
        skip_all,
        fields(
            first = self.opts.range.first.0,
            last = self.opts.range.last.0,
            window = self.opts.window
        )
    )]
    pub fn run(
        &mut self,
        source: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
    ) -> WeaselResult<PipelineStats> {
        let range = self.opts.range;
        let threading = self.opts.threading;
        let (window, next) = prefill(source, range, self.opts.window)?;
        let prefilled = window.len() as u64;
        let finished = window.frames().last().is_none_or(|f| f.is_last);
        if finished {
            tracing::debug!("pre-fill consumed the whole range; no reader started");
        }

        let mut stage = Stage {
            executor: &mut self.executor,
            window,
            finished,
        };
        let mut stats = match threading {
            Threading::SingleThreaded => run_inline(&mut stage, source, sink, next, range.last)?,
            Threading::Threaded => run_threaded(&mut stage, source, sink, next, range.last)?,
        };
        stats.frames_read += prefilled;
        tracing::info!(
            frames_read = stats.frames_read,
            frames_written = stats.frames_written,
            "pipeline finished"
        );
        Ok(stats)
    }
}

/// Decode `index`, flagging it last at the end of the range.
fn read_into(
    source: &mut dyn FrameSource,
    index: FrameIndex,
    last: FrameIndex,
    frame: &mut Frame,
) -> WeaselResult<()> {
    frame.is_last = false;
    source.read_frame(index, frame)?;
    if index >= last {
        frame.is_last = true;
    }
    Ok(())
}

fn prefill(
    source: &mut dyn FrameSource,
    range: FrameRange,
    len: usize,
) -> WeaselResult<(FrameWindow, FrameIndex)> {
    let mut frames = Vec::with_capacity(len);
    let mut next = range.first;
    while frames.len() < len {
        let mut frame = Frame::default();
        read_into(source, next, range.last, &mut frame)?;
        let ended = frame.is_last;
        frames.push(frame);
        next = next.next();
        if ended && frames.len() < len {
            return Err(WeaselError::validation(format!(
                "not enough frames to fill buffer: input ended at frame {} with {} of {} read",
                next.0 - 1,
                frames.len(),
                len
            )));
        }
    }
    Ok((FrameWindow::new(frames)?, next))
}

/// Window state owned by the coordinator.
struct Stage<'e> {
    executor: &'e mut Executor,
    window: FrameWindow,
    finished: bool,
}

impl Stage<'_> {
    /// Swap a freshly read frame into the window, returning the evicted buffer.
    fn absorb(&mut self, incoming: Frame) -> WeaselResult<Frame> {
        let last = incoming.is_last;
        let evicted = self.window.advance(incoming)?;
        self.finished |= last;
        Ok(evicted)
    }

    fn produce(&mut self, out: &mut Frame) -> WeaselResult<()> {
        self.executor.run(&self.window, out)?;
        out.is_last = self.finished;
        tracing::debug!(frame = out.index.0, last = out.is_last, "frame processed");
        Ok(())
    }
}

fn run_inline(
    stage: &mut Stage<'_>,
    source: &mut dyn FrameSource,
    sink: &mut dyn FrameSink,
    mut next: FrameIndex,
    last: FrameIndex,
) -> WeaselResult<PipelineStats> {
    let mut stats = PipelineStats::default();
    let mut out = Frame::default();
    let mut spare = Frame::default();
    sink.begin()?;
    loop {
        stage.produce(&mut out)?;
        sink.push_frame(&out)?;
        stats.frames_written += 1;
        if stage.finished {
            break;
        }
        read_into(source, next, last, &mut spare)?;
        next = next.next();
        stats.frames_read += 1;
        spare = stage.absorb(spare)?;
    }
    sink.end()?;
    Ok(stats)
}

fn run_threaded(
    stage: &mut Stage<'_>,
    source: &mut dyn FrameSource,
    sink: &mut dyn FrameSink,
    next: FrameIndex,
    last: FrameIndex,
) -> WeaselResult<PipelineStats> {
    std::thread::scope(|scope| -> WeaselResult<PipelineStats> {
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Slot>(1);
        let (full_tx, full_rx) = mpsc::sync_channel::<Slot>(1);
        let sink_ref: &mut dyn FrameSink = sink;
        let writer = scope.spawn(move || write_loop(sink_ref, ready_tx, full_rx));

        let (reader, input) = if stage.finished {
            (None, None)
        } else {
            let (in_tx, in_rx) = mpsc::sync_channel::<Slot>(1);
            let (free_tx, free_rx) = mpsc::sync_channel::<Slot>(1);
            let source_ref: &mut dyn FrameSource = source;
            let handle = scope.spawn(move || read_loop(source_ref, next, last, in_tx, free_rx));
            (Some(handle), Some((in_rx, free_tx)))
        };

        // Consumes the coordinator's channel ends, so blocked workers wake up on failure.
        let coord_res = coordinate(stage, input, ready_rx, full_tx);

        let writer_res = writer
            .join()
            .map_err(|_| WeaselError::pipeline("writer thread panicked"))?;
        let reader_res = match reader {
            Some(handle) => handle
                .join()
                .map_err(|_| WeaselError::pipeline("reader thread panicked"))?,
            None => Ok(0),
        };

        let frames_read = reader_res?;
        let frames_written = writer_res?;
        let produced = coord_res?;
        if produced != frames_written {
            return Err(WeaselError::pipeline(format!(
                "processed {produced} frames but the writer stored {frames_written}"
            )));
        }
        Ok(PipelineStats {
            frames_read,
            frames_written,
        })
    })
}

fn receive(msg: Result<Slot, RecvError>, cycle: Cycle, from: &str) -> WeaselResult<Frame> {
    let slot = msg.map_err(|_| {
        WeaselError::pipeline(format!("{from} stopped before cycle {cycle:?} was delivered"))
    })?;
    if slot.cycle != cycle {
        return Err(WeaselError::pipeline(format!(
            "{from} delivered a {:?} buffer during cycle {cycle:?}",
            slot.cycle
        )));
    }
    Ok(slot.frame)
}

fn coordinate(
    stage: &mut Stage<'_>,
    input: Option<(Receiver<Slot>, SyncSender<Slot>)>,
    ready: Receiver<Slot>,
    full: SyncSender<Slot>,
) -> WeaselResult<u64> {
    let mut cycle = Cycle::Zero;
    let mut produced = 0u64;
    let mut first_round = true;
    loop {
        let incoming = if first_round {
            None
        } else {
            let (in_rx, _) = input.as_ref().ok_or_else(|| {
                WeaselError::pipeline("more input expected but no reader is running")
            })?;
            Some(receive(in_rx.recv(), cycle, "reader")?)
        };
        let mut out = receive(ready.recv(), cycle, "writer")?;

        let recycled = match incoming {
            Some(frame) => Some(stage.absorb(frame)?),
            None => None,
        };
        stage.produce(&mut out)?;

        full.send(Slot { cycle, frame: out })
            .map_err(|_| WeaselError::pipeline("writer stopped accepting frames"))?;
        produced += 1;
        if stage.finished {
            break;
        }
        if let (Some(frame), Some((_, free_tx))) = (recycled, input.as_ref()) {
            // The reader exits after the final frame; its own result is checked at join.
            let _ = free_tx.send(Slot { cycle, frame });
        }
        cycle = cycle.flip();
        first_round = false;
    }
    Ok(produced)
}

fn read_loop(
    source: &mut dyn FrameSource,
    mut next: FrameIndex,
    last: FrameIndex,
    ready: SyncSender<Slot>,
    free: Receiver<Slot>,
) -> WeaselResult<u64> {
    // The coordinator consumes nothing in its first round, so the reader starts one cycle ahead
    // with two fresh buffers before it recycles evicted ones.
    let mut cycle = Cycle::One;
    let mut fresh = 2;
    let mut read = 0u64;
    loop {
        let mut frame = if fresh > 0 {
            fresh -= 1;
            Frame::default()
        } else {
            match free.recv() {
                Ok(slot) if slot.cycle == cycle => slot.frame,
                Ok(slot) => {
                    return Err(WeaselError::pipeline(format!(
                        "reader was handed a {:?} buffer during cycle {cycle:?}",
                        slot.cycle
                    )));
                }
                Err(_) => return Ok(read),
            }
        };
        read_into(source, next, last, &mut frame)?;
        read += 1;
        let is_last = frame.is_last;
        if ready.send(Slot { cycle, frame }).is_err() || is_last {
            return Ok(read);
        }
        next = next.next();
        cycle = cycle.flip();
    }
}

fn write_loop(
    sink: &mut dyn FrameSink,
    ready: SyncSender<Slot>,
    full: Receiver<Slot>,
) -> WeaselResult<u64> {
    sink.begin()?;
    let mut written = 0u64;
    let mut cycle = Cycle::Zero;
    // The coordinator stops taking buffers back after its final round. Only `is_last` or a closed
    // `full` channel ends the writer.
    for _ in 0..2 {
        let _ = ready.send(Slot {
            cycle,
            frame: Frame::default(),
        });
        cycle = cycle.flip();
    }

    while let Ok(slot) = full.recv() {
        if slot.cycle != cycle {
            return Err(WeaselError::pipeline(format!(
                "writer was handed a {:?} frame during cycle {cycle:?}",
                slot.cycle
            )));
        }
        let is_last = slot.frame.is_last;
        if slot.frame.is_allocated() {
            sink.push_frame(&slot.frame)?;
            written += 1;
        }
        if is_last {
            sink.end()?;
            return Ok(written);
        }
        let _ = ready.send(slot);
        cycle = cycle.flip();
    }
    Ok(written)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/session.rs"]
mod tests;
