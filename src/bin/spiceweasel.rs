use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use spiceweasel::{
    ColorMap, DEFAULT_SCRIPT, FrameIndex, FrameRange, FrameTemplate, ImageSequenceSink,
    ImageSequenceSource, Pipeline, PipelineOpts, Threading,
};

const DEFAULT_INPUT: &str = "frame_%04d.png";
const DEFAULT_OUTPUT: &str = "processed_%04d.png";

#[derive(Parser, Debug)]
#[command(
    name = "spiceweasel",
    version,
    about = "Enhance a camera frame sequence with a processing script"
)]
struct Cli {
    /// First input frame number.
    start: u64,

    /// Final input frame number (inclusive).
    end: u64,

    /// Frames held in the sliding window; an even value is bumped to the next odd one.
    buffer: usize,

    /// Input file template, e.g. `frame_%04d.png`.
    #[arg(short = 'i', long = "input", default_value = DEFAULT_INPUT)]
    input: String,

    /// Output file template, e.g. `processed_%04d.png`.
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT)]
    output: String,

    /// Processing script name or path.
    #[arg(short = 'p', long = "script", default_value = DEFAULT_SCRIPT)]
    script: String,

    /// Read, process and write on one thread.
    #[arg(long)]
    single_thread: bool,

    /// Write RGB output through the yellow temperature colour map.
    #[arg(long)]
    colormap: bool,

    /// Print the compiled program listing.
    #[arg(long)]
    dump_program: bool,

    /// Write the compiled program as JSON.
    #[arg(long, value_name = "PATH")]
    emit_json: Option<PathBuf>,

    /// Log per-frame progress.
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut window = cli.buffer;
    if window % 2 == 0 {
        window += 1;
        tracing::warn!(buffer = window, "frame buffer size must be odd; adjusted");
    }
    let range = FrameRange::new(FrameIndex(cli.start), FrameIndex(cli.end))?;
    let opts = PipelineOpts {
        range,
        window,
        threading: if cli.single_thread {
            Threading::SingleThreaded
        } else {
            Threading::Threaded
        },
    };
    opts.validate()?;

    let input = FrameTemplate::parse(&cli.input)
        .with_context(|| format!("input template '{}'", cli.input))?;
    let output = FrameTemplate::parse(&cli.output)
        .with_context(|| format!("output template '{}'", cli.output))?;
    let mut source = ImageSequenceSource::new(input).context("unrecognised input format")?;
    let colormap = cli.colormap.then(ColorMap::yellow_temperature);
    let mut sink = ImageSequenceSink::new(output, colormap).context("unrecognised output format")?;

    let script_path = spiceweasel::locate_script(&cli.script)?;
    let text = std::fs::read_to_string(&script_path)
        .with_context(|| format!("read script '{}'", script_path.display()))?;
    let program = spiceweasel::compile_script(&text)
        .with_context(|| format!("compile script '{}'", script_path.display()))?;

    if cli.dump_program {
        print!("{program}");
    }
    if let Some(path) = &cli.emit_json {
        let json = serde_json::to_string_pretty(&program).context("serialize program")?;
        std::fs::write(path, json).with_context(|| format!("write '{}'", path.display()))?;
    }

    let mut pipeline = Pipeline::new(program, opts)?;
    let stats = pipeline.run(&mut source, &mut sink)?;
    eprintln!(
        "read {} frames, wrote {} frames to {}",
        stats.frames_read,
        stats.frames_written,
        cli.output
    );
    Ok(())
}
