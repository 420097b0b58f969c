use anyhow::Result;
use clap::Parser;
use sentinel_vision::io::{FrameSource, ImageSequenceSource, Preview};
use sentinel_vision::{ControlEvent, FrameLoop, RunSummary, SentinelConfig, Sinks, SourceSpec};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

mod cli;
mod controls;
#[cfg(feature = "opencv")]
mod capture;

use cli::{Args, ClipFormat};

fn main() -> Result<()> {
    // --- 1. Logging & Argument Parsing ---
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = args.resolve()?;

    // --- 2. Control Runtime ---
    // The frame loop runs on this thread; the runtime only hosts the control tasks.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;

    let outcome = run(&args, &config, &runtime);
    // The stdin task sits in a blocking read; dropping the runtime would wait for it.
    runtime.shutdown_background();

    let summary = outcome?;
    println!(
        "Processing complete: {} frames, {} motion events. Output saved to {}",
        summary.frames,
        summary.events,
        config.output_dir.display()
    );
    Ok(())
}

fn run(args: &Args, config: &SentinelConfig, runtime: &Runtime) -> Result<RunSummary> {
    // --- 3. Outputs ---
    let (controls_tx, controls_rx) = unbounded_channel();
    let sinks = build_sinks(config, args.clip_format)?;
    let preview = build_preview(args.preview, controls_tx.clone())?;

    // --- 4. Source & Run ---
    match &config.source {
        SourceSpec::Images(dir) => {
            let source = ImageSequenceSource::open(dir)?;
            spawn_controls(runtime, controls_tx, args.no_stdin);
            Ok(watch(config.clone(), source, sinks, controls_rx, preview)?)
        }
        #[cfg(feature = "opencv")]
        other => {
            let source = capture::CaptureSource::open(other)?;
            spawn_controls(runtime, controls_tx, args.no_stdin);
            Ok(watch(config.clone(), source, sinks, controls_rx, preview)?)
        }
        #[cfg(not(feature = "opencv"))]
        other => Err(sentinel_vision::SourceError::Unavailable(format!(
            "{other:?} needs a build with the `opencv` feature"
        ))
        .into()),
    }
}

/// Starts the Ctrl-C listener and, unless disabled, the stdin command reader.
fn spawn_controls(runtime: &Runtime, controls: UnboundedSender<ControlEvent>, no_stdin: bool) {
    runtime.spawn(controls::forward_ctrl_c(controls.clone()));
    if !no_stdin {
        runtime.spawn(controls::forward_stdin(controls));
        log::info!("Type q + Enter to quit, s + Enter for a manual snapshot.");
    }
}

fn watch<S: FrameSource>(
    config: SentinelConfig,
    source: S,
    sinks: Sinks,
    controls: UnboundedReceiver<ControlEvent>,
    preview: Option<Box<dyn Preview>>,
) -> sentinel_vision::Result<RunSummary> {
    let mut frame_loop = FrameLoop::new(config, source, sinks)?.with_controls(controls);
    if let Some(preview) = preview {
        frame_loop = frame_loop.with_preview(preview);
    }
    frame_loop.run()
}

fn build_sinks(config: &SentinelConfig, format: ClipFormat) -> Result<Sinks> {
    #[allow(unused_mut)]
    let mut sinks = Sinks::on_disk(config)?;
    match format {
        ClipFormat::Gif => {}
        #[cfg(feature = "opencv")]
        ClipFormat::Mp4 => sinks.clips = Box::new(capture::VideoClipSink::new(&config.output_dir)),
        #[cfg(not(feature = "opencv"))]
        ClipFormat::Mp4 => anyhow::bail!("mp4 clips need a build with the `opencv` feature"),
    }
    Ok(sinks)
}

fn build_preview(
    enabled: bool,
    #[allow(unused_variables)] controls: UnboundedSender<ControlEvent>,
) -> Result<Option<Box<dyn Preview>>> {
    if !enabled {
        return Ok(None);
    }
    #[cfg(feature = "opencv")]
    {
        Ok(Some(Box::new(capture::WindowPreview::new(controls))))
    }
    #[cfg(not(feature = "opencv"))]
    {
        anyhow::bail!("--preview needs a build with the `opencv` feature")
    }
}
