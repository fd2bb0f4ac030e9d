use longimg::{
    compositor::{self, Compositor, Filter},
    config::Config,
    source,
    timer::Timer,
};

use anyhow::{bail, Context};

use log::{info, warn};

use clap::Parser;

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::mpsc,
};

/// Most photos accepted in one run.
const MAX_PHOTOS: usize = 30;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Stitch photos into one long vertical image", long_about = None)]
struct Args{
    /// Photos in top-to-bottom order
    #[arg(required = true, num_args = 2..=MAX_PHOTOS)]
    inputs: Vec<PathBuf>,
    /// Where to write the result [default: long.png]
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Width every photo is scaled to before stacking
    #[arg(short, long)]
    width: Option<u32>,
    #[arg(long, value_enum)]
    filter: Option<Filter>,
    /// Composite even when the inputs exceed the memory estimate
    #[arg(short, long)]
    force: bool,
    /// Print the layout and exit without rendering
    #[arg(long)]
    dry_run: bool,
    /// Show the result in a window
    #[cfg(feature = "preview")]
    #[arg(short, long)]
    preview: bool,
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
}

pub fn main() -> anyhow::Result<()>{
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = Config::discover(args.config.as_deref())?;
    let width = args.width.or(config.width);
    let filter = args.filter.unwrap_or(config.filter);
    let output = args.output.or(config.output).unwrap_or_else(|| PathBuf::from("long.png"));
    let compositor = Compositor::new(filter);

    let mut timer = Timer::new();
    let images = source::load_all(&args.inputs)?;
    timer.lap(&format!("decoded {} images", images.len()));

    if args.dry_run {
        let plan = compositor.plan(&images, width)?;
        println!("canvas {}x{}", plan.width, plan.height);
        for seg in &plan.segments {
            println!(
                "{}: rows {}..{}",
                args.inputs[seg.index].display(),
                seg.top,
                seg.top + seg.rows,
            );
        }
        return Ok(());
    }

    let estimate = compositor::estimate_memory(&images);
    if !compositor::can_safely_composite(&images) {
        warn!(
            "inputs need about {} MiB decoded, above the {} MiB limit",
            estimate / (1024 * 1024),
            compositor::MEMORY_LIMIT / (1024 * 1024),
        );
        if config.confirm && !args.force && !confirm("proceed anyway?")? {
            info!("nothing composited");
            return Ok(());
        }
    }

    let (to_host, from_worker) = mpsc::channel();
    std::thread::spawn(move || {
        // do not yield error on purpose: the host may already be gone.
        let _ = to_host.send(compositor.composite(&images, width));
    });
    let long = from_worker
        .recv()
        .context("compositing thread died")??;
    timer.lap("composited");

    source::save(&long, &output)?;
    timer.lap(&format!("saved {}", output.display()));

    #[cfg(feature = "preview")]
    if args.preview {
        preview(&long, &output)?;
    }

    info!("finished in {}ms", timer.total().as_millis());
    Ok(())
}

#[cfg(feature = "preview")]
fn preview(long: &longimg::Bitmap, output: &std::path::Path) -> anyhow::Result<()>{
    use longimg::window::Preview;
    let (mut window, event_pump) = Preview::create("longimg").map_err(anyhow::Error::msg)?;
    window.set_texture(long).map_err(anyhow::Error::msg)?;
    window
        .run(event_pump, || source::save(long, output).map_err(|e| e.to_string()))
        .map_err(anyhow::Error::msg)
}

fn confirm(question: &str) -> anyhow::Result<bool>{
    let mut stdout = io::stdout();
    write!(stdout, "{question} [y/N] ")?;
    stdout.flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Ok(true),
        "" | "n" | "no" => Ok(false),
        other => bail!("unrecognised answer {other:?}"),
    }
}
