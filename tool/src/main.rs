use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use log::{debug, error, Level, LevelFilter};

use sa800extract::disk_image::{DiskImage, DumpStyle};
use sa800extract::sample_file;
use sa800extract::track_parser;

/// Extract sector data from a floppy given flux timing files for each track
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Per-track flux timing files, ASCII tick counts separated by whitespace
    files: Vec<PathBuf>,

    /// Verbose diagnostic output
    #[arg(short, default_value_t = false)]
    verbose: bool,

    /// Dump sectors JSON style instead of human readable
    #[arg(short, default_value_t = false)]
    json: bool,
}

/// All diagnostics go to stdout as `#` comment lines so they interleave with
/// the rendered image, errors always, the rest only with -v.
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Error
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stdout)
        .format(|buf, record| match record.level() {
            Level::Error => writeln!(buf, "# ERROR: {}", record.args()),
            Level::Warn => writeln!(buf, "# WARNING: {}", record.args()),
            _ => writeln!(buf, "# {}", record.args()),
        })
        .init();
}

fn process(path: &Path, image: &mut DiskImage, scratch: &mut Vec<u8>) {
    let samples = match sample_file::load(path) {
        Ok(samples) => samples,
        Err(err) => {
            error!("{err:#}");
            return;
        }
    };
    debug!("Load {}, {} samples", path.display(), samples.len());
    if samples.is_empty() {
        return;
    }

    track_parser::decode_track(&samples, image, scratch);
}

fn main() -> anyhow::Result<()> {
    let cli = Args::parse();
    init_logging(cli.verbose);

    let mut image = DiskImage::new();
    let mut scratch = Vec::new();

    for path in &cli.files {
        process(path, &mut image, &mut scratch);
    }

    let style = if cli.json {
        DumpStyle::Json
    } else {
        DumpStyle::Human
    };
    let stdout = io::stdout();
    image.render(&mut stdout.lock(), style)?;
    Ok(())
}
