use std::path::PathBuf;
use std::process;

use clap::Parser;

use framegrab_core::VideoReader;

/// Probe a video container and optionally decode every frame.
#[derive(Parser)]
#[command(name = "framegrab")]
struct Cli {
    /// Input video file.
    input: PathBuf,

    /// Decode every frame and report the realized frame count.
    #[arg(long)]
    decode: bool,

    /// Fail on the first decode error instead of stopping early.
    #[arg(long)]
    strict: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let reader = VideoReader::open(&cli.input)?;
    println!("{reader}");

    if cli.decode {
        let mut decoded = 0usize;
        for frame in reader.begin()? {
            match frame {
                Ok(_) => decoded += 1,
                Err(e) if cli.strict => return Err(e.into()),
                Err(e) => {
                    log::warn!("stopping early: {e}");
                    break;
                }
            }
        }
        println!(
            "decoded {decoded} of {} advertised frames",
            reader.frame_count()
        );
        if decoded < reader.frame_count() {
            log::warn!(
                "stream ended {} frames short of its advertised count",
                reader.frame_count() - decoded
            );
        }
    }

    Ok(())
}
