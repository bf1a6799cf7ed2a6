use anyhow::Result;
use clap::Parser;
use geostamp::{layout, Annotator, LocationInfo};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Stamp a photo with time, location, a compass and a map thumbnail")]
struct Args {
    /// Input image path (png/jpg/etc)
    #[arg(short, long, default_value = "1.jpeg")]
    input: PathBuf,

    /// Output image path; the extension picks the format
    #[arg(short, long, default_value = "output_photo.jpg")]
    output: PathBuf,

    /// Map thumbnail; a placeholder is drawn when it is missing
    #[arg(short, long, default_value = "map.jpg")]
    map: PathBuf,

    /// TrueType font file
    #[arg(short, long, default_value = layout::FONT_FILE)]
    font: PathBuf,

    /// YAML file with the location fields (date, time, direction, ...)
    #[arg(short, long)]
    location: Option<PathBuf>,

    /// Needle angle in degrees clockwise from north, overriding the location fields
    #[arg(short = 'a', long)]
    compass_angle: Option<f64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    if !args.input.exists() {
        println!("File {} not found!", args.input.display());
        return Ok(());
    }

    let mut info = match &args.location {
        Some(path) => LocationInfo::from_yaml_file(path)?,
        None => LocationInfo::sample(),
    };
    if let Some(angle) = args.compass_angle {
        info.compass_angle = Some(angle);
    }

    Annotator::with_font_file(&args.font).annotate(
        &args.input,
        &args.output,
        &info,
        Some(args.map.as_path()),
    )?;

    println!("Saved annotated image to {}", args.output.display());
    Ok(())
}
