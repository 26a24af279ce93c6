use clap::{crate_name, crate_version, value_parser, Arg, ArgAction, Command};
use giffit::pacing::NoPacing;
use giffit::progress::{NoProgress, ProgressReporter};
use giffit::{optimize_for_budget, planned_attempts, Frame, FrameSequence, ImgVec, Repeat, Settings};
use pbr::ProgressBar;
use std::env;
use std::ffi::OsStr;
use std::fmt;
use std::fs::File;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub type BinResult<T, E = Box<dyn std::error::Error + Send + Sync>> = Result<T, E>;

fn main() {
    if let Err(e) = bin_main() {
        eprintln!("error: {e}");
        if let Some(e) = e.source() {
            eprintln!("error: {e}");
        }
        std::process::exit(1);
    }
}

fn bin_main() -> BinResult<()> {
    let matches = Command::new(crate_name!())
        .version(crate_version!())
        .about("Fits an animation made of PNG frames under a byte budget")
        .arg_required_else_help(true)
        .arg(Arg::new("output")
            .long("output")
            .short('o')
            .help("Destination file to write to; \"-\" means stdout")
            .value_name("a.gif")
            .required(true))
        .arg(Arg::new("max-size")
            .long("max-size")
            .short('s')
            .help("Largest acceptable output size in bytes")
            .value_name("bytes")
            .value_parser(value_parser!(u64))
            .required(true))
        .arg(Arg::new("fps")
            .long("fps")
            .short('r')
            .help("Playback speed of the input frames")
            .value_name("num")
            .value_parser(value_parser!(u32).range(1..=100))
            .default_value("20"))
        .arg(Arg::new("colors")
            .long("colors")
            .help("Cap on palette size; grid cells above the cap collapse onto it")
            .value_name("8-256")
            .value_parser(value_parser!(u16).range(8..=256))
            .default_value("256"))
        .arg(Arg::new("repeat")
            .long("repeat")
            .help("Number of times the animation is repeated (0 forever or <value> repetitions)")
            .value_name("num")
            .value_parser(value_parser!(u16))
            .default_value("0"))
        .arg(Arg::new("fast")
            .long("fast")
            .action(ArgAction::SetTrue)
            .help("Faster encoding, but lower quality palettes"))
        .arg(Arg::new("nosort")
            .long("no-sort")
            .action(ArgAction::SetTrue)
            .help("Use files exactly in the order given, rather than sorted"))
        .arg(Arg::new("quiet")
            .long("quiet")
            .short('q')
            .action(ArgAction::SetTrue)
            .help("Do not display anything on standard output/console"))
        .arg(Arg::new("FILE")
            .help("PNG image files, one per frame")
            .num_args(1..)
            .required(true))
        .get_matches_from(wild::args_os());

    let mut files: Vec<&String> = matches.get_many::<String>("FILE").ok_or("Missing files")?.collect();
    if !matches.get_flag("nosort") {
        files.sort_by(|a, b| natord::compare(a, b));
    }
    let files: Vec<PathBuf> = files.into_iter().map(PathBuf::from).collect();
    check_if_paths_exist(&files)?;

    let output_path = DestPath::new(matches.get_one::<String>("output").ok_or("Missing output")?.as_ref());
    let quiet = matches.get_flag("quiet") || output_path == DestPath::Stdout;
    let fps = *matches.get_one::<u32>("fps").ok_or("Missing fps")?;
    let repeat = match *matches.get_one::<u16>("repeat").ok_or("Missing repeat")? {
        0 => Repeat::Infinite,
        n => Repeat::Finite(n),
    };
    let settings = Settings {
        budget_bytes: *matches.get_one::<u64>("max-size").ok_or("Missing max-size")?,
        colors: *matches.get_one::<u16>("colors").ok_or("Missing colors")?,
        repeat,
        fast: matches.get_flag("fast"),
    };

    let seq = load_png_frames(&files, fps)?;

    let mut pb;
    let mut nopb = NoProgress {};
    let progress: &mut dyn ProgressReporter = if quiet {
        &mut nopb
    } else {
        pb = ProgressBar::new(planned_attempts(&seq, &settings) as u64);
        pb.show_speed = false;
        pb.show_percent = false;
        pb.format(" #_. ");
        pb.message("Attempt ");
        pb.set_max_refresh_rate(Some(Duration::from_millis(250)));
        &mut pb
    };

    let attempt = optimize_for_budget(&seq, &settings, &mut NoPacing, progress)?;
    let attempt = match attempt {
        Some(attempt) => attempt,
        None => return Err(format!(
            "Even the smallest configuration exceeds {} bytes. Increase --max-size.",
            settings.budget_bytes).into()),
    };

    match output_path {
        DestPath::Path(p) => {
            let mut file = File::create(p)
                .map_err(|e| format!("Can't write to {}: {}", p.display(), e))?;
            file.write_all(&attempt.bytes)?;
        },
        DestPath::Stdout => {
            io::stdout().lock().write_all(&attempt.bytes)?;
        },
    }

    if !quiet {
        eprintln!("giffit created {} ({} bytes at scale {}, {} colors{})",
            output_path,
            attempt.size_bytes(),
            attempt.scale,
            attempt.colors,
            attempt.frame_rate.map(|r| format!(", {r}fps")).unwrap_or_default());
    }
    Ok(())
}

fn load_png_frames(files: &[PathBuf], fps: u32) -> BinResult<FrameSequence> {
    let fps = fps as usize;
    let mut frames = Vec::with_capacity(files.len());
    for (i, path) in files.iter().enumerate() {
        let image = lodepng::decode32_file(path)
            .map_err(|err| format!("Can't load {}: {}", path.display(), err))?;
        // Distribute rounding so total duration stays i*1000/fps. See telecine/pulldown.
        let duration_ms = ((i + 1) * 1000 / fps) - (i * 1000 / fps);
        frames.push(Frame {
            image: ImgVec::new(image.buffer, image.width, image.height),
            duration_ms: duration_ms as u32,
        });
    }
    Ok(FrameSequence::new(frames)?)
}

fn check_if_paths_exist(paths: &[PathBuf]) -> BinResult<()> {
    for path in paths {
        if !path.exists() {
            let mut msg = format!("Unable to find the input file: \"{}\"", path.display());
            if path.to_str().is_some_and(|p| p.contains('*')) {
                msg += "\nThe path contains a literal \"*\" character. If you want to select multiple files, don't put the special wildcard characters in quotes.";
            } else if path.is_relative() {
                msg += &format!(" (searched in \"{}\")", env::current_dir()?.display());
            }
            return Err(msg.into());
        }
    }
    Ok(())
}

#[derive(PartialEq)]
enum DestPath<'a> {
    Path(&'a Path),
    Stdout,
}

impl<'a> DestPath<'a> {
    pub fn new(path: &'a OsStr) -> Self {
        if path == "-" {
            Self::Stdout
        } else {
            Self::Path(Path::new(path))
        }
    }
}

impl fmt::Display for DestPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(orig_path) => {
                let abs_path = dunce::canonicalize(orig_path);
                abs_path.as_deref().unwrap_or(orig_path).display().fmt(f)
            },
            Self::Stdout => f.write_str("stdout"),
        }
    }
}
