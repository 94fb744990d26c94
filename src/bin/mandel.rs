extern crate clap;
extern crate env_logger;
extern crate failure;
extern crate log;
extern crate mandelbrot;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use log::info;
use mandelbrot::{render_threaded, write_png, CancelToken, Framing, PaletteSet};
use std::str::FromStr;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const CENTER: &str = "center";
const SCALE: &str = "scale";
const ITERATIONS: &str = "iterations";
const PALETTE: &str = "palette";
const PALETTES: &str = "palettes";
const THREADS: &str = "threads";
const ALPHA: &str = "alpha";
const LIST: &str = "list-palettes";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("mandel")
        .version("0.1.0")
        .about("Mandelbrot escape-time renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output PNG file (default: mandelbrot_X_Y_ITERATIONS_SCALE.png)"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("800x600")
                .validator(|s| match parse_pair::<u16>(&s, 'x') {
                    Some((w, h)) if w > 0 && h > 0 => Ok(()),
                    Some(_) => Err("Output image sides must be at least 1 pixel".to_string()),
                    None => Err("Could not parse output image size".to_string()),
                })
                .help("Size of output image, at most 65535x65535"),
        )
        .arg(
            Arg::with_name(CENTER)
                .long(CENTER)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("50,50")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse view center"))
                .help("Center of the view in percent; 50,50 is the middle"),
        )
        .arg(
            Arg::with_name(SCALE)
                .long(SCALE)
                .short("z")
                .takes_value(true)
                .default_value("1")
                .validator(|s| match f64::from_str(&s) {
                    Ok(z) if z.is_finite() && z > 0.0 => Ok(()),
                    Ok(_) => Err("Scale must be a positive number".to_string()),
                    Err(_) => Err("Could not parse scale".to_string()),
                })
                .help("Zoom factor; 1 shows the whole set"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("100")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000u32,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Maximum number of iterations per point"),
        )
        .arg(
            Arg::with_name(PALETTE)
                .long(PALETTE)
                .short("p")
                .takes_value(true)
                .help("Palette name (default: the first palette available)"),
        )
        .arg(
            Arg::with_name(PALETTES)
                .long(PALETTES)
                .short("f")
                .takes_value(true)
                .help("JSON palette file to use instead of the built-in palettes"),
        )
        .arg(
            Arg::with_name(ALPHA)
                .long(ALPHA)
                .short("a")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        255u8,
                        "Could not parse alpha",
                        "Alpha must be between 0 and 255",
                    )
                })
                .help("Alpha for every pixel, overriding the palette's"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("1")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to render with"),
        )
        .arg(
            Arg::with_name(LIST)
                .long(LIST)
                .help("Print the available palettes and exit"),
        )
        .get_matches()
}

fn run(matches: &ArgMatches) -> Result<(), failure::Error> {
    let palettes = match matches.value_of(PALETTES) {
        Some(path) => PaletteSet::from_path(path)?,
        None => PaletteSet::builtin(),
    };

    if matches.is_present(LIST) {
        for palette in palettes.iter() {
            println!(
                "{}: center {} far {} middle {} close {}",
                palette.name, palette.center, palette.far, palette.middle, palette.close
            );
        }
        return Ok(());
    }

    let mut palette = match matches.value_of(PALETTE) {
        Some(name) => palettes.get(name)?.clone(),
        None => palettes.default_palette().clone(),
    };
    if let Some(alpha) = matches.value_of(ALPHA).and_then(|s| s.parse().ok()) {
        palette = palette.with_alpha(alpha);
    }

    // Every value below has been through a validator.
    let (width, height) = matches
        .value_of(SIZE)
        .and_then(|s| parse_pair::<usize>(s, 'x'))
        .unwrap_or((800, 600));
    let (center_x_percent, center_y_percent) = matches
        .value_of(CENTER)
        .and_then(|s| parse_pair::<f64>(s, ','))
        .unwrap_or((50.0, 50.0));
    let framing = Framing {
        center_x_percent,
        center_y_percent,
        scale: matches.value_of(SCALE).and_then(|s| s.parse().ok()).unwrap_or(1.0),
        iterations: matches.value_of(ITERATIONS).and_then(|s| s.parse().ok()).unwrap_or(100),
    };
    let threads = matches.value_of(THREADS).and_then(|s| s.parse().ok()).unwrap_or(1);

    let request = framing.request(width, height, palette)?;
    info!(
        "rendering {}x{} over {:?} with palette {}",
        width,
        height,
        request.viewport(),
        request.palette().name
    );
    let pixels = render_threaded(&request, threads, &CancelToken::new())?;

    let output = match matches.value_of(OUTPUT) {
        Some(path) => path.to_string(),
        None => framing.filename(),
    };
    write_png(&output, &pixels)?;
    println!("{}", output);
    Ok(())
}

fn main() {
    env_logger::init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
