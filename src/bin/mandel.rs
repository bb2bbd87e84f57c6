// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs;
use std::str::FromStr;

use clap::{App, AppSettings, Arg, ArgGroup, ArgMatches, SubCommand};
use env_logger::Env;
use failure::{format_err, Error};
use log::{debug, info};
use num::Complex;

use smoothbrot::animation::{render_frames, ZoomPath};
use smoothbrot::bookmarks::BookmarkStore;
use smoothbrot::config::{self, Style};
use smoothbrot::export::{save_gif, save_image};
use smoothbrot::{RenderConfig, ViewWindow};

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

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    parse_pair(s, ',').map(|(re, im)| Complex { re, im })
}

/// Four comma-separated bounds: re_min,re_max,im_min,im_max.
fn parse_window(s: &str) -> Option<[f64; 4]> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| f64::from_str(p.trim()))
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [a, b, c, d] => Some([*a, *b, *c, *d]),
        _ => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_window(s: &str) -> Result<(), String> {
    match parse_window(s) {
        Some(_) => Ok(()),
        None => Err("expected four numbers: re_min,re_max,im_min,im_max".to_string()),
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

const VERBOSE: &str = "verbose";
const OUTPUT: &str = "output";
const SIZE: &str = "size";
const WINDOW: &str = "window";
const BOOKMARK: &str = "bookmark";
const BOOKMARKS: &str = "bookmarks";
const ITERATIONS: &str = "iterations";
const OVERSAMPLE: &str = "oversample";
const THREADS: &str = "threads";
const PRESET: &str = "preset";
const THEME: &str = "theme";
const STYLE: &str = "style";
const CYCLES: &str = "cycles";
const STRIPES: &str = "stripes";
const STEPS: &str = "steps";
const LIGHT_INTENSITY: &str = "light-intensity";
const AZIMUTH: &str = "azimuth";
const ELEVATION: &str = "elevation";
const FROM: &str = "from";
const TO_CENTER: &str = "to-center";
const ZOOM: &str = "zoom";
const FRAMES: &str = "frames";
const DELAY: &str = "delay";
const DYNAMIC: &str = "dynamic-iterations";
const ADD: &str = "add";
const LIST: &str = "list";
const REMOVE: &str = "remove";

/// Arguments every rendering subcommand takes.
fn render_args<'a, 'b>() -> Vec<Arg<'a, 'b>> {
    let max_threads = num_cpus::get().max(1);
    let preset_names: Vec<&'static str> = config::PRESET_NAMES.to_vec();
    let theme_names: Vec<&'static str> = config::THEMES.iter().map(|(name, _)| *name).collect();

    vec![
        Arg::with_name(OUTPUT)
            .required(true)
            .long(OUTPUT)
            .short("o")
            .takes_value(true)
            .help("Output file"),
        Arg::with_name(SIZE)
            .long(SIZE)
            .short("s")
            .takes_value(true)
            .default_value("640x360")
            .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
            .help("Size of output image, WIDTHxHEIGHT"),
        Arg::with_name(ITERATIONS)
            .long(ITERATIONS)
            .short("i")
            .takes_value(true)
            .default_value("500")
            .validator(|s| {
                validate_range(
                    &s,
                    1,
                    1_000_000,
                    "Could not parse iteration count",
                    "Iteration count must be between 1 and 1000000",
                )
            })
            .help("Maximum number of iterations per point"),
        Arg::with_name(OVERSAMPLE)
            .long(OVERSAMPLE)
            .takes_value(true)
            .default_value("1")
            .validator(|s| {
                validate_range(
                    &s,
                    1,
                    8,
                    "Could not parse oversampling factor",
                    "Oversampling must be between 1 and 8",
                )
            })
            .help("Samples per pixel along each axis"),
        Arg::with_name(THREADS)
            .long(THREADS)
            .short("t")
            .takes_value(true)
            .validator(move |s| {
                validate_range(
                    &s,
                    1,
                    max_threads,
                    "Could not parse thread count",
                    &format!("Thread count must be between 1 and {}", max_threads),
                )
            })
            .help("Number of threads to render with [default: one per core]"),
        Arg::with_name(PRESET)
            .long(PRESET)
            .takes_value(true)
            .possible_values(&preset_names)
            .help("Start from a named style"),
        Arg::with_name(STYLE)
            .long(STYLE)
            .takes_value(true)
            .conflicts_with(PRESET)
            .help("Start from a style read from a JSON file"),
        Arg::with_name(THEME)
            .long(THEME)
            .takes_value(true)
            .possible_values(&theme_names)
            .help("Colour theme (palette phases)"),
        Arg::with_name(CYCLES)
            .long(CYCLES)
            .takes_value(true)
            .validator(|s| {
                validate_range(
                    &s,
                    1u32,
                    100_000,
                    "Could not parse cycle count",
                    "Cycle count must be positive",
                )
            })
            .help("Palette cycles across the iteration range"),
        Arg::with_name(STRIPES)
            .long(STRIPES)
            .takes_value(true)
            .validator(|s| {
                validate_range(&s, 0.0, 1e6, "Could not parse stripe density", "Stripe density must be non-negative")
            })
            .help("Stripe density, 0 disables"),
        Arg::with_name(STEPS)
            .long(STEPS)
            .takes_value(true)
            .validator(|s| {
                validate_range(&s, 0.0, 1e6, "Could not parse step density", "Step density must be non-negative")
            })
            .help("Step density, 0 disables"),
        Arg::with_name(LIGHT_INTENSITY)
            .long(LIGHT_INTENSITY)
            .takes_value(true)
            .validator(|s| {
                validate_range(&s, 0.0, 1.0, "Could not parse light intensity", "Light intensity must be between 0 and 1")
            })
            .help("Lighting strength, 0 disables"),
        Arg::with_name(AZIMUTH)
            .long(AZIMUTH)
            .takes_value(true)
            .validator(|s| validate_range(&s, -360.0, 360.0, "Could not parse azimuth", "Azimuth must be in degrees"))
            .help("Light azimuth in degrees"),
        Arg::with_name(ELEVATION)
            .long(ELEVATION)
            .takes_value(true)
            .validator(|s| validate_range(&s, -90.0, 90.0, "Could not parse elevation", "Elevation must be between -90 and 90"))
            .help("Light elevation in degrees"),
    ]
}

fn window_arg<'a, 'b>(name: &'a str) -> Arg<'a, 'b> {
    Arg::with_name(name)
        .long(name)
        .short("w")
        .takes_value(true)
        .allow_hyphen_values(true)
        .validator(|s| validate_window(&s))
}

fn args<'a>() -> ArgMatches<'a> {
    App::new("mandel")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Smooth-coloured, shaded Mandelbrot renderer")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name(VERBOSE)
                .long(VERBOSE)
                .short("v")
                .global(true)
                .help("Log debugging detail"),
        )
        .subcommand(
            SubCommand::with_name("render")
                .about("Render a still image; the format follows the extension")
                .args(&render_args())
                .arg(
                    window_arg(WINDOW)
                        .conflicts_with(BOOKMARK)
                        .help("Region to render, re_min,re_max,im_min,im_max"),
                )
                .arg(
                    Arg::with_name(BOOKMARK)
                        .long(BOOKMARK)
                        .short("b")
                        .takes_value(true)
                        .requires(BOOKMARKS)
                        .help("Render a bookmarked region"),
                )
                .arg(
                    Arg::with_name(BOOKMARKS)
                        .long(BOOKMARKS)
                        .takes_value(true)
                        .help("Bookmark file"),
                ),
        )
        .subcommand(
            SubCommand::with_name("animate")
                .about("Render a zoom animation as a looping GIF")
                .args(&render_args())
                .arg(
                    window_arg(FROM)
                        .short("f")
                        .required(true)
                        .help("Starting region, re_min,re_max,im_min,im_max"),
                )
                .arg(
                    Arg::with_name(TO_CENTER)
                        .long(TO_CENTER)
                        .short("c")
                        .required(true)
                        .takes_value(true)
                        .allow_hyphen_values(true)
                        .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse target point"))
                        .help("Point to zoom toward, re,im"),
                )
                .arg(
                    Arg::with_name(ZOOM)
                        .long(ZOOM)
                        .short("z")
                        .required(true)
                        .takes_value(true)
                        .validator(|s| {
                            validate_range(&s, 1e-12, 1e15, "Could not parse zoom", "Zoom must be positive")
                        })
                        .help("Total magnification over the animation"),
                )
                .arg(
                    Arg::with_name(FRAMES)
                        .long(FRAMES)
                        .short("n")
                        .required(true)
                        .takes_value(true)
                        .validator(|s| {
                            validate_range(&s, 1, 10_000, "Could not parse frame count", "Frame count must be between 1 and 10000")
                        })
                        .help("Number of frames"),
                )
                .arg(
                    Arg::with_name(DELAY)
                        .long(DELAY)
                        .short("d")
                        .takes_value(true)
                        .default_value("100")
                        .validator(|s| {
                            validate_range(&s, 0u32, 655_350, "Could not parse frame delay", "Frame delay is out of range")
                        })
                        .help("Milliseconds per frame"),
                )
                .arg(
                    Arg::with_name(DYNAMIC)
                        .long(DYNAMIC)
                        .help("Raise the iteration budget as the zoom deepens"),
                ),
        )
        .subcommand(
            SubCommand::with_name("bookmark")
                .about("Manage named regions")
                .arg(
                    Arg::with_name(BOOKMARKS)
                        .long(BOOKMARKS)
                        .required(true)
                        .takes_value(true)
                        .help("Bookmark file"),
                )
                .arg(
                    Arg::with_name(ADD)
                        .long(ADD)
                        .takes_value(true)
                        .requires(WINDOW)
                        .help("Save a region under this name"),
                )
                .arg(window_arg(WINDOW).help("Region to save, re_min,re_max,im_min,im_max"))
                .arg(Arg::with_name(LIST).long(LIST).short("l").help("List saved regions"))
                .arg(
                    Arg::with_name(REMOVE)
                        .long(REMOVE)
                        .takes_value(true)
                        .help("Delete the named region"),
                )
                .group(
                    ArgGroup::with_name("action")
                        .args(&[ADD, LIST, REMOVE])
                        .required(true),
                ),
        )
        .get_matches()
}

fn number<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<Option<T>, Error> {
    match matches.value_of(name) {
        None => Ok(None),
        Some(s) => T::from_str(s)
            .map(Some)
            .map_err(|_| format_err!("could not parse --{} value '{}'", name, s)),
    }
}

fn required<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, Error> {
    number(matches, name)?.ok_or_else(|| format_err!("--{} is required", name))
}

fn window(matches: &ArgMatches, name: &str) -> Result<Option<ViewWindow>, Error> {
    match matches.value_of(name) {
        None => Ok(None),
        Some(s) => {
            let [a, b, c, d] =
                parse_window(s).ok_or_else(|| format_err!("could not parse --{} '{}'", name, s))?;
            Ok(Some(ViewWindow::new(a, b, c, d)?))
        }
    }
}

fn style(matches: &ArgMatches) -> Result<Style, Error> {
    let mut style = match (matches.value_of(PRESET), matches.value_of(STYLE)) {
        (Some(name), _) => config::preset(name)?,
        (None, Some(path)) => {
            let text = fs::read_to_string(path).map_err(smoothbrot::Error::Io)?;
            Style::from_json(&text)?
        }
        (None, None) => Style::default(),
    };
    if let Some(name) = matches.value_of(THEME) {
        style.palette.phases = config::theme(name)?;
    }
    if let Some(cycles) = number(matches, CYCLES)? {
        style.palette.cycles = cycles;
    }
    if let Some(density) = number(matches, STRIPES)? {
        style.stripes.density = density;
    }
    if let Some(density) = number(matches, STEPS)? {
        style.steps.density = density;
    }
    if let Some(intensity) = number(matches, LIGHT_INTENSITY)? {
        style.lighting.intensity = intensity;
    }
    if let Some(azimuth) = number(matches, AZIMUTH)? {
        style.lighting.azimuth = azimuth;
    }
    if let Some(elevation) = number(matches, ELEVATION)? {
        style.lighting.elevation = elevation;
    }
    Ok(style)
}

fn render_config(matches: &ArgMatches) -> Result<RenderConfig, Error> {
    let size = matches.value_of(SIZE).unwrap_or("640x360");
    let (width, height) =
        parse_pair::<u16>(size, 'x').ok_or_else(|| format_err!("could not parse image size '{}'", size))?;
    let mut builder = RenderConfig::builder()
        .resolution(width.into(), height.into())
        .maxiter(required(matches, ITERATIONS)?)
        .oversample(required(matches, OVERSAMPLE)?)
        .style(style(matches)?);
    if let Some(threads) = number(matches, THREADS)? {
        builder = builder.threads(threads);
    }
    Ok(builder.build()?)
}

fn render(matches: &ArgMatches) -> Result<(), Error> {
    let config = render_config(matches)?;
    let view = match (window(matches, WINDOW)?, matches.value_of(BOOKMARK)) {
        (Some(view), _) => view,
        (None, Some(name)) => {
            let file = matches
                .value_of(BOOKMARKS)
                .ok_or_else(|| format_err!("--bookmark needs --bookmarks"))?;
            BookmarkStore::load(file)?.get(name)?
        }
        (None, None) => ViewWindow::default().fit_aspect(config.width(), config.height())?,
    };
    debug!("rendering {:?}", view);
    let buffer = smoothbrot::render(&view, &config)?;
    save_image(&buffer, required::<String>(matches, OUTPUT)?)?;
    Ok(())
}

fn animate(matches: &ArgMatches) -> Result<(), Error> {
    let config = render_config(matches)?;
    let from = window(matches, FROM)?.ok_or_else(|| format_err!("--from is required"))?;
    let target = matches
        .value_of(TO_CENTER)
        .and_then(parse_complex)
        .ok_or_else(|| format_err!("could not parse --{}", TO_CENTER))?;
    let path = ZoomPath::new(
        from,
        target,
        required(matches, ZOOM)?,
        required(matches, FRAMES)?,
    )?;
    let frames = render_frames(&path, &config, matches.is_present(DYNAMIC))?;
    save_gif(
        &frames,
        required::<String>(matches, OUTPUT)?,
        required(matches, DELAY)?,
    )?;
    Ok(())
}

fn bookmark(matches: &ArgMatches) -> Result<(), Error> {
    let file = required::<String>(matches, BOOKMARKS)?;
    let mut store = BookmarkStore::load(&file)?;
    if matches.is_present(LIST) {
        for (name, view) in store.list() {
            println!(
                "{}: {},{},{},{}",
                name,
                view.real_min(),
                view.real_max(),
                view.imag_min(),
                view.imag_max()
            );
        }
        return Ok(());
    }
    if let Some(name) = matches.value_of(ADD) {
        let view = window(matches, WINDOW)?.ok_or_else(|| format_err!("--add needs --window"))?;
        if store.add(name, view).is_some() {
            info!("replaced bookmark '{}'", name);
        }
    }
    if let Some(name) = matches.value_of(REMOVE) {
        store.remove(name)?;
    }
    store.save(&file)?;
    Ok(())
}

fn run() -> Result<(), Error> {
    let matches = args();
    let (name, sub) = matches.subcommand();
    let sub = sub.ok_or_else(|| format_err!("no subcommand given"))?;

    let verbose = matches.is_present(VERBOSE) || sub.is_present(VERBOSE);
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    match name {
        "render" => render(sub),
        "animate" => animate(sub),
        "bookmark" => bookmark(sub),
        other => Err(format_err!("unknown subcommand '{}'", other)),
    }
}

fn main() {
    if let Err(err) = run() {
        let chain: Vec<String> = err.iter_chain().map(|cause| cause.to_string()).collect();
        eprintln!("error: {}", chain.join(": "));
        std::process::exit(1);
    }
}
