// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Command-line plumbing shared by the `mandel` and `mandelmovie`
//! binaries: clap validators, and the arguments both of them accept.

use clap::{App, AppSettings, Arg, ArgMatches};
use std::fmt::Display;
use std::str::FromStr;

/// X coordinate of the image center.
pub const XCENTER: &str = "xcenter";
/// Y coordinate of the image center.
pub const YCENTER: &str = "ycenter";
/// Horizontal scale.
pub const SCALE: &str = "scale";
/// Width in pixels.
pub const WIDTH: &str = "width";
/// Height in pixels.
pub const HEIGHT: &str = "height";
/// Iteration cap.
pub const MAX: &str = "max";
/// Threads per image.
pub const THREADS: &str = "threads";

/// The most threads one image may be split across.
pub fn max_threads() -> usize {
    num_cpus::get() * 4
}

/// Accepts anything that parses as a `T`.
pub fn validate_parse<T: FromStr>(s: &str, err: &str) -> Result<(), String> {
    match T::from_str(s) {
        Ok(_) => Ok(()),
        Err(_) => Err(err.to_string()),
    }
}

/// Accepts a `T` in `[low, high]`.
pub fn validate_range<T: FromStr + PartialOrd + Display>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(format!("must be between {} and {}", low, high))
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

/// Accepts a finite floating point number greater than zero.
pub fn validate_positive(s: &str, isnotanumber_err: &str) -> Result<(), String> {
    match f64::from_str(s) {
        Ok(f) if f > 0.0 && f.is_finite() => Ok(()),
        Ok(_) => Err("must be greater than zero".to_string()),
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

/// Fetch an argument that has a default value or has been validated.
/// clap guarantees both, so a failure here is a bug in the argument
/// definitions.
pub fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> T {
    match matches.value_of(name).map(T::from_str) {
        Some(Ok(v)) => v,
        _ => panic!("argument {} was not validated", name),
    }
}

/// Fetch an optional argument that has been validated.
pub fn optional<T: FromStr>(matches: &ArgMatches, name: &str) -> Option<T> {
    matches.value_of(name).map(|_| value(matches, name))
}

/// The base App, with the settings both binaries share.
pub fn app<'a, 'b>(name: &str, about: &'b str) -> App<'a, 'b> {
    App::new(name)
        .version(env!("CARGO_PKG_VERSION"))
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about(about)
        .setting(AppSettings::AllowNegativeNumbers)
}

/// The viewport, size, iteration and thread arguments.
pub fn render_args<'a, 'b>(app: App<'a, 'b>) -> App<'a, 'b> {
    app.arg(
        Arg::with_name(XCENTER)
            .long(XCENTER)
            .short("x")
            .takes_value(true)
            .default_value("0")
            .validator(|s| validate_parse::<f64>(&s, "Could not parse x coordinate"))
            .help("X coordinate of image center point"),
    )
    .arg(
        Arg::with_name(YCENTER)
            .long(YCENTER)
            .short("y")
            .takes_value(true)
            .default_value("0")
            .validator(|s| validate_parse::<f64>(&s, "Could not parse y coordinate"))
            .help("Y coordinate of image center point"),
    )
    .arg(
        Arg::with_name(WIDTH)
            .long(WIDTH)
            .short("W")
            .takes_value(true)
            .default_value("1000")
            .validator(|s| validate_range::<usize>(&s, 1, 65_535, "Could not parse width"))
            .help("Width of the image in pixels"),
    )
    .arg(
        Arg::with_name(HEIGHT)
            .long(HEIGHT)
            .short("H")
            .takes_value(true)
            .default_value("1000")
            .validator(|s| validate_range::<usize>(&s, 1, 65_535, "Could not parse height"))
            .help("Height of the image in pixels"),
    )
    .arg(
        Arg::with_name(MAX)
            .long(MAX)
            .short("m")
            .takes_value(true)
            .default_value("1000")
            .validator(|s| {
                validate_range::<u32>(&s, 1, 10_000_000, "Could not parse iteration count")
            })
            .help("The maximum number of iterations per point"),
    )
    .arg(
        Arg::with_name(THREADS)
            .long(THREADS)
            .short("t")
            .takes_value(true)
            .default_value("1")
            .validator(|s| validate_range(&s, 1, max_threads(), "Could not parse thread count"))
            .help("Number of threads to render each image with"),
    )
}

/// The help text was requested: print it and leave with status 1.
/// Any other parse failure is reported by clap as usual.
pub fn get_matches<'a>(app: App<'a, '_>) -> ArgMatches<'a> {
    match app.get_matches_safe() {
        Ok(matches) => matches,
        Err(e) => {
            if e.kind == clap::ErrorKind::HelpDisplayed {
                println!("{}", e.message);
                std::process::exit(1);
            }
            e.exit()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ArgMatches<'static>, clap::Error> {
        render_args(app("test", "test")).get_matches_from_safe(args.iter())
    }

    #[test]
    fn ranges_are_inclusive() {
        assert!(validate_range::<u32>("1", 1, 5, "nan").is_ok());
        assert!(validate_range::<u32>("5", 1, 5, "nan").is_ok());
        assert!(validate_range::<u32>("0", 1, 5, "nan").is_err());
        assert_eq!(validate_range::<u32>("x", 1, 5, "nan"), Err("nan".to_string()));
    }

    #[test]
    fn positive_rejects_zero_and_nan() {
        assert!(validate_positive("0.05", "nan").is_ok());
        assert!(validate_positive("0", "nan").is_err());
        assert!(validate_positive("-4", "nan").is_err());
        assert!(validate_positive("NaN", "nan").is_err());
        assert!(validate_positive("inf", "nan").is_err());
    }

    #[test]
    fn defaults_are_the_reference_configuration() {
        let m = parse(&["test"]).unwrap();
        assert_eq!(value::<f64>(&m, XCENTER), 0.0);
        assert_eq!(value::<f64>(&m, YCENTER), 0.0);
        assert_eq!(value::<usize>(&m, WIDTH), 1000);
        assert_eq!(value::<usize>(&m, HEIGHT), 1000);
        assert_eq!(value::<u32>(&m, MAX), 1000);
        assert_eq!(value::<usize>(&m, THREADS), 1);
    }

    #[test]
    fn negative_coordinates_parse() {
        let m = parse(&["test", "-x", "-0.5", "--ycenter=-0.665", "-m", "100"]).unwrap();
        assert_eq!(value::<f64>(&m, XCENTER), -0.5);
        assert_eq!(value::<f64>(&m, YCENTER), -0.665);
        assert_eq!(value::<u32>(&m, MAX), 100);
    }

    #[test]
    fn bad_values_are_refused() {
        assert!(parse(&["test", "-t", "0"]).is_err());
        assert!(parse(&["test", "-W", "wide"]).is_err());
        assert!(parse(&["test", "-m", "0"]).is_err());
    }

    #[test]
    fn help_is_reported() {
        match parse(&["test", "-h"]) {
            Err(e) => assert_eq!(e.kind, clap::ErrorKind::HelpDisplayed),
            Ok(_) => panic!("help did not stop parsing"),
        }
    }
}
