// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
extern crate log;
extern crate mandel;

use clap::Arg;
use log::error;
use mandel::options::{
    self, optional, value, HEIGHT, MAX, SCALE, THREADS, WIDTH, XCENTER, YCENTER,
};
use mandel::{ProcessLauncher, RenderJob, Sequence, Viewport};
use std::fs;
use std::path::PathBuf;

const CHILDREN: &str = "children";
const FRAMECOUNT: &str = "frames";
const DIR: &str = "dir";
const PREFIX: &str = "prefix";
const RENDERER: &str = "renderer";

fn args() -> clap::ArgMatches<'static> {
    let app = options::app(
        "mandelmovie",
        "Renders a zoom into the Mandelbrot set as numbered frames",
    )
    .arg(
        Arg::with_name(CHILDREN)
            .long(CHILDREN)
            .short("c")
            .takes_value(true)
            .default_value("1")
            .validator(|s| options::validate_range::<usize>(&s, 1, 1024, "Could not parse children"))
            .help("Number of frames to render at the same time"),
    )
    .arg(
        Arg::with_name(SCALE)
            .long(SCALE)
            .short("s")
            .takes_value(true)
            .validator(|s| options::validate_positive(&s, "Could not parse scale"))
            .help("Scale of the first frame (default: one unit per frame)"),
    )
    .arg(
        Arg::with_name(FRAMECOUNT)
            .long(FRAMECOUNT)
            .short("n")
            .takes_value(true)
            .default_value("50")
            .validator(|s| options::validate_range::<usize>(&s, 1, 100_000, "Could not parse frame count"))
            .help("Number of frames in the movie"),
    )
    .arg(
        Arg::with_name(DIR)
            .long(DIR)
            .short("d")
            .takes_value(true)
            .default_value(".")
            .help("Directory to write frames into"),
    )
    .arg(
        Arg::with_name(PREFIX)
            .long(PREFIX)
            .short("p")
            .takes_value(true)
            .default_value("mandel")
            .help("Frame file name prefix"),
    )
    .arg(
        Arg::with_name(RENDERER)
            .long(RENDERER)
            .takes_value(true)
            .help("Path to the mandel renderer (default: next to this program)"),
    );
    options::get_matches(options::render_args(app))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = args();
    let frames: usize = value(&matches, FRAMECOUNT);
    let step = optional::<f64>(&matches, SCALE)
        .map(|scale| scale / frames as f64)
        .unwrap_or(1.0);

    let sequence = Sequence {
        frames,
        children: value(&matches, CHILDREN),
        step,
        template: RenderJob {
            width: value(&matches, WIDTH),
            height: value(&matches, HEIGHT),
            max: value(&matches, MAX),
            viewport: Viewport::new(value(&matches, XCENTER), value(&matches, YCENTER), step),
            threads: value(&matches, THREADS),
            ..RenderJob::default()
        },
        dir: PathBuf::from(matches.value_of_os(DIR).unwrap_or_default()),
        prefix: matches.value_of(PREFIX).unwrap_or("mandel").to_string(),
    };

    if let Err(e) = fs::create_dir_all(&sequence.dir) {
        eprintln!("Could not create {}: {}", sequence.dir.display(), e);
        std::process::exit(1);
    }

    let launcher = match matches.value_of_os(RENDERER) {
        Some(path) => ProcessLauncher::new(path),
        None => match ProcessLauncher::beside_current_exe() {
            Ok(launcher) => launcher,
            Err(e) => {
                eprintln!("Could not locate the mandel renderer: {}", e);
                std::process::exit(1);
            }
        },
    };

    match sequence.run(&launcher) {
        Err(e) => {
            eprintln!("Sequence failure: {}", e);
            std::process::exit(1);
        }
        Ok(report) => {
            println!("Time taken: {:.6}", report.elapsed.as_secs_f64());
            let failed = report.failures().count();
            if failed > 0 {
                error!("{} of {} frames failed", failed, report.results.len());
                std::process::exit(1);
            }
        }
    }
}
