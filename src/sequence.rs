// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Frame sequencer
//!
//! A zoom movie is a fixed number of frames, each rendered by its own
//! worker (normally a separate `mandel` process) at a scale that shrinks
//! by one step per frame.  Frames are launched strictly in index order;
//! at most `children` of them are in flight at once.  A slot is held
//! from just before a frame is launched until its worker has exited,
//! and a scoped waiter thread per frame is what gives the slot back.
//!
//! The scale and file name of a frame depend only on its index, so the
//! movie comes out the same whatever order the frames finish in.  A
//! frame whose worker fails is reported and the rest carry on; failing
//! to launch a worker at all stops the sequence.

use crate::error::SequenceError;
use crate::gate::Gate;
use crate::job::RenderJob;
use log::{debug, info, warn};
use std::env;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::{Child, Command};
use std::time::{Duration, Instant};

/// Frames in a movie unless told otherwise.
pub const FRAMES: usize = 50;

/// One frame of the movie.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameDescriptor {
    /// Position in the movie, from 0.
    pub index: usize,
    /// Horizontal scale of this frame's viewport.
    pub scale: f64,
    /// The file this frame is written to.
    pub output: PathBuf,
}

/// How a frame's worker ended.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameOutcome {
    /// The worker finished and reported success.
    Rendered,
    /// The worker ran but did not produce its frame.
    Failed(String),
}

/// A frame and how it went.
#[derive(Clone, Debug)]
pub struct FrameResult {
    /// The frame.
    pub frame: FrameDescriptor,
    /// How its worker ended.
    pub outcome: FrameOutcome,
}

/// Everything the sequencer learned while running.
#[derive(Clone, Debug)]
pub struct SequenceReport {
    /// One result per frame, in index order.
    pub results: Vec<FrameResult>,
    /// Wall-clock time for the whole movie.
    pub elapsed: Duration,
}

impl SequenceReport {
    /// The frames that failed.
    pub fn failures(&self) -> impl Iterator<Item = &FrameResult> {
        self.results
            .iter()
            .filter(|r| r.outcome != FrameOutcome::Rendered)
    }

    /// True when every frame rendered.
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Starts the worker that renders one frame.
pub trait Launcher: Sync {
    /// Handle on a running worker.
    type Worker: Worker;

    /// Start rendering `job`, which is `frame`'s render job.  Must not
    /// wait for the render to finish.
    fn launch(&self, frame: &FrameDescriptor, job: &RenderJob) -> io::Result<Self::Worker>;
}

/// A running frame worker.
pub trait Worker: Send {
    /// Block until the worker is done.
    fn wait(self) -> FrameOutcome;
}

/// Launches each frame as a child `mandel` process.
#[derive(Clone, Debug)]
pub struct ProcessLauncher {
    program: PathBuf,
}

impl ProcessLauncher {
    /// Run frames with the renderer at `program`.
    pub fn new<P: Into<PathBuf>>(program: P) -> ProcessLauncher {
        ProcessLauncher {
            program: program.into(),
        }
    }

    /// The `mandel` executable that sits beside the running program.
    pub fn beside_current_exe() -> io::Result<ProcessLauncher> {
        let name = format!("mandel{}", env::consts::EXE_SUFFIX);
        Ok(ProcessLauncher::new(env::current_exe()?.with_file_name(name)))
    }

    /// The renderer this launcher runs.
    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    /// The renderer's command line for `job`.  Every value is attached
    /// with `=` so negative coordinates can't be read as flags.
    pub fn args(job: &RenderJob) -> Vec<OsString> {
        let mut output = OsString::from("--output=");
        output.push(&job.output);
        vec![
            format!("--xcenter={}", job.viewport.center.re).into(),
            format!("--ycenter={}", job.viewport.center.im).into(),
            format!("--scale={}", job.viewport.xscale).into(),
            format!("--width={}", job.width).into(),
            format!("--height={}", job.height).into(),
            format!("--max={}", job.max).into(),
            format!("--threads={}", job.threads).into(),
            output,
        ]
    }
}

impl Launcher for ProcessLauncher {
    type Worker = ProcessWorker;

    fn launch(&self, _frame: &FrameDescriptor, job: &RenderJob) -> io::Result<ProcessWorker> {
        let child = Command::new(&self.program)
            .args(ProcessLauncher::args(job))
            .spawn()?;
        Ok(ProcessWorker { child })
    }
}

/// A child `mandel` process.
#[derive(Debug)]
pub struct ProcessWorker {
    child: Child,
}

impl Worker for ProcessWorker {
    fn wait(mut self) -> FrameOutcome {
        match self.child.wait() {
            Ok(status) if status.success() => FrameOutcome::Rendered,
            Ok(status) => FrameOutcome::Failed(format!("renderer ended with {}", status)),
            Err(e) => FrameOutcome::Failed(format!("could not wait for renderer: {}", e)),
        }
    }
}

/// The parameters of a whole movie.
#[derive(Clone, Debug)]
pub struct Sequence {
    /// Number of frames.
    pub frames: usize,
    /// Most frames allowed to render at once.
    pub children: usize,
    /// How much the scale shrinks from one frame to the next.  Frame k
    /// has scale `step * (frames - k)`.
    pub step: f64,
    /// Center, size, iteration cap and threads shared by every frame.
    /// Its scale and output are replaced per frame.
    pub template: RenderJob,
    /// Directory the frames are written into.
    pub dir: PathBuf,
    /// Frame file names are `<prefix><index>.jpg`.
    pub prefix: String,
}

impl Default for Sequence {
    fn default() -> Sequence {
        Sequence {
            frames: FRAMES,
            children: 1,
            step: 1.0,
            template: RenderJob::default(),
            dir: PathBuf::from("."),
            prefix: "mandel".to_string(),
        }
    }
}

impl Sequence {
    /// The scale of frame `index`.
    pub fn frame_scale(&self, index: usize) -> f64 {
        self.step * (self.frames - index) as f64
    }

    /// Describe frame `index`.
    pub fn frame(&self, index: usize) -> FrameDescriptor {
        FrameDescriptor {
            index,
            scale: self.frame_scale(index),
            output: self.dir.join(format!("{}{}.jpg", self.prefix, index)),
        }
    }

    /// Every frame, in launch order.
    pub fn plan(&self) -> Vec<FrameDescriptor> {
        (0..self.frames).map(|index| self.frame(index)).collect()
    }

    /// The render job for one frame.
    pub fn job_for(&self, frame: &FrameDescriptor) -> RenderJob {
        RenderJob {
            viewport: self.template.viewport.with_scale(frame.scale),
            output: frame.output.clone(),
            ..self.template.clone()
        }
    }

    fn validate(&self) -> Result<(), SequenceError> {
        if self.frames == 0 {
            return Err(SequenceError::InvalidSequence("no frames to render".to_string()));
        }
        if self.children == 0 {
            return Err(SequenceError::InvalidSequence(
                "at least one frame must be allowed to render".to_string(),
            ));
        }
        if !(self.step > 0.0) || !self.step.is_finite() {
            return Err(SequenceError::InvalidSequence(format!(
                "zoom step must be a positive number, not {}",
                self.step
            )));
        }
        Ok(())
    }

    /// Render every frame with `launcher`, at most `children` at a time,
    /// and wait for all of them.
    pub fn run<L: Launcher>(&self, launcher: &L) -> Result<SequenceReport, SequenceError> {
        self.validate()?;
        let start = Instant::now();
        let gate = Gate::new(self.children);
        let frames = self.plan();

        let result = crossbeam::scope(|spawner| -> Result<Vec<FrameResult>, SequenceError> {
            let mut waiters = Vec::with_capacity(frames.len());
            for frame in &frames {
                let permit = gate.acquire();
                debug!("frame {} holds a slot, {} free", frame.index, gate.available());
                let job = self.job_for(frame);
                info!(
                    "frame {}: scale={} output={}",
                    frame.index,
                    frame.scale,
                    frame.output.display()
                );
                let index = frame.index;
                let worker = launcher
                    .launch(frame, &job)
                    .map_err(|cause| SequenceError::Launch { index, cause })?;
                let waiter = spawner
                    .builder()
                    .name(format!("frame-{}", index))
                    .spawn(move |_| {
                        let outcome = worker.wait();
                        drop(permit);
                        if let FrameOutcome::Failed(ref reason) = outcome {
                            warn!("frame {} failed: {}", index, reason);
                        }
                        outcome
                    })
                    .map_err(|cause| SequenceError::WaiterSpawn { index, cause })?;
                waiters.push((frame.clone(), waiter));
            }
            waiters
                .into_iter()
                .map(|(frame, waiter)| {
                    waiter
                        .join()
                        .map(|outcome| FrameResult { frame, outcome })
                        .map_err(|_| SequenceError::WorkerPanicked)
                })
                .collect()
        });

        let results = match result {
            Ok(results) => results?,
            Err(_) => return Err(SequenceError::WorkerPanicked),
        };
        let elapsed = start.elapsed();
        info!("{} frames in {:?}", results.len(), elapsed);
        Ok(SequenceReport { results, elapsed })
    }
}
