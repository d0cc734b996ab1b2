//! Frame scheduler: the host's per-frame loop as registered callbacks.
//!
//! Each `run_frame` delivers queued input, then runs the simulation,
//! pose and render phases in that order, then advances `SimTime`.

use std::collections::VecDeque;

use log::{debug, trace};

use afps_core::collab::RenderDevice;
use afps_core::commands::InputCommand;
use afps_core::constants::FRAME_DURATION_EPSILON;
use afps_core::types::SimTime;

type SimulationHandler<S> = Box<dyn FnMut(&mut S, f64)>;
type PoseHandler<S> = Box<dyn FnMut(&mut S)>;
type RenderHandler<S> = Box<dyn FnMut(&mut S, &mut dyn RenderDevice)>;
type InputHandler<S> = Box<dyn FnMut(&mut S, &InputCommand) -> bool>;
type DurationSource<S> = Box<dyn Fn(&S) -> f64>;

pub struct FrameScheduler<S> {
    simulation: Vec<SimulationHandler<S>>,
    pose: Vec<PoseHandler<S>>,
    render: Vec<RenderHandler<S>>,
    input: Vec<InputHandler<S>>,
    frame_duration_source: Option<DurationSource<S>>,
    pending_input: VecDeque<InputCommand>,
    frame_duration: f64,
    time: SimTime,
}

impl<S> FrameScheduler<S> {
    pub fn new(frame_duration: f64) -> Self {
        Self {
            simulation: Vec::new(),
            pose: Vec::new(),
            render: Vec::new(),
            input: Vec::new(),
            frame_duration_source: None,
            pending_input: VecDeque::new(),
            frame_duration: frame_duration.max(0.0),
            time: SimTime::default(),
        }
    }

    pub fn on_simulation(&mut self, handler: impl FnMut(&mut S, f64) + 'static) {
        self.simulation.push(Box::new(handler));
    }

    pub fn on_pose(&mut self, handler: impl FnMut(&mut S) + 'static) {
        self.pose.push(Box::new(handler));
    }

    pub fn on_render(&mut self, handler: impl FnMut(&mut S, &mut dyn RenderDevice) + 'static) {
        self.render.push(Box::new(handler));
    }

    /// Input handlers are offered each event in registration order; one that
    /// returns true consumes it.
    pub fn on_input(&mut self, handler: impl FnMut(&mut S, &InputCommand) -> bool + 'static) {
        self.input.push(Box::new(handler));
    }

    /// Re-read the desired frame duration from the state at the start of every frame.
    pub fn frame_duration_source(&mut self, source: impl Fn(&S) -> f64 + 'static) {
        self.frame_duration_source = Some(Box::new(source));
    }

    pub fn queue_input(&mut self, command: InputCommand) {
        self.pending_input.push_back(command);
    }

    pub fn queue_inputs(&mut self, commands: impl IntoIterator<Item = InputCommand>) {
        self.pending_input.extend(commands);
    }

    /// Change the simulation step. Changes smaller than `FRAME_DURATION_EPSILON`
    /// are ignored. Returns whether the duration changed.
    pub fn set_frame_duration(&mut self, seconds: f64) -> bool {
        if !seconds.is_finite() || seconds < 0.0 {
            return false;
        }
        if (seconds - self.frame_duration).abs() < FRAME_DURATION_EPSILON {
            return false;
        }
        debug!("frame duration {:.6} -> {seconds:.6} s", self.frame_duration);
        self.frame_duration = seconds;
        true
    }

    pub fn frame_duration(&self) -> f64 {
        self.frame_duration
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Run one frame against `state` and return the time after it.
    pub fn run_frame(&mut self, state: &mut S, device: &mut dyn RenderDevice) -> SimTime {
        while let Some(command) = self.pending_input.pop_front() {
            let consumed = self.input.iter_mut().any(|handler| handler(state, &command));
            if !consumed {
                trace!("unhandled input {command:?}");
            }
        }

        let requested = self.frame_duration_source.as_ref().map(|source| source(state));
        if let Some(seconds) = requested {
            self.set_frame_duration(seconds);
        }
        let dt = self.frame_duration;

        for handler in &mut self.simulation {
            handler(state, dt);
        }
        for handler in &mut self.pose {
            handler(state);
        }
        for handler in &mut self.render {
            handler(state, device);
        }

        self.time.advance(dt);
        self.time
    }
}
