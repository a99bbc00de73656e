//! Core engine implementation
//!
//! The engine owns the world and the ordered set of systems, runs one
//! initialization pass, and drives the per-frame update loop. Priority
//! ordering is load-bearing: input must run before physics, physics
//! before gameplay, and rendering last so it observes the frame's final
//! state. Changing the order changes observable behavior.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::core::config::{EngineConfig, FailurePolicy};
use crate::ecs::{System, SystemError, World};
use crate::foundation::time::Timer;

/// Event name a system or handler emits to stop the frame loop
pub const ENGINE_STOP: &str = "engine-stop";

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Systems can only be registered before `init`
    #[error("systems cannot be registered after init")]
    AlreadyInitialized,

    /// The engine must go through `init` before frames can run
    #[error("the engine must be initialized before it can run frames")]
    NotInitialized,

    /// A system failed its one-time setup; the loop never starts
    #[error("system `{system}` failed during init: {source}")]
    InitFailed {
        /// Name of the failing system
        system: String,
        /// The underlying failure
        #[source]
        source: SystemError,
    },

    /// A system failed mid-frame under the fail-fast policy
    #[error("system `{system}` failed on frame {frame}: {source}")]
    UpdateFailed {
        /// Name of the failing system
        system: String,
        /// Frame counter at the time of the failure
        frame: u64,
        /// The underlying failure
        #[source]
        source: SystemError,
    },
}

/// Lifecycle state of the engine
///
/// `Constructed` → `Initialized` → `Running`, with no way back; a restart
/// requires a fresh engine/world pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Systems registered, init not yet run
    Constructed,
    /// One init pass completed, order fixed
    Initialized,
    /// Frame loop entered
    Running,
}

/// Priority-ordered system scheduler driving the frame loop
pub struct Engine {
    world: World,
    systems: Vec<Box<dyn System>>,
    config: EngineConfig,
    state: EngineState,
    frame: u64,
    stop: Arc<AtomicBool>,
}

impl Engine {
    /// Create an engine around `world` with `config`
    pub fn new(world: World, config: EngineConfig) -> Self {
        Self {
            world,
            systems: Vec::new(),
            config,
            state: EngineState::Constructed,
            frame: 0,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register a system
    ///
    /// The final execution order is fixed at init time; registration
    /// after `init` is refused.
    pub fn add_system(&mut self, system: Box<dyn System>) -> Result<(), EngineError> {
        if self.state != EngineState::Constructed {
            return Err(EngineError::AlreadyInitialized);
        }
        log::debug!(
            "registered system `{}` (priority {})",
            system.name(),
            system.priority()
        );
        self.systems.push(system);
        Ok(())
    }

    /// Sort systems by ascending priority and run every `init` hook once
    ///
    /// The sort is stable, so systems sharing a priority keep their
    /// registration order. A failing `init` leaves the engine unable to
    /// start.
    pub fn init(&mut self) -> Result<(), EngineError> {
        if self.state != EngineState::Constructed {
            return Err(EngineError::AlreadyInitialized);
        }
        self.systems.sort_by_key(|system| system.priority());

        let stop = Arc::clone(&self.stop);
        self.world
            .on(ENGINE_STOP, move |_| stop.store(true, Ordering::Relaxed));

        for system in &mut self.systems {
            log::info!("initializing system `{}`", system.name());
            system.init(&mut self.world).map_err(|source| EngineError::InitFailed {
                system: system.name().to_string(),
                source,
            })?;
        }
        self.state = EngineState::Initialized;
        Ok(())
    }

    /// Run one frame: every system's `update`, in the fixed order
    ///
    /// Hosts with their own clock (and tests) drive this directly;
    /// [`Engine::start`] drives it from a wall clock.
    pub fn tick(&mut self, dt: f32) -> Result<(), EngineError> {
        if self.state == EngineState::Constructed {
            return Err(EngineError::NotInitialized);
        }
        self.frame += 1;
        for system in &mut self.systems {
            if let Err(source) = system.update(&mut self.world, dt) {
                match self.config.failure_policy {
                    FailurePolicy::Propagate => {
                        return Err(EngineError::UpdateFailed {
                            system: system.name().to_string(),
                            frame: self.frame,
                            source,
                        });
                    }
                    FailurePolicy::Isolate => {
                        log::error!(
                            "system `{}` failed on frame {}: {source}; continuing under isolate policy",
                            system.name(),
                            self.frame
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /// Enter the frame loop
    ///
    /// Records a starting timestamp and repeatedly computes a clamped
    /// `dt`, ticks every system, and sleeps toward the configured target
    /// frame rate, until a stop is requested (the [`ENGINE_STOP`] event
    /// or [`Engine::stop_handle`]) or the configured frame limit is
    /// reached.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.state != EngineState::Initialized {
            return Err(EngineError::NotInitialized);
        }
        self.state = EngineState::Running;

        let frame_budget = Duration::from_secs_f32(1.0 / self.config.timing.target_fps);
        let mut timer = Timer::new(self.config.timing.max_dt);
        log::info!(
            "entering frame loop (target {} fps)",
            self.config.timing.target_fps
        );

        while !self.stop.load(Ordering::Relaxed) {
            let frame_start = Instant::now();
            let dt = timer.tick();
            self.tick(dt)?;

            if self.config.timing.max_frames > 0 && self.frame >= self.config.timing.max_frames {
                break;
            }

            let elapsed = frame_start.elapsed();
            if elapsed < frame_budget {
                std::thread::sleep(frame_budget - elapsed);
            } else {
                log::warn!(
                    "frame {} exceeded budget: {:.1} ms > {:.1} ms",
                    self.frame,
                    elapsed.as_secs_f64() * 1000.0,
                    frame_budget.as_secs_f64() * 1000.0
                );
            }
        }

        log::info!("frame loop stopped after {} frames", self.frame);
        Ok(())
    }

    /// Handle that requests the running loop to stop after the current frame
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Frames ticked so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// The world this engine schedules against
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world, for host-side entity setup
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::ecs::EventData;

    use super::*;

    type CallLog = Arc<Mutex<Vec<(String, &'static str)>>>;

    struct Recorder {
        name: String,
        priority: i32,
        log: CallLog,
        fail_update: bool,
    }

    impl Recorder {
        fn new(name: &str, priority: i32, log: &CallLog) -> Self {
            Self {
                name: name.to_string(),
                priority,
                log: Arc::clone(log),
                fail_update: false,
            }
        }
    }

    impl System for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn init(&mut self, _world: &mut World) -> Result<(), SystemError> {
            self.log.lock().unwrap().push((self.name.clone(), "init"));
            Ok(())
        }

        fn update(&mut self, _world: &mut World, _dt: f32) -> Result<(), SystemError> {
            self.log.lock().unwrap().push((self.name.clone(), "update"));
            if self.fail_update {
                return Err(SystemError::Backend("boom".to_string()));
            }
            Ok(())
        }
    }

    fn engine_with_recorders(log: &CallLog, config: EngineConfig) -> Engine {
        let mut engine = Engine::new(World::new(), config);
        engine.add_system(Box::new(Recorder::new("ten", 10, log))).unwrap();
        engine.add_system(Box::new(Recorder::new("five", 5, log))).unwrap();
        engine.add_system(Box::new(Recorder::new("twenty", 20, log))).unwrap();
        engine
    }

    #[test]
    fn init_and_updates_run_in_priority_order() {
        let log: CallLog = Arc::default();
        let mut engine = engine_with_recorders(&log, EngineConfig::default());

        engine.init().unwrap();
        for _ in 0..3 {
            engine.tick(1.0 / 60.0).unwrap();
        }

        let calls = log.lock().unwrap();
        let names: Vec<&str> = calls.iter().map(|(name, _)| name.as_str()).collect();
        let mut expected = vec!["five", "ten", "twenty"]; // init pass
        for _ in 0..3 {
            expected.extend(["five", "ten", "twenty"]); // one per frame
        }
        assert_eq!(names, expected);
        assert_eq!(calls.iter().filter(|(_, hook)| *hook == "init").count(), 3);
    }

    #[test]
    fn priority_ties_keep_registration_order() {
        let log: CallLog = Arc::default();
        let mut engine = Engine::new(World::new(), EngineConfig::default());
        engine.add_system(Box::new(Recorder::new("first", 7, &log))).unwrap();
        engine.add_system(Box::new(Recorder::new("second", 7, &log))).unwrap();
        engine.init().unwrap();

        let calls = log.lock().unwrap();
        assert_eq!(calls[0].0, "first");
        assert_eq!(calls[1].0, "second");
    }

    #[test]
    fn registration_after_init_is_refused() {
        let log: CallLog = Arc::default();
        let mut engine = engine_with_recorders(&log, EngineConfig::default());
        engine.init().unwrap();
        let err = engine
            .add_system(Box::new(Recorder::new("late", 1, &log)))
            .unwrap_err();
        assert!(matches!(err, EngineError::AlreadyInitialized));
    }

    #[test]
    fn tick_before_init_is_refused() {
        let mut engine = Engine::new(World::new(), EngineConfig::default());
        assert!(matches!(
            engine.tick(0.016),
            Err(EngineError::NotInitialized)
        ));
    }

    #[test]
    fn propagate_policy_aborts_the_frame() {
        let log: CallLog = Arc::default();
        let mut engine = Engine::new(World::new(), EngineConfig::default());
        let mut failing = Recorder::new("faulty", 5, &log);
        failing.fail_update = true;
        engine.add_system(Box::new(failing)).unwrap();
        engine.add_system(Box::new(Recorder::new("after", 10, &log))).unwrap();
        engine.init().unwrap();

        let err = engine.tick(0.016).unwrap_err();
        match err {
            EngineError::UpdateFailed { system, frame, .. } => {
                assert_eq!(system, "faulty");
                assert_eq!(frame, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        // The later system never ran this frame.
        let calls = log.lock().unwrap();
        assert!(!calls.contains(&("after".to_string(), "update")));
    }

    #[test]
    fn isolate_policy_keeps_the_frame_going() {
        let log: CallLog = Arc::default();
        let config = EngineConfig {
            failure_policy: FailurePolicy::Isolate,
            ..Default::default()
        };
        let mut engine = Engine::new(World::new(), config);
        let mut failing = Recorder::new("faulty", 5, &log);
        failing.fail_update = true;
        engine.add_system(Box::new(failing)).unwrap();
        engine.add_system(Box::new(Recorder::new("after", 10, &log))).unwrap();
        engine.init().unwrap();

        engine.tick(0.016).unwrap();
        let calls = log.lock().unwrap();
        assert!(calls.contains(&("after".to_string(), "update")));
    }

    struct StopAfter {
        frames_left: u32,
    }

    impl System for StopAfter {
        fn name(&self) -> &str {
            "stop-after"
        }

        fn priority(&self) -> i32 {
            0
        }

        fn update(&mut self, world: &mut World, _dt: f32) -> Result<(), SystemError> {
            if self.frames_left == 0 {
                world.emit(ENGINE_STOP, &EventData::None);
            } else {
                self.frames_left -= 1;
            }
            Ok(())
        }
    }

    #[test]
    fn engine_stop_event_ends_the_loop() {
        let config = EngineConfig {
            timing: crate::core::config::TimingConfig {
                target_fps: 1000.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut engine = Engine::new(World::new(), config);
        engine.add_system(Box::new(StopAfter { frames_left: 2 })).unwrap();
        engine.init().unwrap();
        engine.start().unwrap();

        assert_eq!(engine.state(), EngineState::Running);
        assert_eq!(engine.frame(), 3);
    }

    #[test]
    fn frame_limit_ends_the_loop() {
        let config = EngineConfig {
            timing: crate::core::config::TimingConfig {
                target_fps: 1000.0,
                max_frames: 5,
                ..Default::default()
            },
            ..Default::default()
        };
        let log: CallLog = Arc::default();
        let mut engine = Engine::new(World::new(), config);
        engine.add_system(Box::new(Recorder::new("only", 0, &log))).unwrap();
        engine.init().unwrap();
        engine.start().unwrap();
        assert_eq!(engine.frame(), 5);
    }
}
