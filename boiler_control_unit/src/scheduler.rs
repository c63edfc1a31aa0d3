//! Task orchestration.
//!
//! [`Simulation::start`] spawns three named threads sharing one [`Plant`]:
//!
//! | task     | period                    | body                          |
//! |----------|---------------------------|-------------------------------|
//! | physics  | `schedule.physics_period` | [`Plant::physics_step`]       |
//! | control  | `schedule.control_period` | [`Controller::control_cycle`] |
//! | faults   | from the fault schedule   | [`FaultInjector::toggle`]     |
//!
//! The tasks share nothing but the per-device locks inside the plant and the
//! [`StopSignal`]. The controller is owned by the control thread and handed
//! back when the thread is joined.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{error, info};

use boiler_common::config::BoilerConfig;
use boiler_common::mode::{Mode, ModeCell};
use boiler_plant::{Clock, MonotonicClock, Plant};

use crate::controller::Controller;
use crate::cycle::{CycleStats, StopSignal, run_periodic};
use crate::error::SimulationError;
use crate::fault::{FaultInjector, FaultLog, FaultSchedule, run_fault_task, schedule_from_config};

/// Final state of a stopped simulation.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// Controller mode after shutdown.
    pub final_mode: Mode,
    /// Water quantity after shutdown.
    pub quantity: f64,
    /// Completed control cycles.
    pub control_cycles: u64,
    /// Timing of the physics task.
    pub physics_stats: CycleStats,
    /// Timing of the control task.
    pub control_stats: CycleStats,
    /// Fault activations.
    pub faults: FaultLog,
}

/// A running simulation.
#[derive(Debug)]
pub struct Simulation {
    plant: Plant,
    stop: StopSignal,
    mode: Arc<ModeCell>,
    physics: JoinHandle<CycleStats>,
    control: JoinHandle<(Controller, CycleStats)>,
    faults: Option<JoinHandle<FaultLog>>,
}

fn spawn<T, F>(task: &'static str, f: F) -> Result<JoinHandle<T>, SimulationError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    thread::Builder::new()
        .name(task.to_string())
        .spawn(f)
        .map_err(|source| SimulationError::Spawn { task, source })
}

/// Join a task on an error path, logging a panic instead of discarding it.
fn join_logged<T>(task: &'static str, handle: JoinHandle<T>) {
    if handle.join().is_err() {
        error!(task, "task panicked during startup rollback");
    }
}

impl Simulation {
    /// Start with wall-clock time and the configured fault schedule.
    pub fn start(config: &BoilerConfig) -> Result<Self, SimulationError> {
        Self::start_with(
            config,
            Arc::new(MonotonicClock::new()),
            schedule_from_config(&config.faults),
        )
    }

    /// Start with an explicit clock and fault schedule (`None` disables fault
    /// injection).
    pub fn start_with(
        config: &BoilerConfig,
        clock: Arc<dyn Clock>,
        schedule: Option<Box<dyn FaultSchedule>>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;

        let plant = Plant::from_config(config, clock);
        let controller = Controller::from_config(plant.clone(), config);
        let mode = controller.mode_cell();
        let stop = StopSignal::new();

        info!(
            q = plant.process.quantity(),
            physics_period_ms = config.schedule.physics_period_ms,
            control_period_ms = config.schedule.control_period_ms,
            faults = schedule.is_some(),
            "Starting simulation"
        );

        let physics = {
            let plant = plant.clone();
            let stop = stop.clone();
            let period = config.schedule.physics_period();
            spawn("physics", move || {
                run_periodic("physics", period, &stop, |_| {
                    plant.physics_step();
                })
            })?
        };

        let control = {
            let stop = stop.clone();
            let period = config.schedule.control_period();
            let mut controller = controller;
            spawn("control", move || {
                let stats = run_periodic("control", period, &stop, |_| {
                    controller.control_cycle();
                });
                (controller, stats)
            })
        };
        let control = match control {
            Ok(handle) => handle,
            Err(e) => {
                stop.request_stop();
                join_logged("physics", physics);
                return Err(e);
            }
        };

        let faults = match schedule {
            Some(mut schedule) => {
                let injector = FaultInjector::new(plant.clone());
                let stop_task = stop.clone();
                let handle = spawn("faults", move || {
                    run_fault_task(&injector, schedule.as_mut(), &stop_task)
                });
                match handle {
                    Ok(handle) => Some(handle),
                    Err(e) => {
                        stop.request_stop();
                        join_logged("physics", physics);
                        join_logged("control", control);
                        plant.force_safe_state();
                        return Err(e);
                    }
                }
            }
            None => None,
        };

        Ok(Self {
            plant,
            stop,
            mode,
            physics,
            control,
            faults,
        })
    }

    /// Handle for requesting a cooperative stop from elsewhere.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Plant shared by the tasks.
    pub fn plant(&self) -> &Plant {
        &self.plant
    }

    /// Mode published by the last completed control cycle.
    pub fn mode(&self) -> Mode {
        self.mode.load()
    }

    /// Stop every task and join it. With `force_safe` the controller is forced
    /// into EMERGENCY_STOP and the plant into its safe state afterwards.
    ///
    /// # Errors
    ///
    /// `TaskPanicked` for the first task that panicked. The plant is still put
    /// into its safe state when `force_safe` is set.
    pub fn shutdown(self, force_safe: bool) -> Result<SimulationReport, SimulationError> {
        info!("Stopping simulation");
        self.stop.request_stop();

        let mut panicked: Vec<&'static str> = Vec::new();
        let physics_stats = self.physics.join().unwrap_or_else(|_| {
            panicked.push("physics");
            CycleStats::new()
        });

        let (controller, control_stats) = match self.control.join() {
            Ok((controller, stats)) => (Some(controller), stats),
            Err(_) => {
                panicked.push("control");
                (None, CycleStats::new())
            }
        };

        let faults = match self.faults.map(JoinHandle::join) {
            Some(Ok(events)) => events,
            Some(Err(_)) => {
                panicked.push("faults");
                FaultLog::new()
            }
            None => FaultLog::new(),
        };
        for task in &panicked {
            error!(task, "task panicked");
        }

        let control_cycles = controller.as_ref().map_or(0, Controller::cycles);
        let final_mode = match controller {
            Some(mut controller) if force_safe => {
                controller.force_emergency_stop();
                controller.mode()
            }
            Some(controller) => controller.mode(),
            None => {
                if force_safe {
                    self.plant.force_safe_state();
                    self.mode.store(Mode::EmergencyStop);
                }
                self.mode.load()
            }
        };

        if let Some(&task) = panicked.first() {
            return Err(SimulationError::TaskPanicked(task));
        }

        let report = SimulationReport {
            final_mode,
            quantity: self.plant.process.quantity(),
            control_cycles,
            physics_stats,
            control_stats,
            faults,
        };
        info!(
            mode = %report.final_mode,
            q = report.quantity,
            control_cycles = report.control_cycles,
            faults = report.faults.total(),
            "Simulation stopped"
        );
        Ok(report)
    }
}
