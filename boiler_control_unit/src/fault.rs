//! Fault injection.
//!
//! A [`FaultSchedule`] yields the next (delay, device) pair; the
//! [`FaultInjector`] toggles that device: a working device fails, a failed
//! device is repaired. Each activation touches exactly one device.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use boiler_common::config::{FaultConfig, FaultTarget, ScriptedFault};
use boiler_plant::Plant;

use crate::cycle::StopSignal;

/// One planned activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledFault {
    /// Wait before the activation, measured from the previous one.
    pub delay: Duration,
    /// Device to toggle.
    pub target: FaultTarget,
}

/// Source of fault activations.
pub trait FaultSchedule: Send + fmt::Debug {
    /// Next activation, or `None` when the schedule is exhausted.
    fn next_fault(&mut self) -> Option<ScheduledFault>;
}

/// Uniform random interval, uniform random device. Never exhausted.
#[derive(Debug)]
pub struct RandomFaultSchedule {
    rng: StdRng,
    min_secs: u64,
    max_secs: u64,
}

impl RandomFaultSchedule {
    /// Intervals in `[min_secs, max_secs]` seconds. `seed` makes the sequence
    /// reproducible.
    pub fn new(min_secs: u64, max_secs: u64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            min_secs: min_secs.min(max_secs),
            max_secs,
        }
    }
}

impl FaultSchedule for RandomFaultSchedule {
    fn next_fault(&mut self) -> Option<ScheduledFault> {
        let secs = self.rng.gen_range(self.min_secs..=self.max_secs);
        let target = FaultTarget::ALL[self.rng.gen_range(0..FaultTarget::ALL.len())];
        Some(ScheduledFault {
            delay: Duration::from_secs(secs),
            target,
        })
    }
}

/// Fixed sequence, replayed once.
#[derive(Debug, Default)]
pub struct ScriptedFaultSchedule {
    script: VecDeque<ScheduledFault>,
}

impl ScriptedFaultSchedule {
    /// Replay `faults` in order.
    pub fn new(faults: impl IntoIterator<Item = ScheduledFault>) -> Self {
        Self {
            script: faults.into_iter().collect(),
        }
    }

    /// Build from `[[faults.script]]` entries.
    pub fn from_script(script: &[ScriptedFault]) -> Self {
        Self::new(script.iter().map(|s| ScheduledFault {
            delay: Duration::from_millis(s.after_ms),
            target: s.target,
        }))
    }

    /// Activations not yet handed out.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl FaultSchedule for ScriptedFaultSchedule {
    fn next_fault(&mut self) -> Option<ScheduledFault> {
        self.script.pop_front()
    }
}

/// Schedule described by the configuration. `None` when fault injection is
/// disabled. A non-empty script takes precedence over the random schedule.
pub fn schedule_from_config(config: &FaultConfig) -> Option<Box<dyn FaultSchedule>> {
    if !config.enabled {
        return None;
    }
    if !config.script.is_empty() {
        return Some(Box::new(ScriptedFaultSchedule::from_script(&config.script)));
    }
    Some(Box::new(RandomFaultSchedule::new(
        config.min_interval_secs,
        config.max_interval_secs,
        config.seed,
    )))
}

/// What an activation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultAction {
    /// Device was working and is now failed.
    Failed,
    /// Device was failed and is now repaired.
    Repaired,
}

/// Record of one activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultEvent {
    /// Device toggled.
    pub target: FaultTarget,
    /// Whether it failed or was repaired.
    pub action: FaultAction,
}

/// Activations performed by a fault task: the total count and the most
/// recent [`FaultLog::CAPACITY`] events, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaultLog {
    total: u64,
    recent: VecDeque<FaultEvent>,
}

impl FaultLog {
    /// Events kept; older ones are dropped but still counted.
    pub const CAPACITY: usize = 64;

    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `event` and keep it, dropping the oldest past capacity.
    pub fn record(&mut self, event: FaultEvent) {
        self.total += 1;
        if self.recent.len() == Self::CAPACITY {
            self.recent.pop_front();
        }
        self.recent.push_back(event);
    }

    /// Activations since the task started.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// No activation happened.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Retained events, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = &FaultEvent> + '_ {
        self.recent.iter()
    }
}

/// Toggles devices of a plant.
#[derive(Debug, Clone)]
pub struct FaultInjector {
    plant: Plant,
}

impl FaultInjector {
    /// Injector acting on the devices of `plant`.
    pub fn new(plant: Plant) -> Self {
        Self { plant }
    }

    /// Fail `target` if it works, repair it otherwise.
    pub fn toggle(&self, target: FaultTarget) -> FaultEvent {
        let action = match target {
            FaultTarget::Pump1 | FaultTarget::Pump2 => {
                let pump = &self.plant.pumps[usize::from(target == FaultTarget::Pump2)];
                if pump.is_working() {
                    pump.fail();
                    FaultAction::Failed
                } else {
                    pump.repair();
                    FaultAction::Repaired
                }
            }
            FaultTarget::LevelSensor | FaultTarget::VaporSensor => {
                let sensor = if target == FaultTarget::LevelSensor {
                    &self.plant.level_sensor
                } else {
                    &self.plant.vapor_sensor
                };
                if sensor.is_working() {
                    sensor.fail();
                    FaultAction::Failed
                } else {
                    sensor.repair();
                    FaultAction::Repaired
                }
            }
        };
        FaultEvent { target, action }
    }
}

/// Fault injection task body: wait, toggle, repeat until the schedule is
/// exhausted or a stop is requested. Returns the activations performed.
pub fn run_fault_task(
    injector: &FaultInjector,
    schedule: &mut dyn FaultSchedule,
    stop: &StopSignal,
) -> FaultLog {
    let mut history = FaultLog::new();
    while let Some(next) = schedule.next_fault() {
        debug!(delay = ?next.delay, device = %next.target, "next fault scheduled");
        if stop.wait_timeout(next.delay) {
            break;
        }
        let event = injector.toggle(next.target);
        info!(device = %event.target, action = ?event.action, "[FAULT] injected");
        history.record(event);
    }
    history
}
