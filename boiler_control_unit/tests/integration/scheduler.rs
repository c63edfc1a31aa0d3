//! Threaded simulation with short periods.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use boiler_common::config::{BoilerConfig, FaultTarget, ScheduleConfig};
use boiler_common::mode::Mode;
use boiler_control_unit::fault::{FaultAction, ScheduledFault, ScriptedFaultSchedule};
use boiler_control_unit::{Simulation, SimulationError};
use boiler_plant::MonotonicClock;

fn fast_config() -> BoilerConfig {
    let mut config = BoilerConfig {
        schedule: ScheduleConfig {
            physics_period_ms: 5,
            control_period_ms: 25,
        },
        ..BoilerConfig::default()
    };
    config.faults.enabled = false;
    config
}

fn wait_for_mode(sim: &Simulation, mode: Mode, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if sim.mode() == mode {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    false
}

#[test]
fn simulation_settles_and_shuts_down_safely() {
    let sim = Simulation::start(&fast_config()).unwrap();
    assert!(wait_for_mode(&sim, Mode::Normal, Duration::from_secs(5)));
    thread::sleep(Duration::from_millis(100));

    let plant = sim.plant().clone();
    let report = sim.shutdown(true).unwrap();

    assert_eq!(report.final_mode, Mode::EmergencyStop);
    assert!(report.control_cycles >= 1);
    assert!(report.physics_stats.cycle_count >= report.control_stats.cycle_count);
    assert!(report.faults.is_empty());
    assert!(plant.pumps.iter().all(|p| !p.is_running()));
    assert!(!plant.valve.is_open());
    assert_eq!(plant.process.vapor_throughput(), 0.0);
    assert!((0.0..=plant.process.limits().capacity).contains(&report.quantity));
}

#[test]
fn shutdown_without_forcing_keeps_mode() {
    let sim = Simulation::start(&fast_config()).unwrap();
    assert!(wait_for_mode(&sim, Mode::Normal, Duration::from_secs(5)));
    let report = sim.shutdown(false).unwrap();
    assert_ne!(report.final_mode, Mode::EmergencyStop);
}

#[test]
fn stop_signal_ends_every_task() {
    let sim = Simulation::start(&fast_config()).unwrap();
    let stop = sim.stop_signal();
    stop.request_stop();
    assert!(stop.is_stopped());
    let started = Instant::now();
    sim.shutdown(true).unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn scripted_level_fault_drives_salvage_and_back() {
    let schedule = ScriptedFaultSchedule::new([
        ScheduledFault {
            delay: Duration::from_millis(60),
            target: FaultTarget::LevelSensor,
        },
        ScheduledFault {
            delay: Duration::from_millis(150),
            target: FaultTarget::LevelSensor,
        },
    ]);
    let sim = Simulation::start_with(
        &fast_config(),
        Arc::new(MonotonicClock::new()),
        Some(Box::new(schedule)),
    )
    .unwrap();

    assert!(wait_for_mode(&sim, Mode::Salvage, Duration::from_secs(5)));
    assert!(wait_for_mode(&sim, Mode::Normal, Duration::from_secs(5)));

    let report = sim.shutdown(true).unwrap();
    let actions: Vec<_> = report.faults.recent().map(|f| f.action).collect();
    assert_eq!(actions, [FaultAction::Failed, FaultAction::Repaired]);
    assert_eq!(report.faults.total(), 2);
}

#[test]
fn invalid_config_is_rejected_before_start() {
    let mut config = fast_config();
    config.limits.normal_low = 700.0;
    assert!(matches!(
        Simulation::start(&config),
        Err(SimulationError::Config(_))
    ));
}
