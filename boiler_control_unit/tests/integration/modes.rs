//! Startup and per-mode control laws against a live plant.

use boiler_common::mode::Mode;
use boiler_control_unit::controller::{PumpCommand, TransitionReason, Violation};

use super::Rig;

#[test]
fn reference_boiler_settles_on_first_cycle() {
    let mut rig = Rig::reference();
    rig.plant.valve.open();

    let report = rig.cycle();

    assert_eq!(report.mode, Mode::Normal);
    assert!(!rig.plant.valve.is_open());
    assert!(rig.plant.pumps.iter().all(|p| !p.is_running()));
    assert_eq!(rig.plant.process.vapor_throughput(), 0.0);
}

#[test]
fn startup_with_broken_pump_settles_degraded() {
    let mut rig = Rig::reference();
    rig.plant.pumps[0].fail();
    assert_eq!(rig.cycle().mode, Mode::Degraded);
}

#[test]
fn startup_without_level_trips_on_first_cycle() {
    let mut rig = Rig::reference();
    rig.plant.level_sensor.fail();

    let report = rig.cycle();

    assert_eq!(report.mode, Mode::EmergencyStop);
    assert_eq!(report.violation, Some(Violation::LevelMissingAtStartup));
    assert!(rig.plant.pumps.iter().all(|p| !p.is_running()));
}

#[test]
fn startup_fills_a_low_boiler() {
    let mut rig = Rig::with_level(300.0);
    let report = rig.cycle();
    assert_eq!(report.mode, Mode::Initialization);
    assert!(rig.plant.pumps.iter().all(|p| p.is_running()));

    // The ramp hides the first period's inflow; from the second cycle on the
    // process sees 50 per step: 300 -> 550.
    rig.physics_period();
    rig.cycle();
    rig.physics_period();
    let report = rig.cycle();
    assert_eq!(report.mode, Mode::Normal);
    assert!(rig.plant.pumps.iter().all(|p| !p.is_running()));
}

#[test]
fn startup_evacuates_a_full_boiler() {
    let mut rig = Rig::with_level(700.0);
    rig.cycle();
    assert!(rig.plant.valve.is_open());

    // 10 per step through the valve.
    for _ in 0..10 {
        rig.physics_period();
        if rig.cycle().mode != Mode::Initialization {
            break;
        }
    }
    assert_eq!(rig.controller.mode(), Mode::Normal);
    assert!(!rig.plant.valve.is_open());
}

#[test]
fn startup_with_vapor_flowing_trips() {
    let mut rig = Rig::reference();
    rig.plant.process.set_vapor_throughput(5.0);
    let report = rig.cycle();
    assert_eq!(report.violation, Some(Violation::VaporBeforeStartup { vapor: 5.0 }));
    assert_eq!(report.mode, Mode::EmergencyStop);
}

#[test]
fn normal_below_band_runs_both_pumps() {
    let mut rig = Rig::settled();
    rig.set_level(399.0);
    let report = rig.cycle();
    assert_eq!(report.mode, Mode::Normal);
    assert_eq!(report.commands.pumps, [PumpCommand::Run; 2]);
    assert!(rig.plant.pumps.iter().all(|p| p.is_running()));
}

#[test]
fn normal_above_band_stops_both_pumps() {
    let mut rig = Rig::settled();
    rig.set_level(399.0);
    rig.cycle();
    rig.set_level(601.0);
    let report = rig.cycle();
    assert_eq!(report.commands.pumps, [PumpCommand::Stop; 2]);
    assert!(rig.plant.pumps.iter().all(|p| !p.is_running()));
}

#[test]
fn normal_produces_max_vapor() {
    let mut rig = Rig::settled();
    rig.cycle();
    assert_eq!(rig.plant.process.vapor_throughput(), 10.0);
}

#[test]
fn degraded_runs_only_the_healthy_pump() {
    let mut rig = Rig::settled();
    rig.plant.pumps[1].fail();
    rig.set_level(350.0);

    let report = rig.cycle();

    assert_eq!(report.mode, Mode::Degraded);
    assert_eq!(report.transitions[0].reason, TransitionReason::PumpLost);
    assert!(rig.plant.pumps[0].is_running());
    assert!(!rig.plant.pumps[1].is_running());
}

#[test]
fn degraded_switches_to_second_pump() {
    let mut rig = Rig::settled();
    rig.plant.pumps[0].fail();
    rig.set_level(350.0);
    rig.cycle();
    assert!(!rig.plant.pumps[0].is_running());
    assert!(rig.plant.pumps[1].is_running());
}

#[test]
fn pump_repair_returns_to_normal_without_restart() {
    let mut rig = Rig::settled();
    rig.plant.pumps[1].fail();
    assert_eq!(rig.cycle().mode, Mode::Degraded);

    rig.plant.pumps[1].repair();
    assert!(!rig.plant.pumps[1].is_running());
    let report = rig.cycle();
    assert_eq!(report.mode, Mode::Normal);
    assert_eq!(report.transitions[0].reason, TransitionReason::PumpsRestored);
}

#[test]
fn closed_loop_holds_level_in_safe_band() {
    let mut rig = Rig::reference();
    for _ in 0..200 {
        rig.cycle();
        rig.physics_period();
        let q = rig.plant.process.quantity();
        assert!(q > 150.0 && q < 850.0, "q = {q}");
    }
    assert_eq!(rig.controller.mode(), Mode::Normal);
}
