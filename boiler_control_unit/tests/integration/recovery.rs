//! EMERGENCY_STOP entry, debounce and recovery.

use boiler_common::mode::Mode;
use boiler_control_unit::controller::{TransitionReason, Violation};

use super::Rig;

fn tripped() -> Rig {
    let mut rig = Rig::settled();
    rig.set_level(900.0);
    let report = rig.cycle();
    assert_eq!(report.mode, Mode::EmergencyStop);
    assert_eq!(report.violation, Some(Violation::LevelOutOfBand { level: 900.0 }));
    rig
}

#[test]
fn emergency_stop_makes_plant_safe() {
    let rig = tripped();
    assert!(rig.plant.pumps.iter().all(|p| !p.is_running()));
    assert!(!rig.plant.valve.is_open());
    assert_eq!(rig.plant.process.vapor_throughput(), 0.0);
}

#[test]
fn recovery_takes_exactly_three_clean_cycles() {
    let mut rig = tripped();
    rig.set_level(500.0);

    assert_eq!(rig.cycle().mode, Mode::EmergencyStop);
    assert_eq!(rig.controller.state().safe_cycles, 1);
    assert_eq!(rig.cycle().mode, Mode::EmergencyStop);
    assert_eq!(rig.controller.state().safe_cycles, 2);

    let report = rig.cycle();
    assert_eq!(report.mode, Mode::Normal);
    assert_eq!(report.transitions[0].reason, TransitionReason::Recovered);
    assert_eq!(rig.controller.state().safe_cycles, 0);
}

#[test]
fn violation_mid_debounce_resets_counter() {
    let mut rig = tripped();
    rig.set_level(500.0);
    rig.cycle();

    // Cycle 2 of 3 is unsafe again.
    rig.set_level(100.0);
    assert_eq!(rig.cycle().mode, Mode::EmergencyStop);
    assert_eq!(rig.controller.state().safe_cycles, 0);

    rig.set_level(500.0);
    assert_eq!(rig.cycle().mode, Mode::EmergencyStop);
    assert_eq!(rig.cycle().mode, Mode::EmergencyStop);
    assert_eq!(rig.cycle().mode, Mode::Normal);
}

#[test]
fn recovery_picks_degraded_with_broken_pump() {
    let mut rig = tripped();
    rig.set_level(500.0);
    rig.plant.pumps[0].fail();
    rig.cycle();
    rig.cycle();
    assert_eq!(rig.cycle().mode, Mode::Degraded);
}

#[test]
fn losing_both_sensors_trips() {
    let mut rig = Rig::settled();
    rig.plant.level_sensor.fail();
    rig.plant.vapor_sensor.fail();
    let report = rig.cycle();
    assert_eq!(report.violation, Some(Violation::BothSensorsLost));
    assert_eq!(report.mode, Mode::EmergencyStop);
}

#[test]
fn recovery_without_level_sensor_enters_salvage() {
    let mut rig = Rig::settled();
    rig.plant.level_sensor.fail();
    rig.plant.vapor_sensor.fail();
    rig.cycle();

    rig.plant.vapor_sensor.repair();
    rig.cycle();
    rig.cycle();
    let report = rig.cycle();
    assert_eq!(report.mode, Mode::Salvage);
    assert_eq!(report.transitions[0].reason, TransitionReason::RecoveredBlind);
    // Seeded from the last reading before the sensor failed.
    assert!(rig.controller.state().estimated_level.is_some());
}

#[test]
fn level_sensor_loss_and_repair_skip_debounce() {
    let mut rig = Rig::settled();
    rig.plant.level_sensor.fail();
    let report = rig.cycle();
    assert_eq!(report.mode, Mode::Salvage);
    assert_eq!(report.transitions[0].reason, TransitionReason::LevelSensorLost);

    rig.cycle();
    rig.plant.level_sensor.repair();
    let report = rig.cycle();
    assert_eq!(report.mode, Mode::Normal);
    assert_eq!(report.transitions[0].reason, TransitionReason::LevelSensorRestored);
    assert_eq!(rig.controller.state().estimated_level, None);
}

#[test]
fn mode_cell_follows_controller() {
    let mut rig = tripped();
    let cell = rig.controller.mode_cell();
    assert_eq!(cell.load(), Mode::EmergencyStop);
    rig.set_level(500.0);
    for _ in 0..3 {
        rig.cycle();
    }
    assert_eq!(cell.load(), Mode::Normal);
}
