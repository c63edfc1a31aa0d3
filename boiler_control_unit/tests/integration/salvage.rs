//! SALVAMENTO dead-reckoning.

use boiler_common::mode::Mode;
use boiler_control_unit::controller::PumpCommand;

use super::Rig;

fn estimate(rig: &Rig) -> f64 {
    rig.controller
        .state()
        .estimated_level
        .expect("estimate is set in SALVAMENTO")
}

#[test]
fn estimate_without_history_seeds_at_band_midpoint() {
    let mut rig = Rig::reference();
    rig.plant.level_sensor.fail();
    assert_eq!(rig.cycle().mode, Mode::EmergencyStop);
    assert_eq!(rig.controller.state().last_known_level, None);

    rig.cycle();
    rig.cycle();
    assert_eq!(rig.cycle().mode, Mode::Salvage);
    // Vapor reading is 0 after EMERGENCY_STOP and no pump delivers.
    assert_eq!(estimate(&rig), 500.0);
    assert_eq!(rig.plant.process.vapor_throughput(), 0.0);
}

#[test]
fn estimate_seeds_from_last_reading() {
    let mut rig = Rig::settled();
    rig.set_level(520.0);
    rig.cycle();
    rig.plant.level_sensor.fail();
    rig.cycle();
    // 520 + (0 - 10) * 5
    assert_eq!(estimate(&rig), 470.0);
}

#[test]
fn estimate_rises_while_selected_pump_outpaces_vapor() {
    let mut rig = Rig::settled();
    rig.set_level(350.0);
    rig.cycle();
    rig.finish_ramp();
    rig.plant.level_sensor.fail();

    let report = rig.cycle();
    assert_eq!(report.mode, Mode::Salvage);
    let first = estimate(&rig);
    assert_eq!(first, 425.0);
    assert!(rig.plant.pumps[0].is_running());
    assert!(!rig.plant.pumps[1].is_running());

    rig.cycle();
    assert!(estimate(&rig) > first);
}

#[test]
fn zero_vapor_reading_holds_the_estimate() {
    // Startup leaves the vapor setpoint at 0, and SALVAMENTO follows the reading.
    let mut rig = Rig::settled();
    rig.plant.level_sensor.fail();

    for _ in 0..3 {
        let report = rig.cycle();
        assert_eq!(report.mode, Mode::Salvage);
        assert_eq!(report.commands.vapor_setpoint, 0.0);
        assert_eq!(estimate(&rig), 500.0);
    }
    assert!(rig.plant.pumps.iter().all(|p| !p.is_running()));
}

#[test]
fn estimate_falls_while_vapor_outpaces_inflow() {
    let mut rig = Rig::settled();
    rig.cycle();
    assert_eq!(rig.plant.process.vapor_throughput(), 10.0);
    rig.plant.level_sensor.fail();

    let mut previous = f64::INFINITY;
    for _ in 0..3 {
        rig.cycle();
        let e = estimate(&rig);
        assert!(e < previous);
        previous = e;
    }
    assert_eq!(previous, 350.0);
    // Below N1: the selected pump is started.
    assert!(rig.plant.pumps[0].is_running());

    // Still ramping: nothing credited.
    rig.cycle();
    assert_eq!(estimate(&rig), 300.0);

    rig.finish_ramp();
    rig.cycle();
    assert_eq!(estimate(&rig), 375.0);
}

#[test]
fn salvage_prefers_second_pump_when_first_is_broken() {
    let mut rig = Rig::settled();
    rig.cycle();
    rig.plant.pumps[0].fail();
    rig.plant.level_sensor.fail();

    // 450, 400, then 350 < N1 starts the second pump.
    for _ in 0..2 {
        rig.cycle();
        assert!(!rig.plant.pumps[1].is_running());
    }
    let report = rig.cycle();
    assert_eq!(report.mode, Mode::Salvage);
    assert_eq!(estimate(&rig), 350.0);
    assert_eq!(report.commands.pumps[0], PumpCommand::Stop);
    assert_eq!(report.commands.pumps[1], PumpCommand::Run);
    assert!(!rig.plant.pumps[0].is_running());
    assert!(rig.plant.pumps[1].is_running());
}
