//! Property tests over arbitrary reading sequences fed to `decide`.

use boiler_common::mode::Mode;
use boiler_control_unit::controller::{
    Commands, ControllerState, CycleInputs, DecisionParams, decide,
};
use boiler_plant::PumpStatus;
use proptest::prelude::*;

fn pump_status() -> impl Strategy<Value = PumpStatus> {
    (any::<bool>(), any::<bool>()).prop_map(|(working, running)| {
        let running = working && running;
        PumpStatus {
            working,
            running,
            throughput: if running { 25.0 } else { 0.0 },
        }
    })
}

fn cycle_inputs() -> impl Strategy<Value = CycleInputs> {
    (
        prop::option::weighted(0.8, 0.0f64..1000.0),
        prop::option::weighted(0.8, 0.0f64..20.0),
        pump_status(),
        pump_status(),
    )
        .prop_map(|(level, vapor, p1, p2)| CycleInputs {
            level,
            vapor,
            pumps: [p1, p2],
        })
}

proptest! {
    #[test]
    fn state_invariants_hold_for_any_sequence(
        sequence in prop::collection::vec(cycle_inputs(), 1..60),
    ) {
        let params = DecisionParams::default();
        let mut state = ControllerState::default();

        for inputs in &sequence {
            let before = state.mode;
            let d = decide(&state, inputs, &params);
            state = d.state;

            prop_assert!(state.safe_cycles <= params.safe_cycles_needed);
            prop_assert_eq!(state.estimated_level.is_some(), state.mode == Mode::Salvage);
            if d.violation.is_some() {
                prop_assert_eq!(state.mode, Mode::EmergencyStop);
                prop_assert_eq!(state.safe_cycles, 0);
            }
            if state.mode == Mode::EmergencyStop {
                prop_assert_eq!(d.commands, Commands::safe_stop());
            }
            if before == Mode::Initialization {
                prop_assert_eq!(d.commands.vapor_setpoint, 0.0);
            }
            if let Some(level) = inputs.level {
                prop_assert_eq!(state.last_known_level, Some(level));
            }
            for t in &d.transitions {
                prop_assert_ne!(t.from, t.to);
            }
            if state.mode != before {
                prop_assert!(!d.transitions.is_empty());
            }
            // Nothing ever returns to INITIALIZATION.
            if before != Mode::Initialization {
                prop_assert_ne!(state.mode, Mode::Initialization);
            }
        }
    }

    #[test]
    fn emergency_stop_needs_consecutive_clean_cycles(clean in 0u32..3) {
        let params = DecisionParams::default();
        let mut state = ControllerState { mode: Mode::EmergencyStop, ..ControllerState::default() };
        let safe = CycleInputs {
            level: Some(500.0),
            vapor: Some(0.0),
            pumps: [PumpStatus { working: true, running: false, throughput: 0.0 }; 2],
        };
        for _ in 0..clean {
            state = decide(&state, &safe, &params).state;
        }
        prop_assert_eq!(state.mode, Mode::EmergencyStop);
        let unsafe_inputs = CycleInputs { level: Some(100.0), ..safe };
        state = decide(&state, &unsafe_inputs, &params).state;
        prop_assert_eq!(state.safe_cycles, 0);
        for _ in 0..params.safe_cycles_needed - 1 {
            state = decide(&state, &safe, &params).state;
            prop_assert_eq!(state.mode, Mode::EmergencyStop);
        }
        state = decide(&state, &safe, &params).state;
        prop_assert_eq!(state.mode, Mode::Normal);
    }
}
