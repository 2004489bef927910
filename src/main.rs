//! Headless demo runner
//!
//! Plays one seeded run with a naive autopilot and prints the outcome.
//! Useful for balance checks and determinism spot-checks:
//!
//! ```text
//! RUST_LOG=debug firewall-run [seed]
//! ```

use firewall_run::sim::{EntityKind, RunState, TickInput, tick};

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xF12E_0A11);

    let mut state = RunState::new(seed);
    state.start();

    while state.is_running() {
        let input = TickInput {
            target_x: Some(autopilot_target(&state)),
        };
        tick(&mut state, &input);
        for event in &state.events {
            log::debug!("{event:?}");
        }
    }

    if let Some(summary) = state.summary {
        println!(
            "seed {seed}: {} | grade {} | score {} streak {} posture {}",
            summary.reason.as_str(),
            summary.grade.as_str(),
            summary.score,
            summary.streak,
            summary.posture
        );
    }
}

/// Steer toward the nearest approaching gate; otherwise dodge the nearest
/// harmful entity, or drift back to center
fn autopilot_target(state: &RunState) -> f32 {
    let player_y = state.player.bounds.top();

    let nearest_gate = state
        .entities
        .iter()
        .filter(|e| matches!(e.kind, EntityKind::Gate { .. }) && e.bounds.bottom() < player_y)
        .max_by(|a, b| a.bounds.top().total_cmp(&b.bounds.top()));
    if let Some(gate) = nearest_gate {
        return gate.bounds.center().x;
    }

    let nearest_harm = state
        .entities
        .iter()
        .filter(|e| e.is_harmful() && e.bounds.bottom() < player_y)
        .max_by(|a, b| a.bounds.top().total_cmp(&b.bounds.top()));
    if let Some(harm) = nearest_harm {
        // Slide to whichever side of the field is farther from it
        let center = state.field.x / 2.0;
        return if harm.bounds.center().x > center {
            state.field.x * 0.2
        } else {
            state.field.x * 0.8
        };
    }

    state.field.x / 2.0
}
