//! Difficulty schedule and spawn director
//!
//! Difficulty ramps scroll speed on a fixed cadence; the spawn director emits
//! one wave of entities whenever its cooldown lapses, with a composition table
//! keyed on current speed. All randomness comes from the run's seeded RNG, so
//! a fixed seed reproduces the exact spawn sequence.

use rand::Rng;

use super::state::{LaneEntity, Rect, RunState, TokenKind};
use crate::consts::*;

/// Advance the difficulty clock and apply any crossed speed boundaries.
///
/// Boundary crossings are tracked explicitly (`speed_steps`) so a step fires
/// exactly once per crossed multiple of [`SPEED_STEP_MS`], independent of the
/// tick size.
pub fn advance_difficulty(state: &mut RunState) {
    state.difficulty_elapsed_ms += TICK_MS;
    let crossed = state.difficulty_elapsed_ms / SPEED_STEP_MS;
    while state.speed_steps < crossed {
        state.speed_steps += 1;
        state.scroll_speed = (state.scroll_speed + SPEED_STEP).min(MAX_SCROLL_SPEED);
    }
}

/// Count the spawn cooldown down; emit one wave and re-arm when it lapses
pub fn run_spawner(state: &mut RunState) {
    state.spawn_cooldown_ms -= TICK_MS as f32;
    if state.spawn_cooldown_ms > 0.0 {
        return;
    }
    spawn_wave(state);
    state.spawn_cooldown_ms = rearm_cooldown(state.scroll_speed);
}

/// Cooldown shrinks as speed rises, floored at [`COOLDOWN_FLOOR_MS`]
pub fn rearm_cooldown(scroll_speed: f32) -> f32 {
    (COOLDOWN_BASE_MS - (scroll_speed - BASE_SCROLL_SPEED) * COOLDOWN_SPEED_SCALE)
        .max(COOLDOWN_FLOOR_MS)
}

/// Emit one wave of entities according to the composition table
pub fn spawn_wave(state: &mut RunState) {
    // Degenerate playfield: nothing to divide into lanes
    if lane_width(state.field.x) <= 0.0 {
        return;
    }

    let late_game = state.scroll_speed >= LATE_GAME_SPEED;
    let t = state.rng.random_range(0..100u32);

    if !late_game && t < 55 {
        let lane = random_lane(state);
        spawn_gate(state, lane, 0.0);
        if state.rng.random::<f32>() < 0.30 {
            let lane = random_lane(state);
            spawn_threat(state, lane, WAVE_STAGGER);
        }
    } else if t < 35 {
        let first = random_lane(state);
        spawn_gate(state, first, 0.0);
        let second = random_lane(state);
        spawn_gate(state, second, WAVE_STAGGER);
    } else if t < 70 {
        let lane = random_lane(state);
        spawn_threat(state, lane, 0.0);
        if state.rng.random::<f32>() < 0.40 {
            spawn_spinner(state, WAVE_STAGGER);
        }
    } else {
        spawn_spinner(state, 0.0);
        if state.rng.random::<f32>() < 0.45 {
            let lane = random_lane(state);
            spawn_threat(state, lane, WAVE_STAGGER);
        }
    }
    log::debug!(
        "wave at speed {:.2}: {} entities active",
        state.scroll_speed,
        state.entities.len()
    );
}

fn random_lane(state: &mut RunState) -> usize {
    state.rng.random_range(0..3usize)
}

/// Width of one of the three lanes inside the side margins
fn lane_width(field_width: f32) -> f32 {
    (field_width - 2.0 * SIDE_MARGIN) / 3.0
}

/// Rect for a gate/threat of `height` in `lane`, `stagger` px further above
/// the top edge
fn lane_rect(field_width: f32, lane: usize, height: f32, stagger: f32) -> Rect {
    let lane_w = lane_width(field_width);
    let x = SIDE_MARGIN + lane as f32 * lane_w + LANE_INSET;
    let w = (lane_w - 2.0 * LANE_INSET).max(1.0);
    Rect::new(x, -(height + SPAWN_LEAD + stagger), w, height)
}

fn spawn_gate(state: &mut RunState, lane: usize, stagger: f32) {
    let multiplier = if state.rng.random_range(0..100u32) < 65 {
        2
    } else {
        3
    };
    let token = TokenKind::ALL[state.rng.random_range(0..TokenKind::ALL.len())];
    let bounds = lane_rect(state.field.x, lane, GATE_HEIGHT, stagger);
    let id = state.next_entity_id();
    state
        .entities
        .push(LaneEntity::gate(id, bounds, state.scroll_speed, multiplier, token));
}

fn spawn_threat(state: &mut RunState, lane: usize, stagger: f32) {
    let token = TokenKind::ALL[state.rng.random_range(0..TokenKind::ALL.len())];
    let bounds = lane_rect(state.field.x, lane, THREAT_HEIGHT, stagger);
    let damage = if state.scroll_speed >= HIGH_DAMAGE_SPEED {
        4
    } else {
        3
    };
    let id = state.next_entity_id();
    state.entities.push(LaneEntity::threat(
        id,
        bounds,
        state.scroll_speed + 0.1,
        token,
        damage,
    ));
}

fn spawn_spinner(state: &mut RunState, stagger: f32) {
    let w = (state.field.x - 2.0 * SPINNER_MARGIN).max(1.0);
    let bounds = Rect::new(
        SPINNER_MARGIN,
        -(SPINNER_HEIGHT + SPAWN_LEAD + stagger),
        w,
        SPINNER_HEIGHT,
    );
    let damage = if state.scroll_speed >= HIGH_DAMAGE_SPEED {
        3
    } else {
        2
    };
    let spin = SPINNER_SPIN_BASE + state.rng.random::<f32>() * SPINNER_SPIN_JITTER;
    let id = state.next_entity_id();
    state.entities.push(LaneEntity::spinner(
        id,
        bounds,
        state.scroll_speed + 0.2,
        spin,
        damage,
    ));
}
