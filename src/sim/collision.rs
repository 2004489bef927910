//! Collision detection and hit resolution
//!
//! Player-versus-entity overlap uses raw axis-aligned rects in playfield
//! coordinates; the same space is used for both sides so the test never mixes
//! scaled and unscaled geometry. Entities are visited in reverse index order
//! and removed after the pass, so each hit resolves exactly once and replays
//! are reproducible.

use super::state::{EntityKind, LaneEntity, RunEvent, RunState};
use crate::consts::*;

/// Resolve every entity overlapping the player this tick.
///
/// Hits are collected during the scan and the consumed entities removed
/// afterwards; nothing is removed mid-iteration.
pub fn resolve_collisions(state: &mut RunState) {
    let mut consumed: Vec<usize> = Vec::new();
    for idx in (0..state.entities.len()).rev() {
        if !state.entities[idx].bounds.intersects(&state.player.bounds) {
            continue;
        }
        let entity = state.entities[idx].clone();
        resolve_hit(state, &entity);
        consumed.push(idx);
    }
    // Indices are descending, so each removal leaves the rest valid
    for idx in consumed {
        state.entities.remove(idx);
    }
}

fn resolve_hit(state: &mut RunState, entity: &LaneEntity) {
    match entity.kind {
        EntityKind::Gate {
            multiplier,
            token_granted,
        } => {
            let gain = GATE_SCORE_BASE * multiplier + (state.scroll_speed * 2.0).floor() as u32;
            state.score += gain;
            state.streak += 1;
            state.token.grant(token_granted);
            state.events.push(RunEvent::GateCollected {
                gain,
                token: token_granted,
            });
        }
        EntityKind::Threat { token_required } => {
            if state.token.blocks(token_required) {
                // Token stays active; one token can block several threats
                let gain = BLOCK_SCORE_BASE + (state.scroll_speed * 4.0).floor() as u32;
                state.score += gain;
                state.streak += 1;
                state.events.push(RunEvent::ThreatBlocked {
                    gain,
                    token: token_required,
                });
            } else {
                apply_damage(state, entity.damage);
                state.events.push(RunEvent::ThreatHit {
                    damage: entity.damage,
                });
            }
        }
        EntityKind::Spinner => {
            apply_damage(state, entity.damage);
            shove_player(state, entity);
            state.events.push(RunEvent::SpinnerHit {
                damage: entity.damage,
            });
        }
    }
}

fn apply_damage(state: &mut RunState, damage: i32) {
    state.posture = (state.posture - damage).max(0);
    state.streak = 0;
}

/// Knock the vehicle away from the spinner's center, then re-clamp
fn shove_player(state: &mut RunState, spinner: &LaneEntity) {
    let side = if state.player.bounds.center().x >= spinner.bounds.center().x {
        1.0
    } else {
        -1.0
    };
    state.player.bounds.pos.x += side * SPINNER_PUSH;
    state.player.clamp_to_field(state.field.x);
}
