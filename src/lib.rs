//! Firewall Run - a three-lane arcade runner
//!
//! The vehicle scrolls through a three-lane corridor. Gates grant score and a
//! time-limited protective token; threats drain posture unless the matching
//! token is held; spinners are unblockable full-width hazards.
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, collisions, run state)
//! - `highscores`: Local leaderboard with JSON persistence
//!
//! The crate is headless: a presentation layer drives `sim::tick` from its own
//! timer and renders the observable state after each tick.

pub mod highscores;
pub mod sim;

pub use highscores::HighScores;

/// Game configuration constants
///
/// Thresholds and rewards are empirical tuning values; keep them here rather
/// than inline so balance changes never touch engine logic.
pub mod consts {
    /// Fixed simulation timestep in logical milliseconds (~62.5 Hz)
    pub const TICK_MS: u32 = 16;

    /// Playfield dimensions (logical pixels, y grows downward)
    pub const FIELD_WIDTH: f32 = 480.0;
    pub const FIELD_HEIGHT: f32 = 720.0;
    /// Dead zone on each side of the lane corridor
    pub const SIDE_MARGIN: f32 = 24.0;
    /// Inset of gates/threats within their lane
    pub const LANE_INSET: f32 = 10.0;
    /// Side margin for full-width spinners
    pub const SPINNER_MARGIN: f32 = 12.0;
    /// Entities scrolling this far past the bottom edge are dropped
    pub const OVERSCROLL_MARGIN: f32 = 40.0;

    /// Total run length
    pub const RUN_DURATION_MS: u32 = 75_000;
    /// Starting posture; the run ends when it reaches 0
    pub const STARTING_POSTURE: i32 = 10;

    /// Scroll speed at run start
    pub const BASE_SCROLL_SPEED: f32 = 4.0;
    /// Scroll speed hard cap
    pub const MAX_SCROLL_SPEED: f32 = 9.5;
    /// Speed gained per difficulty step
    pub const SPEED_STEP: f32 = 0.35;
    /// Interval between difficulty steps
    pub const SPEED_STEP_MS: u32 = 3_000;
    /// At or above this speed, threats and spinners spawn in the harder
    /// damage tier
    pub const HIGH_DAMAGE_SPEED: f32 = 7.5;
    /// At or above this speed, the wave mix shifts to the late-game table
    pub const LATE_GAME_SPEED: f32 = 6.2;

    /// Spawn cooldown re-arm: `max(floor, base - (speed - 4) * scale)`
    pub const COOLDOWN_BASE_MS: f32 = 900.0;
    pub const COOLDOWN_FLOOR_MS: f32 = 350.0;
    pub const COOLDOWN_SPEED_SCALE: f32 = 80.0;
    /// Vertical gap between the primary entity of a wave and its companion
    pub const WAVE_STAGGER: f32 = 140.0;
    /// How far above the top edge new entities start
    pub const SPAWN_LEAD: f32 = 12.0;

    /// Gate score per multiplier point
    pub const GATE_SCORE_BASE: u32 = 25;
    /// Score for neutralizing a threat with the matching token
    pub const BLOCK_SCORE_BASE: u32 = 45;
    /// Protective token lifetime
    pub const TOKEN_DURATION_MS: u32 = 6_000;

    /// Player vehicle size
    pub const VEHICLE_WIDTH: f32 = 48.0;
    pub const VEHICLE_HEIGHT: f32 = 84.0;
    /// Distance from the field's bottom edge to the vehicle's top edge
    pub const VEHICLE_BOTTOM_OFFSET: f32 = 120.0;
    /// Per-tick exponential smoothing toward the steering target
    pub const STEER_SMOOTHING: f32 = 0.22;
    /// Horizontal shove applied by a spinner hit
    pub const SPINNER_PUSH: f32 = 46.0;

    /// Entity heights
    pub const GATE_HEIGHT: f32 = 46.0;
    pub const THREAT_HEIGHT: f32 = 44.0;
    pub const SPINNER_HEIGHT: f32 = 38.0;
    /// Spinner rotation: fixed base plus uniform jitter, radians per tick
    pub const SPINNER_SPIN_BASE: f32 = 0.12;
    pub const SPINNER_SPIN_JITTER: f32 = 0.08;

    /// Grade formula weights: `score + posture * 40 + streak * 15`
    pub const GRADE_POSTURE_WEIGHT: i64 = 40;
    pub const GRADE_STREAK_WEIGHT: i64 = 15;
}
