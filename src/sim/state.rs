//! Run state and core simulation types
//!
//! All state that must be persisted for determinism lives here.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Axis-aligned rectangle in playfield coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn left(&self) -> f32 {
        self.pos.x
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn top(&self) -> f32 {
        self.pos.y
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict axis-aligned overlap test (touching edges do not count)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

/// The four protective token kinds, each bound 1:1 to the threat it blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    ValidateOtaSignature,
    IsolateGateway,
    ThrottleDiagSession,
    RotateSessionKeys,
}

impl TokenKind {
    pub const ALL: [TokenKind; 4] = [
        TokenKind::ValidateOtaSignature,
        TokenKind::IsolateGateway,
        TokenKind::ThrottleDiagSession,
        TokenKind::RotateSessionKeys,
    ];

    /// Display label of the threat this token neutralizes
    pub fn threat_label(&self) -> &'static str {
        match self {
            TokenKind::ValidateOtaSignature => "OTA downgrade",
            TokenKind::IsolateGateway => "gateway pivot",
            TokenKind::ThrottleDiagSession => "UDS bruteforce",
            TokenKind::RotateSessionKeys => "key reuse",
        }
    }
}

/// Entity variant plus its variant-specific payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Beneficial: grants score and a protective token
    Gate {
        /// Score multiplier, 2 or 3
        multiplier: u32,
        token_granted: TokenKind,
    },
    /// Harmful unless the matching token is active
    Threat { token_required: TokenKind },
    /// Always harmful, full-width, unblockable
    Spinner,
}

/// A scrolling lane object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneEntity {
    pub id: u32,
    pub kind: EntityKind,
    pub bounds: Rect,
    /// Pixels per tick, strictly downward
    pub vertical_velocity: f32,
    /// Spinner only; radians, never wrapped (presentation only)
    pub rotation_angle: f32,
    pub rotation_velocity: f32,
    /// Display text; no behavioral effect
    pub label: String,
    /// 0 iff `kind` is a Gate
    pub damage: i32,
}

impl LaneEntity {
    pub fn gate(id: u32, bounds: Rect, velocity: f32, multiplier: u32, token: TokenKind) -> Self {
        Self {
            id,
            kind: EntityKind::Gate {
                multiplier,
                token_granted: token,
            },
            bounds,
            vertical_velocity: velocity,
            rotation_angle: 0.0,
            rotation_velocity: 0.0,
            label: format!("x{multiplier}"),
            damage: 0,
        }
    }

    pub fn threat(id: u32, bounds: Rect, velocity: f32, token: TokenKind, damage: i32) -> Self {
        debug_assert!(damage > 0);
        Self {
            id,
            kind: EntityKind::Threat {
                token_required: token,
            },
            bounds,
            vertical_velocity: velocity,
            rotation_angle: 0.0,
            rotation_velocity: 0.0,
            label: token.threat_label().to_string(),
            damage,
        }
    }

    pub fn spinner(id: u32, bounds: Rect, velocity: f32, spin: f32, damage: i32) -> Self {
        debug_assert!(damage > 0);
        Self {
            id,
            kind: EntityKind::Spinner,
            bounds,
            vertical_velocity: velocity,
            rotation_angle: 0.0,
            rotation_velocity: spin,
            label: "CAN flood".to_string(),
            damage,
        }
    }

    pub fn is_harmful(&self) -> bool {
        self.damage > 0
    }
}

/// At most one protective token is active at a time
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenState {
    pub active: Option<TokenKind>,
    pub remaining_ms: u32,
}

impl TokenState {
    /// Replace the active token; never stacks duration
    pub fn grant(&mut self, kind: TokenKind) {
        self.active = Some(kind);
        self.remaining_ms = TOKEN_DURATION_MS;
    }

    /// Count down by one tick; clears the token at zero
    pub fn decay(&mut self, dt_ms: u32) {
        if self.active.is_some() {
            self.remaining_ms = self.remaining_ms.saturating_sub(dt_ms);
            if self.remaining_ms == 0 {
                self.active = None;
            }
        }
        debug_assert!(self.remaining_ms == 0 || self.active.is_some());
    }

    /// Does the active token block a threat requiring `kind`?
    pub fn blocks(&self, kind: TokenKind) -> bool {
        self.active == Some(kind)
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.remaining_ms = 0;
    }
}

/// The player's vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerVehicle {
    pub bounds: Rect,
    /// Desired horizontal center, set by input and chased each tick
    pub target_x: f32,
}

impl PlayerVehicle {
    /// Center the vehicle horizontally at the fixed bottom offset
    pub fn centered(field: Vec2) -> Self {
        let x = field.x / 2.0 - VEHICLE_WIDTH / 2.0;
        let y = field.y - VEHICLE_BOTTOM_OFFSET;
        Self {
            bounds: Rect::new(x, y, VEHICLE_WIDTH, VEHICLE_HEIGHT),
            target_x: field.x / 2.0,
        }
    }

    /// Smoothed horizontal chase toward `target_x`, then clamp to the field
    pub fn approach_target(&mut self, field_width: f32) {
        let target_left = self.target_x - self.bounds.size.x / 2.0;
        self.bounds.pos.x += (target_left - self.bounds.pos.x) * STEER_SMOOTHING;
        self.clamp_to_field(field_width);
    }

    /// Keep the vehicle inside the corridor margins
    pub fn clamp_to_field(&mut self, field_width: f32) {
        let min_x = SIDE_MARGIN;
        let max_x = (field_width - SIDE_MARGIN - self.bounds.size.x).max(min_x);
        self.bounds.pos.x = self.bounds.pos.x.clamp(min_x, max_x);
    }
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// No run started yet
    Idle,
    /// Active gameplay
    Running,
    /// Run finished; summary available
    Ended,
}

/// Why the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    PostureDepleted,
    TimeComplete,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::PostureDepleted => "posture depleted",
            EndReason::TimeComplete => "time complete",
        }
    }

    pub fn is_win(&self) -> bool {
        matches!(self, EndReason::TimeComplete)
    }
}

/// Letter grade for a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
}

impl Grade {
    /// Grade from the combined points total
    pub fn from_points(points: i64) -> Self {
        match points {
            p if p >= 2200 => Grade::S,
            p if p >= 1600 => Grade::A,
            p if p >= 1100 => Grade::B,
            p if p >= 700 => Grade::C,
            _ => Grade::D,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

/// Final result of a run, emitted once on termination
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub reason: EndReason,
    pub score: u32,
    pub streak: u32,
    pub posture: i32,
    pub grade: Grade,
}

/// Observable per-tick events for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunEvent {
    GateCollected { gain: u32, token: TokenKind },
    ThreatBlocked { gain: u32, token: TokenKind },
    ThreatHit { damage: i32 },
    SpinnerHit { damage: i32 },
    Ended(RunSummary),
}

impl RunEvent {
    pub fn is_positive(&self) -> bool {
        matches!(
            self,
            RunEvent::GateCollected { .. } | RunEvent::ThreatBlocked { .. }
        )
    }
}

/// Complete run state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// RNG, re-seeded from `seed` on every `start()`
    pub rng: Pcg32,
    pub phase: RunPhase,
    pub score: u32,
    /// Consecutive beneficial resolutions since the last damaging hit
    pub streak: u32,
    /// Remaining integrity; floor 0, run ends there
    pub posture: i32,
    pub time_remaining_ms: i32,
    /// Monotonically non-decreasing within a run, capped
    pub scroll_speed: f32,
    pub difficulty_elapsed_ms: u32,
    /// Difficulty boundaries already applied (guards against re-firing)
    pub(crate) speed_steps: u32,
    pub spawn_cooldown_ms: f32,
    pub entities: Vec<LaneEntity>,
    pub player: PlayerVehicle,
    pub token: TokenState,
    /// Playfield size; lane math guards against degenerate values
    pub field: Vec2,
    /// Events from the most recent tick, cleared at the start of each
    pub events: Vec<RunEvent>,
    /// Set exactly once when the run ends
    pub summary: Option<RunSummary>,
    next_id: u32,
}

impl RunState {
    /// Create an idle run with the default playfield
    pub fn new(seed: u64) -> Self {
        Self::with_field(seed, Vec2::new(FIELD_WIDTH, FIELD_HEIGHT))
    }

    /// Create an idle run with a custom playfield size
    pub fn with_field(seed: u64, field: Vec2) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: RunPhase::Idle,
            score: 0,
            streak: 0,
            posture: STARTING_POSTURE,
            time_remaining_ms: RUN_DURATION_MS as i32,
            scroll_speed: BASE_SCROLL_SPEED,
            difficulty_elapsed_ms: 0,
            speed_steps: 0,
            spawn_cooldown_ms: COOLDOWN_BASE_MS,
            entities: Vec::new(),
            player: PlayerVehicle::centered(field),
            token: TokenState::default(),
            field,
            events: Vec::new(),
            summary: None,
            next_id: 1,
        }
    }

    /// Begin a run from Idle or Ended; resets everything to initial values
    pub fn start(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.phase = RunPhase::Running;
        self.score = 0;
        self.streak = 0;
        self.posture = STARTING_POSTURE;
        self.time_remaining_ms = RUN_DURATION_MS as i32;
        self.scroll_speed = BASE_SCROLL_SPEED;
        self.difficulty_elapsed_ms = 0;
        self.speed_steps = 0;
        self.spawn_cooldown_ms = COOLDOWN_BASE_MS;
        self.entities.clear();
        self.player = PlayerVehicle::centered(self.field);
        self.token.clear();
        self.events.clear();
        self.summary = None;
        log::info!("run started, seed={}", self.seed);
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    pub fn is_ended(&self) -> bool {
        self.phase == RunPhase::Ended
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Combined points total feeding the letter grade
    pub fn grade_points(&self) -> i64 {
        self.score as i64
            + self.posture as i64 * GRADE_POSTURE_WEIGHT
            + self.streak as i64 * GRADE_STREAK_WEIGHT
    }
}
