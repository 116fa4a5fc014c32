use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Ticks a jump/dash press stays live after its rising edge.
pub const INPUT_BUFFER_TICKS: u32 = 30;

/// Normalized intent from the input collaborator: which directions and
/// buttons are physically held right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawIntent {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub dash: bool,
}

/// Held directions plus buffered jump/dash presses.
///
/// `update` runs once per rendered frame, `tick` once per simulation tick.
/// A rising edge on jump or dash arms a countdown; the button reads as
/// pressed until the countdown runs out or the press is consumed, even if
/// the button was released in the meantime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferedInput {
    held: RawIntent,
    buffer_ticks: u32,
    jump_ticks: u32,
    dash_ticks: u32,
}

impl Default for BufferedInput {
    fn default() -> Self {
        Self::new(INPUT_BUFFER_TICKS)
    }
}

impl BufferedInput {
    pub fn new(buffer_ticks: u32) -> Self {
        Self {
            held: RawIntent::default(),
            buffer_ticks,
            jump_ticks: 0,
            dash_ticks: 0,
        }
    }

    /// Take a new intent snapshot, arming the buffers on rising edges.
    pub fn update(&mut self, intent: RawIntent) {
        if intent.jump && !self.held.jump {
            self.jump_ticks = self.buffer_ticks;
        }
        if intent.dash && !self.held.dash {
            self.dash_ticks = self.buffer_ticks;
        }
        self.held = intent;
    }

    /// Advance the buffers by one simulation tick.
    pub fn tick(&mut self) {
        self.jump_ticks = self.jump_ticks.saturating_sub(1);
        self.dash_ticks = self.dash_ticks.saturating_sub(1);
    }

    pub fn held(&self) -> RawIntent {
        self.held
    }

    pub fn jump_pressed(&self) -> bool {
        self.jump_ticks > 0
    }

    pub fn dash_pressed(&self) -> bool {
        self.dash_ticks > 0
    }

    pub fn jump_ticks_remaining(&self) -> u32 {
        self.jump_ticks
    }

    pub fn dash_ticks_remaining(&self) -> u32 {
        self.dash_ticks
    }

    /// Clear the jump buffer once a jump has fired.
    pub fn consume_jump(&mut self) {
        self.jump_ticks = 0;
    }

    /// Clear the dash buffer once a dash has fired.
    pub fn consume_dash(&mut self) {
        self.dash_ticks = 0;
    }

    /// -1.0 for left, 1.0 for right, 0.0 for neither or both.
    pub fn horizontal_axis(&self) -> f64 {
        axis(self.held.left, self.held.right)
    }

    /// -1.0 for up, 1.0 for down (y grows downward), 0.0 for neither or both.
    pub fn vertical_axis(&self) -> f64 {
        axis(self.held.up, self.held.down)
    }

    /// Whether any direction resolves to a nonzero axis.
    pub fn has_direction(&self) -> bool {
        self.horizontal_axis() != 0.0 || self.vertical_axis() != 0.0
    }

    /// Unit vector of the held directions, or zero when nothing resolves.
    pub fn direction_vector(&self) -> DVec2 {
        DVec2::new(self.horizontal_axis(), self.vertical_axis()).normalize_or_zero()
    }
}

fn axis(negative: bool, positive: bool) -> f64 {
    match (negative, positive) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}
