use embedded_hal::digital::InputPin;

use sensordemo_core::input::{InputEvent, InputProvider};

// Quadrature transition table for previous_state/current_state (AB).
// Index: (prev << 2) | curr, values are +1/-1 for valid transitions.
const QUADRATURE_TRANSITIONS: [i8; 16] = [0, -1, 1, 0, 1, 0, 0, -1, -1, 0, 0, 1, 0, 1, -1, 0];

#[derive(Debug, Clone, Copy)]
pub struct RotaryConfig {
    direction_inverted: bool,
    button_active_low: bool,
    button_debounce_polls: u8,
    transitions_per_step: u8,
}

impl Default for RotaryConfig {
    fn default() -> Self {
        Self {
            direction_inverted: false,
            button_active_low: true,
            button_debounce_polls: 3,
            transitions_per_step: 4,
        }
    }
}

impl RotaryConfig {
    pub const fn with_direction_inverted(mut self, direction_inverted: bool) -> Self {
        self.direction_inverted = direction_inverted;
        self
    }

    pub const fn with_button_active_low(mut self, button_active_low: bool) -> Self {
        self.button_active_low = button_active_low;
        self
    }

    pub const fn with_button_debounce_polls(mut self, button_debounce_polls: u8) -> Self {
        self.button_debounce_polls = button_debounce_polls;
        self
    }

    pub const fn with_transitions_per_step(mut self, transitions_per_step: u8) -> Self {
        self.transitions_per_step = transitions_per_step;
        self
    }
}

/// Pin-free quadrature state machine; one detent is `transitions_per_step`
/// valid Gray-code transitions in the same direction.
#[derive(Debug, Clone, Copy)]
pub struct QuadratureDecoder {
    prev_ab: u8,
    accum: i8,
    threshold: i8,
}

impl QuadratureDecoder {
    pub fn new(clk_high: bool, dt_high: bool, transitions_per_step: u8) -> Self {
        Self {
            prev_ab: ab_from_levels(clk_high, dt_high),
            accum: 0,
            threshold: transitions_per_step.clamp(1, i8::MAX as u8) as i8,
        }
    }

    /// Feeds one sample. Returns `Some(true)` for a completed positive step,
    /// `Some(false)` for a negative one.
    pub fn update(&mut self, clk_high: bool, dt_high: bool) -> Option<bool> {
        let curr_ab = ab_from_levels(clk_high, dt_high);
        if curr_ab == self.prev_ab {
            return None;
        }

        let transition_idx = ((self.prev_ab << 2) | curr_ab) as usize;
        self.prev_ab = curr_ab;
        self.accum = self
            .accum
            .saturating_add(QUADRATURE_TRANSITIONS[transition_idx]);

        if self.accum >= self.threshold {
            self.accum = 0;
            return Some(true);
        }
        if self.accum <= -self.threshold {
            self.accum = 0;
            return Some(false);
        }
        None
    }
}

/// Press detector that only reports a level after it held for N polls.
#[derive(Debug, Clone, Copy)]
pub struct ButtonDebouncer {
    raw: bool,
    stable: bool,
    stable_count: u8,
    threshold: u8,
}

impl ButtonDebouncer {
    pub fn new(pressed: bool, debounce_polls: u8) -> Self {
        Self {
            raw: pressed,
            stable: pressed,
            stable_count: 0,
            threshold: debounce_polls.max(1),
        }
    }

    /// Returns `true` once per debounced press edge.
    pub fn update(&mut self, pressed: bool) -> bool {
        if pressed == self.raw {
            self.stable_count = self.stable_count.saturating_add(1);
        } else {
            self.raw = pressed;
            self.stable_count = 0;
        }

        if self.stable_count >= self.threshold && self.stable != self.raw {
            self.stable = self.raw;
            return self.stable;
        }
        false
    }
}

#[derive(Debug)]
pub enum RotaryInputError<ClkErr, DtErr, SwErr> {
    Clk(ClkErr),
    Dt(DtErr),
    Sw(SwErr),
}

type RotaryResult<ClkErr, DtErr, SwErr, T> = Result<T, RotaryInputError<ClkErr, DtErr, SwErr>>;

/// Knob on the Core2 expansion header (CLK, DT and push switch).
#[derive(Debug)]
pub struct RotaryInput<CLK, DT, SW> {
    clk: CLK,
    dt: DT,
    sw: SW,
    config: RotaryConfig,
    decoder: QuadratureDecoder,
    button: ButtonDebouncer,
    pending_event: Option<InputEvent>,
}

impl<CLK, DT, SW> RotaryInput<CLK, DT, SW>
where
    CLK: InputPin,
    DT: InputPin,
    SW: InputPin,
{
    pub fn new(
        mut clk: CLK,
        mut dt: DT,
        mut sw: SW,
        config: RotaryConfig,
    ) -> RotaryResult<CLK::Error, DT::Error, SW::Error, Self> {
        let clk_high = clk.is_high().map_err(RotaryInputError::Clk)?;
        let dt_high = dt.is_high().map_err(RotaryInputError::Dt)?;
        let sw_high = sw.is_high().map_err(RotaryInputError::Sw)?;
        let pressed = button_pressed_from_level(sw_high, config.button_active_low);

        Ok(Self {
            clk,
            dt,
            sw,
            config,
            decoder: QuadratureDecoder::new(clk_high, dt_high, config.transitions_per_step),
            button: ButtonDebouncer::new(pressed, config.button_debounce_polls),
            pending_event: None,
        })
    }

    pub fn release(self) -> (CLK, DT, SW) {
        (self.clk, self.dt, self.sw)
    }

    fn poll_button(
        &mut self,
    ) -> RotaryResult<CLK::Error, DT::Error, SW::Error, Option<InputEvent>> {
        let sw_high = self.sw.is_high().map_err(RotaryInputError::Sw)?;
        let pressed = button_pressed_from_level(sw_high, self.config.button_active_low);
        Ok(self.button.update(pressed).then_some(InputEvent::Press))
    }

    fn poll_rotation(
        &mut self,
    ) -> RotaryResult<CLK::Error, DT::Error, SW::Error, Option<InputEvent>> {
        let clk_high = self.clk.is_high().map_err(RotaryInputError::Clk)?;
        let dt_high = self.dt.is_high().map_err(RotaryInputError::Dt)?;

        Ok(self
            .decoder
            .update(clk_high, dt_high)
            .map(|positive| self.rotation_event(positive)))
    }

    fn rotation_event(&self, positive_step: bool) -> InputEvent {
        if positive_step != self.config.direction_inverted {
            InputEvent::RotateCw
        } else {
            InputEvent::RotateCcw
        }
    }
}

impl<CLK, DT, SW> InputProvider for RotaryInput<CLK, DT, SW>
where
    CLK: InputPin,
    DT: InputPin,
    SW: InputPin,
{
    type Error = RotaryInputError<CLK::Error, DT::Error, SW::Error>;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error> {
        if let Some(event) = self.pending_event.take() {
            return Ok(Some(event));
        }

        let button_event = self.poll_button()?;
        let rotation_event = self.poll_rotation()?;

        match (button_event, rotation_event) {
            (Some(button), Some(rotation)) => {
                self.pending_event = Some(rotation);
                Ok(Some(button))
            }
            (button, rotation) => Ok(button.or(rotation)),
        }
    }
}

#[inline]
fn ab_from_levels(clk_high: bool, dt_high: bool) -> u8 {
    ((clk_high as u8) << 1) | (dt_high as u8)
}

#[inline]
fn button_pressed_from_level(sw_high: bool, active_low: bool) -> bool {
    if active_low { !sw_high } else { sw_high }
}
