//! Status strip state and the sprite operations that move between states.
//!
//! The connecting/error message sprite covers the whole status strip, so the
//! connected, GPS and sending icons are only drawn while no message is up.

use heapless::Vec;
use log::debug;

/// Upper bound of one plan: one operation per status sprite.
pub const MAX_OVERLAY_OPS: usize = 4;

pub type OverlayPlan = Vec<OverlayOp, MAX_OVERLAY_OPS>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectionPhase {
    Offline,
    Connecting,
    Connected,
    /// Credentials failed validation; the radio is never started.
    ConfigError,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusMessage {
    Connecting,
    ConfigError,
}

impl StatusMessage {
    pub const fn text(self) -> &'static str {
        match self {
            Self::Connecting => "Connecting",
            Self::ConfigError => "Config error",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IndicatorState {
    pub phase: ConnectionPhase,
    pub gps: bool,
    pub sending: bool,
}

impl Default for IndicatorState {
    fn default() -> Self {
        Self::initial()
    }
}

impl IndicatorState {
    /// State of a freshly drawn startup screen: nothing in the status strip.
    pub const fn initial() -> Self {
        Self {
            phase: ConnectionPhase::Offline,
            gps: false,
            sending: false,
        }
    }

    pub const fn with_phase(mut self, phase: ConnectionPhase) -> Self {
        self.phase = phase;
        self
    }

    pub const fn with_gps(mut self, gps: bool) -> Self {
        self.gps = gps;
        self
    }

    pub const fn with_sending(mut self, sending: bool) -> Self {
        self.sending = sending;
        self
    }

    pub const fn message(self) -> Option<StatusMessage> {
        match self.phase {
            ConnectionPhase::Connecting => Some(StatusMessage::Connecting),
            ConnectionPhase::ConfigError => Some(StatusMessage::ConfigError),
            ConnectionPhase::Offline | ConnectionPhase::Connected => None,
        }
    }

    const fn icons_visible(self) -> bool {
        self.message().is_none()
    }

    pub const fn connected_icon(self) -> bool {
        matches!(self.phase, ConnectionPhase::Connected)
    }

    pub const fn gps_icon(self) -> bool {
        self.gps && self.icons_visible()
    }

    pub const fn sending_icon(self) -> bool {
        self.sending && self.icons_visible()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OverlayOp {
    ShowMessage(StatusMessage),
    HideMessage,
    ShowConnected,
    HideConnected,
    ShowGps,
    HideGps,
    ShowSending,
    HideSending,
}

impl OverlayOp {
    pub const fn is_hide(self) -> bool {
        matches!(
            self,
            Self::HideMessage | Self::HideConnected | Self::HideGps | Self::HideSending
        )
    }
}

/// Sprite operations turning the `prev` status strip into `next`.
///
/// Unchanged indicators produce nothing; every hide comes before every show
/// so a late clear never wipes an icon drawn in the same pass.
pub fn plan(prev: IndicatorState, next: IndicatorState) -> OverlayPlan {
    let mut hides = OverlayPlan::new();
    let mut shows = OverlayPlan::new();

    match (prev.message(), next.message()) {
        (before, after) if before == after => {}
        (_, Some(message)) => push(&mut shows, OverlayOp::ShowMessage(message)),
        (Some(_), None) => push(&mut hides, OverlayOp::HideMessage),
        (None, None) => {}
    }

    toggle(
        &mut hides,
        &mut shows,
        prev.connected_icon(),
        next.connected_icon(),
        OverlayOp::HideConnected,
        OverlayOp::ShowConnected,
    );
    toggle(
        &mut hides,
        &mut shows,
        prev.gps_icon(),
        next.gps_icon(),
        OverlayOp::HideGps,
        OverlayOp::ShowGps,
    );
    toggle(
        &mut hides,
        &mut shows,
        prev.sending_icon(),
        next.sending_icon(),
        OverlayOp::HideSending,
        OverlayOp::ShowSending,
    );

    for op in shows {
        push(&mut hides, op);
    }

    if !hides.is_empty() {
        debug!("overlay plan {:?} -> {:?}: {:?}", prev, next, hides);
    }
    hides
}

fn toggle(
    hides: &mut OverlayPlan,
    shows: &mut OverlayPlan,
    before: bool,
    after: bool,
    hide: OverlayOp,
    show: OverlayOp,
) {
    match (before, after) {
        (true, false) => push(hides, hide),
        (false, true) => push(shows, show),
        _ => {}
    }
}

fn push(plan: &mut OverlayPlan, op: OverlayOp) {
    // One op per sprite keeps every plan within MAX_OVERLAY_OPS.
    let _ = plan.push(op);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected() -> IndicatorState {
        IndicatorState::initial().with_phase(ConnectionPhase::Connected)
    }

    #[test]
    fn unchanged_state_needs_no_work() {
        let state = connected().with_gps(true);
        assert!(plan(state, state).is_empty());
    }

    #[test]
    fn connecting_shows_message_only() {
        let next = IndicatorState::initial().with_phase(ConnectionPhase::Connecting);
        assert_eq!(
            plan(IndicatorState::initial(), next).as_slice(),
            &[OverlayOp::ShowMessage(StatusMessage::Connecting)]
        );
    }

    #[test]
    fn connecting_to_connected_clears_message_before_icon() {
        let prev = IndicatorState::initial().with_phase(ConnectionPhase::Connecting);
        assert_eq!(
            plan(prev, connected()).as_slice(),
            &[OverlayOp::HideMessage, OverlayOp::ShowConnected]
        );
    }

    #[test]
    fn gps_flag_is_deferred_until_message_is_gone() {
        let connecting = IndicatorState::initial()
            .with_phase(ConnectionPhase::Connecting)
            .with_gps(true);
        assert!(!connecting.gps_icon());

        assert_eq!(
            plan(connecting, connected().with_gps(true)).as_slice(),
            &[
                OverlayOp::HideMessage,
                OverlayOp::ShowConnected,
                OverlayOp::ShowGps
            ]
        );
    }

    #[test]
    fn losing_connection_hides_icons_then_shows_message() {
        let prev = connected().with_gps(true).with_sending(true);
        let next = prev.with_phase(ConnectionPhase::Connecting);

        let ops = plan(prev, next);
        assert_eq!(
            ops.as_slice(),
            &[
                OverlayOp::HideConnected,
                OverlayOp::HideGps,
                OverlayOp::HideSending,
                OverlayOp::ShowMessage(StatusMessage::Connecting),
            ]
        );
    }

    #[test]
    fn every_plan_orders_hides_before_shows() {
        let phases = [
            ConnectionPhase::Offline,
            ConnectionPhase::Connecting,
            ConnectionPhase::Connected,
            ConnectionPhase::ConfigError,
        ];
        let mut states = std::vec::Vec::new();
        for phase in phases {
            for gps in [false, true] {
                for sending in [false, true] {
                    states.push(
                        IndicatorState::initial()
                            .with_phase(phase)
                            .with_gps(gps)
                            .with_sending(sending),
                    );
                }
            }
        }

        for &prev in &states {
            for &next in &states {
                let ops = plan(prev, next);
                let first_show = ops.iter().position(|op| !op.is_hide()).unwrap_or(ops.len());
                assert!(ops[first_show..].iter().all(|op| !op.is_hide()));
            }
        }
    }

    #[test]
    fn config_error_replaces_connecting_text() {
        let prev = IndicatorState::initial().with_phase(ConnectionPhase::Connecting);
        let next = prev.with_phase(ConnectionPhase::ConfigError);
        assert_eq!(
            plan(prev, next).as_slice(),
            &[OverlayOp::ShowMessage(StatusMessage::ConfigError)]
        );
        assert_eq!(StatusMessage::ConfigError.text(), "Config error");
    }

    #[test]
    fn sending_blinks_independently_while_connected() {
        let idle = connected();
        let busy = idle.with_sending(true);
        assert_eq!(plan(idle, busy).as_slice(), &[OverlayOp::ShowSending]);
        assert_eq!(plan(busy, idle).as_slice(), &[OverlayOp::HideSending]);
    }
}
