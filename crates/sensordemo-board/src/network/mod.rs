//! Wi-Fi connectivity state shared between the async network worker and the UI loop.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use sensordemo_core::overlay::ConnectionPhase;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum ConnectivityState {
    Disconnected = 0,
    Connecting = 1,
    LinkUpNoIp = 2,
    Connected = 3,
    /// Credentials failed validation; the radio stays off.
    ConfigError = 4,
}

impl ConnectivityState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Connecting,
            2 => Self::LinkUpNoIp,
            3 => Self::Connected,
            4 => Self::ConfigError,
            _ => Self::Disconnected,
        }
    }
}

/// Immutable connectivity snapshot for the UI loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConnectivitySnapshot {
    pub state: ConnectivityState,
    pub link_up: bool,
    pub has_ipv4: bool,
    pub revision: u32,
}

impl ConnectivitySnapshot {
    pub const fn disconnected() -> Self {
        Self {
            state: ConnectivityState::Disconnected,
            link_up: false,
            has_ipv4: false,
            revision: 0,
        }
    }

    /// Status strip phase: anything short of an address still reads as connecting.
    pub const fn phase(self) -> ConnectionPhase {
        match self.state {
            ConnectivityState::Disconnected => ConnectionPhase::Offline,
            ConnectivityState::Connecting | ConnectivityState::LinkUpNoIp => {
                ConnectionPhase::Connecting
            }
            ConnectivityState::Connected => ConnectionPhase::Connected,
            ConnectivityState::ConfigError => ConnectionPhase::ConfigError,
        }
    }
}

/// Lock-free shared connectivity status.
#[derive(Debug)]
pub struct ConnectivityHandle {
    state: AtomicU8,
    link_up: AtomicBool,
    has_ipv4: AtomicBool,
    revision: AtomicU32,
}

impl ConnectivityHandle {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(ConnectivityState::Disconnected as u8),
            link_up: AtomicBool::new(false),
            has_ipv4: AtomicBool::new(false),
            revision: AtomicU32::new(0),
        }
    }

    pub fn snapshot(&self) -> ConnectivitySnapshot {
        ConnectivitySnapshot {
            state: ConnectivityState::from_raw(self.state.load(Ordering::Acquire)),
            link_up: self.link_up.load(Ordering::Acquire),
            has_ipv4: self.has_ipv4.load(Ordering::Acquire),
            revision: self.revision.load(Ordering::Acquire),
        }
    }

    pub fn mark_connecting(&self) {
        if self.is_config_error() {
            return;
        }
        self.update_state(ConnectivityState::Connecting);
    }

    /// Sticky: nothing but a reflash clears a configuration error.
    pub fn mark_config_error(&self) {
        let mut changed = false;
        changed |= self.store_bool(&self.link_up, false);
        changed |= self.store_bool(&self.has_ipv4, false);
        changed |= self.store_state(ConnectivityState::ConfigError);
        if changed {
            self.bump_revision();
        }
    }

    pub fn mark_disconnected(&self) {
        if self.is_config_error() {
            return;
        }
        let mut changed = false;
        changed |= self.store_bool(&self.link_up, false);
        changed |= self.store_bool(&self.has_ipv4, false);
        changed |= self.store_state(ConnectivityState::Disconnected);
        if changed {
            self.bump_revision();
        }
    }

    pub fn update_link_ip(&self, link_up: bool, has_ipv4: bool) {
        if self.is_config_error() {
            return;
        }
        let mut changed = false;
        changed |= self.store_bool(&self.link_up, link_up);
        changed |= self.store_bool(&self.has_ipv4, has_ipv4);
        changed |= self.store_state(Self::state_for(link_up, has_ipv4));

        if changed {
            self.bump_revision();
        }
    }

    fn is_config_error(&self) -> bool {
        self.state.load(Ordering::Acquire) == ConnectivityState::ConfigError as u8
    }

    fn update_state(&self, next: ConnectivityState) {
        if self.store_state(next) {
            self.bump_revision();
        }
    }

    fn state_for(link_up: bool, has_ipv4: bool) -> ConnectivityState {
        if !link_up {
            ConnectivityState::Disconnected
        } else if !has_ipv4 {
            ConnectivityState::LinkUpNoIp
        } else {
            ConnectivityState::Connected
        }
    }

    fn store_state(&self, next: ConnectivityState) -> bool {
        self.state.swap(next as u8, Ordering::AcqRel) != next as u8
    }

    fn store_bool(&self, cell: &AtomicBool, next: bool) -> bool {
        cell.swap(next, Ordering::AcqRel) != next
    }

    fn bump_revision(&self) {
        self.revision.fetch_add(1, Ordering::AcqRel);
    }
}

impl Default for ConnectivityHandle {
    fn default() -> Self {
        Self::new()
    }
}
