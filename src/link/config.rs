//! Link configuration.

use std::time::Duration;

use crate::consts::{
    DEFAULT_COMMAND_RETRIES, DEFAULT_COMMAND_TIMEOUT, DEFAULT_COMPONENT_ID,
    DEFAULT_HEARTBEAT_TIMEOUT, DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_MISSION_ITEM_TIMEOUT,
    DEFAULT_MISSION_RETRIES, DEFAULT_RECONNECT_INTERVAL, DEFAULT_STREAM_RATE_HZ,
    DEFAULT_SYSTEM_ID, DEFAULT_TARGET_COMPONENT, DEFAULT_TARGET_SYSTEM,
};

/// Tunable link parameters. The defaults suit a 57600-baud telemetry radio.
#[derive(Clone, Debug)]
pub struct LinkConfig {
    /// Watchdog window: the link is lost when no heartbeat arrives for this long.
    pub heartbeat_timeout: Duration,
    /// Delay between reconnection attempts after a lost link.
    pub reconnect_interval: Duration,
    /// Consecutive reconnection attempts before the supervisor gives up.
    pub max_reconnect_attempts: usize,
    /// Per-attempt command acknowledgement timeout.
    pub command_timeout: Duration,
    /// Command retransmissions before failing with a timeout.
    pub command_retries: u8,
    /// Per-step mission transfer timeout.
    pub mission_item_timeout: Duration,
    /// Mission step retransmissions before failing with a timeout.
    pub mission_retries: u8,
    /// Telemetry stream rate requested from the vehicle on connect.
    pub stream_rate_hz: u16,
    /// System `ID` of this ground station.
    pub system_id: u8,
    /// Component `ID` of this ground station.
    pub component_id: u8,
    /// System `ID` of the vehicle.
    pub target_system: u8,
    /// Component `ID` of the vehicle autopilot.
    pub target_component: u8,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            heartbeat_timeout: DEFAULT_HEARTBEAT_TIMEOUT,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            command_retries: DEFAULT_COMMAND_RETRIES,
            mission_item_timeout: DEFAULT_MISSION_ITEM_TIMEOUT,
            mission_retries: DEFAULT_MISSION_RETRIES,
            stream_rate_hz: DEFAULT_STREAM_RATE_HZ,
            system_id: DEFAULT_SYSTEM_ID,
            component_id: DEFAULT_COMPONENT_ID,
            target_system: DEFAULT_TARGET_SYSTEM,
            target_component: DEFAULT_TARGET_COMPONENT,
        }
    }
}

impl LinkConfig {
    /// Sets the heartbeat watchdog window.
    pub fn with_heartbeat_timeout(mut self, timeout: Duration) -> Self {
        self.heartbeat_timeout = timeout;
        self
    }

    /// Sets the reconnection interval.
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Sets the maximum number of consecutive reconnection attempts.
    pub fn with_max_reconnect_attempts(mut self, attempts: usize) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// Sets the command acknowledgement timeout.
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Sets the addressed vehicle's system and component `ID`.
    pub fn with_target(mut self, system: u8, component: u8) -> Self {
        self.target_system = system;
        self.target_component = component;
        self
    }
}
