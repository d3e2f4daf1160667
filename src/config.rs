//! Deployment-tunable knobs for the state-management core, serde-derived
//! behind the `serde` feature so a surrounding server can load them from a
//! config file without this crate knowing the file format.

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelLimits {
    #[cfg_attr(feature = "serde", serde(default = "ChannelLimits::default_max_request_size"))]
    pub max_request_size: u32,
    #[cfg_attr(feature = "serde", serde(default = "ChannelLimits::default_max_response_size"))]
    pub max_response_size: u32,
    #[cfg_attr(feature = "serde", serde(default = "ChannelLimits::default_max_ops"))]
    pub max_ops: u32,
    #[cfg_attr(feature = "serde", serde(default = "ChannelLimits::default_slot_count"))]
    pub slot_count: usize,
}

impl ChannelLimits {
    fn default_max_request_size() -> u32 {
        1_048_576
    }

    fn default_max_response_size() -> u32 {
        1_048_576
    }

    fn default_max_ops() -> u32 {
        16
    }

    fn default_slot_count() -> usize {
        64
    }

    pub fn fore_default() -> Self {
        Self {
            max_request_size: Self::default_max_request_size(),
            max_response_size: Self::default_max_response_size(),
            max_ops: Self::default_max_ops(),
            slot_count: Self::default_slot_count(),
        }
    }

    pub fn back_default() -> Self {
        Self {
            max_request_size: 65_536,
            max_response_size: 65_536,
            max_ops: 4,
            slot_count: 8,
        }
    }
}

impl From<ChannelLimits> for state::ChannelAttrs {
    fn from(limits: ChannelLimits) -> Self {
        state::ChannelAttrs {
            max_request_size: limits.max_request_size,
            max_response_size: limits.max_response_size,
            max_ops: limits.max_ops,
            slot_count: limits.slot_count,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    #[cfg_attr(feature = "serde", serde(default = "ServerConfig::default_lease_seconds"))]
    pub lease_seconds: u64,
    #[cfg_attr(feature = "serde", serde(default = "ServerConfig::default_grace_seconds"))]
    pub grace_seconds: u64,
    #[cfg_attr(
        feature = "serde",
        serde(default = "ServerConfig::default_max_connections_per_session")
    )]
    pub max_connections_per_session: usize,
    #[cfg_attr(feature = "serde", serde(default = "ServerConfig::default_reap_interval_secs"))]
    pub reap_interval_secs: u64,
    #[cfg_attr(feature = "serde", serde(default = "ChannelLimits::fore_default"))]
    pub fore_channel: ChannelLimits,
    #[cfg_attr(feature = "serde", serde(default = "ChannelLimits::back_default"))]
    pub back_channel: ChannelLimits,
    /// Seconds a recalled delegation is given to come back before the
    /// reaper revokes it.
    #[cfg_attr(feature = "serde", serde(default = "ServerConfig::default_recall_timeout_secs"))]
    pub recall_timeout_secs: u64,
}

impl ServerConfig {
    fn default_lease_seconds() -> u64 {
        90
    }

    fn default_grace_seconds() -> u64 {
        90
    }

    fn default_max_connections_per_session() -> usize {
        8
    }

    fn default_reap_interval_secs() -> u64 {
        10
    }

    fn default_recall_timeout_secs() -> u64 {
        30
    }

    pub fn to_state_config(self) -> state::StateManagerConfig {
        state::StateManagerConfig {
            lease_seconds: self.lease_seconds,
            grace_seconds: self.grace_seconds,
            max_connections_per_session: self.max_connections_per_session,
            reap_interval_secs: self.reap_interval_secs,
            server_fore_max: self.fore_channel.into(),
            server_back_max: self.back_channel.into(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            lease_seconds: Self::default_lease_seconds(),
            grace_seconds: Self::default_grace_seconds(),
            max_connections_per_session: Self::default_max_connections_per_session(),
            reap_interval_secs: Self::default_reap_interval_secs(),
            fore_channel: ChannelLimits::fore_default(),
            back_channel: ChannelLimits::back_default(),
            recall_timeout_secs: Self::default_recall_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_converts_into_state_manager_config() {
        let config = ServerConfig::default();
        let state_config = config.to_state_config();
        assert_eq!(state_config.lease_seconds, 90);
        assert_eq!(state_config.server_fore_max.slot_count, 64);
        assert_eq!(state_config.server_back_max.slot_count, 8);
    }
}
