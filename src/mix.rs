//! Static mix levels.
//!
//! Every tone's peak gain is its channel level multiplied by the master
//! level. There is no compression or limiting on top of that.

use serde::{Deserialize, Serialize};

/// A mix channel. Each tone kind plays on its own channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Ghost,
    Arcade,
    Hum,
    Ping,
    Blip,
    Roo,
}

/// Linear gain multipliers per channel, plus a master multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixLevels {
    pub master: f32,
    pub ghost: f32,
    pub arcade: f32,
    pub hum: f32,
    pub ping: f32,
    pub blip: f32,
    pub roo: f32,
}

impl Default for MixLevels {
    fn default() -> Self {
        Self {
            master: 1.0,
            ghost: 0.10,
            arcade: 0.2,
            hum: 0.003,
            ping: 0.15,
            blip: 0.2,
            roo: 0.05,
        }
    }
}

impl MixLevels {
    /// Raw level for a channel, before the master multiplier.
    pub fn channel(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Ghost => self.ghost,
            Channel::Arcade => self.arcade,
            Channel::Hum => self.hum,
            Channel::Ping => self.ping,
            Channel::Blip => self.blip,
            Channel::Roo => self.roo,
        }
    }

    /// Effective peak gain for a channel: `channel * master`.
    #[inline]
    pub fn level(&self, channel: Channel) -> f32 {
        self.channel(channel) * self.master
    }

    /// Set the master multiplier (builder pattern).
    pub fn with_master(mut self, master: f32) -> Self {
        self.master = master;
        self
    }

    pub(crate) fn all(&self) -> [(&'static str, f32); 7] {
        [
            ("master", self.master),
            ("ghost", self.ghost),
            ("arcade", self.arcade),
            ("hum", self.hum),
            ("ping", self.ping),
            ("blip", self.blip),
            ("roo", self.roo),
        ]
    }
}
