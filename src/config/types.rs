use serde::{Deserialize, Serialize};

/// Which avatar widget the shell renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvatarVariant {
    /// Canvas-style particle orb (the default).
    Orb,
    /// Glow bubble on a dark background, transition-driven.
    Glow,
    /// Soft glow bubble on a light background.
    SoftGlow,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_variant")]
    pub avatar_variant: AvatarVariant,
    #[serde(default = "default_agent_id")]
    pub agent_id: String,
    #[serde(default = "default_api_host")]
    pub api_host: String,
    /// Persisted dim factor; the change_brightness tool adjusts the live value.
    #[serde(default = "default_brightness")]
    pub brightness: f32,
    #[serde(default)]
    pub show_timestamps: bool,
}

fn default_variant() -> AvatarVariant {
    AvatarVariant::Orb
}

fn default_agent_id() -> String {
    "d6Q8ix7Tn32xMQ0e1y1A".to_string()
}

fn default_api_host() -> String {
    "api.elevenlabs.io".to_string()
}

fn default_brightness() -> f32 {
    1.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            avatar_variant: default_variant(),
            agent_id: default_agent_id(),
            api_host: default_api_host(),
            brightness: default_brightness(),
            show_timestamps: false,
        }
    }
}
