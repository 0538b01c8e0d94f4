use serde::{Deserialize, Serialize};

/// Fixed-price service option that can be attached to any quote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AddOn {
    #[serde(rename = "addon-install")]
    Install,
    #[serde(rename = "addon-config")]
    Config,
    #[serde(rename = "addon-network")]
    Network,
}

impl AddOn {
    pub const ALL: [AddOn; 3] = [AddOn::Install, AddOn::Config, AddOn::Network];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Install => "addon-install",
            Self::Config => "addon-config",
            Self::Network => "addon-network",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Install => "Installation",
            Self::Config => "Configuration",
            Self::Network => "Network Setup",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "addon-install" => Some(Self::Install),
            "addon-config" => Some(Self::Config),
            "addon-network" => Some(Self::Network),
            _ => None,
        }
    }
}
