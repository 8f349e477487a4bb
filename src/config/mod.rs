//! Configuration: dotted-key utilities and layered settings

mod dotted;
mod settings;

pub use dotted::{deep_merge, dotted_to_nested, expand_dotted_keys};
pub use settings::{
    EffectiveSettings, Settings, SettingsError, SettingsOrigin, SettingsSource,
};
