pub mod loader;
pub mod schema;
pub mod settings;

pub use loader::{load_from_path, load_from_str, ConfigError, ProfileError};
pub use schema::{Profile, SyntaxSection, ValidationError, ValidationIssue};
pub use settings::{Settings, SettingsError, SettingsInput};
