pub(crate) mod diagnostics;
pub(crate) mod handler;
pub mod settings;
pub(crate) mod state;
pub(crate) mod workspace;

pub use settings::ServerSettings;
pub use state::SailLanguageServer;
