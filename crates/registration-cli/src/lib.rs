//! Command-line front end for the registration API.

pub mod commands;
pub mod config;
pub mod error;
pub mod preferences;

pub use commands::{execute, Cli, Command, LocaleAction, UserArgs};
pub use config::Config;
pub use error::{AppError, AppResult, PreferencesError};
pub use preferences::Preferences;

use registration_client::RegistrationClient;

/// Build the registration client described by the configuration.
pub fn build_client(config: &config::ServerConfig) -> AppResult<RegistrationClient> {
    let mut builder = reqwest::Client::builder().cookie_store(true);
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    Ok(RegistrationClient::with_http_client(
        builder.build()?,
        &config.base_url,
    ))
}
