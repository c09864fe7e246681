//! Subcommands, one per registration operation.

use crate::error::AppResult;
use crate::preferences::Preferences;
use clap::{Args, Parser, Subcommand};
use registration_client::{
    Ack, Credentials, RegistrationClient, RegistrationRequest, ValidationCodes,
};
use serde_json::{json, Value};
use tracing::debug;

/// Language used for description lookups when no locale is stored.
const FALLBACK_LANG: &str = "en";

#[derive(Parser)]
#[command(name = "registration")]
#[command(about = "Drive the self-service registration API", long_about = None)]
pub struct Cli {
    /// Identity server base URL (overrides SERVER__BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Request email and SMS validation codes for a new account
    RequestValidation(UserArgs),
    /// Submit the registration form with both verification codes
    Register {
        #[command(flatten)]
        user: UserArgs,
        /// Code received by email
        #[arg(long, default_value = "")]
        email_code: String,
        /// Code received by SMS
        #[arg(long, default_value = "")]
        phone_code: String,
        /// Pre-encoded query string forwarded to the server
        #[arg(long, default_value = "")]
        redirect_params: String,
    },
    /// Fetch an organization's logo
    Logo {
        /// Organization global id
        global_id: String,
    },
    /// Fetch an organization's description
    Description {
        /// Organization global id
        global_id: String,
        /// Language key; defaults to the stored locale
        #[arg(long)]
        lang: Option<String>,
    },
    /// Show whether password-only login is allowed
    TwoFactorMode,
    /// Resend the validation codes
    ResendValidation {
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
    },
    /// Submit the code received by SMS
    SubmitSmsCode {
        /// Code received by SMS
        code: String,
    },
    /// Show whether the email and SMS validation links were opened
    ConfirmationStatus,
    /// Manage the stored locale
    Locale {
        #[command(subcommand)]
        action: LocaleAction,
    },
}

#[derive(Subcommand)]
pub enum LocaleAction {
    /// Print the stored locale
    Get,
    /// Store a locale
    Set { lang_key: String },
    /// Remove the stored locale
    Clear,
}

#[derive(Args)]
pub struct UserArgs {
    #[arg(long)]
    pub firstname: String,
    #[arg(long)]
    pub lastname: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
    /// Account password
    #[arg(long, env = "REGISTRATION_PASSWORD", hide_env_values = true)]
    pub password: String,
}

impl UserArgs {
    fn into_request(self) -> RegistrationRequest {
        RegistrationRequest::new(
            self.firstname,
            self.lastname,
            self.email,
            self.phone,
            self.password,
        )
    }
}

/// Run one subcommand and return its result as JSON.
pub async fn execute(
    command: Command,
    client: &RegistrationClient,
    preferences: &Preferences,
) -> AppResult<Value> {
    match command {
        Command::RequestValidation(user) => {
            let lang_key = preferences.lang_key().await?;
            let ack = client
                .request_email_and_phone_validation(&user.into_request(), lang_key.as_deref())
                .await?;
            Ok(ack_json(&ack))
        }
        Command::Register {
            user,
            email_code,
            phone_code,
            redirect_params,
        } => {
            let credentials = Credentials {
                request: user.into_request(),
                codes: ValidationCodes {
                    emailcode: email_code,
                    phonenumbercode: phone_code,
                },
                redirect_params,
            };
            let lang_key = preferences.lang_key().await?;
            let ack = client.register(&credentials, lang_key.as_deref()).await?;
            Ok(ack_json(&ack))
        }
        Command::Logo { global_id } => {
            let logo = client.fetch_organization_logo(&global_id).await?;
            Ok(serde_json::to_value(logo)?)
        }
        Command::Description { global_id, lang } => {
            let lang = match lang {
                Some(lang) => lang,
                None => preferences
                    .lang_key()
                    .await?
                    .unwrap_or_else(|| FALLBACK_LANG.to_string()),
            };
            let description = client
                .fetch_organization_description(&global_id, &lang)
                .await?;
            Ok(serde_json::to_value(description)?)
        }
        Command::TwoFactorMode => {
            let mode = client.check_two_factor_mode().await?;
            Ok(serde_json::to_value(mode)?)
        }
        Command::ResendValidation { email, phone } => {
            let lang_key = preferences.lang_key().await?;
            let ack = client
                .resend_validation(&email, &phone, lang_key.as_deref())
                .await?;
            Ok(ack_json(&ack))
        }
        Command::SubmitSmsCode { code } => {
            let ack = client.submit_sms_code(&code).await?;
            Ok(ack_json(&ack))
        }
        Command::ConfirmationStatus => {
            let (sms, email) = tokio::join!(
                client.check_sms_confirmation(),
                client.check_email_confirmation(),
            );
            Ok(json!({
                "sms": sms?.confirmed,
                "email": email?.confirmed,
            }))
        }
        Command::Locale { action } => execute_locale(action, preferences).await,
    }
}

async fn execute_locale(action: LocaleAction, preferences: &Preferences) -> AppResult<Value> {
    match action {
        LocaleAction::Get => {}
        LocaleAction::Set { lang_key } => {
            preferences.set_lang_key(&lang_key).await?;
            debug!(lang_key = %lang_key, "Locale stored");
        }
        LocaleAction::Clear => {
            preferences.clear_lang_key().await?;
            debug!("Locale cleared");
        }
    }

    Ok(json!({ "langKey": preferences.lang_key().await? }))
}

fn ack_json(ack: &Ack) -> Value {
    json!({
        "status": ack.status,
        "body": ack.body,
    })
}
