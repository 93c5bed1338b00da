use anyhow::{anyhow, bail, Result};

use flashdeck_lib::auth::{
    AuthError, AuthResponse, AuthResult, LoginRequest, ProfileUpdate, RegisterRequest, User,
};

use crate::app::{password_or_prompt, App};
use crate::OutputFormat;

fn user_facing(error: AuthError) -> anyhow::Error {
    log::debug!("Auth failed: {:?}", error);
    anyhow!(error.client_message())
}

fn print_user(user: &User, headline: &str, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(user)?),
        OutputFormat::Plain => {
            println!("{}", headline);
            println!("  Name:  {}", user.name);
            println!("  Email: {}", user.email);
            println!("  ID:    {}", user.id);
        }
    }
    Ok(())
}

/// JSON output is the `AuthResponse` shape, success or not
fn report_auth(
    result: AuthResult<User>,
    headline: impl FnOnce(&User) -> String,
    format: &OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let response = AuthResponse::from(result);
            println!("{}", serde_json::to_string_pretty(&response)?);
            if let Some(error) = response.error {
                bail!(error);
            }
            Ok(())
        }
        OutputFormat::Plain => {
            let user = result.map_err(user_facing)?;
            print_user(&user, &headline(&user), format)
        }
    }
}

pub async fn run_register(
    app: &mut App,
    name: String,
    email: String,
    password: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    let password = password_or_prompt(password)?;
    let result = app
        .flashdeck
        .register(RegisterRequest { name, email, password })
        .await;

    report_auth(result, |user| format!("Welcome, {}!", user.name), format)
}

pub async fn run_login(
    app: &mut App,
    email: String,
    password: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    let password = password_or_prompt(password)?;
    let result = app.flashdeck.login(LoginRequest { email, password }).await;

    report_auth(result, |user| format!("Logged in as {}", user.name), format)
}

pub async fn run_logout(app: &mut App) -> Result<()> {
    match app.flashdeck.user().map(|u| u.email.clone()) {
        Some(email) => {
            app.flashdeck.logout().await;
            println!("Logged out {}", email);
        }
        None => println!("Not logged in"),
    }
    Ok(())
}

pub fn run_whoami(app: &App, format: &OutputFormat) -> Result<()> {
    let user = app.require_user()?;
    let since = user.created_at.format("%Y-%m-%d");
    print_user(&user, &format!("{} (member since {})", user.name, since), format)
}

pub async fn run_profile(
    app: &mut App,
    name: Option<String>,
    email: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    app.require_user()?;
    if name.is_none() && email.is_none() {
        return run_whoami(app, format);
    }

    let result = app
        .flashdeck
        .auth
        .update_profile(ProfileUpdate { name, email })
        .await;

    report_auth(result, |_| "Profile updated".to_string(), format)
}
