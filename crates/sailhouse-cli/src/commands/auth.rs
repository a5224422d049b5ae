use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use crate::auth::{self, StoredCredentials};
use crate::client::SailhouseClient;
use crate::config::{ConfigStore, Session};
use crate::output::{print_data, print_success};

/// Verifies the token against the API, then stores it for the profile.
pub async fn login(store: &ConfigStore, session: &Session, token: &str) -> Result<()> {
    let client = SailhouseClient::new(&session.api_url, token)?;
    let teams = client
        .list_teams()
        .await
        .context("Token was rejected by the API")?;

    auth::save_credentials(
        store,
        &session.profile,
        &StoredCredentials {
            token: token.to_string(),
        },
    )?;
    print_success(&format!(
        "Saved token for profile \"{}\"",
        session.profile.cyan()
    ));

    if session.team.is_none()
        && let [team] = teams.as_slice()
    {
        let mut cfg = store.load_profile(&session.profile)?;
        cfg.team = Some(team.slug.clone());
        store.save_profile(&session.profile, &cfg)?;
        print_success(&format!("Using team {}", team.slug.cyan()));
    }
    Ok(())
}

pub fn logout(store: &ConfigStore, profile: &str) -> Result<()> {
    if auth::remove_credentials(store, profile)? {
        print_success("Logged out (credentials removed)");
    } else {
        println!("No credentials found for profile \"{profile}\"");
    }
    Ok(())
}

#[derive(Serialize)]
struct Status<'a> {
    profile: &'a str,
    api_url: &'a str,
    token: Option<String>,
    team: Option<&'a str>,
    app: Option<&'a str>,
}

pub fn status(session: &Session) -> Result<()> {
    let status = Status {
        profile: &session.profile,
        api_url: &session.api_url,
        token: session.token.as_deref().map(auth::mask_token),
        team: session.team.as_deref(),
        app: session.app.as_deref(),
    };
    print_data(&status, session.format, |s| {
        let not_set = || "Not set".yellow().to_string();
        println!("{}: {}", "Profile".cyan(), s.profile);
        println!("{}: {}", "API".cyan(), s.api_url);
        println!("{}: {}", "Token".cyan(), s.token.clone().unwrap_or_else(not_set));
        println!(
            "{}: {}",
            "Team".cyan(),
            s.team.map(str::to_string).unwrap_or_else(not_set)
        );
        println!(
            "{}: {}",
            "App".cyan(),
            s.app.map(str::to_string).unwrap_or_else(not_set)
        );
    })
}
