use anyhow::Result;
use colored::Colorize;

use crate::client::SailhouseClient;
use crate::config::{ConfigStore, Session};
use crate::output::{print_data, print_success, print_table};

pub async fn list(client: &SailhouseClient, session: &Session) -> Result<()> {
    let teams = client.list_teams().await?;
    print_data(&teams, session.format, |teams| {
        let current = session.team.as_deref();
        let rows = teams
            .iter()
            .map(|t| {
                let marker = if Some(t.slug.as_str()) == current { "*" } else { "" };
                [marker.to_string(), t.id.clone(), t.slug.clone()]
            })
            .collect();
        print_table(["", "ID", "Slug"], rows, "No teams found.");
    })
}

/// Makes `slug` the profile's team. The stored app belongs to the old team
/// and is cleared.
pub async fn set(
    client: &SailhouseClient,
    store: &ConfigStore,
    session: &Session,
    slug: &str,
) -> Result<()> {
    let teams = client.list_teams().await?;
    if !teams.iter().any(|t| t.slug == slug) {
        let known: Vec<&str> = teams.iter().map(|t| t.slug.as_str()).collect();
        anyhow::bail!("Team {slug} not found. Available teams: {}", known.join(", "));
    }

    let mut cfg = store.load_profile(&session.profile)?;
    if cfg.team.as_deref() != Some(slug) {
        cfg.app = None;
    }
    cfg.team = Some(slug.to_string());
    store.save_profile(&session.profile, &cfg)?;
    print_success(&format!("Using team {}", slug.cyan()));
    Ok(())
}
