use anyhow::Result;
use colored::Colorize;
use sailhouse_schema::is_valid_slug;

use crate::client::{App, SailhouseClient};
use crate::config::Session;
use crate::output::{print_data, print_success, print_table};

pub async fn list(client: &SailhouseClient, session: &Session) -> Result<()> {
    let team = session.team()?;
    let apps = client.list_apps(team).await?;
    print_data(&apps, session.format, |apps| {
        let rows = apps.iter().map(|a| [a.id.clone(), a.slug.magenta().to_string()]).collect();
        print_table(["ID", "Slug"], rows, "No apps found.");
    })
}

pub async fn create(client: &SailhouseClient, session: &Session, slug: &str) -> Result<()> {
    check_slug(slug)?;
    let team = session.team()?;
    client.create_app(team, slug).await?;

    let app = App {
        id: slug.to_string(),
        slug: slug.to_string(),
    };
    print_data(&app, session.format, |app| {
        print_success(&format!("Created app {}", app.slug.cyan()));
    })
}

pub async fn usage(client: &SailhouseClient, session: &Session, slug: Option<&str>) -> Result<()> {
    let team = session.team()?;
    let app = match slug {
        Some(slug) => slug.to_string(),
        None => session.app(client, team).await?,
    };
    let usage = client.app_usage(team, &app).await?;
    print_data(&usage, session.format, |usage| {
        println!(
            "App {} has sent {} events",
            app.magenta(),
            usage.count.to_string().magenta()
        );
    })
}

/// Slugs are lowercase letters, numbers and dashes.
pub fn check_slug(slug: &str) -> Result<()> {
    if slug.is_empty() {
        anyhow::bail!("Slug cannot be empty");
    }
    if !is_valid_slug(slug) {
        anyhow::bail!("Slug can only contain lowercase letters, numbers or dashes");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_slug() {
        assert!(check_slug("orders-2").is_ok());
        assert!(check_slug("").is_err());
        assert!(check_slug("Orders").is_err());
        assert!(check_slug("my_app").is_err());
    }
}
