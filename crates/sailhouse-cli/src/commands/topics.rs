use anyhow::Result;
use colored::Colorize;
use sailhouse_schema::RemoteTopic;

use crate::client::SailhouseClient;
use crate::commands::apps::check_slug;
use crate::config::Session;
use crate::output::{print_data, print_success, print_table};

pub async fn list(client: &SailhouseClient, session: &Session) -> Result<()> {
    let team = session.team()?;
    let app = session.app(client, team).await?;
    let topics = client.list_topics(team, &app).await?;
    print_data(&topics, session.format, |topics| {
        let rows = topics
            .iter()
            .map(|t| [t.id.clone(), t.slug.magenta().to_string()])
            .collect();
        print_table(["ID", "Slug"], rows, "No topics found.");
    })
}

pub async fn create(client: &SailhouseClient, session: &Session, slug: &str) -> Result<()> {
    check_slug(slug)?;
    let team = session.team()?;
    let app = session.app(client, team).await?;
    client.create_topic(team, &app, slug).await?;

    let topic = RemoteTopic {
        id: slug.to_string(),
        slug: slug.to_string(),
    };
    print_data(&topic, session.format, |topic| {
        print_success(&format!("Created topic {} in {}", topic.slug.cyan(), app.cyan()));
    })
}
