use anyhow::Result;
use colored::Colorize;

use crate::client::SailhouseClient;
use crate::config::Session;
use crate::output::{print_data, print_table, print_warning};

pub async fn create(client: &SailhouseClient, session: &Session, label: &str) -> Result<()> {
    if label.trim().is_empty() {
        anyhow::bail!("Label cannot be empty");
    }
    let team = session.team()?;
    let app = session.app(client, team).await?;
    let token = client.create_token(team, &app, label).await?;
    print_data(&token, session.format, |token| {
        println!("{}", token.green());
        print_warning("Store this token now; it will not be shown again");
    })
}

pub async fn list(client: &SailhouseClient, session: &Session) -> Result<()> {
    let team = session.team()?;
    let app = session.app(client, team).await?;
    let tokens = client.list_tokens(team, &app).await?;
    print_data(&tokens, session.format, |tokens| {
        let rows = tokens
            .iter()
            .map(|t| [t.id.clone(), t.preview.clone()])
            .collect();
        print_table(["ID", "Preview"], rows, "No tokens found");
    })
}
