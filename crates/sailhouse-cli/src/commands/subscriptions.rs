use anyhow::Result;
use colored::Colorize;
use sailhouse_schema::{
    GatewayError, NewSubscription, RemoteSubscription, SubscriptionFilter, SubscriptionType,
    is_valid_endpoint,
};

use crate::cli::SubCreateArgs;
use crate::client::SailhouseClient;
use crate::commands::apps::check_slug;
use crate::config::Session;
use crate::output::{print_data, print_success, print_table};

pub async fn list(client: &SailhouseClient, session: &Session, topic: &str) -> Result<()> {
    let team = session.team()?;
    let app = session.app(client, team).await?;
    let subs = client.list_subscriptions(team, &app, topic).await?;
    print_data(&subs, session.format, |subs| {
        let rows = subs
            .iter()
            .map(|s| {
                [
                    s.slug.magenta().to_string(),
                    s.kind.to_string(),
                    s.endpoint.clone().unwrap_or_else(|| "-".to_string()),
                ]
            })
            .collect();
        print_table(["Slug", "Type", "Endpoint"], rows, "No subscriptions found.");
    })
}

pub async fn create(
    client: &SailhouseClient,
    session: &Session,
    args: &SubCreateArgs,
) -> Result<()> {
    let new_sub = new_subscription(args)?;
    let team = session.team()?;
    let app = session.app(client, team).await?;

    let created = match client.create_subscription(team, &app, &new_sub).await {
        Ok(created) => created,
        Err(GatewayError::Conflict(_)) => anyhow::bail!("Subscription already exists"),
        Err(e) => return Err(e.into()),
    };
    let sub = created.unwrap_or_else(|| RemoteSubscription {
        id: new_sub.slug.clone(),
        topic_id: new_sub.topic_slug.clone(),
        slug: new_sub.slug.clone(),
        kind: new_sub.kind,
        endpoint: new_sub.endpoint.clone(),
        filter_path: new_sub.filter.as_ref().map(|f| f.path.clone()),
        filter_value: new_sub.filter.as_ref().map(|f| f.value.clone()),
    });
    print_data(&sub, session.format, |sub| {
        print_success(&format!(
            "Created {} subscription {} on {}",
            sub.kind,
            sub.slug.cyan(),
            new_sub.topic_slug.cyan()
        ));
    })
}

pub async fn view(
    client: &SailhouseClient,
    session: &Session,
    topic: &str,
    slug: &str,
) -> Result<()> {
    let team = session.team()?;
    let app = session.app(client, team).await?;
    let sub = client.get_subscription(team, &app, topic, slug).await?;
    print_data(&sub, session.format, |sub| {
        let dash = || "-".to_string();
        println!("{}: {}", "ID".cyan(), sub.id);
        println!("{}: {}", "Slug".cyan(), sub.slug.magenta());
        println!("{}: {}", "Topic".cyan(), topic);
        println!("{}: {}", "Type".cyan(), sub.kind);
        println!("{}: {}", "Endpoint".cyan(), sub.endpoint.clone().unwrap_or_else(dash));
        println!("{}: {}", "Filter path".cyan(), sub.filter_path.clone().unwrap_or_else(dash));
        println!("{}: {}", "Filter value".cyan(), sub.filter_value.clone().unwrap_or_else(dash));
    })
}

fn new_subscription(args: &SubCreateArgs) -> Result<NewSubscription> {
    check_slug(&args.slug)?;
    let kind = SubscriptionType::from(args.kind);
    match (kind, args.endpoint.as_deref()) {
        (SubscriptionType::Push, None) => {
            anyhow::bail!("Push subscriptions need an --endpoint")
        }
        (SubscriptionType::Push, Some(endpoint)) if !is_valid_endpoint(endpoint) => {
            anyhow::bail!("Endpoint must be a valid HTTPS URL")
        }
        (SubscriptionType::Pull, Some(_)) => {
            anyhow::bail!("Pull subscriptions cannot have an endpoint")
        }
        _ => {}
    }
    let filter = match (&args.filter_path, &args.filter_value) {
        (Some(path), Some(value)) => Some(SubscriptionFilter {
            path: path.clone(),
            value: value.clone(),
        }),
        (None, None) => None,
        _ => anyhow::bail!("--filter-path and --filter-value must be given together"),
    };
    Ok(NewSubscription {
        slug: args.slug.clone(),
        topic_slug: args.topic.clone(),
        kind,
        endpoint: args.endpoint.clone(),
        schema_key: None,
        filter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::SubscriptionKindArg;

    fn args(kind: SubscriptionKindArg, endpoint: Option<&str>) -> SubCreateArgs {
        SubCreateArgs {
            topic: "orders".to_string(),
            slug: "billing".to_string(),
            kind,
            endpoint: endpoint.map(str::to_string),
            filter_path: None,
            filter_value: None,
        }
    }

    #[test]
    fn test_push_needs_https_endpoint() {
        assert!(new_subscription(&args(SubscriptionKindArg::Push, None)).is_err());
        let plain_http = args(SubscriptionKindArg::Push, Some("http://example.com"));
        assert!(new_subscription(&plain_http).is_err());
        let https = args(SubscriptionKindArg::Push, Some("https://example.com/hook"));
        let sub = new_subscription(&https).unwrap();
        assert_eq!(sub.kind, SubscriptionType::Push);
        assert_eq!(sub.schema_key, None);
    }

    #[test]
    fn test_pull_rejects_endpoint() {
        let with_endpoint = args(SubscriptionKindArg::Pull, Some("https://example.com"));
        assert!(new_subscription(&with_endpoint).is_err());
        assert!(new_subscription(&args(SubscriptionKindArg::Pull, None)).is_ok());
    }

    #[test]
    fn test_filter_needs_both_parts() {
        let mut half = args(SubscriptionKindArg::Pull, None);
        half.filter_path = Some("order.kind".to_string());
        assert!(new_subscription(&half).is_err());

        half.filter_value = Some("gift".to_string());
        let sub = new_subscription(&half).unwrap();
        assert_eq!(sub.filter.map(|f| f.value), Some("gift".to_string()));
    }
}
