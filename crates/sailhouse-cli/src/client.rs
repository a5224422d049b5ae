use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use sailhouse_schema::{
    GatewayError, NewSubscription, RemoteGateway, RemoteState, RemoteSubscription, RemoteTopic,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    pub id: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUsage {
    pub app_id: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPreview {
    pub id: String,
    pub preview: String,
}

#[derive(Debug, Deserialize)]
struct CreateTokenResponse {
    token: String,
}

/// HTTP client for the Sailhouse API.
pub struct SailhouseClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl SailhouseClient {
    pub fn new(base_url: &str, token: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("Invalid API URL {base_url}: {e}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Invalid API URL {base_url}");
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token: token.to_string(),
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.url(segments);
        tracing::debug!(%method, %url, "sailhouse request");
        self.http
            .request(method, url)
            .header("Authorization", &self.token)
            .header("Accept", "application/json")
    }

    pub async fn list_teams(&self) -> Result<Vec<Team>, GatewayError> {
        let resp = send(self.request(Method::GET, &["teams"]), "teams").await?;
        parse_json(resp).await
    }

    pub async fn list_apps(&self, team: &str) -> Result<Vec<App>, GatewayError> {
        let req = self.request(Method::GET, &["teams", team, "apps"]);
        parse_json(send(req, &format!("team {team}")).await?).await
    }

    pub async fn create_app(&self, team: &str, slug: &str) -> Result<(), GatewayError> {
        let req = self
            .request(Method::POST, &["teams", team, "apps", slug])
            .json(&json!({ "name": slug, "slug": slug }));
        send(req, &format!("app {slug}")).await?;
        Ok(())
    }

    pub async fn app_usage(&self, team: &str, app: &str) -> Result<AppUsage, GatewayError> {
        let req = self.request(Method::GET, &["teams", team, "apps", app, "usage"]);
        parse_json(send(req, &format!("app {app}")).await?).await
    }

    pub async fn list_topics(
        &self,
        team: &str,
        app: &str,
    ) -> Result<Vec<RemoteTopic>, GatewayError> {
        let req = self.request(Method::GET, &["teams", team, "apps", app, "topics"]);
        parse_json(send(req, &format!("app {app}")).await?).await
    }

    pub async fn create_topic(
        &self,
        team: &str,
        app: &str,
        slug: &str,
    ) -> Result<(), GatewayError> {
        let req = self
            .request(Method::POST, &["teams", team, "apps", app, "topics"])
            .json(&json!({ "slug": slug, "subscriptions": [] }));
        send(req, &format!("topic {slug}")).await?;
        Ok(())
    }

    /// Creates a topic tagged with a schema key.
    pub async fn create_keyed_topic(
        &self,
        team: &str,
        app: &str,
        slug: &str,
        key: &str,
    ) -> Result<(), GatewayError> {
        let req = self
            .request(Method::POST, &["teams", team, "apps", app, "topics", slug])
            .json(&json!({ "slug": slug, "subscriptions": [], "schema_key": key }));
        send(req, &format!("topic {slug}")).await?;
        Ok(())
    }

    pub async fn delete_topic(
        &self,
        team: &str,
        app: &str,
        slug: &str,
    ) -> Result<(), GatewayError> {
        let req = self.request(Method::DELETE, &["teams", team, "apps", app, "topics", slug]);
        send(req, &format!("topic {slug}")).await?;
        Ok(())
    }

    pub async fn list_subscriptions(
        &self,
        team: &str,
        app: &str,
        topic: &str,
    ) -> Result<Vec<RemoteSubscription>, GatewayError> {
        let req = self.request(
            Method::GET,
            &["teams", team, "apps", app, "topics", topic, "subscriptions"],
        );
        parse_json(send(req, &format!("topic {topic}")).await?).await
    }

    pub async fn get_subscription(
        &self,
        team: &str,
        app: &str,
        topic: &str,
        slug: &str,
    ) -> Result<RemoteSubscription, GatewayError> {
        let req = self.request(
            Method::GET,
            &["teams", team, "apps", app, "topics", topic, "subscriptions", slug],
        );
        parse_json(send(req, &format!("subscription {slug}")).await?).await
    }

    /// Creates a subscription. Returns the created subscription when the
    /// service echoes it back.
    pub async fn create_subscription(
        &self,
        team: &str,
        app: &str,
        sub: &NewSubscription,
    ) -> Result<Option<RemoteSubscription>, GatewayError> {
        let req = self
            .request(
                Method::POST,
                &["teams", team, "apps", app, "topics", &sub.topic_slug, "subscriptions"],
            )
            .json(&subscription_body(sub));
        let resp = send(req, &format!("subscription {}", sub.slug)).await?;
        let body = resp.text().await.map_err(transport)?;
        Ok(serde_json::from_str(&body).ok())
    }

    pub async fn delete_subscription(
        &self,
        team: &str,
        app: &str,
        topic: &str,
        slug: &str,
    ) -> Result<(), GatewayError> {
        let req = self.request(
            Method::DELETE,
            &["teams", team, "apps", app, "topics", topic, "subscriptions", slug],
        );
        send(req, &format!("subscription {slug}")).await?;
        Ok(())
    }

    /// Creates an app token and returns its full value.
    pub async fn create_token(
        &self,
        team: &str,
        app: &str,
        label: &str,
    ) -> Result<String, GatewayError> {
        let req = self
            .request(Method::POST, &["teams", team, "apps", app, "tokens"])
            .json(&json!({ "label": label }));
        let resp: CreateTokenResponse = parse_json(send(req, &format!("app {app}")).await?).await?;
        Ok(resp.token)
    }

    pub async fn list_tokens(
        &self,
        team: &str,
        app: &str,
    ) -> Result<Vec<TokenPreview>, GatewayError> {
        let req = self.request(Method::GET, &["teams", team, "apps", app, "tokens"]);
        parse_json(send(req, &format!("app {app}")).await?).await
    }

    /// Topics and subscriptions tagged with a schema key.
    pub async fn schema_state(
        &self,
        team: &str,
        app: &str,
        key: &str,
    ) -> Result<RemoteState, GatewayError> {
        let req = self.request(Method::GET, &["teams", team, "apps", app, "schemas", key]);
        parse_json(send(req, &format!("app {app}")).await?).await
    }
}

fn subscription_body(sub: &NewSubscription) -> Value {
    let mut body = json!({ "slug": sub.slug, "type": sub.kind.as_str() });
    if let Some(endpoint) = &sub.endpoint {
        body["endpoint"] = json!(endpoint);
    }
    if let Some(key) = &sub.schema_key {
        body["schema_key"] = json!(key);
    }
    if let Some(filter) = &sub.filter {
        body["filter_path"] = json!(filter.path);
        body["filter_value"] = json!(filter.value);
    }
    body
}

fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::transport(err.to_string())
}

async fn send(req: RequestBuilder, what: &str) -> Result<reqwest::Response, GatewayError> {
    let resp = req
        .send()
        .await
        .map_err(|e| GatewayError::transport(format!("Failed to connect to server: {e}")))?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    tracing::debug!(%status, %body, "sailhouse request failed");
    Err(match status {
        StatusCode::NOT_FOUND => GatewayError::not_found(what),
        StatusCode::CONFLICT => GatewayError::conflict(what),
        _ => GatewayError::transport(format!("HTTP {status}: {}", body.trim())),
    })
}

async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, GatewayError> {
    let body = resp.text().await.map_err(transport)?;
    serde_json::from_str(&body)
        .map_err(|e| GatewayError::transport(format!("Failed to parse response JSON: {e}")))
}

/// [`RemoteGateway`] over the HTTP API for one team.
pub struct SchemaGateway<'a> {
    client: &'a SailhouseClient,
    team: &'a str,
}

impl<'a> SchemaGateway<'a> {
    pub fn new(client: &'a SailhouseClient, team: &'a str) -> Self {
        Self { client, team }
    }
}

#[async_trait]
impl RemoteGateway for SchemaGateway<'_> {
    async fn fetch_state(&self, app: &str, key: &str) -> Result<RemoteState, GatewayError> {
        self.client.schema_state(self.team, app, key).await
    }

    async fn create_topic(&self, app: &str, slug: &str, key: &str) -> Result<(), GatewayError> {
        self.client.create_keyed_topic(self.team, app, slug, key).await
    }

    async fn delete_topic(&self, app: &str, slug: &str) -> Result<(), GatewayError> {
        self.client.delete_topic(self.team, app, slug).await
    }

    async fn create_subscription(
        &self,
        app: &str,
        subscription: &NewSubscription,
    ) -> Result<(), GatewayError> {
        self.client
            .create_subscription(self.team, app, subscription)
            .await
            .map(|_| ())
    }

    async fn delete_subscription(
        &self,
        app: &str,
        topic_slug: &str,
        slug: &str,
    ) -> Result<(), GatewayError> {
        self.client
            .delete_subscription(self.team, app, topic_slug, slug)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sailhouse_schema::{SubscriptionFilter, SubscriptionType};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> SailhouseClient {
        SailhouseClient::new(&server.uri(), "sh_test_token").unwrap()
    }

    #[tokio::test]
    async fn test_sends_raw_token_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/teams"))
            .and(header("Authorization", "sh_test_token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "id": "team_1", "slug": "acme" }])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let teams = client(&server).await.list_teams().await.unwrap();
        assert_eq!(
            teams,
            vec![Team {
                id: "team_1".to_string(),
                slug: "acme".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_schema_state() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/teams/acme/apps/shop/schemas/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "topics": [{ "id": "top_1", "slug": "placed" }],
                "subscriptions": [{
                    "id": "sub_1",
                    "topic_id": "top_1",
                    "slug": "billing",
                    "type": "push",
                    "endpoint": "https://example.com/hook",
                    "filter_path": "",
                    "filter_value": ""
                }]
            })))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let state = SchemaGateway::new(&client, "acme")
            .fetch_state("shop", "orders")
            .await
            .unwrap();

        assert_eq!(state.topics[0].slug, "placed");
        let sub = &state.subscriptions[0];
        assert_eq!(sub.kind, SubscriptionType::Push);
        assert_eq!(sub.filter_path, None);
        assert_eq!(state.topic_by_id(&sub.topic_id).map(|t| t.slug.as_str()), Some("placed"));
    }

    #[tokio::test]
    async fn test_keyed_topic_create_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/teams/acme/apps/shop/topics/placed"))
            .and(body_json(json!({
                "slug": "placed",
                "subscriptions": [],
                "schema_key": "orders"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server).await;
        SchemaGateway::new(&client, "acme")
            .create_topic("shop", "placed", "orders")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_subscription_body_omits_unset_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/teams/acme/apps/shop/topics/placed/subscriptions"))
            .and(body_json(json!({
                "slug": "billing",
                "type": "pull",
                "schema_key": "orders",
                "filter_path": "order.kind",
                "filter_value": "gift"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let sub = NewSubscription {
            slug: "billing".to_string(),
            topic_slug: "placed".to_string(),
            kind: SubscriptionType::Pull,
            endpoint: None,
            schema_key: Some("orders".to_string()),
            filter: Some(SubscriptionFilter {
                path: "order.kind".to_string(),
                value: "gift".to_string(),
            }),
        };
        let created = client(&server)
            .await
            .create_subscription("acme", "shop", &sub)
            .await
            .unwrap();
        assert_eq!(created, None);
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/teams/acme/apps/shop/topics/placed"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/teams/acme/apps/shop/topics/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/teams/acme/apps/shop/schemas/orders"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let gateway = SchemaGateway::new(&client, "acme");

        assert_eq!(
            gateway.create_topic("shop", "placed", "orders").await,
            Err(GatewayError::conflict("topic placed"))
        );
        assert_eq!(
            gateway.delete_topic("shop", "gone").await,
            Err(GatewayError::not_found("topic gone"))
        );
        match gateway.fetch_state("shop", "orders").await {
            Err(GatewayError::Transport(msg)) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("boom"));
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_path_segments_are_escaped() {
        let server = MockServer::start().await;
        let client = client(&server).await;
        let url = client.url(&["teams", "a b", "apps"]);
        assert!(url.path().ends_with("/teams/a%20b/apps"));
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(SailhouseClient::new("not a url", "tok").is_err());
        assert!(SailhouseClient::new("mailto:team@example.com", "tok").is_err());
    }
}
