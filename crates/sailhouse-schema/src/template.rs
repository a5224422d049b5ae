/// Key written into a new schema when none is given.
pub const DEFAULT_KEY: &str = "example-key";

const HEADER: &str = "\
# yaml-language-server: $schema=https://assets.sailhouse.dev/schema.yaml
# The \"key\" is used to identify which topics and subscriptions
# are owned by a schema file. It should be unique to the schema.
";

const EXAMPLE_BODY: &str = "
topics:
  - slug: example-topic

subscriptions:
  - slug: example-subscription
    topic: example-topic
    type: pull

  - slug: example-push-subscription
    topic: example-topic
    type: push
    endpoint: https://example.com/push-example
";

/// Renders the starter document written by `schema create`.
pub fn starter_schema(key: &str, empty: bool) -> String {
    let mut doc = format!("{HEADER}key: {key}\n");
    if !empty {
        doc.push_str(EXAMPLE_BODY);
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_schema;

    #[test]
    fn test_starter_schema_is_valid() {
        let schema = parse_schema(&starter_schema("orders", false)).unwrap();
        assert_eq!(schema.key, "orders");
        assert_eq!(schema.topics.len(), 1);
        assert_eq!(schema.subscriptions.len(), 2);
    }

    #[test]
    fn test_empty_starter_schema() {
        let doc = starter_schema(DEFAULT_KEY, true);
        assert!(!doc.contains("topics:"));
        let schema = parse_schema(&doc).unwrap();
        assert_eq!(schema.key, DEFAULT_KEY);
        assert!(schema.topics.is_empty());
    }
}
