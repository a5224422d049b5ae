use std::collections::HashMap;

use crate::diff::Change;

/// Drops changes whose parent is deleted by another change in the same batch.
///
/// The service removes a topic's subscriptions along with the topic, so an
/// explicit delete for one of them would fail with not-found. Any delete
/// counts as a parent, whatever its entity; a change never suppresses itself.
/// Order is kept.
pub fn filter_dependents(changes: Vec<Change>) -> Vec<Change> {
    let mut deleted: HashMap<String, usize> = HashMap::new();
    for change in changes.iter().filter(|c| c.is_delete()) {
        *deleted.entry(change.slug.clone()).or_default() += 1;
    }

    let before = changes.len();
    let kept: Vec<Change> = changes
        .into_iter()
        .filter(|c| {
            let Some(parent) = &c.parent_slug else {
                return true;
            };
            let own = usize::from(c.is_delete() && c.slug == *parent);
            deleted.get(parent).copied().unwrap_or(0) <= own
        })
        .collect();

    if kept.len() != before {
        tracing::debug!(
            suppressed = before - kept.len(),
            "dropped changes covered by parent deletes"
        );
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::EntityType;

    fn sub_delete(slug: &str, parent: &str) -> Change {
        Change::delete(EntityType::Subscription, slug).with_parent(Some(parent.to_string()))
    }

    #[test]
    fn test_drops_children_of_deleted_topic() {
        let changes = vec![
            Change::delete(EntityType::Topic, "t"),
            sub_delete("s1", "t"),
            sub_delete("s2", "t"),
        ];
        assert_eq!(
            filter_dependents(changes),
            vec![Change::delete(EntityType::Topic, "t")]
        );
    }

    #[test]
    fn test_keeps_deletes_under_surviving_topic() {
        let changes = vec![
            Change::create(EntityType::Topic, "new"),
            sub_delete("s1", "kept"),
        ];
        assert_eq!(filter_dependents(changes.clone()), changes);
    }

    #[test]
    fn test_creates_and_orphans_are_never_filtered() {
        let changes = vec![
            Change::delete(EntityType::Topic, "t"),
            Change::create(EntityType::Topic, "t2"),
            Change::create(EntityType::Subscription, "t"),
            Change::delete(EntityType::Subscription, "orphan"),
        ];
        assert_eq!(filter_dependents(changes.clone()), changes);
    }

    #[test]
    fn test_subscription_sharing_topic_slug() {
        // A subscription named after its own topic never suppresses itself.
        let changes = vec![sub_delete("orders", "orders")];
        assert_eq!(filter_dependents(changes.clone()), changes);

        let changes = vec![
            Change::delete(EntityType::Topic, "orders"),
            sub_delete("orders", "orders"),
        ];
        assert_eq!(filter_dependents(changes).len(), 1);
    }

    #[test]
    fn test_any_delete_acts_as_parent() {
        // Topic "orders" survives; the subscription delete named "orders"
        // still covers the change parented on it.
        let changes = vec![sub_delete("orders", "x"), sub_delete("billing", "orders")];
        assert_eq!(filter_dependents(changes), vec![sub_delete("orders", "x")]);
    }

    #[test]
    fn test_empty() {
        assert!(filter_dependents(Vec::new()).is_empty());
    }
}
