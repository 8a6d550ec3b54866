use std::collections::HashMap;

use swipecast_protocol::item::ContentItem;

/// Merges newly fetched items into the existing queue.
///
/// Identity-keyed overlay: existing items keep their position, a repeated id
/// is replaced in place by the later copy (last write wins), then the whole
/// sequence is re-sorted by `taken_at` descending with missing timestamps
/// treated as oldest. The sort is stable, so items with equal timestamps keep
/// overlay order. Merging the same page twice is a no-op.
pub fn merge(existing: Vec<ContentItem>, incoming: Vec<ContentItem>) -> Vec<ContentItem> {
    let mut merged = existing;
    let mut position_by_id: HashMap<_, usize> = merged
        .iter()
        .enumerate()
        .map(|(position, item)| (item.id.clone(), position))
        .collect();

    for item in incoming {
        match position_by_id.get(&item.id) {
            Some(&position) => merged[position] = item,
            None => {
                position_by_id.insert(item.id.clone(), merged.len());
                merged.push(item);
            }
        }
    }

    merged.sort_by_key(|item| std::cmp::Reverse(item.taken_at.unwrap_or(0)));
    merged
}

#[cfg(test)]
mod tests {
    use swipecast_protocol::ids::ItemId;
    use swipecast_protocol::item::{ContentItem, ContentKind};

    use super::merge;

    fn item(id: &str, taken_at: Option<i64>) -> ContentItem {
        ContentItem {
            id: ItemId::new(id),
            kind: ContentKind::Post,
            code: None,
            thumbnail_url: Some(format!("https://cdn.example/{id}.jpg")),
            media_url: None,
            caption: String::new(),
            engagement: None,
            taken_at,
        }
    }

    #[test]
    fn merge_orders_by_taken_at_descending() {
        let merged = merge(
            vec![item("a", Some(100)), item("b", Some(300))],
            vec![item("c", Some(200))],
        );

        let order: Vec<&str> = merged.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn merge_treats_missing_taken_at_as_oldest() {
        let merged = merge(vec![item("fresh", Some(10))], vec![item("undated", None)]);

        let order: Vec<&str> = merged.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(order, vec!["fresh", "undated"]);
    }

    #[test]
    fn merge_is_idempotent_for_a_repeated_page() {
        let page = vec![item("a", Some(300)), item("b", Some(200))];
        let once = merge(Vec::new(), page.clone());
        let twice = merge(once.clone(), page);

        assert_eq!(once, twice);
    }

    #[test]
    fn merge_deduplicates_with_last_write_wins() {
        let stale = item("a", Some(300));
        let refreshed = item("a", Some(300)).with_caption("updated caption");

        let merged = merge(vec![stale], vec![refreshed.clone(), item("b", Some(100))]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], refreshed);
    }

    #[test]
    fn merge_membership_is_order_independent_for_overlapping_pages() {
        let first = vec![item("a", Some(300)), item("b", Some(200))];
        let second = vec![item("b", Some(200)), item("c", Some(100))];

        let forward = merge(merge(Vec::new(), first.clone()), second.clone());
        let reverse = merge(merge(Vec::new(), second), first);

        let mut forward_ids: Vec<&str> = forward.iter().map(|i| i.id.as_str()).collect();
        let mut reverse_ids: Vec<&str> = reverse.iter().map(|i| i.id.as_str()).collect();
        forward_ids.sort_unstable();
        reverse_ids.sort_unstable();
        assert_eq!(forward_ids, reverse_ids);
    }

    #[test]
    fn equal_timestamps_keep_insertion_order() {
        let merged = merge(
            vec![item("first", Some(50))],
            vec![item("second", Some(50)), item("third", Some(50))],
        );

        let order: Vec<&str> = merged.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }
}
