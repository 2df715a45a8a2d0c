use chrono::Utc;
use shared::QueryHistoryItem;
use std::collections::VecDeque;
use tokio::sync::Mutex;

pub const MAX_HISTORY_ITEMS: usize = 10;

/// Recently executed console queries, most recent first
#[derive(Debug, Default)]
pub struct QueryHistory {
    items: Mutex<VecDeque<QueryHistoryItem>>,
}

impl QueryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `query` at the front. A query already in the list is moved
    /// rather than duplicated; the oldest entry falls off past the cap.
    pub async fn record(&self, query: &str) {
        self.record_at(query, Utc::now().timestamp_millis()).await
    }

    pub async fn record_at(&self, query: &str, timestamp: i64) {
        let mut items = self.items.lock().await;
        items.retain(|item| item.query != query);
        items.push_front(QueryHistoryItem { query: query.to_string(), timestamp });
        items.truncate(MAX_HISTORY_ITEMS);
    }

    pub async fn recent(&self) -> Vec<QueryHistoryItem> {
        self.items.lock().await.iter().cloned().collect()
    }

    pub async fn clear(&self) {
        self.items.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_most_recent_first() {
        let history = QueryHistory::new();
        history.record_at("INFO FOR DB", 1).await;
        history.record_at("SELECT * FROM user", 2).await;

        let queries: Vec<String> = history.recent().await.into_iter().map(|i| i.query).collect();
        assert_eq!(queries, vec!["SELECT * FROM user", "INFO FOR DB"]);
    }

    #[tokio::test]
    async fn test_rerun_moves_to_front() {
        let history = QueryHistory::new();
        history.record_at("a", 1).await;
        history.record_at("b", 2).await;
        history.record_at("a", 3).await;

        let recent = history.recent().await;
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0], QueryHistoryItem { query: "a".into(), timestamp: 3 });
        assert_eq!(recent[1].query, "b");
    }

    #[tokio::test]
    async fn test_capped_at_ten() {
        let history = QueryHistory::new();
        for i in 0..15 {
            history.record_at(&format!("SELECT {}", i), i).await;
        }

        let recent = history.recent().await;
        assert_eq!(recent.len(), MAX_HISTORY_ITEMS);
        assert_eq!(recent[0].query, "SELECT 14");
        assert_eq!(recent[9].query, "SELECT 5");

        history.clear().await;
        assert!(history.recent().await.is_empty());
    }
}
