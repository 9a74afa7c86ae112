use crate::domain::ports::{Navigator, Notifier};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

/// A notifier that records every message it receives.
///
/// Clones share the same log, so a test can keep one handle and give the
/// other to the orchestrator.
#[derive(Default, Clone)]
pub struct InMemoryNotifier {
    notifications: Arc<RwLock<Vec<Notification>>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.notifications.read().await.clone()
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn success(&self, message: &str) {
        let mut notifications = self.notifications.write().await;
        notifications.push(Notification::Success(message.to_string()));
    }

    async fn error(&self, message: &str) {
        let mut notifications = self.notifications.write().await;
        notifications.push(Notification::Error(message.to_string()));
    }
}

/// A navigator that records the order identifiers it was asked to show.
#[derive(Default, Clone)]
pub struct InMemoryNavigator {
    visited: Arc<RwLock<Vec<String>>>,
}

impl InMemoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn visited(&self) -> Vec<String> {
        self.visited.read().await.clone()
    }
}

#[async_trait]
impl Navigator for InMemoryNavigator {
    async fn go_to_order_confirmation(&self, identifier: &str) {
        let mut visited = self.visited.write().await;
        visited.push(identifier.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_notifier_keeps_order() {
        let notifier = InMemoryNotifier::new();
        let shared = notifier.clone();

        shared.success("paid").await;
        shared.error("declined").await;

        assert_eq!(
            notifier.notifications().await,
            vec![
                Notification::Success("paid".into()),
                Notification::Error("declined".into())
            ]
        );
    }

    #[tokio::test]
    async fn test_in_memory_navigator() {
        let navigator = InMemoryNavigator::new();
        navigator.go_to_order_confirmation("ord-1").await;
        assert_eq!(navigator.visited().await, vec!["ord-1".to_string()]);
    }
}
