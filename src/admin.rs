//! Admin allow-list gate

use std::collections::HashSet;

/// Answers whether a Telegram user may operate the dashboard.
///
/// The allow-list is fixed at construction. An empty list leaves the
/// dashboard open to everyone.
#[derive(Debug, Clone, Default)]
pub struct AdminGate {
    allowed: HashSet<i64>,
}

impl AdminGate {
    pub fn new(allowed: impl IntoIterator<Item = i64>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn is_authorized(&self, user_id: i64) -> bool {
        self.allowed.is_empty() || self.allowed.contains(&user_id)
    }

    /// True when no allow-list is configured
    pub fn is_open(&self) -> bool {
        self.allowed.is_empty()
    }
}
