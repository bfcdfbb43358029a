use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;
use ui_tree::{ParseError, UiTree};

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Parsed trees keyed by snapshot hash.
///
/// Owned and passed in by the caller; nothing in the engine keeps one.
pub struct TreeCache {
    entries: DashMap<String, (Arc<UiTree>, Instant)>,
    ttl_ms: AtomicU64,
}

impl Default for TreeCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl TreeCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl_ms: AtomicU64::new(duration_to_millis(ttl)),
        }
    }

    pub fn put(&self, hash: String, tree: Arc<UiTree>) {
        self.entries.insert(hash, (tree, Instant::now()));
    }

    pub fn set_ttl(&self, ttl: Duration) {
        self.ttl_ms.store(duration_to_millis(ttl), Ordering::Relaxed);
    }

    pub fn get(&self, hash: &str) -> Option<Arc<UiTree>> {
        let ttl = self.current_ttl();
        if let Some(entry) = self.entries.get(hash) {
            if entry.1.elapsed() <= ttl {
                return Some(entry.0.clone());
            }
        }
        self.entries.remove(hash);
        None
    }

    /// Cached tree for `hash`, parsing `text` on a miss.
    pub fn get_or_parse(&self, hash: &str, text: &str) -> Result<Arc<UiTree>, ParseError> {
        if let Some(tree) = self.get(hash) {
            debug!(hash, "tree cache hit");
            return Ok(tree);
        }
        let tree = Arc::new(UiTree::parse(text)?);
        self.put(hash.to_string(), tree.clone());
        Ok(tree)
    }

    pub fn invalidate(&self, hash: &str) {
        self.entries.remove(hash);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    fn current_ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms.load(Ordering::Relaxed))
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
