use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// 进程内会话表
///
/// 闭包在分片锁内执行，不能跨 await 持有；网络请求前后各取一次。
pub struct Registry<T> {
    entries: Arc<DashMap<Uuid, T>>,
}

impl<T> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, value: T) -> Uuid {
        let id = Uuid::new_v4();
        self.entries.insert(id, value);
        id
    }

    pub fn read<R>(&self, id: &Uuid, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.entries.get(id).map(|entry| f(entry.value()))
    }

    pub fn update<R>(&self, id: &Uuid, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.entries.get_mut(id).map(|mut entry| f(entry.value_mut()))
    }

    pub fn remove(&self, id: &Uuid) -> Option<T> {
        self.entries.remove(id).map(|(_, value)| value)
    }

    /// 删除满足条件的条目，返回删除数量
    pub fn evict(&self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, value| !predicate(value));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
