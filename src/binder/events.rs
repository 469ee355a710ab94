use tokio::sync::broadcast;

use crate::models::Resource;

/// 变更动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Saved,
    Deleted,
}

/// 数据变更通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataChanged {
    pub resource: Resource,
    pub id: String,
    pub action: ChangeAction,
}

/// 变更总线: 各视图订阅后自行刷新
#[derive(Debug, Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<DataChanged>,
}

impl ChangeBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DataChanged> {
        self.sender.subscribe()
    }

    pub fn publish(&self, resource: Resource, id: impl Into<String>, action: ChangeAction) {
        let event = DataChanged {
            resource,
            id: id.into(),
            action,
        };
        // 无订阅者时 send 返回 Err, 忽略即可
        if self.sender.send(event).is_err() {
            tracing::debug!("no subscribers for {} change", resource);
        }
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(64)
    }
}
