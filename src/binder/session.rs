use std::time::{Duration, Instant};

use super::events::{ChangeAction, ChangeBus};
use crate::error::AppError;
use crate::models::{LineDocument, Resource};
use crate::service::DocumentStore;

/// 提交被中途取消 (future 被丢弃) 时的提示
pub const SUBMIT_CANCELLED: &str = "submission cancelled";

/// 单据编辑会话状态
///
/// `Empty -> Loaded -> Dirty -> Submitting -> {Saved | Failed}`;
/// `Saved` 确认后回到 `Loaded`; `Failed` 保留全部未保存的编辑, 再次编辑或
/// 确认错误后回到 `Dirty`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditState {
    Empty,
    Loaded,
    Dirty,
    Submitting,
    Saved,
    Failed(String),
}

/// 父单据绑定器: 正在编辑的单据的唯一数据源
///
/// 所有编辑都以整张单据替换的方式提交, 回调返回后持有的单据总是完整一致的.
#[derive(Debug)]
pub struct DocumentBinder<D: LineDocument> {
    document: Option<D>,
    state: EditState,
    submit_timeout: Duration,
    bus: Option<ChangeBus>,
}

impl<D: LineDocument> DocumentBinder<D> {
    pub fn new(submit_timeout: Duration) -> Self {
        Self {
            document: None,
            state: EditState::Empty,
            submit_timeout,
            bus: None,
        }
    }

    /// 保存/删除成功后向总线发布变更
    pub fn with_bus(mut self, bus: ChangeBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn document(&self) -> Option<&D> {
        self.document.as_ref()
    }

    /// 最近一次提交失败的提示
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            EditState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.state == EditState::Submitting
    }

    pub fn load(&mut self, document: D) -> Result<(), AppError> {
        self.ensure_idle()?;
        tracing::debug!("loaded {} {:?}", D::RESOURCE, document.id());
        self.document = Some(document);
        self.state = EditState::Loaded;
        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), AppError> {
        self.ensure_idle()?;
        self.document = None;
        self.state = EditState::Empty;
        Ok(())
    }

    /// 整体替换当前单据
    pub fn replace(&mut self, document: D) -> Result<(), AppError> {
        self.ensure_idle()?;
        if self.document.is_none() {
            return Err(AppError::NoDocument);
        }
        self.document = Some(document);
        self.state = EditState::Dirty;
        Ok(())
    }

    /// 以当前单据为输入计算新单据并替换, 例如 `binder.edit(|d| editor.add_line(d))`
    pub fn edit(&mut self, f: impl FnOnce(&D) -> D) -> Result<(), AppError> {
        let current = self.document.as_ref().ok_or(AppError::NoDocument)?;
        let next = f(current);
        self.replace(next)
    }

    /// 用户已看到提交结果: `Failed -> Dirty`, `Saved -> Loaded`
    pub fn acknowledge(&mut self) {
        match self.state {
            EditState::Failed(_) => self.state = EditState::Dirty,
            EditState::Saved => self.state = EditState::Loaded,
            _ => {}
        }
    }

    /// 进入提交状态并返回待保存的快照
    pub fn begin_submit(&mut self) -> Result<D, AppError> {
        self.ensure_idle()?;
        let snapshot = self.document.clone().ok_or(AppError::NoDocument)?;
        self.state = EditState::Submitting;
        Ok(snapshot)
    }

    /// 结束提交: 成功则采用服务端返回的单据, 失败则保留编辑内容
    pub fn complete_submit(&mut self, result: Result<D, AppError>) -> Result<&D, AppError> {
        if !self.is_submitting() {
            tracing::warn!("complete_submit called in state {:?}", self.state);
        }
        match result {
            Ok(saved) => {
                tracing::info!("{} {} saved", D::RESOURCE, saved.id());
                if let Some(bus) = &self.bus {
                    bus.publish(D::RESOURCE, saved.id(), ChangeAction::Saved);
                }
                self.state = EditState::Saved;
                Ok(&*self.document.insert(saved))
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// 保存当前单据, 超时视为失败
    pub async fn submit<S: DocumentStore<D>>(&mut self, store: &S) -> Result<&D, AppError> {
        let snapshot = self.begin_submit()?;
        let timeout = self.submit_timeout;
        let started = Instant::now();

        let in_flight = InFlight::new(&mut self.state, D::RESOURCE);
        let result = match tokio::time::timeout(timeout, store.save(&snapshot)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(timeout)),
        };
        in_flight.finish();
        tracing::debug!("submit finished in {:?}", started.elapsed());

        self.complete_submit(result)
    }

    /// 删除已持久化的单据, 成功后回到 `Empty`
    pub async fn delete<S: DocumentStore<D>>(&mut self, store: &S) -> Result<(), AppError> {
        let snapshot = self.begin_submit()?;
        if snapshot.is_new() {
            // 从未保存, 直接丢弃
            self.document = None;
            self.state = EditState::Empty;
            return Ok(());
        }

        let timeout = self.submit_timeout;
        let in_flight = InFlight::new(&mut self.state, D::RESOURCE);
        let result = match tokio::time::timeout(timeout, store.delete(snapshot.id())).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(timeout)),
        };
        in_flight.finish();

        match result {
            Ok(()) => {
                tracing::info!("{} {} deleted", D::RESOURCE, snapshot.id());
                if let Some(bus) = &self.bus {
                    bus.publish(D::RESOURCE, snapshot.id(), ChangeAction::Deleted);
                }
                self.document = None;
                self.state = EditState::Empty;
                Ok(())
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    fn fail(&mut self, error: &AppError) {
        match error {
            AppError::Validation(_) | AppError::Remote(_) | AppError::NotFound { .. } => {
                tracing::warn!("{} submit rejected: {}", D::RESOURCE, error)
            }
            _ => tracing::error!("{} submit failed: {:?}", D::RESOURCE, error),
        }
        self.state = EditState::Failed(error.user_message());
    }

    fn ensure_idle(&self) -> Result<(), AppError> {
        if self.is_submitting() {
            Err(AppError::SubmitInFlight)
        } else {
            Ok(())
        }
    }
}

/// 等待存储期间持有状态; 未调用 `finish` 就被丢弃时退出 `Submitting`
struct InFlight<'a> {
    state: &'a mut EditState,
    resource: Resource,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn new(state: &'a mut EditState, resource: Resource) -> Self {
        Self {
            state,
            resource,
            armed: true,
        }
    }

    fn finish(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed && *self.state == EditState::Submitting {
            tracing::warn!("{} submission dropped before completion", self.resource);
            *self.state = EditState::Failed(SUBMIT_CANCELLED.to_string());
        }
    }
}
