pub mod coerce;
pub mod ids;
pub mod lines;

pub use ids::LineIdGenerator;
pub use lines::{
    bind_model, compute_line_amount, compute_total, display_amount, remove_line, update_field,
};

use std::collections::HashSet;
use std::fmt;

use crate::models::{LineDocument, LineItem};

/// 行定位: 按位置或按稳定 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKey<'a> {
    At(usize),
    Id(&'a str),
}

impl LineKey<'_> {
    /// 解析为当前行数组中的位置
    pub fn resolve<L: LineItem>(&self, lines: &[L]) -> Option<usize> {
        match *self {
            LineKey::At(index) => (index < lines.len()).then_some(index),
            LineKey::Id(id) => lines.iter().position(|line| line.id() == id),
        }
    }
}

impl From<usize> for LineKey<'_> {
    fn from(index: usize) -> Self {
        LineKey::At(index)
    }
}

impl<'a> From<&'a str> for LineKey<'a> {
    fn from(id: &'a str) -> Self {
        LineKey::Id(id)
    }
}

impl fmt::Display for LineKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineKey::At(index) => write!(f, "line #{}", index),
            LineKey::Id(id) => write!(f, "line {}", id),
        }
    }
}

/// 行编辑器: 持有会话级 ID 生成器
#[derive(Debug, Default)]
pub struct LineEditor {
    ids: LineIdGenerator,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条默认行
    pub fn add_line<D: LineDocument>(&self, document: &D) -> D {
        let id = self.fresh_id(document.lines());
        let mut lines = document.lines().to_vec();
        lines.push(D::Line::blank(id, document.id()));
        document.with_lines(lines)
    }

    /// 入库前整理: 回填父单据 ID, 重新分配空白或重复的行 ID, 负数量/单价归零
    pub fn normalize<D: LineDocument>(&self, document: &D) -> D {
        let mut seen: HashSet<String> = HashSet::with_capacity(document.lines().len());
        let mut lines = Vec::with_capacity(document.lines().len());

        for line in document.lines() {
            let mut next = line.clone();
            if next.id().trim().is_empty() || seen.contains(next.id()) {
                let id = self.fresh_id(document.lines());
                tracing::debug!("reissued line id {:?} as {}", next.id(), id);
                next.set_id(id);
            }
            if next.clamp_negatives() {
                tracing::debug!("line {} had negative values, clamped to 0", next.id());
            }
            if next.parent_id() != document.id() {
                next.set_parent_id(document.id());
            }
            seen.insert(next.id().to_string());
            lines.push(next);
        }
        document.with_lines(lines)
    }

    fn fresh_id<L: LineItem>(&self, existing: &[L]) -> String {
        loop {
            let id = self.ids.next_id();
            if !existing.iter().any(|line| line.id() == id) {
                return id;
            }
        }
    }
}
