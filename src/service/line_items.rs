use chrono::Utc;

use crate::error::StoreError;
use crate::models::{EditMode, ItemEdit, ItemId, ItemStatus, LineItem, TEMP_ID_PREFIX};

/// 明细行存储
///
/// 插入顺序即展示顺序。软删除只打标记，不移除，保证编辑期间下标稳定。
#[derive(Debug, Clone, Default)]
pub struct LineItemStore {
    items: Vec<LineItem>,
    temp_seq: u64,
}

impl LineItemStore {
    pub fn new(items: Vec<LineItem>) -> Self {
        Self { items, temp_seq: 0 }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 整体替换明细 (远端拉取结果到达时)，临时ID序号不重置
    pub fn replace(&mut self, items: Vec<LineItem>) {
        self.items = items;
    }

    /// 追加空白新行，返回其下标
    pub fn add_item(&mut self) -> usize {
        let id = self.next_temp_id();
        self.items.push(LineItem::blank(id));
        self.items.len() - 1
    }

    pub fn edit(&mut self, index: usize, edit: ItemEdit) -> Result<(), StoreError> {
        edit.apply(self.get_mut(index)?);
        Ok(())
    }

    /// 软删除：已持久化行与临时行一视同仁
    pub fn mark_deleted(&mut self, index: usize) -> Result<(), StoreError> {
        self.get_mut(index)?.status = ItemStatus::Delete;
        Ok(())
    }

    /// 撤销删除：总是恢复为 new，而不是原状态，保存时按新增重新提交
    pub fn undo_delete(&mut self, index: usize) -> Result<(), StoreError> {
        self.get_mut(index)?.status = ItemStatus::New;
        Ok(())
    }

    /// 当前模式下可见的行 (下标, 行)；只读模式隐藏已删除行
    pub fn visible(&self, mode: EditMode) -> impl Iterator<Item = (usize, &LineItem)> {
        self.items
            .iter()
            .enumerate()
            .filter(move |(_, item)| mode.is_editing() || !item.is_deleted())
    }

    fn get_mut(&mut self, index: usize) -> Result<&mut LineItem, StoreError> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(StoreError::OutOfRange { index, len })
    }

    fn next_temp_id(&mut self) -> ItemId {
        let seq = self.temp_seq;
        self.temp_seq += 1;
        ItemId::Temporary(format!(
            "{}{}-{}",
            TEMP_ID_PREFIX,
            Utc::now().timestamp_millis(),
            seq
        ))
    }
}
