use bigdecimal::{BigDecimal, Zero};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::fmt;

use crate::error::SelectionError;
use crate::models::flex;
use crate::models::{MealPlanItem, PlanItemEdit};
use crate::remote::RemoteService;
use crate::service::presentation::format_amount;

/// 分组键：活动日期 + 活动ID + 活动名称 + 公司
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub event_date: String,
    pub event_id: Option<i64>,
    pub event_name: String,
    pub company_name: String,
}

impl GroupKey {
    fn of(item: &MealPlanItem) -> Self {
        Self {
            event_date: item.event_date.clone(),
            event_id: item.event_id,
            event_name: item.event_name.clone(),
            company_name: item.company_name.clone(),
        }
    }

    pub fn label(&self) -> String {
        format!(
            "{} | Event ID: {} {} | {}",
            self.event_date,
            self.event_id.map(|id| id.to_string()).unwrap_or_default(),
            self.event_name,
            self.company_name
        )
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            self.event_date,
            self.event_id.map(|id| id.to_string()).unwrap_or_default(),
            self.event_name,
            self.company_name
        )
    }
}

/// 从餐饮计划明细中勾选条目生成长账单
#[derive(Debug, Clone)]
pub struct PlanSelection {
    plan_id: String,
    items: Vec<MealPlanItem>,
    selected: IndexSet<String>,
}

impl PlanSelection {
    pub fn new(plan_id: impl Into<String>, items: Vec<MealPlanItem>) -> Self {
        Self {
            plan_id: plan_id.into(),
            items,
            selected: IndexSet::new(),
        }
    }

    pub fn plan_id(&self) -> &str {
        &self.plan_id
    }

    pub fn items(&self) -> &[MealPlanItem] {
        &self.items
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_selected(&self, item_id: &str) -> bool {
        self.selected.contains(item_id)
    }

    /// 按首次出现顺序分组，值为明细下标
    pub fn groups(&self) -> IndexMap<GroupKey, Vec<usize>> {
        let mut groups: IndexMap<GroupKey, Vec<usize>> = IndexMap::new();
        for (index, item) in self.items.iter().enumerate() {
            groups.entry(GroupKey::of(item)).or_default().push(index);
        }
        groups
    }

    /// 全部明细价格合计
    pub fn total_price(&self) -> BigDecimal {
        self.items
            .iter()
            .fold(BigDecimal::zero(), |acc, item| acc + &item.price)
    }

    pub fn toggle(&mut self, item_id: &str) -> Result<bool, SelectionError> {
        if !self.items.iter().any(|item| item.id == item_id) {
            return Err(SelectionError::UnknownItem(item_id.to_string()));
        }
        if self.selected.shift_remove(item_id) {
            Ok(false)
        } else {
            self.selected.insert(item_id.to_string());
            Ok(true)
        }
    }

    /// 整组勾选/取消；`group` 为分组在 `groups()` 中的位置
    pub fn set_group(&mut self, group: usize, checked: bool) -> Result<(), SelectionError> {
        let groups = self.groups();
        let (_, members) = groups
            .get_index(group)
            .ok_or(SelectionError::UnknownGroup(group))?;

        for &index in members {
            let id = &self.items[index].id;
            if checked {
                self.selected.insert(id.clone());
            } else {
                self.selected.shift_remove(id);
            }
        }
        Ok(())
    }

    pub fn set_all(&mut self, checked: bool) {
        if checked {
            for item in &self.items {
                self.selected.insert(item.id.clone());
            }
        } else {
            self.selected.clear();
        }
    }

    pub fn edit_item(&mut self, index: usize, edit: PlanItemEdit) -> Result<(), SelectionError> {
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(SelectionError::OutOfRange { index, len })?;
        edit.apply(item);
        Ok(())
    }

    /// 已勾选明细，保持原始顺序
    pub fn selected_items(&self) -> Vec<MealPlanItem> {
        self.items
            .iter()
            .filter(|item| self.selected.contains(&item.id))
            .cloned()
            .collect()
    }

    /// 批量生成：整体成功或整体失败
    pub async fn generate(&self, remote: &dyn RemoteService) -> Result<usize, SelectionError> {
        let chosen = self.selected_items();
        if chosen.is_empty() {
            return Err(SelectionError::EmptySelection);
        }
        remote.generate_bill(&chosen).await?;
        tracing::info!(
            "Long bill generated from plan {} with {} items",
            self.plan_id,
            chosen.len()
        );
        Ok(chosen.len())
    }

    pub fn view(&self) -> SelectionView {
        let total_price = self.total_price();
        let groups = self
            .groups()
            .into_iter()
            .enumerate()
            .map(|(index, (key, members))| {
                let rows: Vec<SelectionRow> = members
                    .into_iter()
                    .map(|index| SelectionRow {
                        index,
                        selected: self.is_selected(&self.items[index].id),
                        item: self.items[index].clone(),
                    })
                    .collect();
                GroupView {
                    index,
                    key: key.to_string(),
                    label: key.label(),
                    all_selected: rows.iter().all(|r| r.selected),
                    some_selected: rows.iter().any(|r| r.selected),
                    rows,
                }
            })
            .collect();

        SelectionView {
            plan_id: self.plan_id.clone(),
            total_items: self.items.len(),
            total_price_display: format_amount(&total_price),
            total_price,
            selected_count: self.selected.len(),
            groups,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectionRow {
    pub index: usize,
    pub selected: bool,
    pub item: MealPlanItem,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupView {
    pub index: usize,
    pub key: String,
    pub label: String,
    pub all_selected: bool,
    pub some_selected: bool,
    pub rows: Vec<SelectionRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectionView {
    pub plan_id: String,
    pub total_items: usize,
    #[serde(with = "flex::amount")]
    pub total_price: BigDecimal,
    pub total_price_display: String,
    pub selected_count: usize,
    pub groups: Vec<GroupView>,
}
