use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{RemoteError, SessionError};
use crate::models::{
    BillHeader, BillRecord, BillStatus, BillSummary, EditMode, HeaderEdit, ItemEdit, LineItem,
};
use crate::remote::RemoteService;
use crate::service::line_items::LineItemStore;
use crate::service::presentation::{bill_view, BillView};

static GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// 拉取明细的凭据；响应回来时代次不符则丢弃
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub bill_id: String,
}

/// 保存凭据：请求期间不持有会话
#[derive(Debug, Clone)]
pub struct SaveTicket {
    pub generation: u64,
    pub payload: BillRecord,
}

/// 状态变更立即持久化的凭据
#[derive(Debug, Clone)]
pub struct StatusTicket {
    pub generation: u64,
    pub status: BillStatus,
    /// 变更前内存中的状态，持久化失败时恢复
    pub previous: Option<BillStatus>,
    pub payload: BillRecord,
}

/// 保存成功的结果；调用方据此刷新账单列表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved {
    pub refresh_list: bool,
}

/// 单个长账单的编辑会话
///
/// 状态机只有 viewing -> editing (进入编辑) 与 editing -> viewing
/// (取消或保存成功) 两种转移。保存失败不回滚内存中的修改；
/// 保存期间又有新修改时，保存成功后仍停留在编辑态。
#[derive(Debug, Clone)]
pub struct BillSession {
    header: BillHeader,
    items: LineItemStore,
    /// 最近一次加载或保存成功的快照，取消编辑时恢复
    snapshot: BillRecord,
    mode: EditMode,
    generation: u64,
}

impl BillSession {
    /// 从列表摘要打开会话，返回待拉取明细的凭据
    pub fn open(summary: BillSummary) -> (Self, LoadTicket) {
        let generation = next_generation();
        let ticket = LoadTicket {
            generation,
            bill_id: summary.id.clone(),
        };
        let session = Self {
            snapshot: BillRecord {
                header: summary.clone(),
                items: Vec::new(),
            },
            header: summary,
            items: LineItemStore::default(),
            mode: EditMode::Viewing,
            generation,
        };
        (session, ticket)
    }

    /// 新建空白账单
    pub fn blank() -> Self {
        Self::open(BillHeader::default()).0
    }

    /// 在同一会话中切换到另一张账单，之前发出的请求全部作废
    pub fn reopen(&mut self, summary: BillSummary) -> LoadTicket {
        let (session, ticket) = Self::open(summary);
        *self = session;
        ticket
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn bill_id(&self) -> &str {
        &self.header.id
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn header(&self) -> &BillHeader {
        &self.header
    }

    pub fn items(&self) -> &[LineItem] {
        self.items.items()
    }

    /// 当前完整记录 (含软删除行及其状态)
    pub fn record(&self) -> BillRecord {
        BillRecord {
            header: self.header.clone(),
            items: self.items.items().to_vec(),
        }
    }

    pub fn view(&self) -> BillView {
        bill_view(&self.header, self.items.items(), self.mode)
    }

    /// 整体覆盖表头与明细，最近一次拉取为准
    pub fn load(&mut self, payload: BillRecord) {
        self.header = payload.header.clone();
        self.items.replace(payload.items.clone());
        self.snapshot = payload;
    }

    /// 应用明细拉取结果
    pub fn finish_load(
        &mut self,
        generation: u64,
        outcome: Result<Vec<LineItem>, RemoteError>,
    ) -> Result<(), SessionError> {
        self.check_generation(generation)?;
        let items = outcome?;
        tracing::info!("Bill {} loaded with {} items", self.header.id, items.len());
        let mut payload = self.snapshot.clone();
        payload.items = items;
        self.load(payload);
        Ok(())
    }

    pub fn begin_edit(&mut self) -> Result<(), SessionError> {
        if self.mode.is_editing() {
            return Err(SessionError::AlreadyEditing);
        }
        self.mode = EditMode::Editing;
        Ok(())
    }

    /// 取消编辑，恢复到最近快照
    pub fn cancel_edit(&mut self) -> Result<(), SessionError> {
        self.ensure_editing()?;
        let snapshot = self.snapshot.clone();
        self.load(snapshot);
        self.mode = EditMode::Viewing;
        Ok(())
    }

    pub fn add_item(&mut self) -> Result<usize, SessionError> {
        self.ensure_editing()?;
        Ok(self.items.add_item())
    }

    pub fn edit_item(&mut self, index: usize, edit: ItemEdit) -> Result<(), SessionError> {
        self.ensure_editing()?;
        Ok(self.items.edit(index, edit)?)
    }

    pub fn mark_deleted(&mut self, index: usize) -> Result<(), SessionError> {
        self.ensure_editing()?;
        Ok(self.items.mark_deleted(index)?)
    }

    pub fn undo_delete(&mut self, index: usize) -> Result<(), SessionError> {
        self.ensure_editing()?;
        Ok(self.items.undo_delete(index)?)
    }

    pub fn edit_header(&mut self, edit: HeaderEdit) -> Result<(), SessionError> {
        self.ensure_editing()?;
        edit.apply(&mut self.header);
        Ok(())
    }

    pub fn begin_save(&self) -> Result<SaveTicket, SessionError> {
        self.ensure_editing()?;
        Ok(SaveTicket {
            generation: self.generation,
            payload: self.record(),
        })
    }

    /// 处理保存结果：成功则以提交内容为新快照，内存与提交内容一致时退出编辑；
    /// 失败则保持编辑态，内存修改原样保留
    pub fn finish_save(
        &mut self,
        ticket: SaveTicket,
        outcome: Result<(), RemoteError>,
    ) -> Result<Saved, SessionError> {
        self.check_generation(ticket.generation)?;
        match outcome {
            Ok(()) => {
                tracing::info!("Long bill {} saved successfully", self.header.id);
                if self.record() == ticket.payload {
                    self.mode = EditMode::Viewing;
                } else {
                    tracing::info!(
                        "Bill {} changed while saving, staying in edit mode",
                        self.header.id
                    );
                }
                self.snapshot = ticket.payload;
                Ok(Saved { refresh_list: true })
            }
            Err(e) => {
                tracing::warn!("Error saving bill {}: {}", self.header.id, e);
                Err(SessionError::Remote(e))
            }
        }
    }

    pub async fn save(&mut self, remote: &dyn RemoteService) -> Result<Saved, SessionError> {
        let ticket = self.begin_save()?;
        let outcome = remote.save_bill(&ticket.payload).await;
        self.finish_save(ticket, outcome)
    }

    /// 修改状态：立即写入内存，并返回需要马上持久化的凭据
    ///
    /// 持久化内容是最近快照加上新状态，未保存的字段修改不会被一并提交。
    /// 与已持久化状态相同时返回 None。
    pub fn set_status(&mut self, status: BillStatus) -> Option<StatusTicket> {
        let previous = self.header.status.replace(status);
        if self.snapshot.header.status == Some(status) {
            return None;
        }
        let mut payload = self.snapshot.clone();
        payload.header.status = Some(status);
        Some(StatusTicket {
            generation: self.generation,
            status,
            previous,
            payload,
        })
    }

    pub fn finish_status(
        &mut self,
        ticket: StatusTicket,
        outcome: Result<(), RemoteError>,
    ) -> Result<(), SessionError> {
        self.check_generation(ticket.generation)?;
        if let Err(e) = outcome {
            // 期间没有再次修改时才恢复
            if self.header.status == Some(ticket.status) {
                self.header.status = ticket.previous;
            }
            tracing::warn!("Error changing status of bill {}: {}", self.header.id, e);
            return Err(SessionError::Remote(e));
        }
        tracing::info!(
            "Bill {} status changed to {}",
            self.header.id,
            ticket.status.label()
        );
        self.snapshot.header.status = Some(ticket.status);
        Ok(())
    }

    pub async fn change_status(
        &mut self,
        status: BillStatus,
        remote: &dyn RemoteService,
    ) -> Result<(), SessionError> {
        let Some(ticket) = self.set_status(status) else {
            return Ok(());
        };
        let outcome = remote.save_bill(&ticket.payload).await;
        self.finish_status(ticket, outcome)
    }

    fn ensure_editing(&self) -> Result<(), SessionError> {
        if self.mode.is_editing() {
            Ok(())
        } else {
            Err(SessionError::NotEditing)
        }
    }

    fn check_generation(&self, generation: u64) -> Result<(), SessionError> {
        if generation == self.generation {
            Ok(())
        } else {
            tracing::warn!(
                "Ignoring late response for generation {} (current {})",
                generation,
                self.generation
            );
            Err(SessionError::Stale)
        }
    }
}
