//! nav/state — состояние узла скелета и переходы между состояниями.
//!
//! ```text
//!   Building ──commit──▶ Paged ◀──release── Resident
//!      │                   │ ──────load──────▶ │
//!   release              reclaim            commit (новая цепочка, старая освобождается)
//!      ▼                   ▼
//!    Empty ◀───────────────┘
//!
//!   set_pinned: любое состояние ──▶ Pinned (load/release/commit — no-op)
//! ```

use anyhow::{anyhow, Result};
use log::{debug, warn};

use crate::codec::{decode_entry, encode_entry, RecordBuf};
use crate::entry::Entry;
use crate::metrics::{record_node_committed, record_node_loaded, record_node_released};
use crate::store::Store;

use super::{EntryTree, NodeId};

/// Где сейчас живёт полная запись узла.
#[derive(Debug)]
pub enum NavState {
    /// Запись создана парсером и ещё не записана.
    Building { entry: Box<Entry> },
    /// Запись только в Store.
    Paged { offset: u64 },
    /// Запись загружена из Store; цепочка по `offset` остаётся действительной.
    Resident { offset: u64, entry: Box<Entry> },
    /// Запись навсегда в памяти, цепочки нет.
    Pinned { entry: Box<Entry> },
    /// Ни записи, ни цепочки (выброшена до commit или возвращена в free list).
    Empty,
}

impl NavState {
    pub fn entry(&self) -> Option<&Entry> {
        match self {
            NavState::Building { entry }
            | NavState::Resident { entry, .. }
            | NavState::Pinned { entry } => Some(&**entry),
            NavState::Paged { .. } | NavState::Empty => None,
        }
    }

    pub fn entry_mut(&mut self) -> Option<&mut Entry> {
        match self {
            NavState::Building { entry }
            | NavState::Resident { entry, .. }
            | NavState::Pinned { entry } => Some(&mut **entry),
            NavState::Paged { .. } | NavState::Empty => None,
        }
    }

    fn into_entry(self) -> Option<Box<Entry>> {
        match self {
            NavState::Building { entry }
            | NavState::Resident { entry, .. }
            | NavState::Pinned { entry } => Some(entry),
            NavState::Paged { .. } | NavState::Empty => None,
        }
    }

    pub fn offset(&self) -> Option<u64> {
        match self {
            NavState::Paged { offset } | NavState::Resident { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NavState::Building { .. } => "building",
            NavState::Paged { .. } => "paged",
            NavState::Resident { .. } => "resident",
            NavState::Pinned { .. } => "pinned",
            NavState::Empty => "empty",
        }
    }
}

impl EntryTree {
    /// Записать запись узла в Store и выгрузить её из памяти.
    ///
    /// Building → Paged. Resident → Paged с новой цепочкой; старая цепочка освобождается
    /// (запись могла измениться после load). Paged и Pinned — no-op.
    pub fn commit(&mut self, id: NodeId, store: &mut Store) -> Result<()> {
        self.check_id(id)?;
        let node = &mut self.nodes[id.0];
        let old = match &node.state {
            NavState::Building { .. } => None,
            NavState::Resident { offset, .. } => Some(*offset),
            NavState::Paged { .. } | NavState::Pinned { .. } => return Ok(()),
            NavState::Empty => {
                return Err(anyhow!(
                    "invariant violation: node {} ('{}') has no record to commit",
                    id,
                    node.name
                ))
            }
        };
        // Тот же предел списков, с которым load будет читать цепочку.
        let mut buf = RecordBuf::with_limit(store.config().max_list_count);
        if let Some(e) = node.state.entry() {
            encode_entry(&mut buf, e)?;
        }
        let offset = store.put_record(&buf.bytes)?;
        if let Some(old) = old {
            store.release(old)?;
        }

        let prev = std::mem::replace(&mut node.state, NavState::Paged { offset });
        if let Some(e) = prev.into_entry() {
            node.capture_identity(&e);
        }
        record_node_committed();
        debug!(
            "nav: commit {} '{}' -> off={} ({} bytes{})",
            id,
            node.name,
            offset,
            buf.bytes.len(),
            if old.is_some() { ", old chain released" } else { "" }
        );
        Ok(())
    }

    /// Загрузить запись узла из Store. Resident, Building и Pinned — no-op;
    /// у узла без цепочки (Empty) — ошибка "no backing record".
    pub fn load(&mut self, id: NodeId, store: &mut Store) -> Result<()> {
        self.check_id(id)?;
        let node = &mut self.nodes[id.0];
        let offset = match node.state {
            NavState::Paged { offset } => offset,
            NavState::Empty => {
                return Err(anyhow!(
                    "invariant violation: node {} ('{}') has no backing record",
                    id,
                    node.name
                ))
            }
            _ => return Ok(()),
        };
        store.seek(offset)?;
        let mut e = decode_entry(store)?;
        node.overlay_identity(&mut e);
        node.state = NavState::Resident { offset, entry: Box::new(e) };
        record_node_loaded();
        debug!("nav: load {} '{}' <- off={}", id, node.name, offset);
        Ok(())
    }

    /// Выгрузить запись, оставив скелет и смещение. Pinned — no-op.
    pub fn release(&mut self, id: NodeId) -> Result<()> {
        self.check_id(id)?;
        let node = &mut self.nodes[id.0];
        node.state = match std::mem::replace(&mut node.state, NavState::Empty) {
            NavState::Resident { offset, .. } => {
                record_node_released();
                NavState::Paged { offset }
            }
            NavState::Building { .. } => {
                warn!(
                    "nav: release of never committed node {} ('{}'); its record is dropped",
                    id, node.name
                );
                NavState::Empty
            }
            other => other,
        };
        Ok(())
    }

    /// Закрепить узел: запись навсегда в памяти, без цепочки.
    ///
    /// Если у узла уже была цепочка, возвращается её offset: освободить её
    /// (`Store::release`) должен вызывающий.
    pub fn set_pinned(&mut self, id: NodeId, mut entry: Entry) -> Result<Option<u64>> {
        self.check_id(id)?;
        let node = &mut self.nodes[id.0];
        let orphan = node.state.offset();
        if let Some(off) = orphan {
            debug!("nav: pinning node {} ('{}') detaches its chain at off={}", id, node.name, off);
        }
        if !entry.children.is_empty() {
            warn!("nav: children of pinned record '{}' ignored", entry.name);
            drop(entry.take_children());
        }
        node.capture_identity(&entry);
        node.state = NavState::Pinned { entry: Box::new(entry) };
        debug!("nav: pinned {} '{}'", id, node.name);
        Ok(orphan)
    }

    /// Вернуть цепочку узла в free list. После этого load узла — ошибка.
    pub fn reclaim(&mut self, id: NodeId, store: &mut Store) -> Result<()> {
        self.check_id(id)?;
        let node = &mut self.nodes[id.0];
        let offset = match node.state.offset() {
            Some(off) => off,
            None => {
                return Err(anyhow!(
                    "invariant violation: node {} ('{}') is {} and has no chain to reclaim",
                    id,
                    node.name,
                    node.state.label()
                ))
            }
        };
        let blocks = store.release(offset)?;
        node.state = NavState::Empty;
        debug!("nav: reclaim {} '{}' off={} blocks={}", id, node.name, offset, blocks);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{DocBlock, Section, SrcLang};
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("entrydb-nav-{}-{}-{}", tag, std::process::id(), nanos))
    }

    #[test]
    fn commit_load_release_cycle() -> Result<()> {
        let path = scratch("cycle");
        let mut store = Store::open(&path)?;
        let mut t = EntryTree::new();
        let mut e = Entry::new(Section::Class, "Widget");
        e.doc = DocBlock::new("A widget.", "w.h", 1);
        e.lang = SrcLang::Cpp;
        let id = t.add_root(e);

        t.commit(id, &mut store)?;
        assert_eq!(t.offset(id), Some(store.first_data_offset()));
        assert!(!t.is_resident(id));

        t.load(id, &mut store)?;
        t.load(id, &mut store)?; // уже загружен
        assert_eq!(t.entry(id).unwrap().doc.text, "A widget.");
        t.release(id)?;
        t.release(id)?;
        assert!(!t.is_resident(id));
        assert_eq!(t.node(id).unwrap().state().label(), "paged");

        drop(store);
        let _ = std::fs::remove_file(&path);
        Ok(())
    }

    #[test]
    fn rename_overrides_stale_record() -> Result<()> {
        let path = scratch("rename");
        let mut store = Store::open(&path)?;
        let mut t = EntryTree::new();
        let id = t.add_root(Entry::new(Section::Function, "old_name"));
        t.commit(id, &mut store)?;
        t.rename(id, "new_name")?;
        t.load(id, &mut store)?;
        assert_eq!(t.entry(id).unwrap().name, "new_name");

        drop(store);
        let _ = std::fs::remove_file(&path);
        Ok(())
    }

    #[test]
    fn pinned_node_ignores_paging() -> Result<()> {
        let path = scratch("pinned");
        let mut store = Store::open(&path)?;
        let mut t = EntryTree::new();
        let id = t.add_root(Entry::new(Section::Namespace, "synth"));
        t.set_pinned(id, Entry::new(Section::Namespace, "synth"))?;
        let front = store.front();

        t.commit(id, &mut store)?;
        t.release(id)?;
        t.load(id, &mut store)?;
        assert!(t.is_pinned(id));
        assert!(t.is_resident(id));
        assert_eq!(t.offset(id), None);
        assert_eq!(store.front(), front, "pinned commit must not touch the store");
        assert!(t.reclaim(id, &mut store).is_err());

        drop(store);
        let _ = std::fs::remove_file(&path);
        Ok(())
    }

    #[test]
    fn released_building_node_has_no_backing_record() -> Result<()> {
        let path = scratch("empty");
        let mut store = Store::open(&path)?;
        let mut t = EntryTree::new();
        let id = t.add_root(Entry::new(Section::Variable, "tmp"));
        t.release(id)?;
        let err = t.load(id, &mut store).unwrap_err();
        assert!(err.to_string().contains("no backing record"));
        assert!(t.commit(id, &mut store).is_err());

        drop(store);
        let _ = std::fs::remove_file(&path);
        Ok(())
    }
}
