//! nav/build — поддеревья целиком: построение индекса из дерева парсера и обратная сборка.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use log::debug;

use crate::entry::Entry;
use crate::store::Store;

use super::{EntryTree, NodeId};

impl EntryTree {
    /// Построить скелет для дерева `entry` под `parent` (или новым корнем) и записать
    /// каждую запись в Store. Порядок детей сохраняется. Возвращает id корня поддерева.
    pub fn commit_subtree(
        &mut self,
        parent: Option<NodeId>,
        entry: Entry,
        store: &mut Store,
    ) -> Result<NodeId> {
        if let Some(p) = parent {
            self.check_id(p)?;
        }
        let mut top: Option<NodeId> = None;
        let mut committed = 0usize;
        let mut stack: Vec<(Option<NodeId>, Entry)> = vec![(parent, entry)];
        while let Some((parent, mut e)) = stack.pop() {
            let children = e.take_children();
            let id = match parent {
                Some(p) => self.add_child(p, e)?,
                None => self.add_root(e),
            };
            self.commit(id, store)?;
            committed += 1;
            if top.is_none() {
                top = Some(id);
            }
            stack.extend(children.into_iter().rev().map(|c| (Some(id), c)));
        }
        let top = top.ok_or_else(|| anyhow!("nav: commit_subtree produced no nodes"))?;
        debug!("nav: committed subtree {} ({} nodes)", top, committed);
        Ok(top)
    }

    /// Собрать полное дерево Entry для поддерева `id`. Узлы, которые пришлось загрузить,
    /// после копирования снова выгружаются; уже загруженные остаются загруженными.
    pub fn load_subtree(&mut self, id: NodeId, store: &mut Store) -> Result<Entry> {
        self.check_id(id)?;
        let order: Vec<NodeId> = self.walk(id).collect();

        let mut copies: HashMap<NodeId, Entry> = HashMap::with_capacity(order.len());
        for &n in &order {
            let was_resident = self.is_resident(n);
            self.load(n, store)?;
            let copy = self
                .entry(n)
                .map(Entry::detached)
                .ok_or_else(|| anyhow!("nav: node {} is not resident after load", n))?;
            copies.insert(n, copy);
            if !was_resident {
                self.release(n)?;
            }
        }

        // Обратный прямой порядок: дети собраны раньше родителя.
        for &n in order.iter().rev() {
            let kids: Vec<Entry> = self
                .children(n)
                .iter()
                .filter_map(|c| copies.remove(c))
                .collect();
            if let Some(e) = copies.get_mut(&n) {
                e.children = kids;
            }
        }
        copies
            .remove(&id)
            .ok_or_else(|| anyhow!("nav: subtree {} vanished during assembly", id))
    }
}
