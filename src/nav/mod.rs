//! nav — скелетное дерево навигации поверх Store.
//!
//! Каждый узел хранит в памяти только идентичность записи (section, type, name, lang),
//! ссылку на родителя и упорядоченный список детей. Полная запись Entry живёт либо в памяти
//! (пока узел строится, загружен или закреплён), либо в цепочке блоков Store по смещению.
//!
//! Узлы лежат в арене `EntryTree` и адресуются `NodeId`; родитель — это индекс, а не владение,
//! поэтому ребёнок не удерживает родителя.
//!
//! Подмодули:
//! - state.rs — жизненный цикл узла: commit / load / release / set_pinned / reclaim.
//! - build.rs — построение и сборка поддеревьев (commit_subtree / load_subtree).

use std::fmt;

use anyhow::{anyhow, Result};
use log::warn;

use crate::entry::{Entry, Section, SrcLang};

pub mod state;
pub mod build;

pub use state::NavState;

/// Индекс узла в арене.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Узел скелета.
#[derive(Debug)]
pub struct NavNode {
    section: Section,
    type_name: String,
    name: String,
    lang: SrcLang,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    state: NavState,
}

impl NavNode {
    fn from_entry(entry: Entry, parent: Option<NodeId>) -> Self {
        Self {
            section: entry.section,
            type_name: entry.type_name.clone(),
            name: entry.name.clone(),
            lang: entry.lang,
            parent,
            children: Vec::new(),
            state: NavState::Building { entry: Box::new(entry) },
        }
    }

    /// Снять идентичность с записи (перед выгрузкой).
    fn capture_identity(&mut self, e: &Entry) {
        self.section = e.section;
        self.type_name.clone_from(&e.type_name);
        self.name.clone_from(&e.name);
        self.lang = e.lang;
    }

    /// Наложить идентичность скелета на прочитанную запись: копии скелета главнее.
    fn overlay_identity(&self, e: &mut Entry) {
        e.section = self.section;
        e.type_name.clone_from(&self.type_name);
        e.name.clone_from(&self.name);
        e.lang = self.lang;
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lang(&self) -> SrcLang {
        self.lang
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }
}

/// Арена скелетных узлов. Смещения в узлах имеют смысл только пока открыт тот Store,
/// в который они были записаны.
#[derive(Debug, Default)]
pub struct EntryTree {
    nodes: Vec<NavNode>,
    roots: Vec<NodeId>,
}

impl EntryTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Новый корень в состоянии Building. Хранится только собственная запись узла:
    /// дети Entry здесь отбрасываются (поддерево строится через add_child/commit_subtree).
    pub fn add_root(&mut self, entry: Entry) -> NodeId {
        let id = self.push_node(entry, None);
        self.roots.push(id);
        id
    }

    /// Новый ребёнок `parent` (в конец списка детей).
    pub fn add_child(&mut self, parent: NodeId, entry: Entry) -> Result<NodeId> {
        self.check_id(parent)?;
        let id = self.push_node(entry, Some(parent));
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    fn push_node(&mut self, mut entry: Entry, parent: Option<NodeId>) -> NodeId {
        let dropped = entry.take_children();
        if !dropped.is_empty() {
            warn!(
                "nav: {} child record(s) of '{}' ignored; attach children as skeleton nodes",
                dropped.len(),
                entry.name
            );
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(NavNode::from_entry(entry, parent));
        id
    }

    pub(crate) fn check_id(&self, id: NodeId) -> Result<()> {
        if id.0 >= self.nodes.len() {
            return Err(anyhow!(
                "invariant violation: node {} does not exist (tree has {} nodes)",
                id,
                self.nodes.len()
            ));
        }
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&NavNode> {
        self.nodes.get(id.0)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Запись в памяти (Building, Resident или Pinned).
    pub fn entry(&self, id: NodeId) -> Option<&Entry> {
        self.node(id).and_then(|n| n.state.entry())
    }

    pub fn entry_mut(&mut self, id: NodeId) -> Option<&mut Entry> {
        self.nodes.get_mut(id.0).and_then(|n| n.state.entry_mut())
    }

    /// Смещение цепочки в Store, если узел записан.
    pub fn offset(&self, id: NodeId) -> Option<u64> {
        self.node(id).and_then(|n| n.state.offset())
    }

    pub fn is_resident(&self, id: NodeId) -> bool {
        self.entry(id).is_some()
    }

    pub fn is_pinned(&self, id: NodeId) -> bool {
        matches!(self.node(id).map(|n| &n.state), Some(NavState::Pinned { .. }))
    }

    /// Переименовать узел на месте. Запись в Store не трогается: при следующем load
    /// имя из скелета перекроет устаревшее имя из цепочки.
    pub fn rename(&mut self, id: NodeId, name: impl Into<String>) -> Result<()> {
        self.check_id(id)?;
        let node = &mut self.nodes[id.0];
        node.name = name.into();
        if let Some(e) = node.state.entry_mut() {
            e.name.clone_from(&node.name);
        }
        Ok(())
    }

    /// Обход поддерева `id` в прямом порядке (узел, затем дети слева направо).
    pub fn walk(&self, id: NodeId) -> Walk<'_> {
        let stack = if id.0 < self.nodes.len() { vec![id] } else { Vec::new() };
        Walk { tree: self, stack }
    }
}

/// Итератор прямого обхода, см. [`EntryTree::walk`].
pub struct Walk<'a> {
    tree: &'a EntryTree,
    stack: Vec<NodeId>,
}

impl Iterator for Walk<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_links_follow_construction() {
        let mut t = EntryTree::new();
        let root = t.add_root(Entry::new(Section::Class, "Widget"));
        let a = t.add_child(root, Entry::new(Section::Function, "draw")).unwrap();
        let b = t.add_child(root, Entry::new(Section::Function, "resize")).unwrap();
        let c = t.add_child(b, Entry::new(Section::Variable, "w")).unwrap();

        assert_eq!(t.parent(root), None);
        assert_eq!(t.parent(a), Some(root));
        assert_eq!(t.parent(c), Some(b));
        assert_eq!(t.children(root), &[a, b]);
        assert_eq!(t.roots(), &[root]);
        assert_eq!(t.walk(root).collect::<Vec<_>>(), vec![root, a, b, c]);
        assert!(t.add_child(NodeId(99), Entry::default()).is_err());
    }

    #[test]
    fn identity_is_captured_from_entry() {
        let mut t = EntryTree::new();
        let mut e = Entry::new(Section::Function, "draw");
        e.type_name = "void".into();
        e.lang = SrcLang::Cpp;
        e.add_child(Entry::new(Section::Variable, "lost"));
        let id = t.add_root(e);
        let n = t.node(id).unwrap();
        assert_eq!(n.name(), "draw");
        assert_eq!(n.type_name(), "void");
        assert_eq!(n.lang(), SrcLang::Cpp);
        assert!(t.entry(id).unwrap().children.is_empty());
        assert!(t.is_resident(id));
        assert_eq!(t.offset(id), None);
    }
}
