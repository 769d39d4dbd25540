//! entry — модель записи Entry: одно объявление (класс, функция, переменная …)
//! вместе с сырой документацией и структурными метаданными.
//!
//! Подмодули:
//! - types.rs  — перечисления и мелкие структуры (BaseInfo, Grouping, SectionInfo, ListItemInfo).
//! - args.rs   — Argument / ArgumentList.
//! - traits.rs — 64‑битный набор признаков.
//!
//! Поле `children` — поддерево, построенное парсером. Кодек записи (encode_entry) его не пишет;
//! его пишет только рекурсивный encode_entry_tree.

pub mod types;
pub mod args;
pub mod traits;

pub use args::{Argument, ArgumentList};
pub use traits::{Trait, Traits};
pub use types::{
    BaseInfo, GroupDocType, GroupPri, Grouping, ListItemInfo, MethodType, Protection, RefQualifier,
    RelatesType, Section, SectionInfo, SectionType, Specifier, SrcLang,
};

/// Блок документации: текст + место, откуда он взят.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocBlock {
    pub text: String,
    pub file: String,
    pub line: i32,
}

impl Default for DocBlock {
    fn default() -> Self {
        Self {
            text: String::new(),
            file: String::new(),
            line: -1,
        }
    }
}

impl DocBlock {
    pub fn new(text: impl Into<String>, file: impl Into<String>, line: i32) -> Self {
        Self { text: text.into(), file: file.into(), line }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Полная запись объявления.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    // ----- identity -----
    pub name: String,
    pub type_name: String,
    pub section: Section,
    pub lang: SrcLang,

    // ----- classification -----
    pub protection: Protection,
    pub virt: Specifier,
    pub mtype: MethodType,
    pub traits: Traits,
    pub relates_type: RelatesType,
    pub group_doc_type: GroupDocType,

    pub init_lines: i32,
    pub stat: bool,
    pub explicit_external: bool,
    pub proto: bool,
    pub sub_grouping: bool,
    pub call_graph: bool,
    pub caller_graph: bool,
    pub hidden: bool,
    pub artificial: bool,

    // ----- textual payload -----
    pub args: String,
    pub bitfields: String,
    pub program: String,
    pub initializer: String,
    pub include_file: String,
    pub include_name: String,
    pub doc: DocBlock,
    pub brief: DocBlock,
    pub inbody: DocBlock,
    pub relates: String,
    pub read: String,
    pub write: String,
    pub inside: String,
    pub exception: String,
    pub id: String,

    // ----- structural children -----
    pub arg_list: Option<ArgumentList>,
    pub tmpl_arg_lists: Option<Vec<ArgumentList>>,
    pub type_constr: Option<ArgumentList>,
    pub extends: Option<Vec<BaseInfo>>,
    pub groups: Option<Vec<Grouping>>,
    pub anchors: Option<Vec<SectionInfo>>,
    pub xref_items: Option<Vec<ListItemInfo>>,

    // ----- positions -----
    pub file_name: String,
    pub start_line: i32,
    pub start_column: i32,
    pub body_line: i32,
    pub end_body_line: i32,
    pub member_group_id: i32,

    /// Поддерево, построенное парсером (не часть одиночной записи).
    pub children: Vec<Entry>,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            name: String::new(),
            type_name: String::new(),
            section: Section::Empty,
            lang: SrcLang::Unknown,

            protection: Protection::Public,
            virt: Specifier::Normal,
            mtype: MethodType::Method,
            traits: Traits::empty(),
            relates_type: RelatesType::Simple,
            group_doc_type: GroupDocType::Normal,

            init_lines: -1,
            stat: false,
            explicit_external: false,
            proto: false,
            sub_grouping: true,
            call_graph: false,
            caller_graph: false,
            hidden: false,
            artificial: false,

            args: String::new(),
            bitfields: String::new(),
            program: String::new(),
            initializer: String::new(),
            include_file: String::new(),
            include_name: String::new(),
            doc: DocBlock::default(),
            brief: DocBlock::default(),
            inbody: DocBlock::default(),
            relates: String::new(),
            read: String::new(),
            write: String::new(),
            inside: String::new(),
            exception: String::new(),
            id: String::new(),

            arg_list: None,
            tmpl_arg_lists: None,
            type_constr: None,
            extends: None,
            groups: None,
            anchors: None,
            xref_items: None,

            file_name: String::new(),
            start_line: 1,
            start_column: 1,
            body_line: -1,
            end_body_line: -1,
            member_group_id: -1,

            children: Vec::new(),
        }
    }
}

impl Entry {
    pub fn new(section: Section, name: impl Into<String>) -> Self {
        // Entry реализует Drop, поэтому без struct update syntax.
        let mut e = Self::default();
        e.section = section;
        e.name = name.into();
        e
    }

    /// Добавить дочернюю запись; возвращает ссылку на неё.
    pub fn add_child(&mut self, child: Entry) -> &mut Entry {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Отметить запись элементом cross‑reference списка `list` с номером `item_id`.
    /// Повторное добавление в тот же список игнорируется.
    pub fn add_xref_item(&mut self, list: impl Into<String>, item_id: i32) {
        let list = list.into();
        let items = self.xref_items.get_or_insert_with(Vec::new);
        if items.iter().any(|it| it.list == list) {
            return;
        }
        items.push(ListItemInfo { list, item_id });
    }

    /// Копия записи без поддерева. Деструктуризация без `..`: новое поле не
    /// пропадёт из копии молча, а сломает сборку здесь.
    pub fn detached(&self) -> Entry {
        let Entry {
            name, type_name, section, lang, protection, virt, mtype, traits, relates_type,
            group_doc_type, init_lines, stat, explicit_external, proto, sub_grouping, call_graph,
            caller_graph, hidden, artificial, args, bitfields, program, initializer,
            include_file, include_name, doc, brief, inbody, relates, read, write, inside,
            exception, id, arg_list, tmpl_arg_lists, type_constr, extends, groups, anchors,
            xref_items, file_name, start_line, start_column, body_line, end_body_line,
            member_group_id, children: _,
        } = self;
        Entry {
            name: name.clone(),
            type_name: type_name.clone(),
            section: *section,
            lang: *lang,
            protection: *protection,
            virt: *virt,
            mtype: *mtype,
            traits: *traits,
            relates_type: *relates_type,
            group_doc_type: *group_doc_type,
            init_lines: *init_lines,
            stat: *stat,
            explicit_external: *explicit_external,
            proto: *proto,
            sub_grouping: *sub_grouping,
            call_graph: *call_graph,
            caller_graph: *caller_graph,
            hidden: *hidden,
            artificial: *artificial,
            args: args.clone(),
            bitfields: bitfields.clone(),
            program: program.clone(),
            initializer: initializer.clone(),
            include_file: include_file.clone(),
            include_name: include_name.clone(),
            doc: doc.clone(),
            brief: brief.clone(),
            inbody: inbody.clone(),
            relates: relates.clone(),
            read: read.clone(),
            write: write.clone(),
            inside: inside.clone(),
            exception: exception.clone(),
            id: id.clone(),
            arg_list: arg_list.clone(),
            tmpl_arg_lists: tmpl_arg_lists.clone(),
            type_constr: type_constr.clone(),
            extends: extends.clone(),
            groups: groups.clone(),
            anchors: anchors.clone(),
            xref_items: xref_items.clone(),
            file_name: file_name.clone(),
            start_line: *start_line,
            start_column: *start_column,
            body_line: *body_line,
            end_body_line: *end_body_line,
            member_group_id: *member_group_id,
            children: Vec::new(),
        }
    }

    /// Забрать поддерево, оставив запись без детей.
    pub fn take_children(&mut self) -> Vec<Entry> {
        std::mem::take(&mut self.children)
    }

    /// Число записей в поддереве, включая эту (итеративно).
    pub fn count_nodes(&self) -> usize {
        let mut n = 0usize;
        let mut stack = vec![self];
        while let Some(e) = stack.pop() {
            n += 1;
            stack.extend(e.children.iter());
        }
        n
    }
}

impl Drop for Entry {
    // Глубокие цепочки (тысячи уровней) не должны разматываться рекурсивно.
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut e) = stack.pop() {
            stack.append(&mut e.children);
        }
    }
}
