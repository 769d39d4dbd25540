//! codec/entry — одна запись Entry и дерево записей.
//!
//! Запись начинается с магии DOX!; несовпадение при чтении — фатальная ошибка кадрирования.
//! Дерево: запись узла, u32 число детей, затем дети в том же порядке (pre‑order).
//! Обход итеративный: глубина дерева не ограничена стеком потока.

use anyhow::{anyhow, Result};

use crate::consts::ENTRY_MAGIC;
use crate::entry::{
    DocBlock, Entry, GroupDocType, MethodType, Protection, RelatesType, Section, Specifier, SrcLang,
};
use crate::metrics::{record_entry_decoded, record_entry_encoded};

use super::lists::{
    check_count, get_argument_list, get_argument_lists, get_base_infos, get_groupings,
    get_list_items, get_section_infos, put_argument_list, put_argument_lists, put_base_infos,
    put_groupings, put_list_items, put_section_infos,
};
use super::prim::{
    get_bool, get_i32, get_str, get_traits, get_u32, put_bool, put_i32, put_str, put_traits,
    put_u32,
};
use super::{StorageRead, StorageWrite};

fn put_doc<W: StorageWrite + ?Sized>(s: &mut W, d: &DocBlock) -> Result<()> {
    put_str(s, &d.text)?;
    put_i32(s, d.line)?;
    put_str(s, &d.file)
}

fn get_doc<R: StorageRead + ?Sized>(s: &mut R) -> Result<DocBlock> {
    let text = get_str(s)?;
    let line = get_i32(s)?;
    let file = get_str(s)?;
    Ok(DocBlock { text, file, line })
}

/// Записать одну запись (без детей).
pub fn encode_entry<W: StorageWrite + ?Sized>(s: &mut W, e: &Entry) -> Result<()> {
    put_u32(s, ENTRY_MAGIC)?;
    put_str(s, &e.name)?;
    put_str(s, &e.type_name)?;
    put_i32(s, e.section.as_i32())?;
    put_i32(s, e.protection.as_i32())?;
    put_i32(s, e.mtype.as_i32())?;
    put_traits(s, e.traits)?;
    put_i32(s, e.init_lines)?;
    put_bool(s, e.stat)?;
    put_bool(s, e.explicit_external)?;
    put_bool(s, e.proto)?;
    put_bool(s, e.sub_grouping)?;
    put_bool(s, e.call_graph)?;
    put_bool(s, e.caller_graph)?;
    put_i32(s, e.virt.as_i32())?;
    put_str(s, &e.args)?;
    put_str(s, &e.bitfields)?;
    put_argument_list(s, e.arg_list.as_ref())?;
    put_argument_lists(s, e.tmpl_arg_lists.as_deref())?;
    put_str(s, &e.program)?;
    put_str(s, &e.initializer)?;
    put_str(s, &e.include_file)?;
    put_str(s, &e.include_name)?;
    put_doc(s, &e.doc)?;
    put_doc(s, &e.brief)?;
    put_doc(s, &e.inbody)?;
    put_str(s, &e.relates)?;
    put_i32(s, e.relates_type.as_i32())?;
    put_str(s, &e.read)?;
    put_str(s, &e.write)?;
    put_str(s, &e.inside)?;
    put_str(s, &e.exception)?;
    put_argument_list(s, e.type_constr.as_ref())?;
    put_i32(s, e.body_line)?;
    put_i32(s, e.end_body_line)?;
    put_i32(s, e.member_group_id)?;
    put_base_infos(s, e.extends.as_deref())?;
    put_groupings(s, e.groups.as_deref())?;
    put_section_infos(s, e.anchors.as_deref())?;
    put_str(s, &e.file_name)?;
    put_i32(s, e.start_line)?;
    put_i32(s, e.start_column)?;
    put_list_items(s, e.xref_items.as_deref())?;
    put_i32(s, e.lang.as_i32())?;
    put_bool(s, e.hidden)?;
    put_bool(s, e.artificial)?;
    put_i32(s, e.group_doc_type.as_i32())?;
    put_str(s, &e.id)?;
    record_entry_encoded();
    Ok(())
}

/// Прочитать одну запись. Дети не читаются.
pub fn decode_entry<R: StorageRead + ?Sized>(s: &mut R) -> Result<Entry> {
    let magic = get_u32(s)?;
    if magic != ENTRY_MAGIC {
        return Err(anyhow!(
            "codec: bad record magic 0x{:08x} (expected 0x{:08x}); scratch file is corrupted",
            magic,
            ENTRY_MAGIC
        ));
    }
    let mut e = Entry::default();
    e.name = get_str(s)?;
    e.type_name = get_str(s)?;
    e.section = Section::from_i32(get_i32(s)?)?;
    e.protection = Protection::from_i32(get_i32(s)?)?;
    e.mtype = MethodType::from_i32(get_i32(s)?)?;
    e.traits = get_traits(s)?;
    e.init_lines = get_i32(s)?;
    e.stat = get_bool(s)?;
    e.explicit_external = get_bool(s)?;
    e.proto = get_bool(s)?;
    e.sub_grouping = get_bool(s)?;
    e.call_graph = get_bool(s)?;
    e.caller_graph = get_bool(s)?;
    e.virt = Specifier::from_i32(get_i32(s)?)?;
    e.args = get_str(s)?;
    e.bitfields = get_str(s)?;
    e.arg_list = get_argument_list(s)?;
    e.tmpl_arg_lists = get_argument_lists(s)?;
    e.program = get_str(s)?;
    e.initializer = get_str(s)?;
    e.include_file = get_str(s)?;
    e.include_name = get_str(s)?;
    e.doc = get_doc(s)?;
    e.brief = get_doc(s)?;
    e.inbody = get_doc(s)?;
    e.relates = get_str(s)?;
    e.relates_type = RelatesType::from_i32(get_i32(s)?)?;
    e.read = get_str(s)?;
    e.write = get_str(s)?;
    e.inside = get_str(s)?;
    e.exception = get_str(s)?;
    e.type_constr = get_argument_list(s)?;
    e.body_line = get_i32(s)?;
    e.end_body_line = get_i32(s)?;
    e.member_group_id = get_i32(s)?;
    e.extends = get_base_infos(s)?;
    e.groups = get_groupings(s)?;
    e.anchors = get_section_infos(s)?;
    e.file_name = get_str(s)?;
    e.start_line = get_i32(s)?;
    e.start_column = get_i32(s)?;
    e.xref_items = get_list_items(s)?;
    e.lang = SrcLang::from_i32(get_i32(s)?)?;
    e.hidden = get_bool(s)?;
    e.artificial = get_bool(s)?;
    e.group_doc_type = GroupDocType::from_i32(get_i32(s)?)?;
    e.id = get_str(s)?;
    record_entry_decoded();
    Ok(e)
}

/// Записать запись и всё её поддерево.
pub fn encode_entry_tree<W: StorageWrite + ?Sized>(s: &mut W, root: &Entry) -> Result<()> {
    let mut stack: Vec<&Entry> = vec![root];
    while let Some(e) = stack.pop() {
        encode_entry(s, e)?;
        let n = check_count(s.max_list_count(), e.children.len(), "child list")?;
        put_u32(s, n)?;
        stack.extend(e.children.iter().rev());
    }
    Ok(())
}

fn get_child_count<R: StorageRead + ?Sized>(s: &mut R) -> Result<u32> {
    let n = get_u32(s)?;
    let max = s.max_list_count();
    if n >= max {
        return Err(anyhow!(
            "codec: implausible child count {} (limit {}); record is corrupted",
            n,
            max
        ));
    }
    Ok(n)
}

/// Прочитать запись и её поддерево; дети присоединяются в порядке записи.
pub fn decode_entry_tree<R: StorageRead + ?Sized>(s: &mut R) -> Result<Entry> {
    let root = decode_entry(s)?;
    let n = get_child_count(s)?;
    // (узел, сколько детей ещё предстоит прочитать)
    let mut stack: Vec<(Entry, u32)> = vec![(root, n)];
    while let Some((node, remaining)) = stack.pop() {
        if remaining == 0 {
            match stack.last_mut() {
                Some((parent, _)) => parent.children.push(node),
                None => return Ok(node),
            }
            continue;
        }
        let child = decode_entry(s)?;
        let cn = get_child_count(s)?;
        stack.push((node, remaining - 1));
        stack.push((child, cn));
    }
    Err(anyhow!("codec: entry tree decode finished without a root"))
}
