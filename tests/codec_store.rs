use anyhow::Result;
use std::path::PathBuf;

use EntryDB::config::StoreBuilder;
use EntryDB::entry::{
    Argument, ArgumentList, BaseInfo, DocBlock, GroupDocType, GroupPri, Grouping, ListItemInfo,
    MethodType, Protection, RefQualifier, RelatesType, SectionInfo, SectionType, Specifier,
    SrcLang,
};
use EntryDB::{decode_entry, decode_entry_tree, encode_entry, encode_entry_tree};
use EntryDB::{Entry, EntryTree, Section, Store, Traits};

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("entrydb-{}-{}-{}", prefix, pid, t))
}

fn scratch(prefix: &str) -> Result<Store> {
    let cfg = StoreBuilder::from_default().remove_on_close(true).build();
    Store::open_with_config(&unique_root(prefix), cfg)
}

/// Запись со всеми списками и длинной документацией (несколько блоков).
fn maximal_entry() -> Entry {
    let mut e = Entry::new(Section::Function, "operator()");
    e.type_name = "std::vector<int>".into();
    e.protection = Protection::Private;
    e.virt = Specifier::Virtual;
    e.mtype = MethodType::Property;
    e.traits = Traits::all();
    e.init_lines = 4;
    e.stat = true;
    e.explicit_external = true;
    e.proto = true;
    e.sub_grouping = false;
    e.call_graph = true;
    e.caller_graph = true;
    e.hidden = true;
    e.artificial = true;
    e.args = "(const T &a, T &&b = T{}) const &&".into();
    e.bitfields = ":3".into();

    let mut al: ArgumentList = vec![
        Argument::new("const T &", "a"),
        Argument::new("T &&", "b").with_default("T{}"),
    ]
    .into_iter()
    .collect();
    al.const_specifier = true;
    al.volatile_specifier = true;
    al.pure_specifier = true;
    al.ref_qualifier = RefQualifier::RValueRef;
    al.trailing_return_type = "-> decltype(a)".into();
    al.is_deleted = true;
    e.arg_list = Some(al.clone());
    e.tmpl_arg_lists = Some(vec![al.clone(), ArgumentList::new()]);
    e.type_constr = Some(al);

    e.program = "{ return a; }\n".repeat(100);
    e.initializer = "= default".into();
    e.include_file = "vec.h".into();
    e.include_name = "<vec.h>".into();
    e.doc = DocBlock::new("Детальное описание. ".repeat(80), "vec.h", 42);
    e.brief = DocBlock::new("Call operator.", "vec.h", 41);
    e.inbody = DocBlock::new("inside", "vec.cpp", 77);
    e.relates = "Vec".into();
    e.relates_type = RelatesType::MemberOf;
    e.read = "get".into();
    e.write = "set".into();
    e.inside = "Vec".into();
    e.exception = "std::bad_alloc".into();
    e.body_line = 80;
    e.end_body_line = 95;
    e.member_group_id = 3;
    e.extends = Some(vec![
        BaseInfo::new("Base", Protection::Public, Specifier::Normal),
        BaseInfo::new("Mixin", Protection::Protected, Specifier::Virtual),
    ]);
    e.groups = Some(vec![Grouping::new("containers", GroupPri::AutoDef)]);
    e.anchors = Some(vec![SectionInfo {
        label: "ops".into(),
        title: "Operators".into(),
        reference: "vec_ops".into(),
        kind: SectionType::Anchor,
        file_name: "vec.h".into(),
        line: 44,
        level: 1,
    }]);
    e.xref_items = Some(vec![ListItemInfo { list: "todo".into(), item_id: 12 }]);
    e.file_name = "vec.h".into();
    e.start_line = 40;
    e.start_column = 9;
    e.lang = SrcLang::Cpp;
    e.group_doc_type = GroupDocType::Weak;
    e.id = "vec-call".into();
    e
}

#[test]
fn records_roundtrip_through_store() -> Result<()> {
    let mut s = scratch("codec")?;

    let empty = Entry::default();
    let mut present_but_empty = Entry::new(Section::Class, "");
    present_but_empty.extends = Some(vec![]);
    present_but_empty.groups = Some(vec![]);
    present_but_empty.arg_list = Some(ArgumentList::new());
    let full = maximal_entry();

    let mut offs = Vec::new();
    for e in [&empty, &present_but_empty, &full] {
        let off = s.alloc()?;
        encode_entry(&mut s, e)?;
        s.end()?;
        offs.push(off);
    }
    assert!(s.front() - offs[2] > s.block_size(), "maximal record must span several blocks");

    for (off, want) in offs.iter().zip([&empty, &present_but_empty, &full]) {
        s.seek(*off)?;
        let got = decode_entry(&mut s)?;
        assert_eq!(&got, want);
    }

    s.seek(offs[0])?;
    assert!(decode_entry(&mut s)?.extends.is_none());
    s.seek(offs[1])?;
    assert_eq!(decode_entry(&mut s)?.extends, Some(vec![]));
    s.close()?;
    Ok(())
}

#[test]
fn corrupted_magic_is_fatal() -> Result<()> {
    let mut s = scratch("magic")?;
    let off = s.alloc()?;
    s.write(b"NOPE")?;
    s.end()?;
    s.seek(off)?;
    let err = decode_entry(&mut s).unwrap_err();
    assert!(err.to_string().contains("bad record magic"));
    s.close()?;
    Ok(())
}

#[test]
fn list_count_guard_follows_config() -> Result<()> {
    let path = unique_root("guard");
    let cfg = StoreBuilder::from_default()
        .max_list_count(2)
        .remove_on_close(true)
        .build();
    let mut s = Store::open_with_config(&path, cfg)?;
    let base = |n: &str| BaseInfo::new(n, Protection::Public, Specifier::Normal);

    // Список на пределе не пишется: decode того же Store его бы отверг.
    let mut e = Entry::new(Section::Class, "C");
    e.extends = Some(vec![base("A"), base("B")]);
    s.alloc()?;
    let err = encode_entry(&mut s, &e).unwrap_err();
    assert!(err.to_string().contains("list limit 2"), "{}", err);
    s.end()?;

    // Под пределом: туда и обратно.
    e.extends = Some(vec![base("A")]);
    let off = s.alloc()?;
    encode_entry(&mut s, &e)?;
    s.end()?;
    s.seek(off)?;
    assert_eq!(decode_entry(&mut s)?, e);

    // Число детей подчиняется тому же пределу.
    let mut root = Entry::new(Section::Namespace, "ns");
    root.add_child(Entry::new(Section::Class, "X"));
    root.add_child(Entry::new(Section::Class, "Y"));
    s.alloc()?;
    let err = encode_entry_tree(&mut s, &root).unwrap_err();
    assert!(err.to_string().contains("child list"), "{}", err);
    s.end()?;
    s.close()?;
    Ok(())
}

#[test]
fn commit_refuses_record_that_load_would_reject() -> Result<()> {
    let path = unique_root("guard-commit");
    let cfg = StoreBuilder::from_default()
        .max_list_count(4)
        .remove_on_close(true)
        .build();
    let mut s = Store::open_with_config(&path, cfg)?;
    let mut t = EntryTree::new();

    let mut e = Entry::new(Section::GroupDoc, "g");
    let groups = (0..4).map(|i| Grouping::new(format!("grp{i}"), GroupPri::InGroup));
    e.groups = Some(groups.collect());
    let id = t.add_root(e);
    let front = s.front();

    assert!(t.commit(id, &mut s).is_err());
    assert!(t.is_resident(id), "record stays in memory after a refused commit");
    assert_eq!(t.offset(id), None);
    assert_eq!(s.front(), front);

    if let Some(rec) = t.entry_mut(id) {
        if let Some(groups) = rec.groups.as_mut() {
            groups.truncate(3);
        }
    }
    t.commit(id, &mut s)?;
    t.load(id, &mut s)?;
    assert_eq!(t.entry(id).and_then(|r| r.groups.as_ref()).map(Vec::len), Some(3));
    s.close()?;
    Ok(())
}

#[test]
fn trees_roundtrip_through_store() -> Result<()> {
    let mut s = scratch("trees")?;

    let single = maximal_entry();

    let mut deep = Entry::new(Section::Namespace, "d0");
    {
        let mut cur = &mut deep;
        for i in 1..1000 {
            cur = cur.add_child(Entry::new(Section::Namespace, format!("d{}", i)));
        }
    }

    let mut wide = Entry::new(Section::Class, "Wide");
    for i in 0..1000 {
        let mut m = Entry::new(Section::Variable, format!("m{}", i));
        m.type_name = "int".into();
        wide.add_child(m);
    }

    for t in [&single, &deep, &wide] {
        let off = s.alloc()?;
        encode_entry_tree(&mut s, t)?;
        s.end()?;
        s.seek(off)?;
        let back = decode_entry_tree(&mut s)?;
        assert_eq!(back.count_nodes(), t.count_nodes());
        assert_eq!(&back, t);
    }
    s.close()?;
    Ok(())
}
