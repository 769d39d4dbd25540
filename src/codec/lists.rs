//! codec/lists — списки: счётчик, затем элементы. NULL_LIST — "списка нет".
//!
//! Отсутствующий (None) и пустой (Some(vec![])) список кодируются по‑разному и
//! восстанавливаются раздельно.

use anyhow::{anyhow, Result};

use crate::consts::NULL_LIST;
use crate::entry::{
    Argument, ArgumentList, BaseInfo, GroupPri, Grouping, ListItemInfo, Protection, RefQualifier,
    SectionInfo, SectionType, Specifier,
};

use super::prim::{get_bool, get_i32, get_str, get_u32, put_bool, put_i32, put_str, put_u32};
use super::{StorageRead, StorageWrite};

/// Счётчик для записи: не больше, чем примет decode того же курсора.
pub(crate) fn check_count(max: u32, len: usize, what: &str) -> Result<u32> {
    match u32::try_from(len) {
        Ok(n) if n < max && n != NULL_LIST => Ok(n),
        _ => Err(anyhow!(
            "codec: {} of {} items exceeds the list limit {}",
            what,
            len,
            max
        )),
    }
}

/// Записать счётчик (или NULL_LIST) и элементы через `put`.
pub fn put_list<W, T, F>(s: &mut W, list: Option<&[T]>, mut put: F) -> Result<()>
where
    W: StorageWrite + ?Sized,
    F: FnMut(&mut W, &T) -> Result<()>,
{
    match list {
        None => put_u32(s, NULL_LIST),
        Some(items) => {
            let n = check_count(s.max_list_count(), items.len(), "list")?;
            put_u32(s, n)?;
            for it in items {
                put(s, it)?;
            }
            Ok(())
        }
    }
}

/// Прочитать счётчик и элементы. NULL_LIST → None.
pub fn get_list<R, T, F>(s: &mut R, what: &str, mut get: F) -> Result<Option<Vec<T>>>
where
    R: StorageRead + ?Sized,
    F: FnMut(&mut R) -> Result<T>,
{
    let count = get_u32(s)?;
    if count == NULL_LIST {
        return Ok(None);
    }
    let max = s.max_list_count();
    if count >= max {
        return Err(anyhow!(
            "codec: implausible {} count {} (limit {}); record is corrupted",
            what,
            count,
            max
        ));
    }
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        out.push(get(s)?);
    }
    Ok(Some(out))
}

// ----- arguments -----

fn put_argument<W: StorageWrite + ?Sized>(s: &mut W, a: &Argument) -> Result<()> {
    put_str(s, &a.attrib)?;
    put_str(s, &a.type_name)?;
    put_str(s, &a.name)?;
    put_str(s, &a.array)?;
    put_str(s, &a.defval)?;
    put_str(s, &a.docs)?;
    put_str(s, &a.type_constraint)
}

fn get_argument<R: StorageRead + ?Sized>(s: &mut R) -> Result<Argument> {
    Ok(Argument {
        attrib: get_str(s)?,
        type_name: get_str(s)?,
        name: get_str(s)?,
        array: get_str(s)?,
        defval: get_str(s)?,
        docs: get_str(s)?,
        type_constraint: get_str(s)?,
    })
}

/// Список аргументов: аргументы по правилу NULL_LIST, затем (если список есть) хвостовые флаги.
pub fn put_argument_list<W: StorageWrite + ?Sized>(
    s: &mut W,
    al: Option<&ArgumentList>,
) -> Result<()> {
    put_list(s, al.map(|l| l.args.as_slice()), put_argument)?;
    if let Some(l) = al {
        put_bool(s, l.const_specifier)?;
        put_bool(s, l.volatile_specifier)?;
        put_bool(s, l.pure_specifier)?;
        put_i32(s, l.ref_qualifier.as_i32())?;
        put_str(s, &l.trailing_return_type)?;
        put_bool(s, l.is_deleted)?;
    }
    Ok(())
}

pub fn get_argument_list<R: StorageRead + ?Sized>(s: &mut R) -> Result<Option<ArgumentList>> {
    let Some(args) = get_list(s, "argument", get_argument)? else {
        return Ok(None);
    };
    Ok(Some(ArgumentList {
        args,
        const_specifier: get_bool(s)?,
        volatile_specifier: get_bool(s)?,
        pure_specifier: get_bool(s)?,
        ref_qualifier: RefQualifier::from_i32(get_i32(s)?)?,
        trailing_return_type: get_str(s)?,
        is_deleted: get_bool(s)?,
    }))
}

/// Список списков аргументов (шаблонные параметры по уровням вложенности).
pub fn put_argument_lists<W: StorageWrite + ?Sized>(
    s: &mut W,
    lists: Option<&[ArgumentList]>,
) -> Result<()> {
    put_list(s, lists, |s, al| put_argument_list(s, Some(al)))
}

pub fn get_argument_lists<R: StorageRead + ?Sized>(
    s: &mut R,
) -> Result<Option<Vec<ArgumentList>>> {
    get_list(s, "argument list", |s| {
        get_argument_list(s)?
            .ok_or_else(|| anyhow!("codec: absent argument list inside a template list"))
    })
}

// ----- base classes -----

pub fn put_base_infos<W: StorageWrite + ?Sized>(s: &mut W, l: Option<&[BaseInfo]>) -> Result<()> {
    put_list(s, l, |s, b| {
        put_str(s, &b.name)?;
        put_i32(s, b.prot.as_i32())?;
        put_i32(s, b.virt.as_i32())
    })
}

pub fn get_base_infos<R: StorageRead + ?Sized>(s: &mut R) -> Result<Option<Vec<BaseInfo>>> {
    get_list(s, "base class", |s| {
        Ok(BaseInfo {
            name: get_str(s)?,
            prot: Protection::from_i32(get_i32(s)?)?,
            virt: Specifier::from_i32(get_i32(s)?)?,
        })
    })
}

// ----- groupings -----

pub fn put_groupings<W: StorageWrite + ?Sized>(s: &mut W, l: Option<&[Grouping]>) -> Result<()> {
    put_list(s, l, |s, g| {
        put_str(s, &g.group_name)?;
        put_i32(s, g.pri.as_i32())
    })
}

pub fn get_groupings<R: StorageRead + ?Sized>(s: &mut R) -> Result<Option<Vec<Grouping>>> {
    get_list(s, "grouping", |s| {
        Ok(Grouping {
            group_name: get_str(s)?,
            pri: GroupPri::from_i32(get_i32(s)?)?,
        })
    })
}

// ----- section anchors -----

pub fn put_section_infos<W: StorageWrite + ?Sized>(
    s: &mut W,
    l: Option<&[SectionInfo]>,
) -> Result<()> {
    put_list(s, l, |s, si| {
        put_str(s, &si.label)?;
        put_str(s, &si.title)?;
        put_str(s, &si.reference)?;
        put_i32(s, si.kind.as_i32())?;
        put_str(s, &si.file_name)?;
        put_i32(s, si.line)?;
        put_i32(s, si.level)
    })
}

pub fn get_section_infos<R: StorageRead + ?Sized>(s: &mut R) -> Result<Option<Vec<SectionInfo>>> {
    get_list(s, "section anchor", |s| {
        Ok(SectionInfo {
            label: get_str(s)?,
            title: get_str(s)?,
            reference: get_str(s)?,
            kind: SectionType::from_i32(get_i32(s)?)?,
            file_name: get_str(s)?,
            line: get_i32(s)?,
            level: get_i32(s)?,
        })
    })
}

// ----- cross-reference items -----

pub fn put_list_items<W: StorageWrite + ?Sized>(
    s: &mut W,
    l: Option<&[ListItemInfo]>,
) -> Result<()> {
    put_list(s, l, |s, it| {
        put_str(s, &it.list)?;
        put_i32(s, it.item_id)
    })
}

pub fn get_list_items<R: StorageRead + ?Sized>(s: &mut R) -> Result<Option<Vec<ListItemInfo>>> {
    get_list(s, "cross-reference item", |s| {
        Ok(ListItemInfo {
            list: get_str(s)?,
            item_id: get_i32(s)?,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::RecordBuf;
    use std::io::Cursor;

    #[test]
    fn absent_and_empty_lists_differ() {
        let mut out = Vec::new();
        put_groupings(&mut out, None).unwrap();
        put_groupings(&mut out, Some(&[])).unwrap();
        assert_eq!(&out[..4], &[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(&out[4..8], &[0, 0, 0, 0]);

        let mut cur = Cursor::new(out.as_slice());
        assert_eq!(get_groupings(&mut cur).unwrap(), None);
        assert_eq!(get_groupings(&mut cur).unwrap(), Some(vec![]));
    }

    #[test]
    fn argument_list_with_trailer() {
        let mut al: ArgumentList = vec![
            Argument::new("int", "x").with_default("0"),
            Argument::new("const char *", ""),
        ]
        .into_iter()
        .collect();
        al.const_specifier = true;
        al.ref_qualifier = RefQualifier::RValueRef;
        al.trailing_return_type = "auto".into();

        let mut out = Vec::new();
        put_argument_list(&mut out, Some(&al)).unwrap();
        put_argument_list(&mut out, None).unwrap();
        put_argument_lists(&mut out, Some(&[al.clone(), ArgumentList::new()])).unwrap();

        let mut cur = Cursor::new(out.as_slice());
        assert_eq!(get_argument_list(&mut cur).unwrap(), Some(al.clone()));
        assert_eq!(get_argument_list(&mut cur).unwrap(), None);
        assert_eq!(
            get_argument_lists(&mut cur).unwrap(),
            Some(vec![al, ArgumentList::new()])
        );
    }

    #[test]
    fn implausible_count_is_rejected() {
        let mut out = Vec::new();
        put_u32(&mut out, 2_000_000).unwrap();
        let mut cur = Cursor::new(out.as_slice());
        assert!(get_list_items(&mut cur).is_err());
    }

    #[test]
    fn encoder_applies_the_same_limit() {
        let items = vec![
            ListItemInfo { list: "todo".into(), item_id: 1 },
            ListItemInfo { list: "bug".into(), item_id: 2 },
        ];
        let mut buf = RecordBuf::with_limit(2);
        assert!(put_list_items(&mut buf, Some(&items)).is_err());
        assert!(buf.bytes.is_empty(), "nothing is written for a refused list");
        put_list_items(&mut buf, Some(&items[..1])).unwrap();
        put_list_items(&mut buf, None).unwrap();
        assert_eq!(buf.bytes.len(), 4 + 4 + 4 + 4 + 4);
    }

    #[test]
    fn unknown_enum_value_is_rejected() {
        let mut out = Vec::new();
        put_u32(&mut out, 1).unwrap();
        put_str(&mut out, "Base").unwrap();
        put_i32(&mut out, 9).unwrap(); // нет такой Protection
        put_i32(&mut out, 0).unwrap();
        let mut cur = Cursor::new(out.as_slice());
        assert!(get_base_infos(&mut cur).is_err());
    }
}
