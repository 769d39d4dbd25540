//! entry/types — перечисления, из которых состоит запись Entry.
//!
//! Все перечисления сериализуются как i32 (см. codec). Неизвестное значение при декодировании —
//! ошибка формата: scratch‑файл пишется и читается одной и той же сборкой.

use anyhow::{anyhow, Result};

/// Объявляет `#[repr(i32)]` перечисление с `as_i32()` / `from_i32()`.
macro_rules! int_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        pub enum $name { $( $(#[$vmeta])* $variant = $val ),+ }

        impl $name {
            #[inline]
            pub fn as_i32(self) -> i32 {
                self as i32
            }

            pub fn from_i32(v: i32) -> Result<Self> {
                match v {
                    $( x if x == $val => Ok($name::$variant), )+
                    other => Err(anyhow!(concat!("unknown ", stringify!($name), " value {}"), other)),
                }
            }
        }
    };
}

int_enum! {
    /// Вид записи (раздел). Значения совпадают с битовыми масками классификации ниже.
    pub enum Section {
        Class = 0x0000_0001,
        Namespace = 0x0000_0010,
        ClassDoc = 0x0000_0020,
        StructDoc = 0x0000_0040,
        UnionDoc = 0x0000_0080,
        ExceptionDoc = 0x0000_0100,
        InterfaceDoc = 0x0000_0200,
        ProtocolDoc = 0x0000_0400,
        CategoryDoc = 0x0000_0800,
        ServiceDoc = 0x0000_1000,
        SingletonDoc = 0x0000_2000,
        Source = 0x0000_4000,
        Header = 0x0000_8000,
        ConceptDoc = 0x0010_0000,
        DefineDoc = 0x0020_0000,
        DirDoc = 0x0030_0000,
        EnumDoc = 0x0040_0000,
        FileDoc = 0x0050_0000,
        GroupDoc = 0x0060_0000,
        MainpageDoc = 0x0070_0000,
        MemberDoc = 0x0080_0000,
        NamespaceDoc = 0x0090_0000,
        OverloadDoc = 0x00a0_0000,
        PackageDoc = 0x00b0_0000,
        PageDoc = 0x00c0_0000,
        VariableDoc = 0x00d0_0000,
        Define = 0x00e0_0000,
        Enum = 0x00f0_0000,
        Empty = 0x0100_0000,
        Example = 0x0200_0000,
        Function = 0x0300_0000,
        Include = 0x0400_0000,
        MemberGrp = 0x0500_0000,
        ObjcImpl = 0x0600_0000,
        Package = 0x0700_0000,
        Typedef = 0x0800_0000,
        UsingDecl = 0x0900_0000,
        UsingDir = 0x0a00_0000,
        Variable = 0x0b00_0000,
        ExportedInterface = 0x0c00_0000,
        IncludedService = 0x0d00_0000,
        ExampleLineno = 0x0e00_0000,
    }
}

const COMPOUND_MASK: i32 = Section::Class as i32;
const SCOPE_MASK: i32 = COMPOUND_MASK | Section::Namespace as i32;
const FILE_MASK: i32 = Section::Source as i32 | Section::Header as i32;
const COMPOUNDDOC_MASK: i32 = Section::ClassDoc as i32
    | Section::StructDoc as i32
    | Section::UnionDoc as i32
    | Section::ExceptionDoc as i32
    | Section::InterfaceDoc as i32
    | Section::ProtocolDoc as i32
    | Section::CategoryDoc as i32
    | Section::ServiceDoc as i32
    | Section::SingletonDoc as i32;

impl Section {
    pub fn is_compound(self) -> bool {
        self.as_i32() & COMPOUND_MASK != 0
    }
    pub fn is_scope(self) -> bool {
        self.as_i32() & SCOPE_MASK != 0
    }
    pub fn is_file(self) -> bool {
        self.as_i32() & FILE_MASK != 0
    }
    pub fn is_compound_doc(self) -> bool {
        self.as_i32() & COMPOUNDDOC_MASK != 0
    }
}

int_enum! {
    /// Уровень доступа.
    pub enum Protection {
        Public = 0,
        Protected = 1,
        Private = 2,
        Package = 3,
    }
}

int_enum! {
    /// Виртуальность члена / наследования.
    pub enum Specifier {
        Normal = 0,
        Virtual = 1,
        Pure = 2,
    }
}

int_enum! {
    /// Вид члена класса.
    pub enum MethodType {
        Method = 0,
        Signal = 1,
        Slot = 2,
        Dcop = 3,
        Property = 4,
        Event = 5,
    }
}

int_enum! {
    pub enum RelatesType {
        Simple = 0,
        Duplicate = 1,
        MemberOf = 2,
    }
}

int_enum! {
    /// Ref‑квалификатор метода.
    pub enum RefQualifier {
        NoRef = 0,
        LValueRef = 1,
        RValueRef = 2,
    }
}

int_enum! {
    /// Язык исходника (по расширению файла).
    pub enum SrcLang {
        Unknown = 0x00000,
        Idl = 0x00008,
        Java = 0x00010,
        CSharp = 0x00020,
        D = 0x00040,
        Php = 0x00080,
        ObjC = 0x00100,
        Cpp = 0x00200,
        Js = 0x00400,
        Python = 0x00800,
        Fortran = 0x01000,
        Xml = 0x04000,
        Tcl = 0x08000,
        Markdown = 0x10000,
        Make = 0x20000,
        Docs = 0x40000,
    }
}

int_enum! {
    /// Как была объявлена группа документации.
    pub enum GroupDocType {
        Normal = 0,
        Add = 1,
        Weak = 2,
    }
}

int_enum! {
    /// Приоритет членства в группе (чем больше, тем сильнее).
    pub enum GroupPri {
        AutoWeak = 0,
        AutoAdd = 1,
        AutoDef = 2,
        InGroup = 3,
    }
}

impl GroupPri {
    pub fn command_name(self) -> &'static str {
        match self {
            GroupPri::AutoWeak => "@weakgroup",
            GroupPri::AutoAdd => "@addtogroup",
            GroupPri::AutoDef => "@defgroup",
            GroupPri::InGroup => "@ingroup",
        }
    }
}

int_enum! {
    /// Вид якоря/раздела документации.
    pub enum SectionType {
        Page = 0,
        Section = 1,
        Subsection = 2,
        Subsubsection = 3,
        Paragraph = 4,
        Anchor = 5,
        Table = 6,
    }
}

/// Базовый класс: имя, доступ, виртуальность наследования.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseInfo {
    pub name: String,
    pub prot: Protection,
    pub virt: Specifier,
}

impl BaseInfo {
    pub fn new(name: impl Into<String>, prot: Protection, virt: Specifier) -> Self {
        Self { name: name.into(), prot, virt }
    }
}

/// Членство в группе.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping {
    pub group_name: String,
    pub pri: GroupPri,
}

impl Grouping {
    pub fn new(group_name: impl Into<String>, pri: GroupPri) -> Self {
        Self { group_name: group_name.into(), pri }
    }
}

/// Якорь / раздел внутри документации записи.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionInfo {
    pub label: String,
    pub title: String,
    pub reference: String,
    pub kind: SectionType,
    pub file_name: String,
    pub line: i32,
    pub level: i32,
}

/// Элемент cross‑reference списка (todo/test/bug/deprecated …).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItemInfo {
    pub list: String,
    pub item_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_masks() {
        assert!(Section::Class.is_compound());
        assert!(Section::Namespace.is_scope());
        assert!(!Section::Function.is_scope());
        assert!(Section::Header.is_file());
        assert!(Section::StructDoc.is_compound_doc());
        assert!(!Section::Variable.is_compound_doc());
    }

    #[test]
    fn from_i32_rejects_unknown() {
        assert_eq!(Section::from_i32(0x0300_0000).unwrap(), Section::Function);
        assert_eq!(SrcLang::from_i32(0x00200).unwrap(), SrcLang::Cpp);
        assert!(Protection::from_i32(7).is_err());
        assert!(Section::from_i32(3).is_err());
        assert_eq!(GroupPri::InGroup.command_name(), "@ingroup");
    }
}
