//! entry/args — аргументы функций/шаблонов и их списки.

use super::types::RefQualifier;

/// Один аргумент функции или шаблона.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Argument {
    /// Атрибут аргумента (только IDL).
    pub attrib: String,
    pub type_name: String,
    /// Может быть пустым.
    pub name: String,
    pub array: String,
    pub defval: String,
    pub docs: String,
    /// Ограничение типа для generics: `<T extends C>`.
    pub type_constraint: String,
}

impl Argument {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_default(mut self, defval: impl Into<String>) -> Self {
        self.defval = defval.into();
        self
    }

    /// Есть имя и документация.
    pub fn has_documentation(&self) -> bool {
        !self.name.is_empty() && !self.docs.is_empty()
    }
}

/// Список аргументов плюс то, что пишется после него (`const`, `= 0`, `&&`, `-> T`, `= delete`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentList {
    pub args: Vec<Argument>,
    pub const_specifier: bool,
    pub volatile_specifier: bool,
    pub pure_specifier: bool,
    pub ref_qualifier: RefQualifier,
    pub trailing_return_type: String,
    pub is_deleted: bool,
}

impl Default for ArgumentList {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            const_specifier: false,
            volatile_specifier: false,
            pure_specifier: false,
            ref_qualifier: RefQualifier::NoRef,
            trailing_return_type: String::new(),
            is_deleted: false,
        }
    }
}

impl ArgumentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, a: Argument) {
        self.args.push(a);
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn has_documentation(&self) -> bool {
        self.args.iter().any(Argument::has_documentation)
    }
}

impl FromIterator<Argument> for ArgumentList {
    fn from_iter<I: IntoIterator<Item = Argument>>(iter: I) -> Self {
        Self {
            args: iter.into_iter().collect(),
            ..Default::default()
        }
    }
}
