//! entry/traits — фиксированный набор из 64 булевых признаков записи.
//!
//! Сериализуется строкой из '0'/'1' (старший бит первым), как битовая маска в текстовом виде.
//! Более короткая строка допустима (недостающие старшие биты = 0).

use anyhow::{anyhow, Result};
use std::ops::BitOrAssign;

use crate::consts::TRAITS_WIDTH;

/// Отдельный признак; значение — номер бита.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Trait {
    // class specifiers
    AbstractClass,
    Exception,
    Generic,
    Interface,
    Protocol,
    Ref,
    SealedClass,
    Struct,
    EnumStruct,
    Template,
    Union,
    Value,
    Category,
    Enum,
    Service,
    Singleton,
    ForwardDecl,

    // property attributes
    Readable,
    Writable,
    Reset,
    Notify,
    Revision,
    Designable,
    Scriptable,
    Stored,
    User,
    Constant,
    FinalProperty,
    Assign,

    // member specifiers
    Deprecated,
    PrivateGettable,
    ProtectedGettable,
    PrivateSettable,
    ProtectedSettable,
    NoDiscard,
    NoReturn,
    BypassUndocWarn,
    Inline,
    Final,
    Explicit,
    Mutable,
    Settable,
    Gettable,
    Abstract,
    Addable,
    Removable,
    Raisable,
    Override,
    New,
    Sealed,
    Initonly,
    Optional,
    Required,
    NonAtomic,
    Copy,
    Retain,
    Strong,
    Weak,
    Unretained,
    Alias,
    ConstExpr,
    Default,
    Delete,
    NoExcept,
}

impl Trait {
    #[inline]
    pub fn bit(self) -> u32 {
        self as u32
    }
}

/// Набор признаков (битовая маска).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Traits(u64);

impl Traits {
    pub const fn empty() -> Self {
        Traits(0)
    }

    pub const fn all() -> Self {
        Traits(u64::MAX)
    }

    #[inline]
    pub fn bits(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn from_bits(bits: u64) -> Self {
        Traits(bits)
    }

    #[inline]
    pub fn has(self, t: Trait) -> bool {
        self.0 & (1u64 << t.bit()) != 0
    }

    pub fn set(&mut self, t: Trait, on: bool) {
        if on {
            self.0 |= 1u64 << t.bit();
        } else {
            self.0 &= !(1u64 << t.bit());
        }
    }

    pub fn with(mut self, t: Trait) -> Self {
        self.set(t, true);
        self
    }

    /// Установлен ровно этот признак и никакой другой.
    pub fn only_has(self, t: Trait) -> bool {
        self.has(t) && self.0.count_ones() == 1
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Текстовая форма: TRAITS_WIDTH символов '0'/'1', старший бит первым.
    pub fn to_bit_string(self) -> String {
        format!("{:0width$b}", self.0, width = TRAITS_WIDTH)
    }

    /// Разбор текстовой формы. Правый символ — бит 0.
    pub fn from_bit_string(s: &str) -> Result<Self> {
        let mut bits = 0u64;
        for (pos, ch) in s.bytes().rev().enumerate() {
            match ch {
                b'0' => {}
                b'1' => {
                    if pos >= TRAITS_WIDTH {
                        return Err(anyhow!(
                            "trait bit {} is beyond the supported width {}",
                            pos,
                            TRAITS_WIDTH
                        ));
                    }
                    bits |= 1u64 << pos;
                }
                other => {
                    return Err(anyhow!(
                        "invalid character 0x{:02x} in trait bit string",
                        other
                    ))
                }
            }
        }
        Ok(Traits(bits))
    }
}

impl BitOrAssign for Traits {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
