//! codec — бинарная сериализация записей Entry поверх байтового курсора.
//!
//! Подмодули:
//! - prim.rs  — i32/u32/u64 (big‑endian), bool (1 байт), строки (u32 длина + UTF‑8), Traits.
//! - lists.rs — списки с правилом NULL_LIST: счётчик 0xFFFF_FFFF = "списка нет", 0 = "пустой".
//! - entry.rs — запись Entry (магия DOX! первой) и рекурсивное дерево записей.
//!
//! Кодек знает только о курсоре (StorageWrite/StorageRead), не о блоках Store.
//! Порядок полей encode и decode фиксирован и совпадает поле в поле.

use anyhow::{anyhow, Result};
use std::io::{Cursor, Read};

use crate::consts::MAX_LIST_COUNT;
use crate::store::Store;

pub mod prim;
pub mod lists;
pub mod entry;

pub use entry::{decode_entry, decode_entry_tree, encode_entry, encode_entry_tree};

/// Приёмник байт: "записать N байт".
pub trait StorageWrite {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    /// Тот же предел, что у `StorageRead`: список такой длины не будет прочитан обратно.
    fn max_list_count(&self) -> u32 {
        MAX_LIST_COUNT
    }
}

/// Источник байт: "прочитать ровно N байт".
pub trait StorageRead {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Счётчики списков не меньше этого значения (кроме NULL_LIST) считаются порчей.
    fn max_list_count(&self) -> u32 {
        MAX_LIST_COUNT
    }
}

impl StorageWrite for Vec<u8> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// Буфер записи с явным пределом списков (тем же, что у Store, куда он потом ляжет).
#[derive(Debug)]
pub struct RecordBuf {
    pub bytes: Vec<u8>,
    limit: u32,
}

impl RecordBuf {
    pub fn with_limit(limit: u32) -> Self {
        Self { bytes: Vec::new(), limit }
    }
}

impl StorageWrite for RecordBuf {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    fn max_list_count(&self) -> u32 {
        self.limit
    }
}

impl StorageRead for Cursor<&[u8]> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        let pos = self.position();
        self.read_exact(buf).map_err(|e| {
            anyhow!(
                "codec: truncated input: need {} byte(s) at pos {}: {}",
                buf.len(),
                pos,
                e
            )
        })
    }
}

impl StorageWrite for Store {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write(bytes)
    }

    fn max_list_count(&self) -> u32 {
        self.config().max_list_count
    }
}

impl StorageRead for Store {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        self.read(buf)
    }

    fn max_list_count(&self) -> u32 {
        self.config().max_list_count
    }
}
