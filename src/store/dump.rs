//! store/dump — диагностика Store: статистика, снимок free‑листа, hex‑дамп диапазона файла.

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::fmt::Write as _;

use super::core::Store;

/// Снимок счётчиков Store.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct StoreStats {
    pub block_size: u64,
    /// Размер файла в блоках (включая заголовок).
    pub total_blocks: u64,
    pub blocks_written: u64,
    pub blocks_read: u64,
    pub free_blocks: u64,
    pub allocs: u64,
    pub reused_blocks: u64,
}

impl Store {
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            block_size: self.cfg.block_size,
            total_blocks: self.front / self.cfg.block_size,
            blocks_written: self.blocks_written,
            blocks_read: self.blocks_read,
            free_blocks: self.free.len() as u64,
            allocs: self.allocs,
            reused_blocks: self.reused_blocks,
        }
    }

    /// Снимок free‑листа от головы (порядок выдачи), без изменения самого списка.
    pub fn free_list(&self) -> Vec<u64> {
        self.free.iter().collect()
    }

    /// Hex+ASCII дамп байт [start, end) scratch‑файла, по 16 байт на строку.
    /// Курсор Store не меняется (I/O позиционный).
    pub fn dump_blocks(&mut self, start: u64, end: u64) -> Result<String> {
        if end < start {
            return Err(anyhow!("dump range is inverted: {}..{}", start, end));
        }
        let mut buf = vec![0u8; (end - start) as usize];
        self.read_at(start, &mut buf)?;
        Ok(hex_dump(start, &buf))
    }
}

/// Форматировать `bytes` как hex‑дамп, адреса начиная с `base`.
pub fn hex_dump(base: u64, bytes: &[u8]) -> String {
    let mut out = String::new();
    for (i, line) in bytes.chunks(16).enumerate() {
        let _ = write!(out, "{:08x}: ", base + (i as u64) * 16);
        for b in line {
            let _ = write!(out, "{:02x} ", b);
        }
        for _ in line.len()..16 {
            out.push_str("   ");
        }
        out.push_str("  ");
        for &b in line {
            out.push(if (32..127).contains(&b) { b as char } else { '.' });
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_dump_layout() {
        let s = hex_dump(0x200, b"TEMP_XX\0abcdefgh!");
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00000200: 54 45 4d 50"));
        assert!(lines[0].ends_with("TEMP_XX.abcdefgh"));
        assert!(lines[1].starts_with("00000210: 21 "));
        assert!(lines[1].ends_with("!"));
    }

    #[test]
    fn hex_dump_masks_del() {
        let s = hex_dump(0, &[b'a', 0x7f, b'~', 0x80]);
        assert!(s.lines().next().unwrap_or("").ends_with("a.~."));
    }
}
