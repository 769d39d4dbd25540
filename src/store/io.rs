//! store/io — запись и чтение записи по цепочке блоков.
//!
//! Запись (Writing):
//! - write(bytes) кладёт до (block_size - pointer) байт в текущий блок; если байты ещё остались,
//!   в слот указателя пишется offset следующего блока (free‑лист или front) целиком, 8 байт.
//! - На входе курсор может стоять в середине payload (предыдущий write той же записи).
//! - end() обнуляет хвост последнего блока, включая слот указателя (=> конец цепочки).
//!
//! Чтение (Reading):
//! - seek(off) — только на выровненный блок данных.
//! - read(buf) зеркален write(): прозрачно переходит по указателям, пока буфер не заполнен.
//!   Нулевой или битый указатель посреди чтения — фатальная ошибка (файл повреждён).

use anyhow::{anyhow, Result};
use byteorder::{ByteOrder, LittleEndian};

use crate::consts::{BLOCK_POINTER_SIZE, END_OF_CHAIN};
use crate::metrics::record_chain_written;

use super::core::{Store, StoreState};

impl Store {
    /// Дописать байты в текущую запись. Пустой буфер — no‑op.
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.expect_state(StoreState::Writing, "write")?;
        let payload = self.cfg.payload_per_block();

        let mut rest = bytes;
        while !rest.is_empty() {
            let room = payload - self.in_block(self.cur);
            if room == 0 {
                // Блок заполнен, а данные ещё есть — продолжаем цепочку.
                let next = self.take_block();
                let mut ptr = [0u8; BLOCK_POINTER_SIZE as usize];
                LittleEndian::write_u64(&mut ptr, next);
                let slot = self.pointer_slot(self.cur - self.in_block(self.cur));
                self.write_at(slot, &ptr)?;
                self.cur = next;
                continue;
            }
            let n = std::cmp::min(room as usize, rest.len());
            let at = self.cur;
            self.write_at(at, &rest[..n])?;
            self.cur += n as u64;
            rest = &rest[n..];
        }
        Ok(())
    }

    /// Завершить запись: обнулить остаток последнего блока. Состояние → Reading.
    pub fn end(&mut self) -> Result<()> {
        self.expect_state(StoreState::Writing, "end")?;
        let bs = self.cfg.block_size;
        let tail = bs - self.in_block(self.cur);
        let zeros = vec![0u8; tail as usize];
        let at = self.cur;
        self.write_at(at, &zeros)?;
        self.cur += tail;
        self.state = StoreState::Reading;
        record_chain_written();
        Ok(())
    }

    /// Переставить курсор чтения на начало записи `off`.
    pub fn seek(&mut self, off: u64) -> Result<()> {
        self.expect_state(StoreState::Reading, "seek")?;
        if !self.is_aligned(off) {
            return Err(anyhow!(
                "invariant violation: store.seek() to misaligned offset {} (block_size={})",
                off,
                self.cfg.block_size
            ));
        }
        self.check_block_ref(off, "seek offset")?;
        self.cur = off;
        Ok(())
    }

    /// Прочитать ровно buf.len() байт с текущей позиции. Пустой буфер — no‑op.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        self.expect_state(StoreState::Reading, "read")?;
        let payload = self.cfg.payload_per_block();

        let mut filled = 0usize;
        while filled < buf.len() {
            let in_block = self.in_block(self.cur);
            let room = payload.saturating_sub(in_block);
            if room == 0 {
                let block = self.cur - in_block;
                let next = self.next_pointer(block)?;
                if next == END_OF_CHAIN {
                    return Err(anyhow!(
                        "store: record chain ended at block {} with {} byte(s) still to read",
                        block,
                        buf.len() - filled
                    ));
                }
                self.check_block_ref(next, "next-block pointer")?;
                self.cur = next;
                continue;
            }
            let n = std::cmp::min(room as usize, buf.len() - filled);
            let block = self.cur - in_block;
            let start = in_block as usize;
            let src = self.cached_block(block)?;
            buf[filled..filled + n].copy_from_slice(&src[start..start + n]);
            self.cur += n as u64;
            filled += n;
        }
        Ok(())
    }

    /// Удобная обёртка: записать всю запись целиком (alloc → write → end).
    pub fn put_record(&mut self, bytes: &[u8]) -> Result<u64> {
        let off = self.alloc()?;
        self.write(bytes)?;
        self.end()?;
        Ok(off)
    }

    /// Удобная обёртка: seek + read ровно `len` байт.
    pub fn get_record(&mut self, off: u64, len: usize) -> Result<Vec<u8>> {
        self.seek(off)?;
        let mut out = vec![0u8; len];
        self.read(&mut out)?;
        Ok(out)
    }
}
