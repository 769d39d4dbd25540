//! store/alloc — выдача блоков под новую запись и возврат цепочек в free‑лист.
//!
//! Правила:
//! - alloc(): только в Reading. Сначала голова free‑листа, иначе блок на front
//!   (front сдвигается на один блок, без запроса позиции у ОС). Состояние → Writing.
//! - release(off): только в Reading, off выровнен и > 0. Обходит цепочку до указателя 0,
//!   кладя каждый блок в free‑лист. Двойной release одной записи — ошибка вызывающего.

use anyhow::{anyhow, Result};
use log::debug;

use crate::metrics::{record_block_reused, record_chain_released};

use super::core::{Store, StoreState};

impl Store {
    /// Выделить стартовый блок для новой записи. Возвращает его offset.
    pub fn alloc(&mut self) -> Result<u64> {
        self.expect_state(StoreState::Reading, "alloc")?;
        if self.file.is_none() {
            return Err(anyhow!("store: alloc on closed scratch file"));
        }

        let pos = self.take_block();
        debug_assert!(self.is_aligned(pos));

        // Блоки могут перезаписываться — кэш чтения больше не валиден.
        self.rcache = None;
        self.cur = pos;
        self.allocs += 1;
        self.state = StoreState::Writing;
        Ok(pos)
    }

    /// Следующий блок для записи: из free‑листа, иначе свежий на front.
    pub(crate) fn take_block(&mut self) -> u64 {
        self.blocks_written += 1;
        match self.free.pop() {
            Some(off) => {
                self.reused_blocks += 1;
                record_block_reused();
                off
            }
            None => {
                let off = self.front;
                self.front += self.cfg.block_size;
                off
            }
        }
    }

    /// Вернуть все блоки цепочки, начинающейся с `off`, в free‑лист.
    /// Возвращает число освобождённых блоков.
    pub fn release(&mut self, off: u64) -> Result<u64> {
        self.expect_state(StoreState::Reading, "release")?;
        if off == 0 || !self.is_aligned(off) {
            return Err(anyhow!(
                "invariant violation: store.release() of misaligned offset {} (block_size={})",
                off,
                self.cfg.block_size
            ));
        }
        self.check_block_ref(off, "release offset")?;

        // Сначала собираем цепочку целиком, чтобы при битом указателе free‑лист не менялся.
        let max_blocks = self.front / self.cfg.block_size;
        let mut chain = Vec::new();
        let mut cur = off;
        loop {
            chain.push(cur);
            if chain.len() as u64 > max_blocks {
                return Err(anyhow!(
                    "store: block chain from off={} too long or loop detected",
                    off
                ));
            }
            let next = self.next_pointer(cur)?;
            if next == 0 {
                break;
            }
            self.check_block_ref(next, "next-block pointer")?;
            cur = next;
        }

        for &b in &chain {
            self.free.push(b);
        }
        self.cur = cur + self.cfg.block_size;
        record_chain_released();
        debug!(
            "store: released chain off={} ({} block(s), free list now {})",
            off,
            chain.len(),
            self.free.len()
        );
        Ok(chain.len() as u64)
    }
}
