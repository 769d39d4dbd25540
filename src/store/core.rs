//! store/core — ядро Store: структура, open()/close(), проверка состояния и позиционный I/O.

use anyhow::{anyhow, Context, Result};
use byteorder::{ByteOrder, LittleEndian};
use log::{debug, info, warn};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::StoreConfig;
use crate::consts::{BLOCK_POINTER_SIZE, HEADER_FILL};

use super::free::FreeList;

/// Состояние машины Store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Файл не открыт (до open() или после close()).
    Init,
    /// Можно seek/read/release/alloc.
    Reading,
    /// Идёт запись записи: write()… end().
    Writing,
}

/// Блочное хранилище поверх одного scratch‑файла.
///
/// Offset'ы — непрозрачные хэндлы, выданные alloc(). После close() все они недействительны.
pub struct Store {
    pub(crate) path: PathBuf,
    pub(crate) cfg: StoreConfig,
    pub(crate) file: Option<File>,
    pub(crate) state: StoreState,

    /// Конец файла в блоках (отслеживается сами, без запросов позиции у ОС).
    pub(crate) front: u64,
    /// Текущая позиция курсора записи/чтения.
    pub(crate) cur: u64,
    pub(crate) free: FreeList,

    /// Кэш одного блока для чтения: (offset блока, байты).
    pub(crate) rcache: Option<(u64, Vec<u8>)>,

    // ----- counters -----
    pub(crate) blocks_written: u64,
    pub(crate) blocks_read: u64,
    pub(crate) allocs: u64,
    pub(crate) reused_blocks: u64,
}

impl Store {
    /// Создать (или обнулить) scratch‑файл с конфигурацией по умолчанию.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_config(path, StoreConfig::default())
    }

    /// Создать (или обнулить) scratch‑файл и записать заголовочный блок 0.
    pub fn open_with_config(path: &Path, cfg: StoreConfig) -> Result<Self> {
        cfg.validate()?;

        let mut f = OpenOptions::new()
            .create(true)
            .truncate(true)
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("create scratch file {}", path.display()))?;

        // Первый блок — заголовок, чтобы offset = 0 мог служить концом цепочки.
        let bs = cfg.block_size as usize;
        let mut hdr = Vec::with_capacity(bs);
        while hdr.len() < bs {
            hdr.extend_from_slice(HEADER_FILL);
        }
        f.write_all(&hdr)
            .with_context(|| format!("write header block to {}", path.display()))?;

        debug!("store: opened {} ({})", path.display(), cfg);

        Ok(Self {
            path: path.to_path_buf(),
            front: cfg.block_size,
            cur: cfg.block_size,
            cfg,
            file: Some(f),
            state: StoreState::Reading,
            free: FreeList::new(),
            rcache: None,
            blocks_written: 0,
            blocks_read: 0,
            allocs: 0,
            reused_blocks: 0,
        })
    }

    /// Сбросить и закрыть файл. Все ранее выданные offset'ы становятся недействительными.
    /// Повторный вызов — no‑op.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut f) = self.file.take() else {
            return Ok(());
        };
        if self.state == StoreState::Writing {
            warn!(
                "store: close() during an unfinished record write at off={} (record is lost)",
                self.cur
            );
        }
        f.flush()
            .with_context(|| format!("flush scratch file {}", self.path.display()))?;
        if self.cfg.sync_on_close {
            f.sync_all()
                .with_context(|| format!("fsync scratch file {}", self.path.display()))?;
        }
        drop(f);

        info!(
            "store: closed {}: block size {} bytes, total {} blocks, wrote {} blocks, read {} blocks",
            self.path.display(),
            self.cfg.block_size,
            self.front / self.cfg.block_size,
            self.blocks_written,
            self.blocks_read
        );

        self.free.clear();
        self.rcache = None;
        self.state = StoreState::Init;

        if self.cfg.remove_on_close {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("remove scratch file {}", self.path.display()))?;
        }
        Ok(())
    }

    // ----- accessors -----

    #[inline]
    pub fn state(&self) -> StoreState {
        self.state
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn config(&self) -> &StoreConfig {
        &self.cfg
    }

    #[inline]
    pub fn block_size(&self) -> u64 {
        self.cfg.block_size
    }

    /// Смещение, с которого начнётся следующий "свежий" блок.
    #[inline]
    pub fn front(&self) -> u64 {
        self.front
    }

    /// Первый блок данных (сразу после заголовка).
    #[inline]
    pub fn first_data_offset(&self) -> u64 {
        self.cfg.block_size
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    // ---------------- internal helpers ----------------

    /// Проверить состояние машины перед операцией `op`.
    pub(crate) fn expect_state(&self, want: StoreState, op: &str) -> Result<()> {
        if self.state != want {
            return Err(anyhow!(
                "invariant violation: store.{}() called in state {:?} (expected {:?})",
                op,
                self.state,
                want
            ));
        }
        Ok(())
    }

    /// Смещение внутри блока.
    #[inline]
    pub(crate) fn in_block(&self, off: u64) -> u64 {
        off & (self.cfg.block_size - 1)
    }

    #[inline]
    pub(crate) fn is_aligned(&self, off: u64) -> bool {
        self.in_block(off) == 0
    }

    /// Offset указателя "следующий блок" для блока `block`.
    #[inline]
    pub(crate) fn pointer_slot(&self, block: u64) -> u64 {
        block + self.cfg.block_size - BLOCK_POINTER_SIZE
    }

    pub(crate) fn file_mut(&mut self) -> Result<&mut File> {
        let path = &self.path;
        self.file
            .as_mut()
            .ok_or_else(|| anyhow!("scratch file {} is closed", path.display()))
    }

    pub(crate) fn write_at(&mut self, off: u64, bytes: &[u8]) -> Result<()> {
        let f = self.file_mut()?;
        f.seek(SeekFrom::Start(off))
            .with_context(|| format!("store: seek to off={} for write", off))?;
        f.write_all(bytes)
            .with_context(|| format!("store: write {} bytes at off={}", bytes.len(), off))?;
        Ok(())
    }

    pub(crate) fn read_at(&mut self, off: u64, buf: &mut [u8]) -> Result<()> {
        let f = self.file_mut()?;
        f.seek(SeekFrom::Start(off))
            .with_context(|| format!("store: seek to off={} for read", off))?;
        f.read_exact(buf)
            .with_context(|| format!("store: read {} bytes at off={}", buf.len(), off))?;
        Ok(())
    }

    /// Прочитать блок целиком через однослотовый кэш.
    pub(crate) fn cached_block(&mut self, block: u64) -> Result<&[u8]> {
        let hit = matches!(&self.rcache, Some((b, _)) if *b == block);
        if !hit {
            let mut buf = vec![0u8; self.cfg.block_size as usize];
            self.read_at(block, &mut buf)?;
            self.blocks_read += 1;
            self.rcache = Some((block, buf));
        }
        match &self.rcache {
            Some((_, buf)) => Ok(buf.as_slice()),
            None => Err(anyhow!("store: block cache unexpectedly empty")),
        }
    }

    /// Прочитать указатель "следующий блок" для блока `block`.
    pub(crate) fn next_pointer(&mut self, block: u64) -> Result<u64> {
        let slot = (self.pointer_slot(block) - block) as usize;
        let buf = self.cached_block(block)?;
        Ok(LittleEndian::read_u64(&buf[slot..slot + BLOCK_POINTER_SIZE as usize]))
    }

    /// Проверить, что указатель ссылается на валидный блок данных этого файла.
    pub(crate) fn check_block_ref(&self, off: u64, what: &str) -> Result<()> {
        if off < self.cfg.block_size || !self.is_aligned(off) || off >= self.front {
            return Err(anyhow!(
                "store: {} points to invalid block off={} (block_size={}, front={})",
                what,
                off,
                self.cfg.block_size,
                self.front
            ));
        }
        Ok(())
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("store: close on drop failed: {:#}", e);
        }
    }
}
