//! Общие константы форматов (scratch‑файл, блоки, записи Entry).

// -------- Blocks --------
/// Канонический размер блока scratch‑файла (байт). Должен быть степенью двойки.
pub const BLOCK_SIZE: u64 = 512;

/// Размер указателя "следующий блок" в хвосте каждого блока (u64 LE).
pub const BLOCK_POINTER_SIZE: u64 = 8;

/// Конец цепочки. Блок 0 — заголовок, поэтому 0 никогда не бывает валидным блоком данных.
pub const END_OF_CHAIN: u64 = 0;

/// Заполнитель payload заголовочного блока 0 (повторяется до конца блока).
pub const HEADER_FILL: &[u8; 8] = b"TEMP_XX\0";

/// Имя scratch‑файла по умолчанию (внутри временного каталога).
pub const DEFAULT_SCRATCH_FILE: &str = "entrydb.scratch";

// -------- Records --------
/// Магия перед каждой записью Entry: 'D','O','X','!' (big‑endian u32).
pub const ENTRY_MAGIC: u32 = u32::from_be_bytes(*b"DOX!");

/// Значение счётчика списка, означающее "список отсутствует" (а не "пустой").
pub const NULL_LIST: u32 = 0xFFFF_FFFF;

/// Верхняя граница правдоподобного счётчика элементов списка при декодировании.
pub const MAX_LIST_COUNT: u32 = 1_000_000;

/// Ширина набора trait‑флагов (бит).
pub const TRAITS_WIDTH: usize = 64;
