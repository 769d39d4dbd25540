//! store — блочное хранилище scratch‑файла (один файл, блоки фиксированного размера, free‑лист).
//!
//! Подмодули:
//! - core.rs  — структура Store, open()/close(), машина состояний, низкоуровневый I/O.
//! - free.rs  — in‑memory free‑лист освобождённых блоков.
//! - alloc.rs — alloc()/release(): выдача блоков (free‑лист → front) и возврат цепочек.
//! - io.rs    — write()/end()/seek()/read(): запись и чтение записей по цепочке блоков.
//! - dump.rs  — диагностика: статистика, снимок free‑листа, hex‑дамп диапазона.
//!
//! Раскладка файла:
//! - блок 0 — заголовок (HEADER_FILL), поэтому offset 0 служит маркером конца цепочки;
//! - последние BLOCK_POINTER_SIZE байт каждого блока — указатель на следующий блок (u64 LE).
//!
//! Машина состояний: Init → Reading ⇄ Writing → (close) Init.
//! Вызов операции не в том состоянии — ошибка "invariant violation", Store не меняется.

pub mod core;
pub mod free;
pub mod alloc;
pub mod io;
pub mod dump;

pub use self::core::{Store, StoreState};
pub use dump::{hex_dump, StoreStats};
pub use free::FreeList;
