//! store/free — in‑memory free‑лист блоков.
//!
//! Формат: стек offset'ов (LIFO). Голова списка — последний освобождённый блок,
//! именно он выдаётся первым при alloc()/продолжении цепочки.
//!
//! Не персистится: scratch‑файл живёт один запуск процесса.

/// Список освобождённых блоков, доступных для повторного использования.
#[derive(Debug, Default, Clone)]
pub struct FreeList {
    stack: Vec<u64>,
}

impl FreeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Положить блок в голову списка.
    #[inline]
    pub fn push(&mut self, off: u64) {
        self.stack.push(off);
    }

    /// Снять блок с головы списка. None, если список пуст.
    #[inline]
    pub fn pop(&mut self) -> Option<u64> {
        self.stack.pop()
    }

    /// Текущая голова (без извлечения).
    #[inline]
    pub fn head(&self) -> Option<u64> {
        self.stack.last().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Обход от головы к хвосту (порядок выдачи).
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.stack.iter().rev().copied()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifo_order() {
        let mut fl = FreeList::new();
        assert!(fl.pop().is_none());
        fl.push(512);
        fl.push(1024);
        fl.push(1536);
        assert_eq!(fl.head(), Some(1536));
        assert_eq!(fl.iter().collect::<Vec<_>>(), vec![1536, 1024, 512]);
        assert_eq!(fl.pop(), Some(1536));
        assert_eq!(fl.len(), 2);
        fl.clear();
        assert!(fl.is_empty());
    }
}
