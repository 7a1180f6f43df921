use core::sync::atomic::{
    AtomicI64,
    Ordering,
};

use crate::{
    cpu::Cpu,
    sync::IrqGuard,
};

/// Монотонный счётчик тиков таймера.
///
/// Единственный писатель --- обработчик прерывания таймера,
/// который увеличивает счётчик ровно на единицу на каждое прерывание.
/// Обычный код читает счётчик методом [`TickClock::now()`]
/// при запрещённых прерываниях.
///
/// 64-битный счётчик на практике не переполняется:
/// при частоте 1000 Гц на это потребовались бы сотни миллионов лет.
#[derive(Debug, Default)]
pub struct TickClock {
    /// Количество тиков с момента загрузки.
    ticks: AtomicI64,
}

impl TickClock {
    /// Создаёт счётчик со значением `0`.
    pub const fn new() -> Self {
        Self {
            ticks: AtomicI64::new(0),
        }
    }

    /// Возвращает количество тиков с момента загрузки.
    ///
    /// Читает счётчик при запрещённых прерываниях процессора `cpu`,
    /// после чего восстанавливает исходное состояние флага прерываний.
    pub fn now<C: Cpu>(
        &self,
        cpu: &C,
    ) -> i64 {
        let _guard = IrqGuard::new(cpu);
        self.load()
    }

    /// Возвращает количество тиков, прошедших с момента `since`,
    /// который должен быть когда-то возвращён [`TickClock::now()`].
    pub fn elapsed<C: Cpu>(
        &self,
        cpu: &C,
        since: i64,
    ) -> i64 {
        self.now(cpu) - since
    }

    /// Читает счётчик, не запрещая прерываний.
    ///
    /// Подходит для кода, который уже работает при запрещённых прерываниях,
    /// и для ожидания смены тика.
    pub(crate) fn load(&self) -> i64 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Увеличивает счётчик на единицу и возвращает новое значение.
    ///
    /// Вызывается только из обработчика прерывания таймера.
    pub(crate) fn inc(&self) -> i64 {
        self.ticks.fetch_add(1, Ordering::Release) + 1
    }
}
