use core::{
    hint,
    sync::atomic::{
        Ordering,
        compiler_fence,
    },
};

use crate::{
    error::{
        Error::Overflow,
        Result,
    },
    log::debug,
};

use super::TickClock;

/// Начальное количество итераций, с которого начинается калибровка.
pub const INITIAL_LOOPS: u32 = 1 << 10;

/// Количество младших битов, уточняемых после старшего.
/// Вместе со старшим битом дают 11 значащих битов результата.
pub const REFINEMENT_BITS: u32 = 10;

/// Измеритель, сообщающий укладывается ли заданное количество итераций
/// [`busy_wait()`] в один тик.
pub trait LoopProbe {
    /// Возвращает `true`, если `loops` итераций [`busy_wait()`]
    /// заняли как минимум один полный тик.
    fn too_many_loops(
        &self,
        loops: u32,
    ) -> bool;
}

/// Находит количество итераций [`busy_wait()`], которое укладывается
/// чуть меньше чем в один тик по мнению `probe`.
///
/// - Сначала удваивает [`INITIAL_LOOPS`], пока удвоенное значение укладывается в тик.
///   Так находится старший бит результата.
/// - Затем для каждого из [`REFINEMENT_BITS`] следующих битов пробует
///   добавить его к накопленному значению и оставляет,
///   если результат всё ещё укладывается в тик.
///
/// Результат не меньше [`INITIAL_LOOPS`].
/// Возвращает ошибку [`Overflow`], если искомое значение не помещается в [`u32`].
pub fn calibrate(probe: &impl LoopProbe) -> Result<u32> {
    let mut loops_per_tick = INITIAL_LOOPS;

    loop {
        let doubled = loops_per_tick.checked_mul(2).ok_or(Overflow)?;
        if probe.too_many_loops(doubled) {
            break;
        }
        loops_per_tick = doubled;
    }

    let high_bit = loops_per_tick;
    debug!(high_bit, "timer calibration");

    for shift in 1 ..= REFINEMENT_BITS {
        let candidate = loops_per_tick | (high_bit >> shift);
        if !probe.too_many_loops(candidate) {
            loops_per_tick = candidate;
        }
    }

    Ok(loops_per_tick)
}

/// Крутится в пустом цикле `loops` итераций.
///
/// Запрещает встраивание, так как от выравнивания кода заметно зависит время итерации.
/// Если бы функция встраивалась по-разному в разных местах,
/// откалиброванное количество итераций не соответствовало бы реальным задержкам.
/// Счётчик цикла проходит через [`hint::black_box()`],
/// поэтому компилятор не может ни выбросить цикл, ни свернуть его.
#[inline(never)]
pub fn busy_wait(loops: i64) {
    let mut loops = loops;
    while hint::black_box(loops) > 0 {
        loops -= 1;
    }
}

impl LoopProbe for TickClock {
    /// Сначала дожидается смены тика, чтобы начать измерение на его границе.
    /// Иначе в измерение попала бы случайная часть тика,
    /// прошедшая до вызова [`LoopProbe::too_many_loops()`].
    fn too_many_loops(
        &self,
        loops: u32,
    ) -> bool {
        let start = self.load();
        while self.load() == start {
            hint::spin_loop();
        }

        let start = self.load();
        busy_wait(loops.into());
        compiler_fence(Ordering::SeqCst);

        start != self.load()
    }
}
