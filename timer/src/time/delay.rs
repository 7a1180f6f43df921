use crate::error::{
    Error::InvalidArgument,
    Result,
};

use super::{
    MSECS_PER_SEC,
    NSECS_PER_SEC,
    USECS_PER_SEC,
};

/// Длительность в `numerator / denominator` секунд.
///
/// Знаменатель всегда положителен и кратен `1000`.
/// Это позволяет при вычислении задержки активным ожиданием
/// сократить числитель и знаменатель на `1000` и не переполниться.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RealTime {
    /// Числитель.
    numerator: i64,

    /// Знаменатель, положительный и кратный `1000`.
    denominator: i64,
}

/// Способ подождать заданную [`RealTime`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Wait {
    /// Уснуть на заданное количество тиков, уступив процессор другим потокам.
    Sleep(i64),

    /// Выполнить заданное количество итераций активного ожидания.
    Spin(i64),
}

impl RealTime {
    /// Возвращает длительность `numerator / denominator` секунд.
    ///
    /// Возвращает ошибку [`InvalidArgument`],
    /// если `denominator` не положителен или не кратен `1000`.
    pub fn new(
        numerator: i64,
        denominator: i64,
    ) -> Result<Self> {
        if denominator <= 0 || denominator % 1_000 != 0 {
            return Err(InvalidArgument);
        }

        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Длительность в `ms` миллисекунд.
    pub const fn ms(ms: i64) -> Self {
        Self {
            numerator: ms,
            denominator: MSECS_PER_SEC,
        }
    }

    /// Длительность в `us` микросекунд.
    pub const fn us(us: i64) -> Self {
        Self {
            numerator: us,
            denominator: USECS_PER_SEC,
        }
    }

    /// Длительность в `ns` наносекунд.
    pub const fn ns(ns: i64) -> Self {
        Self {
            numerator: ns,
            denominator: NSECS_PER_SEC,
        }
    }

    /// Числитель.
    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    /// Знаменатель.
    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    /// Количество целых тиков частоты `frequency` в этой длительности,
    /// с округлением к нулю.
    ///
    /// ```text
    /// (numerator / denominator) s
    /// --------------------------- = numerator * frequency / denominator ticks
    ///    (1 / frequency) s
    /// ```
    ///
    /// Вычисляется в [`i128`] без потери точности.
    /// Если результат не помещается в [`i64`], он насыщается до ближайшей границы.
    pub fn ticks(
        &self,
        frequency: u32,
    ) -> i64 {
        saturate(i128::from(self.numerator) * i128::from(frequency) / i128::from(self.denominator))
    }

    /// Количество итераций активного ожидания для этой длительности,
    /// если в один тик частоты `frequency` укладывается `loops_per_tick` итераций.
    ///
    /// Порядок операций менять нельзя.
    /// Деление на `1000` сразу после первого умножения и
    /// деление на сокращённый знаменатель в самом конце
    /// ограничивают ошибку округления.
    ///
    /// Промежуточные значения вычисляются в [`i128`] и поэтому не переполняются
    /// ни при каком числителе.
    /// Результат насыщается до границ [`i64`].
    pub fn spin_loops(
        &self,
        loops_per_tick: u32,
        frequency: u32,
    ) -> i64 {
        saturate(
            i128::from(loops_per_tick) * i128::from(self.numerator) / 1_000 *
                i128::from(frequency) /
                i128::from(self.denominator / 1_000),
        )
    }

    /// Выбирает способ подождать эту длительность.
    ///
    /// Если длительность составляет хотя бы один целый тик частоты `frequency`,
    /// возвращает [`Wait::Sleep`], так как ожидание может быть долгим
    /// и процессор нужно уступить другим потокам.
    /// Иначе возвращает [`Wait::Spin`] с количеством итераций,
    /// вычисленным по `loops_per_tick`.
    pub fn wait(
        &self,
        frequency: u32,
        loops_per_tick: u32,
    ) -> Wait {
        let ticks = self.ticks(frequency);

        if ticks > 0 {
            Wait::Sleep(ticks)
        } else {
            Wait::Spin(self.spin_loops(loops_per_tick, frequency))
        }
    }
}

/// Приводит `value` к [`i64`], насыщая его до ближайшей границы диапазона.
fn saturate(value: i128) -> i64 {
    value.clamp(i64::MIN.into(), i64::MAX.into()) as i64
}
