/// Калибровка цикла активного ожидания для задержек короче одного тика.
pub mod calibrator;

/// Монотонный счётчик тиков [`TickClock`].
pub mod clock;

/// Перевод длительности [`RealTime`] в способ ожидания [`Wait`].
pub mod delay;

/// Вспомогательная структура [`Hz`] для форматирования
/// [частоты](https://en.wikipedia.org/wiki/Hertz) при журналировании.
mod hz;

/// Устаревший
/// [программируемый таймер](https://en.wikipedia.org/wiki/Programmable_interval_timer)
/// [Intel 8253/8254](https://en.wikipedia.org/wiki/Intel_8253).
pub mod pit8254;

/// Согласование засыпающих потоков с обработчиком прерываний таймера, [`WakeGate`].
pub mod wake_gate;

use static_assertions::const_assert;

pub use calibrator::LoopProbe;
pub use clock::TickClock;
pub use delay::{
    RealTime,
    Wait,
};
pub use hz::Hz;
pub use wake_gate::WakeGate;

/// Минимальная частота тиков, которую может обеспечить PIT.
/// При меньшей частоте делитель не помещается в 16 бит.
pub const MIN_FREQUENCY: u32 = 19;

/// Максимальная разумная частота тиков.
/// При большей частоте на обработку прерываний уходит заметная доля времени процессора.
pub const MAX_FREQUENCY: u32 = 1_000;

/// Частота тиков по умолчанию.
pub const TIMER_FREQUENCY: u32 = 100;

const_assert!(MIN_FREQUENCY <= TIMER_FREQUENCY && TIMER_FREQUENCY <= MAX_FREQUENCY);

// ANCHOR: scale
/// Количество миллисекунд в одной секунде.
pub const MSECS_PER_SEC: i64 = 1_000;

/// Количество микросекунд в одной секунде.
pub const USECS_PER_SEC: i64 = 1_000_000;

/// Количество наносекунд в одной секунде.
pub const NSECS_PER_SEC: i64 = 1_000_000_000;
// ANCHOR_END: scale
