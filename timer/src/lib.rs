//! Периодический таймер ядра на основе
//! [Intel 8253/8254](https://en.wikipedia.org/wiki/Intel_8253)
//! ([programmable interval timer, PIT](https://en.wikipedia.org/wiki/Programmable_interval_timer)).
//!
//! Ведёт монотонный счётчик тиков, калибрует цикл активного ожидания
//! для задержек короче одного тика и предоставляет функции засыпания
//! поверх счётчика тиков.
//!
//! Планировщик, механизм диспетчеризации прерываний и само оборудование
//! являются внешними по отношению к библиотеке и подключаются через типажи
//! [`Scheduler`], [`Dispatcher`] и [`Cpu`] соответственно.

#![deny(warnings)]
#![no_std]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(missing_docs)]

/// Доступ к флагу разрешения прерываний и к
/// [портам ввода--вывода](https://wiki.osdev.org/Port_IO) процессора.
pub mod cpu;

/// Перечисление для возможных ошибок [`Error`] и соответствующий [`Result`].
pub mod error;

/// Поддержка журналирования макросами библиотеки [`tracing`].
pub mod log;

/// Интерфейс внешнего планировщика, которым пользуется таймер.
pub mod scheduler;

/// Примитив синхронизации [`IrqGuard`] между обычным кодом и обработчиком прерываний.
pub mod sync;

/// Здесь собраны счётчик тиков, калибровка задержек,
/// согласование засыпаний с обработчиком прерываний и драйвер PIT.
pub mod time;

/// Таймер [`Timer`], объединяющий все части подсистемы.
pub mod timer;

/// Интерфейс внешнего механизма диспетчеризации прерываний.
pub mod trap;

pub use cpu::Cpu;
pub use error::{
    Error,
    Result,
};
pub use scheduler::Scheduler;
pub use sync::IrqGuard;
pub use time::{
    Hz,
    RealTime,
    Wait,
};
pub use timer::Timer;
pub use trap::{
    Dispatcher,
    InterruptHandler,
};

#[cfg(target_arch = "x86_64")]
pub use cpu::X86;
