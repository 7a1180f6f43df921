#![allow(clippy::unusual_byte_groupings)]

use bitflags::bitflags;

use crate::cpu::Cpu;

/// Базовая частота PIT в герцах, из документации.
pub const BASE: u32 = 2 * 2 * 5 * 59659;

/// Регистр команды.
pub const COMMAND_WORD_REGISTER: u16 = 0x43;

/// Регистр счётчика номер `0` таймера.
pub const COUNTER_NUMBER_0_REGISTER: u16 = 0x40;

/// Делитель базовой частоты PIT для частоты тиков `frequency`,
/// округлённый до ближайшего целого.
///
/// Паникует, если делитель не помещается в 16-битный счётчик PIT.
/// В константном контексте это означает ошибку компиляции.
pub const fn divisor(frequency: u32) -> u16 {
    assert!(frequency > 0);

    let divisor = (BASE + frequency / 2) / frequency;
    assert!(divisor <= u16::MAX as u32, "PIT divisor does not fit into 16 bits");

    divisor as u16
}

/// Командное слово, которым таймер переводится в режим периодических прерываний.
pub fn command_word() -> u8 {
    let command_word = !CommandWord::BINARY_CODED_DECIMAL &
        (CommandWord::COUNTER_NUMBER_0 |
            CommandWord::LSB_THAN_MSB |
            CommandWord::RATE_GENERATOR);

    command_word.bits()
}

/// Программирует счётчик номер `0` таймера на частоту тиков `frequency`.
/// Возвращает записанный в таймер делитель.
pub(crate) fn init<C: Cpu>(
    cpu: &C,
    frequency: u32,
) -> u16 {
    let divisor = divisor(frequency);
    let [low, high] = divisor.to_le_bytes();

    unsafe {
        cpu.outb(COMMAND_WORD_REGISTER, command_word());
        cpu.outb(COUNTER_NUMBER_0_REGISTER, low);
        cpu.outb(COUNTER_NUMBER_0_REGISTER, high);
    }

    divisor
}

bitflags! {
    /// Параметры настроек таймера
    /// [Intel 8253/8254](https://en.wikipedia.org/wiki/Intel_8253).
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    struct CommandWord: u8 {
        /// Выбрать счётчик номер `0` таймера.
        const COUNTER_NUMBER_0 = 0b_00 << 6;

        /// Первым передаётся младший байт делителя, затем старший.
        const LSB_THAN_MSB = 0b_11 << 4;

        /// Режим 2 --- генератор частоты.
        /// Счётчик циклически отсчитывает делитель и на каждом цикле выдаёт прерывание.
        const RATE_GENERATOR = 0b_010 << 1;

        /// Использовать
        /// [двоично--десятичный](https://en.wikipedia.org/wiki/Binary-coded_decimal)
        /// формат.
        const BINARY_CODED_DECIMAL = 0b_1 << 0;
    }
}
