use core::result;

/// Перечисление для возможных ошибок.
///
/// Большинство нарушений контракта таймера фатальны и приводят к панике.
/// Ошибки этого типа возвращают только вспомогательные функции,
/// решение о фатальности которых принимает вызывающий.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// Задано недопустимое значение аргумента.
    InvalidArgument,

    /// Возникло переполнение.
    Overflow,
}

/// Тип возвращаемого результата `T` или ошибки [`Error`] ---
/// мономорфизация [`result::Result`] по типу ошибки.
pub type Result<T> = result::Result<T, Error>;
