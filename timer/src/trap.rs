/// Номер вектора прерывания таймера.
///
/// Первое прерывание [PIC 8259](https://en.wikipedia.org/wiki/Intel_8259)
/// после переназначения его входов за пределы исключений процессора.
pub const PIT_VECTOR: u8 = 0x20;

/// Имя прерывания таймера для статистики и журнала.
pub const PIT_NAME: &str = "8254 Timer";

/// Обработчик внешнего прерывания.
pub trait InterruptHandler: Sync {
    /// Обрабатывает прерывание.
    ///
    /// Вызывается механизмом диспетчеризации при уже запрещённых прерываниях.
    /// Не может быть повторно вызван, пока не завершится.
    /// Не должен блокироваться, выделять память
    /// или вызывать что-либо, что может усыпить поток.
    fn interrupt(&self);
}

/// Внешний механизм диспетчеризации прерываний.
pub trait Dispatcher {
    /// Связывает вектор прерывания `vector` с обработчиком `handler`.
    /// Имя `name` используется для статистики и журнала.
    fn register(
        &self,
        vector: u8,
        name: &'static str,
        handler: &'static dyn InterruptHandler,
    );
}
