use core::sync::atomic::{
    Ordering,
    compiler_fence,
};

use crate::cpu::Cpu;

/// Критическая секция относительно обработчика прерываний на текущем процессоре.
///
/// - Запоминает состояние флага разрешения прерываний в момент создания.
/// - После чего запрещает прерывания.
/// - Автоматически возвращает флаг разрешения прерываний
///   в исходное состояние в реализации типажа [`Drop`].
///
/// Так как сохраняется и восстанавливается исходное состояние флага,
/// [`IrqGuard`] можно вкладывать друг в друга и создавать при уже запрещённых прерываниях.
///
/// На обеих границах критической секции стоит барьер компилятора,
/// чтобы обращения к разделяемым с обработчиком прерываний данным
/// не переносились через них.
pub struct IrqGuard<'a, C: Cpu> {
    /// Процессор, прерывания которого запрещены.
    cpu: &'a C,

    /// Были ли разрешены прерывания в момент создания [`IrqGuard`].
    were_enabled: bool,
}

impl<'a, C: Cpu> IrqGuard<'a, C> {
    /// Создаёт [`IrqGuard`].
    ///
    /// - Запоминает состояние флага разрешения прерываний в момент создания.
    /// - После чего запрещает прерывания.
    pub fn new(cpu: &'a C) -> Self {
        let were_enabled = cpu.interrupts_enabled();
        cpu.disable_interrupts();
        compiler_fence(Ordering::SeqCst);

        Self { cpu, were_enabled }
    }

    /// Возвращает `true`, если прерывания были разрешены в момент создания [`IrqGuard`].
    pub fn were_enabled(&self) -> bool {
        self.were_enabled
    }
}

impl<C: Cpu> Drop for IrqGuard<'_, C> {
    /// Вызывается при разрушении [`IrqGuard`].
    /// Возвращает флаг разрешения прерываний в исходное состояние,
    /// в котором он находился до создания этого [`IrqGuard`].
    fn drop(&mut self) {
        compiler_fence(Ordering::SeqCst);
        if self.were_enabled {
            self.cpu.enable_interrupts();
        }
        compiler_fence(Ordering::SeqCst);
    }
}
