#[cfg(target_arch = "x86_64")]
use x86::io;
#[cfg(target_arch = "x86_64")]
use x86_64::instructions::interrupts;

/// Процессор, на котором работает таймер.
///
/// Предоставляет единственный доступный таймеру примитив синхронизации ---
/// флаг разрешения прерываний, а также запись в
/// [порты ввода--вывода](https://wiki.osdev.org/Port_IO) для программирования PIT.
///
/// Флаг разрешения прерываний не является реентерабельным.
/// Поэтому код, которому нужно временно запретить прерывания,
/// должен запоминать и затем восстанавливать исходное состояние флага,
/// а не безусловно разрешать прерывания.
/// Это делает [`IrqGuard`](crate::IrqGuard).
pub trait Cpu: Sync {
    /// Возвращает `true`, если внешние прерывания разрешены.
    fn interrupts_enabled(&self) -> bool;

    /// Запрещает внешние прерывания.
    fn disable_interrupts(&self);

    /// Разрешает внешние прерывания.
    fn enable_interrupts(&self);

    /// Записывает байт `value` в порт ввода--вывода `port`.
    ///
    /// # Safety
    ///
    /// Запись в порт может изменить состояние оборудования произвольным образом.
    /// Вызывающий должен гарантировать, что `port` и `value` соответствуют
    /// протоколу подключённого к порту устройства.
    unsafe fn outb(
        &self,
        port: u16,
        value: u8,
    );
}

/// Процессор архитектуры
/// [x86-64](https://en.wikipedia.org/wiki/X86-64).
///
/// Флаг разрешения прерываний --- это бит `IF` регистра `RFLAGS`,
/// он управляется инструкциями
/// [`cli`](https://www.felixcloutier.com/x86/cli) и
/// [`sti`](https://www.felixcloutier.com/x86/sti).
/// Требует привилегированного режима работы.
#[cfg(target_arch = "x86_64")]
#[derive(Clone, Copy, Debug, Default)]
pub struct X86;

#[cfg(target_arch = "x86_64")]
impl Cpu for X86 {
    fn interrupts_enabled(&self) -> bool {
        interrupts::are_enabled()
    }

    fn disable_interrupts(&self) {
        interrupts::disable();
    }

    fn enable_interrupts(&self) {
        interrupts::enable();
    }

    unsafe fn outb(
        &self,
        port: u16,
        value: u8,
    ) {
        unsafe {
            io::outb(port, value);
        }
    }
}
