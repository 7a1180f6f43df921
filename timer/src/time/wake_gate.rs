use core::sync::atomic::{
    AtomicI64,
    Ordering,
};

use crate::{
    cpu::Cpu,
    log::trace,
    scheduler::Scheduler,
    sync::IrqGuard,
};

/// Значение порога, означающее, что спящих потоков нет.
pub const NO_PENDING_WAKE: i64 = i64::MAX;

/// Порог пробуждения --- наименьший срок среди спящих потоков.
///
/// Позволяет обработчику прерывания таймера на каждом тике
/// одним сравнением решить, пора ли кого-нибудь будить,
/// не перебирая всех спящих потоков.
///
/// Порог никогда не превышает срока пробуждения ни одного спящего потока:
///   - [`WakeGate::register()`] понижает его до срока нового потока;
///   - [`WakeGate::check()`] заменяет его на значение,
///     которое вернул [`Scheduler::wake_up()`] после того, как разбудил всех, кому пора.
///
/// Обычный код изменяет порог только при запрещённых прерываниях,
/// а обработчик прерывания не может прервать сам себя.
/// Поэтому обновления порога из разных контекстов не перемешиваются.
#[derive(Debug)]
pub struct WakeGate {
    /// Порог пробуждения или [`NO_PENDING_WAKE`].
    earliest: AtomicI64,
}

impl WakeGate {
    /// Создаёт порог без спящих потоков.
    pub const fn new() -> Self {
        Self {
            earliest: AtomicI64::new(NO_PENDING_WAKE),
        }
    }

    /// Регистрирует засыпание текущего потока до тика `deadline`.
    ///
    /// Принимает `guard` по значению как доказательство того,
    /// что прерывания запрещены с момента вычисления `deadline`.
    /// Иначе тик, пришедший между вычислением срока и его регистрацией,
    /// не увидел бы нового порога.
    ///
    /// Понижает порог до `deadline` и передаёт поток планировщику `scheduler`.
    /// После пробуждения потока восстанавливает исходное состояние флага прерываний.
    pub fn register<C: Cpu, S: Scheduler>(
        &self,
        guard: IrqGuard<'_, C>,
        deadline: i64,
        scheduler: &S,
    ) {
        self.earliest.fetch_min(deadline, Ordering::Relaxed);
        scheduler.sleep_until(deadline);
        drop(guard);
    }

    /// Проверка, которую обработчик прерывания выполняет на тике `now`.
    ///
    /// Если порог достигнут, вызывает [`Scheduler::wake_up()`]
    /// и запоминает возвращённый им новый порог.
    /// Возвращает `true`, если вызов состоялся.
    pub fn check<S: Scheduler>(
        &self,
        now: i64,
        scheduler: &S,
    ) -> bool {
        if now < self.earliest.load(Ordering::Relaxed) {
            return false;
        }

        let next = scheduler.wake_up(now);
        debug_assert!(
            next.is_none_or(|next| next > now),
            "the scheduler left a due thread asleep",
        );
        self.earliest.store(next.unwrap_or(NO_PENDING_WAKE), Ordering::Relaxed);

        trace!(now, ?next, "wake up");

        true
    }

    /// Возвращает порог пробуждения или [`None`], если спящих потоков нет.
    ///
    /// Читает порог при запрещённых прерываниях процессора `cpu`.
    pub fn watermark<C: Cpu>(
        &self,
        cpu: &C,
    ) -> Option<i64> {
        let earliest = {
            let _guard = IrqGuard::new(cpu);
            self.earliest.load(Ordering::Relaxed)
        };

        (earliest != NO_PENDING_WAKE).then_some(earliest)
    }
}

impl Default for WakeGate {
    fn default() -> Self {
        Self::new()
    }
}
