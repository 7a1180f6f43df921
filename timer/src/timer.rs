use core::sync::atomic::{
    AtomicBool,
    AtomicU32,
    Ordering,
};

use crate::{
    cpu::Cpu,
    log::info,
    scheduler::Scheduler,
    sync::IrqGuard,
    time::{
        Hz,
        MAX_FREQUENCY,
        MIN_FREQUENCY,
        RealTime,
        TIMER_FREQUENCY,
        TickClock,
        Wait,
        WakeGate,
        calibrator::{
            self,
            busy_wait,
        },
        pit8254,
    },
    trap::{
        Dispatcher,
        InterruptHandler,
        PIT_NAME,
        PIT_VECTOR,
    },
};

/// Периодический таймер с частотой тиков `FREQUENCY` Герц.
///
/// Владеет всем разделяемым состоянием подсистемы:
///   - счётчиком тиков [`TickClock`],
///   - порогом пробуждения [`WakeGate`],
///   - откалиброванным количеством итераций активного ожидания на тик.
///
/// Правила доступа:
///   - Счётчик тиков пишет только обработчик прерывания [`InterruptHandler::interrupt()`].
///   - Обычный код читает счётчик и порог, а также регистрирует засыпания
///     только при запрещённых через [`IrqGuard`] прерываниях.
///   - Количество итераций на тик записывается один раз в [`Timer::calibrate()`],
///     после чего только читается.
///
/// Частота проверяется на этапе компиляции:
/// создание [`Timer`] с `FREQUENCY` вне диапазона
/// [`MIN_FREQUENCY`]..=[`MAX_FREQUENCY`] не компилируется.
///
/// Конструктор [`Timer::new()`] константный,
/// поэтому таймер можно хранить в `static` и затем вызвать [`Timer::init()`].
///
/// ```rust
/// use timer::{
///     Cpu,
///     Scheduler,
///     Timer,
///     time::TIMER_FREQUENCY,
/// };
///
/// struct Uniprocessor;
///
/// impl Cpu for Uniprocessor {
///     fn interrupts_enabled(&self) -> bool {
///         false
///     }
///
///     fn disable_interrupts(&self) {}
///
///     fn enable_interrupts(&self) {}
///
///     unsafe fn outb(
///         &self,
///         _port: u16,
///         _value: u8,
///     ) {
///     }
/// }
///
/// struct Idle;
///
/// impl Scheduler for Idle {
///     fn tick(&self) {}
///
///     fn sleep_until(
///         &self,
///         _deadline: i64,
///     ) {
///     }
///
///     fn wake_up(
///         &self,
///         _now: i64,
///     ) -> Option<i64> {
///         None
///     }
/// }
///
/// static SLOWEST: Timer<Uniprocessor, Idle, 19> = Timer::new(Uniprocessor, Idle);
/// static FASTEST: Timer<Uniprocessor, Idle, 1_000> = Timer::new(Uniprocessor, Idle);
/// static DEFAULT: Timer<Uniprocessor, Idle> = Timer::new(Uniprocessor, Idle);
///
/// assert_eq!(SLOWEST.frequency(), 19);
/// assert_eq!(FASTEST.frequency(), 1_000);
/// assert_eq!(DEFAULT.frequency(), TIMER_FREQUENCY);
/// ```
///
/// Частота ниже [`MIN_FREQUENCY`]:
///
/// ```compile_fail
/// # use timer::{Cpu, Scheduler, Timer};
/// # struct Uniprocessor;
/// # impl Cpu for Uniprocessor {
/// #     fn interrupts_enabled(&self) -> bool { false }
/// #     fn disable_interrupts(&self) {}
/// #     fn enable_interrupts(&self) {}
/// #     unsafe fn outb(&self, _port: u16, _value: u8) {}
/// # }
/// # struct Idle;
/// # impl Scheduler for Idle {
/// #     fn tick(&self) {}
/// #     fn sleep_until(&self, _deadline: i64) {}
/// #     fn wake_up(&self, _now: i64) -> Option<i64> { None }
/// # }
/// let timer = Timer::<Uniprocessor, Idle, 18>::new(Uniprocessor, Idle);
/// assert_eq!(timer.frequency(), 18);
/// ```
///
/// Частота выше [`MAX_FREQUENCY`]:
///
/// ```compile_fail
/// # use timer::{Cpu, Scheduler, Timer};
/// # struct Uniprocessor;
/// # impl Cpu for Uniprocessor {
/// #     fn interrupts_enabled(&self) -> bool { false }
/// #     fn disable_interrupts(&self) {}
/// #     fn enable_interrupts(&self) {}
/// #     unsafe fn outb(&self, _port: u16, _value: u8) {}
/// # }
/// # struct Idle;
/// # impl Scheduler for Idle {
/// #     fn tick(&self) {}
/// #     fn sleep_until(&self, _deadline: i64) {}
/// #     fn wake_up(&self, _now: i64) -> Option<i64> { None }
/// # }
/// let timer = Timer::<Uniprocessor, Idle, 1_001>::new(Uniprocessor, Idle);
/// assert_eq!(timer.frequency(), 1_001);
/// ```
pub struct Timer<C, S, const FREQUENCY: u32 = TIMER_FREQUENCY> {
    /// Счётчик тиков.
    clock: TickClock,

    /// Порог пробуждения спящих потоков.
    gate: WakeGate,

    /// Количество итераций [`busy_wait()`], укладывающееся чуть меньше чем в тик.
    /// Ноль означает, что калибровка ещё не выполнялась.
    loops_per_tick: AtomicU32,

    /// Признак того, что [`Timer::init()`] уже вызывался.
    initialized: AtomicBool,

    /// Процессор, прерывания которого использует таймер.
    cpu: C,

    /// Внешний планировщик потоков.
    scheduler: S,
}

impl<C: Cpu, S: Scheduler, const FREQUENCY: u32> Timer<C, S, FREQUENCY> {
    /// Создаёт таймер, работающий на процессоре `cpu` с планировщиком `scheduler`.
    pub const fn new(
        cpu: C,
        scheduler: S,
    ) -> Self {
        const {
            assert!(
                MIN_FREQUENCY <= FREQUENCY && FREQUENCY <= MAX_FREQUENCY,
                "the 8254 timer supports tick frequencies from 19 to 1000 Hz",
            );
        }

        Self {
            clock: TickClock::new(),
            gate: WakeGate::new(),
            loops_per_tick: AtomicU32::new(0),
            initialized: AtomicBool::new(false),
            cpu,
            scheduler,
        }
    }

    /// Частота тиков в Герцах.
    pub const fn frequency(&self) -> u32 {
        FREQUENCY
    }

    /// Программирует PIT на частоту `FREQUENCY` и
    /// регистрирует обработчик его прерывания в `dispatcher`.
    ///
    /// Должна вызываться ровно один раз, до глобального разрешения прерываний.
    pub fn init(
        &'static self,
        dispatcher: &impl Dispatcher,
    ) where
        C: 'static,
        S: 'static,
    {
        assert!(
            !self.initialized.swap(true, Ordering::Relaxed),
            "the timer is already initialized",
        );

        let divisor = pit8254::init(&self.cpu, FREQUENCY);
        dispatcher.register(PIT_VECTOR, PIT_NAME, self);

        info!(frequency = %Hz::new(FREQUENCY.into()), divisor, "timer init");
    }

    /// Калибрует количество итераций [`busy_wait()`] на один тик
    /// для задержек короче тика.
    ///
    /// Требует разрешённых прерываний и того, чтобы во время калибровки
    /// на процессоре не выполнялось никакой другой нагрузки.
    /// Должна вызываться ровно один раз.
    /// Любая ошибка калибровки фатальна.
    pub fn calibrate(&self) {
        assert!(
            self.cpu.interrupts_enabled(),
            "timer calibration requires enabled interrupts",
        );

        assert!(
            self.loops_per_tick().is_none(),
            "the timer is already calibrated",
        );

        info!("calibrating timer");

        let loops_per_tick = match calibrator::calibrate(&self.clock) {
            Ok(loops_per_tick) if loops_per_tick != 0 => loops_per_tick,
            result => panic!("timer calibration failed: {result:?}"),
        };

        assert!(
            self.loops_per_tick
                .compare_exchange(0, loops_per_tick, Ordering::Release, Ordering::Relaxed)
                .is_ok(),
            "the timer is already calibrated",
        );

        let loops_per_second = u64::from(loops_per_tick) * u64::from(FREQUENCY);
        info!(loops_per_tick, loops_per_second, "timer calibrated");
    }

    /// Откалиброванное количество итераций активного ожидания на тик
    /// или [`None`], если калибровка ещё не выполнялась.
    pub fn loops_per_tick(&self) -> Option<u32> {
        let loops_per_tick = self.loops_per_tick.load(Ordering::Acquire);
        (loops_per_tick != 0).then_some(loops_per_tick)
    }

    /// Возвращает количество тиков с момента загрузки.
    pub fn now(&self) -> i64 {
        self.clock.now(&self.cpu)
    }

    /// Возвращает количество тиков, прошедших с момента `since`,
    /// который должен быть когда-то возвращён [`Timer::now()`].
    pub fn elapsed(
        &self,
        since: i64,
    ) -> i64 {
        self.clock.elapsed(&self.cpu, since)
    }

    /// Порог пробуждения --- наименьший срок среди спящих потоков,
    /// или [`None`], если спящих потоков нет.
    pub fn watermark(&self) -> Option<i64> {
        self.gate.watermark(&self.cpu)
    }

    /// Усыпляет текущий поток примерно на `ticks` тиков,
    /// уступая процессор другим потокам.
    ///
    /// При `ticks <= 0` возвращается сразу.
    /// Срок, не помещающийся в [`i64`], насыщается до [`i64::MAX`],
    /// то есть поток спит бесконечно.
    /// Требует разрешённых прерываний, иначе поток никогда не проснулся бы.
    pub fn sleep(
        &self,
        ticks: i64,
    ) {
        assert!(
            self.cpu.interrupts_enabled(),
            "sleeping requires enabled interrupts",
        );

        if ticks <= 0 {
            return;
        }

        let guard = IrqGuard::new(&self.cpu);
        let deadline = self.clock.load().saturating_add(ticks);
        self.gate.register(guard, deadline, &self.scheduler);
    }

    /// Приостанавливает выполнение примерно на `ms` миллисекунд.
    pub fn msleep(
        &self,
        ms: i64,
    ) {
        self.real_time_sleep(RealTime::ms(ms));
    }

    /// Приостанавливает выполнение примерно на `us` микросекунд.
    pub fn usleep(
        &self,
        us: i64,
    ) {
        self.real_time_sleep(RealTime::us(us));
    }

    /// Приостанавливает выполнение примерно на `ns` наносекунд.
    pub fn nsleep(
        &self,
        ns: i64,
    ) {
        self.real_time_sleep(RealTime::ns(ns));
    }

    /// Приостанавливает выполнение примерно на `duration`.
    ///
    /// Если `duration` составляет хотя бы один тик, усыпляет поток через [`Timer::sleep()`].
    /// Иначе ждёт в цикле [`busy_wait()`], что требует выполненной калибровки.
    pub fn real_time_sleep(
        &self,
        duration: RealTime,
    ) {
        assert!(
            self.cpu.interrupts_enabled(),
            "sleeping requires enabled interrupts",
        );

        match duration.wait(FREQUENCY, self.loops_per_tick.load(Ordering::Acquire)) {
            Wait::Sleep(ticks) => self.sleep(ticks),
            Wait::Spin(loops) => {
                assert!(
                    self.loops_per_tick().is_some(),
                    "the timer is not calibrated",
                );
                busy_wait(loops);
            },
        }
    }

    /// Записывает в журнал статистику таймера.
    pub fn print_stats(&self) {
        info!(ticks = self.now(), "timer statistics");
    }

    /// Счётчик тиков.
    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    /// Процессор, прерывания которого использует таймер.
    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    /// Внешний планировщик потоков.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

impl<C: Cpu, S: Scheduler, const FREQUENCY: u32> InterruptHandler for Timer<C, S, FREQUENCY> {
    /// Обработчик прерывания таймера.
    ///
    /// Увеличивает счётчик тиков, сообщает о тике планировщику
    /// и будит спящие потоки, если достигнут порог пробуждения.
    fn interrupt(&self) {
        let now = self.clock.inc();
        self.scheduler.tick();
        self.gate.check(now, &self.scheduler);
    }
}
