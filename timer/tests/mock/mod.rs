#![allow(dead_code)]

use std::{
    cell::Cell,
    sync::{
        Mutex,
        atomic::{
            AtomicBool,
            AtomicUsize,
            Ordering,
        },
    },
    thread,
    time::Duration,
};

use timer::{
    Cpu,
    Dispatcher,
    InterruptHandler,
    Scheduler,
    Timer,
};

pub type MockTimer<const FREQUENCY: u32> = Timer<MockCpu, MockScheduler, FREQUENCY>;

/// Creates a leaked timer, as the kernel would keep it in a `static`.
pub fn timer<const FREQUENCY: u32>() -> &'static MockTimer<FREQUENCY> {
    let timer: MockTimer<FREQUENCY> = Timer::new(MockCpu::default(), MockScheduler::default());
    Box::leak(Box::new(timer))
}

/// Delivers `count` timer interrupts the way the hardware would:
/// with interrupts masked on the current thread for the duration of the handler.
pub fn deliver_ticks(
    handler: &dyn InterruptHandler,
    count: usize,
) {
    for _ in 0 .. count {
        let were_enabled = interrupts_enabled();
        set_interrupts(false);
        handler.interrupt();
        set_interrupts(were_enabled);
    }
}

/// Calibrates `timer` while a separate thread delivers a tick every [`TICK`].
pub fn calibrate<const FREQUENCY: u32>(timer: &'static MockTimer<FREQUENCY>) {
    let run = AtomicBool::new(true);

    thread::scope(|scope| {
        thread::Builder::new()
            .name("ticker".to_string())
            .spawn_scoped(scope, || ticker(timer, &run))
            .unwrap();

        let _stop = Stop(&run);
        timer.cpu().enable_interrupts();
        timer.calibrate();
    });
}

/// Delivers a tick every [`TICK`] until `run` is cleared.
pub fn ticker(
    handler: &dyn InterruptHandler,
    run: &AtomicBool,
) {
    while run.load(Ordering::Relaxed) {
        thread::sleep(TICK);
        deliver_ticks(handler, 1);
    }
}

/// Clears the flag on drop, so that the ticker stops even if the test panics.
pub struct Stop<'a>(pub &'a AtomicBool);

impl Drop for Stop<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

pub const TICK: Duration = Duration::from_millis(1);

thread_local! {
    /// Every test thread behaves as a separate CPU which starts with interrupts disabled.
    static INTERRUPTS_ENABLED: Cell<bool> = const { Cell::new(false) };
}

pub fn interrupts_enabled() -> bool {
    INTERRUPTS_ENABLED.with(Cell::get)
}

fn set_interrupts(enabled: bool) {
    INTERRUPTS_ENABLED.with(|flag| flag.set(enabled));
}

#[derive(Debug, Default)]
pub struct MockCpu {
    ports: Mutex<Vec<(u16, u8)>>,
}

impl MockCpu {
    pub fn port_writes(&self) -> Vec<(u16, u8)> {
        self.ports.lock().unwrap().clone()
    }
}

impl Cpu for MockCpu {
    fn interrupts_enabled(&self) -> bool {
        interrupts_enabled()
    }

    fn disable_interrupts(&self) {
        set_interrupts(false);
    }

    fn enable_interrupts(&self) {
        set_interrupts(true);
    }

    unsafe fn outb(
        &self,
        port: u16,
        value: u8,
    ) {
        self.ports.lock().unwrap().push((port, value));
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Registration {
    pub deadline: i64,
    pub interrupts_enabled: bool,
}

/// Keeps deadlines of "sleeping" threads without blocking anybody.
#[derive(Debug, Default)]
pub struct MockScheduler {
    ticks: AtomicUsize,
    registrations: Mutex<Vec<Registration>>,
    sleeping: Mutex<Vec<i64>>,
    sweeps: Mutex<Vec<i64>>,
}

impl MockScheduler {
    pub fn ticks(&self) -> usize {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn registrations(&self) -> Vec<Registration> {
        self.registrations.lock().unwrap().clone()
    }

    pub fn deadlines(&self) -> Vec<i64> {
        self.registrations().iter().map(|registration| registration.deadline).collect()
    }

    pub fn sleeping(&self) -> Vec<i64> {
        self.sleeping.lock().unwrap().clone()
    }

    pub fn sweeps(&self) -> Vec<i64> {
        self.sweeps.lock().unwrap().clone()
    }
}

impl Scheduler for MockScheduler {
    fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    fn sleep_until(
        &self,
        deadline: i64,
    ) {
        self.registrations.lock().unwrap().push(Registration {
            deadline,
            interrupts_enabled: interrupts_enabled(),
        });
        self.sleeping.lock().unwrap().push(deadline);
    }

    fn wake_up(
        &self,
        now: i64,
    ) -> Option<i64> {
        self.sweeps.lock().unwrap().push(now);

        let mut sleeping = self.sleeping.lock().unwrap();
        sleeping.retain(|&deadline| deadline > now);
        sleeping.iter().copied().min()
    }
}

#[derive(Default)]
pub struct MockDispatcher {
    handlers: Mutex<Vec<(u8, &'static str, &'static dyn InterruptHandler)>>,
}

impl MockDispatcher {
    pub fn vectors(&self) -> Vec<(u8, &'static str)> {
        self.handlers.lock().unwrap().iter().map(|&(vector, name, _)| (vector, name)).collect()
    }

    /// Raises interrupt `vector` `count` times.
    pub fn fire(
        &self,
        vector: u8,
        count: usize,
    ) {
        let handler = self
            .handlers
            .lock()
            .unwrap()
            .iter()
            .find(|&&(registered, _, _)| registered == vector)
            .map(|&(_, _, handler)| handler)
            .expect("no handler for the vector");

        deliver_ticks(handler, count);
    }
}

impl Dispatcher for MockDispatcher {
    fn register(
        &self,
        vector: u8,
        name: &'static str,
        handler: &'static dyn InterruptHandler,
    ) {
        self.handlers.lock().unwrap().push((vector, name, handler));
    }
}
