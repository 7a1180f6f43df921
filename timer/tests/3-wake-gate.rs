#![deny(warnings)]

use std::time::Duration;

use rstest::rstest;

use timer::{
    Cpu,
    IrqGuard,
    time::WakeGate,
};

use mock::{
    MockCpu,
    MockScheduler,
    Registration,
    deliver_ticks,
};

mod log;
mod mock;

#[rstest]
#[timeout(Duration::from_secs(1))]
fn wake_up_on_deadline() {
    let timer = mock::timer::<100>();
    timer.cpu().enable_interrupts();

    deliver_ticks(timer, 250);
    assert_eq!(timer.now(), 250);
    assert_eq!(timer.elapsed(0), 250);
    assert_eq!(timer.watermark(), None);

    timer.sleep(50);

    let scheduler = timer.scheduler();
    assert_eq!(scheduler.deadlines(), [300]);
    assert_eq!(timer.watermark(), Some(300));

    for _ in 251 .. 300 {
        deliver_ticks(timer, 1);
        assert!(scheduler.sweeps().is_empty(), "woke up at {}", timer.now());
    }

    deliver_ticks(timer, 1);
    assert_eq!(timer.now(), 300);
    assert_eq!(scheduler.sweeps(), [300]);
    assert!(scheduler.sleeping().is_empty());
    assert_eq!(timer.watermark(), None);

    deliver_ticks(timer, 100);
    assert_eq!(scheduler.sweeps(), [300]);
}

#[rstest]
#[timeout(Duration::from_secs(1))]
fn watermark_is_the_earliest_deadline() {
    let timer = mock::timer::<100>();
    let scheduler = timer.scheduler();
    timer.cpu().enable_interrupts();

    timer.sleep(100);
    assert_eq!(timer.watermark(), Some(100));

    timer.sleep(30);
    assert_eq!(timer.watermark(), Some(30));

    timer.sleep(60);
    assert_eq!(timer.watermark(), Some(30));

    deliver_ticks(timer, 30);
    assert_eq!(scheduler.sweeps(), [30]);
    assert_eq!(scheduler.sleeping(), [100, 60]);
    assert_eq!(timer.watermark(), Some(60));

    deliver_ticks(timer, 29);
    assert_eq!(scheduler.sweeps(), [30]);

    deliver_ticks(timer, 1);
    assert_eq!(scheduler.sweeps(), [30, 60]);
    assert_eq!(timer.watermark(), Some(100));

    deliver_ticks(timer, 40);
    assert_eq!(scheduler.sweeps(), [30, 60, 100]);
    assert_eq!(timer.watermark(), None);
    assert!(scheduler.sleeping().is_empty());
}

#[rstest]
#[timeout(Duration::from_secs(1))]
fn same_deadline_wakes_together() {
    let timer = mock::timer::<100>();
    let scheduler = timer.scheduler();
    timer.cpu().enable_interrupts();

    deliver_ticks(timer, 5);
    timer.sleep(10);
    timer.sleep(10);

    deliver_ticks(timer, 10);
    assert_eq!(scheduler.sweeps(), [15]);
    assert!(scheduler.sleeping().is_empty());
}

#[rstest]
#[timeout(Duration::from_secs(1))]
fn registration_masks_interrupts() {
    let timer = mock::timer::<100>();
    timer.cpu().enable_interrupts();

    timer.sleep(3);

    assert_eq!(
        timer.scheduler().registrations(),
        [Registration {
            deadline: 3,
            interrupts_enabled: false,
        }],
    );
    assert!(timer.cpu().interrupts_enabled());
}

#[rstest]
#[case(0)]
#[case(-5)]
#[timeout(Duration::from_secs(1))]
fn nothing_to_sleep(#[case] ticks: i64) {
    let timer = mock::timer::<100>();
    timer.cpu().enable_interrupts();

    timer.sleep(ticks);

    assert!(timer.scheduler().registrations().is_empty());
    assert_eq!(timer.watermark(), None);
}

#[rstest]
#[case(i64::MAX)]
#[case(i64::MAX - 1)]
#[timeout(Duration::from_secs(1))]
fn deadline_saturates(#[case] ticks: i64) {
    let timer = mock::timer::<100>();
    let scheduler = timer.scheduler();
    timer.cpu().enable_interrupts();

    deliver_ticks(timer, 1);
    timer.sleep(ticks);

    assert_eq!(scheduler.deadlines(), [i64::MAX]);
    assert_eq!(timer.watermark(), None);
    assert!(timer.cpu().interrupts_enabled());

    deliver_ticks(timer, 100);
    assert!(scheduler.sweeps().is_empty());
}

#[test]
#[should_panic(expected = "sleeping requires enabled interrupts")]
fn sleep_with_disabled_interrupts() {
    let timer = mock::timer::<100>();

    timer.sleep(1);
}

#[rstest]
#[timeout(Duration::from_secs(1))]
fn gate_restores_interrupt_state() {
    let cpu = MockCpu::default();
    let scheduler = MockScheduler::default();
    let gate = WakeGate::new();

    cpu.disable_interrupts();
    gate.register(IrqGuard::new(&cpu), 7, &scheduler);
    assert!(!cpu.interrupts_enabled());

    cpu.enable_interrupts();
    let guard = IrqGuard::new(&cpu);
    assert!(guard.were_enabled());
    assert!(!cpu.interrupts_enabled());
    gate.register(guard, 5, &scheduler);
    assert!(cpu.interrupts_enabled());

    assert_eq!(gate.watermark(&cpu), Some(5));
    assert!(cpu.interrupts_enabled());
}

#[rstest]
#[timeout(Duration::from_secs(1))]
fn gate_check() {
    let cpu = MockCpu::default();
    let scheduler = MockScheduler::default();
    let gate = WakeGate::default();

    assert!(!gate.check(1, &scheduler));
    assert_eq!(gate.watermark(&cpu), None);

    gate.register(IrqGuard::new(&cpu), 10, &scheduler);
    gate.register(IrqGuard::new(&cpu), 4, &scheduler);

    assert!(!gate.check(3, &scheduler));
    assert!(gate.check(4, &scheduler));
    assert_eq!(gate.watermark(&cpu), Some(10));
    assert!(!gate.check(9, &scheduler));
    assert!(gate.check(12, &scheduler));
    assert_eq!(gate.watermark(&cpu), None);

    assert_eq!(scheduler.sweeps(), [4, 12]);
}

#[ctor::ctor]
fn init() {
    log::init();
}
