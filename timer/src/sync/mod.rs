/// Примитив синхронизации [`IrqGuard`].
pub mod irq_guard;

pub use irq_guard::IrqGuard;
