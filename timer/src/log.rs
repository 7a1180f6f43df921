//! Библиотека сама не устанавливает получателя сообщений.
//! Им владеет ядро, а в тестах --- `tracing-subscriber`.

pub use tracing::{
    Level,
    debug,
    error,
    event,
    info,
    trace,
    warn,
};
