/// Внешний планировщик потоков, с которым взаимодействует таймер.
///
/// Таймер не хранит сроки пробуждения отдельных потоков.
/// Он помнит только наименьший из них --- порог пробуждения ---
/// и по нему решает, когда вызвать [`Scheduler::wake_up()`].
/// Учёт ожидающих потоков целиком лежит на планировщике.
pub trait Scheduler: Sync {
    /// Учитывает очередной тик, например, расход кванта текущим потоком.
    ///
    /// Вызывается из обработчика прерывания таймера на каждом тике.
    /// Не должен блокироваться.
    fn tick(&self);

    /// Усыпляет текущий поток до тика `deadline`.
    ///
    /// Вызывается из обычного кода при запрещённых прерываниях.
    /// Возвращается после того, как поток будет разбужен
    /// в [`Scheduler::wake_up()`].
    fn sleep_until(
        &self,
        deadline: i64,
    );

    /// Будит все потоки, срок пробуждения которых не позже тика `now`.
    ///
    /// Вызывается из обработчика прерывания таймера.
    /// Не должен блокироваться.
    ///
    /// Возвращает новый порог пробуждения --- наименьший срок среди оставшихся
    /// спящих потоков, --- или [`None`], если спящих потоков не осталось.
    /// Возвращённое значение обязано быть больше `now`.
    fn wake_up(
        &self,
        now: i64,
    ) -> Option<i64>;
}
