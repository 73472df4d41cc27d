/// Макрос для замера времени, результат пишется в лог на уровне debug
#[macro_export]
macro_rules! measure_time {
    ($label:expr, $code:block) => {{
        let start = std::time::Instant::now();
        let out = $code;
        let duration = start.elapsed().as_secs_f32();
        $crate::log::debug!("{}: {:.3}", $label, duration);
        out
    }};
}
