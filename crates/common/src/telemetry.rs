//! 日志初始化（log + env_logger）

/// 初始化全局日志，重复调用只生效一次
///
/// 默认级别 info，verbose 时 debug；RUST_LOG 环境变量可覆盖。
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level),
    )
    .format_timestamp_millis()
    .try_init();
}
