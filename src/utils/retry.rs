//! 有上限的重试
//!
//! 菜单点击、选项点击这类瞬时失败都走这里：固定间隔重试，次数用完后把最后一次错误交给调用方。

use std::future::Future;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::RetryPolicy;

/// 按策略重试异步操作
///
/// # 参数
/// - `policy`: 尝试次数与间隔
/// - `label`: 日志中显示的操作名称
/// - `op`: 每次尝试都会重新调用
///
/// # 返回
/// 第一次成功的结果，或最后一次失败的错误
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} 在第 {} 次尝试时成功", label, attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt < policy.attempts => {
                debug!(
                    "{} 失败 (尝试 {}/{}): {}，{:?} 后重试",
                    label, attempt, policy.attempts, e, policy.backoff
                );
                attempt += 1;
                sleep(policy.backoff).await;
            }
            Err(e) => {
                warn!("{} 已重试 {} 次仍失败: {}", label, policy.attempts, e);
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Duration;

    #[test]
    fn succeeds_after_transient_failures() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::new(5, Duration::ZERO);
        let op = || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 {
                    Err(format!("第 {} 次失败", n))
                } else {
                    Ok(n)
                }
            }
        };
        let result: Result<usize, String> =
            tokio_test::block_on(retry_with_backoff(policy, "点击", op));
        assert_eq!(result, Ok(3));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn gives_up_after_attempts() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::new(4, Duration::ZERO);
        let op = || {
            calls.set(calls.get() + 1);
            async { Err("总是失败") }
        };
        let result: Result<(), &str> = tokio_test::block_on(retry_with_backoff(policy, "点击", op));
        assert_eq!(result, Err("总是失败"));
        assert_eq!(calls.get(), 4);
    }
}
