use core::time::Duration;

use tokio::time;

use crate::routes::Route;

/// seconds shown after a verified email before going home.
pub const VERIFIED_COUNTDOWN: u32 = 3;
pub const OAUTH_SUCCESS_DELAY: Duration = Duration::from_secs(1);
pub const OAUTH_FAILURE_DELAY: Duration = Duration::from_secs(3);

/// calls `on_tick` with `secs`, `secs - 1`, ..., `1`, one second apart, then points home.
pub async fn countdown<F>(secs: u32, mut on_tick: F) -> Route
where F: FnMut(u32) {
    let mut interval = time::interval(Duration::from_secs(1));

    for remaining in (1..=secs).rev() {
        interval.tick().await;
        on_tick(remaining);
    }
    interval.tick().await;

    Route::Home
}

/// where the oauth callback page goes, and when.
pub async fn after_oauth<T>(result: &anyhow::Result<T>) -> Route {
    match result {
        Ok(_) => {
            time::sleep(OAUTH_SUCCESS_DELAY).await;
            Route::Home
        },
        Err(e) => {
            tracing::warn!("oauth sign in failed: {}", e);
            time::sleep(OAUTH_FAILURE_DELAY).await;
            Route::SignIn
        },
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use tokio::time::Instant;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn countdown_ticks_every_second() {
        let started = Instant::now();
        let mut seen = vec![];

        let to = countdown(VERIFIED_COUNTDOWN, |n| seen.push((n, started.elapsed().as_secs()))).await;

        assert_eq!(to, Route::Home);
        assert_eq!(seen, vec![(3, 0), (2, 1), (1, 2)]);
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn oauth_success_goes_home_quickly() {
        let started = Instant::now();

        let to = after_oauth(&Ok(())).await;

        assert_eq!(to, Route::Home);
        assert_eq!(started.elapsed(), OAUTH_SUCCESS_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn oauth_failure_goes_back_to_sign_in() {
        let started = Instant::now();

        let to = after_oauth::<()>(&Err(anyhow!("no session"))).await;

        assert_eq!(to, Route::SignIn);
        assert_eq!(started.elapsed(), OAUTH_FAILURE_DELAY);
    }
}
