use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Sleeps between generator retries
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real wall-clock delay
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Records requested delays and returns immediately
#[derive(Debug, Default)]
pub struct RecordingDelay {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<Duration> {
        self.slept.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn total(&self) -> Duration {
        self.recorded().into_iter().sum()
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut slept) = self.slept.lock() {
            slept.push(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_delay_does_not_wait() {
        let delay = RecordingDelay::new();
        let start = std::time::Instant::now();
        delay.sleep(Duration::from_secs(33)).await;
        delay.sleep(Duration::from_secs(66)).await;
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(
            delay.recorded(),
            vec![Duration::from_secs(33), Duration::from_secs(66)]
        );
        assert_eq!(delay.total(), Duration::from_secs(99));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_delay_sleeps() {
        let start = tokio::time::Instant::now();
        TokioDelay.sleep(Duration::from_secs(5)).await;
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}
