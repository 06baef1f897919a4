//! Capture-loop boundary
//!
//! A blocking capture source runs on its own task and hands completed
//! utterances to the engine through a bounded single-producer channel.
//! Shutdown is cooperative: the loop checks a flag between listen
//! attempts, so an in-flight capture always finishes naturally.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use xeno_voice_config::CaptureSettings;
use xeno_voice_core::{AudioBuffer, Result};

/// A blocking audio capture source
///
/// `capture` blocks until one utterance completes. Implementations must
/// bound each attempt by the configured [`CaptureSettings`] (wait at most
/// `listen_timeout_secs` for speech to start, cap the phrase at
/// `phrase_limit_secs`); an unbounded source would stall cooperative
/// shutdown. `Ok(None)` means the listen attempt timed out with no
/// speech; the loop just listens again.
pub trait CaptureSource: Send + 'static {
    fn capture(&mut self) -> Result<Option<AudioBuffer>>;
}

/// Handle to a running capture loop
pub struct CaptureHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl CaptureHandle {
    /// Request shutdown and wait for the loop to drain
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.join.await;
    }
}

/// Spawns and owns the producer side of the capture boundary
pub struct CaptureLoop;

impl CaptureLoop {
    /// Start capturing on a blocking task
    ///
    /// Returns the shutdown handle and the consumer end of the bounded
    /// utterance channel. Utterances arrive in capture order; when the
    /// consumer lags, the bounded channel applies backpressure instead of
    /// dropping or reordering.
    pub fn spawn<S: CaptureSource>(
        mut source: S,
        settings: CaptureSettings,
    ) -> (CaptureHandle, mpsc::Receiver<AudioBuffer>) {
        let (audio_tx, audio_rx) = mpsc::channel(settings.channel_capacity);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let join = tokio::task::spawn_blocking(move || {
            debug!(
                listen_timeout_secs = settings.listen_timeout_secs,
                phrase_limit_secs = settings.phrase_limit_secs,
                "capture loop started"
            );
            loop {
                if *shutdown_rx.borrow() {
                    break;
                }
                match source.capture() {
                    Ok(Some(buffer)) => {
                        if audio_tx.blocking_send(buffer).is_err() {
                            // Consumer gone; nothing left to capture for.
                            break;
                        }
                    }
                    Ok(None) => continue,
                    Err(err) => {
                        // One bad listen attempt must not kill the loop.
                        warn!(%err, "capture attempt failed");
                    }
                }
            }
            debug!("capture loop stopped");
        });

        (
            CaptureHandle { shutdown_tx, join },
            audio_rx,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    /// Source that yields a fixed script of utterances, then quiet timeouts
    struct ScriptedSource {
        buffers: Vec<AudioBuffer>,
        fail_at_attempt: Option<usize>,
        attempts: usize,
        next_buffer: usize,
    }

    impl ScriptedSource {
        fn new(count: usize, fail_at_attempt: Option<usize>) -> Self {
            let buffers = (0..count)
                .map(|i| AudioBuffer::new(vec![i as i16 + 1; 160], 16000))
                .collect();
            Self {
                buffers,
                fail_at_attempt,
                attempts: 0,
                next_buffer: 0,
            }
        }
    }

    impl CaptureSource for ScriptedSource {
        fn capture(&mut self) -> Result<Option<AudioBuffer>> {
            let attempt = self.attempts;
            self.attempts += 1;
            if Some(attempt) == self.fail_at_attempt {
                return Err(xeno_voice_core::Error::InvalidAudio("mic glitch".into()));
            }
            match self.buffers.get(self.next_buffer) {
                Some(buffer) => {
                    let buffer = buffer.clone();
                    self.next_buffer += 1;
                    Ok(Some(buffer))
                }
                None => {
                    // Quiet room: simulate a listen timeout.
                    std::thread::sleep(Duration::from_millis(5));
                    Ok(None)
                }
            }
        }
    }

    #[tokio::test]
    async fn test_buffers_arrive_in_capture_order() {
        let (handle, mut rx) = CaptureLoop::spawn(
            ScriptedSource::new(3, None),
            CaptureSettings::default(),
        );

        for expected in 1..=3i16 {
            let buffer = rx.recv().await.unwrap();
            assert_eq!(buffer.samples()[0], expected);
        }
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_loop_survives_capture_error() {
        let (handle, mut rx) = CaptureLoop::spawn(
            ScriptedSource::new(2, Some(1)),
            CaptureSettings::default(),
        );

        // Utterance 0 arrives, attempt 1 fails, utterance 1 still arrives.
        assert_eq!(rx.recv().await.unwrap().samples()[0], 1);
        assert_eq!(rx.recv().await.unwrap().samples()[0], 2);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_cooperative_shutdown() {
        let (handle, rx) = CaptureLoop::spawn(
            ScriptedSource::new(0, None),
            CaptureSettings::default(),
        );

        let start = Instant::now();
        handle.shutdown().await;
        // The loop notices the flag between listen attempts.
        assert!(start.elapsed() < Duration::from_secs(2));
        drop(rx);
    }
}
