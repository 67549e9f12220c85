//! Política de retry para transações otimistas
//!
//! Usada pelas implementações de `CounterStore` (memória e Firestore).
//! O alocador em si nunca repete nada: quem repete é o primitivo
//! transacional do store.

use std::time::Duration;

use rand::Rng;

/// Mesmo padrão do Firestore SDK: 5 tentativas
const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_INITIAL_BACKOFF_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionRetry {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for TransactionRetry {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS),
        }
    }
}

impl TransactionRetry {
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
        }
    }

    /// Backoff exponencial sem jitter: initial * 2^(attempt-1)
    ///
    /// `attempt` começa em 1 (primeira tentativa que falhou).
    pub fn base_backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(2u32.pow(exponent))
    }

    /// Backoff com jitter aleatório em `[base, 2 * base)`
    ///
    /// Escritores que perderam a mesma rodada acordam em instantes
    /// diferentes em vez de colidir de novo.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let base = self.base_backoff_for(attempt);
        let base_micros = u64::try_from(base.as_micros()).unwrap_or(u64::MAX);
        if base_micros == 0 {
            return base;
        }

        let jitter = rand::thread_rng().gen_range(0..base_micros);
        base.saturating_add(Duration::from_micros(jitter))
    }

    pub fn has_attempts_left(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_firestore_budget() {
        let retry = TransactionRetry::default();
        assert_eq!(retry.max_attempts, 5);
        assert_eq!(retry.initial_backoff, Duration::from_millis(100));
    }

    #[test]
    fn test_backoff_doubles() {
        let retry = TransactionRetry::new(5, Duration::from_millis(100));
        assert_eq!(retry.base_backoff_for(1), Duration::from_millis(100));
        assert_eq!(retry.base_backoff_for(2), Duration::from_millis(200));
        assert_eq!(retry.base_backoff_for(3), Duration::from_millis(400));
    }

    #[test]
    fn test_backoff_jitter_stays_within_window() {
        let retry = TransactionRetry::new(5, Duration::from_millis(100));

        let samples: Vec<Duration> = (0..50).map(|_| retry.backoff_for(2)).collect();

        for sample in &samples {
            assert!(*sample >= Duration::from_millis(200));
            assert!(*sample < Duration::from_millis(400));
        }
        // Pelo menos dois valores diferentes: sem jitter todos seriam 200ms
        assert!(samples.iter().any(|s| *s != samples[0]));
    }

    #[test]
    fn test_zero_backoff_has_no_jitter() {
        let retry = TransactionRetry::new(3, Duration::ZERO);
        assert_eq!(retry.backoff_for(2), Duration::ZERO);
    }

    #[test]
    fn test_at_least_one_attempt() {
        let retry = TransactionRetry::new(0, Duration::ZERO);
        assert_eq!(retry.max_attempts, 1);
        assert!(!retry.has_attempts_left(1));
    }
}
