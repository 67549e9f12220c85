//! Store de contadores em memória com concorrência otimista
//!
//! Cada registro carrega um número de versão. Uma transação lê
//! `(valor, versão)`, solta o lock, calcula o novo valor e só grava se a
//! versão continuar a mesma (compare-and-swap). Versão diferente = conflito,
//! repetido conforme a [`TransactionRetry`]. Mesmo contrato do Firestore,
//! usado em desenvolvimento e nos testes.
//!
//! Entre a leitura e o compare-and-swap não há nenhum `.await` que suspenda
//! a task: num runtime de uma thread a transação nunca conflita, e com
//! várias threads a janela de colisão é só a troca de lock.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{CounterError, Result};
use crate::retry::TransactionRetry;
use crate::CounterStore;

#[derive(Debug, Clone, Copy, Default)]
struct Entry {
    value: u64,
    version: u64,
}

#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    entries: Mutex<HashMap<String, Entry>>,
    retry: TransactionRetry,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry(retry: TransactionRetry) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            retry,
        }
    }

    /// Define o valor de um contador (migração de dados legados, testes)
    pub async fn seed(&self, key: &str, value: u64) {
        let mut entries = self.entries.lock().await;
        let entry = entries.entry(key.to_string()).or_default();
        entry.value = value;
        entry.version += 1;
    }

    /// Escrita concorrente síncrona, para simular outro escritor dentro de `update`
    #[cfg(test)]
    pub(crate) fn write_concurrently(&self, key: &str, value: u64) {
        let mut entries = self
            .entries
            .try_lock()
            .expect("lock livre entre leitura e commit");
        let entry = entries.entry(key.to_string()).or_default();
        entry.value = value;
        entry.version += 1;
    }

    async fn snapshot(&self, key: &str) -> Entry {
        self.entries
            .lock()
            .await
            .get(key)
            .copied()
            .unwrap_or_default()
    }

    /// Grava `value` somente se ninguém commitou desde a leitura
    async fn compare_and_swap(&self, key: &str, expected_version: u64, value: u64) -> bool {
        let mut entries = self.entries.lock().await;
        let entry = entries.entry(key.to_string()).or_default();

        if entry.version != expected_version {
            return false;
        }

        entry.value = value;
        entry.version += 1;
        true
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn transact(
        &self,
        key: &str,
        update: &(dyn Fn(u64) -> u64 + Send + Sync),
    ) -> Result<u64> {
        let mut attempt = 1;

        loop {
            let read = self.snapshot(key).await;
            let next = update(read.value);
            if self.compare_and_swap(key, read.version, next).await {
                return Ok(next);
            }

            if !self.retry.has_attempts_left(attempt) {
                tracing::warn!(
                    "⚠️ Contador '{}': conflito persistente após {} tentativas",
                    key,
                    attempt
                );
                return Err(CounterError::TransactionConflict {
                    key: key.to_string(),
                    attempts: attempt,
                });
            }

            tracing::debug!("🔁 Contador '{}': conflito na tentativa {}, repetindo", key, attempt);
            tokio::time::sleep(self.retry.backoff_for(attempt)).await;
            attempt += 1;
        }
    }

    async fn current(&self, key: &str) -> Result<u64> {
        Ok(self.snapshot(key).await.value)
    }
}
