//! Alocador de códigos sequenciais
//!
//! Gera códigos legíveis e crescentes para entidades novas do catálogo:
//!
//! - `kits`     -> `KIT-0001`, `KIT-0002`, ...
//! - `produtos` -> `PROD-0001`, `PROD-0002`, ...
//!
//! O contador fica persistido no store (`_counters/{key}`, campo `value`) e
//! todo incremento passa pelo primitivo transacional do store
//! ([`CounterStore::transact`]). Nada é cacheado em memória do processo:
//! handlers podem rodar em instâncias diferentes sem memória compartilhada.
//!
//! # Exemplo
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use contador::{CodeFormat, CounterKey, MemoryCounterStore, SequentialCodeAllocator};
//!
//! let allocator = SequentialCodeAllocator::new(Arc::new(MemoryCounterStore::new()));
//! let code = allocator.allocate(CounterKey::Kits, &CodeFormat::for_key(CounterKey::Kits)).await?;
//! assert_eq!(code.code, "KIT-0001");
//! ```

pub mod error;
pub mod memory;
pub mod retry;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::{CounterError, Result};
pub use memory::MemoryCounterStore;
pub use retry::TransactionRetry;

/// Coleção onde os contadores são persistidos
pub const COUNTERS_COLLECTION: &str = "_counters";

/// Campo numérico do registro de contador
pub const COUNTER_VALUE_FIELD: &str = "value";

/// Largura padrão do número no código (`KIT-0001`)
pub const DEFAULT_PAD_WIDTH: usize = 4;

/// Contadores conhecidos (enumeração fechada)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterKey {
    Kits,
    Produtos,
}

impl CounterKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterKey::Kits => "kits",
            CounterKey::Produtos => "produtos",
        }
    }

    pub fn default_prefix(&self) -> &'static str {
        match self {
            CounterKey::Kits => "KIT",
            CounterKey::Produtos => "PROD",
        }
    }
}

impl fmt::Display for CounterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formato do código: `{prefix}-{numero com zeros a esquerda}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFormat {
    pub prefix: String,
    pub pad_width: usize,
}

impl CodeFormat {
    pub fn new(prefix: impl Into<String>, pad_width: usize) -> Self {
        Self {
            prefix: prefix.into(),
            pad_width,
        }
    }

    /// Formato padrão do contador (KIT/PROD, 4 dígitos)
    pub fn for_key(key: CounterKey) -> Self {
        Self::new(key.default_prefix(), DEFAULT_PAD_WIDTH)
    }

    /// Números maiores que a largura saem inteiros (`KIT-12345`)
    pub fn format(&self, number: u64) -> String {
        format!("{}-{:0width$}", self.prefix, number, width = self.pad_width)
    }
}

/// Resultado de uma alocação
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatedCode {
    pub number: u64,
    pub code: String,
}

/// Capacidade mínima exigida do store de contadores
///
/// `transact` é o primitivo atômico read-modify-write: lê o valor atual
/// (0 se o registro não existe), aplica `update` e persiste o resultado
/// numa única transação. Conflitos com escritores concorrentes são
/// repetidos pelo próprio store, de forma transparente.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn transact(
        &self,
        key: &str,
        update: &(dyn Fn(u64) -> u64 + Send + Sync),
    ) -> Result<u64>;

    /// Leitura pontual do valor persistido (0 se ausente), sem mutação
    async fn current(&self, key: &str) -> Result<u64>;
}

/// Alocador de códigos sequenciais
#[derive(Clone)]
pub struct SequentialCodeAllocator {
    store: Arc<dyn CounterStore>,
}

impl SequentialCodeAllocator {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Incrementa o contador em exatamente 1 e retorna o novo valor
    pub async fn next_value(&self, key: CounterKey) -> Result<u64> {
        let next = self
            .store
            .transact(key.as_str(), &|current: u64| current + 1)
            .await
            .map_err(|e| {
                tracing::error!("❌ Falha ao alocar código para '{}': {}", key, e);
                e
            })?;

        tracing::debug!("🔢 Contador '{}' avançou para {}", key, next);
        Ok(next)
    }

    /// Aloca o próximo número e já devolve o código formatado
    pub async fn allocate(&self, key: CounterKey, format: &CodeFormat) -> Result<AllocatedCode> {
        let number = self.next_value(key).await?;
        let code = format.format(number);

        Ok(AllocatedCode { number, code })
    }

    /// Valor atual do contador, sem incrementar
    pub async fn current(&self, key: CounterKey) -> Result<u64> {
        self.store.current(key.as_str()).await
    }
}
