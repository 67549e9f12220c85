//! Tipos de erro para o crate contador

use thiserror::Error;

/// Erros de alocação de código
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CounterError {
    /// O store não conseguiu serializar o incremento dentro do orçamento de retries
    #[error("Transaction conflict on counter '{key}' after {attempts} attempts")]
    TransactionConflict { key: String, attempts: u32 },

    /// Falha de rede/conectividade com o store
    #[error("Counter store unavailable: {0}")]
    StoreUnavailable(String),
}

impl CounterError {
    /// Erros transitórios: o chamador pode repetir a operação inteira do zero
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CounterError::TransactionConflict { .. } | CounterError::StoreUnavailable(_)
        )
    }
}

/// Tipo Result padrão para o crate
pub type Result<T> = std::result::Result<T, CounterError>;
