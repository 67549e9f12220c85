//! # Autenticação do painel admin
//!
//! - `session.rs`: contrato [`SessionVerifier`], claims e leitura do cookie
//! - `firebase.rs`: verificação do cookie de sessão do Firebase (RS256)
//!
//! A autorização (allow-list de e-mails) fica no middleware
//! [`require_admin_session`](crate::middleware::require_admin_session).

pub mod firebase;
pub mod session;

pub use firebase::FirebaseSessionVerifier;
pub use session::{session_cookie_value, SessionClaims, SessionError, SessionVerifier};
