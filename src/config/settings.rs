use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub firestore: FirestoreSettings,
    pub admin: AdminSettings,
    pub catalog: CatalogSettings,
    pub codes: CodeSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// "firestore" (produção) ou "memory" (desenvolvimento local)
    pub store_backend: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FirestoreSettings {
    pub project_id: String,
    pub database: String,
    pub endpoint: String,
    pub emulator_host: Option<String>,  // FIRESTORE_EMULATOR_HOST
    pub access_token: Option<String>,  // Token estático (scripts/CI); senão metadata server
    pub max_transaction_attempts: u32,
    pub initial_backoff_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminSettings {
    /// Lista separada por vírgula
    pub allowed_emails: String,
    pub session_cookie: String,
    pub session_keys_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CatalogSettings {
    pub site_name: String,
    pub site_url: String,
    pub whatsapp_number: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CodeSettings {
    pub kit_prefix: String,
    pub produto_prefix: String,
    pub pad_width: usize,
}

impl AdminSettings {
    /// E-mails autorizados, normalizados (trim + minúsculas)
    pub fn allowed_emails(&self) -> Vec<String> {
        self.allowed_emails
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn is_allowed_email(&self, email: Option<&str>) -> bool {
        match email {
            Some(email) => {
                let email = email.trim().to_lowercase();
                self.allowed_emails().iter().any(|allowed| *allowed == email)
            }
            None => false,
        }
    }
}

impl FirestoreSettings {
    /// `projects/{project}/databases/{database}`
    pub fn database_path(&self) -> String {
        format!("projects/{}/databases/{}", self.project_id, self.database)
    }

    /// Endpoint REST efetivo (emulador usa HTTP puro)
    pub fn effective_endpoint(&self) -> String {
        match self.emulator_host.as_deref().filter(|h| !h.is_empty()) {
            Some(host) => format!("http://{}/v1", host),
            None => self.endpoint.trim_end_matches('/').to_string(),
        }
    }
}

impl CodeSettings {
    pub fn format_for(&self, key: contador::CounterKey) -> contador::CodeFormat {
        let prefix = match key {
            contador::CounterKey::Kits => &self.kit_prefix,
            contador::CounterKey::Produtos => &self.produto_prefix,
        };
        contador::CodeFormat::new(prefix.clone(), self.pad_width)
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.store_backend", "firestore")?
            .set_default("firestore.project_id", "vive-encante")?
            .set_default("firestore.database", "(default)")?
            .set_default("firestore.endpoint", "https://firestore.googleapis.com/v1")?
            .set_default("firestore.max_transaction_attempts", 5)?
            .set_default("firestore.initial_backoff_ms", 100)?
            .set_default("admin.allowed_emails", "")?
            .set_default("admin.session_cookie", "session")?
            .set_default(
                "admin.session_keys_url",
                "https://www.googleapis.com/identitytoolkit/v3/relyingparty/publicKeys",
            )?
            .set_default("catalog.site_name", "Vive Encante")?
            .set_default("catalog.site_url", "http://localhost:3000")?
            .set_default("catalog.whatsapp_number", "553185933480")?
            .set_default("codes.kit_prefix", "KIT")?
            .set_default("codes.produto_prefix", "PROD")?
            .set_default("codes.pad_width", 4)?
            // Arquivo de configuração base
            .add_source(File::with_name("config/default").required(false))
            // Arquivo específico do ambiente
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false));

        // Variáveis de ambiente "conhecidas" (Cloud Run / emulador)
        if let Ok(project_id) = std::env::var("GCP_PROJECT_ID").or_else(|_| std::env::var("GOOGLE_CLOUD_PROJECT")) {
            builder = builder.set_override("firestore.project_id", project_id)?;
        }
        if let Ok(host) = std::env::var("FIRESTORE_EMULATOR_HOST") {
            builder = builder.set_override("firestore.emulator_host", host)?;
        }
        if let Ok(emails) = std::env::var("ADMIN_ALLOWED_EMAILS") {
            builder = builder.set_override("admin.allowed_emails", emails)?;
        }
        if let Ok(port) = std::env::var("PORT") {
            builder = builder.set_override("server.port", port)?;
        }

        builder = builder.add_source(Environment::with_prefix("VIVE_ENCANTE").separator("__"));

        let s = builder.build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin(emails: &str) -> AdminSettings {
        AdminSettings {
            allowed_emails: emails.to_string(),
            session_cookie: "session".to_string(),
            session_keys_url: "http://localhost/keys".to_string(),
        }
    }

    #[test]
    fn test_allowed_emails_are_normalized() {
        let settings = admin(" Dona@Vive.com , ,equipe@vive.com");
        assert_eq!(settings.allowed_emails(), vec!["dona@vive.com", "equipe@vive.com"]);
    }

    #[test]
    fn test_email_allowlist_is_case_insensitive() {
        let settings = admin("dona@vive.com");
        assert!(settings.is_allowed_email(Some("DONA@vive.com")));
        assert!(!settings.is_allowed_email(Some("outra@vive.com")));
        assert!(!settings.is_allowed_email(None));
    }

    #[test]
    fn test_empty_allowlist_denies_everyone() {
        let settings = admin("");
        assert!(!settings.is_allowed_email(Some("dona@vive.com")));
    }

    #[test]
    fn test_emulator_endpoint_overrides_production() {
        let mut firestore = FirestoreSettings {
            project_id: "demo".to_string(),
            database: "(default)".to_string(),
            endpoint: "https://firestore.googleapis.com/v1/".to_string(),
            emulator_host: None,
            access_token: None,
            max_transaction_attempts: 5,
            initial_backoff_ms: 100,
        };
        assert_eq!(firestore.effective_endpoint(), "https://firestore.googleapis.com/v1");
        assert_eq!(firestore.database_path(), "projects/demo/databases/(default)");

        firestore.emulator_host = Some("localhost:8081".to_string());
        assert_eq!(firestore.effective_endpoint(), "http://localhost:8081/v1");
    }

    #[test]
    fn test_store_backend_is_firestore_unless_opted_in() {
        std::env::remove_var("VIVE_ENCANTE__SERVER__STORE_BACKEND");

        std::env::remove_var("RUN_MODE");
        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.store_backend, "firestore");

        std::env::set_var("RUN_MODE", "development");
        let settings = Settings::new().unwrap();
        std::env::remove_var("RUN_MODE");
        assert_eq!(settings.server.store_backend, "firestore");
    }

    #[test]
    fn test_code_formats_follow_settings() {
        let codes = CodeSettings {
            kit_prefix: "KIT".to_string(),
            produto_prefix: "PROD".to_string(),
            pad_width: 4,
        };
        assert_eq!(codes.format_for(contador::CounterKey::Produtos).format(3), "PROD-0003");
    }
}
