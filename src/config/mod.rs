pub mod settings;

pub use settings::{AdminSettings, CatalogSettings, CodeSettings, FirestoreSettings, ServerSettings, Settings};
