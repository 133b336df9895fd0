// Financial Fields - Core Library
// Maps raw (balance, currency) attribute pairs onto immutable composite money values

pub mod attributes;     // Raw attribute store
pub mod codec;          // Raw pair ⇄ Money
pub mod config;         // Declarative field mappings
pub mod error;          // Error taxonomy
pub mod guard;          // Protected raw fields
pub mod lifecycle;      // Trigger points: fetch / set / get / pre-save / post-save
pub mod money;          // Currency catalog + Money value
pub mod record;         // Record instances driving the lifecycle
pub mod registry;       // Once-per-type setup
pub mod validator;      // Configuration shape checks

// Re-export commonly used types
pub use attributes::{AttributeStore, AttributeValue};
pub use codec::{MoneyFieldCodec, RawMoney};
pub use config::{FieldMapping, MappingConfiguration, MappingConfigurationBuilder};
pub use error::{AttributeError, ConfigError, DecodeError, RecordError, SetupError};
pub use guard::{derive_protected_fields, is_protected, ProtectedFieldSet};
pub use lifecycle::{AttributeLifecycleController, LifecyclePhase};
pub use money::{Currency, CurrencyRegistry, Money, MoneyError};
pub use record::Record;
pub use registry::{FinancialRecord, SetupRegistry};
pub use validator::ConfigValidator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
