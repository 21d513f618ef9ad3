pub mod bundle;

pub use bundle::{ImportBundle, ImportSummary};
