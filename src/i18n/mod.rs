//! Locale catalog, per-request negotiation and localized calendar names.

pub mod calendar;
pub mod catalog;
pub mod negotiator;
pub mod source;

pub use calendar::CalendarNames;
pub use catalog::{Locale, LocaleCatalog, SharedCatalog, Translator, DEFAULT_LOCALE};
pub use negotiator::{negotiate, LocalePreference, NegotiationInputs};
pub use source::{DirectorySource, MessageSource, StaticSource};
