//! Pattern library and translator
//!
//! Maps free-text questions to SQL through an ordered list of
//! (matcher, template) rules. The first rule whose matcher recognizes the
//! text renders the SQL; later rules are never consulted.

mod catalog;
mod matcher;
mod rules;
mod translator;

pub use catalog::{examples, ExampleQuery};
pub use matcher::{Matcher, RegexMatcher};
pub use rules::{PatternLibrary, PatternRule, Template};
pub use translator::{TranslateError, Translation, Translator};
