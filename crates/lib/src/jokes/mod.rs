//! Joke source: a fixed catalog, a generic-request classifier, and optional topic generation
//! through the completion service.

mod catalog;
mod classifier;
mod source;

pub use catalog::{JokeCatalog, DAD_JOKES};
pub use classifier::{is_generic_request, GENERIC_KEYWORDS};
pub use source::{
    JokeGenerator, JokeSource, GENERATION_FAILED_NOTICE, JOKE_MARKER, MISSING_KEY_NOTICE,
};
