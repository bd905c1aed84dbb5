//! Public types for the Chatty API.

mod answer;
mod options;
mod question;

pub use answer::{Answer, Source};
pub use options::GenerationParams;
pub use question::{QUESTION_REQUIRED, Question};
