//! Prompt template for the hosted generator.
//!
//! Every question is wrapped in the same template: a fixed description of
//! the Urban Farm Lab, the quoted question, and a trailing answer marker.
//! Completion models often echo the template back, so
//! [`extract_answer()`] keeps only what follows the marker.

/// Delimiter that ends the prompt and precedes the generated answer.
pub const ANSWER_MARKER: &str = "Answer:";

/// Static domain description embedded in every prompt.
pub const URBAN_FARM_CONTEXT: &str = "\
You are Chatty, an AI assistant specialized in Metropolia University of Applied Sciences' Urban Farm Lab.

About Urban Farm Lab:
- Collaborative platform focusing on sustainable urban agriculture
- Brings together students, researchers, and industry partners
- Develops innovative solutions for food production in urban environments
- Explores vertical farming, hydroponics, and circular economy principles
- Part of Metropolia's Smart Lab ecosystem
- Focuses on smart farming technologies and sustainable food systems

Key personnel may include researchers like Andrea, but for specific staff information, check Metropolia's official website.

The lab conducts research projects in areas like:
- Urban agriculture technologies
- Sustainable food production
- Circular economy in agriculture
- Student-industry collaboration

Always be helpful, friendly, and focus on Urban Farm Lab related topics. \
If a question is unrelated, answer briefly and steer the conversation back to the lab. \
If you don't know something, admit it politely.";

/// Renders prompts around a context block.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    context: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(URBAN_FARM_CONTEXT)
    }
}

impl PromptTemplate {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
        }
    }

    /// Build the full prompt for one question. Always ends with [`ANSWER_MARKER`].
    pub fn render(&self, question: &str) -> String {
        format!(
            "{context}\n\nUser Question: \"{question}\"\n\n\
             Please provide a helpful, accurate response about Urban Farm Lab:\n\n\
             {ANSWER_MARKER}",
            context = self.context.trim(),
        )
    }
}

/// Clean up generated text.
///
/// If the output contains the answer marker, the segment between the first
/// marker and the next one (if the model repeated the template) is kept.
/// A blank segment falls back to the whole output. The result is trimmed.
pub fn extract_answer(generated: &str) -> String {
    let trimmed = generated.trim();
    match trimmed.split(ANSWER_MARKER).nth(1).map(str::trim) {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => trimmed.to_string(),
    }
}
