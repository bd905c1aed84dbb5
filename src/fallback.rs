//! Keyword fallback responder.
//!
//! A deterministic, always-successful answer source. A [`RuleTable`] is an
//! ordered list of (keyword matcher, canned answer) pairs; the first rule
//! whose matcher accepts the lower-cased question wins, regardless of how
//! many later rules would also match. Questions that match nothing get one
//! of the default phrases, chosen by a [`PhrasePicker`].
//!
//! Matching is plain substring containment, so short keywords like "hi"
//! also fire inside longer words ("this", "which").

use std::sync::Arc;

use rand::Rng;
use tracing::debug;

/// How a rule's keywords are combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeywordMatch {
    /// Matches when any keyword is contained in the question.
    Any(Vec<String>),
    /// Matches only when every keyword is contained in the question.
    All(Vec<String>),
}

impl KeywordMatch {
    pub fn any<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeywordMatch::Any(lowercase_all(keywords))
    }

    pub fn all<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeywordMatch::All(lowercase_all(keywords))
    }

    /// Test an already lower-cased question.
    pub fn matches(&self, normalized: &str) -> bool {
        match self {
            KeywordMatch::Any(keywords) => keywords.iter().any(|k| normalized.contains(k.as_str())),
            KeywordMatch::All(keywords) => {
                !keywords.is_empty() && keywords.iter().all(|k| normalized.contains(k.as_str()))
            }
        }
    }
}

fn lowercase_all<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    keywords.into_iter().map(|k| k.into().to_lowercase()).collect()
}

/// One (matcher, answer) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    /// Short label for logs.
    pub name: String,
    pub matcher: KeywordMatch,
    pub answer: String,
}

impl KeywordRule {
    pub fn new(name: impl Into<String>, matcher: KeywordMatch, answer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matcher,
            answer: answer.into(),
        }
    }
}

/// Ordered rules plus the pool of default phrases.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<KeywordRule>,
    defaults: Vec<String>,
}

impl RuleTable {
    /// Build a table. An empty default pool gets a single generic phrase so
    /// the responder stays total.
    pub fn new(rules: Vec<KeywordRule>, defaults: Vec<String>) -> Self {
        let defaults = if defaults.is_empty() {
            vec![GENERIC_DEFAULT.to_string()]
        } else {
            defaults
        };
        Self { rules, defaults }
    }

    /// The built-in Urban Farm Lab table.
    pub fn urban_farm_lab() -> Self {
        let rules = vec![
            KeywordRule::new(
                "greeting",
                KeywordMatch::any(["hello", "hi", "hey"]),
                "Hello! I'm Chatty, your AI assistant for Metropolia's Urban Farm Lab. How can I help you today?",
            ),
            KeywordRule::new(
                "lab",
                KeywordMatch::any(["urban farm", "farm lab"]),
                "The Urban Farm Lab at Metropolia is a collaborative platform focusing on sustainable urban agriculture. It brings together students, researchers, and industry partners to develop innovative solutions for food production in urban environments through methods like vertical farming and hydroponics.",
            ),
            KeywordRule::new(
                "university",
                KeywordMatch::any(["metropolia", "university"]),
                "Metropolia University of Applied Sciences is Finland's largest university of applied sciences, offering practical education and conducting research that serves working life needs. The Urban Farm Lab is one of its innovative collaboration platforms.",
            ),
            KeywordRule::new(
                "staff",
                KeywordMatch::any(["andrea"]),
                "Andrea is likely a researcher or staff member associated with the Urban Farm Lab. For specific and up-to-date information about Andrea's role and contact details, I recommend checking the official Metropolia website or contacting the Urban Farm Lab directly.",
            ),
            KeywordRule::new(
                "sustainability",
                KeywordMatch::any(["sustainable", "agriculture", "farming"]),
                "Sustainable agriculture is a key focus of the Urban Farm Lab. The lab explores environmentally friendly food production methods suitable for urban environments, including circular economy principles and smart farming technologies.",
            ),
            KeywordRule::new(
                "research",
                KeywordMatch::any(["research", "project", "study"]),
                "The Urban Farm Lab conducts various research projects in smart farming technologies, sustainable food systems, and urban-rural interactions. These projects often involve interdisciplinary collaboration between students, researchers, and industry partners.",
            ),
            KeywordRule::new(
                "capabilities",
                KeywordMatch::all(["what", "do"]),
                "I specialize in providing information about Metropolia's Urban Farm Lab. I can tell you about the lab's research, projects, sustainable agriculture methods, and how it collaborates with students and industry partners.",
            ),
        ];

        let defaults = [
            "That's an interesting question! The Urban Farm Lab focuses on developing sustainable food production solutions for urban environments. Could you tell me more about what specific aspect interests you?",
            "I'd love to help you with that! The Urban Farm Lab works on innovative urban agriculture solutions. Could you rephrase your question or ask about something more specific related to urban farming?",
            "Thanks for your question! While I specialize in Metropolia's Urban Farm Lab topics, I'd be happy to help if you have questions about urban agriculture, sustainable farming, or the lab's research projects.",
            "That's a great question! The Urban Farm Lab brings together education, research, and business collaboration to advance urban farming solutions. What specific area are you curious about?",
            "I appreciate your interest! The Urban Farm Lab explores methods like vertical farming and hydroponics to create sustainable food systems in cities. How can I assist you further?",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        Self::new(rules, defaults)
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn defaults(&self) -> &[String] {
        &self.defaults
    }

    /// First rule matching an already lower-cased question.
    pub fn find(&self, normalized: &str) -> Option<&KeywordRule> {
        self.rules.iter().find(|rule| rule.matcher.matches(normalized))
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::urban_farm_lab()
    }
}

const GENERIC_DEFAULT: &str =
    "I'd be happy to help you learn more about Metropolia's Urban Farm Lab. Could you please rephrase your question?";

/// Chooses one of the default phrases.
pub trait PhrasePicker: Send + Sync {
    /// Return an index in `0..len`. `len` is never zero.
    fn pick(&self, len: usize) -> usize;
}

/// Uniform random choice (production default).
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl PhrasePicker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Always the same index, wrapped into range. For tests and reproducible deployments.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedPicker(pub usize);

impl PhrasePicker for FixedPicker {
    fn pick(&self, len: usize) -> usize {
        self.0 % len
    }
}

/// Total question → canned answer function.
#[derive(Clone)]
pub struct FallbackResponder {
    table: Arc<RuleTable>,
    picker: Arc<dyn PhrasePicker>,
}

impl FallbackResponder {
    pub fn new(table: RuleTable, picker: Arc<dyn PhrasePicker>) -> Self {
        Self {
            table: Arc::new(table),
            picker,
        }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Canned answer for `question`. Never fails and never returns empty
    /// text as long as the table's answers are non-empty.
    pub fn respond(&self, question: &str) -> String {
        let normalized = question.to_lowercase();
        match self.table.find(&normalized) {
            Some(rule) => {
                debug!(rule = %rule.name, "keyword rule matched");
                rule.answer.clone()
            }
            None => self.default_answer(),
        }
    }

    /// One of the default phrases, as chosen by the picker.
    pub fn default_answer(&self) -> String {
        let defaults = self.table.defaults();
        let index = self.picker.pick(defaults.len()).min(defaults.len() - 1);
        defaults[index].clone()
    }
}

impl Default for FallbackResponder {
    fn default() -> Self {
        Self::new(RuleTable::urban_farm_lab(), Arc::new(RandomPicker))
    }
}

impl std::fmt::Debug for FallbackResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackResponder")
            .field("rules", &self.table.rules.len())
            .field("defaults", &self.table.defaults.len())
            .finish()
    }
}
