use serde::Serialize;
use std::fmt;

/// Display order of the assessment groups. Unknown groups sort after these.
pub const GROUP_ORDER: [ModuleGroup; 4] = [
    ModuleGroup::BeforeArrival,
    ModuleGroup::GettingIn,
    ModuleGroup::DuringVisit,
    ModuleGroup::ServiceSupport,
];

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModuleGroup {
    BeforeArrival,
    GettingIn,
    DuringVisit,
    ServiceSupport,
    Other(String),
}

impl ModuleGroup {
    /// Maps a `group:` value from the source file onto a known group.
    /// Kebab-case keys, camelCase keys and the display labels are accepted.
    pub fn from_source_key(key: &str) -> Self {
        match key.trim() {
            "before-arrival" | "beforeArrival" | "Before Arrival" => ModuleGroup::BeforeArrival,
            "getting-in" | "gettingIn" | "Getting In" => ModuleGroup::GettingIn,
            "during-visit" | "duringVisit" | "During Visit" => ModuleGroup::DuringVisit,
            "service-support" | "serviceSupport" | "Service & Support" => {
                ModuleGroup::ServiceSupport
            }
            other => ModuleGroup::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ModuleGroup::BeforeArrival => "Before Arrival",
            ModuleGroup::GettingIn => "Getting In",
            ModuleGroup::DuringVisit => "During Visit",
            ModuleGroup::ServiceSupport => "Service & Support",
            ModuleGroup::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ModuleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ModuleGroup {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReviewMode {
    #[serde(rename = "Pulse Check")]
    PulseCheck,
    #[serde(rename = "Deep Dive")]
    DeepDive,
}

impl ReviewMode {
    /// `pulse-check` is the only lightweight marker; everything else is a deep dive.
    pub fn from_source_value(value: &str) -> Self {
        if value.trim() == "pulse-check" {
            ReviewMode::PulseCheck
        } else {
            ReviewMode::DeepDive
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReviewMode::PulseCheck => "Pulse Check",
            ReviewMode::DeepDive => "Deep Dive",
        }
    }
}

impl fmt::Display for ReviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A module literal found in the source, with the byte offset of its `id:` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulePosition {
    pub id: String,
    pub code: String,
    pub name: String,
    pub group: ModuleGroup,
    pub position: usize,
}

/// A question literal that passed field validation but has no module yet.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionBlock {
    pub id: String,
    pub text: String,
    pub help_text: String,
    pub review_mode: ReviewMode,
    pub impact_level: String,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub group: ModuleGroup,
    pub module_code: String,
    pub module_name: String,
    pub question_id: String,
    pub review_mode: ReviewMode,
    pub impact_level: String,
    pub question_text: String,
    pub help_text: String,
}

impl QuestionRecord {
    pub fn new(block: QuestionBlock, module: &ModulePosition) -> Self {
        Self {
            group: module.group.clone(),
            module_code: module.code.clone(),
            module_name: module.name.clone(),
            question_id: block.id,
            review_mode: block.review_mode,
            impact_level: block.impact_level,
            question_text: block.text,
            help_text: block.help_text,
        }
    }

    /// Key used for per-module counts in the run summary.
    pub fn module_key(&self) -> String {
        format!("{} - {}", self.module_code, self.module_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "fields", rename_all = "camelCase")]
pub enum SkipReason {
    MissingFields(Vec<&'static str>),
    Orphaned,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingFields(fields) => write!(f, "missing {}", fields.join(", ")),
            SkipReason::Orphaned => f.write_str("no preceding module"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedCandidate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    pub position: usize,
    pub line: usize,
    pub reason: SkipReason,
}
