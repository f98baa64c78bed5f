use crate::chat::Message;

/// The fixed set of per-ticket discussion stages, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    BasicInfo,
    PlanForTheDay,
    BlockerCheck,
    DueDateCheck,
    SummarizeConversation,
    ConfirmSummary,
}

pub const STAGE_ORDER: [StageId; 6] = [
    StageId::BasicInfo,
    StageId::PlanForTheDay,
    StageId::BlockerCheck,
    StageId::DueDateCheck,
    StageId::SummarizeConversation,
    StageId::ConfirmSummary,
];

impl StageId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BasicInfo => "basic_info",
            Self::PlanForTheDay => "plan_for_the_day",
            Self::BlockerCheck => "blocker_check",
            Self::DueDateCheck => "due_date_check",
            Self::SummarizeConversation => "summarize_conversation",
            Self::ConfirmSummary => "confirm_summary",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "basic_info" => Some(Self::BasicInfo),
            "plan_for_the_day" => Some(Self::PlanForTheDay),
            "blocker_check" => Some(Self::BlockerCheck),
            "due_date_check" => Some(Self::DueDateCheck),
            "summarize_conversation" => Some(Self::SummarizeConversation),
            "confirm_summary" => Some(Self::ConfirmSummary),
            _ => None,
        }
    }

    pub fn first() -> Self {
        Self::BasicInfo
    }

    fn index(&self) -> usize {
        STAGE_ORDER
            .iter()
            .position(|stage| stage == self)
            .unwrap_or(0)
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-stage execution phase. `ProceedToNextStage` and `EndConversation`
/// are set by the model's command; `ToolsCall` hands control to tool
/// dispatch; `Completed` absorbs the whole pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagePhase {
    NotStarted,
    InProgress,
    ToolsCall,
    ProceedToNextStage,
    EndConversation,
    Completed,
}

/// State private to one stage: its phase, the next-stage pointer the model
/// supplied, the stage's own message history, and (for the summarize stage)
/// the generated summary text read later by `confirm_summary`.
#[derive(Debug, Clone)]
pub struct StageState {
    pub id: StageId,
    pub phase: StagePhase,
    pub next_stage: Option<StageId>,
    pub messages: Vec<Message>,
    pub summary: String,
}

impl StageState {
    fn new(id: StageId) -> Self {
        Self {
            id,
            phase: StagePhase::NotStarted,
            next_stage: None,
            messages: Vec::new(),
            summary: String::new(),
        }
    }
}

/// The stage table for one chosen ticket. Exactly one stage is current at
/// any time; histories of non-current stages are only read back by the
/// summarize stage.
#[derive(Debug, Clone)]
pub struct StageTable {
    stages: Vec<StageState>,
    current: StageId,
}

impl StageTable {
    pub fn new() -> Self {
        Self {
            stages: STAGE_ORDER.iter().map(|id| StageState::new(*id)).collect(),
            current: StageId::first(),
        }
    }

    pub fn current_id(&self) -> StageId {
        self.current
    }

    pub fn advance_to(&mut self, stage: StageId) {
        self.current = stage;
    }

    pub fn current(&self) -> &StageState {
        &self.stages[self.current.index()]
    }

    pub fn current_mut(&mut self) -> &mut StageState {
        let index = self.current.index();
        &mut self.stages[index]
    }

    pub fn stage(&self, id: StageId) -> &StageState {
        &self.stages[id.index()]
    }

    pub fn stage_mut(&mut self, id: StageId) -> &mut StageState {
        &mut self.stages[id.index()]
    }

    /// Fresh table for the next ticket: empty histories, first stage current.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for StageTable {
    fn default() -> Self {
        Self::new()
    }
}
