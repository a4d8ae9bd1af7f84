//! Planning profile.
//!
//! The planner reports phase boundaries to [`PhaseListener`]s and never reads anything back.
//! [`SummaryProfile`] is a collector turning those reports, plus query level facts supplied by
//! the caller, into the summary printed with a query profile.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use prettytable::Table;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter};

const NOT_AVAILABLE: &str = "N/A";

/// Query level facts of a profile.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Display, AsRefStr, EnumIter)]
pub enum SummaryKey {
    #[strum(serialize = "Profile ID")]
    ProfileId,
    #[strum(serialize = "Task Type")]
    TaskType,
    #[strum(serialize = "Start Time")]
    StartTime,
    #[strum(serialize = "End Time")]
    EndTime,
    #[strum(serialize = "Total")]
    Total,
    #[strum(serialize = "Task State")]
    TaskState,
    #[strum(serialize = "User")]
    User,
    #[strum(serialize = "Default Db")]
    DefaultDb,
    #[strum(serialize = "Sql Statement")]
    SqlStatement,
    #[strum(serialize = "Is Cached")]
    IsCached,
    #[strum(serialize = "Is Nereids")]
    IsNereids,
    #[strum(serialize = "Is Pipeline")]
    IsPipeline,
    #[strum(serialize = "Total Instances Num")]
    TotalInstancesNum,
    #[strum(serialize = "Instances Num Per BE")]
    InstancesNumPerBe,
    #[strum(serialize = "Parallel Fragment Exec Instance Num")]
    ParallelFragmentExecInstanceNum,
    #[strum(serialize = "Trace ID")]
    TraceId,
}

/// Durations of planning phases.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Display, AsRefStr, EnumIter)]
pub enum ExecutionSummaryKey {
    #[strum(serialize = "CTE Registration Time")]
    CteRegistrationTime,
    #[strum(serialize = "Analysis Time")]
    AnalysisTime,
    #[strum(serialize = "Rewrite Time")]
    RewriteTime,
    #[strum(serialize = "CreateSingleNode Time")]
    CreateSingleNodeTime,
    #[strum(serialize = "QueryDistributed Time")]
    QueryDistributedTime,
    #[strum(serialize = "Plan Time")]
    PlanTime,
}

impl ExecutionSummaryKey {
    /// Phase boundaries the reported duration lies between.
    pub fn span(self) -> (PlanningPhase, PlanningPhase) {
        use PlanningPhase::*;
        match self {
            ExecutionSummaryKey::CteRegistrationTime => (QueryBegin, CteRegistered),
            ExecutionSummaryKey::AnalysisTime => (QueryBegin, Analyzed),
            ExecutionSummaryKey::RewriteTime => (Analyzed, Rewritten),
            ExecutionSummaryKey::CreateSingleNodeTime => (Rewritten, SingleNodePlanned),
            ExecutionSummaryKey::QueryDistributedTime => (SingleNodePlanned, DistributedPlanned),
            ExecutionSummaryKey::PlanTime => (Analyzed, Planned),
        }
    }
}

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Display, EnumIter)]
pub enum PlanningPhase {
    QueryBegin,
    CteRegistered,
    Analyzed,
    Rewritten,
    SingleNodePlanned,
    DistributedPlanned,
    Planned,
}

/// Receives phase boundaries of a planning session.
pub trait PhaseListener: Send + Sync {
    fn on_phase_finished(&self, phase: PlanningPhase, at: Instant);
}

/// Immutable set of summary values, built with [`SummaryBuilder`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    values: BTreeMap<SummaryKey, String>,
}

impl Summary {
    pub fn builder() -> SummaryBuilder {
        SummaryBuilder::default()
    }

    pub fn get(&self, key: SummaryKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SummaryKey, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

#[derive(Default)]
pub struct SummaryBuilder {
    values: BTreeMap<SummaryKey, String>,
}

macro_rules! summary_setters {
    ($($method:ident => $key:ident),* $(,)?) => {
        impl SummaryBuilder {
            $(
                pub fn $method<S: Into<String>>(mut self, value: S) -> Self {
                    self.values.insert(SummaryKey::$key, value.into());
                    self
                }
            )*
        }
    };
}

summary_setters! {
    profile_id => ProfileId,
    task_type => TaskType,
    start_time => StartTime,
    end_time => EndTime,
    total_time => Total,
    task_state => TaskState,
    user => User,
    default_db => DefaultDb,
    sql_statement => SqlStatement,
    is_cached => IsCached,
    is_nereids => IsNereids,
    is_pipeline => IsPipeline,
    total_instances_num => TotalInstancesNum,
    instances_num_per_be => InstancesNumPerBe,
    parallel_fragment_exec_instance_num => ParallelFragmentExecInstanceNum,
    trace_id => TraceId,
}

impl SummaryBuilder {
    pub fn build(self) -> Summary {
        Summary {
            values: self.values,
        }
    }
}

/// Collects the summary of one query.
///
/// Shared between the planner and whoever renders the profile, so every method takes `&self`.
pub struct SummaryProfile {
    summary: Mutex<BTreeMap<SummaryKey, String>>,
    phases: Mutex<HashMap<PlanningPhase, Instant>>,
}

impl Default for SummaryProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryProfile {
    pub fn new() -> Self {
        Self {
            summary: Mutex::new(
                SummaryKey::iter()
                    .map(|k| (k, NOT_AVAILABLE.to_string()))
                    .collect(),
            ),
            phases: Mutex::new(HashMap::new()),
        }
    }

    /// Overwrites the values present in `summary`.
    pub fn update(&self, summary: &Summary) {
        let mut values = self.summary.lock();
        for (key, value) in summary.iter() {
            values.insert(key, value.to_string());
        }
    }

    pub fn summary_value(&self, key: SummaryKey) -> String {
        self.summary
            .lock()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// Time between the two phases of `key`, if both were reported in order.
    pub fn phase_duration(&self, key: ExecutionSummaryKey) -> Option<Duration> {
        let (from, to) = key.span();
        let phases = self.phases.lock();
        let (from, to) = (phases.get(&from)?, phases.get(&to)?);
        to.checked_duration_since(*from)
    }

    pub fn execution_summary(&self) -> Vec<(ExecutionSummaryKey, String)> {
        ExecutionSummaryKey::iter()
            .map(|key| {
                let value = self
                    .phase_duration(key)
                    .map(pretty_ms)
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string());
                (key, value)
            })
            .collect()
    }

    pub fn render(&self) -> String {
        let mut summary = Table::new();
        summary.set_titles(row!["Summary", ""]);
        for (key, value) in self.summary.lock().iter() {
            summary.add_row(row![key, value]);
        }

        let mut execution = Table::new();
        execution.set_titles(row!["Execution Summary", ""]);
        for (key, value) in self.execution_summary() {
            execution.add_row(row![key, value]);
        }

        format!("{}{}", summary, execution)
    }
}

/// A phase reported again overwrites its earlier timestamp.
impl PhaseListener for SummaryProfile {
    fn on_phase_finished(&self, phase: PlanningPhase, at: Instant) {
        self.phases.lock().insert(phase, at);
    }
}

fn pretty_ms(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms >= 1000 {
        format!("{}sec{}ms", ms / 1000, ms % 1000)
    } else {
        format!("{}ms", ms)
    }
}
