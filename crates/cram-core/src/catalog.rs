//! The task catalog — which tasks count toward a "complete" day.
//!
//! The catalog is process-wide configuration, built once at startup and
//! handed to the [`Tracker`](crate::Tracker) and the reminder dispatcher.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The task whose label depends on the day of the week.
pub const WRITING_TASK: &str = "writing";

// ─── Task definitions ────────────────────────────────────────────────────────

/// Part of the day a task belongs to; each phase has its own reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
  Morning,
  Afternoon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDef {
  pub id:    String,
  pub label: String,
  pub phase: Phase,
}

impl TaskDef {
  fn new(id: &str, label: &str, phase: Phase) -> Self {
    Self { id: id.to_owned(), label: label.to_owned(), phase }
  }
}

/// Shape of a catalog override in configuration, validated by
/// [`TaskCatalog::new`].
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
  pub tasks:            Vec<TaskDef>,
  /// Writing variant per weekday, Monday first. `None` marks a rest day.
  pub writing_schedule: Vec<Option<String>>,
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// Ordered list of daily tasks plus the weekday table for the writing label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskCatalog {
  tasks:            Vec<TaskDef>,
  writing_schedule: [Option<String>; 7],
}

impl TaskCatalog {
  pub fn new(tasks: Vec<TaskDef>, writing_schedule: Vec<Option<String>>) -> Result<Self> {
    if tasks.is_empty() {
      return Err(Error::EmptyCatalog);
    }
    let mut seen = HashSet::new();
    for task in &tasks {
      if !seen.insert(task.id.as_str()) {
        return Err(Error::DuplicateTask(task.id.clone()));
      }
    }
    let len = writing_schedule.len();
    let writing_schedule: [Option<String>; 7] =
      writing_schedule.try_into().map_err(|_| Error::InvalidSchedule(len))?;

    Ok(Self { tasks, writing_schedule })
  }

  pub fn tasks(&self) -> &[TaskDef] { &self.tasks }

  pub fn len(&self) -> usize { self.tasks.len() }

  pub fn is_empty(&self) -> bool { self.tasks.is_empty() }

  pub fn contains(&self, task_id: &str) -> bool {
    self.tasks.iter().any(|t| t.id == task_id)
  }

  /// Task ids expected on `date`. Every task is expected every day, the rest
  /// day included; rest only changes the writing label.
  pub fn expected_tasks(&self, _date: NaiveDate) -> Vec<&str> {
    self.tasks.iter().map(|t| t.id.as_str()).collect()
  }

  pub fn tasks_in(&self, phase: Phase) -> impl Iterator<Item = &TaskDef> {
    self.tasks.iter().filter(move |t| t.phase == phase)
  }

  /// Writing variant for `date`, or `None` on the rest day.
  pub fn writing_variant(&self, date: NaiveDate) -> Option<&str> {
    self.writing_schedule[weekday_index(date)].as_deref()
  }

  pub fn is_rest_day(&self, date: NaiveDate) -> bool {
    self.writing_variant(date).is_none()
  }

  /// Saturdays carry the weekly mock test.
  pub fn is_mock_test_day(&self, date: NaiveDate) -> bool { weekday_index(date) == 5 }

  /// Display label for `task_id` on `date`. Unknown ids are echoed back.
  pub fn label_for(&self, task_id: &str, date: NaiveDate) -> String {
    if task_id == WRITING_TASK {
      return match self.writing_variant(date) {
        Some(variant) => format!("Writing ({variant})"),
        None => "Writing (rest)".to_owned(),
      };
    }
    self
      .tasks
      .iter()
      .find(|t| t.id == task_id)
      .map(|t| t.label.clone())
      .unwrap_or_else(|| task_id.to_owned())
  }
}

impl TryFrom<CatalogConfig> for TaskCatalog {
  type Error = Error;

  fn try_from(cfg: CatalogConfig) -> Result<Self> {
    Self::new(cfg.tasks, cfg.writing_schedule)
  }
}

impl Default for TaskCatalog {
  /// The IELTS preparation plan: two morning and five afternoon tasks,
  /// alternating writing Task 2 / Task 1 with Sunday off.
  fn default() -> Self {
    let task2 = Some("Task 2".to_owned());
    let task1 = Some("Task 1".to_owned());
    Self {
      tasks:            vec![
        TaskDef::new("reading", "Reading (60-90 min)", Phase::Morning),
        TaskDef::new("listening", "Listening (30-45 min)", Phase::Morning),
        TaskDef::new(WRITING_TASK, "Writing", Phase::Afternoon),
        TaskDef::new("speaking", "Speaking (30 min)", Phase::Afternoon),
        TaskDef::new("error_review", "Error Notebook Review", Phase::Afternoon),
        TaskDef::new("vocabulary", "Vocabulary (10-15 min)", Phase::Afternoon),
        TaskDef::new("articles", "Articles (10 min)", Phase::Afternoon),
      ],
      writing_schedule: [
        task2.clone(),
        task1.clone(),
        task2.clone(),
        task1.clone(),
        task2,
        task1,
        None,
      ],
    }
  }
}

/// Monday = 0 … Sunday = 6.
fn weekday_index(date: NaiveDate) -> usize { date.weekday().num_days_from_monday() as usize }
