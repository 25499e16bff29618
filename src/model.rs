use crate::schedule::{DayType, Phase};
use crate::timeline::{ItemKind, TimelineItem};
use chrono::{DateTime, NaiveDate, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum PlannerError {
    #[error("vision not found: {0}")]
    VisionNotFound(String),
    #[error("bhag not found: {0}")]
    BhagNotFound(String),
    #[error("milestone not found: {0}")]
    MilestoneNotFound(String),
    #[error("journal entry not found: {0}")]
    JournalEntryNotFound(String),
    #[error("schedule block not found: {0}")]
    BlockNotFound(String),
    #[error("quote not found: {0}")]
    QuoteNotFound(String),
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("unknown phase: {0}")]
    UnknownPhase(String),
    #[error("unknown day type: {0}")]
    UnknownDayType(String),
    #[error("day of week out of range (0-6): {0}")]
    InvalidDayOfWeek(u8),
    #[error("template for {day_type} lists phase {phase} twice")]
    DuplicatePhase { day_type: String, phase: String },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Vision {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Bhag {
    pub id: String,
    pub vision_id: Option<String>,
    pub title: String,
    pub target_date: Option<NaiveDate>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Milestone {
    pub id: String,
    pub bhag_id: Option<String>,
    pub title: String,
    pub target_date: Option<NaiveDate>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JournalEntry {
    pub id: String,
    pub written_on: NaiveDate,
    pub title: String,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Quote {
    pub id: String,
    pub text: String,
    pub author: Option<String>,
    pub favorite: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScheduleBlock {
    pub id: String,
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: u8,
    pub phase: Phase,
    pub activity: String,
    pub completed: bool,
    pub notes: String,
    pub day_type: DayType,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Planner {
    pub name: String,
    pub visions: Vec<Vision>,
    pub bhags: Vec<Bhag>,
    pub milestones: Vec<Milestone>,
    pub journal: Vec<JournalEntry>,
    pub quotes: Vec<Quote>,
    pub schedule: Vec<ScheduleBlock>,
}

impl Planner {
    pub fn default_named(name: impl Into<String>) -> Self {
        Planner {
            name: name.into(),
            visions: Vec::new(),
            bhags: Vec::new(),
            milestones: Vec::new(),
            journal: Vec::new(),
            quotes: vec![
                Quote {
                    id: generate_id(),
                    text: "Whether you think you can or you think you can't, you're right."
                        .to_string(),
                    author: Some("Henry Ford".to_string()),
                    favorite: false,
                },
                Quote {
                    id: generate_id(),
                    text: "Win the morning, win the day.".to_string(),
                    author: None,
                    favorite: false,
                },
            ],
            schedule: Vec::new(),
        }
    }

    pub fn add_vision(
        &mut self,
        title: String,
        description: Option<String>,
        target_date: Option<NaiveDate>,
    ) -> Result<String, PlannerError> {
        let title = non_empty(title)?;
        let id = generate_id();
        self.visions.push(Vision {
            id: id.clone(),
            title,
            description,
            target_date,
            completed: false,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    pub fn add_bhag(
        &mut self,
        title: String,
        vision_id: Option<String>,
        target_date: Option<NaiveDate>,
    ) -> Result<String, PlannerError> {
        let title = non_empty(title)?;
        if let Some(ref vid) = vision_id {
            if !self.visions.iter().any(|v| &v.id == vid) {
                return Err(PlannerError::VisionNotFound(vid.clone()));
            }
        }
        let id = generate_id();
        self.bhags.push(Bhag {
            id: id.clone(),
            vision_id,
            title,
            target_date,
            completed: false,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    pub fn add_milestone(
        &mut self,
        title: String,
        bhag_id: Option<String>,
        target_date: Option<NaiveDate>,
    ) -> Result<String, PlannerError> {
        let title = non_empty(title)?;
        if let Some(ref bid) = bhag_id {
            if !self.bhags.iter().any(|b| &b.id == bid) {
                return Err(PlannerError::BhagNotFound(bid.clone()));
            }
        }
        let id = generate_id();
        self.milestones.push(Milestone {
            id: id.clone(),
            bhag_id,
            title,
            target_date,
            completed: false,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    pub fn add_journal_entry(
        &mut self,
        written_on: NaiveDate,
        title: String,
        body: Option<String>,
    ) -> Result<String, PlannerError> {
        let title = non_empty(title)?;
        let id = generate_id();
        self.journal.push(JournalEntry {
            id: id.clone(),
            written_on,
            title,
            body,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    pub fn add_quote(
        &mut self,
        text: String,
        author: Option<String>,
    ) -> Result<String, PlannerError> {
        let text = non_empty(text)?;
        let id = generate_id();
        self.quotes.push(Quote {
            id: id.clone(),
            text,
            author,
            favorite: false,
        });
        Ok(id)
    }

    pub fn toggle_quote_favorite(&mut self, id: &str) -> Result<bool, PlannerError> {
        let quote = self
            .quotes
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| PlannerError::QuoteNotFound(id.to_string()))?;
        quote.favorite = !quote.favorite;
        Ok(quote.favorite)
    }

    /// Ids are looked up within the given kind only; they are not unique
    /// across kinds.
    pub fn toggle_goal(&mut self, kind: ItemKind, id: &str) -> Result<bool, PlannerError> {
        match kind {
            ItemKind::Vision => {
                let v = self
                    .visions
                    .iter_mut()
                    .find(|v| v.id == id)
                    .ok_or_else(|| PlannerError::VisionNotFound(id.to_string()))?;
                v.completed = !v.completed;
                Ok(v.completed)
            }
            ItemKind::Bhag => {
                let b = self
                    .bhags
                    .iter_mut()
                    .find(|b| b.id == id)
                    .ok_or_else(|| PlannerError::BhagNotFound(id.to_string()))?;
                b.completed = !b.completed;
                Ok(b.completed)
            }
            ItemKind::Milestone => {
                let m = self
                    .milestones
                    .iter_mut()
                    .find(|m| m.id == id)
                    .ok_or_else(|| PlannerError::MilestoneNotFound(id.to_string()))?;
                m.completed = !m.completed;
                Ok(m.completed)
            }
            ItemKind::Journal => Err(PlannerError::JournalEntryNotFound(id.to_string())),
        }
    }

    pub fn delete_goal(&mut self, kind: ItemKind, id: &str) -> Result<(), PlannerError> {
        match kind {
            ItemKind::Vision => {
                let before = self.visions.len();
                self.visions.retain(|v| v.id != id);
                if self.visions.len() == before {
                    return Err(PlannerError::VisionNotFound(id.to_string()));
                }
                // Detach orphaned bhags rather than cascading the delete.
                for bhag in &mut self.bhags {
                    if bhag.vision_id.as_deref() == Some(id) {
                        bhag.vision_id = None;
                    }
                }
                Ok(())
            }
            ItemKind::Bhag => {
                let before = self.bhags.len();
                self.bhags.retain(|b| b.id != id);
                if self.bhags.len() == before {
                    return Err(PlannerError::BhagNotFound(id.to_string()));
                }
                for milestone in &mut self.milestones {
                    if milestone.bhag_id.as_deref() == Some(id) {
                        milestone.bhag_id = None;
                    }
                }
                Ok(())
            }
            ItemKind::Milestone => {
                let before = self.milestones.len();
                self.milestones.retain(|m| m.id != id);
                if self.milestones.len() == before {
                    return Err(PlannerError::MilestoneNotFound(id.to_string()));
                }
                Ok(())
            }
            ItemKind::Journal => {
                let before = self.journal.len();
                self.journal.retain(|e| e.id != id);
                if self.journal.len() == before {
                    return Err(PlannerError::JournalEntryNotFound(id.to_string()));
                }
                Ok(())
            }
        }
    }

    pub fn set_block_activity(
        &mut self,
        block_id: &str,
        activity: String,
    ) -> Result<(), PlannerError> {
        let block = self
            .schedule
            .iter_mut()
            .find(|b| b.id == block_id)
            .ok_or_else(|| PlannerError::BlockNotFound(block_id.to_string()))?;
        block.activity = activity;
        Ok(())
    }

    pub fn set_block_note(&mut self, block_id: &str, notes: String) -> Result<(), PlannerError> {
        let block = self
            .schedule
            .iter_mut()
            .find(|b| b.id == block_id)
            .ok_or_else(|| PlannerError::BlockNotFound(block_id.to_string()))?;
        block.notes = notes;
        Ok(())
    }

    pub fn toggle_block(&mut self, block_id: &str) -> Result<bool, PlannerError> {
        let block = self
            .schedule
            .iter_mut()
            .find(|b| b.id == block_id)
            .ok_or_else(|| PlannerError::BlockNotFound(block_id.to_string()))?;
        block.completed = !block.completed;
        Ok(block.completed)
    }

    pub fn block_for(&self, day_of_week: u8, phase: Phase) -> Option<&ScheduleBlock> {
        self.schedule
            .iter()
            .find(|b| b.day_of_week == day_of_week && b.phase == phase)
    }

    // Dateless goals cannot be placed and are filtered out here.
    pub fn goal_timeline_items(&self) -> Vec<TimelineItem> {
        let mut items = Vec::new();
        for v in &self.visions {
            if let Some(date) = v.target_date {
                items.push(TimelineItem {
                    id: v.id.clone(),
                    kind: ItemKind::Vision,
                    content: v.title.clone(),
                    target_date: date,
                    completed: v.completed,
                });
            }
        }
        for b in &self.bhags {
            if let Some(date) = b.target_date {
                items.push(TimelineItem {
                    id: b.id.clone(),
                    kind: ItemKind::Bhag,
                    content: b.title.clone(),
                    target_date: date,
                    completed: b.completed,
                });
            }
        }
        for m in &self.milestones {
            if let Some(date) = m.target_date {
                items.push(TimelineItem {
                    id: m.id.clone(),
                    kind: ItemKind::Milestone,
                    content: m.title.clone(),
                    target_date: date,
                    completed: m.completed,
                });
            }
        }
        items
    }

    pub fn journal_timeline_items(&self) -> Vec<TimelineItem> {
        self.journal
            .iter()
            .map(|e| TimelineItem {
                id: e.id.clone(),
                kind: ItemKind::Journal,
                content: e.title.clone(),
                target_date: e.written_on,
                completed: false,
            })
            .collect()
    }

    pub fn random_quote(&self) -> Option<&Quote> {
        if self.quotes.is_empty() {
            return None;
        }
        let idx = rand::thread_rng().gen_range(0..self.quotes.len());
        self.quotes.get(idx)
    }
}

fn non_empty(value: String) -> Result<String, PlannerError> {
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() {
        return Err(PlannerError::EmptyTitle);
    }
    Ok(trimmed)
}

pub fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn bhag_requires_existing_vision() {
        let mut planner = Planner::default_named("test");
        let err = planner.add_bhag("run a marathon".into(), Some("nope".into()), None);
        assert!(matches!(err, Err(PlannerError::VisionNotFound(_))));

        let vision_id = planner.add_vision("health".into(), None, None).unwrap();
        assert!(planner
            .add_bhag("run a marathon".into(), Some(vision_id), None)
            .is_ok());
    }

    #[test]
    fn milestone_requires_existing_bhag() {
        let mut planner = Planner::default_named("test");
        let err = planner.add_milestone("10k race".into(), Some("nope".into()), None);
        assert!(matches!(err, Err(PlannerError::BhagNotFound(_))));
    }

    #[test]
    fn empty_titles_are_rejected() {
        let mut planner = Planner::default_named("test");
        assert!(matches!(
            planner.add_vision("   ".into(), None, None),
            Err(PlannerError::EmptyTitle)
        ));
        assert!(matches!(
            planner.add_journal_entry(date(2026, 3, 1), "".into(), None),
            Err(PlannerError::EmptyTitle)
        ));
    }

    #[test]
    fn dateless_goals_are_excluded_from_timeline_items() {
        let mut planner = Planner::default_named("test");
        planner
            .add_vision("dated".into(), None, Some(date(2030, 1, 1)))
            .unwrap();
        planner.add_vision("undated".into(), None, None).unwrap();
        planner
            .add_milestone("undated too".into(), None, None)
            .unwrap();

        let items = planner.goal_timeline_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, "dated");
    }

    #[test]
    fn toggle_goal_flips_completion_within_kind_only() {
        let mut planner = Planner::default_named("test");
        let id = planner
            .add_milestone("ship v1".into(), None, Some(date(2026, 6, 1)))
            .unwrap();

        assert!(planner.toggle_goal(ItemKind::Milestone, &id).unwrap());
        assert!(!planner.toggle_goal(ItemKind::Milestone, &id).unwrap());
        // Same id under a different kind does not resolve.
        assert!(planner.toggle_goal(ItemKind::Vision, &id).is_err());
    }

    #[test]
    fn deleting_a_vision_detaches_its_bhags() {
        let mut planner = Planner::default_named("test");
        let vid = planner.add_vision("health".into(), None, None).unwrap();
        planner
            .add_bhag("marathon".into(), Some(vid.clone()), None)
            .unwrap();

        planner.delete_goal(ItemKind::Vision, &vid).unwrap();
        assert!(planner.visions.is_empty());
        assert_eq!(planner.bhags.len(), 1);
        assert!(planner.bhags[0].vision_id.is_none());
    }

    #[test]
    fn block_notes_survive_yaml_round_trip() {
        let mut planner = Planner::default_named("notes");
        crate::schedule::apply_template(
            &mut planner.schedule,
            2,
            crate::schedule::DayType::DeepWork,
            &crate::schedule::TemplateSet::builtin(),
        )
        .unwrap();
        let block_id = planner.schedule[0].id.clone();

        assert!(planner
            .set_block_note("nope", "lost".into())
            .is_err());
        planner
            .set_block_note(&block_id, "bring the good coffee".into())
            .unwrap();

        let yaml = serde_yaml::to_string(&planner).unwrap();
        let restored: Planner = serde_yaml::from_str(&yaml).unwrap();
        let block = restored.schedule.iter().find(|b| b.id == block_id).unwrap();
        assert_eq!(block.notes, "bring the good coffee");
    }

    #[test]
    fn planner_round_trips_through_yaml() {
        let mut planner = Planner::default_named("roundtrip");
        planner
            .add_vision(
                "health".into(),
                Some("stay strong".into()),
                Some(date(2030, 1, 1)),
            )
            .unwrap();
        planner
            .add_journal_entry(date(2026, 3, 1), "good day".into(), Some("notes".into()))
            .unwrap();
        crate::schedule::apply_template(
            &mut planner.schedule,
            1,
            crate::schedule::DayType::StandardWork,
            &crate::schedule::TemplateSet::builtin(),
        )
        .unwrap();

        let yaml = serde_yaml::to_string(&planner).unwrap();
        let restored: Planner = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(restored.visions.len(), 1);
        assert_eq!(restored.journal.len(), 1);
        assert_eq!(restored.schedule.len(), planner.schedule.len());
        assert_eq!(restored.schedule[0].phase, planner.schedule[0].phase);
    }
}
