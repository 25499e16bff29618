use crate::model::{generate_id, PlannerError, ScheduleBlock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    FirstThing,
    Journal,
    EarlyMorning,
    Morning,
    Lunch,
    Afternoon,
    Evening,
    Night,
    Sleep,
}

impl Phase {
    pub const ALL: [Phase; 9] = [
        Phase::FirstThing,
        Phase::Journal,
        Phase::EarlyMorning,
        Phase::Morning,
        Phase::Lunch,
        Phase::Afternoon,
        Phase::Evening,
        Phase::Night,
        Phase::Sleep,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Phase::FirstThing => "first_thing",
            Phase::Journal => "journal",
            Phase::EarlyMorning => "early_morning",
            Phase::Morning => "morning",
            Phase::Lunch => "lunch",
            Phase::Afternoon => "afternoon",
            Phase::Evening => "evening",
            Phase::Night => "night",
            Phase::Sleep => "sleep",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::FirstThing => "First thing",
            Phase::Journal => "Journal",
            Phase::EarlyMorning => "Early morning",
            Phase::Morning => "Morning",
            Phase::Lunch => "Lunch",
            Phase::Afternoon => "Afternoon",
            Phase::Evening => "Evening",
            Phase::Night => "Night",
            Phase::Sleep => "Sleep",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Phase {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|p| p.key() == s)
            .ok_or_else(|| PlannerError::UnknownPhase(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    StandardWork,
    DeepWork,
    Weekend,
    Rest,
}

impl DayType {
    pub const ALL: [DayType; 4] = [
        DayType::StandardWork,
        DayType::DeepWork,
        DayType::Weekend,
        DayType::Rest,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            DayType::StandardWork => "standard_work",
            DayType::DeepWork => "deep_work",
            DayType::Weekend => "weekend",
            DayType::Rest => "rest",
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DayType {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayType::ALL
            .into_iter()
            .find(|d| d.key() == s)
            .ok_or_else(|| PlannerError::UnknownDayType(s.to_string()))
    }
}

/// Day-of-week 0 = Sunday .. 6 = Saturday.
pub fn is_weekend(day_of_week: u8) -> bool {
    day_of_week == 0 || day_of_week == 6
}

pub const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

type Template = Vec<(Phase, &'static str)>;

#[derive(Debug, Clone)]
pub struct TemplateSet {
    templates: Vec<(DayType, Template)>,
}

impl TemplateSet {
    /// Rejects templates that list a phase twice.
    pub fn new(templates: Vec<(DayType, Template)>) -> Result<Self, PlannerError> {
        for (day_type, template) in &templates {
            let mut seen: Vec<Phase> = Vec::new();
            for (phase, _) in template {
                if seen.contains(phase) {
                    return Err(PlannerError::DuplicatePhase {
                        day_type: day_type.key().to_string(),
                        phase: phase.key().to_string(),
                    });
                }
                seen.push(*phase);
            }
        }
        Ok(TemplateSet { templates })
    }

    pub fn builtin() -> Self {
        let templates = vec![
            (
                DayType::StandardWork,
                vec![
                    (Phase::FirstThing, "Hydrate and stretch"),
                    (Phase::Journal, "Morning pages"),
                    (Phase::EarlyMorning, "Exercise"),
                    (Phase::Morning, "Deep work block"),
                    (Phase::Lunch, "Lunch and walk"),
                    (Phase::Afternoon, "Meetings and shallow work"),
                    (Phase::Evening, "Family time"),
                    (Phase::Night, "Reading"),
                    (Phase::Sleep, "Wind down"),
                ],
            ),
            (
                DayType::DeepWork,
                vec![
                    (Phase::FirstThing, "Hydrate and stretch"),
                    (Phase::Journal, "Morning pages"),
                    (Phase::EarlyMorning, "Deep work block 1"),
                    (Phase::Morning, "Deep work block 2"),
                    (Phase::Lunch, "Lunch away from desk"),
                    (Phase::Afternoon, "Deep work block 3"),
                    (Phase::Evening, "Decompress offline"),
                    (Phase::Night, "Reading"),
                    (Phase::Sleep, "Wind down"),
                ],
            ),
            (
                DayType::Weekend,
                vec![
                    (Phase::FirstThing, "Sleep in"),
                    (Phase::Journal, "Weekly review"),
                    (Phase::Morning, "Long exercise"),
                    (Phase::Lunch, "Lunch out"),
                    (Phase::Afternoon, "Hobby time"),
                    (Phase::Evening, "Social time"),
                    (Phase::Night, "Movie or reading"),
                    (Phase::Sleep, "Wind down"),
                ],
            ),
            (
                DayType::Rest,
                vec![
                    (Phase::FirstThing, "Sleep in"),
                    (Phase::Journal, "Gratitude list"),
                    (Phase::Morning, "Gentle walk"),
                    (Phase::Lunch, "Slow lunch"),
                    (Phase::Afternoon, "Nap or unwind"),
                    (Phase::Evening, "Quiet evening"),
                    (Phase::Sleep, "Early night"),
                ],
            ),
        ];
        // Built-in templates are duplicate-free by construction.
        TemplateSet { templates }
    }

    pub fn get(&self, day_type: DayType) -> Option<&[(Phase, &'static str)]> {
        self.templates
            .iter()
            .find(|(d, _)| *d == day_type)
            .map(|(_, t)| t.as_slice())
    }
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Replace every block for `day_of_week` with fresh blocks from the chosen
/// template. Requesting `standard_work` on a weekend day silently applies the
/// weekend template instead. Blocks for other days are untouched; the new
/// blocks get fresh ids, `completed = false` and empty notes.
pub fn apply_template(
    blocks: &mut Vec<ScheduleBlock>,
    day_of_week: u8,
    day_type: DayType,
    templates: &TemplateSet,
) -> Result<DayType, PlannerError> {
    if day_of_week > 6 {
        return Err(PlannerError::InvalidDayOfWeek(day_of_week));
    }
    let effective = if day_type == DayType::StandardWork && is_weekend(day_of_week) {
        DayType::Weekend
    } else {
        day_type
    };
    let template = templates
        .get(effective)
        .ok_or_else(|| PlannerError::UnknownDayType(effective.key().to_string()))?;

    blocks.retain(|b| b.day_of_week != day_of_week);
    for (phase, activity) in template {
        blocks.push(ScheduleBlock {
            id: generate_id(),
            day_of_week,
            phase: *phase,
            activity: (*activity).to_string(),
            completed: false,
            notes: String::new(),
            day_type: effective,
        });
    }
    Ok(effective)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(day: u8, phase: Phase, day_type: DayType) -> ScheduleBlock {
        ScheduleBlock {
            id: generate_id(),
            day_of_week: day,
            phase,
            activity: "old activity".to_string(),
            completed: true,
            notes: "old notes".to_string(),
            day_type,
        }
    }

    fn phases_for(blocks: &[ScheduleBlock], day: u8) -> Vec<Phase> {
        blocks
            .iter()
            .filter(|b| b.day_of_week == day)
            .map(|b| b.phase)
            .collect()
    }

    #[test]
    fn phase_round_trips_through_from_str() {
        for phase in Phase::ALL {
            assert_eq!(phase.key().parse::<Phase>().unwrap(), phase);
        }
        assert!("brunch".parse::<Phase>().is_err());
    }

    #[test]
    fn day_type_rejects_unknown_keys() {
        assert_eq!("weekend".parse::<DayType>().unwrap(), DayType::Weekend);
        assert!("vacation".parse::<DayType>().is_err());
    }

    #[test]
    fn builtin_templates_pass_validation() {
        let builtin = TemplateSet::builtin();
        assert!(TemplateSet::new(builtin.templates).is_ok());
    }

    #[test]
    fn duplicate_phase_in_template_is_rejected() {
        let result = TemplateSet::new(vec![(
            DayType::Rest,
            vec![(Phase::Morning, "a"), (Phase::Morning, "b")],
        )]);
        assert!(result.is_err());
    }

    #[test]
    fn standard_work_on_weekend_substitutes_weekend_template() {
        let templates = TemplateSet::builtin();
        let weekend_phases: Vec<Phase> = templates
            .get(DayType::Weekend)
            .unwrap()
            .iter()
            .map(|(p, _)| *p)
            .collect();

        for day in [0u8, 6] {
            let mut blocks = Vec::new();
            let applied =
                apply_template(&mut blocks, day, DayType::StandardWork, &templates).unwrap();
            assert_eq!(applied, DayType::Weekend);
            assert_eq!(phases_for(&blocks, day), weekend_phases);
        }
    }

    #[test]
    fn standard_work_on_weekday_stays_standard() {
        let templates = TemplateSet::builtin();
        let mut blocks = Vec::new();
        let applied =
            apply_template(&mut blocks, 3, DayType::StandardWork, &templates).unwrap();
        assert_eq!(applied, DayType::StandardWork);
        assert_eq!(phases_for(&blocks, 3).len(), Phase::ALL.len());
    }

    #[test]
    fn replace_removes_stale_phases() {
        // Rest has no EarlyMorning or Night phases; a prior day with the full
        // phase set must end up with exactly the rest template's phases.
        let templates = TemplateSet::builtin();
        let mut blocks: Vec<ScheduleBlock> = Phase::ALL
            .into_iter()
            .map(|p| block(2, p, DayType::StandardWork))
            .collect();

        apply_template(&mut blocks, 2, DayType::Rest, &templates).unwrap();

        let expected: Vec<Phase> = templates
            .get(DayType::Rest)
            .unwrap()
            .iter()
            .map(|(p, _)| *p)
            .collect();
        assert_eq!(phases_for(&blocks, 2), expected);
    }

    #[test]
    fn other_days_are_untouched() {
        let templates = TemplateSet::builtin();
        let mut blocks = vec![
            block(1, Phase::Morning, DayType::StandardWork),
            block(4, Phase::Lunch, DayType::DeepWork),
        ];
        let before_day4 = blocks[1].clone();

        apply_template(&mut blocks, 1, DayType::DeepWork, &templates).unwrap();

        let day4: Vec<&ScheduleBlock> =
            blocks.iter().filter(|b| b.day_of_week == 4).collect();
        assert_eq!(day4.len(), 1);
        assert_eq!(day4[0].id, before_day4.id);
        assert_eq!(day4[0].activity, before_day4.activity);
    }

    #[test]
    fn fresh_blocks_are_reset_with_new_ids() {
        let templates = TemplateSet::builtin();
        let mut blocks = vec![block(5, Phase::Morning, DayType::StandardWork)];
        let old_id = blocks[0].id.clone();

        apply_template(&mut blocks, 5, DayType::StandardWork, &templates).unwrap();

        for b in blocks.iter().filter(|b| b.day_of_week == 5) {
            assert_ne!(b.id, old_id);
            assert!(!b.completed);
            assert!(b.notes.is_empty());
        }
    }

    #[test]
    fn out_of_range_day_is_rejected() {
        let templates = TemplateSet::builtin();
        let mut blocks = Vec::new();
        assert!(apply_template(&mut blocks, 7, DayType::Weekend, &templates).is_err());
    }
}
