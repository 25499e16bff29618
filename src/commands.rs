use crate::cli::{JournalAction, QuoteAction, ScheduleAction};
use crate::model::Planner;
use crate::schedule::{apply_template, DayType, Phase, TemplateSet, DAY_NAMES};
use crate::storage::PlannerStore;
use crate::timeline::ItemKind;
use crate::ui;
use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, Utc};
use std::env;

pub fn init(name: Option<String>) -> Result<()> {
    let cwd = env::current_dir()?;
    let store = PlannerStore::init_project(&cwd, name)?;
    println!("Initialized planner at {}", store.path().display());
    Ok(())
}

pub fn add_vision(title: String, description: Option<String>, date: Option<String>) -> Result<()> {
    let (mut planner, store) = load_current_planner()?;
    let target = parse_date(date.as_deref())?;
    let id = planner
        .add_vision(title, description, target)
        .context("adding vision")?;
    store.save(&planner)?;
    println!("Added vision {}", id);
    Ok(())
}

pub fn add_bhag(title: String, vision: Option<String>, date: Option<String>) -> Result<()> {
    let (mut planner, store) = load_current_planner()?;
    let target = parse_date(date.as_deref())?;
    let id = planner
        .add_bhag(title, vision, target)
        .context("adding bhag")?;
    store.save(&planner)?;
    println!("Added bhag {}", id);
    Ok(())
}

pub fn add_milestone(title: String, bhag: Option<String>, date: Option<String>) -> Result<()> {
    let (mut planner, store) = load_current_planner()?;
    let target = parse_date(date.as_deref())?;
    let id = planner
        .add_milestone(title, bhag, target)
        .context("adding milestone")?;
    store.save(&planner)?;
    println!("Added milestone {}", id);
    Ok(())
}

pub fn list_goals() -> Result<()> {
    let (planner, store) = load_current_planner()?;
    println!("Planner: {} ({})", planner.name, store.scope().label());
    if planner.visions.is_empty() && planner.bhags.is_empty() && planner.milestones.is_empty() {
        println!("No goals yet. Try `winday vision \"...\"`.");
        return Ok(());
    }
    for vision in &planner.visions {
        print_goal_line(0, &vision.id, &vision.title, vision.target_date, vision.completed);
        for bhag in planner
            .bhags
            .iter()
            .filter(|b| b.vision_id.as_deref() == Some(vision.id.as_str()))
        {
            print_goal_line(1, &bhag.id, &bhag.title, bhag.target_date, bhag.completed);
            for ms in planner
                .milestones
                .iter()
                .filter(|m| m.bhag_id.as_deref() == Some(bhag.id.as_str()))
            {
                print_goal_line(2, &ms.id, &ms.title, ms.target_date, ms.completed);
            }
        }
    }
    let orphan_bhags: Vec<_> = planner
        .bhags
        .iter()
        .filter(|b| b.vision_id.is_none())
        .collect();
    let orphan_milestones: Vec<_> = planner
        .milestones
        .iter()
        .filter(|m| m.bhag_id.is_none())
        .collect();
    if !orphan_bhags.is_empty() || !orphan_milestones.is_empty() {
        println!("(unattached)");
        for bhag in orphan_bhags {
            print_goal_line(1, &bhag.id, &bhag.title, bhag.target_date, bhag.completed);
        }
        for ms in orphan_milestones {
            print_goal_line(2, &ms.id, &ms.title, ms.target_date, ms.completed);
        }
    }
    Ok(())
}

pub fn complete(kind: String, id: String) -> Result<()> {
    let (mut planner, store) = load_current_planner()?;
    let kind = parse_kind(&kind)?;
    let completed = planner
        .toggle_goal(kind, &id)
        .with_context(|| format!("toggling {} {}", kind.label(), id))?;
    store.save(&planner)?;
    println!(
        "Marked {} {} as {}",
        kind.label(),
        id,
        if completed { "completed" } else { "open" }
    );
    Ok(())
}

pub fn journal(action: JournalAction) -> Result<()> {
    match action {
        JournalAction::Add { title, body, date } => {
            let (mut planner, store) = load_current_planner()?;
            let written_on = parse_date(date.as_deref())?.unwrap_or_else(|| Utc::now().date_naive());
            let id = planner
                .add_journal_entry(written_on, title, body)
                .context("adding journal entry")?;
            store.save(&planner)?;
            println!("Added journal entry {} for {}", id, written_on);
        }
        JournalAction::List { limit } => {
            let (planner, _) = load_current_planner()?;
            let mut entries: Vec<_> = planner.journal.iter().collect();
            entries.sort_by_key(|e| std::cmp::Reverse(e.written_on));
            let shown = limit.unwrap_or(entries.len());
            if entries.is_empty() {
                println!("No journal entries yet.");
            }
            for entry in entries.into_iter().take(shown) {
                println!("{} [{}] {}", entry.written_on, entry.id, entry.title);
                if let Some(body) = &entry.body {
                    for line in body.lines() {
                        println!("    {}", line);
                    }
                }
            }
        }
    }
    Ok(())
}

pub fn schedule(action: ScheduleAction) -> Result<()> {
    match action {
        ScheduleAction::Show => {
            let (planner, _) = load_current_planner()?;
            if planner.schedule.is_empty() {
                println!("No schedule yet. Try `winday schedule apply mon standard_work`.");
                return Ok(());
            }
            for day in 0u8..7 {
                let blocks: Vec<_> = planner
                    .schedule
                    .iter()
                    .filter(|b| b.day_of_week == day)
                    .collect();
                if blocks.is_empty() {
                    continue;
                }
                println!("{} ({})", DAY_NAMES[day as usize], blocks[0].day_type);
                for phase in Phase::ALL {
                    if let Some(block) = blocks.iter().find(|b| b.phase == phase) {
                        println!(
                            "  [{}] {:<14} {} {}",
                            block.id,
                            phase.label(),
                            if block.completed { "x" } else { " " },
                            block.activity
                        );
                        if !block.notes.is_empty() {
                            println!("           note: {}", block.notes);
                        }
                    }
                }
            }
        }
        ScheduleAction::Apply { day, day_type } => {
            let (mut planner, store) = load_current_planner()?;
            let day = parse_day(&day)?;
            let day_type: DayType = day_type.parse()?;
            let templates = TemplateSet::builtin();
            let applied = apply_template(&mut planner.schedule, day, day_type, &templates)
                .context("applying day template")?;
            store.save(&planner)?;
            if applied != day_type {
                println!(
                    "Applied {} to {} ({} substituted on weekends)",
                    applied, DAY_NAMES[day as usize], day_type
                );
            } else {
                println!("Applied {} to {}", applied, DAY_NAMES[day as usize]);
            }
        }
        ScheduleAction::SetActivity { block_id, activity } => {
            let (mut planner, store) = load_current_planner()?;
            planner
                .set_block_activity(&block_id, activity)
                .with_context(|| format!("updating block {}", block_id))?;
            store.save(&planner)?;
            println!("Updated block {}", block_id);
        }
        ScheduleAction::Note { block_id, text } => {
            let (mut planner, store) = load_current_planner()?;
            planner
                .set_block_note(&block_id, text)
                .with_context(|| format!("noting block {}", block_id))?;
            store.save(&planner)?;
            println!("Noted block {}", block_id);
        }
        ScheduleAction::Check { block_id } => {
            let (mut planner, store) = load_current_planner()?;
            let completed = planner
                .toggle_block(&block_id)
                .with_context(|| format!("toggling block {}", block_id))?;
            store.save(&planner)?;
            println!(
                "Block {} {}",
                block_id,
                if completed { "done" } else { "reopened" }
            );
        }
    }
    Ok(())
}

pub fn quote(action: QuoteAction) -> Result<()> {
    match action {
        QuoteAction::Add { text, author } => {
            let (mut planner, store) = load_current_planner()?;
            let id = planner.add_quote(text, author).context("adding quote")?;
            store.save(&planner)?;
            println!("Added quote {}", id);
        }
        QuoteAction::List => {
            let (planner, _) = load_current_planner()?;
            if planner.quotes.is_empty() {
                println!("No quotes yet.");
            }
            for quote in &planner.quotes {
                print_quote(quote);
            }
        }
        QuoteAction::Random => {
            let (planner, _) = load_current_planner()?;
            match planner.random_quote() {
                Some(quote) => print_quote(quote),
                None => println!("No quotes yet."),
            }
        }
        QuoteAction::Favorite { id } => {
            let (mut planner, store) = load_current_planner()?;
            let favorite = planner
                .toggle_quote_favorite(&id)
                .with_context(|| format!("toggling quote {}", id))?;
            store.save(&planner)?;
            println!(
                "Quote {} {}",
                id,
                if favorite { "favorited" } else { "unfavorited" }
            );
        }
    }
    Ok(())
}

pub fn tui() -> Result<()> {
    let (planner, store) = load_current_planner()?;
    ui::run(planner, store)
}

fn load_current_planner() -> Result<(Planner, PlannerStore)> {
    let cwd = env::current_dir()?;
    let store = PlannerStore::discover(&cwd)?;
    let planner = store.load()?;
    Ok((planner, store))
}

fn parse_date(input: Option<&str>) -> Result<Option<NaiveDate>> {
    let raw = match input {
        Some(r) => r.trim(),
        None => return Ok(None),
    };
    if raw.is_empty() {
        return Ok(None);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| anyhow!("invalid date format (use YYYY-MM-DD): {}", raw))?;
    Ok(Some(date))
}

fn parse_kind(input: &str) -> Result<ItemKind> {
    match input.trim().to_lowercase().as_str() {
        "vision" => Ok(ItemKind::Vision),
        "bhag" => Ok(ItemKind::Bhag),
        "milestone" => Ok(ItemKind::Milestone),
        other => bail!("unknown goal kind (use vision, bhag or milestone): {}", other),
    }
}

fn parse_day(input: &str) -> Result<u8> {
    let trimmed = input.trim().to_lowercase();
    if let Ok(num) = trimmed.parse::<u8>() {
        if num <= 6 {
            return Ok(num);
        }
        bail!("day of week out of range (0-6): {}", num);
    }
    let idx = DAY_NAMES
        .iter()
        .position(|name| name.to_lowercase() == trimmed)
        .ok_or_else(|| anyhow!("unknown day (use 0-6 or sun..sat): {}", input))?;
    Ok(idx as u8)
}

fn print_goal_line(
    depth: usize,
    id: &str,
    title: &str,
    target: Option<NaiveDate>,
    completed: bool,
) {
    let indent = "  ".repeat(depth);
    let mark = if completed { "x" } else { " " };
    match target {
        Some(date) => println!("{}[{}] ({}) {} (due {})", indent, mark, id, title, date),
        None => println!("{}[{}] ({}) {}", indent, mark, id, title),
    }
}

fn print_quote(quote: &crate::model::Quote) {
    let star = if quote.favorite { "*" } else { " " };
    match &quote.author {
        Some(author) => println!("[{}]{} \"{}\" - {}", quote.id, star, quote.text, author),
        None => println!("[{}]{} \"{}\"", quote.id, star, quote.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_day_accepts_numbers_and_names() {
        assert_eq!(parse_day("0").unwrap(), 0);
        assert_eq!(parse_day("6").unwrap(), 6);
        assert_eq!(parse_day("Mon").unwrap(), 1);
        assert_eq!(parse_day("sat").unwrap(), 6);
        assert!(parse_day("7").is_err());
        assert!(parse_day("someday").is_err());
    }

    #[test]
    fn parse_date_handles_missing_and_invalid() {
        assert_eq!(parse_date(None).unwrap(), None);
        assert_eq!(parse_date(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_date(Some("2026-03-01")).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
        assert!(parse_date(Some("03/01/2026")).is_err());
    }

    #[test]
    fn parse_kind_rejects_journal() {
        assert!(parse_kind("vision").is_ok());
        assert!(parse_kind("BHAG").is_ok());
        assert!(parse_kind("journal").is_err());
    }
}
