use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "winday", version, about = "Terminal goal, journal and schedule planner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a project planner in the current directory
    Init {
        /// Optional planner name
        #[arg(long)]
        name: Option<String>,
    },
    /// Add a top-level vision
    Vision {
        /// Vision title
        title: String,
        /// Longer description
        #[arg(long)]
        description: Option<String>,
        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Add a BHAG, optionally under a vision
    Bhag {
        /// BHAG title
        title: String,
        /// Parent vision id
        #[arg(long)]
        vision: Option<String>,
        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Add a milestone, optionally under a BHAG
    Milestone {
        /// Milestone title
        title: String,
        /// Parent BHAG id
        #[arg(long)]
        bhag: Option<String>,
        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// List the goal hierarchy
    Goals,
    /// Toggle completion on a goal
    Complete {
        /// Goal kind: vision, bhag or milestone
        kind: String,
        /// Goal id
        id: String,
    },
    /// Journal entries
    Journal {
        #[command(subcommand)]
        action: JournalAction,
    },
    /// Weekly schedule
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },
    /// Quote collection
    Quote {
        #[command(subcommand)]
        action: QuoteAction,
    },
    /// Launch the interactive TUI
    Tui,
}

#[derive(Subcommand, Debug)]
pub enum JournalAction {
    /// Write a new entry
    Add {
        /// Entry title
        title: String,
        /// Entry body
        #[arg(long)]
        body: Option<String>,
        /// Entry date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// List entries, newest first
    List {
        /// Show at most this many entries
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ScheduleAction {
    /// Print the week grid
    Show,
    /// Apply a day-type template to a day (replaces that day's blocks)
    Apply {
        /// Day of week: 0 (Sunday) through 6 (Saturday), or a name like mon
        day: String,
        /// Day type: standard_work, deep_work, weekend or rest
        day_type: String,
    },
    /// Override the activity for one block
    SetActivity {
        /// Block id
        block_id: String,
        /// New activity text
        activity: String,
    },
    /// Attach a note to one block (empty text clears it)
    Note {
        /// Block id
        block_id: String,
        /// Note text
        text: String,
    },
    /// Toggle completion on a block
    Check {
        /// Block id
        block_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum QuoteAction {
    /// Add a quote
    Add {
        /// Quote text
        text: String,
        /// Attribution
        #[arg(long)]
        author: Option<String>,
    },
    /// List all quotes
    List,
    /// Print one quote at random
    Random,
    /// Toggle a quote's favorite flag
    Favorite {
        /// Quote id
        id: String,
    },
}
