use crate::model::Planner;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

pub const PLANNER_DIR: &str = ".winday";
pub const PLANNER_FILE: &str = "planner.yml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerScope {
    Project,
    Global,
}

impl PlannerScope {
    pub fn label(&self) -> &'static str {
        match self {
            PlannerScope::Project => "project",
            PlannerScope::Global => "global",
        }
    }
}

/// Handle to the planner file backing one session.
#[derive(Debug, Clone)]
pub struct PlannerStore {
    path: PathBuf,
    scope: PlannerScope,
}

impl PlannerStore {
    /// Find the planner governing `start`: the nearest `.winday/planner.yml`
    /// in `start` or any ancestor, falling back to the global one.
    pub fn discover(start: &Path) -> Result<Self> {
        let project = start
            .ancestors()
            .map(|dir| dir.join(PLANNER_DIR).join(PLANNER_FILE))
            .find(|candidate| candidate.exists());
        match project {
            Some(path) => Ok(PlannerStore {
                path,
                scope: PlannerScope::Project,
            }),
            None => Self::global(),
        }
    }

    /// Set up a project planner under `cwd`, seeding the file on first init
    /// and leaving an existing one alone.
    pub fn init_project(cwd: &Path, name: Option<String>) -> Result<Self> {
        let dir = cwd.join(PLANNER_DIR);
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        let store = PlannerStore {
            path: dir.join(PLANNER_FILE),
            scope: PlannerScope::Project,
        };
        if !store.path.exists() {
            let name = name.unwrap_or_else(|| dir_name(cwd));
            store.save(&Planner::default_named(name))?;
        }
        Ok(store)
    }

    fn global() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "winday").context("locating data directory")?;
        Ok(PlannerStore {
            path: dirs.data_dir().join(PLANNER_FILE),
            scope: PlannerScope::Global,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn scope(&self) -> PlannerScope {
        self.scope
    }

    /// Read the planner, seeding a default when the file does not exist yet.
    pub fn load(&self) -> Result<Planner> {
        if !self.path.exists() {
            let planner = Planner::default_named(self.seed_name());
            self.save(&planner)?;
            return Ok(planner);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        serde_yaml::from_str(&raw).with_context(|| format!("parsing {}", self.path.display()))
    }

    pub fn save(&self, planner: &Planner) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let raw = serde_yaml::to_string(planner).context("serializing planner")?;
        fs::write(&self.path, raw).with_context(|| format!("writing {}", self.path.display()))
    }

    fn seed_name(&self) -> String {
        match self.scope {
            // <project>/.winday/planner.yml: name after the project directory.
            PlannerScope::Project => self
                .path
                .ancestors()
                .nth(2)
                .map(dir_name)
                .unwrap_or_else(|| "planner".to_string()),
            PlannerScope::Global => "default".to_string(),
        }
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("planner")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn scratch_dir() -> PathBuf {
        let dir = env::temp_dir().join(format!("winday-test-{}", crate::model::generate_id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn init_then_discover_from_nested_dir() {
        let root = scratch_dir();
        let store = PlannerStore::init_project(&root, Some("deep".into())).unwrap();
        assert_eq!(store.scope(), PlannerScope::Project);

        let nested = root.join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        let found = PlannerStore::discover(&nested).unwrap();
        assert_eq!(found.scope(), PlannerScope::Project);
        assert_eq!(found.path(), store.path());
        assert_eq!(found.load().unwrap().name, "deep");

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn init_does_not_clobber_an_existing_planner() {
        let root = scratch_dir();
        let store = PlannerStore::init_project(&root, Some("first".into())).unwrap();
        let mut planner = store.load().unwrap();
        planner.add_vision("keep me".into(), None, None).unwrap();
        store.save(&planner).unwrap();

        let again = PlannerStore::init_project(&root, Some("second".into())).unwrap();
        let reloaded = again.load().unwrap();
        assert_eq!(reloaded.name, "first");
        assert_eq!(reloaded.visions.len(), 1);

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn load_seeds_a_default_when_file_is_missing() {
        let root = scratch_dir();
        let store = PlannerStore {
            path: root.join(PLANNER_DIR).join(PLANNER_FILE),
            scope: PlannerScope::Project,
        };
        let planner = store.load().unwrap();
        assert!(!planner.quotes.is_empty());
        assert!(store.path().exists());
        // Seed name comes from the directory the planner lives under.
        assert_eq!(planner.name, dir_name(&root));

        fs::remove_dir_all(&root).unwrap();
    }
}
