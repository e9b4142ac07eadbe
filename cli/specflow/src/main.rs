//! Specflow CLI: drives the specification lifecycle over `.spf` files.

mod commands;
mod manifest;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use specflow_core::ActorRef;
use specflow_lifecycle::Verdict;

use commands::story::StoryFields;
use commands::workspace::Workspace;

/// Environment variable holding a tracing filter.
const LOG_ENV: &str = "SPECFLOW_LOG";

#[derive(Parser)]
#[command(name = "specflow", version, about = "Specification lifecycle engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new workspace directory with a specflow.toml
    Init {
        /// Workspace name
        name: String,
    },
    /// Create a new spec
    New {
        /// Spec id, used as the file name
        id: String,
        /// Spec title
        title: String,
        /// Priority (urgent, high, medium, low)
        #[arg(long)]
        priority: Option<String>,
        /// Initial description
        #[arg(long)]
        description: Option<String>,
        /// Planning cycle label
        #[arg(long)]
        cycle: Option<String>,
    },
    /// List specs in the workspace
    List {
        /// Case-insensitive search over id and title
        #[arg(long)]
        query: Option<String>,
        /// Sort key (priority, updated, title, id)
        #[arg(long)]
        sort: Option<String>,
        /// Output format (text, json)
        #[arg(long)]
        export: Option<String>,
    },
    /// Show a spec's summary and stories
    Show {
        id: String,
        /// Output format (text, json)
        #[arg(long)]
        export: Option<String>,
    },
    /// Move a spec to a stage (requirements, technical-design, implementation-tasks)
    Stage { id: String, stage: String },
    /// Release the requirements lock
    Unlock { id: String },
    /// Set the spec status (draft, review, approved, implemented)
    Status { id: String, status: String },
    /// Replace the working description
    Describe {
        id: String,
        /// New description text
        text: Option<String>,
        /// Read the description from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Set or clear the spec assignee
    Assign {
        id: String,
        #[command(flatten)]
        who: ActorArgs,
        /// Remove the current assignee
        #[arg(long, conflicts_with_all = ["user", "name"])]
        clear: bool,
    },
    /// Manage user stories
    Story {
        #[command(subcommand)]
        action: StoryAction,
    },
    /// Snapshot the working description and stories as a new version
    Snapshot {
        id: String,
        /// Start a new major version (vN+1.0)
        #[arg(long)]
        major: bool,
        /// Note describing the snapshot
        #[arg(long)]
        summary: Option<String>,
    },
    /// Show the version history
    Versions {
        id: String,
        /// Output format (text, json)
        #[arg(long)]
        export: Option<String>,
    },
    /// Compare two versions, or a version with the working set
    Compare {
        id: String,
        /// Older version (default: current version)
        #[arg(long)]
        from: Option<String>,
        /// Newer version (default: working set)
        #[arg(long)]
        to: Option<String>,
        /// One-column diff instead of side by side
        #[arg(long)]
        inline: bool,
        /// Output format (text, json)
        #[arg(long)]
        export: Option<String>,
    },
    /// Manage approvers
    Approver {
        #[command(subcommand)]
        action: ApproverAction,
    },
    /// Show approver decisions
    Approvals {
        id: String,
        /// Output format (text, json)
        #[arg(long)]
        export: Option<String>,
    },
    /// Record an approval
    Approve {
        id: String,
        approver: String,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Record a rejection
    Reject {
        id: String,
        approver: String,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Render a view of a spec
    Inspect {
        id: String,
        /// View (summary, stories, history, approvals, compare, journal)
        #[arg(long)]
        view: Option<String>,
        /// Output format (text, json)
        #[arg(long)]
        export: Option<String>,
    },
}

#[derive(Subcommand)]
enum StoryAction {
    /// Add a story to the working set
    Add {
        spec: String,
        story: String,
        #[command(flatten)]
        fields: StoryArgs,
    },
    /// Change fields of a story
    Edit {
        spec: String,
        story: String,
        #[command(flatten)]
        fields: StoryArgs,
        /// Remove all acceptance criteria
        #[arg(long)]
        clear_criteria: bool,
        /// Remove the assignee
        #[arg(long)]
        unassign: bool,
    },
    /// Remove a story
    Remove { spec: String, story: String },
    /// Move a story to a 1-based position
    Move {
        spec: String,
        story: String,
        #[arg(long)]
        to: usize,
    },
    /// Reorder all stories
    Reorder {
        spec: String,
        /// Every story id, in the new order
        #[arg(required = true)]
        order: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ApproverAction {
    /// Add a pending approver
    Add {
        spec: String,
        approver: String,
        #[command(flatten)]
        who: ActorArgs,
    },
}

/// An actor given on the command line.
#[derive(Args)]
struct ActorArgs {
    /// Actor id
    #[arg(long, requires = "name")]
    user: Option<String>,
    /// Actor display name
    #[arg(long, requires = "user")]
    name: Option<String>,
}

impl ActorArgs {
    fn actor(self) -> Option<ActorRef> {
        match (self.user, self.name) {
            (Some(id), Some(name)) => Some(ActorRef::new(id, name)),
            _ => None,
        }
    }
}

#[derive(Args)]
struct StoryArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// urgent, high, medium, low
    #[arg(long)]
    priority: Option<String>,
    /// todo, in-progress, done
    #[arg(long)]
    status: Option<String>,
    /// Acceptance criterion; repeat for several
    #[arg(long = "criterion")]
    criteria: Vec<String>,
    /// Story points
    #[arg(long)]
    estimate: Option<f64>,
    /// Assignee id
    #[arg(long, requires = "assignee_name")]
    assignee: Option<String>,
    /// Assignee display name
    #[arg(long, requires = "assignee")]
    assignee_name: Option<String>,
}

impl StoryArgs {
    fn into_fields(self) -> StoryFields {
        let assignee = match (self.assignee, self.assignee_name) {
            (Some(id), Some(name)) => Some(ActorRef::new(id, name)),
            _ => None,
        };
        StoryFields {
            title: self.title,
            description: self.description,
            priority: self.priority,
            status: self.status,
            criteria: self.criteria,
            estimate: self.estimate,
            assignee,
            ..StoryFields::default()
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { name } => {
            init_logging(None);
            commands::init::run(&name)
        }
        command => {
            let ws = Workspace::open(&cwd)?;
            init_logging(ws.manifest().logging.level.as_deref());
            tracing::debug!(root = %ws.root().display(), "workspace opened");
            dispatch(&ws, command)
        }
    }
}

fn dispatch(ws: &Workspace, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Init { name } => commands::init::run(&name),

        Commands::New {
            id,
            title,
            priority,
            description,
            cycle,
        } => commands::spec::create(
            ws,
            &id,
            &title,
            commands::spec::NewSpec {
                priority: priority.as_deref(),
                description: description.as_deref(),
                cycle: cycle.as_deref(),
            },
        ),

        Commands::List {
            query,
            sort,
            export,
        } => commands::spec::list(ws, query.as_deref(), sort.as_deref(), export.as_deref()),

        Commands::Show { id, export } => commands::spec::show(ws, &id, export.as_deref()),

        Commands::Stage { id, stage } => commands::lifecycle::stage(ws, &id, &stage),

        Commands::Unlock { id } => commands::lifecycle::unlock(ws, &id),

        Commands::Status { id, status } => commands::lifecycle::status(ws, &id, &status),

        Commands::Describe { id, text, file } => {
            commands::lifecycle::describe(ws, &id, text.as_deref(), file.as_deref())
        }

        Commands::Assign { id, who, clear } => {
            let assignee = who.actor();
            if assignee.is_none() && !clear {
                anyhow::bail!("pass --user and --name, or --clear");
            }
            commands::lifecycle::assign(ws, &id, assignee)
        }

        Commands::Story { action } => match action {
            StoryAction::Add {
                spec,
                story,
                fields,
            } => commands::story::add(ws, &spec, &story, fields.into_fields()),
            StoryAction::Edit {
                spec,
                story,
                fields,
                clear_criteria,
                unassign,
            } => {
                let fields = StoryFields {
                    clear_criteria,
                    unassign,
                    ..fields.into_fields()
                };
                commands::story::edit(ws, &spec, &story, fields)
            }
            StoryAction::Remove { spec, story } => commands::story::remove(ws, &spec, &story),
            StoryAction::Move { spec, story, to } => {
                commands::story::move_to(ws, &spec, &story, to)
            }
            StoryAction::Reorder { spec, order } => commands::story::reorder(ws, &spec, &order),
        },

        Commands::Snapshot { id, major, summary } => {
            commands::version::snapshot(ws, &id, major, summary.as_deref())
        }

        Commands::Versions { id, export } => {
            commands::version::versions(ws, &id, export.as_deref())
        }

        Commands::Compare {
            id,
            from,
            to,
            inline,
            export,
        } => commands::version::compare(
            ws,
            &id,
            from.as_deref(),
            to.as_deref(),
            inline,
            export.as_deref(),
        ),

        Commands::Approver { action } => match action {
            ApproverAction::Add {
                spec,
                approver,
                who,
            } => commands::approval::add(ws, &spec, &approver, who.actor()),
        },

        Commands::Approvals { id, export } => {
            commands::approval::show(ws, &id, export.as_deref())
        }

        Commands::Approve {
            id,
            approver,
            comment,
        } => commands::approval::decide(ws, &id, &approver, Verdict::Approve, comment.as_deref()),

        Commands::Reject {
            id,
            approver,
            comment,
        } => commands::approval::decide(ws, &id, &approver, Verdict::Reject, comment.as_deref()),

        Commands::Inspect { id, view, export } => {
            commands::inspect::run(ws, &id, view.as_deref(), export.as_deref())
        }
    }
}

/// Install the global subscriber. `SPECFLOW_LOG` wins over the configured
/// level, which wins over `warn`.
fn init_logging(configured: Option<&str>) {
    let default_level = "warn";
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(configured.unwrap_or(default_level)))
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use clap::CommandFactory;
    use manifest::SpecflowManifest;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn story_edit_flags_parse() {
        let cli = Cli::try_parse_from([
            "specflow", "story", "edit", "spec-001", "US-001", "--priority", "high",
            "--criterion", "a", "--criterion", "b", "--unassign",
        ])
        .unwrap();
        let Commands::Story {
            action: StoryAction::Edit { fields, unassign, .. },
        } = cli.command
        else {
            panic!("expected story edit");
        };
        assert!(unassign);
        let fields = fields.into_fields();
        assert_eq!(fields.priority.as_deref(), Some("high"));
        assert_eq!(fields.criteria, vec!["a", "b"]);
    }

    #[test]
    fn actor_flags_require_each_other() {
        assert!(Cli::try_parse_from(["specflow", "approver", "add", "s", "ap-1", "--user", "u1"]).is_err());
        assert!(Cli::try_parse_from(["specflow", "assign", "s", "--clear", "--user", "u1", "--name", "A"]).is_err());
    }

    /// Full workflow: init, new, stories, snapshot, stage lock, review.
    #[test]
    fn init_author_lock_review_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("reqs");
        commands::init::create_workspace(&root, "reqs").unwrap();

        let ws = Workspace::open(&root).unwrap();
        commands::spec::create(&ws, "spec-001", "User Authentication System", Default::default())
            .unwrap();
        commands::lifecycle::describe(&ws, "spec-001", Some("Login with email and password"), None)
            .unwrap();
        let login = StoryFields {
            title: Some("Secure User Login".into()),
            ..StoryFields::default()
        };
        commands::story::add(&ws, "spec-001", "US-001", login).unwrap();
        commands::version::snapshot(&ws, "spec-001", false, None).unwrap();

        commands::lifecycle::stage(&ws, "spec-001", "technical-design").unwrap();
        assert!(commands::lifecycle::describe(&ws, "spec-001", Some("changed"), None).is_err());

        commands::approval::add(&ws, "spec-001", "ap-1", None).unwrap();
        commands::approval::decide(&ws, "spec-001", "ap-1", Verdict::Approve, None).unwrap();
        commands::lifecycle::status(&ws, "spec-001", "approved").unwrap();

        let (manifest, found) = SpecflowManifest::find_and_load(&root).unwrap().unwrap();
        assert_eq!(found, root);
        assert_eq!(manifest.workspace.name, "reqs");

        let spec = ws.load("spec-001").unwrap();
        assert!(spec.requirements_locked());
        assert_eq!(spec.current_version_id().map(|v| v.to_string()).as_deref(), Some("v1.0"));
        assert_eq!(spec.approval_summary().approved, 1);
        assert!(!spec.has_unsnapshotted_changes());
    }
}
