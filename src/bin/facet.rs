// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use facet::{
    config::FacetName,
    facet::{patch::FacetPatch, status::WorkflowStatus, Facet},
    fetch::{fetch_all, FetchOutcome},
    path::{auth_file, default_facet_root, state_file},
    state::{ActiveFacet, StateFile},
    store::{CreateOptions, FacetStore},
    tracker::JiraTracker,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::{fs, path::PathBuf, process::exit, time::Duration};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "\n  facet [options] <facet-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    async fn run(self) -> Result<()> {
        let mut session = Session::open()?;
        match self.command {
            Command::Create(opts) => run_create(&mut session, opts),
            Command::Ls(opts) => run_ls(&session, opts).await,
            Command::Show(opts) => run_show(&session, opts).await,
            Command::Config(opts) => run_config(&session, opts),
            Command::Patch(opts) => run_patch(&session, opts),
            Command::Workon(opts) => run_workon(&mut session, opts),
            Command::Current => run_current(&session),
            Command::Fetch(opts) => run_fetch(&session, opts).await,
            Command::Follow(opts) => run_follow(&session, opts, true),
            Command::Unfollow(opts) => run_follow(&session, opts, false),
            Command::Mark(opts) => run_mark(&session, opts),
            Command::Rm(opts) => run_rm(&mut session, opts),
            Command::Migrate => run_migrate(&session),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Create new facet.
    #[command(override_usage = "facet create [options] <facet_name>")]
    Create(CreateCmdOptions),

    /// List facets, most recently used first.
    #[command(override_usage = "facet ls [options]")]
    Ls(LsOptions),

    /// Show summary of facet.
    #[command(override_usage = "facet show [<facet_name>]")]
    Show(FacetOptions),

    /// Print configuration of facet.
    #[command(override_usage = "facet config [<facet_name>]")]
    Config(FacetOptions),

    /// Fill missing configuration of facet from a patch file.
    #[command(override_usage = "facet patch <patch_file> [<facet_name>]")]
    Patch(PatchOptions),

    /// Switch active facet.
    #[command(override_usage = "facet workon <facet_name>")]
    Workon(WorkonOptions),

    /// Print name of active facet.
    #[command(override_usage = "facet current")]
    Current,

    /// Refresh cached tracker issues of facets.
    #[command(override_usage = "facet fetch [options] [<facet_name>]...")]
    Fetch(FetchOptions),

    /// Show facet in default listings.
    #[command(override_usage = "facet follow [<facet_name>]")]
    Follow(FacetOptions),

    /// Hide facet from default listings.
    #[command(override_usage = "facet unfollow [<facet_name>]")]
    Unfollow(FacetOptions),

    /// Set workflow status of facet without a tracker issue.
    #[command(override_usage = "facet mark <status> [<facet_name>]")]
    Mark(MarkOptions),

    /// Remove facet from facet store.
    #[command(override_usage = "facet rm <facet_name>...")]
    Rm(RemoveOptions),

    /// Rewrite every facet configuration in canonical form.
    #[command(override_usage = "facet migrate")]
    Migrate,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct CreateCmdOptions {
    /// Name of facet to create.
    #[arg(required = true, value_name = "facet_name")]
    pub facet_name: FacetName,

    /// Issue key in external tracker.
    #[arg(short, long, value_name = "issue_key")]
    pub jira: Option<String>,

    /// Path to associated working copy.
    #[arg(short, long, value_name = "path")]
    pub repo: Option<String>,

    /// Branch to use instead of the facet name.
    #[arg(short, long, value_name = "branch")]
    pub branch: Option<String>,

    /// Do not switch to the new facet.
    #[arg(long)]
    pub no_workon: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct LsOptions {
    /// List every facet, including unfollowed and done ones.
    #[arg(short, long)]
    pub all: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct FacetOptions {
    /// Target facet, defaults to the active one.
    #[arg(value_name = "facet_name")]
    pub facet_name: Option<FacetName>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct PatchOptions {
    /// TOML file holding partial facet configuration.
    #[arg(required = true, value_name = "patch_file")]
    pub patch_file: PathBuf,

    /// Target facet, defaults to the active one.
    #[arg(value_name = "facet_name")]
    pub facet_name: Option<FacetName>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct WorkonOptions {
    /// Facet to switch to.
    #[arg(required = true, value_name = "facet_name")]
    pub facet_name: FacetName,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct FetchOptions {
    /// Facets to fetch, defaults to every followed facet.
    #[arg(group = "target", value_name = "facet_name")]
    pub facet_names: Vec<FacetName>,

    /// Fetch every facet in the store.
    #[arg(group = "target", short, long)]
    pub all: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct MarkOptions {
    /// One of todo, doing, under-review, or done.
    #[arg(required = true, value_name = "status")]
    pub status: WorkflowStatus,

    /// Target facet, defaults to the active one.
    #[arg(value_name = "facet_name")]
    pub facet_name: Option<FacetName>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct RemoveOptions {
    /// Facets to remove from facet store.
    #[arg(required = true, value_name = "facet_name")]
    pub facet_names: Vec<FacetName>,
}

/// Everything a command needs to talk to the facet store.
struct Session {
    store: FacetStore,
    state: StateFile,
    active: ActiveFacet,
    tracker: JiraTracker,
}

impl Session {
    fn open() -> Result<Self> {
        let root = default_facet_root()?;
        let store = FacetStore::open(root.clone())?;
        let state = StateFile::new(state_file(&root));
        let active = ActiveFacet::load(&state)?;
        let tracker = JiraTracker::new(store.settings(), auth_file(&root))?;

        Ok(Self {
            store,
            state,
            active,
            tracker,
        })
    }

    fn facet(&self, name: Option<FacetName>) -> Result<Facet> {
        let name = self.active.resolve(name)?;
        Ok(self.store.open_facet(&name)?)
    }

    fn has_tracker(&self) -> bool {
        self.store.settings().jira_host.is_some()
    }
}

#[tokio::main]
async fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run().await {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

async fn run() -> Result<()> {
    Cli::parse().run().await
}

fn run_create(session: &mut Session, opts: CreateCmdOptions) -> Result<()> {
    let options = CreateOptions {
        jira: opts.jira,
        repo: opts.repo,
        branch: opts.branch,
    };
    let facet = session.store.create(&opts.facet_name, options)?;
    info!("created facet {} at {:?}", facet.name(), facet.dir().display());

    if !opts.no_workon {
        session
            .active
            .workon(&session.store, &session.state, &opts.facet_name)?;
    }

    Ok(())
}

async fn run_ls(session: &Session, opts: LsOptions) -> Result<()> {
    let facets = session.store.list(opts.all, &session.tracker).await?;
    for facet in facets {
        let is_current = session.active.is(facet.name());
        println!("{}", facet.format(&session.tracker, is_current).await);
    }

    Ok(())
}

async fn run_show(session: &Session, opts: FacetOptions) -> Result<()> {
    let facet = session.facet(opts.facet_name)?;
    let settings = session.store.settings();
    let is_current = session.active.is(facet.name());

    println!("{}", facet.format(&session.tracker, is_current).await);
    match facet.status(&session.tracker).await {
        Ok(status) => println!("status:  {status}"),
        Err(error) => warn!("cannot resolve status of {}: {error}", facet.name()),
    }
    if let Some(repo) = facet.repo_path()? {
        println!("repo:    {}", repo.display());
    }
    if let Some(branch) = facet.branch() {
        println!("branch:  {branch}");
    }
    if let Some(url) = facet.issue_url(settings) {
        println!("issue:   {url}");
    }
    if let Some(url) = facet.pull_request_url(settings) {
        println!("pr:      {url}");
    }
    println!("notes:   {}", facet.notes_file().display());

    Ok(())
}

fn run_config(session: &Session, opts: FacetOptions) -> Result<()> {
    let facet = session.facet(opts.facet_name)?;
    print!("{}", facet.config());

    Ok(())
}

fn run_patch(session: &Session, opts: PatchOptions) -> Result<()> {
    let data = fs::read_to_string(&opts.patch_file)
        .with_context(|| format!("failed to read patch {:?}", opts.patch_file.display()))?;
    let patch = data
        .parse::<FacetPatch>()
        .with_context(|| format!("malformed patch {:?}", opts.patch_file.display()))?;

    let mut facet = session.facet(opts.facet_name)?;
    facet.apply_patch(&patch)?;
    info!("patched facet {}", facet.name());

    Ok(())
}

fn run_workon(session: &mut Session, opts: WorkonOptions) -> Result<()> {
    let facet = session
        .active
        .workon(&session.store, &session.state, &opts.facet_name)?;

    if let Some(repo) = facet.repo_path()? {
        println!("{}", repo.display());
    }

    Ok(())
}

fn run_current(session: &Session) -> Result<()> {
    println!("{}", session.active.get()?);

    Ok(())
}

async fn run_fetch(session: &Session, opts: FetchOptions) -> Result<()> {
    let facets = if !opts.facet_names.is_empty() {
        opts.facet_names
            .iter()
            .map(|name| session.store.open_facet(name))
            .collect::<Result<Vec<_>, _>>()?
    } else if opts.all {
        session.store.open_all()?
    } else {
        session.store.followed()?
    };

    // INVARIANT: Prompt for credentials before the spinner takes the terminal.
    if session.has_tracker() && facets.iter().any(|facet| facet.issue_key().is_some()) {
        session.tracker.credentials().await?;
    }

    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    bar.set_message(format!("fetching {} facet(s)", facets.len()));
    bar.enable_steady_tick(Duration::from_millis(100));
    let reports = fetch_all(&facets, &session.tracker).await;
    bar.finish_and_clear();

    let mut failures = 0;
    for report in reports {
        match report.outcome {
            FetchOutcome::Succeeded(snapshot) => {
                println!(
                    "{}  {}",
                    report.facet,
                    snapshot.summary().unwrap_or_default()
                );
            }
            FetchOutcome::Failed(error) => {
                failures += 1;
                error!("{:?}", anyhow::Error::new(error));
            }
            FetchOutcome::Skipped => println!("{}  <no tracker issue>", report.facet),
        }
    }

    if failures > 0 {
        bail!("{failures} fetch(es) failed");
    }

    Ok(())
}

fn run_follow(session: &Session, opts: FacetOptions, follow: bool) -> Result<()> {
    let mut facet = session.facet(opts.facet_name)?;
    if follow {
        facet.follow()?;
        info!("following facet {}", facet.name());
    } else {
        facet.unfollow()?;
        info!("unfollowed facet {}", facet.name());
    }

    Ok(())
}

fn run_mark(session: &Session, opts: MarkOptions) -> Result<()> {
    let mut facet = session.facet(opts.facet_name)?;
    facet.set_status(opts.status)?;
    info!("marked facet {} as {}", facet.name(), opts.status);

    Ok(())
}

fn run_rm(session: &mut Session, opts: RemoveOptions) -> Result<()> {
    for name in opts.facet_names {
        session.store.remove(&name)?;
        session.active.release(&session.state, &name)?;
        info!("removed facet {name}");
    }

    Ok(())
}

fn run_migrate(session: &Session) -> Result<()> {
    let mut failures = 0;
    for (name, outcome) in session.store.migrate()? {
        match outcome {
            Ok(()) => info!("migrated facet {name}"),
            Err(error) => {
                failures += 1;
                warn!("cannot migrate facet {name}: {error}");
            }
        }
    }

    if failures > 0 {
        bail!("{failures} facet(s) could not be migrated");
    }

    Ok(())
}
