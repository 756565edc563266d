use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use url::Url;

use crate::app_config::Config;
use crate::backend::auth::AuthClient;
use crate::backend::rest::RestClient;
use crate::cache::{CachedBackend, QueryCaches};
use crate::errors::AuthError;
use crate::model::{FilterOptions, FilterSpec, ALL};
use crate::pipeline::{BilingualEntries, RetrievalPipeline};
use crate::render::GroupedRenderer;
use crate::session::{Session, SessionStore};

// @module: Application controller for the interactive browse loop

/// Heading shown above the data view
const APP_TITLE: &str = "CRGE Historical Database Explorer";

/// Labels of the two rendered tables
const ENGLISH_LABEL: &str = "English";
const ORIGINAL_LABEL: &str = "原文 (Original Language)";

/// One parsed user command from the data view prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set the country filter (missing value resets to "All")
    SetCountry(String),
    /// Set the period filter (missing value resets to "All")
    SetPeriod(String),
    /// Set the section filter (missing value resets to "All")
    SetSection(String),
    /// Set the free-text search (missing value clears it)
    SetSearch(String),
    /// Reset every filter to its default
    ClearFilters,
    /// Re-run the current cycle without changing filters
    Refresh,
    /// Sign out and return to the sign-in prompt
    SignOut,
    /// Leave the application
    Quit,
    /// Show the command summary
    Help,
}

impl Command {
    /// Parse a prompt line into a command
    pub fn parse(line: &str) -> Result<Self, String> {
        let trimmed = line.trim();
        let (word, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (trimmed, ""),
        };

        match word.to_lowercase().as_str() {
            "country" => Ok(Self::SetCountry(select_value(rest))),
            "period" => Ok(Self::SetPeriod(select_value(rest))),
            "section" => Ok(Self::SetSection(select_value(rest))),
            "search" => Ok(Self::SetSearch(rest.to_string())),
            "clear" => Ok(Self::ClearFilters),
            "refresh" | "r" => Ok(Self::Refresh),
            "signout" | "logout" => Ok(Self::SignOut),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            "help" | "?" => Ok(Self::Help),
            "" => Err("Type a command, or 'help' for the list.".to_string()),
            other => Err(format!("Unknown command '{}'. Type 'help' for the list.", other)),
        }
    }
}

/// Empty select value means "drop the constraint"
fn select_value(rest: &str) -> String {
    if rest.is_empty() {
        ALL.to_string()
    } else {
        rest.to_string()
    }
}

/// What the controller should do after applying a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// State changed (or a re-run was requested): run one render pass
    Rerender,
    /// Nothing changed: keep reading commands without re-rendering
    Unchanged,
    /// Leave the application
    Quit,
}

/// Main application controller for the browse loop
///
/// Owns the session store, the filter state, and the per-token retrieval
/// pipeline. Every accepted mutation of session or filter state triggers
/// exactly one render pass.
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Parsed backend base URL
    base_url: Url,
    // @field: Identity provider client
    auth: AuthClient,
    // @field: Process-wide query caches, surviving token changes
    caches: Arc<QueryCaches>,
    // @field: Current session, if any
    session: SessionStore,
    // @field: Pipeline bound to the current token; None while signed out
    pipeline: Option<RetrievalPipeline<RestClient>>,
    // @field: Filter state for the current cycle
    filter: FilterSpec,
    // @field: Result table renderer
    renderer: GroupedRenderer,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;

        let base_url = Url::parse(&config.backend.url)
            .context("Backend URL failed to parse after validation")?;
        let timeout = Duration::from_secs(config.backend.timeout_secs);
        let auth = AuthClient::new(base_url.clone(), config.backend.anon_key.clone(), timeout);
        let caches = Arc::new(QueryCaches::new(Duration::from_secs(config.cache.ttl_secs)));

        Ok(Self {
            config,
            base_url,
            auth,
            caches,
            session: SessionStore::new(),
            pipeline: None,
            filter: FilterSpec::default(),
            renderer: GroupedRenderer::new(),
        })
    }

    /// Whether a session is established
    pub fn is_signed_in(&self) -> bool {
        self.session.is_signed_in()
    }

    /// The current session store
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// The current filter state
    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    /// Whether a pipeline is bound to the current token
    pub fn has_pipeline(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Sign in and, on success, bind a fresh pipeline to the new token
    ///
    /// On failure the session stays unauthenticated and no pipeline exists,
    /// so no data query can be attempted.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        let auth_session = self.auth.sign_in_with_password(email, password).await?;

        self.session
            .establish(Session::new(auth_session.access_token, email.to_string()));
        self.rebuild_pipeline();
        Ok(())
    }

    /// Clear the session and drop the pipeline bound to its token
    pub fn sign_out(&mut self) {
        self.session.clear();
        self.pipeline = None;
        self.filter = FilterSpec::default();
    }

    /// Apply a parsed command to the controller state
    pub fn apply_command(&mut self, command: Command) -> CommandOutcome {
        match command {
            Command::SetCountry(value) => {
                self.filter.country = value;
                CommandOutcome::Rerender
            }
            Command::SetPeriod(value) => {
                self.filter.period = value;
                CommandOutcome::Rerender
            }
            Command::SetSection(value) => {
                self.filter.section = value;
                CommandOutcome::Rerender
            }
            Command::SetSearch(value) => {
                self.filter.search = value;
                CommandOutcome::Rerender
            }
            Command::ClearFilters => {
                self.filter = FilterSpec::default();
                CommandOutcome::Rerender
            }
            Command::Refresh => CommandOutcome::Rerender,
            Command::SignOut => {
                self.sign_out();
                CommandOutcome::Rerender
            }
            Command::Quit => CommandOutcome::Quit,
            Command::Help => CommandOutcome::Unchanged,
        }
    }

    /// Rebuild the credentialed client and pipeline for the current token
    ///
    /// Called on every token change; the previous pipeline (and the client
    /// bound to the stale token) is dropped in the same step.
    fn rebuild_pipeline(&mut self) {
        let Some(token) = self.session.current_token() else {
            self.pipeline = None;
            return;
        };

        let timeout = Duration::from_secs(self.config.backend.timeout_secs);
        let client = RestClient::new(
            self.base_url.clone(),
            self.config.backend.anon_key.clone(),
            token,
            timeout,
        );

        // The caches are shared across rebuilds: without token scoping, a new
        // sign-in is served results fetched under the previous one until they
        // expire.
        let cached = if self.config.cache.scope_to_token {
            CachedBackend::with_scope(client, Arc::clone(&self.caches), token)
        } else {
            CachedBackend::new(client, Arc::clone(&self.caches))
        };

        self.pipeline = Some(RetrievalPipeline::new(cached));
        debug!("Pipeline rebuilt for new session token");
    }

    /// Run the interactive browse loop until quit or end of input
    pub async fn run(&mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            if !self.is_signed_in() {
                // Only the sign-in form is shown while unauthenticated; no
                // data query is attempted before a token exists.
                match self.prompt_sign_in(&mut lines).await? {
                    SignInFlow::SignedIn => {
                        // Fall through: the data view renders in this same
                        // cycle, with no intermediate sign-in render.
                    }
                    SignInFlow::Failed(message) => {
                        println!("Login failed: {}", message);
                        continue;
                    }
                    SignInFlow::EndOfInput => break,
                }
            }

            self.render_data_view().await?;

            // Read commands until one changes state, then render once.
            loop {
                print!("> ");
                std::io::stdout().flush()?;

                let Some(line) = lines.next_line().await? else {
                    return Ok(());
                };

                match Command::parse(&line) {
                    Ok(Command::Help) => print_help(),
                    Ok(command) => match self.apply_command(command) {
                        CommandOutcome::Rerender => break,
                        CommandOutcome::Unchanged => {}
                        CommandOutcome::Quit => return Ok(()),
                    },
                    Err(message) => println!("{}", message),
                }
            }
        }

        Ok(())
    }

    /// Prompt for credentials and attempt one sign-in
    async fn prompt_sign_in(&mut self, lines: &mut Lines<BufReader<Stdin>>) -> Result<SignInFlow> {
        println!();
        println!("Sign in to {}", APP_TITLE);

        print!("Email: ");
        std::io::stdout().flush()?;
        let Some(email) = lines.next_line().await? else {
            return Ok(SignInFlow::EndOfInput);
        };

        print!("Password: ");
        std::io::stdout().flush()?;
        let Some(password) = lines.next_line().await? else {
            return Ok(SignInFlow::EndOfInput);
        };

        match self.sign_in(email.trim(), &password).await {
            Ok(()) => {
                info!("Signed in as {}", email.trim());
                Ok(SignInFlow::SignedIn)
            }
            Err(e) => {
                warn!("Sign-in attempt failed: {}", e);
                Ok(SignInFlow::Failed(e.to_string()))
            }
        }
    }

    /// One full render pass of the data view
    ///
    /// A query failure is rendered with a retry hint instead of aborting the
    /// cycle; the session and filter state stay intact.
    async fn render_data_view(&mut self) -> Result<()> {
        let Some(pipeline) = self.pipeline.as_ref() else {
            // Unreachable in the normal flow: callers check the session first.
            warn!("Render requested without a pipeline");
            return Ok(());
        };

        let spinner = fetch_spinner();
        let fetched = async {
            let options = pipeline.filter_options().await?;
            let entries = pipeline.retrieve(&self.filter).await?;
            Ok::<_, crate::errors::QueryError>((options, entries))
        }
        .await;
        spinner.finish_and_clear();

        let stdout = std::io::stdout();
        let mut out = stdout.lock();

        match fetched {
            Ok((options, entries)) => {
                self.write_data_view(&mut out, &options, &entries)?;
            }
            Err(e) => {
                warn!("Query failed: {}", e);
                writeln!(out)?;
                writeln!(out, "Query failed: {}", e)?;
                writeln!(out, "Type 'refresh' to retry, or 'signout' to start over.")?;
            }
        }

        Ok(())
    }

    /// Write the full data view to `out`
    fn write_data_view<W: std::io::Write>(
        &self,
        out: &mut W,
        options: &FilterOptions,
        entries: &BilingualEntries,
    ) -> std::io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", APP_TITLE)?;
        if let Some(session) = self.session.current() {
            writeln!(out, "Signed in: {}", session)?;
        }
        writeln!(out)?;
        writeln!(out, "Country [{}]: {}", self.filter.country, options.countries.join(", "))?;
        writeln!(out, "Period  [{}]: {}", self.filter.period, options.periods.join(", "))?;
        writeln!(out, "Section [{}]: {}", self.filter.section, options.sections.join(", "))?;
        writeln!(out, "Search  [{}]", self.filter.search)?;
        writeln!(out)?;

        self.renderer.render(out, &entries.english, ENGLISH_LABEL)?;
        writeln!(out)?;
        self.renderer.render(out, &entries.original, ORIGINAL_LABEL)?;

        Ok(())
    }
}

/// Outcome of one sign-in prompt
enum SignInFlow {
    SignedIn,
    Failed(String),
    EndOfInput,
}

/// Spinner shown while remote fetches are in flight
fn fetch_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Fetching entries...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Print the command summary
fn print_help() {
    println!("Commands:");
    println!("  country [value]   set the country filter ('country' alone resets to All)");
    println!("  period [value]    set the period filter");
    println!("  section [value]   set the section filter");
    println!("  search [text]     set the free-text search ('search' alone clears it)");
    println!("  clear             reset all filters");
    println!("  refresh           re-run the current view");
    println!("  signout           sign out");
    println!("  quit              exit");
}
