mod config;
mod patch;
mod pr;
mod report;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info, info_span, warn, Instrument};
use tracing_subscriber::EnvFilter;

use crate::patch::{Selection, SelectionError};
use crate::pr::fixture::FixtureSource;
use crate::pr::github::GitHubSource;
use crate::pr::{FileChange, PrSource, PullRequest};
use crate::report::{CheckoutSummary, Destination};

/// PR Cart: pick files out of a GitHub Pull Request and export them as a
/// patch that `git apply` accepts.
#[derive(Parser, Debug)]
#[command(name = "pr-cart", version, about)]
struct Cli {
    /// GitHub Pull Request (https://github.com/org/repo/pull/42 or org/repo#42)
    ///
    /// Not required when --mock or --fixture is used.
    #[arg(short, long, global = true)]
    pr: Option<String>,

    /// Config file (default: .pr-cart.toml in the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// GitHub API token; overrides the config file and GITHUB_TOKEN
    #[arg(long, global = true)]
    token: Option<String>,

    /// Use a built-in mock PR for demo purposes (no GitHub token needed)
    #[arg(long, global = true, conflicts_with = "fixture")]
    r#mock: bool,

    /// Load the PR from a saved JSON snapshot ({"pull": ..., "files": [...]})
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the files changed by the pull request
    Files,

    /// Preview one file's diff with old/new line numbers
    Show {
        /// File path, or its 1-based position in the `files` listing
        file: String,
    },

    /// Assemble a patch from the selected files
    Checkout(CheckoutArgs),
}

#[derive(Args, Debug)]
struct CheckoutArgs {
    /// File to include (repeatable)
    #[arg(short, long = "file")]
    files: Vec<String>,

    /// Include every file of the pull request
    #[arg(long)]
    all: bool,

    /// File to leave out, applied after --all/--file (repeatable)
    #[arg(short = 'x', long = "exclude")]
    exclude: Vec<String>,

    /// Output path for the patch (default: {owner}-{repo}-pr{number}-selection.patch)
    #[arg(short, long, conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Print the patch to stdout instead of writing a file
    #[arg(long)]
    stdout: bool,

    /// Name the patch after a new branch and print the commands to apply it
    #[arg(long)]
    branch: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let mut config = config::Config::load(cli.config.as_deref())?;
    if let Some(token) = cli.token.clone() {
        config.github.token = Some(token);
    }

    let source = build_source(&cli, &config)?;
    info!(source = %source.describe(), "loading pull request");
    let pull_request = source
        .load()
        .instrument(info_span!("load_pr", source = %source.describe()))
        .await?;
    info!(
        files = pull_request.files.len(),
        additions = pull_request.total_additions,
        deletions = pull_request.total_deletions,
        "loaded pull request"
    );

    match cli.command {
        Command::Files => {
            print!("{}", report::render_file_list(&pull_request));
        }
        Command::Show { file } => {
            let file = find_file(&pull_request, &file)
                .ok_or_else(|| format!("File not found in PR #{}: {}", pull_request.number, file))?;
            let lines = pr::diff::classify(file.patch.as_deref());
            debug!(file = %file.filename, lines = lines.len(), "classified diff");
            print!("{}", report::render_preview(file, &lines));
        }
        Command::Checkout(args) => checkout(&pull_request, args, &config)?,
    }

    Ok(())
}

fn build_source(
    cli: &Cli,
    config: &config::Config,
) -> Result<Box<dyn PrSource>, Box<dyn std::error::Error>> {
    if cli.r#mock {
        info!("using mock PR data for demo");
        return Ok(Box::new(FixtureSource::demo()));
    }
    if let Some(path) = &cli.fixture {
        return Ok(Box::new(FixtureSource::from_path(path)));
    }

    let pr_ref = cli.pr.as_deref().ok_or(
        "PR is required unless --mock or --fixture is used. Usage: pr-cart --pr <URL> <COMMAND>",
    )?;
    let pr_url = pr::parse_pr_url(pr_ref)?;
    debug!(owner = %pr_url.owner, repo = %pr_url.repo, pr = pr_url.number, "parsed PR URL");
    Ok(Box::new(GitHubSource::new(pr_url, config)))
}

/// Look a file up by path, falling back to its 1-based listing position.
fn find_file<'a>(pr: &'a PullRequest, target: &str) -> Option<&'a FileChange> {
    pr.files.iter().find(|f| f.filename == target).or_else(|| {
        let position: usize = target.parse().ok()?;
        pr.files.get(position.checked_sub(1)?)
    })
}

fn build_selection(
    pr: &PullRequest,
    names: &[String],
    all: bool,
    exclude: &[String],
) -> Result<Selection, SelectionError> {
    let mut selection = Selection::from_names(&pr.files, names.iter().cloned())?;
    if all {
        selection = Selection::all(&pr.files);
    }
    for name in exclude {
        if !selection.remove(name) {
            warn!(file = %name, "excluded file was not selected");
        }
    }
    Ok(selection)
}

fn checkout(
    pull_request: &PullRequest,
    args: CheckoutArgs,
    config: &config::Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let branch_file = match &args.branch {
        Some(branch) => Some(
            patch::branch_patch_filename(branch)
                .ok_or("Branch name must not be blank. Pass --branch <NAME>")?,
        ),
        None => None,
    };
    let selection = build_selection(pull_request, &args.files, args.all, &args.exclude)?;
    if selection.is_empty() {
        return Err("No files selected. Pass --file <PATH> (repeatable) or --all".into());
    }

    let files = &pull_request.files;
    let assembled = patch::assemble(files, &selection);
    let stats = patch::compute_selection_stats(files, &selection);
    let skipped: Vec<String> = patch::skipped_without_patch(files, &selection)
        .map(|f| f.filename.clone())
        .collect();
    for name in &skipped {
        warn!(file = %name, "selected file has no diff text; leaving it out of the patch");
    }
    info!(selected = selection.len(), bytes = assembled.len(), "assembled patch");

    let destination = if args.stdout {
        Destination::Stdout
    } else {
        let name = branch_file.unwrap_or_else(|| {
            patch::suggested_filename(&pull_request.owner, &pull_request.repo, pull_request.number)
        });
        Destination::File(args.output.unwrap_or_else(|| config.output_path(&name)))
    };

    match &destination {
        Destination::Stdout => report::output(&assembled, None)?,
        Destination::File(path) => report::output(&assembled, Some(path))?,
    }

    let summary = CheckoutSummary {
        owner: pull_request.owner.clone(),
        repo: pull_request.repo.clone(),
        number: pull_request.number,
        stats,
        skipped,
        destination,
        bytes: assembled.len(),
        branch: args.branch,
    };
    let text = report::render_checkout(&summary);
    // Keep stdout clean when the patch itself goes there.
    if args.stdout {
        eprint!("{}", text);
    } else {
        print!("{}", text);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    async fn demo_pr() -> PullRequest {
        FixtureSource::demo().load().await.unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_checkout() {
        let cli = Cli::try_parse_from([
            "pr-cart",
            "--mock",
            "checkout",
            "-f",
            "src/auth/mod.rs",
            "--file",
            "Cargo.toml",
            "--stdout",
        ])
        .unwrap();
        assert!(cli.r#mock);
        match cli.command {
            Command::Checkout(args) => {
                assert_eq!(args.files, vec!["src/auth/mod.rs", "Cargo.toml"]);
                assert!(args.stdout);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_output_with_stdout() {
        let parsed = Cli::try_parse_from(["pr-cart", "checkout", "--all", "-o", "x.patch", "--stdout"]);
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn test_find_file_by_name_or_position() {
        let pr = demo_pr().await;
        assert_eq!(find_file(&pr, "docs/AUTH.md").unwrap().filename, "docs/AUTH.md");
        assert_eq!(find_file(&pr, "1").unwrap().filename, "src/auth/mod.rs");
        assert!(find_file(&pr, "0").is_none());
        assert!(find_file(&pr, "99").is_none());
        assert!(find_file(&pr, "missing.rs").is_none());
    }

    #[tokio::test]
    async fn test_build_selection_all_with_exclude() {
        let pr = demo_pr().await;
        let excluded = vec!["Cargo.toml".to_string()];
        let selection = build_selection(&pr, &[], true, &excluded).unwrap();
        assert_eq!(selection.len(), pr.files.len() - 1);
        assert!(!selection.contains("Cargo.toml"));
    }

    #[tokio::test]
    async fn test_build_selection_rejects_unknown_file() {
        let pr = demo_pr().await;
        let names = vec!["nope.rs".to_string()];
        assert!(build_selection(&pr, &names, false, &[]).is_err());
    }

    #[tokio::test]
    async fn test_demo_checkout_patch() {
        let pr = demo_pr().await;
        let names = vec![
            "src/auth/oauth.rs".to_string(),
            "src/legacy/session.rs".to_string(),
            "docs/AUTH.md".to_string(),
            "assets/logo.png".to_string(),
        ];
        let selection = build_selection(&pr, &names, false, &[]).unwrap();
        let assembled = patch::assemble(&pr.files, &selection);

        assert!(assembled.starts_with(
            "diff --git a/src/auth/oauth.rs b/src/auth/oauth.rs\nnew file mode 100644\n--- /dev/null\n+++ b/src/auth/oauth.rs\n@@ -0,0 +1,12 @@\n"
        ));
        assert!(assembled.contains(
            "diff --git a/src/legacy/session.rs b/src/legacy/session.rs\ndeleted file mode 100644\n--- a/src/legacy/session.rs\n+++ /dev/null\n"
        ));
        assert!(assembled.contains(
            "diff --git a/docs/LOGIN.md b/docs/AUTH.md\nrename from docs/LOGIN.md\nrename to docs/AUTH.md\n"
        ));
        assert!(!assembled.contains("logo.png"));
        assert_eq!(assembled.matches("diff --git").count(), 3);

        let stats = patch::compute_selection_stats(&pr.files, &selection);
        assert_eq!(stats.file_count, 4);
        assert_eq!(stats.additions, 15);
        assert_eq!(stats.deletions, 9);
    }

    #[test]
    fn test_checkout_to_file() {
        let pr = tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(FixtureSource::demo().load())
            .unwrap();
        let path = std::env::temp_dir().join("pr_cart_test_checkout.patch");
        let args = CheckoutArgs {
            files: vec!["Cargo.toml".to_string()],
            all: false,
            exclude: vec![],
            output: Some(path.clone()),
            stdout: false,
            branch: None,
        };
        checkout(&pr, args, &config::Config::default()).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("diff --git a/Cargo.toml b/Cargo.toml\n--- a/Cargo.toml\n+++ b/Cargo.toml\n@@ -8,3 +8,4 @@"));
        assert!(written.ends_with("features = [\"full\"] }\n"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_checkout_empty_selection_fails() {
        let pr = tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(FixtureSource::demo().load())
            .unwrap();
        let args = CheckoutArgs {
            files: vec![],
            all: false,
            exclude: vec![],
            output: None,
            stdout: true,
            branch: None,
        };
        assert!(checkout(&pr, args, &config::Config::default()).is_err());
    }

    #[test]
    fn test_checkout_blank_branch_fails() {
        let pr = tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(FixtureSource::demo().load())
            .unwrap();
        let path = std::env::temp_dir().join("pr_cart_test_blank_branch.patch");
        let args = CheckoutArgs {
            files: vec!["Cargo.toml".to_string()],
            all: false,
            exclude: vec![],
            output: Some(path.clone()),
            stdout: false,
            branch: Some("   ".to_string()),
        };
        let err = checkout(&pr, args, &config::Config::default()).unwrap_err();
        assert!(err.to_string().contains("Branch name"));
        assert!(!path.exists());
    }
}
