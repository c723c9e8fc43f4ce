use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{exit, Command, ExitStatus};

use clap::{Args, Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const AWS_PACKAGE: &str = "bank_store_aws";
const LOOKUP_BIN: &str = "lookup_lambda";
const DIST_DIR: &str = "dist";

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the bank store workspace",
    long_about = "CI checks, Lambda packaging and table seeding for the\n\
                  bank store seeding and lookup workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        #[arg(value_enum, default_value_t = CiJob::All)]
        job: CiJob,
    },
    /// Build the lookup Lambda and zip it as a `bootstrap` artifact
    LambdaPackage {
        /// Compilation target triple for the Lambda binary
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
    },
    /// Seed every configured table by running the matching loader
    Seed(SeedArgs),
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting and clippy
    Lint,
    /// Unit and integration tests
    Test,
    All,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

#[derive(Args)]
struct SeedArgs {
    #[arg(long, env = "ATMS_TABLE")]
    atms_table: Option<String>,
    #[arg(long, env = "DEVICES_TABLE")]
    devices_table: Option<String>,
    #[arg(long, env = "BALANCES_TABLE")]
    balances_table: Option<String>,
    #[arg(long, env = "INVESTMENTS_TABLE")]
    investments_table: Option<String>,
    /// Seed forwarded to every loader
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    fail_on_unwritten: bool,
}

impl SeedArgs {
    /// `(loader binary, table)` for every table that was configured.
    fn targets(&self) -> Vec<(&'static str, &str)> {
        [
            ("populate_atms", &self.atms_table),
            ("populate_devices", &self.devices_table),
            ("populate_balances", &self.balances_table),
            ("populate_investments", &self.investments_table),
        ]
        .into_iter()
        .filter_map(|(bin, table)| {
            table
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| (bin, name))
        })
        .collect()
    }
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn require_rust_target(target: &str) {
    let output = match Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output()
    {
        Ok(output) if output.status.success() => output,
        Ok(_) | Err(_) => {
            eprintln!("warning: could not list installed rust targets; skipping target preflight");
            return;
        }
    };

    let installed = String::from_utf8_lossy(&output.stdout);
    if !installed.lines().any(|line| line.trim() == target) {
        eprintln!(
            "rust target `{target}` is missing; install it with `rustup target add {target}`"
        );
        exit(1);
    }
}

fn binary_path(target: &str, profile: BuildProfile, bin: &str) -> PathBuf {
    let file_name = if target.contains("windows") {
        format!("{bin}.exe")
    } else {
        bin.to_string()
    };
    Path::new("target")
        .join(target)
        .join(profile.dir_name())
        .join(file_name)
}

fn package_lambda_zip(binary_path: &Path, zip_path: &Path) {
    if !binary_path.exists() {
        eprintln!("expected lambda binary at '{}'", binary_path.display());
        exit(1);
    }

    let binary = fs::read(binary_path).expect("failed to read lambda binary");
    let file = fs::File::create(zip_path).expect("failed to create lambda zip");
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)
        .expect("failed to start bootstrap entry in lambda zip");
    zip.write_all(&binary)
        .expect("failed to write bootstrap entry");
    zip.finish().expect("failed to finish lambda zip");
}

// ── commands ───────────────────────────────────────────────────────

fn ci_lint() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--workspace",
        "--all-targets",
        "--",
        "-D",
        "warnings",
    ]);
}

fn ci_test() {
    step("Test bank_store_core");
    run_cargo(&["test", "-p", "bank_store_core"]);

    step("Test bank_store_aws");
    run_cargo(&["test", "-p", AWS_PACKAGE]);
}

fn lambda_package(target: &str, profile: BuildProfile) {
    require_rust_target(target);

    step("Build lookup lambda");
    let mut cargo_args = vec![
        "build",
        "-p",
        AWS_PACKAGE,
        "--target",
        target,
        "--bin",
        LOOKUP_BIN,
    ];
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Package lambda zip");
    let dist_dir = Path::new(DIST_DIR);
    fs::create_dir_all(dist_dir).expect("failed to create dist directory");
    let zip_path = dist_dir.join(format!("{LOOKUP_BIN}.zip"));
    package_lambda_zip(&binary_path(target, profile, LOOKUP_BIN), &zip_path);

    eprintln!("\nPackaged artifact:\n- {}", zip_path.display());
}

fn seed(args: &SeedArgs) {
    let targets = args.targets();
    if targets.is_empty() {
        eprintln!(
            "no tables configured; pass --atms-table/--devices-table/--balances-table/--investments-table or set the matching *_TABLE variables"
        );
        exit(1);
    }

    let seed = args.seed.map(|value| value.to_string());
    for (bin, table) in targets {
        step(&format!("{bin} -> {table}"));
        let mut cargo_args = vec!["run", "-q", "-p", AWS_PACKAGE, "--bin", bin, "--", table];
        if let Some(seed) = seed.as_deref() {
            cargo_args.extend(["--seed", seed]);
        }
        if args.fail_on_unwritten {
            cargo_args.push("--fail-on-unwritten");
        }
        run_cargo(&cargo_args);
    }
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { job } => {
            match job {
                CiJob::Lint => ci_lint(),
                CiJob::Test => ci_test(),
                CiJob::All => {
                    ci_lint();
                    ci_test();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::LambdaPackage { target, profile } => lambda_package(&target, profile),
        Commands::Seed(args) => seed(&args),
    }
}
