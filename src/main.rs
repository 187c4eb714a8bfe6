use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use log::info;
use mongoconf::config::{Config, ConfigError};
use mongoconf::core::{add_index_config, remove_by_cluster_name, IndexConfig, IndexKey, MongoDBUser};
use mongoconf::{agents, auth, lifecycle, Action, AutomationConfig};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mongoconf")]
#[command(about = "Edit MongoDB automation configuration documents")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Tool configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DocumentArgs {
    /// Automation config document (JSON)
    #[arg(short, long)]
    file: PathBuf,
    /// Where to write the result; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ClusterArgs {
    #[command(flatten)]
    document: DocumentArgs,
    /// Replica set id or sharded cluster name
    #[arg(long)]
    cluster: String,
    /// Limit to these processes (host:port), repeatable
    #[arg(long = "process")]
    processes: Vec<String>,
}

#[derive(Args)]
struct HostArgs {
    #[command(flatten)]
    document: DocumentArgs,
    #[arg(long)]
    hostname: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Disable every process of a cluster
    Shutdown(ClusterArgs),
    /// Re-enable every process of a cluster
    Startup(ClusterArgs),
    /// Request a rolling restart
    Restart(ClusterArgs),
    /// Request an initial sync of mongod processes
    Resync(ClusterArgs),
    /// Request compaction to reclaim disk space
    Reclaim(ClusterArgs),
    /// Put processes in manual mode
    Suspend(ClusterArgs),
    /// Take processes out of manual mode
    Resume(ClusterArgs),
    /// Enable authentication mechanisms (MONGODB-CR, SCRAM-SHA-256)
    EnableAuth {
        #[command(flatten)]
        document: DocumentArgs,
        #[arg(long = "mechanism", required = true)]
        mechanisms: Vec<String>,
    },
    /// Add a user with SCRAM credentials
    AddUser {
        #[command(flatten)]
        document: DocumentArgs,
        #[arg(long)]
        username: String,
        #[arg(long, default_value = "admin")]
        database: String,
        #[arg(long)]
        password: String,
        /// role@db, repeatable
        #[arg(long = "role")]
        roles: Vec<String>,
    },
    /// Remove a user
    RemoveUser {
        #[command(flatten)]
        document: DocumentArgs,
        #[arg(long)]
        username: String,
        #[arg(long, default_value = "admin")]
        database: String,
    },
    EnableBackup(HostArgs),
    DisableBackup(HostArgs),
    EnableMonitoring(HostArgs),
    DisableMonitoring(HostArgs),
    /// Register an index
    AddIndex {
        #[command(flatten)]
        document: DocumentArgs,
        #[arg(long)]
        db: String,
        #[arg(long)]
        collection: String,
        #[arg(long)]
        rs_name: String,
        /// field:direction, repeatable and ordered
        #[arg(long = "key", required = true)]
        keys: Vec<String>,
    },
    /// Remove a replica set or sharded cluster from the document
    RemoveCluster {
        #[command(flatten)]
        document: DocumentArgs,
        #[arg(long)]
        name: String,
    },
    /// Generate an example tool configuration file
    GenerateConfig {
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Validate a tool configuration file
    Validate {
        /// Path of the TOML file to check
        path: PathBuf,
    },
    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::GenerateConfig { output } => return generate_config(output),
        Commands::Validate { path } => return validate_config(path),
        Commands::Version => {
            show_version();
            return Ok(());
        }
        command => {
            let config = match &cli.config {
                Some(path) => Config::load_from_file(path)
                    .with_context(|| format!("Failed to load config from {:?}", path))?,
                None => Config::default(),
            };
            init_logging(&config)?;
            run_command(command, &config)
        }
    }
}

fn run_command(command: Commands, config: &Config) -> anyhow::Result<()> {
    match command {
        Commands::Shutdown(args) => run_lifecycle(Action::Shutdown, args, config),
        Commands::Startup(args) => run_lifecycle(Action::Startup, args, config),
        Commands::Restart(args) => run_lifecycle(Action::Restart, args, config),
        Commands::Resync(args) => run_lifecycle(Action::StartInitialSync, args, config),
        Commands::Reclaim(args) => run_lifecycle(Action::ReclaimFreeSpace, args, config),
        Commands::Suspend(args) => run_lifecycle(Action::Suspend, args, config),
        Commands::Resume(args) => run_lifecycle(Action::Resume, args, config),
        Commands::EnableAuth {
            document,
            mechanisms,
        } => edit(&document, config, |doc| {
            auth::enable_mechanism_with(doc, &mechanisms, &config.agent.defaults())?;
            Ok(())
        }),
        Commands::AddUser {
            document,
            username,
            database,
            password,
            roles,
        } => {
            let mut user = MongoDBUser::new(&username, &database);
            user.mechanisms = vec!["SCRAM-SHA-1".to_string(), "SCRAM-SHA-256".to_string()];
            for role in &roles {
                let (role, db) = role
                    .split_once('@')
                    .ok_or_else(|| anyhow!("role must be role@db, got {}", role))?;
                user = user.with_role(role, db);
            }
            auth::configure_scram_credentials(&mut user, &password)?;
            edit(&document, config, |doc| {
                auth::add_user(doc, user);
                Ok(())
            })
        }
        Commands::RemoveUser {
            document,
            username,
            database,
        } => edit(&document, config, |doc| {
            auth::remove_user(doc, &username, &database)?;
            Ok(())
        }),
        Commands::EnableBackup(args) => edit(&args.document, config, |doc| {
            agents::enable_backup_with(doc, &args.hostname, &config.agent.backup_version)?;
            Ok(())
        }),
        Commands::DisableBackup(args) => edit(&args.document, config, |doc| {
            agents::disable_backup(doc, &args.hostname)?;
            Ok(())
        }),
        Commands::EnableMonitoring(args) => edit(&args.document, config, |doc| {
            agents::enable_monitoring_with(doc, &args.hostname, &config.agent.monitoring_version)?;
            Ok(())
        }),
        Commands::DisableMonitoring(args) => edit(&args.document, config, |doc| {
            agents::disable_monitoring(doc, &args.hostname)?;
            Ok(())
        }),
        Commands::AddIndex {
            document,
            db,
            collection,
            rs_name,
            keys,
        } => {
            let keys = keys
                .iter()
                .map(|k| parse_index_key(k))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let index = IndexConfig::new(&db, &collection, &rs_name, keys);
            edit(&document, config, |doc| {
                add_index_config(Some(doc), index)?;
                Ok(())
            })
        }
        Commands::RemoveCluster { document, name } => edit(&document, config, |doc| {
            remove_by_cluster_name(doc, &name);
            Ok(())
        }),
        Commands::GenerateConfig { .. } | Commands::Validate { .. } | Commands::Version => {
            unreachable!("handled before logging is initialized")
        }
    }
}

fn run_lifecycle(action: Action, args: ClusterArgs, config: &Config) -> anyhow::Result<()> {
    edit(&args.document, config, |doc| {
        lifecycle::run(doc, action, &args.cluster, &args.processes, None)?;
        Ok(())
    })
}

/// Load the document, apply `f`, write the result
fn edit<F>(args: &DocumentArgs, config: &Config, f: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut AutomationConfig) -> anyhow::Result<()>,
{
    let json = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read document {:?}", args.file))?;
    let mut doc = AutomationConfig::from_json(&json)
        .with_context(|| format!("Failed to parse document {:?}", args.file))?;

    f(&mut doc)?;

    let out = if config.output.pretty {
        doc.to_json_pretty()?
    } else {
        doc.to_json()?
    };
    match &args.output {
        Some(path) => {
            fs::write(path, out).with_context(|| format!("Failed to write {:?}", path))?;
            info!("Document written to {:?}", path);
        }
        None => println!("{}", out),
    }
    Ok(())
}

fn parse_index_key(spec: &str) -> anyhow::Result<IndexKey> {
    let (field, direction) = spec
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("index key must be field:direction, got {}", spec))?;
    Ok(match direction.parse::<i64>() {
        Ok(n) => IndexKey::new(field, n),
        Err(_) => IndexKey::new(field, direction),
    })
}

fn generate_config(output: PathBuf) -> anyhow::Result<()> {
    println!("Generating configuration file: {:?}", output);

    Config::create_example_config(&output)
        .map_err(|e| anyhow!("Failed to generate config: {}", e))?;

    println!("Configuration file generated successfully!");
    println!("  mongoconf --config {:?} <command>", output);

    Ok(())
}

fn validate_config(config_path: PathBuf) -> anyhow::Result<()> {
    println!("Validating configuration file: {:?}", config_path);

    match Config::load_from_file(&config_path) {
        Ok(config) => {
            println!("✓ Configuration file is valid");
            println!("  Log level: {} ({})", config.logging.level, config.logging.format);
            println!("  Keyfile: {}", config.agent.keyfile);
            println!("  Keyfile (Windows): {}", config.agent.keyfile_windows);
            println!("  Backup agent version: {}", config.agent.backup_version);
            println!("  Monitoring agent version: {}", config.agent.monitoring_version);
        }
        Err(e) => {
            eprintln!("✗ Configuration file validation failed:");
            match &e {
                ConfigError::IoError(msg) => eprintln!("  File error: {}", msg),
                ConfigError::ParseError(msg) => eprintln!("  Parse error: {}", msg),
                ConfigError::ValidationError(msg) => eprintln!("  Validation error: {}", msg),
                ConfigError::SerializeError(msg) => eprintln!("  Serialization error: {}", msg),
            }
            return Err(e.into());
        }
    }

    Ok(())
}

fn show_version() {
    println!("mongoconf v{}", env!("CARGO_PKG_VERSION"));
    println!("Edit MongoDB automation configuration documents");
    println!();
    println!("Features:");
    println!("  • Cluster-wide lifecycle commands with per-process filters");
    println!("  • SCRAM-SHA-1 / SCRAM-SHA-256 credential derivation");
    println!("  • Agent identity bootstrap and user management");
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    if config.logging.format == "json" {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;
    } else {
        let log_level = match config.logging.level.as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        };

        env_logger::Builder::new()
            .filter_level(log_level)
            .parse_default_env()
            .try_init()?;
    }

    info!("Logging initialized at level: {}", config.logging.level);
    Ok(())
}
