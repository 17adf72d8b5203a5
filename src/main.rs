use clap::Parser;
use regroup::config::MatchingConfig;
use regroup::io::{self, OverwritePolicy};
use regroup::penalty::PenaltyKind;
use regroup::scoring::MixingMultiplier;
use regroup::{create_matching, RegroupError};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "regroup")]
#[command(about = "Draw rotating groups that avoid repeated pairings", long_about = None)]
struct Cli {
    /// Names table (.csv or .json)
    #[arg(long)]
    names: PathBuf,
    /// Matchings history CSV; without it every pairing starts from zero
    #[arg(long)]
    history: Option<PathBuf>,
    /// Directory for the matching and the updated history
    #[arg(long)]
    output: Option<PathBuf>,
    /// JSON config file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    min_size: Option<usize>,
    #[arg(long)]
    n_groups: Option<usize>,
    #[arg(long)]
    max_size: Option<usize>,
    #[arg(long)]
    n_draws: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// Score status homogeneity of groups
    #[arg(long)]
    assortative: bool,
    #[arg(long)]
    mixing_multiplier: Option<f64>,
    #[arg(long, value_enum)]
    penalty: Option<PenaltyKind>,
    /// Overwrite existing output files without asking
    #[arg(long)]
    overwrite: bool,
}

impl Cli {
    fn matching_config(&self) -> Result<MatchingConfig, RegroupError> {
        let mut config = match &self.config {
            Some(path) => MatchingConfig::from_json_file(path)?,
            None => MatchingConfig::default(),
        };
        if self.min_size.is_some() {
            config.min_size = self.min_size;
        }
        if self.n_groups.is_some() {
            config.n_groups = self.n_groups;
            // an explicit group count without an explicit min_size decides the size alone
            if self.min_size.is_none() {
                config.min_size = None;
            }
        }
        if self.max_size.is_some() {
            config.max_size = self.max_size;
        }
        if let Some(n_draws) = self.n_draws {
            config.n_draws = n_draws;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.assortative {
            config.assortative = true;
        }
        if let Some(multiplier) = self.mixing_multiplier {
            config.mixing_multiplier = MixingMultiplier::Uniform(multiplier);
        }
        if let Some(penalty) = self.penalty {
            config.penalty = penalty;
        }
        Ok(config)
    }
}

fn prompt_for_name(path: &Path) -> Result<String, RegroupError> {
    eprint!("File {} exists. Enter another name or nothing to overwrite: ", path.display());
    std::io::stderr().flush()?;
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer)? == 0 {
        return Err(RegroupError::Other(format!(
            "no answer on stdin for existing file {}; pass --overwrite to replace it",
            path.display()
        )));
    }
    Ok(answer)
}

fn policy<'a>(
    overwrite: bool,
    ask: &'a mut dyn FnMut(&Path) -> Result<String, RegroupError>,
) -> OverwritePolicy<'a> {
    if overwrite {
        OverwritePolicy::Overwrite
    } else {
        OverwritePolicy::Prompt(ask)
    }
}

fn main() -> Result<(), RegroupError> {
    regroup::init_tracing("regroup");
    let cli = Cli::parse();
    let config = cli.matching_config()?;

    let names = io::read_participants(&cli.names)?;
    let history = io::read_or_create_history(cli.history.as_deref(), &names)?;
    let outcome = create_matching(&names, Some(&history), &config)?;

    print!("{}", outcome.text);

    if let Some(dir) = &cli.output {
        let mut ask = prompt_for_name;
        io::write_history(&outcome.updated_history, dir, policy(cli.overwrite, &mut ask))?;
        io::write_matching(&outcome.text, dir, policy(cli.overwrite, &mut ask))?;
    }

    Ok(())
}
