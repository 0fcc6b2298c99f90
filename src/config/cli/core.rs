//! Core CLI types - Cli, Command, and argument structs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::types::OutputFormat;
use crate::config::RvaeConfig;

/// Recurrent VAE language model trainer
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "rvae")]
#[command(version)]
#[command(about = "Train a recurrent variational autoencoder language model")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Train a model (YAML config optional, flags override it)
    Train(TrainArgs),

    /// Validate a configuration file without training
    Validate(ValidateArgs),

    /// Display the effective configuration
    Info(InfoArgs),
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq, Default)]
pub struct TrainArgs {
    /// Path to YAML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Dataset name: ptb or wt2
    #[arg(long)]
    pub dataset: Option<String>,

    /// Directory holding the dataset files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Size of word embeddings
    #[arg(long)]
    pub emsize: Option<usize>,

    /// Number of hidden units per layer
    #[arg(long)]
    pub nhid: Option<usize>,

    /// Number of layers
    #[arg(long)]
    pub nlayers: Option<usize>,

    /// Dimensionality of the latent code
    #[arg(long)]
    pub z_dim: Option<usize>,

    /// Initial learning rate
    #[arg(long)]
    pub lr: Option<f32>,

    /// Gradient clipping threshold
    #[arg(long)]
    pub clip: Option<f32>,

    /// Epochs to wait before increasing the KL weight
    #[arg(long)]
    pub kl_anneal_delay: Option<usize>,

    /// KL weight increase per batch
    #[arg(long)]
    pub kl_anneal_rate: Option<f32>,

    /// Rate at which decoder input words are kept
    #[arg(long)]
    pub keep_rate: Option<f32>,

    /// Upper epoch limit
    #[arg(long)]
    pub epochs: Option<usize>,

    /// Batch size
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Maximum sentence length
    #[arg(long)]
    pub bptt: Option<usize>,

    /// Dropout applied to decoder outputs
    #[arg(long)]
    pub dropout: Option<f32>,

    /// Dropout on the encoder hidden state
    #[arg(long)]
    pub dropouth: Option<f32>,

    /// Dropout on input embeddings
    #[arg(long)]
    pub dropouti: Option<f32>,

    /// Dropout removing words from the embedding matrix
    #[arg(long)]
    pub dropoute: Option<f32>,

    /// Weight dropout on the hidden-to-hidden matrix
    #[arg(long)]
    pub wdrop: Option<f32>,

    /// Maximum KL penalty (0 = unclamped)
    #[arg(long)]
    pub max_kl_penalty: Option<f32>,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Non-monotone window for switching to ASGD
    #[arg(long)]
    pub nonmono: Option<usize>,

    /// Compute device
    #[arg(long)]
    pub device: Option<String>,

    /// Batches between progress reports
    #[arg(long)]
    pub log_interval: Option<usize>,

    /// Path to save the model checkpoint
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Do not write checkpoints
    #[arg(long, conflicts_with = "save")]
    pub no_save: bool,

    /// L2 regularisation on decoder activations
    #[arg(long)]
    pub alpha: Option<f32>,

    /// Slowness regularisation on decoder activations
    #[arg(long)]
    pub beta: Option<f32>,

    /// Weight decay applied to all weights
    #[arg(long)]
    pub wdecay: Option<f32>,

    /// Switch to averaged SGD when validation stalls
    #[arg(long)]
    pub asgd_trigger: bool,

    /// Evaluate with the posterior mean instead of a sample
    #[arg(long)]
    pub deterministic_eval: bool,

    /// Validate config and load data but don't train
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Show the parsed configuration after validating
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for the info command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InfoArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Output format (text, json, yaml)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Apply command-line overrides to a configuration
pub fn apply_overrides(config: &mut RvaeConfig, args: &TrainArgs) {
    let model = &mut config.model;
    override_field(&mut model.emsize, args.emsize);
    override_field(&mut model.nhid, args.nhid);
    override_field(&mut model.nlayers, args.nlayers);
    override_field(&mut model.z_dim, args.z_dim);
    override_field(&mut model.dropout, args.dropout);
    override_field(&mut model.dropouth, args.dropouth);
    override_field(&mut model.dropouti, args.dropouti);
    override_field(&mut model.dropoute, args.dropoute);
    override_field(&mut model.wdrop, args.wdrop);
    override_field(&mut model.keep_rate, args.keep_rate);

    let data = &mut config.data;
    override_field(&mut data.dataset, args.dataset.clone());
    override_field(&mut data.data_dir, args.data_dir.clone());
    override_field(&mut data.batch_size, args.batch_size);
    override_field(&mut data.bptt, args.bptt);

    let training = &mut config.training;
    override_field(&mut training.lr, args.lr);
    override_field(&mut training.clip, args.clip);
    override_field(&mut training.epochs, args.epochs);
    override_field(&mut training.kl_anneal_delay, args.kl_anneal_delay);
    override_field(&mut training.kl_anneal_rate, args.kl_anneal_rate);
    override_field(&mut training.max_kl_penalty, args.max_kl_penalty);
    override_field(&mut training.seed, args.seed);
    override_field(&mut training.nonmono, args.nonmono);
    override_field(&mut training.device, args.device.clone());
    override_field(&mut training.log_interval, args.log_interval);
    override_field(&mut training.alpha, args.alpha);
    override_field(&mut training.beta, args.beta);
    override_field(&mut training.wdecay, args.wdecay);
    if let Some(save) = &args.save {
        training.save = Some(save.clone());
    }
    if args.no_save {
        training.save = None;
    }
    training.asgd_trigger |= args.asgd_trigger;
    training.deterministic_eval |= args.deterministic_eval;
}

fn override_field<T>(field: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *field = v;
    }
}
