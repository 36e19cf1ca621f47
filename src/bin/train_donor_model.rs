use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use log::{debug, info};

use donor_response::dataset::TrainingSet;
use donor_response::model::DonorModel;
use donor_response::monitor::{init_logging, monitor_memory, pid_label};
use donor_response::{DonorError, MODEL_PATH};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Fit the donor response model and save it", long_about = None)]
pub struct TrainArgs {
    #[clap(short, long, parse(from_os_str),
    help = "Training CSV; the built-in dataset is used when omitted")]
    dataset: Option<PathBuf>,
    #[clap(short, long, parse(from_os_str), default_value = MODEL_PATH,
    help = "Where to write the model artifact")]
    output: PathBuf,
    #[clap(short, long, parse(from_occurrences), help = "Verbose level")]
    verbose: usize,
}

async fn train(opts: &TrainArgs) -> Result<(), DonorError> {
    let training = match &opts.dataset {
        Some(path) => TrainingSet::from_csv(path).await?,
        None => TrainingSet::builtin(),
    };

    let model = DonorModel::fit(&training)?;
    model.save(&opts.output).await?;

    println!("Model trained and saved as {}", opts.output.display());
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), DonorError> {
    let cli = TrainArgs::parse();
    init_logging(cli.verbose);
    debug!("Arguments {:#?}", cli);

    let start_time = Instant::now();
    let start_memory = monitor_memory();
    info!("Training started (pid {})", pid_label());

    train(&cli).await?;

    let end_memory = monitor_memory();
    info!("Time elapsed in training: {:?}", start_time.elapsed());
    info!("Memory used: {} bytes", end_memory.saturating_sub(start_memory));
    Ok(())
}
