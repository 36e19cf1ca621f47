use std::path::PathBuf;

use clap::Parser;
use log::debug;

use donor_response::encoder::{encode, MatchFeatures, RequestContext};
use donor_response::input::{parse_blood_group, parse_donor};
use donor_response::model::DonorModel;
use donor_response::monitor::init_logging;
use donor_response::recommend::{read_roster, recommend, DonorQuery, DEFAULT_LIMIT, DEFAULT_STATE};
use donor_response::records::DonorRecord;
use donor_response::{DonorError, MODEL_PATH};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Score how likely a donor is to respond", long_about = None)]
pub struct PredictArgs {
    #[clap(help = "Donor as JSON or as \"bloodGroup,city,months\"")]
    input: Option<String>,
    #[clap(short, long, parse(from_os_str), default_value = MODEL_PATH,
    help = "Model artifact written by train-donor-model")]
    model: PathBuf,
    #[clap(long, help = "Requested blood group, one of the eight canonical groups; defaults to the donor's")]
    request_blood_group: Option<String>,
    #[clap(long, help = "Requested city; defaults to the donor's")]
    request_city: Option<String>,
    #[clap(short, long, parse(from_os_str),
    help = "Donor roster CSV to recommend donors from")]
    roster: Option<PathBuf>,
    #[clap(short, long, default_value = DEFAULT_STATE,
    help = "Requested state, used when matching roster donors")]
    state: String,
    #[clap(short, long, default_value_t = DEFAULT_LIMIT,
    help = "Maximum number of recommended donors, 0 for all")]
    limit: usize,
    #[clap(short, long, parse(from_occurrences), help = "Verbose level")]
    verbose: usize,
}

async fn predict(opts: &PredictArgs) -> Result<(), DonorError> {
    let record = match &opts.input {
        Some(input) => parse_donor(input)?,
        None => DonorRecord::default(),
    };

    let mut request = RequestContext::for_record(&record);
    if let Some(blood_group) = &opts.request_blood_group {
        request.blood_group = parse_blood_group(blood_group)?;
    }
    if let Some(city) = &opts.request_city {
        request.city = city.clone();
    }

    let encoded = encode(&record);
    let features = MatchFeatures::against(&record, &request);
    debug!("Feature vector {:?}, match features {:?}", encoded.to_array(), features.to_array());

    let model = DonorModel::load(&opts.model).await?;
    let probability = model.predict_proba(&features);
    println!("Predicted donor response probability: {:.2}", probability);

    if let Some(roster_path) = &opts.roster {
        let roster = read_roster(roster_path)?;
        let query = DonorQuery::new(&request.blood_group, &request.city, &opts.state, opts.limit);
        for (rank, donor) in recommend(&roster, &query).iter().enumerate() {
            let last = donor
                .last_donation_date
                .map_or_else(|| "never".to_string(), |d| d.to_string());
            println!(
                "{}. {} ({}) {} {}, {} donations, last {}",
                rank + 1,
                donor.full_name,
                donor.phone,
                donor.blood_group,
                donor.city,
                donor.donation_count,
                last
            );
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), DonorError> {
    let cli = PredictArgs::parse();
    init_logging(cli.verbose);
    debug!("Arguments {:#?}", cli);

    predict(&cli).await?;
    Ok(())
}
