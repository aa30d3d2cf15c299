use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

#[derive(Parser)]
#[command(name = "segscore")]
#[command(
    about = "Score building-segmentation predictions against ground truth — mean IoU over public/private splits"
)]
struct Cli {
    /// Path to the ground truth CSV file
    gt: PathBuf,

    /// Path to the prediction CSV file
    pred: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let start = Instant::now();
    match segscore::evaluate(&cli.gt, &cli.pred) {
        Ok(scores) => {
            println!("score={},pScore={}", scores.public, scores.private);
            eprintln!("Elapsed Time: {:.3}s", start.elapsed().as_secs_f64());
        }
        Err(e) => {
            eprintln!("evaluation error: {e}");
            std::process::exit(1);
        }
    }
}
