use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use clap::{App, Arg};
use hcn_dialog::{DialogTurn, HcnConfig, HybridCodeNetworkBot, Trainer};

fn read_turns(path: &str) -> Vec<DialogTurn> {
    let file = File::open(path).unwrap();
    BufReader::new(file)
        .lines()
        .map(|line| line.unwrap())
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(&line).unwrap())
        .collect()
}

fn main() {
    env_logger::Builder::from_default_env()
        .format_timestamp_nanos()
        .init();

    let matches = App::new("train-hcn")
        .about("Trains a Hybrid Code Network dialog policy on JSON lines dialog turns")
        .arg(
            Arg::with_name("BOT_DIR")
                .required(true)
                .takes_value(true)
                .index(1)
                .help("path to the bot directory containing hcn.json and the templates"),
        )
        .arg(
            Arg::with_name("TRAIN_FILE")
                .required(true)
                .takes_value(true)
                .index(2)
                .help("path to the training turns, one json record per line"),
        )
        .arg(
            Arg::with_name("valid_file")
                .short("v")
                .long("--valid")
                .takes_value(true)
                .help("path to the validation turns"),
        )
        .arg(
            Arg::with_name("epochs")
                .short("e")
                .long("--epochs")
                .takes_value(true)
                .help("number of epochs, overrides the bot configuration"),
        )
        .arg(
            Arg::with_name("save_to")
                .short("o")
                .long("--save-to")
                .takes_value(true)
                .help("where to write the trained policy weights"),
        )
        .get_matches();
    let bot_dir = matches.value_of("BOT_DIR").unwrap();
    let train_turns = read_turns(matches.value_of("TRAIN_FILE").unwrap());
    let valid_turns = matches
        .value_of("valid_file")
        .map(read_turns)
        .unwrap_or_default();

    let config: HcnConfig =
        serde_json::from_reader(File::open(Path::new(bot_dir).join("hcn.json")).unwrap())
            .unwrap();
    let num_epochs = matches
        .value_of("epochs")
        .map(|v| v.parse::<usize>().unwrap())
        .unwrap_or(config.num_epochs);

    println!("\nLoading the bot...");
    let mut bot = HybridCodeNetworkBot::from_path(bot_dir).unwrap();
    println!(
        "{} training turns, {} validation turns",
        train_turns.len(),
        valid_turns.len()
    );

    let trainer = Trainer::new(num_epochs, config.val_patience);
    let summary = trainer.train(&mut bot, &train_turns, &valid_turns).unwrap();
    println!("Epochs: {}", summary.epochs);
    println!("Train: {}", summary.train_metrics.report());
    if let Some(valid_metrics) = summary.valid_metrics {
        println!("Valid: {}", valid_metrics.report());
    }

    if let Some(save_to) = matches.value_of("save_to") {
        bot.save_to_path(save_to).unwrap();
        println!("Policy weights saved to {}", save_to);
    }
}
