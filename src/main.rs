use chrono::prelude::*;
use clap::{Parser, Subcommand, Args};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{self, Write},
    path::Path,
};
use rand::seq::SliceRandom;

const MODEL_FILE: &str = "sleep_model.json";
const CONFIG_FILE: &str = "config.json";
const TIPS_FILE: &str = "tips.txt";

const SECONDS_PER_DAY: i64 = 86400;

const DEFAULT_WAKE: &str = "07:00";
const DEFAULT_SLEEP_GOAL: f64 = 8.0;
const DEFAULT_COFFEE_CUPS: u32 = 1;

const BEDTIME_TITLE: &str = "Your ideal bedtime is...";
const CALCULATION_ERROR: &str = "Sorry, there was a problem calculating your bedtime.";

#[derive(Parser)]
#[command(name = "BetterRest")]
#[command(version = "1.0")]
#[command(about = "Terminal tool for predicting your ideal bedtime")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Predict(PredictArgs),
    Interactive,
    Tip,
    Model(ModelCommands),
}

#[derive(Args)]
struct PredictArgs {
    #[arg(short, long, default_value = "07:00")]
    wake: String,
    #[arg(short, long, default_value = "8.0")]
    sleep: f64,
    #[arg(short, long, default_value = "1")]
    coffee: u32,
}

#[derive(Args)]
struct ModelCommands {
    #[command(subcommand)]
    action: ModelActions,
}

#[derive(Subcommand)]
enum ModelActions {
    Show,
    Check,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct SleepModel {
    coeff_wake: f64,
    coeff_sleep: f64,
    coeff_coffee: f64,
    intercept: f64,
}

impl Default for SleepModel {
    fn default() -> Self {
        SleepModel {
            coeff_wake: 0.0468,
            coeff_sleep: 3391.2,
            coeff_coffee: 173.4,
            intercept: 146.8,
        }
    }
}

impl SleepModel {
    fn evaluate(&self, wake_seconds: f64, sleep_goal_hours: f64, coffee_cups: f64) -> anyhow::Result<f64> {
        let predicted = self.coeff_wake * wake_seconds
            + self.coeff_sleep * sleep_goal_hours
            + self.coeff_coffee * coffee_cups
            + self.intercept;

        if !predicted.is_finite() {
            return Err(anyhow::anyhow!("Model produced a non-finite value"));
        }
        if predicted <= 0.0 || predicted >= SECONDS_PER_DAY as f64 {
            return Err(anyhow::anyhow!(
                "Model predicted an implausible sleep duration: {} seconds", predicted));
        }

        Ok(predicted)
    }
}

#[derive(Debug, Clone)]
struct Alert {
    title: String,
    message: String,
}

fn load_model() -> anyhow::Result<SleepModel> {
    if !Path::new(MODEL_FILE).exists() {
        return Ok(SleepModel::default());
    }
    let data = fs::read_to_string(MODEL_FILE)?;
    Ok(serde_json::from_str(&data)?)
}

fn seconds_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 3600 + time.minute() * 60
}

fn predict_bedtime(
    model: &SleepModel,
    wake_seconds: u32,
    sleep_goal_hours: f64,
    coffee_cups: u32,
) -> anyhow::Result<String> {
    let predicted = model.evaluate(wake_seconds as f64, sleep_goal_hours, coffee_cups as f64)?;
    let bedtime_seconds = (wake_seconds as i64 - predicted.round() as i64).rem_euclid(SECONDS_PER_DAY);

    let bedtime = NaiveTime::from_num_seconds_from_midnight_opt(bedtime_seconds as u32, 0)
        .ok_or_else(|| anyhow::anyhow!("Bedtime out of range: {} seconds", bedtime_seconds))?;

    Ok(bedtime.format("%H:%M").to_string())
}

fn bedtime_alert(
    model: &SleepModel,
    wake_seconds: u32,
    sleep_goal_hours: f64,
    coffee_cups: u32,
) -> Alert {
    match predict_bedtime(model, wake_seconds, sleep_goal_hours, coffee_cups) {
        Ok(bedtime) => Alert {
            title: BEDTIME_TITLE.to_string(),
            message: bedtime,
        },
        Err(_) => error_alert(),
    }
}

fn error_alert() -> Alert {
    Alert {
        title: "Error".to_string(),
        message: CALCULATION_ERROR.to_string(),
    }
}

fn show_alert(alert: &Alert) {
    println!("\n\x1b[1;34m{}\x1b[0m", alert.title);
    println!("{}\n", alert.message);
}

fn parse_wake_time(input: &str) -> anyhow::Result<NaiveTime> {
    Ok(NaiveTime::parse_from_str(input, "%H:%M")?)
}

fn validate_sleep_goal(hours: f64) -> anyhow::Result<()> {
    if !(4.0..=12.0).contains(&hours) {
        return Err(anyhow::anyhow!("Sleep goal must be between 4 and 12 hours"));
    }
    if (hours * 4.0).fract() != 0.0 {
        return Err(anyhow::anyhow!("Sleep goal must be a multiple of 0.25 hours"));
    }
    Ok(())
}

fn validate_coffee_cups(cups: u32) -> anyhow::Result<()> {
    if !(1..=20).contains(&cups) {
        return Err(anyhow::anyhow!("Coffee intake must be between 1 and 20 cups"));
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Predict(args) => run_prediction(&args)?,
        Commands::Interactive => interactive_session()?,
        Commands::Tip => sleep_tip()?,
        Commands::Model(model_cmd) => match model_cmd.action {
            ModelActions::Show => show_model()?,
            ModelActions::Check => check_model()?,
        },
    }

    Ok(())
}

fn run_prediction(args: &PredictArgs) -> anyhow::Result<()> {
    let wake = parse_wake_time(&args.wake)?;
    validate_sleep_goal(args.sleep)?;
    validate_coffee_cups(args.coffee)?;

    calculate_and_show(wake, args.sleep, args.coffee);
    Ok(())
}

fn calculate_and_show(wake: NaiveTime, sleep_goal_hours: f64, coffee_cups: u32) {
    let alert = match load_model() {
        Ok(model) => bedtime_alert(&model, seconds_since_midnight(wake), sleep_goal_hours, coffee_cups),
        Err(_) => error_alert(),
    };
    show_alert(&alert);
}

fn interactive_session() -> anyhow::Result<()> {
    println!("\n--- BETTER REST ---");

    print!("When do you want to wake up? (HH:MM) [{}]: ", DEFAULT_WAKE);
    io::stdout().flush()?;
    let mut wake_input = String::new();
    io::stdin().read_line(&mut wake_input)?;
    let wake_input = wake_input.trim();
    let wake = if wake_input.is_empty() {
        parse_wake_time(DEFAULT_WAKE)?
    } else {
        parse_wake_time(wake_input)?
    };

    print!("Desired amount of sleep (4-12 hours, steps of 0.25) [{}]: ", DEFAULT_SLEEP_GOAL);
    io::stdout().flush()?;
    let mut sleep_input = String::new();
    io::stdin().read_line(&mut sleep_input)?;
    let sleep_input = sleep_input.trim();
    let sleep_goal = if sleep_input.is_empty() {
        DEFAULT_SLEEP_GOAL
    } else {
        sleep_input.parse()?
    };
    validate_sleep_goal(sleep_goal)?;

    print!("Daily coffee intake (1-20 cups) [{}]: ", DEFAULT_COFFEE_CUPS);
    io::stdout().flush()?;
    let mut coffee_input = String::new();
    io::stdin().read_line(&mut coffee_input)?;
    let coffee_input = coffee_input.trim();
    let coffee_cups = if coffee_input.is_empty() {
        DEFAULT_COFFEE_CUPS
    } else {
        coffee_input.parse()?
    };
    validate_coffee_cups(coffee_cups)?;

    calculate_and_show(wake, sleep_goal, coffee_cups);
    Ok(())
}

fn show_model() -> anyhow::Result<()> {
    let model = load_model()?;
    let source = if Path::new(MODEL_FILE).exists() {
        MODEL_FILE
    } else {
        "built-in"
    };

    println!("\n--- SLEEP MODEL ({}) ---", source);
    println!("{:<22} {:>12}", "Coefficient", "Value");
    println!("{:<22} {:>12.4}", "wake (per second)", model.coeff_wake);
    println!("{:<22} {:>12.4}", "sleep goal (per hour)", model.coeff_sleep);
    println!("{:<22} {:>12.4}", "coffee (per cup)", model.coeff_coffee);
    println!("{:<22} {:>12.4}", "intercept", model.intercept);

    Ok(())
}

fn check_model() -> anyhow::Result<()> {
    let model = load_model()?;
    let wake = parse_wake_time(DEFAULT_WAKE)?;

    match model.evaluate(
        seconds_since_midnight(wake) as f64,
        DEFAULT_SLEEP_GOAL,
        DEFAULT_COFFEE_CUPS as f64,
    ) {
        Ok(predicted) => {
            println!("Model OK: predicts {:.1} hours of sleep for the default inputs",
                predicted / 3600.0);
        }
        Err(e) => {
            println!("Model check failed: {}", e);
        }
    }

    Ok(())
}

#[derive(Serialize, Deserialize)]
struct Config {
    sleep_tips: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sleep_tips: vec![
                "Keep your bedroom cool and dark".to_string(),
                "Avoid screens for an hour before bed".to_string(),
                "Skip caffeine within six hours of bedtime".to_string(),
                "Go to bed at the same time every night".to_string(),
                "Get daylight early in the morning".to_string(),
            ],
        }
    }
}

fn load_config() -> anyhow::Result<Config> {
    if Path::new(TIPS_FILE).exists() {
        let tips = fs::read_to_string(TIPS_FILE)?
            .lines()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        return Ok(Config { sleep_tips: tips });
    }

    if Path::new(CONFIG_FILE).exists() {
        let data = fs::read_to_string(CONFIG_FILE)?;
        return Ok(serde_json::from_str(&data)?);
    }

    Ok(Config::default())
}

fn sleep_tip() -> anyhow::Result<()> {
    let config = load_config()?;
    if config.sleep_tips.is_empty() {
        return Err(anyhow::anyhow!("No sleep tips found"));
    }

    let tip = config.sleep_tips
        .choose(&mut rand::thread_rng())
        .unwrap();

    println!("\nSLEEP TIP: {}\n", tip);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_model(predicted_seconds: f64) -> SleepModel {
        SleepModel {
            coeff_wake: 0.0,
            coeff_sleep: 0.0,
            coeff_coffee: 0.0,
            intercept: predicted_seconds,
        }
    }

    #[test]
    fn test_default_prediction() {
        let model = SleepModel::default();
        let bedtime = predict_bedtime(&model, 25200, 8.0, 1).unwrap();
        assert_eq!(bedtime, "23:02");
    }

    #[test]
    fn test_prediction_is_idempotent() {
        let model = SleepModel::default();
        let first = predict_bedtime(&model, 25200, 8.0, 1).unwrap();
        let second = predict_bedtime(&model, 25200, 8.0, 1).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_wraparound_past_midnight() {
        let model = fixed_model(32400.0);
        let bedtime = predict_bedtime(&model, 25200, 8.0, 1).unwrap();
        assert_eq!(bedtime, "22:00");
    }

    #[test]
    fn test_sleep_goal_boundaries() {
        let model = SleepModel::default();
        assert_eq!(predict_bedtime(&model, 25200, 4.0, 1).unwrap(), "02:48");
        assert_eq!(predict_bedtime(&model, 25200, 12.0, 1).unwrap(), "19:16");
    }

    #[test]
    fn test_coffee_boundaries() {
        let model = SleepModel::default();
        assert_eq!(predict_bedtime(&model, 25200, 8.0, 1).unwrap(), "23:02");
        assert_eq!(predict_bedtime(&model, 25200, 8.0, 20).unwrap(), "22:07");
    }

    #[test]
    fn test_default_model_stays_plausible() {
        let model = SleepModel::default();
        let corners = [
            (0u32, 4.0, 1u32),
            (0, 12.0, 20),
            (86340, 4.0, 1),
            (86340, 12.0, 20),
        ];

        for (wake, sleep, coffee) in corners {
            let predicted = model.evaluate(wake as f64, sleep, coffee as f64).unwrap();
            assert!(predicted > 0.0 && predicted < SECONDS_PER_DAY as f64);
        }
    }

    #[test]
    fn test_evaluate_rejects_non_finite() {
        let model = SleepModel {
            coeff_wake: f64::NAN,
            ..SleepModel::default()
        };
        assert!(model.evaluate(25200.0, 8.0, 1.0).is_err());
    }

    #[test]
    fn test_evaluate_rejects_implausible_duration() {
        assert!(fixed_model(0.0).evaluate(25200.0, 8.0, 1.0).is_err());
        assert!(fixed_model(-3600.0).evaluate(25200.0, 8.0, 1.0).is_err());
        assert!(fixed_model(90000.0).evaluate(25200.0, 8.0, 1.0).is_err());
    }

    #[test]
    fn test_failed_prediction_still_alerts() {
        let model = SleepModel {
            intercept: f64::INFINITY,
            ..SleepModel::default()
        };
        let alert = bedtime_alert(&model, 25200, 8.0, 1);
        assert_eq!(alert.title, "Error");
        assert_eq!(alert.message, CALCULATION_ERROR);
    }

    #[test]
    fn test_successful_prediction_alerts() {
        let alert = bedtime_alert(&SleepModel::default(), 25200, 8.0, 1);
        assert_eq!(alert.title, BEDTIME_TITLE);
        assert_eq!(alert.message, "23:02");
    }

    #[test]
    fn test_parse_wake_time() {
        assert_eq!(seconds_since_midnight(parse_wake_time("07:00").unwrap()), 25200);
        assert_eq!(seconds_since_midnight(parse_wake_time("00:00").unwrap()), 0);
        assert_eq!(seconds_since_midnight(parse_wake_time("23:59").unwrap()), 86340);
        assert!(parse_wake_time("7 am").is_err());
        assert!(parse_wake_time("25:00").is_err());
    }

    #[test]
    fn test_sleep_goal_validation() {
        assert!(validate_sleep_goal(4.0).is_ok());
        assert!(validate_sleep_goal(12.0).is_ok());
        assert!(validate_sleep_goal(8.25).is_ok());
        assert!(validate_sleep_goal(3.75).is_err());
        assert!(validate_sleep_goal(12.25).is_err());
        assert!(validate_sleep_goal(8.1).is_err());
    }

    #[test]
    fn test_coffee_validation() {
        assert!(validate_coffee_cups(1).is_ok());
        assert!(validate_coffee_cups(20).is_ok());
        assert!(validate_coffee_cups(0).is_err());
        assert!(validate_coffee_cups(21).is_err());
    }

    #[test]
    fn test_model_artifact_parses() {
        let data = r#"{"coeff_wake": 0.05, "coeff_sleep": 3600.0, "coeff_coffee": 120.0, "intercept": 0.0}"#;
        let model: SleepModel = serde_json::from_str(data).unwrap();
        let predicted = model.evaluate(25200.0, 8.0, 2.0).unwrap();
        assert_eq!(predicted, 0.05 * 25200.0 + 3600.0 * 8.0 + 240.0);
    }
}
