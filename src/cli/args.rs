use clap::{Args, Parser, Subcommand};

use amr_data_entry::{
    config::app_config::DEFAULT_CONFIG_PATH,
    domain::patient::{
        Acquisition, BsiSource, Gender, Indicator, PatientRecord, Setting, Species, AGE_RANGE,
        DEFAULT_AGE,
    },
    ports::command_handler::Command,
};

/// Record antimicrobial-resistance cases into a Google Sheet
#[derive(Parser, Debug)]
#[command(name = "amr-data-entry", version)]
pub struct Cli {
    /// Configuration file, with or without extension
    #[arg(long, global = true, env = "CONFIG_PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Submit one patient form
    Submit(SubmitArgs),
    /// Connect, open the store and print its header row
    Check {
        /// Spreadsheet title, overriding `sheets.store_name`
        #[arg(long)]
        store: Option<String>,
    },
    /// Print the form fields with their allowed values and defaults
    Fields,
}

impl CliCommand {
    /// Whether the command needs a working configuration to do anything.
    pub fn needs_remote_store(&self) -> bool {
        match self {
            CliCommand::Submit(args) => !args.dry_run,
            CliCommand::Check { .. } => true,
            CliCommand::Fields => false,
        }
    }
}

impl From<CliCommand> for Command {
    fn from(command: CliCommand) -> Self {
        match command {
            CliCommand::Submit(args) => Command::Submit {
                store_name: args.store.clone(),
                dry_run: args.dry_run,
                patient: args.into(),
            },
            CliCommand::Check { store } => Command::CheckStore { store_name: store },
            CliCommand::Fields => Command::ListFields,
        }
    }
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Age in years
    #[arg(long, default_value_t = DEFAULT_AGE, value_parser = clap::value_parser!(i64).range(AGE_RANGE))]
    pub age: i64,

    #[arg(long, default_value_t)]
    pub gender: Gender,

    /// Isolated species, e.g. "E. coli" or "klebsiella"
    #[arg(long, default_value_t)]
    pub species: Species,

    /// Rectal CPE positive (0/1, no/yes)
    #[arg(long, default_value_t)]
    pub rectal_cpe_pos: Indicator,

    /// "ICU" or "Internal Medicine"
    #[arg(long, default_value_t)]
    pub setting: Setting,

    #[arg(long, default_value_t)]
    pub acquisition: Acquisition,

    /// Bloodstream infection source
    #[arg(long, default_value_t)]
    pub bsi_source: BsiSource,

    /// Congestive heart failure
    #[arg(long, default_value_t)]
    pub chf: Indicator,

    /// Chronic kidney disease
    #[arg(long, default_value_t)]
    pub ckd: Indicator,

    #[arg(long, default_value_t)]
    pub tumor: Indicator,

    #[arg(long, default_value_t)]
    pub diabetes: Indicator,

    #[arg(long, default_value_t)]
    pub immunosuppressed: Indicator,

    /// Carbapenem resistance
    #[arg(long, default_value_t)]
    pub cr: Indicator,

    /// BL/BLI resistance
    #[arg(long, default_value_t)]
    pub blbli_r: Indicator,

    /// Fluoroquinolone resistance
    #[arg(long, default_value_t)]
    pub fqr: Indicator,

    /// 3rd generation cephalosporin resistance
    #[arg(long = "three-gc-r", visible_alias = "3gc-r", default_value_t)]
    pub three_gc_r: Indicator,

    /// Spreadsheet title, overriding `sheets.store_name`
    #[arg(long)]
    pub store: Option<String>,

    /// Append to an in-memory store and print the rows instead
    #[arg(long)]
    pub dry_run: bool,
}

impl From<SubmitArgs> for PatientRecord {
    fn from(args: SubmitArgs) -> Self {
        PatientRecord {
            age: args.age,
            gender: args.gender,
            species: args.species,
            rectal_cpe_pos: args.rectal_cpe_pos,
            setting: args.setting,
            acquisition: args.acquisition,
            bsi_source: args.bsi_source,
            chf: args.chf,
            ckd: args.ckd,
            tumor: args.tumor,
            diabetes: args.diabetes,
            immunosuppressed: args.immunosuppressed,
            cr: args.cr,
            blbli_r: args.blbli_r,
            fqr: args.fqr,
            three_gc_r: args.three_gc_r,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("amr-data-entry").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_submit_defaults_match_form_defaults() {
        let cli = parse(&["submit"]);
        match Command::from(cli.command) {
            Command::Submit {
                patient,
                store_name,
                dry_run,
            } => {
                assert_eq!(patient, PatientRecord::default());
                assert_eq!(store_name, None);
                assert!(!dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.config, DEFAULT_CONFIG_PATH);
    }

    #[test]
    fn test_submit_parses_display_text_and_aliases() {
        let cli = parse(&[
            "submit",
            "--age",
            "42",
            "--gender",
            "female",
            "--species",
            "Klebsiella spp.",
            "--setting",
            "internal-medicine",
            "--bsi-source",
            "uti",
            "--cr",
            "yes",
            "--3gc-r",
            "1",
            "--store",
            "Ward7",
            "--dry-run",
        ]);

        match Command::from(cli.command) {
            Command::Submit {
                patient,
                store_name,
                dry_run,
            } => {
                assert_eq!(patient.age, 42);
                assert_eq!(patient.gender, Gender::Female);
                assert_eq!(patient.species, Species::Klebsiella);
                assert_eq!(patient.setting, Setting::InternalMedicine);
                assert_eq!(patient.bsi_source, BsiSource::Uti);
                assert_eq!(patient.cr, Indicator::Yes);
                assert_eq!(patient.three_gc_r, Indicator::Yes);
                assert_eq!(patient.chf, Indicator::No);
                assert_eq!(store_name.as_deref(), Some("Ward7"));
                assert!(dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_age_outside_range_is_rejected() {
        for age in ["17", "121"] {
            let result = Cli::try_parse_from(["amr-data-entry", "submit", "--age", age]);
            assert!(result.is_err(), "age {} should be rejected", age);
        }
    }

    #[test]
    fn test_unknown_species_is_rejected() {
        let result = Cli::try_parse_from(["amr-data-entry", "submit", "--species", "S. aureus"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_remote_store_requirement() {
        assert!(parse(&["submit"]).command.needs_remote_store());
        assert!(!parse(&["submit", "--dry-run"]).command.needs_remote_store());
        assert!(parse(&["check"]).command.needs_remote_store());
        assert!(!parse(&["fields"]).command.needs_remote_store());
    }

    #[test]
    fn test_config_path_flag() {
        let cli = parse(&["--config", "Ward7.toml", "check", "--store", "Ward7"]);
        assert_eq!(cli.config, "Ward7.toml");
        assert!(matches!(
            Command::from(cli.command),
            Command::CheckStore { store_name: Some(name) } if name == "Ward7"
        ));
    }
}
