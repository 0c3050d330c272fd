//! agora — command-line client for the voter identity portal.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use agora_client::HttpPortal;
use agora_types::NationalId;
use agora_utils::{init_logging, LogFormat};
use agora_validation::{normalize_phone, validate_email, FieldErrors};
use agora_verification::{
    ChallengeClient, ContactForm, ContactInput, ContactOutcome, FormOutcome, IdentityInput,
    IdentityWorkflow, LookupOutcome, Notice, PortalConfig, SmsInput, TrackerLookup, ViewRegistry,
    WorkflowState,
};
use anyhow::{bail, Context};
use clap::Parser;

#[derive(Parser)]
#[command(name = "agora", about = "Voter identity portal client")]
struct Cli {
    /// Base URL of the portal API.
    #[arg(long, env = "AGORA_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Public URL of the election voters are redirected to.
    #[arg(long, env = "AGORA_ELECTION_URL")]
    election_url: Option<String>,

    /// Election id used for vote lookups.
    #[arg(long, env = "AGORA_ELECTION_ID")]
    election_id: Option<u64>,

    /// Regular expression normalised phone numbers must match.
    #[arg(long, env = "AGORA_PHONE_PATTERN")]
    phone_pattern: Option<String>,

    /// Ask for a challenge on the Identify form.
    #[arg(long, env = "AGORA_REGISTER_CHALLENGE")]
    register_challenge: bool,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "AGORA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "AGORA_LOG_FORMAT")]
    log_format: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "AGORA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Normalise a phone number.
    CheckPhone { phone: String },
    /// Check a national ID's control letter.
    CheckId { national_id: String },
    /// Check an email address's syntax.
    CheckEmail { email: String },
    /// Register personal data and request an SMS code.
    Identify {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        national_id: String,
        #[arg(long)]
        postal_code: String,
        /// Confirm you are of voting age.
        #[arg(long)]
        above_age: bool,
        /// Accept the participation conditions.
        #[arg(long)]
        accept_conditions: bool,
        #[arg(long)]
        receive_updates: bool,
    },
    /// Submit a received SMS code.
    VerifySms {
        #[arg(long)]
        code: String,
        /// Phone number the code was sent to.
        #[arg(long)]
        phone: Option<String>,
        /// National ID used when identifying.
        #[arg(long)]
        national_id: Option<String>,
    },
    /// Look up a cast vote by its tracker.
    Track { tracker: String },
    /// Send a message to the organisers.
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long)]
        body: String,
    },
    /// Fetch a fresh challenge and print its key and image.
    Challenge,
}

fn load_config(cli: &Cli) -> (PortalConfig, Option<String>) {
    let (mut config, load_error) = match &cli.config {
        Some(path) => match PortalConfig::from_toml_file(&path.to_string_lossy()) {
            Ok(config) => (config, None),
            Err(e) => (
                PortalConfig::default(),
                Some(format!(
                    "failed to load config file {}: {e}, using defaults",
                    path.display()
                )),
            ),
        },
        None => (PortalConfig::default(), None),
    };

    if let Some(url) = &cli.api_base_url {
        config.api_base_url = url.clone();
    }
    if let Some(url) = &cli.election_url {
        config.election.url = url.clone();
    }
    if let Some(id) = cli.election_id {
        config.election.id = id;
    }
    if let Some(pattern) = &cli.phone_pattern {
        config.phone_pattern = pattern.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    config.register_requires_challenge |= cli.register_challenge;

    (config, load_error)
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn print_field_errors(errors: &FieldErrors) {
    for error in errors.iter() {
        eprintln!("  {}: {}", error.field, error.message);
    }
}

fn report_failure(notice: &Notice) -> anyhow::Error {
    match notice.next_step {
        Some(step) => anyhow::anyhow!("{} (next: {step:?})", notice.message),
        None => anyhow::anyhow!("{}", notice.message),
    }
}

/// Drive a form outcome to a printed result.
fn finish(outcome: FormOutcome) -> anyhow::Result<Option<WorkflowState>> {
    match outcome {
        FormOutcome::Advanced(state) => Ok(Some(state)),
        FormOutcome::Invalid(errors) => {
            eprintln!("invalid input:");
            print_field_errors(&errors);
            bail!("{} field(s) rejected", errors.len())
        }
        FormOutcome::Failed(notice) => Err(report_failure(&notice)),
        FormOutcome::Busy | FormOutcome::Stale => Ok(None),
    }
}

async fn verify_loop(workflow: &IdentityWorkflow<HttpPortal>) -> anyhow::Result<()> {
    loop {
        let code = prompt("SMS code (empty to stop)")?;
        if code.is_empty() {
            return Ok(());
        }
        let input = SmsInput {
            sms_code: code,
            ..SmsInput::default()
        };
        match workflow.submit_sms(&input).await? {
            FormOutcome::Failed(notice) if notice.retryable => eprintln!("{}", notice.message),
            outcome => {
                if let Some(WorkflowState::Redirecting { url }) = finish(outcome)? {
                    println!("{url}");
                    return Ok(());
                }
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, load_error) = load_config(&cli);

    let format = config.log_format.parse().unwrap_or(LogFormat::Human);
    init_logging(format, &config.log_level);
    if let Some(warning) = load_error {
        tracing::warn!("{warning}");
    }

    let settings = Rc::new(config.settings()?);
    let views = Rc::new(ViewRegistry::new());

    match cli.command {
        Command::CheckPhone { phone } => match normalize_phone(&phone, &settings.phone_pattern) {
            Some(phone) => println!("{phone}"),
            None => bail!(
                "not a valid phone number for pattern {}",
                settings.phone_pattern.as_str()
            ),
        },
        Command::CheckId { national_id } => {
            let id = NationalId::parse(&national_id)?;
            println!("{id}");
        }
        Command::CheckEmail { email } => {
            if !validate_email(&email) {
                bail!("not a valid email address");
            }
            println!("{email}");
        }
        Command::Identify {
            first_name,
            last_name,
            email,
            phone,
            national_id,
            postal_code,
            above_age,
            accept_conditions,
            receive_updates,
        } => {
            let api = Rc::new(config.http_portal()?);
            let workflow = IdentityWorkflow::start(api, settings.clone(), views);
            let challenge_text = if settings.register_requires_challenge {
                let token = workflow
                    .prepare_challenge()
                    .await
                    .context("challenge unavailable")?;
                println!("challenge image: {}", token.image_url);
                Some(prompt("challenge text")?)
            } else {
                None
            };
            let input = IdentityInput {
                first_name,
                last_name,
                email,
                phone,
                national_id,
                postal_code,
                above_age,
                accept_conditions,
                receive_updates,
                challenge_text,
            };
            if finish(workflow.submit_identity(&input).await?)?.is_some() {
                println!("SMS code sent");
                verify_loop(&workflow).await?;
            }
        }
        Command::VerifySms {
            code,
            phone,
            national_id,
        } => {
            let api = Rc::new(config.http_portal()?);
            let workflow = IdentityWorkflow::start(api, settings, views);
            workflow.enter_sms_verification()?;
            let input = SmsInput {
                sms_code: code,
                phone,
                national_id,
            };
            if let Some(WorkflowState::Redirecting { url }) =
                finish(workflow.submit_sms(&input).await?)?
            {
                println!("{url}");
            }
        }
        Command::Track { tracker } => {
            let api = Rc::new(config.http_portal()?);
            let lookup = TrackerLookup::open(api, views);
            match lookup.lookup(&tracker).await {
                LookupOutcome::Found(vote) => {
                    println!("{}", serde_json::to_string_pretty(&vote)?);
                }
                LookupOutcome::Invalid(errors) => {
                    print_field_errors(&errors);
                    bail!("invalid tracker");
                }
                LookupOutcome::NotFound(notice) | LookupOutcome::Failed(notice) => {
                    return Err(report_failure(&notice));
                }
                LookupOutcome::Busy | LookupOutcome::Stale => {}
            }
        }
        Command::Contact {
            name,
            email,
            phone,
            body,
        } => {
            let api = Rc::new(config.http_portal()?);
            let form = ContactForm::open(api, settings, views);
            loop {
                let token = form
                    .prepare_challenge()
                    .await
                    .context("challenge unavailable")?;
                println!("challenge image: {}", token.image_url);
                let input = ContactInput {
                    name: name.clone(),
                    email: email.clone(),
                    phone: phone.clone(),
                    body: body.clone(),
                    challenge_text: prompt("challenge text")?,
                };
                match form.submit(&input).await {
                    ContactOutcome::Sent => {
                        println!("message sent");
                        break;
                    }
                    ContactOutcome::Failed(notice) if notice.retryable => {
                        eprintln!("{}", notice.message);
                    }
                    ContactOutcome::Failed(notice) => return Err(report_failure(&notice)),
                    ContactOutcome::Invalid(errors) => {
                        print_field_errors(&errors);
                        bail!("{} field(s) rejected", errors.len());
                    }
                    ContactOutcome::Busy | ContactOutcome::Stale => break,
                }
            }
        }
        Command::Challenge => {
            let api = Rc::new(config.http_portal()?);
            let token = ChallengeClient::new(api)
                .acquire(true)
                .await
                .context("challenge unavailable")?;
            println!("key: {}", token.key);
            println!("image: {}", token.image_url);
        }
    }

    Ok(())
}
