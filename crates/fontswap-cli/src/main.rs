use clap::{App, Arg, ArgGroup, ArgMatches};
use fontswap::{
    Config, FontSwapError, GlyphSource, HttpDownloader, InstallOutcome, MacSystem, Orchestrator,
    RestoreReport, SignaturePolicy,
};
use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process;

fn read_args() -> ArgMatches<'static> {
    App::new("fontswap")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Replaces Ableton Live's interface fonts with Atkinson Hyperlegible")
        .arg(
            Arg::with_name("install")
                .short("i")
                .long("install")
                .help("Download Atkinson Hyperlegible and install it (the default)"),
        )
        .arg(
            Arg::with_name("revert")
                .short("r")
                .long("revert")
                .help("Restore the fonts from the most recent backup"),
        )
        .arg(
            Arg::with_name("restore-id")
                .long("restore-id")
                .value_name("ID")
                .takes_value(true)
                .conflicts_with_all(&["install", "list", "custom"])
                .help("Restore the fonts from the named backup"),
        )
        .arg(
            Arg::with_name("list")
                .short("l")
                .long("list")
                .help("List the backups"),
        )
        .arg(
            Arg::with_name("custom")
                .short("c")
                .long("custom")
                .value_name("FONT")
                .takes_value(true)
                .help("Install this font for every style instead of downloading"),
        )
        .group(ArgGroup::with_name("mode").args(&["install", "revert", "list", "custom"]))
        .arg(
            Arg::with_name("scale")
                .short("s")
                .long("scale")
                .value_name("FACTOR")
                .takes_value(true)
                .default_value("1.0")
                .help("Enlarge the glyphs by this factor"),
        )
        .arg(
            Arg::with_name("app")
                .long("app")
                .value_name("PATH")
                .takes_value(true)
                .help("The Ableton Live application bundle to patch"),
        )
        .arg(
            Arg::with_name("backup-dir")
                .long("backup-dir")
                .value_name("DIR")
                .takes_value(true)
                .help("Where backups are kept [default: ~/.fontswap/backups]"),
        )
        .arg(
            Arg::with_name("signature")
                .long("signature")
                .value_name("POLICY")
                .takes_value(true)
                .possible_values(&["strip", "adhoc", "skip"])
                .help("What to do with Live's code signature (asks if not given)"),
        )
        .arg(
            Arg::with_name("dry-run")
                .long("dry-run")
                .help("Show what an install or revert would do but change nothing"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Print debugging output"),
        )
        .get_matches()
}

fn config_from(matches: &ArgMatches) -> Result<Config, FontSwapError> {
    let mut config = match matches.value_of("backup-dir") {
        Some(dir) => Config::new(dir),
        None => Config::from_env()?,
    };
    config.app_path = matches.value_of("app").map(PathBuf::from);
    let scale = matches.value_of("scale").unwrap_or("1.0");
    config.scale = scale.parse().map_err(|_| FontSwapError::InvalidArgument {
        msg: format!("scale factor '{}' is not a number", scale),
    })?;
    config.signature = matches
        .value_of("signature")
        .map(str::parse::<SignaturePolicy>)
        .transpose()?;
    config.dry_run = matches.is_present("dry-run");
    Ok(config)
}

fn ask_signature_policy() -> SignaturePolicy {
    if !io::stdin().is_terminal() {
        log::info!("Not running interactively, re-signing ad-hoc");
        return SignaturePolicy::AdHoc;
    }
    println!("Ableton Live is code-signed, and the new fonts invalidate the signature.");
    println!("  [a] re-sign it ad-hoc (recommended)");
    println!("  [s] strip the signature");
    println!("  [k] keep the signature as it is");
    let stdin = io::stdin();
    loop {
        print!("Choice [a/s/k]: ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => return SignaturePolicy::AdHoc,
            Ok(_) => {}
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "" | "a" => return SignaturePolicy::AdHoc,
            "s" => return SignaturePolicy::Strip,
            "k" => return SignaturePolicy::Skip,
            other => match other.parse() {
                Ok(policy) => return policy,
                Err(_) => println!("Please answer a, s or k."),
            },
        }
    }
}

fn print_list(orchestrator: &Orchestrator) {
    let records = orchestrator.list();
    if records.is_empty() {
        println!("No backups in {}", orchestrator.store().root().display());
        return;
    }
    let latest = orchestrator
        .store()
        .catalog()
        .ok()
        .and_then(|c| c.latest().map(|r| r.id.clone()));
    for record in &records {
        let marker = if latest.as_deref() == Some(record.id.as_str()) {
            " (latest)"
        } else {
            ""
        };
        println!(
            "{}  {}  {}{}",
            record.id,
            record.timestamp_display(),
            record.app_path_display(),
            marker
        );
    }
}

fn print_install(outcome: &InstallOutcome, dry_run: bool) {
    if dry_run {
        println!(
            "Dry run: would install {} fonts into {}",
            outcome.prepared.len(),
            outcome.app_path.display()
        );
        return;
    }
    if let Some(snapshot) = &outcome.snapshot {
        println!("Backed up the original fonts as {}", snapshot.id);
    }
    println!(
        "Installed {} fonts into {}. Restart Live to see them.",
        outcome.installed.len(),
        outcome.app_path.display()
    );
}

fn print_restore(report: &RestoreReport, dry_run: bool) {
    if dry_run {
        println!(
            "Dry run: would restore {} fonts from backup {} into {}",
            report.restored.len(),
            report.id,
            report.app_path.display()
        );
        return;
    }
    println!(
        "Restored {} fonts from backup {} into {}",
        report.restored.len(),
        report.id,
        report.app_path.display()
    );
    for missing in &report.missing {
        println!("  {} was not in the backup and was left alone", missing);
    }
}

fn run(matches: &ArgMatches) -> Result<(), FontSwapError> {
    let config = config_from(matches)?;
    let dry_run = config.dry_run;
    let system = MacSystem::new();
    let downloader = HttpDownloader::new()?;
    let orchestrator = Orchestrator::new(config, &system, &downloader).with_prompt(ask_signature_policy);

    if matches.is_present("list") {
        print_list(&orchestrator);
        return Ok(());
    }
    if matches.is_present("revert") || matches.is_present("restore-id") {
        let report = orchestrator.revert(matches.value_of("restore-id"))?;
        print_restore(&report, dry_run);
        return Ok(());
    }

    let source = match matches.value_of("custom") {
        Some(path) => GlyphSource::Custom(PathBuf::from(path)),
        None => GlyphSource::Download,
    };
    let scratch = orchestrator.scratch_handle();
    ctrlc::set_handler(move || {
        if let Ok(mut current) = scratch.lock() {
            if let Some(dir) = current.take() {
                let _ = fs::remove_dir_all(&dir);
            }
        }
        eprintln!("Interrupted");
        process::exit(130);
    })
    .map_err(|e| FontSwapError::Environment {
        msg: format!("Could not install the interrupt handler: {}", e),
    })?;
    let outcome = orchestrator.install(&source)?;
    print_install(&outcome, dry_run);
    Ok(())
}

fn main() {
    let matches = read_args();
    env_logger::init_from_env(env_logger::Env::default().filter_or(
        env_logger::DEFAULT_FILTER_ENV,
        if matches.is_present("verbose") {
            "debug"
        } else {
            "info"
        },
    ));
    if let Err(e) = run(&matches) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
