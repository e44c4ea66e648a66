//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `paperhealth_core` linkage without the mobile shell.
//! - Print the demo timeline for every family member.
//! - Write core logs under `PAPERHEALTH_LOG_DIR` when it is set.

use paperhealth_core::fixtures::demo_session;
use paperhealth_core::CoreConfig;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("paperhealth_core ping={}", paperhealth_core::ping());
    println!("paperhealth_core version={}", paperhealth_core::core_version());

    let config = CoreConfig::default();
    if let Ok(log_dir) = std::env::var("PAPERHEALTH_LOG_DIR") {
        if let Err(err) = paperhealth_core::init_logging(config.log_level.as_str(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let mut session = match demo_session(config) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("demo session failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    let people = session
        .members()
        .iter()
        .map(|person| (person.id.clone(), person.name.clone()))
        .collect::<Vec<_>>();
    for (id, name) in people {
        session.set_active_person(&id);
        match session.visible_records() {
            Ok(records) => {
                println!("{name} ({id}): {} record(s)", records.len());
                for record in records {
                    println!("  {} {} {}", record.date_label(), record.doc_type, record.hospital);
                }
            }
            Err(err) => {
                eprintln!("timeline failed for {id}: {err}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
