use crate::commands::{open_pool, prepare, CommandResult, StepFailure, EXIT_MIGRATION, EXIT_SEED};
use rentdesk_db::fixtures::SeedCheck;
use rentdesk_db::{migrations, DemoCatalog};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("seed") {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let result: Result<Vec<SeedCheck>, StepFailure> = runtime.block_on(async {
        let pool = open_pool(&config).await?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), EXIT_MIGRATION))?;

        DemoCatalog::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), EXIT_SEED))?;

        let verification = DemoCatalog::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), EXIT_SEED))?;

        pool.close().await;

        if verification.all_passed {
            Ok(verification.checks)
        } else {
            Err(("seed_verification", verification_failure(&verification.checks), EXIT_SEED))
        }
    });

    match result {
        Ok(checks) => CommandResult::success(
            "seed",
            format!("demo catalog ready: {}", summarize(&checks)),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn summarize(checks: &[SeedCheck]) -> String {
    checks
        .iter()
        .map(|check| format!("{}={}", check.table, check.actual))
        .collect::<Vec<_>>()
        .join(", ")
}

fn verification_failure(checks: &[SeedCheck]) -> String {
    let failed = checks
        .iter()
        .filter(|check| !check.passed)
        .map(|check| format!("{} (expected {}, found {})", check.table, check.expected, check.actual))
        .collect::<Vec<_>>();

    if failed.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for: {}", failed.join(", "))
    }
}
