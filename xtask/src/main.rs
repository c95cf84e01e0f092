// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! Wraps the cargo invocations used locally and in CI so both run the same
//! checks with the same flags.
//!
//! ### Commands
//!
//! - `cargo xtask ci` runs lint, build, test, and schema verification
//! - `cargo xtask verify-schema` applies the `SQLite` migrations to an
//!   in-memory database and checks that the attendance tables, their
//!   uniqueness constraints, and the append-only triggers are present
//!
//! Schema verification needs no external services. The embedded migrations
//! are the same files the persistence crate runs at startup.

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{collections::BTreeSet, io, process::Output};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use diesel::sql_types::{Integer, Text};
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

/// Tables the attendance store cannot run without.
const REQUIRED_TABLES: [&str; 2] = ["attendance_actions", "attendance_records"];

/// Triggers that keep history append-only and records undeletable.
const REQUIRED_TRIGGERS: [&str; 3] = [
    "attendance_actions_no_delete",
    "attendance_actions_no_update",
    "attendance_records_no_delete",
];

/// Unique column sets each table must carry, as `(table, columns)`.
const REQUIRED_UNIQUE: [(&str, &[&str]); 3] = [
    ("attendance_records", &["event_id", "vendor_id"]),
    ("attendance_actions", &["record_id", "sequence"]),
    ("attendance_actions", &["record_id", "request_id"]),
];

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test, schema)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Lint formatting, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation for errors and warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check for formatting issues in the project
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Fix clippy warnings in the project
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run tests
    #[command(visible_alias = "t")]
    Test,

    /// Run doc tests
    #[command(visible_alias = "td")]
    TestDocs,

    /// Run lib tests
    #[command(visible_alias = "tl")]
    TestLibs,

    /// Apply migrations to a scratch database and verify the schema
    #[command(visible_alias = "vs")]
    VerifySchema,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::FixClippy => fix_clippy(),
            Self::FixFormatting => fix_format(),
            Self::Test => test(),
            Self::TestDocs => test_docs(),
            Self::TestLibs => test_libs(),
            Self::VerifySchema => verify_schema(),
        }
    }
}

/// Run CI checks (lint, build, test, schema)
fn ci() -> Result<()> {
    lint()?;
    build()?;
    test()?;
    verify_schema()?;
    Ok(())
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Run cargo check
fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Lint formatting, clippy, and docs
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    Ok(())
}

/// Run clippy on the project
fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Fix clippy warnings in the project
fn fix_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--fix",
        "--allow-dirty",
        "--allow-staged",
        "--",
        "-D",
        "warnings",
    ])
}

/// Check that docs build without errors using docs.rs-equivalent flags
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            [
                "doc",
                "--no-deps",
                "--all-features",
                "--package",
                &package.name,
            ],
        )
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .env("RUSTDOCFLAGS", "--cfg docsrs -D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

/// Lint formatting issues in the project
fn lint_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all", "--check"])
}

/// Fix formatting issues in the project
fn fix_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all"])
}

/// Run lib tests, then doc tests
fn test() -> Result<()> {
    test_libs()?;
    test_docs()?; // run last because it's slow
    Ok(())
}

/// Run doc tests for the workspace's default packages
fn test_docs() -> Result<()> {
    run_cargo(vec!["test", "--doc", "--all-features"])
}

/// Run lib tests for the workspace's default packages
fn test_libs() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Run a cargo subcommand with the nightly toolchain
fn run_cargo_nightly(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args)
        // CARGO env var is set because we're running in a cargo subcommand
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

#[derive(QueryableByName)]
struct SchemaObject {
    #[diesel(sql_type = Text)]
    name: String,
}

#[derive(QueryableByName)]
struct IndexInfo {
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Integer)]
    unique: i32,
}

#[derive(QueryableByName)]
struct IndexColumnInfo {
    #[diesel(sql_type = Text)]
    name: String,
}

/// Apply the embedded migrations to an in-memory `SQLite` database and check
/// the resulting schema.
///
/// Fails if any required table, unique constraint, or trigger is missing, if
/// the down migration does not leave an empty schema, or if the append-only
/// triggers do not reject an update.
fn verify_schema() -> Result<()> {
    tracing::info!("Starting schema verification");

    let mut conn: SqliteConnection = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply migrations: {e}"))?;
    tracing::info!("Migrations applied successfully");

    let tables: BTreeSet<String> = schema_objects(&mut conn, "table")?;
    for table in REQUIRED_TABLES {
        if !tables.contains(table) {
            return Err(eyre!("Missing table: {table}"));
        }
    }

    let triggers: BTreeSet<String> = schema_objects(&mut conn, "trigger")?;
    for trigger in REQUIRED_TRIGGERS {
        if !triggers.contains(trigger) {
            return Err(eyre!("Missing trigger: {trigger}"));
        }
    }

    for (table, columns) in REQUIRED_UNIQUE {
        let unique: BTreeSet<Vec<String>> = unique_column_sets(&mut conn, table)?;
        let expected: Vec<String> = columns.iter().map(ToString::to_string).collect();
        if !unique.contains(&expected) {
            return Err(eyre!(
                "Missing unique constraint on {table}({})",
                columns.join(", ")
            ));
        }
    }

    verify_append_only(&mut conn)?;
    verify_rollback(&mut conn)?;

    tracing::info!("✓ Schema verification passed");
    Ok(())
}

/// Names of all schema objects of `kind`, excluding `SQLite` internals.
fn schema_objects(conn: &mut SqliteConnection, kind: &str) -> Result<BTreeSet<String>> {
    let rows: Vec<SchemaObject> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type = ? AND name NOT LIKE 'sqlite_%' \
         AND name != '__diesel_schema_migrations' ORDER BY name",
    )
    .bind::<Text, _>(kind)
    .load(conn)
    .wrap_err(format!("Failed to query {kind} names"))?;

    Ok(rows.into_iter().map(|row| row.name).collect())
}

/// Column lists of every unique index on `table`, in index order.
fn unique_column_sets(
    conn: &mut SqliteConnection,
    table: &str,
) -> Result<BTreeSet<Vec<String>>> {
    let indexes: Vec<IndexInfo> = diesel::sql_query(format!("PRAGMA index_list({table})"))
        .load(conn)
        .wrap_err(format!("Failed to get indexes for table {table}"))?;

    let mut sets: BTreeSet<Vec<String>> = BTreeSet::new();
    for idx in indexes.into_iter().filter(|idx| idx.unique == 1) {
        let columns: Vec<IndexColumnInfo> =
            diesel::sql_query(format!("PRAGMA index_info({})", idx.name))
                .load(conn)
                .wrap_err(format!("Failed to get index columns for {}", idx.name))?;
        sets.insert(columns.into_iter().map(|c| c.name).collect());
    }

    Ok(sets)
}

/// Insert one record and one action, then confirm the triggers refuse to
/// rewrite or remove them.
fn verify_append_only(conn: &mut SqliteConnection) -> Result<()> {
    seed_rows(conn)?;

    let rejected_statements: [&str; 3] = [
        "UPDATE attendance_actions SET notes = 'rewritten'",
        "DELETE FROM attendance_actions",
        "DELETE FROM attendance_records",
    ];
    for statement in rejected_statements {
        if diesel::sql_query(statement).execute(conn).is_ok() {
            return Err(eyre!("Statement was not rejected by a trigger: {statement}"));
        }
        tracing::debug!("Rejected as expected: {statement}");
    }

    tracing::info!("Append-only triggers reject rewrites");
    Ok(())
}

fn seed_rows(conn: &mut SqliteConnection) -> Result<()> {
    diesel::sql_query(
        "INSERT INTO attendance_records \
         (event_id, vendor_id, customer_id, scheduled_start, scheduled_end, \
          created_at, updated_at) \
         VALUES ('verify-event', 'verify-vendor', 'verify-customer', \
          '2026-01-01T10:00:00Z', '2026-01-01T18:00:00Z', \
          '2026-01-01T09:00:00Z', '2026-01-01T09:00:00Z')",
    )
    .execute(conn)
    .wrap_err("Failed to insert verification record")?;

    diesel::sql_query(
        "INSERT INTO attendance_actions \
         (record_id, sequence, request_id, action_type, performed_at, actor_id, \
          actor_role, cause_description, status_before, status_after) \
         SELECT record_id, 1, 'verify-request', 'mark_in', '2026-01-01T10:05:00Z', \
          'verify-vendor', 'vendor', 'schema verification', 'not_started', \
          'mark_in_submitted' \
         FROM attendance_records WHERE event_id = 'verify-event'",
    )
    .execute(conn)
    .wrap_err("Failed to insert verification action")?;

    Ok(())
}

/// Revert every migration and check nothing of ours is left behind.
fn verify_rollback(conn: &mut SqliteConnection) -> Result<()> {
    // The triggers forbid deletes, and the down migration drops the tables
    // outright, so seeded rows do not block it.
    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to revert migrations: {e}"))?;

    let leftover: BTreeSet<String> = schema_objects(conn, "table")?;
    if !leftover.is_empty() {
        return Err(eyre!("Down migration left tables behind: {leftover:?}"));
    }

    tracing::info!("Down migration leaves an empty schema");
    Ok(())
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
