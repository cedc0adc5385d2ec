//! Command line surface: argument parsing and dispatch.

pub mod user;

use crate::app::UserDto;
use crate::error::AppError;
use crate::infra::{open_db, DbConfig, DbPool};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

pub use user::{
    ChangeEmailArgs, CreateUserArgs, DeleteUserArgs, GetUserArgs, PaginateArgs, SearchUserArgs,
};

#[derive(Debug, Parser)]
#[command(name = "usercli", about = "User Management CLI", version)]
pub struct Cli {
    /// SQLite database file. Defaults to the platform data directory.
    #[arg(long, global = true, env = "USERCLI_DATABASE", value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Print users as JSON lines instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn db_config(&self) -> DbConfig {
        DbConfig::resolve(self.database.clone())
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Drop all tables and recreate them with a default user
    Initialize,
    /// Get a single user by exact username
    GetUser(GetUserArgs),
    /// Get all users in the database
    GetAllUsers,
    /// Search users by partial match of username OR email
    SearchUser(SearchUserArgs),
    /// Get users using pagination (limit & offset)
    GetUsersPaginated(PaginateArgs),
    /// Change a user's email address
    ChangeEmail(ChangeEmailArgs),
    /// Create a new user
    CreateUser(CreateUserArgs),
    /// Delete a user by username
    DeleteUser(DeleteUserArgs),
}

/// Writes command results either as text or as JSON lines.
pub struct Printer<W: Write> {
    out: W,
    json: bool,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self { out, json }
    }

    pub fn user(&mut self, user: &UserDto) -> Result<(), AppError> {
        if self.json {
            serde_json::to_writer(&mut self.out, user)?;
            writeln!(self.out)?;
        } else {
            writeln!(self.out, "{user}")?;
        }
        Ok(())
    }

    pub fn users(&mut self, users: &[UserDto]) -> Result<(), AppError> {
        for user in users {
            self.user(user)?;
        }
        Ok(())
    }

    pub fn message(&mut self, text: &str) -> Result<(), AppError> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Flush buffered output and hand the writer back.
    pub fn finish(mut self) -> Result<W, AppError> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Run one command against an already open store.
pub fn dispatch<W: Write>(
    pool: &DbPool,
    command: Command,
    printer: &mut Printer<W>,
) -> Result<(), AppError> {
    match command {
        Command::Initialize => user::cmd_initialize(pool, printer),
        Command::GetUser(args) => user::cmd_user_get(pool, args, printer),
        Command::GetAllUsers => user::cmd_user_list(pool, printer),
        Command::SearchUser(args) => user::cmd_user_search(pool, args, printer),
        Command::GetUsersPaginated(args) => user::cmd_user_list_page(pool, args, printer),
        Command::ChangeEmail(args) => user::cmd_user_change_email(pool, args, printer),
        Command::CreateUser(args) => user::cmd_user_create(pool, args, printer),
        Command::DeleteUser(args) => user::cmd_user_delete(pool, args, printer),
    }
}

/// Open the configured store, run the command, and release the connection.
pub fn execute<W: Write>(
    config: &DbConfig,
    command: Command,
    printer: &mut Printer<W>,
) -> Result<(), AppError> {
    let pool = open_db(config)?;
    dispatch(&pool, command, printer)
}
