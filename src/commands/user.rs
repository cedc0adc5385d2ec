use crate::app::{
    db_initialize, user_change_email, user_create, user_delete, user_get, user_list,
    user_list_page, user_search, EmailChangeOutcome, UserCreateOutcome, UserCreateReq,
    UserEmailChangeReq, UserPageReq,
};
use crate::commands::Printer;
use crate::error::AppError;
use crate::infra::DbPool;
use clap::Args;
use std::io::Write;

#[derive(Debug, Clone, Args)]
pub struct GetUserArgs {
    /// Username to search for
    pub username: String,
}

#[derive(Debug, Clone, Args)]
pub struct SearchUserArgs {
    /// Partial username or email to search
    pub query: String,
}

#[derive(Debug, Clone, Args)]
pub struct PaginateArgs {
    /// Number of users to return
    #[arg(default_value_t = 10)]
    pub limit: u32,
    /// Number of users to skip
    #[arg(default_value_t = 0)]
    pub offset: u32,
}

#[derive(Debug, Clone, Args)]
pub struct ChangeEmailArgs {
    /// Username to update
    pub username: String,
    /// New email address
    pub new_email: String,
}

#[derive(Debug, Clone, Args)]
pub struct CreateUserArgs {
    /// New user's username
    pub username: String,
    /// New user's email
    pub email: String,
    /// New user's password
    pub password: String,
}

#[derive(Debug, Clone, Args)]
pub struct DeleteUserArgs {
    /// Username of user to delete
    pub username: String,
}

pub fn cmd_initialize<W: Write>(pool: &DbPool, out: &mut Printer<W>) -> Result<(), AppError> {
    db_initialize(pool)?;
    out.message("Database Initialized")
}

pub fn cmd_user_get<W: Write>(
    pool: &DbPool,
    args: GetUserArgs,
    out: &mut Printer<W>,
) -> Result<(), AppError> {
    match user_get(pool, &args.username)? {
        Some(user) => out.user(&user),
        None => out.message(&format!("{} not found!", args.username)),
    }
}

pub fn cmd_user_list<W: Write>(pool: &DbPool, out: &mut Printer<W>) -> Result<(), AppError> {
    out.users(&user_list(pool)?)
}

pub fn cmd_user_search<W: Write>(
    pool: &DbPool,
    args: SearchUserArgs,
    out: &mut Printer<W>,
) -> Result<(), AppError> {
    let users = user_search(pool, &args.query)?;
    if users.is_empty() {
        return out.message("No matching users found.");
    }
    out.users(&users)
}

pub fn cmd_user_list_page<W: Write>(
    pool: &DbPool,
    args: PaginateArgs,
    out: &mut Printer<W>,
) -> Result<(), AppError> {
    let users = user_list_page(
        pool,
        UserPageReq {
            limit: args.limit,
            offset: args.offset,
        },
    )?;
    if users.is_empty() {
        return out.message("No users found for given range.");
    }
    out.users(&users)
}

pub fn cmd_user_change_email<W: Write>(
    pool: &DbPool,
    args: ChangeEmailArgs,
    out: &mut Printer<W>,
) -> Result<(), AppError> {
    let req = UserEmailChangeReq {
        username: args.username,
        new_email: args.new_email,
    };
    let username = req.username.clone();
    match user_change_email(pool, req)? {
        EmailChangeOutcome::Updated(user) => out.message(&format!(
            "Updated {}'s email to {}",
            user.username, user.email
        )),
        EmailChangeOutcome::NotFound => {
            out.message(&format!("{username} not found! Unable to update email."))
        }
        EmailChangeOutcome::Taken => out.message("Email already taken!"),
    }
}

pub fn cmd_user_create<W: Write>(
    pool: &DbPool,
    args: CreateUserArgs,
    out: &mut Printer<W>,
) -> Result<(), AppError> {
    let req = UserCreateReq {
        username: args.username,
        email: args.email,
        password: args.password,
    };
    match user_create(pool, req)? {
        UserCreateOutcome::Created(user) => out.user(&user),
        UserCreateOutcome::Taken => out.message("Username or email already taken!"),
    }
}

pub fn cmd_user_delete<W: Write>(
    pool: &DbPool,
    args: DeleteUserArgs,
    out: &mut Printer<W>,
) -> Result<(), AppError> {
    match user_delete(pool, &args.username)? {
        Some(_) => out.message(&format!("{} deleted", args.username)),
        None => out.message(&format!(
            "{} not found! Unable to delete user.",
            args.username
        )),
    }
}
