//! Application use cases and transactions.

mod user;

pub use user::{
    db_initialize, user_change_email, user_create, user_delete, user_get, user_list,
    user_list_page, user_search, EmailChangeOutcome, UserCreateOutcome, UserCreateReq, UserDto,
    UserEmailChangeReq, UserPageReq,
};
