//! User CRUD integration tests

use app_lib::app::{
    db_initialize, user_change_email, user_create, user_delete, user_get, user_list,
    user_list_page, user_search, EmailChangeOutcome, UserCreateOutcome, UserCreateReq, UserDto,
    UserEmailChangeReq, UserPageReq,
};
use app_lib::infra::{init_test_db, DbPool};

// ──────────────────────── Helper ────────────────────────

fn make_create_req(name: &str) -> UserCreateReq {
    UserCreateReq {
        username: name.to_string(),
        email: format!("{}@test.com", name.to_lowercase()),
        password: format!("{}pass", name.to_lowercase()),
    }
}

fn create(pool: &DbPool, name: &str) -> UserDto {
    match user_create(pool, make_create_req(name)).unwrap() {
        UserCreateOutcome::Created(user) => user,
        UserCreateOutcome::Taken => panic!("{name} unexpectedly taken"),
    }
}

fn usernames(users: &[UserDto]) -> Vec<&str> {
    users.iter().map(|u| u.username.as_str()).collect()
}

// ══════════════════════════════════════════════════════════
//  db_initialize
// ══════════════════════════════════════════════════════════

#[test]
fn initialize_seeds_single_default_user() {
    let pool = init_test_db();
    let seed = db_initialize(&pool).unwrap();
    assert_eq!(seed.username, "bob");

    let all = user_list(&pool).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].username, "bob");
    assert_eq!(all[0].email, "bob@mail.com");
    assert_eq!(all[0].password, "bobpass");
}

#[test]
fn initialize_wipes_existing_rows() {
    let pool = init_test_db();
    create(&pool, "alice");
    create(&pool, "carol");
    db_initialize(&pool).unwrap();

    let all = user_list(&pool).unwrap();
    assert_eq!(usernames(&all), vec!["bob"]);
    assert_eq!(all[0].id, 1);
}

#[test]
fn initialize_twice_still_leaves_one_user() {
    let pool = init_test_db();
    db_initialize(&pool).unwrap();
    db_initialize(&pool).unwrap();
    assert_eq!(user_list(&pool).unwrap().len(), 1);
}

// ══════════════════════════════════════════════════════════
//  user_create / user_get
// ══════════════════════════════════════════════════════════

#[test]
fn create_then_get_returns_same_fields() {
    let pool = init_test_db();
    let created = create(&pool, "alice");
    assert!(created.id > 0);

    let fetched = user_get(&pool, "alice").unwrap().unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.email, "alice@test.com");
    assert_eq!(fetched.password, "alicepass");
}

#[test]
fn create_duplicate_username_is_taken() {
    let pool = init_test_db();
    create(&pool, "alice");
    let outcome = user_create(
        &pool,
        UserCreateReq {
            username: "alice".to_string(),
            email: "other@test.com".to_string(),
            password: "x".to_string(),
        },
    )
    .unwrap();
    assert_eq!(outcome, UserCreateOutcome::Taken);

    let all = user_list(&pool).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].email, "alice@test.com");
}

#[test]
fn create_duplicate_email_is_taken() {
    let pool = init_test_db();
    create(&pool, "alice");
    let outcome = user_create(
        &pool,
        UserCreateReq {
            username: "alicia".to_string(),
            email: "alice@test.com".to_string(),
            password: "x".to_string(),
        },
    )
    .unwrap();
    assert_eq!(outcome, UserCreateOutcome::Taken);
    assert!(user_get(&pool, "alicia").unwrap().is_none());
}

#[test]
fn create_after_conflict_still_works() {
    let pool = init_test_db();
    create(&pool, "alice");
    let _ = user_create(&pool, make_create_req("alice")).unwrap();
    let dave = create(&pool, "dave");
    assert_eq!(user_get(&pool, "dave").unwrap(), Some(dave));
}

#[test]
fn create_accepts_empty_strings_verbatim() {
    let pool = init_test_db();
    let outcome = user_create(
        &pool,
        UserCreateReq {
            username: String::new(),
            email: "e@x".to_string(),
            password: "p".to_string(),
        },
    )
    .unwrap();
    let UserCreateOutcome::Created(created) = outcome else {
        panic!("empty username should be stored");
    };
    assert_eq!(created.username, "");
    assert_eq!(user_get(&pool, "").unwrap(), Some(created));

    let spaced = create(&pool, "  padded  ");
    assert_eq!(spaced.username, "  padded  ");
}

#[test]
fn get_is_case_sensitive() {
    let pool = init_test_db();
    create(&pool, "Alice");
    assert!(user_get(&pool, "alice").unwrap().is_none());
    assert!(user_get(&pool, "Alice").unwrap().is_some());
}

#[test]
fn get_missing_user_is_none() {
    let pool = init_test_db();
    assert!(user_get(&pool, "ghost").unwrap().is_none());
}

// ══════════════════════════════════════════════════════════
//  user_list
// ══════════════════════════════════════════════════════════

#[test]
fn list_empty_store() {
    let pool = init_test_db();
    assert!(user_list(&pool).unwrap().is_empty());
}

#[test]
fn list_returns_insertion_order() {
    let pool = init_test_db();
    create(&pool, "charlie");
    create(&pool, "alice");
    create(&pool, "bob");
    let all = user_list(&pool).unwrap();
    assert_eq!(usernames(&all), vec!["charlie", "alice", "bob"]);
}

// ══════════════════════════════════════════════════════════
//  user_search
// ══════════════════════════════════════════════════════════

#[test]
fn search_matches_username_or_email() {
    let pool = init_test_db();
    for (u, e) in [("alice", "a@x.com"), ("bob", "b@x.com")] {
        user_create(
            &pool,
            UserCreateReq {
                username: u.to_string(),
                email: e.to_string(),
                password: "p".to_string(),
            },
        )
        .unwrap();
    }
    let found = user_search(&pool, "a").unwrap();
    assert_eq!(usernames(&found), vec!["alice"]);

    let found = user_search(&pool, "X.COM").unwrap();
    assert_eq!(usernames(&found), vec!["alice", "bob"]);

    let found = user_search(&pool, "b@").unwrap();
    assert_eq!(usernames(&found), vec!["bob"]);
}

#[test]
fn search_is_case_insensitive() {
    let pool = init_test_db();
    create(&pool, "Alice");
    let found = user_search(&pool, "ALI").unwrap();
    assert_eq!(usernames(&found), vec!["Alice"]);
}

#[test]
fn search_no_match_is_empty() {
    let pool = init_test_db();
    create(&pool, "alice");
    assert!(user_search(&pool, "zzz").unwrap().is_empty());
}

#[test]
fn search_treats_wildcards_literally() {
    let pool = init_test_db();
    create(&pool, "alice");
    user_create(
        &pool,
        UserCreateReq {
            username: "a_b".to_string(),
            email: "ab@test.com".to_string(),
            password: "p".to_string(),
        },
    )
    .unwrap();
    assert_eq!(usernames(&user_search(&pool, "_").unwrap()), vec!["a_b"]);
    assert!(user_search(&pool, "%").unwrap().is_empty());
}

// ══════════════════════════════════════════════════════════
//  user_list_page
// ══════════════════════════════════════════════════════════

#[test]
fn page_skips_offset_then_takes_limit() {
    let pool = init_test_db();
    for name in ["u0", "u1", "u2", "u3", "u4"] {
        create(&pool, name);
    }
    let page = user_list_page(&pool, UserPageReq { limit: 2, offset: 1 }).unwrap();
    assert_eq!(usernames(&page), vec!["u1", "u2"]);
}

#[test]
fn page_defaults_to_first_ten() {
    let pool = init_test_db();
    for i in 0..12 {
        create(&pool, &format!("user{i}"));
    }
    let page = user_list_page(&pool, UserPageReq::default()).unwrap();
    assert_eq!(page.len(), 10);
    assert_eq!(page[0].username, "user0");
}

#[test]
fn page_past_end_is_empty() {
    let pool = init_test_db();
    create(&pool, "alice");
    let page = user_list_page(&pool, UserPageReq { limit: 5, offset: 1 }).unwrap();
    assert!(page.is_empty());
}

#[test]
fn page_zero_limit_is_empty() {
    let pool = init_test_db();
    create(&pool, "alice");
    let page = user_list_page(&pool, UserPageReq { limit: 0, offset: 0 }).unwrap();
    assert!(page.is_empty());
}

// ══════════════════════════════════════════════════════════
//  user_change_email
// ══════════════════════════════════════════════════════════

#[test]
fn change_email_updates_only_email() {
    let pool = init_test_db();
    let before = create(&pool, "alice");
    let outcome = user_change_email(
        &pool,
        UserEmailChangeReq {
            username: "alice".to_string(),
            new_email: "new@test.com".to_string(),
        },
    )
    .unwrap();
    let EmailChangeOutcome::Updated(updated) = outcome else {
        panic!("expected email update");
    };
    assert_eq!(updated.email, "new@test.com");

    let after = user_get(&pool, "alice").unwrap().unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.username, before.username);
    assert_eq!(after.password, before.password);
    assert_eq!(after.email, "new@test.com");
}

#[test]
fn change_email_missing_user_is_not_found() {
    let pool = init_test_db();
    create(&pool, "alice");
    let outcome = user_change_email(
        &pool,
        UserEmailChangeReq {
            username: "ghost".to_string(),
            new_email: "new@test.com".to_string(),
        },
    )
    .unwrap();
    assert_eq!(outcome, EmailChangeOutcome::NotFound);
    assert_eq!(
        user_get(&pool, "alice").unwrap().unwrap().email,
        "alice@test.com"
    );
}

#[test]
fn change_email_missing_user_with_empty_email_is_not_found() {
    let pool = init_test_db();
    let outcome = user_change_email(
        &pool,
        UserEmailChangeReq {
            username: "ghost".to_string(),
            new_email: String::new(),
        },
    )
    .unwrap();
    assert_eq!(outcome, EmailChangeOutcome::NotFound);
}

#[test]
fn change_email_to_existing_email_is_taken() {
    let pool = init_test_db();
    create(&pool, "alice");
    create(&pool, "dave");
    let outcome = user_change_email(
        &pool,
        UserEmailChangeReq {
            username: "dave".to_string(),
            new_email: "alice@test.com".to_string(),
        },
    )
    .unwrap();
    assert_eq!(outcome, EmailChangeOutcome::Taken);
    assert_eq!(
        user_get(&pool, "dave").unwrap().unwrap().email,
        "dave@test.com"
    );
}

// ══════════════════════════════════════════════════════════
//  user_delete
// ══════════════════════════════════════════════════════════

#[test]
fn delete_removes_row() {
    let pool = init_test_db();
    let alice = create(&pool, "alice");
    create(&pool, "dave");
    let removed = user_delete(&pool, "alice").unwrap();
    assert_eq!(removed, Some(alice));
    assert!(user_get(&pool, "alice").unwrap().is_none());
    assert_eq!(usernames(&user_list(&pool).unwrap()), vec!["dave"]);
}

#[test]
fn delete_missing_user_changes_nothing() {
    let pool = init_test_db();
    create(&pool, "alice");
    assert!(user_delete(&pool, "ghost").unwrap().is_none());
    assert_eq!(user_list(&pool).unwrap().len(), 1);
}
