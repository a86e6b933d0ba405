use super::*;

fn ids(groups: &[Resource]) -> Vec<&str> {
    groups.iter().map(|group| group.id.as_str()).collect()
}

#[test]
fn demo_data_lists_groups_in_creation_order() {
    let directory = Directory::with_demo_data();

    assert_eq!(
        directory.list_groups(),
        vec![Resource::new("1", "admins"), Resource::new("2", "ops")]
    );
    assert_eq!(directory.list_users().len(), 2);
}

#[test]
fn add_user_to_group_updates_both_sides() {
    let mut directory = Directory::with_demo_data();
    let user = UserId::from("charles");
    let group = GroupId::from("2");

    let summary = directory.add_user_to_group(&group, &user).expect("add");

    assert_eq!(summary.users, vec![user.clone()]);
    assert_eq!(ids(&directory.user_groups(&user).expect("groups")), vec!["2"]);
    assert_eq!(directory.user(&user).expect("user").groups, vec![group]);
}

#[test]
fn add_user_to_group_is_idempotent() {
    let mut directory = Directory::with_demo_data();
    let user = UserId::from("charles");
    let group = GroupId::from("1");

    directory.add_user_to_group(&group, &user).expect("first");
    let summary = directory.add_user_to_group(&group, &user).expect("second");

    assert_eq!(summary.users.len(), 1);
    assert_eq!(directory.user_groups(&user).expect("groups").len(), 1);
}

#[test]
fn unknown_group_or_user_is_not_found() {
    let mut directory = Directory::with_demo_data();

    let err = directory
        .add_user_to_group(&GroupId::from("99"), &UserId::from("charles"))
        .expect_err("unknown group");
    assert_eq!(err.code, ErrorCode::NotFound);

    let err = directory
        .add_user_to_group(&GroupId::from("1"), &UserId::from("nobody"))
        .expect_err("unknown user");
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[test]
fn remove_user_from_group_requires_membership() {
    let mut directory = Directory::with_demo_data();
    let user = UserId::from("freddy");
    let group = GroupId::from("1");

    let err = directory
        .remove_user_from_group(&group, &user)
        .expect_err("not a member");
    assert_eq!(err.code, ErrorCode::NotFound);

    directory.add_user_to_group(&group, &user).expect("add");
    let summary = directory.remove_user_from_group(&group, &user).expect("remove");

    assert!(summary.users.is_empty());
    assert!(directory.user_groups(&user).expect("groups").is_empty());
}

#[test]
fn add_user_policy_stores_parsed_document() {
    let mut directory = Directory::with_demo_data();
    let user = UserId::from("charles");

    let policy = directory
        .add_user_policy(
            &user,
            "myserver",
            r#"{"Version": "2012-10-17", "Statement": []}"#,
        )
        .expect("policy");

    assert_eq!(policy.id, PolicyId::from("1"));
    assert_eq!(policy.policy["Version"], "2012-10-17");
    assert_eq!(directory.user_policies(&user).expect("list").len(), 1);
}

#[test]
fn add_user_policy_validates_input() {
    let mut directory = Directory::with_demo_data();
    let user = UserId::from("charles");

    let cases = [
        ("", "{}"),
        ("   ", "{}"),
        ("ok", "not json"),
        ("ok", "[1, 2]"),
    ];
    for (name, body) in cases {
        let err = directory
            .add_user_policy(&user, name, body)
            .expect_err("invalid policy");
        assert_eq!(err.code, ErrorCode::Validation, "{name:?} {body:?}");
    }

    let long_name = "x".repeat(MAX_POLICY_NAME_LEN + 1);
    let err = directory
        .add_user_policy(&user, &long_name, "{}")
        .expect_err("name too long");
    assert_eq!(err.code, ErrorCode::Validation);
}

#[test]
fn duplicate_policy_name_conflicts() {
    let mut directory = Directory::with_demo_data();
    let user = UserId::from("charles");

    directory
        .add_user_policy(&user, "myserver", "{}")
        .expect("first");
    let err = directory
        .add_user_policy(&user, "myserver", "{}")
        .expect_err("duplicate");

    assert_eq!(err.code, ErrorCode::Conflict);
    directory
        .add_user_policy(&UserId::from("freddy"), "myserver", "{}")
        .expect("other user may reuse the name");
}
