use std::{fs, path::PathBuf};

use rand::{SeedableRng, rngs::StdRng};
use rollcall::{
    Config, InternalError, Student,
    commands::make_groups,
    groups::{self, parse_exclusions, parse_group_size, render_groups},
    roster::{load_cached_students, save_cached_students},
};
use uuid::Uuid;

fn temp_root() -> PathBuf {
    let root = std::env::temp_dir().join(format!("rollcall-groups-{}", Uuid::new_v4()));
    fs::create_dir_all(&root).expect("create temp root");
    root
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|name| name.to_string()).collect()
}

fn students(list: &[&str]) -> Vec<Student> {
    list.iter()
        .enumerate()
        .map(|(i, name)| Student {
            id:    (i + 1).to_string(),
            name:  name.to_string(),
            email: format!("{}@x", name.to_lowercase()),
        })
        .collect()
}

#[test]
fn excluded_student_is_left_out_of_groups_of_three() {
    let roster = names(&["A", "B", "C", "D", "E", "F", "G"]);
    let mut rng = StdRng::seed_from_u64(3);

    let groups = groups::make_groups(roster, &names(&["B"]), 3, &mut rng).expect("groups");

    assert_eq!(groups.len(), 2);
    assert!(groups.iter().all(|group| group.len() == 3));

    let mut everyone: Vec<String> = groups.concat();
    everyone.sort();
    assert_eq!(everyone, names(&["A", "C", "D", "E", "F", "G"]));

    let rendered = render_groups(&groups);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|line| line.split(" - ").count() == 3));
}

#[test]
fn unknown_exclusions_are_ignored() {
    let mut rng = StdRng::seed_from_u64(0);
    let groups = groups::make_groups(names(&["A", "B", "C"]), &names(&["Zed"]), 2, &mut rng)
        .expect("groups");

    assert_eq!(groups.iter().map(Vec::len).collect::<Vec<_>>(), vec![2, 1]);
}

#[test]
fn group_size_must_be_a_positive_integer() {
    assert_eq!(parse_group_size("2").expect("valid"), 2);
    assert_eq!(parse_group_size(" 4 ").expect("valid"), 4);

    for bad in ["0", "-1", "two", "2.5", ""] {
        assert!(
            matches!(parse_group_size(bad), Err(InternalError::InvalidArgument(_))),
            "{bad:?} should be rejected"
        );
    }
}

#[test]
fn exclusions_split_on_commas() {
    assert_eq!(
        parse_exclusions(&["Ada Lovelace,Alan Turing", " Grace Hopper ", ""]),
        names(&["Ada Lovelace", "Alan Turing", "Grace Hopper"])
    );
}

#[test]
fn groups_render_one_per_line() {
    let groups = vec![names(&["A", "B"]), names(&["C"])];
    assert_eq!(render_groups(&groups), "A - B\nC");
}

#[tokio::test]
async fn make_groups_reads_the_roster_cache() {
    let root = temp_root();
    let config = Config::builder()
        .roster_path(root.join("students.json"))
        .build();
    save_cached_students(
        config.roster_path(),
        &students(&["A", "B", "C", "D", "E", "F", "G"]),
    )
    .await
    .expect("cache roster");

    let output = make_groups(&config, "3", &["B"], &mut StdRng::seed_from_u64(11))
        .await
        .expect("groups");

    assert_eq!(output.lines().count(), 2);
    assert!(!output.split(['\n', ' ', '-']).any(|name| name == "B"));

    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn roster_cache_replaces_previous_contents() {
    let root = temp_root();
    let path = root.join("nested").join("students.json");

    save_cached_students(&path, &students(&["A", "B", "C"]))
        .await
        .expect("first save");
    save_cached_students(&path, &students(&["D"]))
        .await
        .expect("second save");

    let cached = load_cached_students(&path).await.expect("load");
    assert_eq!(cached, students(&["D"]));
    assert!(!root.join("nested").join("students.json.tmp").exists());

    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn failed_cache_replace_leaves_no_temp_file() {
    let root = temp_root();
    let path = root.join("students.json");
    // A non-empty directory in the way makes the final rename fail.
    fs::create_dir_all(path.join("occupied")).expect("block cache path");

    save_cached_students(&path, &students(&["A"]))
        .await
        .expect_err("cannot replace a directory");

    assert!(!root.join("students.json.tmp").exists());
    assert!(path.is_dir());

    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn roster_cache_accepts_gid_key() {
    let root = temp_root();
    let path = root.join("students.json");
    fs::write(
        &path,
        r#"[{ "gid": "120", "name": "Ada Lovelace", "email": "ada@x" }]"#,
    )
    .expect("write cache");

    let cached = load_cached_students(&path).await.expect("load");
    assert_eq!(cached[0].id, "120");

    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn corrupt_roster_cache_is_data_unavailable() {
    let root = temp_root();
    let path = root.join("students.json");
    fs::write(&path, "{ not json").expect("write cache");

    let err = load_cached_students(&path).await.expect_err("corrupt cache");
    assert!(matches!(err, InternalError::DataUnavailable { .. }));

    let _ = fs::remove_dir_all(root);
}
