//! Check runs against indexes served over HTTP

mod helper;

use helper::{create_index_server, create_sources, create_travis_yml};
use travis_rubies::update::check;
use travis_rubies::version::catalog::Catalog;
use travis_rubies::version::key::VersionKey;
use travis_rubies::version::resolver::UpdateOptions;

#[tokio::test]
async fn catalog_merges_travis_and_rvm_indexes() {
    let server = create_index_server(
        &["ruby-2.3.4", "ruby-2.4.1", "ruby-2.4.5"],
        &["ruby-2.4.5", "ruby-2.5.3", "ruby-head"],
    )
    .await;

    let catalog = Catalog::fetch(&create_sources(&server)).await.unwrap();

    assert!(catalog.contains(&VersionKey::parse("2.3.4")));
    assert!(catalog.contains(&VersionKey::parse("ruby-2.5.3")));
    assert!(catalog.contains(&VersionKey::parse("ruby-head")));
    assert!(catalog.contains(&VersionKey::parse("head")));
    // Archive for another platform
    assert!(!catalog.contains(&VersionKey::parse("9.9.9")));
    assert_eq!(catalog.len(), 5);
}

#[tokio::test]
async fn check_lists_suggested_updates() {
    let server = create_index_server(
        &["ruby-2.3.4", "ruby-2.3.8", "ruby-2.4.1", "ruby-2.4.5"],
        &["ruby-2.5.3", "ruby-head"],
    )
    .await;
    let catalog = Catalog::fetch(&create_sources(&server)).await.unwrap();
    let (_temp_dir, path) = create_travis_yml("language: ruby\nrvm:\n  - 2.3.4\n  - 2.4.1\n");

    let report = check(&path, &catalog, &UpdateOptions::default()).unwrap();

    assert_eq!(
        report.lines(),
        vec![
            "rvm:".to_string(),
            "  2.3.4 -> 2.3.8".to_string(),
            "  2.4.1 -> 2.4.5, 2.5.3".to_string(),
        ]
    );
}

#[tokio::test]
async fn check_is_clean_for_current_versions() {
    let server = create_index_server(&["ruby-2.4.5"], &["ruby-2.5.3"]).await;
    let catalog = Catalog::fetch(&create_sources(&server)).await.unwrap();
    let (_temp_dir, path) = create_travis_yml("rvm:\n  - 2.4.5\n  - 2.5.3\n");

    let report = check(&path, &catalog, &UpdateOptions::default()).unwrap();

    assert!(report.is_clean());
    assert!(report.lines().is_empty());
}

#[tokio::test]
async fn check_reports_warnings_before_suggestions() {
    let server = create_index_server(&["ruby-2.4.1", "ruby-2.4.5"], &[]).await;
    let catalog = Catalog::fetch(&create_sources(&server)).await.unwrap();
    let (_temp_dir, path) = create_travis_yml(
        "rvm:\n  - 2.4.1\nmatrix:\n  exclude:\n    - rvm: 2.3.4\n      env: A=1\n",
    );

    let report = check(&path, &catalog, &UpdateOptions::default()).unwrap();

    assert_eq!(
        report.lines(),
        vec![
            "2.3.4 in matrix.exclude is not in rvm list".to_string(),
            "rvm:".to_string(),
            "  2.4.1 -> 2.4.5".to_string(),
            "exclude:".to_string(),
            "  2.3.4 -> 2.4.5".to_string(),
        ]
    );
}
