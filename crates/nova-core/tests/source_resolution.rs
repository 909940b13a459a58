use tempfile::TempDir;

use nova_core::source::{MarketplaceSource, parse_source};

#[test]
fn file_working_dir_resolves_relative_to_its_parent() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().canonicalize().unwrap();
    std::fs::create_dir_all(root.join("market")).unwrap();
    let file = root.join("notes.txt");
    std::fs::write(&file, "").unwrap();

    let source = parse_source("./market", Some(&file)).unwrap();

    assert_eq!(source, MarketplaceSource::local(root.join("market")));
}

#[test]
fn parent_segments_are_normalized() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().canonicalize().unwrap();
    std::fs::create_dir_all(root.join("a").join("b")).unwrap();
    std::fs::create_dir_all(root.join("c")).unwrap();

    let source = parse_source("../../c", Some(&root.join("a").join("b"))).unwrap();

    assert_eq!(source.as_local_path(), Some(root.join("c").as_path()));
}

#[test]
fn same_input_parses_to_equal_sources() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("m")).unwrap();

    for raw in ["acme/tools", "https://example.com/x.git", "./m"] {
        let first = parse_source(raw, Some(temp.path())).unwrap();
        let second = parse_source(&format!("  {raw}  "), Some(temp.path())).unwrap();
        assert_eq!(first, second, "input {raw}");
    }
}

#[test]
fn sources_serialize_with_type_tag() {
    let github = serde_yaml::to_string(&MarketplaceSource::github("acme/tools")).unwrap();
    let git = serde_yaml::to_string(&MarketplaceSource::git("git@example.com:x.git")).unwrap();

    assert!(github.contains("type: github"));
    assert!(github.contains("repo: acme/tools"));
    assert!(git.contains("type: git"));

    let parsed: MarketplaceSource =
        serde_yaml::from_str("type: local\npath: /srv/market\n").unwrap();
    assert_eq!(parsed, MarketplaceSource::local("/srv/market"));
}

#[test]
fn display_includes_kind() {
    assert_eq!(
        MarketplaceSource::github("acme/tools").to_string(),
        "acme/tools (github)"
    );
    assert_eq!(
        MarketplaceSource::git("https://example.com/x.git").to_string(),
        "https://example.com/x.git (git)"
    );
}

#[test]
fn invalid_sources_report_input() {
    let temp = TempDir::new().unwrap();

    let err = parse_source("./does-not-exist", Some(temp.path())).unwrap_err();

    assert_eq!(err.input, "./does-not-exist");
    assert!(err.message.contains("does not exist"));
}
