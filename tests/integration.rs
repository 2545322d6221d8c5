use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_apigen")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn generate(dir: &TempDir) -> assert_cmd::assert::Assert {
    cmd()
        .args(["-i", &fixture_path("inventory.json")])
        .args(["-c", &fixture_path("apigen.toml")])
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("reference.md"))
        .assert()
}

fn read(dir: &TempDir, path: &str) -> String {
    fs::read_to_string(dir.path().join(path)).unwrap_or_else(|e| panic!("{path}: {e}"))
}

// -- page generation --

#[test]
fn writes_one_page_per_entity() {
    let dir = TempDir::new().unwrap();
    generate(&dir).success();

    for page in [
        "api/m.add.md",
        "api/m.sub.md",
        "api/m.Arr.md",
        "api/m.Arr.__init__-shape.md",
        "api/m.Arr.__init__-data.md",
        "api/m.Arr.vindex.md",
        "api/m.Arr.rank.md",
        "api/m.Arr.__repr__.md",
        "api/m.Dim.md",
    ] {
        assert!(dir.path().join(page).is_file(), "missing {page}");
    }
    assert!(!dir.path().join("api/m._helper.md").exists());
    assert!(!dir.path().join("api/m.Arr.__hash__.md").exists());
}

#[test]
fn reexport_has_no_page_of_its_own() {
    let dir = TempDir::new().unwrap();
    generate(&dir).success();
    assert!(!dir.path().join("api/pkg/pkg.add.md").exists());
}

#[test]
fn authored_page_gets_summaries() {
    let dir = TempDir::new().unwrap();
    generate(&dir).success();

    let reference = read(&dir, "reference.md");
    assert!(reference.contains(
        "## Arithmetic\n\n\
* [`add`](api/m.add.md)`(a, b)`: Adds two numbers.\n\
* [`sub`](api/m.sub.md)`(a, b)`: Subtracts two numbers.\n"
    ), "{reference}");
    assert!(reference.contains(
        "* [`vindex`](api/m.Arr.vindex.md)`[sel: Selection]`: Vectorized indexing.\n"
    ), "{reference}");
    assert!(reference.contains(
        "* [`Arr`](api/m.Arr.md): A multi-dimensional array.\n* [`Dim`](api/m.Dim.md): A named dimension.\n"
    ), "{reference}");
    // The re-export links to the first definition.
    assert!(reference.contains("## Re-exports\n\n* [`add`](api/m.add.md)"), "{reference}");
    assert!(!reference.contains("@apigen-group"));
}

#[test]
fn overloads_have_separate_pages() {
    let dir = TempDir::new().unwrap();
    generate(&dir).success();

    let shape = read(&dir, "api/m.Arr.__init__-shape.md");
    assert!(shape.starts_with("# m.Arr.__init__(shape)\n"), "{shape}");
    assert!(shape.contains("m.Arr(shape: List[int])"), "{shape}");
    assert!(shape.contains("Creates an array of the given shape."));

    let data = read(&dir, "api/m.Arr.__init__-data.md");
    assert!(data.contains("m.Arr(data: bytes)"), "{data}");
    assert!(!data.contains("Overload:"));
}

#[test]
fn class_page_lists_member_groups() {
    let dir = TempDir::new().unwrap();
    generate(&dir).success();

    let arr = read(&dir, "api/m.Arr.md");
    let constructors = arr.find("## Constructors").expect("constructors section");
    let indexing = arr.find("## Indexing").expect("indexing section");
    let repr = arr.find("## String representation").expect("repr section");
    assert!(constructors < indexing && indexing < repr, "{arr}");
    assert!(arr.contains("* [`Arr(shape)`](m.Arr.__init__-shape.md)`(shape: List[int])`"), "{arr}");
    assert!(arr.contains("* [`Arr(data)`](m.Arr.__init__-data.md)`(data: bytes)`"), "{arr}");
}

#[test]
fn cross_references_become_relative_links() {
    let dir = TempDir::new().unwrap();
    generate(&dir).success();
    let add = read(&dir, "api/m.add.md");
    assert!(add.contains("The inverse of [sub](m.sub.md)."), "{add}");
}

#[test]
fn output_is_byte_identical_across_runs() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    generate(&first).success();
    generate(&second).success();
    for page in ["reference.md", "api/m.Arr.md", "api/m.add.md"] {
        assert_eq!(read(&first, page), read(&second, page));
    }
}

// -- CLI surface --

#[test]
fn list_prints_planned_paths() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-i", &fixture_path("inventory.json")])
        .args(["-c", &fixture_path("apigen.toml")])
        .args(["-o", dir.path().to_str().unwrap()])
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("api/m.add\napi/m.sub\napi/m.Arr\n"));
    assert!(!dir.path().join("api").exists());
}

#[test]
fn reads_inventory_from_stdin() {
    let dir = TempDir::new().unwrap();
    let inventory = fs::read_to_string(fixture_path("inventory.json")).unwrap();
    cmd()
        .args(["-m", "m=ref"])
        .args(["-o", dir.path().to_str().unwrap()])
        .write_stdin(inventory)
        .assert()
        .success();
    assert!(dir.path().join("ref/m.add.md").is_file());
    assert!(!dir.path().join("api").exists());
}

#[test]
fn html_format() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-i", &fixture_path("inventory.json")])
        .args(["-m", "m=api"])
        .args(["-f", "html"])
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .success();
    let add = read(&dir, "api/m.add.html");
    assert!(add.contains("<title>m.add</title>"));
    assert!(add.contains("<a href=\"m.sub.html\">sub</a>"), "{add}");
}

#[test]
fn json_format() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-i", &fixture_path("inventory.json")])
        .args(["-m", "m=api"])
        .args(["-f", "json"])
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .success();
    let vindex = read(&dir, "api/m.Arr.vindex.json");
    assert!(vindex.contains("\"kind\": \"subscript-method\""), "{vindex}");
    assert!(vindex.contains("\"signature\": \"m.Arr.vindex[sel: Selection]\""), "{vindex}");
}

#[test]
fn unknown_format_fails() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-i", &fixture_path("inventory.json")])
        .args(["-m", "m=api"])
        .args(["-f", "pdf"])
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn requires_a_module() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-i", &fixture_path("inventory.json")])
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no modules configured"));
}

// -- fatal errors write nothing --

#[test]
fn duplicate_overload_id_fails() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-i", &fixture_path("duplicate_overload.json")])
        .args(["-m", "m=api"])
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"))
        .stderr(predicate::str::contains("duplicate overload id 'num'"))
        .stderr(predicate::str::contains("#1 and #2"));
    assert!(!dir.path().join("api").exists());
}

#[test]
fn case_insensitive_path_collision_fails() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-i", &fixture_path("collision.json")])
        .args(["-m", "m=api"])
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Collision error"))
        .stderr(predicate::str::contains("'m.Dim' -> api/m.Dim"))
        .stderr(predicate::str::contains("'m.dim' -> api/m.dim"));
    assert!(!dir.path().join("api").exists());
}

#[test]
fn empty_group_request_fails() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-i", &fixture_path("inventory.json")])
        .args(["-c", &fixture_path("apigen.toml")])
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("missing_group.md"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Resolution error"))
        .stderr(predicate::str::contains("group 'io' of 'm'"));
    assert!(!dir.path().join("api").exists());
    assert!(!dir.path().join("missing_group.md").exists());
}

#[test]
fn invalid_config_key_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "colum_limit = 10\n").unwrap();
    cmd()
        .args(["-i", &fixture_path("inventory.json")])
        .args(["-c", config.to_str().unwrap()])
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config"));
}

#[test]
fn invalid_subscript_pattern_fails() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-i", &fixture_path("inventory.json")])
        .args(["-m", "m=api"])
        .args(["--subscript-pattern", "("])
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid subscript method pattern"));
}
