use std::path::Path;

use predicates::prelude::PredicateBooleanExt;
use rstest::rstest;
use sidebar_core::AnyEmptyResult;
use similar_asserts::assert_eq;

mod common;

use common::sidebar_cmd;

const CONFIG: &str = "[hot]\nmarker_start = [](#CONFIGNAME)\nmarker_end = \
                      [](#/CONFIGNAME)\nplugin = submissions\nsubmissions_subreddit = \
                      nfl\nsubmissions_count = 2\n";

const SIDEBAR: &str = "# r/nfl\n\n[](#hot)\nold\n[](#/hot)\n";

const LISTINGS: &str = r#"{
	"nfl": {
		"hot": [
			{ "title": "Game thread" },
			{ "title": "Injury report" },
			{ "title": "Memes" }
		]
	}
}"#;

const EXPECTED: &str = "# r/nfl\n\n[](#hot)\n\n* Game thread\n* Injury report\n\n\n[](#/hot)\n";

fn write_fixtures(root: &Path) -> AnyEmptyResult {
	std::fs::write(root.join("sidebar.ini"), CONFIG)?;
	std::fs::write(root.join("sidebar.md"), SIDEBAR)?;
	std::fs::write(root.join("listings.json"), LISTINGS)?;
	Ok(())
}

#[test]
fn publishes_regenerated_regions() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_fixtures(tmp.path())?;

	sidebar_cmd()
		.current_dir(tmp.path())
		.args(["nfl", "sidebar.ini", "--document", "sidebar.md"])
		.args(["--listings", "listings.json"])
		.assert()
		.success()
		.stderr(predicates::str::contains("Sidebar diff"))
		.stderr(predicates::str::contains("Published"));

	let content = std::fs::read_to_string(tmp.path().join("sidebar.md"))?;
	assert_eq!(content, EXPECTED);

	Ok(())
}

#[test]
fn second_run_reports_no_changes() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_fixtures(tmp.path())?;

	sidebar_cmd()
		.current_dir(tmp.path())
		.args(["nfl", "sidebar.ini", "--document", "sidebar.md"])
		.args(["--listings", "listings.json"])
		.assert()
		.success();

	sidebar_cmd()
		.current_dir(tmp.path())
		.args(["nfl", "sidebar.ini", "--document", "sidebar.md"])
		.args(["--listings", "listings.json"])
		.assert()
		.success()
		.stderr(predicates::str::contains("No changes"));

	let content = std::fs::read_to_string(tmp.path().join("sidebar.md"))?;
	assert_eq!(content, EXPECTED);

	Ok(())
}

#[rstest]
#[case::long_flag("--dry-run")]
#[case::short_flag("-n")]
fn dry_run_prints_diff_without_writing(#[case] flag: &str) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_fixtures(tmp.path())?;

	sidebar_cmd()
		.current_dir(tmp.path())
		.args(["nfl", "sidebar.ini", "--document", "sidebar.md"])
		.args(["--listings", "listings.json", flag])
		.assert()
		.success()
		.stdout(predicates::str::contains("Dry run: would update 1 region(s): hot"))
		.stdout(predicates::str::contains("+* Game thread"))
		.stdout(predicates::str::contains("-old"));

	let content = std::fs::read_to_string(tmp.path().join("sidebar.md"))?;
	assert_eq!(content, SIDEBAR);

	Ok(())
}

#[test]
fn dry_run_diff_is_plain_when_stdout_is_not_a_terminal() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_fixtures(tmp.path())?;

	sidebar_cmd()
		.env_remove("NO_COLOR")
		.env_remove("FORCE_COLOR")
		.current_dir(tmp.path())
		.args(["nfl", "sidebar.ini", "--document", "sidebar.md"])
		.args(["--listings", "listings.json", "--dry-run"])
		.assert()
		.success()
		.stdout(predicates::str::contains("+* Game thread"))
		.stdout(predicates::str::contains("\u{1b}[").not());

	Ok(())
}

#[test]
fn default_document_path_uses_subreddit() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_fixtures(tmp.path())?;
	std::fs::rename(
		tmp.path().join("sidebar.md"),
		tmp.path().join("nfl.sidebar.md"),
	)?;

	sidebar_cmd()
		.current_dir(tmp.path())
		.args(["nfl", "sidebar.ini", "--listings", "listings.json"])
		.assert()
		.success();

	let content = std::fs::read_to_string(tmp.path().join("nfl.sidebar.md"))?;
	assert_eq!(content, EXPECTED);

	Ok(())
}

#[test]
fn plugin_failure_keeps_region_and_exits_cleanly() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_fixtures(tmp.path())?;

	// Without listings the submissions plugin has nothing to read from.
	sidebar_cmd()
		.current_dir(tmp.path())
		.args(["nfl", "sidebar.ini", "--document", "sidebar.md"])
		.assert()
		.success()
		.stderr(predicates::str::contains("Error running plugin"))
		.stderr(predicates::str::contains("No changes"));

	let content = std::fs::read_to_string(tmp.path().join("sidebar.md"))?;
	assert_eq!(content, SIDEBAR);

	Ok(())
}

#[test]
fn oversized_sidebar_is_published_with_warning() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_fixtures(tmp.path())?;

	sidebar_cmd()
		.current_dir(tmp.path())
		.args(["nfl", "sidebar.ini", "--document", "sidebar.md"])
		.args(["--listings", "listings.json", "--max-length", "10"])
		.assert()
		.success()
		.stderr(predicates::str::contains("Sidebar too large"));

	let content = std::fs::read_to_string(tmp.path().join("sidebar.md"))?;
	assert_eq!(content, EXPECTED);

	Ok(())
}

#[test]
fn invalid_config_is_fatal() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_fixtures(tmp.path())?;
	std::fs::write(
		tmp.path().join("sidebar.ini"),
		"[hot]\nmarker_start = [](#hot)\nplugin = submissions\n",
	)?;

	sidebar_cmd()
		.current_dir(tmp.path())
		.args(["nfl", "sidebar.ini", "--document", "sidebar.md"])
		.assert()
		.code(2)
		.stderr(predicates::str::contains("missing required key"));

	let content = std::fs::read_to_string(tmp.path().join("sidebar.md"))?;
	assert_eq!(content, SIDEBAR);

	Ok(())
}

#[test]
fn missing_document_is_fatal() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("sidebar.ini"), CONFIG)?;

	sidebar_cmd()
		.current_dir(tmp.path())
		.args(["nfl", "sidebar.ini", "--document", "missing.md"])
		.assert()
		.code(2)
		.stderr(predicates::str::contains("document store error"));

	Ok(())
}
